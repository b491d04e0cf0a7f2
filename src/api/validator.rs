// ==========================================
// 混凝土库存台账 - 数量输入校验器
// ==========================================
// 职责: 人工录入数量的本地化解析 + 非负校验
// 规则:
// - ',' 为小数点；此时所有 '.' 视为千分位
// - 无 ',' 时，'.' 分组均为 3 位且首组不以 0 开头 => 千分位；否则单个 '.' 为小数点
// - 解析结果必须为有限非负数
// ==========================================

use thiserror::Error;

/// 数量解析错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QuantityError {
    #[error("数量为空")]
    Empty,

    #[error("不是有效的数字")]
    NotANumber,

    #[error("数量不能为负")]
    Negative,

    #[error("数量超出范围")]
    NotFinite,
}

/// 解析人工录入的数量（kg）
///
/// # 示例
/// - "50.000" => 50000
/// - "50,5" => 50.5
/// - "1.234,56" => 1234.56
/// - "abc" => Err(NotANumber)
pub fn parse_quantity(input: &str) -> Result<f64, QuantityError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(QuantityError::Empty);
    }

    let (negative, body) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    if body.is_empty() || !body.chars().all(|c| c.is_ascii_digit() || c == '.' || c == ',') {
        return Err(QuantityError::NotANumber);
    }

    let normalized = normalize_separators(body)?;
    let value: f64 = normalized.parse().map_err(|_| QuantityError::NotANumber)?;

    if !value.is_finite() {
        return Err(QuantityError::NotFinite);
    }
    if negative && value != 0.0 {
        return Err(QuantityError::Negative);
    }
    validate_quantity(value)
}

/// 校验已解析的数量
pub fn validate_quantity(value: f64) -> Result<f64, QuantityError> {
    if value.is_nan() {
        return Err(QuantityError::NotANumber);
    }
    if !value.is_finite() {
        return Err(QuantityError::NotFinite);
    }
    if value < 0.0 {
        return Err(QuantityError::Negative);
    }
    // -0.0 => 0.0
    Ok(value.abs())
}

fn normalize_separators(body: &str) -> Result<String, QuantityError> {
    if let Some((int_part, frac_part)) = body.split_once(',') {
        // 只允许一个小数点，且千分位只能出现在整数部分
        if frac_part.contains(',') || frac_part.contains('.') {
            return Err(QuantityError::NotANumber);
        }
        let int_digits: String = int_part.chars().filter(|c| *c != '.').collect();
        if int_digits.is_empty() && frac_part.is_empty() {
            return Err(QuantityError::NotANumber);
        }
        let int_digits = if int_digits.is_empty() { "0".to_string() } else { int_digits };
        let frac_digits = if frac_part.is_empty() { "0" } else { frac_part };
        return Ok(format!("{}.{}", int_digits, frac_digits));
    }

    let groups: Vec<&str> = body.split('.').collect();
    match groups.len() {
        1 => Ok(body.to_string()),
        _ if is_thousands_grouping(&groups) => Ok(groups.concat()),
        2 if !groups[0].is_empty() || !groups[1].is_empty() => {
            let int_digits = if groups[0].is_empty() { "0" } else { groups[0] };
            let frac_digits = if groups[1].is_empty() { "0" } else { groups[1] };
            Ok(format!("{}.{}", int_digits, frac_digits))
        }
        _ => Err(QuantityError::NotANumber),
    }
}

fn is_thousands_grouping(groups: &[&str]) -> bool {
    let Some((first, rest)) = groups.split_first() else {
        return false;
    };
    (1..=3).contains(&first.len())
        && !first.starts_with('0')
        && rest.iter().all(|g| g.len() == 3)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thousands_separator_dot() {
        assert_eq!(parse_quantity("50.000"), Ok(50000.0));
        assert_eq!(parse_quantity("1.234.567"), Ok(1234567.0));
    }

    #[test]
    fn test_decimal_comma() {
        assert_eq!(parse_quantity("50,5"), Ok(50.5));
        assert_eq!(parse_quantity("1.234,56"), Ok(1234.56));
        assert_eq!(parse_quantity(",5"), Ok(0.5));
    }

    #[test]
    fn test_decimal_dot_when_not_grouping() {
        assert_eq!(parse_quantity("50.5"), Ok(50.5));
        assert_eq!(parse_quantity("0.500"), Ok(0.5));
        assert_eq!(parse_quantity("1234.567"), Ok(1234.567));
    }

    #[test]
    fn test_plain_integers_and_whitespace() {
        assert_eq!(parse_quantity(" 2600 "), Ok(2600.0));
        assert_eq!(parse_quantity("0"), Ok(0.0));
        assert_eq!(parse_quantity("-0"), Ok(0.0));
        assert_eq!(parse_quantity("+12"), Ok(12.0));
    }

    #[test]
    fn test_rejections() {
        assert_eq!(parse_quantity("abc"), Err(QuantityError::NotANumber));
        assert_eq!(parse_quantity(""), Err(QuantityError::Empty));
        assert_eq!(parse_quantity("   "), Err(QuantityError::Empty));
        assert_eq!(parse_quantity("-5"), Err(QuantityError::Negative));
        assert_eq!(parse_quantity("1,2,3"), Err(QuantityError::NotANumber));
        assert_eq!(parse_quantity("1.2.3"), Err(QuantityError::NotANumber));
        assert_eq!(parse_quantity("12kg"), Err(QuantityError::NotANumber));
        assert_eq!(parse_quantity("inf"), Err(QuantityError::NotANumber));
        assert_eq!(parse_quantity("."), Err(QuantityError::NotANumber));
    }

    #[test]
    fn test_validate_quantity() {
        assert_eq!(validate_quantity(-0.0), Ok(0.0));
        assert_eq!(validate_quantity(f64::NAN), Err(QuantityError::NotANumber));
        assert_eq!(validate_quantity(f64::INFINITY), Err(QuantityError::NotFinite));
        assert_eq!(validate_quantity(-1.0), Err(QuantityError::Negative));
    }
}
