// ==========================================
// 国际化 (i18n) 模块
// ==========================================
// 使用 rust-i18n 库
// 支持中文（默认）、英文、葡萄牙语（巴西）
// ==========================================
// 注意: rust_i18n::i18n! 宏已在 lib.rs 中初始化
// ==========================================

use crate::config::plant_profile::NumberStyle;

/// 获取当前语言
pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// 设置语言
///
/// # 参数
/// - locale: 语言代码（"zh-CN" / "en" / "pt-BR"）
pub fn set_locale(locale: &str) {
    rust_i18n::set_locale(locale);
}

/// 翻译消息（无参数）
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// 翻译消息（带参数）
///
/// # 示例
/// ```no_run
/// use concrete_stock::i18n::t_with_args;
/// let msg = t_with_args("transaction.entry", &[("qty", "1.000")]);
/// ```
pub fn t_with_args(key: &str, args: &[(&str, &str)]) -> String {
    let mut result = rust_i18n::t!(key).to_string();
    for (k, v) in args {
        let placeholder = format!("%{{{}}}", k);
        result = result.replace(&placeholder, v);
    }
    result
}

/// 按显示风格格式化数量（最多保留 2 位小数，去掉末尾 0）
///
/// # 示例
/// - PtBr: 50000.5 => "50.000,5"
/// - En:   50000.5 => "50,000.5"
pub fn format_quantity(value: f64, style: NumberStyle) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let negative = value < 0.0;
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(style.thousands_separator());
        }
        grouped.push(ch);
    }

    let mut out = String::new();
    if negative && (int_part != "0" || !frac_part.is_empty()) {
        out.push('-');
    }
    out.push_str(&grouped);
    if !frac_part.is_empty() {
        out.push(style.decimal_separator());
        out.push_str(frac_part);
    }
    out
}

// rust-i18n 的 locale 为全局状态，且 Rust 测试默认并行执行；
// 会切换语言的测试需先持有该锁。
#[cfg(test)]
pub(crate) static LOCALE_TEST_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_locale() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("pt-BR");
        assert_eq!(current_locale(), "pt-BR");

        set_locale("en");
        assert_eq!(current_locale(), "en");

        set_locale("zh-CN");
    }

    #[test]
    fn test_translation_with_args() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("en");
        let msg = t_with_args("transaction.entry", &[("qty", "1,000")]);
        assert!(msg.contains("1,000"));
        assert!(!msg.contains("%{qty}"));
        set_locale("zh-CN");
    }

    #[test]
    fn test_format_quantity_pt_br() {
        assert_eq!(format_quantity(50000.0, NumberStyle::PtBr), "50.000");
        assert_eq!(format_quantity(50000.5, NumberStyle::PtBr), "50.000,5");
        assert_eq!(format_quantity(1234567.891, NumberStyle::PtBr), "1.234.567,89");
        assert_eq!(format_quantity(0.0, NumberStyle::PtBr), "0");
        assert_eq!(format_quantity(999.0, NumberStyle::PtBr), "999");
    }

    #[test]
    fn test_format_quantity_en() {
        assert_eq!(format_quantity(50000.5, NumberStyle::En), "50,000.5");
        assert_eq!(format_quantity(-1500.25, NumberStyle::En), "-1,500.25");
    }
}
