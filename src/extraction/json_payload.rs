// ==========================================
// 混凝土库存台账 - 识别结果 JSON 解码
// ==========================================
// 载荷格式: {"brita0", "brita1", "areiaMedia", "areiaBrita", "areiaFina"}
// 单位: kg（浮点），未识别的物料为 0
// ==========================================

use async_trait::async_trait;
use tracing::debug;

use crate::domain::weight_report::{TicketReading, WeightReport};
use crate::engine::reconciliation::validate_report;
use crate::extraction::error::{ExtractionError, ExtractionResult};
use crate::extraction::extractor_trait::{ExtractionCredential, TicketDocument, TicketExtractor};

/// 解码识别服务返回的文本
///
/// # 规则
/// - 允许外层 Markdown 代码块（```json ... ```）
/// - 五个键必须齐全
/// - 读数必须为有限非负数
pub fn decode_weight_report(text: &str) -> ExtractionResult<WeightReport> {
    let body = strip_code_fence(text.trim());
    if body.is_empty() {
        return Err(ExtractionError::MalformedOutput("识别结果为空".to_string()));
    }

    let reading: TicketReading = serde_json::from_str(body)?;
    let report = WeightReport::from(reading);

    validate_report(&report).map_err(|field| {
        ExtractionError::MalformedOutput(format!("字段 {} 不是有效的非负重量", field))
    })?;

    debug!(?report, "识别结果解码完成");
    Ok(report)
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // 跳过语言标记所在行
    let rest = match rest.find('\n') {
        Some(pos) => &rest[pos + 1..],
        None => rest,
    };
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

// ==========================================
// JsonPayloadExtractor - 已识别载荷提取器
// ==========================================
// 用途: 单据本身即为识别服务的 JSON 输出（离线补录、命令行）
pub struct JsonPayloadExtractor;

const ACCEPTED_MEDIA_TYPES: [&str; 3] = ["application/json", "text/json", "text/plain"];

#[async_trait]
impl TicketExtractor for JsonPayloadExtractor {
    async fn extract_ticket_weights(
        &self,
        _credential: Option<&ExtractionCredential>,
        document: &TicketDocument,
    ) -> ExtractionResult<WeightReport> {
        if !ACCEPTED_MEDIA_TYPES.contains(&document.media_type.as_str()) {
            return Err(ExtractionError::UnsupportedMediaType(
                document.media_type.clone(),
            ));
        }
        if document.bytes.is_empty() {
            return Err(ExtractionError::EmptyDocument);
        }

        let text = std::str::from_utf8(&document.bytes)
            .map_err(|e| ExtractionError::MalformedOutput(format!("非 UTF-8 文本: {}", e)))?;
        decode_weight_report(text)
    }

    fn requires_credential(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "json-payload"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::material::Material;

    const SAMPLE: &str = r#"{"brita0": 1200.5, "brita1": 3400, "areiaMedia": 2500,
        "areiaBrita": 800, "areiaFina": 150}"#;

    #[test]
    fn test_decode_valid_payload() {
        let report = decode_weight_report(SAMPLE).unwrap();
        assert_eq!(report.deductions[Material::Brita0], 1200.5);
        assert_eq!(report.deductions[Material::AreiaBrita], 800.0);
        assert_eq!(report.fine_sand_kg, 150.0);
    }

    #[test]
    fn test_decode_fenced_payload() {
        let fenced = format!("```json\n{}\n```", SAMPLE);
        let report = decode_weight_report(&fenced).unwrap();
        assert_eq!(report.deductions[Material::Brita1], 3400.0);
    }

    #[test]
    fn test_decode_rejects_non_json() {
        let err = decode_weight_report("não consegui ler o relatório").unwrap_err();
        assert!(matches!(err, ExtractionError::MalformedOutput(_)));
        assert!(!err.is_credential_error());
    }

    #[test]
    fn test_decode_rejects_missing_key() {
        let err = decode_weight_report(r#"{"brita0": 1, "brita1": 2}"#).unwrap_err();
        assert!(matches!(err, ExtractionError::MalformedOutput(_)));
    }

    #[test]
    fn test_decode_rejects_negative_reading() {
        let payload = r#"{"brita0": -1, "brita1": 0, "areiaMedia": 0, "areiaBrita": 0, "areiaFina": 0}"#;
        let err = decode_weight_report(payload).unwrap_err();
        assert!(err.to_string().contains("Brita 0"));
    }

    #[test]
    fn test_decode_rejects_empty() {
        assert!(matches!(
            decode_weight_report("  "),
            Err(ExtractionError::MalformedOutput(_))
        ));
    }

    #[tokio::test]
    async fn test_json_extractor_checks_media_type() {
        let extractor = JsonPayloadExtractor;
        let doc = TicketDocument::new(Some("application/pdf"), b"%PDF".to_vec());
        let err = extractor.extract_ticket_weights(None, &doc).await.unwrap_err();
        assert!(matches!(err, ExtractionError::UnsupportedMediaType(_)));

        let doc = TicketDocument::new(Some("application/json"), SAMPLE.as_bytes().to_vec());
        let report = extractor.extract_ticket_weights(None, &doc).await.unwrap();
        assert_eq!(report.deductions[Material::AreiaMedia], 2500.0);
    }
}
