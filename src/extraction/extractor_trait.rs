// ==========================================
// 混凝土库存台账 - 过磅单识别 Trait
// ==========================================
// 职责: 定义外部识别协作方接口（不包含实现）
// 红线: 识别结果只读，不得直接修改台账
// ==========================================

use async_trait::async_trait;
use std::fmt;

use crate::domain::weight_report::WeightReport;
use crate::extraction::error::ExtractionResult;

// ==========================================
// ExtractionCredential - 识别服务凭证
// ==========================================
// Debug 输出脱敏
#[derive(Clone, PartialEq, Eq)]
pub struct ExtractionCredential(String);

impl ExtractionCredential {
    /// 空白字符串视为未配置
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ExtractionCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ExtractionCredential(***)")
    }
}

// ==========================================
// TicketDocument - 待识别单据
// ==========================================
#[derive(Debug, Clone)]
pub struct TicketDocument {
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl TicketDocument {
    /// 创建单据；未声明类型时按内容推断
    ///
    /// # 推断规则
    /// - 以 `%PDF` 开头 => application/pdf
    /// - 其他 => image/jpeg
    pub fn new(media_type: Option<&str>, bytes: Vec<u8>) -> Self {
        let media_type = match media_type.map(str::trim) {
            Some(t) if !t.is_empty() => t.to_ascii_lowercase(),
            _ => sniff_media_type(&bytes).to_string(),
        };
        Self { media_type, bytes }
    }
}

fn sniff_media_type(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(b"%PDF") {
        "application/pdf"
    } else {
        "image/jpeg"
    }
}

// ==========================================
// TicketExtractor Trait
// ==========================================
// 用途: 将过磅单据转换为扣减报告
// 实现者: JsonPayloadExtractor（已识别的 JSON 载荷）、外部模型服务适配器
#[async_trait]
pub trait TicketExtractor: Send + Sync {
    /// 识别过磅单
    ///
    /// # 参数
    /// - credential: 调用方已校验的凭证（不需要凭证的实现收到 None）
    /// - document: 单据原始字节 + 媒体类型
    ///
    /// # 返回
    /// - Ok(WeightReport): 各物料扣减量
    /// - Err(ExtractionError): 分类错误（凭证 / 格式 / 服务）
    async fn extract_ticket_weights(
        &self,
        credential: Option<&ExtractionCredential>,
        document: &TicketDocument,
    ) -> ExtractionResult<WeightReport>;

    /// 是否需要凭证
    fn requires_credential(&self) -> bool {
        true
    }

    /// 实现名称（日志用）
    fn name(&self) -> &'static str;
}
