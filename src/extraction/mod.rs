// ==========================================
// 混凝土库存台账 - 过磅单识别层
// ==========================================
// 职责: 外部识别协作方的接口边界（单据 => 扣减报告）
// 红线: 模型提示词/模型选择不在本层范围内
// ==========================================

pub mod error;
pub mod extractor_trait;
pub mod json_payload;

// 重导出
pub use error::{ExtractionError, ExtractionResult};
pub use extractor_trait::{ExtractionCredential, TicketDocument, TicketExtractor};
pub use json_payload::{decode_weight_report, JsonPayloadExtractor};
