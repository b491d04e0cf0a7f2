// ==========================================
// 混凝土库存台账 - API 层
// ==========================================
// 职责: 提供业务 API 接口,供命令行 / 界面调用
// ==========================================

pub mod error;
pub mod report_api;
pub mod stock_api;
pub mod validator;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use report_api::ReportApi;
pub use stock_api::{ReconcileOutcome, StockApi, StockSnapshot};
pub use validator::{parse_quantity, validate_quantity, QuantityError};
