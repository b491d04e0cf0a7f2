// ==========================================
// 混凝土库存台账 - 领域模型层
// ==========================================
// 职责: 定义物料目录、台账、流水、产能与过磅报告
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod capacity;
pub mod material;
pub mod stock;
pub mod transaction;
pub mod weight_report;

// 重导出核心类型
pub use capacity::{CapacityEstimate, MaterialCoverage};
pub use material::{
    Material, MaterialMap, Recipe, LOAD_VOLUME_M3, MATERIALS, STOCK_MIN_THRESHOLD_KG,
};
pub use stock::StockLedger;
pub use transaction::{Transaction, TransactionLog, TransactionType, DEFAULT_LOG_CAPACITY};
pub use weight_report::{TicketReading, WeightReport};
