// ==========================================
// 混凝土库存台账 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: 提供持久化接口,屏蔽数据库细节
// 约束: 所有查询使用参数化
// ==========================================

pub mod error;
pub mod ledger_store;
pub mod stock_state_repo;

// 重导出核心仓储
pub use error::{RepositoryError, RepositoryResult};
pub use ledger_store::LedgerStore;
pub use stock_state_repo::SqliteLedgerStore;
