// ==========================================
// 混凝土库存台账 - 应用层
// ==========================================
// 职责: 组装配置、仓储与API实例，供入口程序使用
// ==========================================

pub mod state;

// 重导出
pub use state::{get_default_db_path, AppState, DB_PATH_ENV};
