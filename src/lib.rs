// ==========================================
// 混凝土库存台账 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 骨料库存台账（人工入库 + 过磅单扣减 + 产能估算）
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "zh-CN");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 业务规则
pub mod engine;

// 识别层 - 过磅单外部识别
pub mod extraction;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 业务接口
pub mod api;

// 应用层 - 状态组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    CapacityEstimate, Material, MaterialMap, Recipe, StockLedger, Transaction, TransactionLog,
    TransactionType, WeightReport,
};

// 引擎
pub use engine::{CapacityEstimator, ReconcileState};

// API
pub use api::{ApiError, ReconcileOutcome, ReportApi, StockApi, StockSnapshot};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "混凝土库存台账";

// 数据库版本
pub const DB_VERSION: &str = "v1";
