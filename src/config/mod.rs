// ==========================================
// 混凝土库存台账 - 配置层
// ==========================================
// 职责: 搅拌站配置（配方/方量/阈值/细砂合并规则）与识别服务设置
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod plant_profile;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager, ExtractionSettings, API_KEY_ENV};
pub use plant_profile::{NumberStyle, PlantProfile};
