// ==========================================
// 混凝土库存台账 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::{ReportApi, StockApi};
use crate::config::config_manager::ConfigManager;
use crate::db::open_sqlite_connection;
use crate::extraction::{JsonPayloadExtractor, TicketExtractor};
use crate::repository::stock_state_repo::SqliteLedgerStore;

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "CONCRETE_STOCK_DB_PATH";

/// 应用状态
///
/// 包含所有API实例和共享资源
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 库存API
    pub stock_api: Arc<StockApi>,

    /// 报表API
    pub report_api: Arc<ReportApi>,

    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,
}

impl AppState {
    /// 创建新的AppState实例（使用默认识别器：JSON 载荷）
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    ///
    /// # 返回
    /// - Ok(AppState): 应用状态实例
    /// - Err(String): 初始化错误
    pub fn new(db_path: String) -> Result<Self, String> {
        Self::with_extractor(db_path, Arc::new(JsonPayloadExtractor))
    }

    /// 创建AppState实例并注入过磅单识别器
    ///
    /// 该方法会：
    /// 1. 打开共享连接并初始化表结构
    /// 2. 加载搅拌站配置并设置界面语言
    /// 3. 恢复台账与流水，创建API实例
    pub fn with_extractor(
        db_path: String,
        extractor: Arc<dyn TicketExtractor>,
    ) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 配置
        // ==========================================
        let config_manager = Arc::new(
            ConfigManager::from_connection(conn.clone())
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );
        let profile = config_manager
            .load_plant_profile()
            .map_err(|e| format!("无法加载搅拌站配置: {}", e))?;
        let extraction = config_manager
            .load_extraction_settings()
            .map_err(|e| format!("无法加载识别服务设置: {}", e))?;

        crate::i18n::set_locale(&profile.locale);

        // ==========================================
        // Repository + API
        // ==========================================
        let store = Arc::new(SqliteLedgerStore::new(conn));
        let stock_api = Arc::new(
            StockApi::new(&profile, store, extractor, extraction)
                .map_err(|e| format!("无法创建StockApi: {}", e))?,
        );
        let report_api = Arc::new(ReportApi::new(profile.number_style));

        tracing::info!(locale = %profile.locale, "AppState初始化完成");

        Ok(Self {
            db_path,
            stock_api,
            report_api,
            config_manager,
        })
    }
}

/// 获取默认数据库路径
///
/// 优先使用环境变量 CONCRETE_STOCK_DB_PATH，否则使用用户数据目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./concrete_stock.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("concrete-stock");
        // 目录创建失败时回退到当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("concrete_stock.db");
        }
    }

    path.to_string_lossy().to_string()
}
