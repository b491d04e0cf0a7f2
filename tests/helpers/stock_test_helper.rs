// ==========================================
// 库存API集成测试辅助工具
// ==========================================
// 职责: 临时数据库、可注入故障的台账存储、测试环境组装
// ==========================================

use rusqlite::Connection;
use std::error::Error;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

use concrete_stock::api::StockApi;
use concrete_stock::config::config_manager::ExtractionSettings;
use concrete_stock::config::plant_profile::PlantProfile;
use concrete_stock::db::open_sqlite_connection;
use concrete_stock::domain::{Material, StockLedger, TransactionLog};
use concrete_stock::logging;
use concrete_stock::extraction::{
    ExtractionCredential, JsonPayloadExtractor, TicketExtractor,
};
use concrete_stock::repository::{
    LedgerStore, RepositoryError, RepositoryResult, SqliteLedgerStore,
};

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_string_lossy().to_string();
    open_sqlite_connection(&db_path)?;
    Ok((temp_file, db_path))
}

// ==========================================
// FlakyStore - 可注入保存失败的存储
// ==========================================
pub struct FlakyStore {
    inner: SqliteLedgerStore,
    fail_writes: AtomicBool,
}

impl FlakyStore {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            inner: SqliteLedgerStore::new(conn),
            fail_writes: AtomicBool::new(false),
        }
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check(&self) -> RepositoryResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(RepositoryError::DatabaseTransactionError(
                "磁盘已满（模拟）".to_string(),
            ));
        }
        Ok(())
    }
}

impl LedgerStore for FlakyStore {
    fn load_ledger(&self) -> RepositoryResult<Option<StockLedger>> {
        self.inner.load_ledger()
    }

    fn load_log(&self, capacity: usize) -> RepositoryResult<Option<TransactionLog>> {
        self.inner.load_log(capacity)
    }

    fn save(&self, ledger: &StockLedger, log: &TransactionLog) -> RepositoryResult<()> {
        self.check()?;
        self.inner.save(ledger, log)
    }

    fn purge(&self) -> RepositoryResult<()> {
        self.check()?;
        self.inner.purge()
    }
}

// ==========================================
// 测试环境
// ==========================================

/// 库存API测试环境
///
/// 持有临时数据库文件，Drop 时自动删除
pub struct StockTestEnv {
    pub _temp_file: NamedTempFile,
    pub db_path: String,
    pub profile: PlantProfile,
    pub store: Arc<FlakyStore>,
    pub api: StockApi,
}

impl StockTestEnv {
    /// 默认配置 + JSON 载荷识别器
    pub fn new() -> Result<Self, Box<dyn Error>> {
        Self::with_extractor(Arc::new(JsonPayloadExtractor), None)
    }

    /// 注入识别器与凭证
    pub fn with_extractor(
        extractor: Arc<dyn TicketExtractor>,
        api_key: Option<&str>,
    ) -> Result<Self, Box<dyn Error>> {
        Self::build(PlantProfile::default(), extractor, api_key)
    }

    /// 自定义配置
    pub fn build(
        profile: PlantProfile,
        extractor: Arc<dyn TicketExtractor>,
        api_key: Option<&str>,
    ) -> Result<Self, Box<dyn Error>> {
        logging::init_test();
        let (temp_file, db_path) = create_test_db()?;
        let conn = Arc::new(Mutex::new(open_sqlite_connection(&db_path)?));
        let store = Arc::new(FlakyStore::new(conn));

        let extraction = ExtractionSettings {
            credential: api_key.and_then(ExtractionCredential::new),
        };
        let api = StockApi::new(&profile, store.clone(), extractor, extraction)?;

        Ok(Self {
            _temp_file: temp_file,
            db_path,
            profile,
            store,
            api,
        })
    }

    /// 以同一数据库重新创建 API（模拟重启）
    pub fn reopen(&self, extractor: Arc<dyn TicketExtractor>) -> Result<StockApi, Box<dyn Error>> {
        let conn = Arc::new(Mutex::new(open_sqlite_connection(&self.db_path)?));
        let store = Arc::new(SqliteLedgerStore::new(conn));
        Ok(StockApi::new(
            &self.profile,
            store,
            extractor,
            ExtractionSettings::default(),
        )?)
    }

    /// 设置参考库存: B0=60000, B1=120000, AM=90000, AB=30000
    pub fn seed_reference_stock(&self) {
        for (m, qty) in [
            (Material::Brita0, 60_000.0),
            (Material::Brita1, 120_000.0),
            (Material::AreiaMedia, 90_000.0),
            (Material::AreiaBrita, 30_000.0),
        ] {
            self.api.set_adjustment_kg(m, qty).expect("无法写入参考库存");
        }
    }
}
