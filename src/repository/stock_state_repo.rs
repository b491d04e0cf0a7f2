// ==========================================
// 混凝土库存台账 - 台账状态数据仓储
// ==========================================
// 存储: stock_state 表（key-value，JSON 文档）
// - stock:   台账 {"Brita 0": kg, ...}
// - history: 流水数组（最新在前）
// ==========================================


use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value as JsonValue;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

use crate::domain::material::MaterialMap;
use crate::domain::stock::StockLedger;
use crate::domain::transaction::{Transaction, TransactionLog};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::ledger_store::LedgerStore;

/// 台账存储键
pub const STOCK_KEY: &str = "stock";

/// 流水存储键
pub const HISTORY_KEY: &str = "history";

// ==========================================
// SqliteLedgerStore - 台账状态仓储
// ==========================================
// 红线: Repository 不做业务逻辑,只做数据映射与损坏恢复
pub struct SqliteLedgerStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteLedgerStore {
    /// 创建新的台账状态仓储
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 读取原始值
    fn read_raw(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM stock_state WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 直接写入原始值（仅供测试/迁移模拟损坏数据）
    pub fn write_raw(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT OR REPLACE INTO stock_state (key, value, updated_at) VALUES (?1, ?2, ?3)",
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }
}

impl LedgerStore for SqliteLedgerStore {
    fn load_ledger(&self) -> RepositoryResult<Option<StockLedger>> {
        let Some(raw) = self.read_raw(STOCK_KEY)? else {
            return Ok(None);
        };

        // null 读数（旧版写入的 NaN）按 0 处理
        let parsed: MaterialMap<Option<f64>> = match serde_json::from_str(&raw) {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "台账数据损坏，回退为空台账");
                return Ok(None);
            }
        };

        let (ledger, clamped) =
            StockLedger::from_quantities(parsed.map(|_, v| v.unwrap_or(f64::NAN)));
        if !clamped.is_empty() {
            warn!(materials = ?clamped, "台账存在非法数量，已钳制为 0");
        }
        Ok(Some(ledger))
    }

    fn load_log(&self, capacity: usize) -> RepositoryResult<Option<TransactionLog>> {
        let Some(raw) = self.read_raw(HISTORY_KEY)? else {
            return Ok(None);
        };

        let items: Vec<JsonValue> = match serde_json::from_str(&raw) {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "流水数据损坏，回退为空流水");
                return Ok(None);
            }
        };

        let total = items.len();
        let entries: Vec<Transaction> = items
            .into_iter()
            .filter_map(|item| serde_json::from_value::<Transaction>(item).ok())
            .collect();
        if entries.len() != total {
            warn!(
                skipped = total - entries.len(),
                "流水中存在无法解析的条目，已跳过"
            );
        }

        Ok(Some(TransactionLog::restore(entries, capacity)))
    }

    fn save(&self, ledger: &StockLedger, log: &TransactionLog) -> RepositoryResult<()> {
        let stock_json = serde_json::to_string(ledger)?;
        let history_json = serde_json::to_string(&log.to_vec())?;
        let now = Utc::now().to_rfc3339();

        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        for (key, value) in [(STOCK_KEY, &stock_json), (HISTORY_KEY, &history_json)] {
            tx.execute(
                "INSERT OR REPLACE INTO stock_state (key, value, updated_at) VALUES (?1, ?2, ?3)",
                params![key, value, now],
            )?;
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        debug!(log_len = log.len(), "台账状态已保存");
        Ok(())
    }

    fn purge(&self) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            "DELETE FROM stock_state WHERE key IN (?1, ?2)",
            params![STOCK_KEY, HISTORY_KEY],
        )?;
        info!(rows, "已清除保存的台账状态");
        Ok(())
    }
}
