// ==========================================
// 混凝土库存台账 - 台账持久化 Trait
// ==========================================
// 职责: 台账 + 流水作为一个原子对进行加载/保存/清除
// 红线:
// - save 必须同时写入台账与流水（不可分开写）
// - 加载遇到损坏数据时回退为空状态，不向调用方抛出解析错误
// - 台账与流水只能成对恢复，缺一则两者都从空开始
// ==========================================

use tracing::warn;

use crate::domain::stock::StockLedger;
use crate::domain::transaction::TransactionLog;
use crate::repository::error::RepositoryResult;

// ==========================================
// LedgerStore Trait
// ==========================================
// 实现者: SqliteLedgerStore
pub trait LedgerStore: Send + Sync {
    /// 加载台账
    ///
    /// # 返回
    /// - Ok(Some): 已保存的台账
    /// - Ok(None): 从未保存，或数据损坏（已记录告警）
    fn load_ledger(&self) -> RepositoryResult<Option<StockLedger>>;

    /// 加载流水（超出容量的旧流水被丢弃）
    fn load_log(&self, capacity: usize) -> RepositoryResult<Option<TransactionLog>>;

    /// 原子保存台账 + 流水
    fn save(&self, ledger: &StockLedger, log: &TransactionLog) -> RepositoryResult<()>;

    /// 清除已保存状态
    fn purge(&self) -> RepositoryResult<()>;

    /// 成对加载台账 + 流水
    ///
    /// # 返回
    /// - Ok(Some): 两者均存在且可解析
    /// - Ok(None): 从未保存；或任一方缺失/损坏（已记录告警）
    fn load_pair(
        &self,
        capacity: usize,
    ) -> RepositoryResult<Option<(StockLedger, TransactionLog)>> {
        match (self.load_ledger()?, self.load_log(capacity)?) {
            (Some(ledger), Some(log)) => Ok(Some((ledger, log))),
            (None, None) => Ok(None),
            (ledger, log) => {
                warn!(
                    ledger_present = ledger.is_some(),
                    log_present = log.is_some(),
                    "台账与流水不成对，两者均回退为空"
                );
                Ok(None)
            }
        }
    }
}
