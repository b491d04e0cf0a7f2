// ==========================================
// 混凝土库存台账 - 库存 API
// ==========================================
// 职责: 台账唯一服务实例（入库、盘点调整、过磅扣减、清空、产能查询）
// 红线:
// - 每次变更要么完整生效（台账 + 流水 + 持久化），要么完全不生效
// - 台账与流水作为一个原子对保存
// - 同一时刻只允许一个过磅单对账在途
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{error, info, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::{parse_quantity, validate_quantity, QuantityError};
use crate::config::config_manager::ExtractionSettings;
use crate::config::plant_profile::{NumberStyle, PlantProfile};
use crate::domain::capacity::CapacityEstimate;
use crate::domain::material::{Material, MATERIALS};
use crate::domain::stock::StockLedger;
use crate::domain::transaction::{Transaction, TransactionLog, TransactionType};
use crate::engine::capacity_estimator::CapacityEstimator;
use crate::engine::reconciliation::{
    apply_deduction, validate_report, DeductionApplied, DeductionPlan, ReconcileGate,
    ReconcileState,
};
use crate::extraction::{ExtractionError, TicketDocument, TicketExtractor};
use crate::i18n::{format_quantity, t, t_with_args};
use crate::repository::ledger_store::LedgerStore;

// ==========================================
// StockSnapshot - 报表快照
// ==========================================
/// 台账、流水与产能估算取自同一时刻
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockSnapshot {
    pub ledger: StockLedger,
    pub log: Vec<Transaction>,
    pub capacity: CapacityEstimate,
    pub generated_at: DateTime<Utc>,
}

// ==========================================
// ReconcileOutcome - 对账结果
// ==========================================
#[derive(Debug, Clone)]
pub enum ReconcileOutcome {
    /// 已扣减并记录流水
    Applied {
        transaction: Transaction,
        deduction: DeductionApplied,
    },
    /// 扣减总量为 0：台账未变动、未记流水
    NoMaterialDetected,
}

impl ReconcileOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, ReconcileOutcome::Applied { .. })
    }

    /// 面向用户的提示（按当前语言）
    pub fn user_message(&self, style: NumberStyle) -> String {
        match self {
            ReconcileOutcome::Applied { deduction, .. } => t_with_args(
                "reconcile.applied",
                &[("qty", format_quantity(deduction.total_removed_kg(), style).as_str())],
            ),
            ReconcileOutcome::NoMaterialDetected => t("reconcile.no_material"),
        }
    }
}

#[derive(Debug, Clone)]
struct LedgerState {
    ledger: StockLedger,
    log: TransactionLog,
}

// ==========================================
// StockApi - 库存 API
// ==========================================

/// 库存API
///
/// 职责：
/// 1. 人工入库 / 盘点调整（含数量校验）
/// 2. 过磅单对账（外部识别 + 扣减）
/// 3. 清空流水 / 重置台账
/// 4. 产能估算与报表快照
pub struct StockApi {
    state: Mutex<LedgerState>,
    store: Arc<dyn LedgerStore>,
    extractor: Arc<dyn TicketExtractor>,
    extraction: ExtractionSettings,
    estimator: CapacityEstimator,
    fine_sand_target: Option<Material>,
    number_style: NumberStyle,
    log_capacity: usize,
    gate: ReconcileGate,
}

impl StockApi {
    /// 创建新的StockApi实例（从持久化存储恢复台账与流水）
    ///
    /// # 参数
    /// - profile: 搅拌站配置
    /// - store: 台账持久化
    /// - extractor: 过磅单识别协作方
    /// - extraction: 识别服务设置（凭证）
    pub fn new(
        profile: &PlantProfile,
        store: Arc<dyn LedgerStore>,
        extractor: Arc<dyn TicketExtractor>,
        extraction: ExtractionSettings,
    ) -> ApiResult<Self> {
        let (ledger, log) = store.load_pair(profile.log_capacity)?.unwrap_or_else(|| {
            (
                StockLedger::empty(),
                TransactionLog::new(profile.log_capacity),
            )
        });

        info!(
            log_len = log.len(),
            extractor = extractor.name(),
            "库存台账已加载"
        );

        Ok(Self {
            state: Mutex::new(LedgerState { ledger, log }),
            store,
            extractor,
            extraction,
            estimator: CapacityEstimator::new(
                profile.recipe,
                profile.load_volume_m3,
                profile.stock_min_threshold_kg,
            ),
            fine_sand_target: profile.fine_sand_target,
            number_style: profile.number_style,
            log_capacity: profile.log_capacity,
            gate: ReconcileGate::new(),
        })
    }

    fn lock_state(&self) -> ApiResult<MutexGuard<'_, LedgerState>> {
        self.state
            .lock()
            .map_err(|e| ApiError::LockError(e.to_string()))
    }

    /// 在副本上执行变更，保存成功后再替换内存状态
    ///
    /// 变更闭包返回 Err 时副本直接丢弃，不写存储
    fn commit<T>(
        &self,
        mutate: impl FnOnce(&mut StockLedger, &mut TransactionLog) -> ApiResult<T>,
    ) -> ApiResult<T> {
        let mut state = self.lock_state()?;
        let mut next = state.clone();
        let out = mutate(&mut next.ledger, &mut next.log)?;

        if let Err(e) = self.store.save(&next.ledger, &next.log) {
            error!(error = %e, "台账保存失败，变更已丢弃");
            return Err(e.into());
        }

        *state = next;
        Ok(out)
    }

    pub fn number_style(&self) -> NumberStyle {
        self.number_style
    }

    // ==========================================
    // 人工录入
    // ==========================================

    /// 入库（增量），数量为用户输入文本
    ///
    /// # 返回
    /// - Ok(Transaction): 新增的 MANUAL_ENTRY 流水
    /// - Err(ApiError::InvalidQuantity): 数量无效（台账未变动）
    pub fn record_entry(&self, material: Material, input: &str) -> ApiResult<Transaction> {
        let qty = parse_quantity(input).map_err(|reason| ApiError::InvalidQuantity {
            input: input.to_string(),
            reason,
        })?;
        self.record_entry_kg(material, qty)
    }

    /// 入库（增量），数量已为 kg
    pub fn record_entry_kg(&self, material: Material, qty: f64) -> ApiResult<Transaction> {
        let qty = validate_quantity(qty).map_err(|reason| ApiError::InvalidQuantity {
            input: qty.to_string(),
            reason,
        })?;

        let details = t_with_args(
            "transaction.entry",
            &[("qty", format_quantity(qty, self.number_style).as_str())],
        );
        let tx = self.commit(|ledger, log| {
            if ledger.add(material, qty).is_none() {
                warn!(
                    material = %material,
                    current = ledger.quantity(material),
                    qty,
                    "入库后存量超出范围，已拒绝"
                );
                return Err(ApiError::InvalidQuantity {
                    input: qty.to_string(),
                    reason: QuantityError::NotFinite,
                });
            }
            let tx = Transaction::new(TransactionType::ManualEntry, Some(material), qty, details);
            log.push(tx.clone());
            Ok(tx)
        })?;

        info!(material = %material, qty, tx_id = %tx.id, "人工入库");
        Ok(tx)
    }

    /// 盘点调整（绝对值覆盖），数量为用户输入文本
    pub fn set_adjustment(&self, material: Material, input: &str) -> ApiResult<Transaction> {
        let qty = parse_quantity(input).map_err(|reason| ApiError::InvalidQuantity {
            input: input.to_string(),
            reason,
        })?;
        self.set_adjustment_kg(material, qty)
    }

    /// 盘点调整（绝对值覆盖），数量已为 kg
    pub fn set_adjustment_kg(&self, material: Material, qty: f64) -> ApiResult<Transaction> {
        let qty = validate_quantity(qty).map_err(|reason| ApiError::InvalidQuantity {
            input: qty.to_string(),
            reason,
        })?;

        let details = t_with_args(
            "transaction.adjustment",
            &[("qty", format_quantity(qty, self.number_style).as_str())],
        );
        let (previous, tx) = self.commit(|ledger, log| {
            let previous = ledger.quantity(material);
            ledger.set(material, qty);
            let tx = Transaction::new(TransactionType::ManualEntry, Some(material), qty, details);
            log.push(tx.clone());
            Ok((previous, tx))
        })?;

        info!(material = %material, previous, qty, tx_id = %tx.id, "盘点调整");
        Ok(tx)
    }

    // ==========================================
    // 过磅单对账
    // ==========================================

    /// 处理过磅单：识别 => 扣减 => 记流水 => 保存
    ///
    /// # 返回
    /// - Ok(Applied): 已扣减
    /// - Ok(NoMaterialDetected): 未识别到物料（台账未变动）
    /// - Err(ReconcileInProgress): 已有对账在途
    /// - Err(Extraction): 识别失败（`requires_reauth()` 区分凭证问题）
    pub async fn process_scale_ticket(
        &self,
        document: TicketDocument,
    ) -> ApiResult<ReconcileOutcome> {
        let Some(ticket) = self.gate.try_begin() else {
            warn!("过磅单对账在途，拒绝新的提交");
            return Err(ApiError::ReconcileInProgress);
        };

        let result = self.reconcile(&document).await;
        let next_state = match &result {
            Ok(ReconcileOutcome::Applied { .. }) => ReconcileState::Applied,
            Ok(ReconcileOutcome::NoMaterialDetected) => ReconcileState::Idle,
            Err(_) => ReconcileState::Failed,
        };
        ticket.finish(next_state);
        result
    }

    async fn reconcile(&self, document: &TicketDocument) -> ApiResult<ReconcileOutcome> {
        let credential = if self.extractor.requires_credential() {
            match self.extraction.credential.as_ref() {
                Some(c) => Some(c),
                None => {
                    warn!(extractor = self.extractor.name(), "识别服务凭证未配置");
                    return Err(ExtractionError::MissingCredential.into());
                }
            }
        } else {
            None
        };

        info!(
            extractor = self.extractor.name(),
            media_type = %document.media_type,
            bytes = document.bytes.len(),
            "开始识别过磅单"
        );

        let report = match self
            .extractor
            .extract_ticket_weights(credential, document)
            .await
        {
            Ok(r) => r,
            Err(e) => {
                error!(kind = e.kind(), error = %e, "过磅单识别失败");
                return Err(e.into());
            }
        };

        if let Err(field) = validate_report(&report) {
            error!(%field, "识别结果含非法读数");
            return Err(ExtractionError::MalformedOutput(format!(
                "字段 {} 不是有效的非负重量",
                field
            ))
            .into());
        }

        if report.fine_sand_kg > 0.0 && self.fine_sand_target.is_none() {
            warn!(fine_sand_kg = report.fine_sand_kg, "细砂未配置并入物料，读数已忽略");
        }

        let plan = DeductionPlan::from_report(&report, self.fine_sand_target);
        if plan.is_noop() {
            info!("过磅单未识别到物料，台账未变动");
            return Ok(ReconcileOutcome::NoMaterialDetected);
        }

        let style = self.number_style;
        let (transaction, deduction) = self.commit(|ledger, log| {
            let deduction = apply_deduction(ledger, &plan);
            let details = scale_details(&deduction, style);
            let tx = Transaction::new(
                TransactionType::ScaleDeduction,
                None,
                deduction.total_removed_kg(),
                details,
            );
            log.push(tx.clone());
            Ok((tx, deduction))
        })?;

        if deduction.has_absorbed_excess() {
            warn!(absorbed = ?deduction.absorbed, "扣减量超出库存，超额部分在 0 处吸收");
        }
        info!(
            requested_kg = deduction.total_requested_kg(),
            removed_kg = deduction.total_removed_kg(),
            tx_id = %transaction.id,
            "过磅单扣减完成"
        );

        Ok(ReconcileOutcome::Applied {
            transaction,
            deduction,
        })
    }

    /// 当前对账状态
    pub fn reconcile_state(&self) -> ReconcileState {
        self.gate.state()
    }

    // ==========================================
    // 清空 / 重置
    // ==========================================

    /// 清空流水（台账不变）
    pub fn clear_log(&self) -> ApiResult<()> {
        let removed = self.commit(|_, log| {
            let removed = log.len();
            log.clear();
            Ok(removed)
        })?;
        info!(removed, "流水已清空");
        Ok(())
    }

    /// 重置：台账归零、清空流水、清除持久化状态
    ///
    /// 调用方负责二次确认；此处无条件执行
    pub fn reset(&self) -> ApiResult<()> {
        let mut state = self.lock_state()?;
        if let Err(e) = self.store.purge() {
            error!(error = %e, "清除持久化状态失败，重置已放弃");
            return Err(e.into());
        }
        *state = LedgerState {
            ledger: StockLedger::empty(),
            log: TransactionLog::new(self.log_capacity),
        };
        warn!("库存台账已重置");
        Ok(())
    }

    // ==========================================
    // 查询接口
    // ==========================================

    /// 当前台账（副本）
    pub fn ledger(&self) -> ApiResult<StockLedger> {
        Ok(self.lock_state()?.ledger)
    }

    pub fn quantity(&self, material: Material) -> ApiResult<f64> {
        Ok(self.lock_state()?.ledger.quantity(material))
    }

    /// 流水（最新在前）
    pub fn transactions(&self) -> ApiResult<Vec<Transaction>> {
        Ok(self.lock_state()?.log.to_vec())
    }

    /// 产能估算
    pub fn capacity(&self) -> ApiResult<CapacityEstimate> {
        let ledger = self.lock_state()?.ledger;
        Ok(self.estimator.estimate(&ledger))
    }

    /// 报表快照（台账、流水、产能来自同一时刻）
    pub fn snapshot(&self) -> ApiResult<StockSnapshot> {
        let (ledger, log) = {
            let state = self.lock_state()?;
            (state.ledger, state.log.to_vec())
        };
        Ok(StockSnapshot {
            capacity: self.estimator.estimate(&ledger),
            ledger,
            log,
            generated_at: Utc::now(),
        })
    }

    /// 某物料最近一次人工入库/调整
    pub fn last_manual_entry(&self, material: Material) -> ApiResult<Option<Transaction>> {
        Ok(self.lock_state()?.log.last_manual_entry(material).cloned())
    }

    /// 最近一次过磅扣减
    pub fn last_scale_deduction(&self) -> ApiResult<Option<Transaction>> {
        Ok(self.lock_state()?.log.last_scale_deduction().cloned())
    }
}

/// 过磅扣减摘要：逐物料列出实际扣除量，被 0 吸收的物料附单据读数
fn scale_details(deduction: &DeductionApplied, style: NumberStyle) -> String {
    let items = MATERIALS
        .iter()
        .map(|m| {
            let mut item = format!(
                "{}: {} kg",
                m.short_code(),
                format_quantity(deduction.removed[*m], style)
            );
            if deduction.absorbed[*m] > 0.0 {
                item.push_str(&t_with_args(
                    "transaction.ticket_reading",
                    &[("qty", format_quantity(deduction.requested[*m], style).as_str())],
                ));
            }
            item
        })
        .collect::<Vec<_>>()
        .join(", ");

    t_with_args("transaction.scale", &[("items", items.as_str())])
}
