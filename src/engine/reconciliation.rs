// ==========================================
// 混凝土库存台账 - 过磅单对账引擎
// ==========================================
// 职责: 将识别得到的扣减报告作用到台账
// 状态机: Idle → Processing → {Applied, Failed}
// 红线:
// - 扣减最低到 0，超额部分在 0 处吸收（不是错误）
// - 扣减总量恰为 0 视为"未识别到物料"，不修改台账、不记流水
// - 同一时刻只允许一个对账在途
// ==========================================

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::domain::material::{Material, MaterialMap};
use crate::domain::stock::StockLedger;
use crate::domain::weight_report::WeightReport;

// ==========================================
// ReconcileState - 对账状态
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReconcileState {
    Idle,
    Processing,
    Applied,
    Failed,
}

// ==========================================
// DeductionPlan - 扣减计划
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeductionPlan {
    pub requested: MaterialMap<f64>, // 合并细砂后的扣减量
    pub total_requested_kg: f64,
}

impl DeductionPlan {
    /// 由扣减报告生成计划（细砂按配置并入目标物料）
    pub fn from_report(report: &WeightReport, fine_sand_target: Option<Material>) -> Self {
        let requested = report.merged(fine_sand_target);
        Self {
            total_requested_kg: requested.total(),
            requested,
        }
    }

    /// 总扣减为 0 => 未识别到物料
    pub fn is_noop(&self) -> bool {
        self.total_requested_kg == 0.0
    }
}

// ==========================================
// DeductionApplied - 扣减结果
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeductionApplied {
    pub requested: MaterialMap<f64>, // 报告扣减量
    pub removed: MaterialMap<f64>,   // 实际扣除量
    pub absorbed: MaterialMap<f64>,  // 在 0 处被吸收的超额部分
}

impl DeductionApplied {
    pub fn total_requested_kg(&self) -> f64 {
        self.requested.total()
    }

    pub fn total_removed_kg(&self) -> f64 {
        self.removed.total()
    }

    pub fn has_absorbed_excess(&self) -> bool {
        self.absorbed.iter().any(|(_, &kg)| kg > 0.0)
    }
}

/// 校验扣减报告：所有读数必须为有限非负数
///
/// # 返回
/// - Err(字段名): 第一个非法读数
pub fn validate_report(report: &WeightReport) -> Result<(), String> {
    for (material, &kg) in report.deductions.iter() {
        if !kg.is_finite() || kg < 0.0 {
            return Err(material.label().to_string());
        }
    }
    if !report.fine_sand_kg.is_finite() || report.fine_sand_kg < 0.0 {
        return Err("areiaFina".to_string());
    }
    Ok(())
}

/// 将扣减计划作用到台账（调用方保证计划非空）
pub fn apply_deduction(ledger: &mut StockLedger, plan: &DeductionPlan) -> DeductionApplied {
    let mut removed = MaterialMap::zeros();
    let mut absorbed = MaterialMap::zeros();

    for (material, &kg) in plan.requested.iter() {
        if kg == 0.0 {
            continue;
        }
        let taken = ledger.deduct(material, kg);
        removed[material] = taken;
        absorbed[material] = (kg - taken).max(0.0);
    }

    DeductionApplied {
        requested: plan.requested,
        removed,
        absorbed,
    }
}

// ==========================================
// ReconcileGate - 在途守卫
// ==========================================
// 单一忙标志 + 状态记录；不持有台账锁，可跨 await
#[derive(Debug)]
pub struct ReconcileGate {
    busy: AtomicBool,
    state: Mutex<ReconcileState>,
}

impl ReconcileGate {
    pub fn new() -> Self {
        Self {
            busy: AtomicBool::new(false),
            state: Mutex::new(ReconcileState::Idle),
        }
    }

    /// 进入 Processing；已有对账在途时返回 None
    pub fn try_begin(&self) -> Option<ReconcileTicket<'_>> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return None;
        }
        self.set_state(ReconcileState::Processing);
        Some(ReconcileTicket {
            gate: self,
            finished: false,
        })
    }

    pub fn state(&self) -> ReconcileState {
        match self.state.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    fn set_state(&self, next: ReconcileState) {
        match self.state.lock() {
            Ok(mut guard) => *guard = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }
    }
}

impl Default for ReconcileGate {
    fn default() -> Self {
        Self::new()
    }
}

// ==========================================
// ReconcileTicket - 在途凭证
// ==========================================
// 未显式结束即被丢弃（调用方取消）时回到 Idle 并释放忙标志
pub struct ReconcileTicket<'a> {
    gate: &'a ReconcileGate,
    finished: bool,
}

impl ReconcileTicket<'_> {
    /// 结束对账（Applied / Failed / Idle）
    pub fn finish(mut self, state: ReconcileState) {
        self.finished = true;
        self.gate.set_state(state);
        self.gate.busy.store(false, Ordering::Release);
    }
}

impl Drop for ReconcileTicket<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.gate.set_state(ReconcileState::Idle);
            self.gate.busy.store(false, Ordering::Release);
        }
    }
}
