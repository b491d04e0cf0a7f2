// ==========================================
// 混凝土库存台账 - 引擎层
// ==========================================
// 职责: 产能估算、过磅单对账等业务规则
// 红线: 引擎不直接访问存储
// ==========================================

pub mod capacity_estimator;
pub mod reconciliation;

// 重导出核心引擎
pub use capacity_estimator::CapacityEstimator;
pub use reconciliation::{
    apply_deduction, validate_report, DeductionApplied, DeductionPlan, ReconcileGate,
    ReconcileState, ReconcileTicket,
};
