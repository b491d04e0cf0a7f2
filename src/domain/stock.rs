// ==========================================
// 混凝土库存台账 - 库存台账领域模型
// ==========================================
// 职责: 各物料现存量（kg）的唯一事实来源
// 红线: 任何物料的存量不得为负（钳制到 0，而不是拒绝操作）
// ==========================================

use serde::{Deserialize, Serialize};

use crate::domain::material::{Material, MaterialMap};

// ==========================================
// StockLedger - 库存台账
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StockLedger {
    quantities: MaterialMap<f64>,
}

impl StockLedger {
    /// 全部为 0 的初始台账
    pub fn empty() -> Self {
        Self {
            quantities: MaterialMap::zeros(),
        }
    }

    /// 由外部数据构建台账，非法值（负数/NaN/∞）钳制为 0
    ///
    /// # 返回
    /// (台账, 被钳制的物料列表)
    pub fn from_quantities(quantities: MaterialMap<f64>) -> (Self, Vec<Material>) {
        let mut clamped = Vec::new();
        let quantities = quantities.map(|material, &qty| {
            let safe = clamp_quantity(qty);
            if safe != qty {
                clamped.push(material);
            }
            safe
        });
        (Self { quantities }, clamped)
    }

    pub fn quantity(&self, material: Material) -> f64 {
        self.quantities[material]
    }

    pub fn quantities(&self) -> &MaterialMap<f64> {
        &self.quantities
    }

    /// 入库（增量）
    ///
    /// # 返回
    /// - Some(新存量)
    /// - None: 合计溢出为非有限值，台账不变
    pub fn add(&mut self, material: Material, qty: f64) -> Option<f64> {
        let entry = &mut self.quantities[material];
        let next = *entry + qty;
        if !next.is_finite() {
            return None;
        }
        *entry = clamp_quantity(next);
        Some(*entry)
    }

    /// 盘点调整（绝对值覆盖）
    pub fn set(&mut self, material: Material, qty: f64) {
        self.quantities[material] = clamp_quantity(qty);
    }

    /// 扣减，最低扣到 0
    ///
    /// # 返回
    /// 实际扣除的数量（超出部分在 0 处被吸收）
    pub fn deduct(&mut self, material: Material, qty: f64) -> f64 {
        let entry = &mut self.quantities[material];
        let before = *entry;
        *entry = clamp_quantity(before - qty);
        before - *entry
    }

    /// 存量是否低于阈值
    pub fn is_below(&self, material: Material, threshold_kg: f64) -> bool {
        self.quantities[material] < threshold_kg
    }
}

impl Default for StockLedger {
    fn default() -> Self {
        Self::empty()
    }
}

fn clamp_quantity(qty: f64) -> f64 {
    if qty.is_finite() && qty > 0.0 {
        qty
    } else {
        0.0
    }
}
