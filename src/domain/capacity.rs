// ==========================================
// 混凝土库存台账 - 产能估算领域模型
// ==========================================
// 用途: 产能估算引擎输出格式（只读派生值，不持久化）
// ==========================================

use serde::{Deserialize, Serialize};

use crate::domain::material::{Material, MaterialMap};

// ==========================================
// MaterialCoverage - 单物料覆盖情况
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaterialCoverage {
    pub stock_kg: f64,           // 现存量
    pub kg_per_load: f64,        // 单车配方量
    pub loads: Option<f64>,      // 可支撑车数（配方为 0 时不构成约束 => None）
    pub low_stock: bool,         // 低于库存阈值
}

// ==========================================
// CapacityEstimate - 产能估算结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacityEstimate {
    pub loads_possible: u64,                   // 可生产整车数
    pub volume_possible_m3: f64,               // 可生产方量
    pub limiting_material: Option<Material>,   // 瓶颈物料
    pub coverage: MaterialMap<MaterialCoverage>,
}

impl CapacityEstimate {
    /// 低库存物料列表（目录顺序）
    pub fn low_stock_materials(&self) -> Vec<Material> {
        self.coverage
            .iter()
            .filter(|(_, c)| c.low_stock)
            .map(|(m, _)| m)
            .collect()
    }

    pub fn is_low_stock(&self, material: Material) -> bool {
        self.coverage[material].low_stock
    }
}
