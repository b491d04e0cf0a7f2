// ==========================================
// 混凝土库存台账 - 产能估算引擎
// ==========================================
// 职责: 由台账快照 + 配方计算可生产车数与方量
// 红线: 纯函数，无副作用；低库存标记与产能使用同一快照
// ==========================================

use tracing::debug;

use crate::domain::capacity::{CapacityEstimate, MaterialCoverage};
use crate::domain::material::{Material, MaterialMap, Recipe};
use crate::domain::stock::StockLedger;

// ==========================================
// CapacityEstimator - 产能估算引擎
// ==========================================
#[derive(Debug, Clone)]
pub struct CapacityEstimator {
    recipe: Recipe,
    load_volume_m3: f64,
    stock_min_threshold_kg: f64,
}

impl CapacityEstimator {
    pub fn new(recipe: Recipe, load_volume_m3: f64, stock_min_threshold_kg: f64) -> Self {
        Self {
            recipe,
            load_volume_m3,
            stock_min_threshold_kg,
        }
    }

    pub fn recipe(&self) -> &Recipe {
        &self.recipe
    }

    pub fn load_volume_m3(&self) -> f64 {
        self.load_volume_m3
    }

    pub fn stock_min_threshold_kg(&self) -> f64 {
        self.stock_min_threshold_kg
    }

    /// 估算产能
    ///
    /// # 规则
    /// - 每种物料: ratio = 存量 / 配方量
    /// - 可生产车数 = floor(min(ratio))，最低为 0
    /// - 配方量为 0（或非法）的物料不构成约束，避免 NaN/∞ 污染最小值
    /// - 所有物料均不构成约束时，车数为 0
    pub fn estimate(&self, ledger: &StockLedger) -> CapacityEstimate {
        let coverage: MaterialMap<MaterialCoverage> = MaterialMap::from_fn(|material| {
            let stock_kg = ledger.quantity(material);
            let kg_per_load = self.recipe.kg_per_load(material);
            MaterialCoverage {
                stock_kg,
                kg_per_load,
                loads: load_ratio(stock_kg, kg_per_load),
                low_stock: ledger.is_below(material, self.stock_min_threshold_kg),
            }
        });

        let mut limiting: Option<(Material, f64)> = None;
        for (material, c) in coverage.iter() {
            if let Some(ratio) = c.loads {
                match limiting {
                    Some((_, min)) if min <= ratio => {}
                    _ => limiting = Some((material, ratio)),
                }
            }
        }

        let loads_possible = match limiting {
            Some((_, ratio)) if ratio > 0.0 => ratio.floor() as u64,
            _ => 0,
        };
        let volume_possible_m3 = loads_possible as f64 * self.load_volume_m3;

        debug!(
            loads_possible,
            volume_possible_m3,
            limiting = ?limiting.map(|(m, _)| m),
            "产能估算完成"
        );

        CapacityEstimate {
            loads_possible,
            volume_possible_m3,
            limiting_material: limiting.map(|(m, _)| m),
            coverage,
        }
    }
}

impl Default for CapacityEstimator {
    fn default() -> Self {
        Self::new(
            Recipe::default(),
            crate::domain::material::LOAD_VOLUME_M3,
            crate::domain::material::STOCK_MIN_THRESHOLD_KG,
        )
    }
}

fn load_ratio(stock_kg: f64, kg_per_load: f64) -> Option<f64> {
    if !kg_per_load.is_finite() || kg_per_load <= 0.0 {
        return None;
    }
    let ratio = stock_kg / kg_per_load;
    if ratio.is_finite() {
        Some(ratio.max(0.0))
    } else {
        None
    }
}
