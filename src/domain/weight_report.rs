// ==========================================
// 混凝土库存台账 - 过磅单识别结果
// ==========================================
// 职责: 外部识别服务返回的各物料扣减重量（kg）
// 生命周期: 一次性消费，不持久化
// ==========================================

use serde::{Deserialize, Serialize};

use crate::domain::material::{Material, MaterialMap};

// ==========================================
// TicketReading - 识别服务原始载荷
// ==========================================
// 字段名与识别服务返回的 JSON 键一致
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketReading {
    pub brita0: f64,
    pub brita1: f64,
    pub areia_media: f64,
    pub areia_brita: f64,
    pub areia_fina: f64, // 细砂，目录外，按厂规并入某一物料
}

// ==========================================
// WeightReport - 扣减报告
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightReport {
    pub deductions: MaterialMap<f64>, // 目录物料扣减量
    pub fine_sand_kg: f64,            // 细砂读数（尚未合并）
}

impl WeightReport {
    pub fn new(deductions: MaterialMap<f64>, fine_sand_kg: f64) -> Self {
        Self {
            deductions,
            fine_sand_kg,
        }
    }

    /// 按合并规则得到目录物料的最终扣减量
    ///
    /// # 参数
    /// - `fine_sand_target`: 细砂并入的物料；None 表示不计入任何物料
    pub fn merged(&self, fine_sand_target: Option<Material>) -> MaterialMap<f64> {
        let mut merged = self.deductions;
        if let Some(target) = fine_sand_target {
            merged[target] += self.fine_sand_kg;
        }
        merged
    }
}

impl From<TicketReading> for WeightReport {
    fn from(r: TicketReading) -> Self {
        let mut deductions = MaterialMap::zeros();
        deductions[Material::Brita0] = r.brita0;
        deductions[Material::Brita1] = r.brita1;
        deductions[Material::AreiaMedia] = r.areia_media;
        deductions[Material::AreiaBrita] = r.areia_brita;
        WeightReport::new(deductions, r.areia_fina)
    }
}
