// ==========================================
// 混凝土库存台账 - 搅拌站配置
// ==========================================
// 职责: 配方、方量、低库存阈值、细砂合并规则、显示风格
// 缺失字段取默认值（serde default）
// ==========================================

use serde::{Deserialize, Serialize};

use crate::domain::material::{
    Material, Recipe, LOAD_VOLUME_M3, MATERIALS, STOCK_MIN_THRESHOLD_KG,
};
use crate::domain::transaction::DEFAULT_LOG_CAPACITY;

/// 数字显示风格（千分位/小数点）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NumberStyle {
    /// 1.234,5
    #[serde(rename = "pt-BR")]
    PtBr,
    /// 1,234.5
    #[serde(rename = "en")]
    En,
}

impl NumberStyle {
    pub fn thousands_separator(&self) -> char {
        match self {
            NumberStyle::PtBr => '.',
            NumberStyle::En => ',',
        }
    }

    pub fn decimal_separator(&self) -> char {
        match self {
            NumberStyle::PtBr => ',',
            NumberStyle::En => '.',
        }
    }
}

impl Default for NumberStyle {
    fn default() -> Self {
        NumberStyle::PtBr
    }
}

/// 搅拌站配置（持久化对象）
///
/// 存储位置：config_kv（scope_id='global'，key='plant_profile'）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlantProfile {
    /// 单车配方（kg/车）
    pub recipe: Recipe,

    /// 单车方量（m³）
    pub load_volume_m3: f64,

    /// 低库存阈值（kg）
    pub stock_min_threshold_kg: f64,

    /// 细砂读数并入的物料；None 表示忽略细砂
    pub fine_sand_target: Option<Material>,

    /// 流水窗口容量
    pub log_capacity: usize,

    /// 数字显示风格
    pub number_style: NumberStyle,

    /// 界面语言（zh-CN / en / pt-BR）
    pub locale: String,
}

impl Default for PlantProfile {
    fn default() -> Self {
        Self {
            recipe: Recipe::default(),
            load_volume_m3: LOAD_VOLUME_M3,
            stock_min_threshold_kg: STOCK_MIN_THRESHOLD_KG,
            fine_sand_target: Some(Material::AreiaMedia),
            log_capacity: DEFAULT_LOG_CAPACITY,
            number_style: NumberStyle::PtBr,
            locale: "pt-BR".to_string(),
        }
    }
}

impl PlantProfile {
    /// 校验配置
    ///
    /// # 返回
    /// - Err(原因): 第一条不合法的配置项
    pub fn validate(&self) -> Result<(), String> {
        for m in MATERIALS {
            let kg = self.recipe.kg_per_load(m);
            if !kg.is_finite() || kg < 0.0 {
                return Err(format!("配方 {} 的用量必须为非负数: {}", m, kg));
            }
        }
        if !self.load_volume_m3.is_finite() || self.load_volume_m3 <= 0.0 {
            return Err(format!("单车方量必须为正数: {}", self.load_volume_m3));
        }
        if !self.stock_min_threshold_kg.is_finite() || self.stock_min_threshold_kg < 0.0 {
            return Err(format!(
                "低库存阈值必须为非负数: {}",
                self.stock_min_threshold_kg
            ));
        }
        if self.log_capacity == 0 {
            return Err("流水窗口容量必须大于 0".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profile_is_valid() {
        let profile = PlantProfile::default();
        assert!(profile.validate().is_ok());
        assert_eq!(profile.fine_sand_target, Some(Material::AreiaMedia));
        assert_eq!(profile.log_capacity, 50);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let profile: PlantProfile =
            serde_json::from_str(r#"{"fine_sand_target": null, "number_style": "en"}"#).unwrap();
        assert_eq!(profile.fine_sand_target, None);
        assert_eq!(profile.number_style, NumberStyle::En);
        assert_eq!(profile.load_volume_m3, 8.0);
    }

    #[test]
    fn test_invalid_profile_rejected() {
        let mut profile = PlantProfile::default();
        profile.load_volume_m3 = 0.0;
        assert!(profile.validate().is_err());

        let mut profile = PlantProfile::default();
        profile.recipe.0[Material::Brita1] = -1.0;
        assert!(profile.validate().is_err());
    }
}
