// ==========================================
// 混凝土库存台账 - 物料目录领域模型
// ==========================================
// 职责: 定义受控物料（两种碎石、两种砂）与单车配方
// 红线: 物料集合封闭，新增物料必须修改枚举（编译期穷尽检查）
// ==========================================

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

/// 库存下限阈值（kg），低于该值标记为低库存
pub const STOCK_MIN_THRESHOLD_KG: f64 = 50_000.0;

/// 单车（标准一车）混凝土方量（m³）
pub const LOAD_VOLUME_M3: f64 = 8.0;

/// 物料数量（目录固定）
pub const MATERIAL_COUNT: usize = 4;

// ==========================================
// Material - 物料
// ==========================================
// 序列化名与台账存储的键一致
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Material {
    #[serde(rename = "Brita 0")]
    Brita0, // 碎石 0 号
    #[serde(rename = "Brita 1")]
    Brita1, // 碎石 1 号
    #[serde(rename = "Areia Média")]
    AreiaMedia, // 中砂
    #[serde(rename = "Areia de Brita")]
    AreiaBrita, // 机制砂
}

/// 目录顺序（展示、报表均按此顺序）
pub const MATERIALS: [Material; MATERIAL_COUNT] = [
    Material::Brita0,
    Material::Brita1,
    Material::AreiaMedia,
    Material::AreiaBrita,
];

impl Material {
    /// 目录中的显示名称
    pub fn label(&self) -> &'static str {
        match self {
            Material::Brita0 => "Brita 0",
            Material::Brita1 => "Brita 1",
            Material::AreiaMedia => "Areia Média",
            Material::AreiaBrita => "Areia de Brita",
        }
    }

    /// 简写（用于过磅扣减摘要）
    pub fn short_code(&self) -> &'static str {
        match self {
            Material::Brita0 => "B0",
            Material::Brita1 => "B1",
            Material::AreiaMedia => "AM",
            Material::AreiaBrita => "AB",
        }
    }

    /// 目录下标
    pub fn index(&self) -> usize {
        match self {
            Material::Brita0 => 0,
            Material::Brita1 => 1,
            Material::AreiaMedia => 2,
            Material::AreiaBrita => 3,
        }
    }

    /// 从显示名称或简写解析（忽略大小写）
    pub fn from_str(s: &str) -> Option<Self> {
        let needle = s.trim();
        MATERIALS.iter().copied().find(|m| {
            m.label().eq_ignore_ascii_case(needle) || m.short_code().eq_ignore_ascii_case(needle)
        })
    }
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ==========================================
// MaterialMap - 按物料索引的定长映射
// ==========================================
// 每个物料恰有一个条目，不存在"缺键"状态
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialMap<T> {
    values: [T; MATERIAL_COUNT],
}

impl<T> MaterialMap<T> {
    pub fn from_fn(mut f: impl FnMut(Material) -> T) -> Self {
        Self {
            values: MATERIALS.map(&mut f),
        }
    }

    pub fn get(&self, material: Material) -> &T {
        &self.values[material.index()]
    }

    /// 按目录顺序遍历
    pub fn iter(&self) -> impl Iterator<Item = (Material, &T)> {
        MATERIALS.iter().copied().zip(self.values.iter())
    }

    pub fn map<U>(&self, mut f: impl FnMut(Material, &T) -> U) -> MaterialMap<U> {
        MaterialMap::from_fn(|m| f(m, &self.values[m.index()]))
    }
}

impl<T: Copy> MaterialMap<T> {
    pub fn filled(value: T) -> Self {
        Self {
            values: [value; MATERIAL_COUNT],
        }
    }
}

impl MaterialMap<f64> {
    pub fn zeros() -> Self {
        Self::filled(0.0)
    }

    /// 所有物料数量之和
    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }
}

impl<T: Default> Default for MaterialMap<T> {
    fn default() -> Self {
        Self::from_fn(|_| T::default())
    }
}

impl<T> Index<Material> for MaterialMap<T> {
    type Output = T;

    fn index(&self, material: Material) -> &T {
        &self.values[material.index()]
    }
}

impl<T> IndexMut<Material> for MaterialMap<T> {
    fn index_mut(&mut self, material: Material) -> &mut T {
        &mut self.values[material.index()]
    }
}

// 序列化为 {"Brita 0": ..., ...} 对象
impl<T: Serialize> Serialize for MaterialMap<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(MATERIAL_COUNT))?;
        for (material, value) in self.iter() {
            map.serialize_entry(&material, value)?;
        }
        map.end()
    }
}

struct MaterialMapVisitor<T>(PhantomData<T>);

impl<'de, T: Deserialize<'de>> Visitor<'de> for MaterialMapVisitor<T> {
    type Value = MaterialMap<T>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object with one entry per catalog material")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut entries: BTreeMap<Material, T> = BTreeMap::new();
        while let Some((material, value)) = access.next_entry::<Material, T>()? {
            entries.insert(material, value);
        }

        let mut values: [Option<T>; MATERIAL_COUNT] = [None, None, None, None];
        for (material, value) in entries {
            values[material.index()] = Some(value);
        }

        let mut out = Vec::with_capacity(MATERIAL_COUNT);
        for (material, value) in MATERIALS.iter().zip(values) {
            match value {
                Some(v) => out.push(v),
                None => return Err(de::Error::missing_field(material.label())),
            }
        }

        let values: [T; MATERIAL_COUNT] = out
            .try_into()
            .map_err(|_| de::Error::custom("material count mismatch"))?;
        Ok(MaterialMap { values })
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for MaterialMap<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(MaterialMapVisitor(PhantomData))
    }
}

// ==========================================
// Recipe - 单车配方
// ==========================================
// 每车消耗的各物料公斤数，配方为 0 表示该物料不参与产能约束
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Recipe(pub MaterialMap<f64>);

/// 默认配方（kg/车）
pub const DEFAULT_RECIPE_KG: [f64; MATERIAL_COUNT] = [2000.0, 6000.0, 6000.0, 1300.0];

impl Recipe {
    pub fn kg_per_load(&self, material: Material) -> f64 {
        self.0[material]
    }
}

impl Default for Recipe {
    fn default() -> Self {
        Recipe(MaterialMap::from_fn(|m| DEFAULT_RECIPE_KG[m.index()]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_order_matches_index() {
        for (i, m) in MATERIALS.iter().enumerate() {
            assert_eq!(m.index(), i);
        }
    }

    #[test]
    fn test_material_from_str() {
        assert_eq!(Material::from_str("brita 0"), Some(Material::Brita0));
        assert_eq!(Material::from_str("AB"), Some(Material::AreiaBrita));
        assert_eq!(Material::from_str("Areia Média"), Some(Material::AreiaMedia));
        assert_eq!(Material::from_str("AREIA FINA"), None);
    }

    #[test]
    fn test_material_map_serde_uses_labels() {
        let map = MaterialMap::from_fn(|m| m.index() as f64);
        let json = serde_json::to_string(&map).unwrap();
        assert!(json.contains("\"Brita 0\":0.0"));
        assert!(json.contains("\"Areia de Brita\":3.0"));

        let back: MaterialMap<f64> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
    }

    #[test]
    fn test_material_map_rejects_missing_material() {
        let json = r#"{"Brita 0": 1.0, "Brita 1": 2.0, "Areia Média": 3.0}"#;
        let result: Result<MaterialMap<f64>, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_default_recipe() {
        let recipe = Recipe::default();
        assert_eq!(recipe.kg_per_load(Material::Brita0), 2000.0);
        assert_eq!(recipe.kg_per_load(Material::AreiaBrita), 1300.0);
    }
}
