// ==========================================
// 混凝土库存台账 - 库存流水领域模型
// ==========================================
// 职责: 台账每次变更的不可变记录 + 有界最近流水窗口
// 红线: 所有台账写入必须记录流水；流水创建后不可修改
// 容量: 最多保留 50 条，最新在前
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::domain::material::Material;

/// 流水窗口默认容量
pub const DEFAULT_LOG_CAPACITY: usize = 50;

// ==========================================
// TransactionType - 流水类型
// ==========================================
// 别名兼容旧版存储 (INVOICE / SCALE_REPORT)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    #[serde(alias = "INVOICE")]
    ManualEntry, // 人工入库 / 盘点调整
    #[serde(alias = "SCALE_REPORT")]
    ScaleDeduction, // 过磅单扣减
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::ManualEntry => "MANUAL_ENTRY",
            TransactionType::ScaleDeduction => "SCALE_DEDUCTION",
        }
    }
}

// ==========================================
// Transaction - 库存流水
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub tx_type: TransactionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<Material>, // 过磅扣减跨多物料时为空
    pub quantity: f64, // kg
    #[serde(default)]
    pub details: String,
}

impl Transaction {
    /// 创建新流水（生成 UUID 与当前时间戳）
    pub fn new(
        tx_type: TransactionType,
        material: Option<Material>,
        quantity: f64,
        details: String,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            tx_type,
            material,
            quantity,
            details,
        }
    }
}

// ==========================================
// TransactionLog - 有界流水窗口
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionLog {
    entries: VecDeque<Transaction>, // 下标 0 为最新
    capacity: usize,
}

impl TransactionLog {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// 从已保存的流水（最新在前）恢复，超出容量的旧流水被丢弃
    pub fn restore(entries: Vec<Transaction>, capacity: usize) -> Self {
        let mut log = Self::new(capacity);
        log.entries = entries.into_iter().take(log.capacity).collect();
        log
    }

    /// 追加流水；达到容量时淘汰最旧的一条
    pub fn push(&mut self, tx: Transaction) {
        if self.entries.len() >= self.capacity {
            self.entries.pop_back();
        }
        self.entries.push_front(tx);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 最新在前遍历
    pub fn iter(&self) -> impl Iterator<Item = &Transaction> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&Transaction> {
        self.entries.front()
    }

    /// 最近 n 条
    pub fn recent(&self, n: usize) -> Vec<Transaction> {
        self.entries.iter().take(n).cloned().collect()
    }

    pub fn to_vec(&self) -> Vec<Transaction> {
        self.entries.iter().cloned().collect()
    }

    /// 某物料最近一次人工入库/调整
    pub fn last_manual_entry(&self, material: Material) -> Option<&Transaction> {
        self.entries
            .iter()
            .find(|t| t.tx_type == TransactionType::ManualEntry && t.material == Some(material))
    }

    /// 最近一次过磅扣减
    pub fn last_scale_deduction(&self) -> Option<&Transaction> {
        self.entries
            .iter()
            .find(|t| t.tx_type == TransactionType::ScaleDeduction)
    }
}

impl Default for TransactionLog {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_CAPACITY)
    }
}
