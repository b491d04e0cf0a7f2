// ==========================================
// 混凝土库存台账 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，区分需重新配置凭证与一般重试
// 红线: 任何错误都不得使台账处于部分修改状态
// ==========================================

use thiserror::Error;

use crate::api::validator::QuantityError;
use crate::extraction::ExtractionError;
use crate::repository::error::RepositoryError;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 输入校验错误
    // ==========================================
    #[error("无效数量 '{input}': {reason}")]
    InvalidQuantity { input: String, reason: QuantityError },

    // ==========================================
    // 过磅单对账错误
    // ==========================================
    #[error("已有过磅单正在处理")]
    ReconcileInProgress,

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("持久化失败（台账未变动）: {0}")]
    Persistence(#[from] RepositoryError),

    #[error("状态锁获取失败: {0}")]
    LockError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),
}

impl ApiError {
    /// 是否应提示用户重新配置识别服务凭证
    pub fn requires_reauth(&self) -> bool {
        matches!(self, ApiError::Extraction(e) if e.is_credential_error())
    }

    /// 是否为输入校验错误
    pub fn is_validation(&self) -> bool {
        matches!(self, ApiError::InvalidQuantity { .. })
    }

    /// 面向用户的提示（按当前语言）
    pub fn user_message(&self) -> String {
        let key = match self {
            ApiError::InvalidQuantity { .. } => "error.invalid_quantity",
            ApiError::ReconcileInProgress => "reconcile.in_progress",
            ApiError::Extraction(e) if e.is_credential_error() => "error.reauth",
            ApiError::Extraction(_) => "error.retry",
            ApiError::Persistence(_) => "error.persistence",
            ApiError::LockError(_) | ApiError::InternalError(_) => "error.retry",
        };
        crate::i18n::t(key)
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
