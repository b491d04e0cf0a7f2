// ==========================================
// 混凝土库存台账 - 过磅单识别错误类型
// ==========================================
// 工具: thiserror 派生宏
// 分类: 凭证类（需重新配置） / 格式类（可重试） / 服务类（可重试）
// ==========================================

use thiserror::Error;

/// 识别协作方错误类型
#[derive(Error, Debug)]
pub enum ExtractionError {
    // ===== 凭证错误 =====
    #[error("识别服务凭证未配置")]
    MissingCredential,

    #[error("识别服务凭证无效: {0}")]
    InvalidCredential(String),

    // ===== 输入错误 =====
    #[error("不支持的单据类型: {0}")]
    UnsupportedMediaType(String),

    #[error("单据内容为空")]
    EmptyDocument,

    // ===== 输出格式错误 =====
    #[error("识别结果格式错误: {0}")]
    MalformedOutput(String),

    // ===== 服务错误 =====
    #[error("识别服务调用失败: {0}")]
    Service(String),
}

impl ExtractionError {
    /// 是否需要提示用户重新配置凭证
    pub fn is_credential_error(&self) -> bool {
        matches!(
            self,
            ExtractionError::MissingCredential | ExtractionError::InvalidCredential(_)
        )
    }

    /// 错误分类代码（用于日志与前端展示）
    pub fn kind(&self) -> &'static str {
        match self {
            ExtractionError::MissingCredential | ExtractionError::InvalidCredential(_) => {
                "CREDENTIAL"
            }
            ExtractionError::MalformedOutput(_) => "FORMAT",
            ExtractionError::UnsupportedMediaType(_) | ExtractionError::EmptyDocument => "INPUT",
            ExtractionError::Service(_) => "SERVICE",
        }
    }
}

// 实现 From<serde_json::Error>
impl From<serde_json::Error> for ExtractionError {
    fn from(err: serde_json::Error) -> Self {
        ExtractionError::MalformedOutput(err.to_string())
    }
}

/// Result 类型别名
pub type ExtractionResult<T> = Result<T, ExtractionError>;
