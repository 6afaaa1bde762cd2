use thiserror::Error;

#[derive(Debug, Error)]
pub enum OpsboardError {
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),
    #[error("数据库操作错误: {0}")]
    DatabaseOperation(String),
    #[error("看板未找到: {id}")]
    BoardNotFound { id: i64 },
    #[error("任务未找到: {id}")]
    TaskNotFound { id: i64 },
    #[error("会话未认证或已过期")]
    Unauthorized,
    #[error("操作被禁止: {0}")]
    Forbidden(String),
    #[error("并发冲突: {0}")]
    Conflict(String),
    #[error("数据验证失败: {0}")]
    ValidationError(String),
    #[error("操作超时: {0}")]
    Timeout(String),
    #[error("序列化错误: {0}")]
    Serialization(String),
    #[error("配置错误: {0}")]
    Configuration(String),
    #[error("内部错误: {0}")]
    Internal(String),
}

pub type OpsboardResult<T> = Result<T, OpsboardError>;

impl OpsboardError {
    pub fn database_error<S: Into<String>>(msg: S) -> Self {
        Self::DatabaseOperation(msg.into())
    }
    pub fn board_not_found(id: i64) -> Self {
        Self::BoardNotFound { id }
    }
    pub fn task_not_found(id: i64) -> Self {
        Self::TaskNotFound { id }
    }
    pub fn forbidden<S: Into<String>>(msg: S) -> Self {
        Self::Forbidden(msg.into())
    }
    pub fn conflict<S: Into<String>>(msg: S) -> Self {
        Self::Conflict(msg.into())
    }
    pub fn config_error<S: Into<String>>(msg: S) -> Self {
        Self::Configuration(msg.into())
    }
    pub fn validation_error<S: Into<String>>(msg: S) -> Self {
        Self::ValidationError(msg.into())
    }
    pub fn timeout_error<S: Into<String>>(msg: S) -> Self {
        Self::Timeout(msg.into())
    }
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            OpsboardError::Internal(_) | OpsboardError::Configuration(_)
        )
    }
    /// 冲突类错误可以由调用方原样重试
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            OpsboardError::Conflict(_)
                | OpsboardError::DatabaseOperation(_)
                | OpsboardError::Timeout(_)
        )
    }
    pub fn user_message(&self) -> &str {
        match self {
            OpsboardError::BoardNotFound { .. } => "请求的看板不存在",
            OpsboardError::TaskNotFound { .. } => "请求的任务不存在",
            OpsboardError::Unauthorized => "会话无效，请重新登录",
            OpsboardError::Forbidden(_) => "该操作不被允许",
            OpsboardError::Conflict(_) => "检测到并发修改，请重试",
            OpsboardError::ValidationError(_) => "输入数据验证失败",
            OpsboardError::Timeout(_) => "操作超时，请稍后重试",
            _ => "系统繁忙，请稍后重试",
        }
    }
}

impl From<serde_json::Error> for OpsboardError {
    fn from(err: serde_json::Error) -> Self {
        OpsboardError::Serialization(err.to_string())
    }
}

impl From<anyhow::Error> for OpsboardError {
    fn from(err: anyhow::Error) -> Self {
        OpsboardError::Internal(err.to_string())
    }
}
