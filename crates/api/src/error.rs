use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use opsboard_errors::OpsboardError;
use serde_json::json;

use crate::auth::AuthError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("看板服务错误: {0}")]
    Opsboard(#[from] OpsboardError),

    #[error("验证错误: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("验证错误: {0}")]
    ValidationError(#[from] validator::ValidationError),

    #[error("序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("请求参数错误: {0}")]
    BadRequest(String),

    #[error("认证错误: {0}")]
    Authentication(#[from] AuthError),

    #[error("操作被禁止: {0}")]
    Forbidden(String),

    #[error("内部服务器错误: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message, error_type, suggestions) = match &self {
            ApiError::Opsboard(OpsboardError::BoardNotFound { id }) => (
                StatusCode::NOT_FOUND,
                format!("看板 ID {} 不存在", id),
                "BOARD_NOT_FOUND".to_string(),
                vec![
                    "请检查看板ID是否正确".to_string(),
                    "使用 GET /boards 查看名下所有看板".to_string(),
                ],
            ),
            ApiError::Opsboard(OpsboardError::TaskNotFound { id }) => (
                StatusCode::NOT_FOUND,
                format!("任务 ID {} 不存在", id),
                "TASK_NOT_FOUND".to_string(),
                vec![
                    "请检查任务ID是否正确".to_string(),
                    "使用 GET /tasks?boardId=<看板ID> 查看看板下的任务".to_string(),
                ],
            ),
            ApiError::Opsboard(OpsboardError::Unauthorized) => (
                StatusCode::UNAUTHORIZED,
                "缺少有效的调用者身份".to_string(),
                "UNAUTHORIZED".to_string(),
                vec!["请在请求头中携带 Authorization: Bearer <token>".to_string()],
            ),
            ApiError::Opsboard(OpsboardError::Forbidden(msg)) => (
                StatusCode::FORBIDDEN,
                msg.clone(),
                "FORBIDDEN".to_string(),
                vec!["该操作被策略明确禁止".to_string()],
            ),
            ApiError::Opsboard(OpsboardError::Conflict(msg)) => (
                StatusCode::CONFLICT,
                format!("并发冲突: {}", msg),
                "CONFLICT".to_string(),
                vec![
                    "同一看板列上的并发修改发生碰撞".to_string(),
                    "请重新获取最新状态后重试".to_string(),
                ],
            ),
            ApiError::Opsboard(OpsboardError::ValidationError(msg)) => (
                StatusCode::BAD_REQUEST,
                format!("请求参数验证失败: {}", msg),
                "VALIDATION_ERROR".to_string(),
                vec!["请检查请求参数是否符合要求".to_string()],
            ),
            ApiError::Validation(errors) => {
                let error_details: Vec<String> = errors
                    .field_errors()
                    .iter()
                    .map(|(field, errors)| {
                        let messages: Vec<String> =
                            errors.iter().map(|e| e.code.to_string()).collect();
                        format!("{}: {}", field, messages.join(", "))
                    })
                    .collect();

                (
                    StatusCode::BAD_REQUEST,
                    format!("请求参数验证失败: {}", error_details.join("; ")),
                    "VALIDATION_ERROR".to_string(),
                    vec!["请检查请求参数是否符合要求".to_string()],
                )
            }
            ApiError::ValidationError(error) => (
                StatusCode::BAD_REQUEST,
                format!("参数验证失败: {}", error.code),
                "VALIDATION_ERROR".to_string(),
                vec!["请检查请求参数格式".to_string()],
            ),
            ApiError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                format!("请求参数错误: {}", msg),
                "BAD_REQUEST".to_string(),
                vec![
                    "请检查请求格式和参数".to_string(),
                    "确保Content-Type正确设置".to_string(),
                ],
            ),
            ApiError::Authentication(auth_error) => {
                let (status, msg, suggestions) = match auth_error {
                    AuthError::MissingToken => (
                        StatusCode::UNAUTHORIZED,
                        "缺少会话令牌".to_string(),
                        vec![
                            "请在请求头中添加 Authorization: Bearer <token>".to_string(),
                            "或使用 X-Session-Token 请求头传递令牌".to_string(),
                        ],
                    ),
                    AuthError::InvalidToken => (
                        StatusCode::UNAUTHORIZED,
                        "会话令牌无效或已过期".to_string(),
                        vec!["请重新登录获取新的会话令牌".to_string()],
                    ),
                    AuthError::MalformedHeader => (
                        StatusCode::BAD_REQUEST,
                        "Authorization 请求头格式错误".to_string(),
                        vec!["格式应为 Authorization: Bearer <token>".to_string()],
                    ),
                };
                (status, msg, "AUTHENTICATION_ERROR".to_string(), suggestions)
            }
            ApiError::Forbidden(msg) => (
                StatusCode::FORBIDDEN,
                msg.clone(),
                "FORBIDDEN".to_string(),
                vec!["该操作被策略明确禁止".to_string()],
            ),
            ApiError::Serialization(err) => (
                StatusCode::BAD_REQUEST,
                "请求数据格式错误".to_string(),
                "SERIALIZATION_ERROR".to_string(),
                vec![
                    "请检查JSON格式是否正确".to_string(),
                    format!("详细错误: {}", err),
                ],
            ),
            ApiError::Opsboard(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "系统内部错误".to_string(),
                "INTERNAL_ERROR".to_string(),
                vec![
                    "系统遇到内部错误，请稍后重试".to_string(),
                    "如果问题持续存在，请联系系统管理员".to_string(),
                ],
            ),
            ApiError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "系统内部错误".to_string(),
                "INTERNAL_ERROR".to_string(),
                vec![
                    "系统遇到内部错误，请稍后重试".to_string(),
                    format!("错误详情: {}", msg),
                ],
            ),
        };

        let body = Json(json!({
            "error": {
                "message": error_message,
                "type": error_type,
                "code": status.as_u16(),
                "suggestions": suggestions,
                "timestamp": chrono::Utc::now().to_rfc3339(),
            }
        }));

        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
