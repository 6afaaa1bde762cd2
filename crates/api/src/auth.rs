//! 会话认证
//!
//! 会话的签发由外部身份服务负责，这里只做令牌到调用者身份的解析：
//! 中间件从请求头提取令牌，经 `SessionVerifier` 校验后把 `CurrentUser`
//! 注入请求扩展，处理器通过提取器声明取用。

use std::collections::HashMap;

use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    middleware::Next,
    response::Response,
};
use headers::{authorization::Bearer, Authorization, HeaderMapExt};
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

use opsboard_errors::OpsboardResult;

use crate::error::ApiError;

pub const SESSION_TOKEN_HEADER: &str = "X-Session-Token";

/// 认证配置
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub enabled: bool,
    /// 认证关闭时注入的开发身份
    pub dev_user_id: i64,
    pub dev_username: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dev_user_id: 0,
            dev_username: "dev".to_string(),
        }
    }
}

/// 经会话解析出的调用者身份
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub user_id: i64,
    pub username: String,
}

#[derive(Debug, PartialEq, Eq)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    MalformedHeader,
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingToken => write!(f, "Missing session token"),
            AuthError::InvalidToken => write!(f, "Invalid session token"),
            AuthError::MalformedHeader => write!(f, "Malformed authorization header"),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<AuthError> for StatusCode {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingToken | AuthError::InvalidToken => StatusCode::UNAUTHORIZED,
            AuthError::MalformedHeader => StatusCode::BAD_REQUEST,
        }
    }
}

/// 会话校验端口，生产部署由外部身份服务提供实现
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionVerifier: Send + Sync {
    /// 解析令牌对应的调用者身份，令牌无效时返回 None
    async fn verify(&self, token: &str) -> OpsboardResult<Option<CurrentUser>>;
}

/// 内存会话存储，供嵌入式部署和测试使用
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, CurrentUser>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 为指定用户签发一个新令牌
    pub async fn issue(&self, user: CurrentUser) -> String {
        let token = Uuid::new_v4().to_string();
        self.sessions.write().await.insert(token.clone(), user);
        token
    }

    pub async fn revoke(&self, token: &str) -> bool {
        self.sessions.write().await.remove(token).is_some()
    }
}

#[async_trait]
impl SessionVerifier for InMemorySessionStore {
    async fn verify(&self, token: &str) -> OpsboardResult<Option<CurrentUser>> {
        Ok(self.sessions.read().await.get(token).cloned())
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(ApiError::Authentication(AuthError::MissingToken))
    }
}

/// 认证中间件: 解析会话令牌并把调用者身份注入请求扩展
pub async fn auth_middleware(
    State(state): State<crate::routes::AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if !state.auth_config.enabled {
        // 认证关闭时注入配置的开发身份
        req.extensions_mut().insert(CurrentUser {
            user_id: state.auth_config.dev_user_id,
            username: state.auth_config.dev_username.clone(),
        });
        return Ok(next.run(req).await);
    }

    let token = extract_session_token(&req)?.ok_or(AuthError::MissingToken)?;
    match state.session_verifier.verify(&token).await? {
        Some(user) => {
            debug!("会话解析成功: 用户 {} ({})", user.user_id, user.username);
            req.extensions_mut().insert(user);
            Ok(next.run(req).await)
        }
        None => {
            warn!("会话令牌无效，拒绝请求: {} {}", req.method(), req.uri());
            Err(ApiError::Authentication(AuthError::InvalidToken))
        }
    }
}

/// 从请求头提取会话令牌，优先 Authorization: Bearer，其次 X-Session-Token
fn extract_session_token(req: &Request) -> Result<Option<String>, AuthError> {
    if req.headers().contains_key(AUTHORIZATION) {
        let token = req
            .headers()
            .typed_get::<Authorization<Bearer>>()
            .map(|auth| auth.token().to_string())
            .ok_or(AuthError::MalformedHeader)?;
        return Ok(Some(token));
    }

    Ok(req
        .headers()
        .get(SESSION_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string()))
}
