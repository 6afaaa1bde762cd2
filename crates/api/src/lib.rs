//! # Opsboard API
//!
//! 运维任务看板的REST API模块，基于Axum框架构建。
//!
//! ## 概述
//!
//! 对外暴露看板与任务的HTTP JSON接口，核心是任务的排序引擎：
//! 每个 (boardId, status) 分区内的任务序号连续且从0开始，
//! 创建追加到列尾，显式移动在单个事务内完成两侧分区的重排。
//!
//! ## API 端点
//!
//! ### 看板管理
//! - `GET /boards` - 获取名下未归档看板，含任务列表
//! - `POST /boards` - 创建看板
//! - `GET /boards/{id}` - 获取看板详情（归档看板仍可访问）
//! - `PUT /boards/{id}` - 部分更新看板
//! - `DELETE /boards/{id}` - 归档看板（软删除）
//!
//! ### 任务管理
//! - `GET /tasks?boardId=` - 获取看板下按列序排列的任务
//! - `POST /tasks` - 创建任务（追加到目标列末尾）
//! - `GET /tasks/{id}` - 获取任务详情及所属看板
//! - `PUT /tasks/{id}` - 部分更新任务（status 变更走追加语义）
//! - `DELETE /tasks/{id}` - 始终拒绝（403），任务不支持物理删除
//! - `POST /tasks/move` - 显式移动任务到目标 (状态, 序号)
//!
//! ### 系统
//! - `GET /health` - 健康检查，不要求会话
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! use opsboard_api::{create_app, ApiConfig};
//! use std::sync::Arc;
//!
//! let app = create_app(board_repo, task_repo, session_verifier, ApiConfig::default());
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, app).await?;
//! ```
//!
//! ## 认证
//!
//! 除 `/health` 外的所有端点都要求会话令牌，通过
//! `Authorization: Bearer <token>` 或 `X-Session-Token` 请求头传递。
//! 会话签发属于外部身份服务，API层只经 [`auth::SessionVerifier`]
//! 把令牌解析为调用者身份，所有归属校验都显式携带该身份进行。

pub mod auth;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod validation;

use std::sync::Arc;

use axum::Router;
use tower::ServiceBuilder;

use opsboard_domain::repositories::{BoardRepository, TaskRepository};

use auth::{AuthConfig, SessionVerifier};
use middleware::{cors_layer, request_logging, timeout_layer, trace_layer};
use routes::{create_routes, AppState};

/// API层配置，监听地址等部署参数由二进制入口持有
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub cors_enabled: bool,
    pub request_timeout_seconds: u64,
    pub auth: AuthConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            cors_enabled: true,
            request_timeout_seconds: 30,
            auth: AuthConfig::default(),
        }
    }
}

/// 创建完整的API应用
pub fn create_app(
    board_repo: Arc<dyn BoardRepository>,
    task_repo: Arc<dyn TaskRepository>,
    session_verifier: Arc<dyn SessionVerifier>,
    api_config: ApiConfig,
) -> Router {
    let state = AppState {
        board_repo,
        task_repo,
        session_verifier,
        auth_config: Arc::new(api_config.auth),
    };

    let app = create_routes(state).layer(
        ServiceBuilder::new()
            .layer(trace_layer())
            .layer(timeout_layer(api_config.request_timeout_seconds))
            .layer(axum::middleware::from_fn(request_logging)),
    );

    if api_config.cors_enabled {
        app.layer(cors_layer())
    } else {
        app
    }
}
