use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use opsboard_domain::repositories::{BoardRepository, TaskRepository};

use crate::auth::{auth_middleware, AuthConfig, SessionVerifier};
use crate::handlers::{
    boards::{archive_board, create_board, get_board, list_boards, update_board},
    health::health_check,
    tasks::{create_task, delete_task, get_task, list_tasks, move_task, update_task},
};

/// API应用状态
#[derive(Clone)]
pub struct AppState {
    pub board_repo: Arc<dyn BoardRepository>,
    pub task_repo: Arc<dyn TaskRepository>,
    pub session_verifier: Arc<dyn SessionVerifier>,
    pub auth_config: Arc<AuthConfig>,
}

/// 创建API路由
pub fn create_routes(state: AppState) -> Router {
    let protected = Router::new()
        // 看板管理API
        .route("/boards", get(list_boards).post(create_board))
        .route(
            "/boards/{id}",
            get(get_board).put(update_board).delete(archive_board),
        )
        // 任务管理API，/tasks/move 是排序引擎的显式移动入口
        .route("/tasks", get(list_tasks).post(create_task))
        .route("/tasks/move", post(move_task))
        .route(
            "/tasks/{id}",
            get(get_task).put(update_task).delete(delete_task),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // 健康检查不要求会话
    Router::new()
        .route("/health", get(health_check))
        .merge(protected)
        .with_state(state)
}
