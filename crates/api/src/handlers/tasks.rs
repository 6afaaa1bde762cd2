use axum::extract::{Path, Query, State};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use opsboard_domain::entities::{Board, NewTask, Task, TaskChanges, TaskPriority, TaskStatus};
use opsboard_errors::OpsboardError;

use crate::{
    auth::CurrentUser,
    error::{ApiError, ApiResult},
    extract::ApiJson,
    response::{created, success},
    routes::AppState,
    validation,
};

/// 任务创建请求，position 不可指定，由排序引擎追加到目标列末尾
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    pub board_id: i64,
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub status: TaskStatus,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub assigned_to: Option<String>,
}

/// 任务部分更新请求
///
/// position 与 boardId 出现即拒绝: 前者只能经 /tasks/move 变更，后者创建后不可变。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<DateTime<Utc>>,
    pub tags: Option<Vec<String>>,
    pub assigned_to: Option<String>,
    pub position: Option<i64>,
    pub board_id: Option<i64>,
}

/// 显式移动请求
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveTaskRequest {
    pub task_id: i64,
    pub new_status: TaskStatus,
    pub new_position: i64,
}

/// 任务列表查询参数
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskQueryParams {
    pub board_id: Option<i64>,
}

/// 任务及其所属看板
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskWithBoard {
    #[serde(flatten)]
    pub task: Task,
    pub board: Board,
}

/// 创建任务，追加到 (boardId, status) 分区末尾
pub async fn create_task(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiJson(request): ApiJson<CreateTaskRequest>,
) -> ApiResult<impl axum::response::IntoResponse> {
    validation::task::validate_task_title(&request.title)?;
    validation::validate_tags(&request.tags)?;
    if let Some(assigned_to) = &request.assigned_to {
        validation::task::validate_assigned_to(assigned_to)?;
    }

    let new_task = NewTask {
        board_id: request.board_id,
        title: request.title,
        description: request.description,
        status: request.status,
        priority: request.priority,
        due_date: request.due_date,
        tags: request.tags,
        assigned_to: request.assigned_to,
    };
    let task = state.task_repo.create(&new_task, user.user_id).await?;

    info!(
        "用户 {} 在看板 {} 创建了任务 '{}' ({:?}/{})",
        user.user_id, task.board_id, task.title, task.status, task.position
    );

    Ok(created(task))
}

/// 获取指定看板下的任务，按 (状态列顺序, 序号) 返回
pub async fn list_tasks(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(params): Query<TaskQueryParams>,
) -> ApiResult<impl axum::response::IntoResponse> {
    let board_id = params
        .board_id
        .ok_or_else(|| ApiError::BadRequest("缺少 boardId 查询参数".to_string()))?;

    let tasks = state.task_repo.list_by_board(board_id, user.user_id).await?;

    Ok(success(tasks))
}

/// 获取单个任务及其所属看板
pub async fn get_task(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<impl axum::response::IntoResponse> {
    let task = state
        .task_repo
        .get_by_id(id, user.user_id)
        .await?
        .ok_or_else(|| OpsboardError::task_not_found(id))?;

    let board = state
        .board_repo
        .get_by_id(task.board_id, user.user_id)
        .await?
        .ok_or_else(|| OpsboardError::board_not_found(task.board_id))?;

    Ok(success(TaskWithBoard { task, board }))
}

/// 部分更新任务字段，status 变更走追加语义落到目标列末尾
pub async fn update_task(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    ApiJson(request): ApiJson<UpdateTaskRequest>,
) -> ApiResult<impl axum::response::IntoResponse> {
    if request.position.is_some() {
        return Err(ApiError::BadRequest(
            "position 不允许直接修改，请使用 POST /tasks/move 调整顺序".to_string(),
        ));
    }
    if request.board_id.is_some() {
        return Err(ApiError::BadRequest(
            "boardId 在任务创建后不可变更".to_string(),
        ));
    }

    if let Some(title) = &request.title {
        validation::task::validate_task_title(title)?;
    }
    if let Some(tags) = &request.tags {
        validation::validate_tags(tags)?;
    }
    if let Some(assigned_to) = &request.assigned_to {
        validation::task::validate_assigned_to(assigned_to)?;
    }

    let changes = TaskChanges {
        title: request.title,
        description: request.description,
        status: request.status,
        priority: request.priority,
        due_date: request.due_date,
        tags: request.tags,
        assigned_to: request.assigned_to,
    };
    // 全缺省的请求体视为无变更: 不触发仓储写入，原样返回当前任务
    if changes.is_empty() {
        let task = state
            .task_repo
            .get_by_id(id, user.user_id)
            .await?
            .ok_or_else(|| OpsboardError::task_not_found(id))?;
        return Ok(success(task));
    }
    let task = state.task_repo.update_fields(id, user.user_id, &changes).await?;

    Ok(success(task))
}

/// 任务不支持物理删除，始终拒绝
pub async fn delete_task(
    user: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<axum::response::Response> {
    warn!("用户 {} 尝试删除任务 ID {}，已拒绝", user.user_id, id);

    Err(ApiError::Forbidden(
        "任务不允许删除，如需移出视野请调整任务状态或归档所属看板".to_string(),
    ))
}

/// 显式移动任务到目标 (状态, 序号)，两侧分区在同一事务内重排
pub async fn move_task(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiJson(request): ApiJson<MoveTaskRequest>,
) -> ApiResult<impl axum::response::IntoResponse> {
    validation::task::validate_move_position(request.new_position)?;

    let task = state
        .task_repo
        .move_task(
            request.task_id,
            user.user_id,
            request.new_status,
            request.new_position,
        )
        .await?;

    info!(
        "用户 {} 移动了任务 ID {} 到 {:?}/{}",
        user.user_id, task.id, task.status, task.position
    );

    Ok(success(task))
}
