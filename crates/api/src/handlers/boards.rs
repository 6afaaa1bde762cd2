use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};
use tracing::info;

use opsboard_domain::entities::{Board, BoardChanges, NewBoard, Task};
use opsboard_errors::OpsboardError;

use crate::{
    auth::CurrentUser,
    error::ApiResult,
    extract::ApiJson,
    response::{created, success, ApiResponse},
    routes::AppState,
    validation,
};

/// 看板创建请求
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBoardRequest {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub color: Option<String>,
}

/// 看板部分更新请求，缺省字段保持原值
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBoardRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
    pub color: Option<String>,
    pub is_archived: Option<bool>,
}

/// 看板及其按 (状态列, 序号) 排列的任务
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardWithTasks {
    #[serde(flatten)]
    pub board: Board,
    pub tasks: Vec<Task>,
    pub task_count: usize,
}

/// 创建看板
pub async fn create_board(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiJson(request): ApiJson<CreateBoardRequest>,
) -> ApiResult<impl axum::response::IntoResponse> {
    validation::board::validate_board_name(&request.name)?;
    validation::validate_tags(&request.tags)?;
    if let Some(color) = &request.color {
        validation::board::validate_board_color(color)?;
    }

    let new_board = NewBoard {
        name: request.name,
        description: request.description,
        tags: request.tags,
        color: request.color,
        owner_id: user.user_id,
    };
    let board = state.board_repo.create(&new_board).await?;

    info!(
        "用户 {} 创建了看板 '{}' (ID: {})",
        user.user_id, board.name, board.id
    );

    Ok(created(BoardWithTasks {
        board,
        tasks: Vec::new(),
        task_count: 0,
    }))
}

/// 获取调用者名下所有未归档看板，含各自的任务列表
pub async fn list_boards(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<impl axum::response::IntoResponse> {
    let boards = state.board_repo.list_active(user.user_id).await?;

    let mut result = Vec::with_capacity(boards.len());
    for board in boards {
        let tasks = state.task_repo.list_by_board(board.id, user.user_id).await?;
        let task_count = tasks.len();
        result.push(BoardWithTasks {
            board,
            tasks,
            task_count,
        });
    }

    Ok(success(result))
}

/// 获取单个看板及其任务，归档看板仍可按ID访问
pub async fn get_board(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<impl axum::response::IntoResponse> {
    let board = state
        .board_repo
        .get_by_id(id, user.user_id)
        .await?
        .ok_or_else(|| OpsboardError::board_not_found(id))?;

    let tasks = state.task_repo.list_by_board(board.id, user.user_id).await?;
    let task_count = tasks.len();

    Ok(success(BoardWithTasks {
        board,
        tasks,
        task_count,
    }))
}

/// 部分更新看板字段
pub async fn update_board(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    ApiJson(request): ApiJson<UpdateBoardRequest>,
) -> ApiResult<impl axum::response::IntoResponse> {
    if let Some(name) = &request.name {
        validation::board::validate_board_name(name)?;
    }
    if let Some(tags) = &request.tags {
        validation::validate_tags(tags)?;
    }
    if let Some(color) = &request.color {
        validation::board::validate_board_color(color)?;
    }

    let changes = BoardChanges {
        name: request.name,
        description: request.description,
        tags: request.tags,
        color: request.color,
        is_archived: request.is_archived,
    };
    // 全缺省的请求体视为无变更: 不触发仓储写入，原样返回当前看板
    if changes.is_empty() {
        let board = state
            .board_repo
            .get_by_id(id, user.user_id)
            .await?
            .ok_or_else(|| OpsboardError::board_not_found(id))?;
        return Ok(success(board));
    }
    let board = state.board_repo.update(id, user.user_id, &changes).await?;

    Ok(success(board))
}

/// 归档看板，即对外的"删除"语义，任务保留且看板仍可按ID查询
pub async fn archive_board(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<impl axum::response::IntoResponse> {
    state.board_repo.archive(id, user.user_id).await?;

    info!("用户 {} 归档了看板 ID {}", user.user_id, id);

    Ok(ApiResponse::success_empty_with_message(format!(
        "看板 ID {id} 已归档"
    )))
}
