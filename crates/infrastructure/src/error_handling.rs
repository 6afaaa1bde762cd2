//! Enhanced error handling for repository operations with rich context
//!
//! This module provides context-rich error helpers for board and task
//! repository operations, including entity information, operation context,
//! structured logging, and conflict classification for retryable failures.

use chrono::{DateTime, Utc};
use opsboard_errors::OpsboardError;
use sqlx::Error as SqlxError;
use std::fmt;
use tracing::{error, info, instrument};

/// Operation context for repository operations
#[derive(Debug, Clone)]
pub enum RepositoryOperation {
    Create,
    Read,
    Update,
    Archive,
    Query,
    Move,
}

impl fmt::Display for RepositoryOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepositoryOperation::Create => write!(f, "创建"),
            RepositoryOperation::Read => write!(f, "查询"),
            RepositoryOperation::Update => write!(f, "更新"),
            RepositoryOperation::Archive => write!(f, "归档"),
            RepositoryOperation::Query => write!(f, "查询"),
            RepositoryOperation::Move => write!(f, "移动"),
        }
    }
}

/// Context information for board repository operations
#[derive(Debug, Clone)]
pub struct BoardOperationContext {
    pub operation: RepositoryOperation,
    pub board_id: Option<i64>,
    pub board_name: Option<String>,
    pub owner_id: Option<i64>,
    pub timestamp: DateTime<Utc>,
    pub additional_info: Option<String>,
}

impl BoardOperationContext {
    pub fn new(operation: RepositoryOperation) -> Self {
        Self {
            operation,
            board_id: None,
            board_name: None,
            owner_id: None,
            timestamp: Utc::now(),
            additional_info: None,
        }
    }

    pub fn with_board_id(mut self, board_id: i64) -> Self {
        self.board_id = Some(board_id);
        self
    }

    pub fn with_board_name(mut self, board_name: String) -> Self {
        self.board_name = Some(board_name);
        self
    }

    pub fn with_owner_id(mut self, owner_id: i64) -> Self {
        self.owner_id = Some(owner_id);
        self
    }

    pub fn with_additional_info(mut self, info: String) -> Self {
        self.additional_info = Some(info);
        self
    }

    pub fn entity_description(&self) -> String {
        match (&self.board_id, &self.board_name) {
            (Some(id), Some(name)) => format!("看板 '{name}' (ID: {id})"),
            (Some(id), None) => format!("看板 (ID: {id})"),
            (None, Some(name)) => format!("看板 '{name}'"),
            (None, None) => "看板".to_string(),
        }
    }
}

/// Context information for task repository operations
#[derive(Debug, Clone)]
pub struct TaskOperationContext {
    pub operation: RepositoryOperation,
    pub task_id: Option<i64>,
    pub board_id: Option<i64>,
    pub owner_id: Option<i64>,
    pub timestamp: DateTime<Utc>,
    pub additional_info: Option<String>,
}

impl TaskOperationContext {
    pub fn new(operation: RepositoryOperation) -> Self {
        Self {
            operation,
            task_id: None,
            board_id: None,
            owner_id: None,
            timestamp: Utc::now(),
            additional_info: None,
        }
    }

    pub fn with_task_id(mut self, task_id: i64) -> Self {
        self.task_id = Some(task_id);
        self
    }

    pub fn with_board_id(mut self, board_id: i64) -> Self {
        self.board_id = Some(board_id);
        self
    }

    pub fn with_owner_id(mut self, owner_id: i64) -> Self {
        self.owner_id = Some(owner_id);
        self
    }

    pub fn with_additional_info(mut self, info: String) -> Self {
        self.additional_info = Some(info);
        self
    }

    pub fn entity_description(&self) -> String {
        match (&self.task_id, &self.board_id) {
            (Some(id), Some(board_id)) => format!("任务 (ID: {id}, 看板: {board_id})"),
            (Some(id), None) => format!("任务 (ID: {id})"),
            (None, Some(board_id)) => format!("看板 {board_id} 下的任务"),
            (None, None) => "任务".to_string(),
        }
    }
}

/// Enhanced error helpers for repository operations
pub struct RepositoryErrorHelpers;

impl RepositoryErrorHelpers {
    /// 判断数据库错误是否属于可重试的并发冲突
    ///
    /// PostgreSQL: 40001 序列化失败、40P01 死锁、23505 延迟唯一约束在提交时
    /// 命中（同分区并发移动/追加的冲突都经由这三类浮现）。
    /// SQLite: 写锁竞争表现为 database is locked。
    fn conflict_reason(error: &SqlxError) -> Option<String> {
        let SqlxError::Database(db_err) = error else {
            return None;
        };
        if let Some(code) = db_err.code() {
            if matches!(code.as_ref(), "40001" | "40P01" | "23505") {
                return Some(format!("SQLSTATE {code}"));
            }
        }
        let message = db_err.message();
        if message.contains("database is locked") || message.contains("database table is locked") {
            return Some("SQLITE_BUSY".to_string());
        }
        None
    }

    /// Create a database error with board context
    #[instrument(skip_all, fields(
        operation = %context.operation,
        board_id = ?context.board_id,
        owner_id = ?context.owner_id,
        timestamp = %context.timestamp,
    ))]
    pub fn board_database_error(context: BoardOperationContext, error: SqlxError) -> OpsboardError {
        let entity_desc = context.entity_description();
        let operation_desc = context.operation.to_string();

        if let Some(reason) = Self::conflict_reason(&error) {
            let msg = format!("{operation_desc}{entity_desc}时发生并发冲突: {reason}");
            error!(error = %error, "{}", msg);
            return OpsboardError::Conflict(msg);
        }

        let error_msg = match &error {
            SqlxError::PoolClosed => {
                format!("{operation_desc}{entity_desc}时数据库连接池已关闭")
            }
            SqlxError::PoolTimedOut => {
                format!("{operation_desc}{entity_desc}时数据库连接池超时")
            }
            SqlxError::Io(ref io_error) => {
                format!("{operation_desc}{entity_desc}时发生I/O错误: {io_error}")
            }
            _ => format!("{operation_desc}{entity_desc}时发生数据库错误: {error}"),
        };

        error!(error = %error, "{}", error_msg);
        OpsboardError::database_error(error_msg)
    }

    /// Create a database error with task context
    #[instrument(skip_all, fields(
        operation = %context.operation,
        task_id = ?context.task_id,
        board_id = ?context.board_id,
        owner_id = ?context.owner_id,
        timestamp = %context.timestamp,
    ))]
    pub fn task_database_error(context: TaskOperationContext, error: SqlxError) -> OpsboardError {
        let entity_desc = context.entity_description();
        let operation_desc = context.operation.to_string();

        if let Some(reason) = Self::conflict_reason(&error) {
            let msg = format!("{operation_desc}{entity_desc}时发生并发冲突: {reason}");
            error!(error = %error, "{}", msg);
            return OpsboardError::Conflict(msg);
        }

        let error_msg = match &error {
            SqlxError::PoolClosed => {
                format!("{operation_desc}{entity_desc}时数据库连接池已关闭")
            }
            SqlxError::PoolTimedOut => {
                format!("{operation_desc}{entity_desc}时数据库连接池超时")
            }
            SqlxError::Io(ref io_error) => {
                format!("{operation_desc}{entity_desc}时发生I/O错误: {io_error}")
            }
            _ => format!("{operation_desc}{entity_desc}时发生数据库错误: {error}"),
        };

        error!(error = %error, "{}", error_msg);
        OpsboardError::database_error(error_msg)
    }

    /// Create a board not found error with context
    pub fn board_not_found(context: BoardOperationContext) -> OpsboardError {
        let entity_desc = context.entity_description();
        let operation_desc = context.operation.to_string();

        error!("{}{}时未找到", operation_desc, entity_desc);
        OpsboardError::BoardNotFound {
            id: context.board_id.unwrap_or(0),
        }
    }

    /// Create a task not found error with context
    pub fn task_not_found(context: TaskOperationContext) -> OpsboardError {
        let entity_desc = context.entity_description();
        let operation_desc = context.operation.to_string();

        error!("{}{}时未找到", operation_desc, entity_desc);
        OpsboardError::TaskNotFound {
            id: context.task_id.unwrap_or(0),
        }
    }

    /// Log successful repository operation for board operations
    #[instrument(skip_all, fields(
        operation = %context.operation,
        entity_desc = %entity_desc,
        timestamp = %context.timestamp,
    ))]
    pub fn log_board_success(
        context: BoardOperationContext,
        entity_desc: &str,
        additional_info: Option<&str>,
    ) {
        let operation_desc = context.operation.to_string();
        let base_msg = format!("{operation_desc}{entity_desc}成功");

        if let Some(info) = additional_info {
            info!("{}: {}", base_msg, info);
        } else {
            info!("{}", base_msg);
        }
    }

    /// Log successful repository operation for task operations
    #[instrument(skip_all, fields(
        operation = %context.operation,
        entity_desc = %entity_desc,
        timestamp = %context.timestamp,
    ))]
    pub fn log_task_success(
        context: TaskOperationContext,
        entity_desc: &str,
        additional_info: Option<&str>,
    ) {
        let operation_desc = context.operation.to_string();
        let base_msg = format!("{operation_desc}{entity_desc}成功");

        if let Some(info) = additional_info {
            info!("{}: {}", base_msg, info);
        } else {
            info!("{}", base_msg);
        }
    }
}

/// Macro for creating board operation context easily
#[macro_export]
macro_rules! board_context {
    ($operation:expr) => {
        $crate::error_handling::BoardOperationContext::new($operation)
    };
    ($operation:expr, board_id = $board_id:expr) => {
        $crate::error_handling::BoardOperationContext::new($operation).with_board_id($board_id)
    };
    ($operation:expr, board_id = $board_id:expr, owner_id = $owner_id:expr) => {
        $crate::error_handling::BoardOperationContext::new($operation)
            .with_board_id($board_id)
            .with_owner_id($owner_id)
    };
}

/// Macro for creating task operation context easily
#[macro_export]
macro_rules! task_context {
    ($operation:expr) => {
        $crate::error_handling::TaskOperationContext::new($operation)
    };
    ($operation:expr, task_id = $task_id:expr) => {
        $crate::error_handling::TaskOperationContext::new($operation).with_task_id($task_id)
    };
    ($operation:expr, task_id = $task_id:expr, owner_id = $owner_id:expr) => {
        $crate::error_handling::TaskOperationContext::new($operation)
            .with_task_id($task_id)
            .with_owner_id($owner_id)
    };
    ($operation:expr, board_id = $board_id:expr, owner_id = $owner_id:expr) => {
        $crate::error_handling::TaskOperationContext::new($operation)
            .with_board_id($board_id)
            .with_owner_id($owner_id)
    };
}
