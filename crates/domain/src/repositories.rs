//! 领域仓储抽象
//!
//! 定义数据访问的抽象接口，遵循依赖倒置原则。
//! 所有方法都显式携带调用者的用户ID，归属校验发生在任何写入之前，
//! 不属于调用者的记录与不存在的记录不可区分。

use async_trait::async_trait;

use crate::entities::{Board, BoardChanges, NewBoard, NewTask, Task, TaskChanges, TaskStatus};
use opsboard_errors::OpsboardResult;

/// 看板仓储抽象
#[async_trait]
pub trait BoardRepository: Send + Sync {
    async fn create(&self, board: &NewBoard) -> OpsboardResult<Board>;
    async fn get_by_id(&self, id: i64, owner_id: i64) -> OpsboardResult<Option<Board>>;
    /// 列出调用者所有未归档的看板
    async fn list_active(&self, owner_id: i64) -> OpsboardResult<Vec<Board>>;
    async fn update(&self, id: i64, owner_id: i64, changes: &BoardChanges)
        -> OpsboardResult<Board>;
    /// 归档即"删除"，只打标记，不做物理删除
    async fn archive(&self, id: i64, owner_id: i64) -> OpsboardResult<()>;
}

/// 任务仓储抽象，同时承载排序引擎的三类写入
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// 追加创建: position = 目标分区当前最大值 + 1，空分区为 0
    async fn create(&self, task: &NewTask, owner_id: i64) -> OpsboardResult<Task>;
    async fn get_by_id(&self, id: i64, owner_id: i64) -> OpsboardResult<Option<Task>>;
    /// 按 (状态列顺序, position) 返回看板下的全部任务
    async fn list_by_board(&self, board_id: i64, owner_id: i64) -> OpsboardResult<Vec<Task>>;
    /// 字段部分更新；status 变更走追加语义，源分区留下空洞
    async fn update_fields(
        &self,
        id: i64,
        owner_id: i64,
        changes: &TaskChanges,
    ) -> OpsboardResult<Task>;
    /// 显式移动: 在单个事务内完成兄弟任务的区间平移与自身写入
    async fn move_task(
        &self,
        id: i64,
        owner_id: i64,
        new_status: TaskStatus,
        new_position: i64,
    ) -> OpsboardResult<Task>;
}
