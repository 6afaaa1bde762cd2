use async_trait::async_trait;
use opsboard_domain::{
    entities::{NewTask, Task, TaskChanges, TaskStatus},
    ordering::{plan_move, MoveKind},
    repositories::TaskRepository,
};
use opsboard_errors::{OpsboardError, OpsboardResult};
use sqlx::{PgPool, Row};
use tracing::{debug, instrument};

use crate::{
    database::mapping::MappingHelpers,
    error_handling::{RepositoryErrorHelpers, RepositoryOperation},
    task_context,
    timeout_handler::TimeoutUtils,
};

pub struct PostgresTaskRepository {
    pool: PgPool,
}

impl PostgresTaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_task(row: &sqlx::postgres::PgRow) -> OpsboardResult<Task> {
        let tags = MappingHelpers::parse_tags_postgres(row, "tags");

        Ok(Task {
            id: row.try_get("id")?,
            board_id: row.try_get("board_id")?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            status: row.try_get("status")?,
            priority: row.try_get("priority")?,
            due_date: row.try_get("due_date")?,
            tags,
            assigned_to: row.try_get("assigned_to")?,
            position: row.try_get("position")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    /// 校验看板归属，未找到与无权访问对调用方同样表现为看板不存在
    async fn ensure_board_owned(&self, board_id: i64, owner_id: i64) -> OpsboardResult<()> {
        let context = task_context!(
            RepositoryOperation::Read,
            board_id = board_id,
            owner_id = owner_id
        );

        let row = sqlx::query("SELECT id FROM boards WHERE id = $1 AND owner_id = $2")
            .bind(board_id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryErrorHelpers::task_database_error(context, e))?;

        if row.is_none() {
            debug!("看板不存在或不属于调用者: ID {}", board_id);
            return Err(OpsboardError::board_not_found(board_id));
        }
        Ok(())
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    #[instrument(skip(self, task), fields(
        board_id = %task.board_id,
        task_title = %task.title,
        status = ?task.status,
    ))]
    async fn create(&self, task: &NewTask, owner_id: i64) -> OpsboardResult<Task> {
        let context = task_context!(
            RepositoryOperation::Create,
            board_id = task.board_id,
            owner_id = owner_id
        );

        self.ensure_board_owned(task.board_id, owner_id).await?;

        // 追加语义: 新任务总是落到目标列末尾，序号由同一条语句内的子查询分配
        let row = TimeoutUtils::database(
            async {
                sqlx::query(
                    r#"
                    INSERT INTO tasks (board_id, title, description, status, priority, due_date, tags, assigned_to, position)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8,
                            (SELECT COALESCE(MAX(position) + 1, 0) FROM tasks WHERE board_id = $1 AND status = $4))
                    RETURNING id, board_id, title, description, status, priority, due_date, tags, assigned_to, position, created_at, updated_at
                    "#,
                )
                .bind(task.board_id)
                .bind(&task.title)
                .bind(&task.description)
                .bind(task.status)
                .bind(task.priority)
                .bind(task.due_date)
                .bind(&task.tags)
                .bind(&task.assigned_to)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| RepositoryErrorHelpers::task_database_error(context.clone(), e))
            },
            &format!("创建任务 '{}'", task.title),
        )
        .await?;

        let created_task = Self::row_to_task(&row)?;
        RepositoryErrorHelpers::log_task_success(
            context,
            &created_task.entity_description(),
            Some(&format!(
                "状态: {:?}, 序号: {}",
                created_task.status, created_task.position
            )),
        );
        Ok(created_task)
    }

    #[instrument(skip(self), fields(task_id = %id, owner_id = %owner_id))]
    async fn get_by_id(&self, id: i64, owner_id: i64) -> OpsboardResult<Option<Task>> {
        let context = task_context!(RepositoryOperation::Read, task_id = id, owner_id = owner_id);

        let row = TimeoutUtils::database(
            async {
                sqlx::query(
                    r#"
                    SELECT t.id, t.board_id, t.title, t.description, t.status, t.priority, t.due_date, t.tags, t.assigned_to, t.position, t.created_at, t.updated_at
                    FROM tasks t
                    JOIN boards b ON t.board_id = b.id
                    WHERE t.id = $1 AND b.owner_id = $2
                    "#,
                )
                .bind(id)
                .bind(owner_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| RepositoryErrorHelpers::task_database_error(context.clone(), e))
            },
            &format!("查询任务 ID {id}"),
        )
        .await?;

        match row {
            Some(row) => {
                let task = Self::row_to_task(&row)?;
                debug!("查询任务成功: {} (ID: {})", task.title, task.id);
                Ok(Some(task))
            }
            None => {
                debug!("查询任务不存在: ID {}", id);
                Ok(None)
            }
        }
    }

    #[instrument(skip(self), fields(board_id = %board_id, owner_id = %owner_id))]
    async fn list_by_board(&self, board_id: i64, owner_id: i64) -> OpsboardResult<Vec<Task>> {
        let context = task_context!(
            RepositoryOperation::Query,
            board_id = board_id,
            owner_id = owner_id
        );

        self.ensure_board_owned(board_id, owner_id).await?;

        let rows = sqlx::query(
            r#"
            SELECT id, board_id, title, description, status, priority, due_date, tags, assigned_to, position, created_at, updated_at
            FROM tasks
            WHERE board_id = $1
            ORDER BY CASE status
                WHEN 'TODO' THEN 0
                WHEN 'IN_PROGRESS' THEN 1
                WHEN 'PENDING' THEN 2
                WHEN 'DONE' THEN 3
                ELSE 4
            END, position ASC
            "#,
        )
        .bind(board_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryErrorHelpers::task_database_error(context, e))?;

        let tasks: OpsboardResult<Vec<Task>> = rows.iter().map(Self::row_to_task).collect();
        let tasks = tasks?;
        debug!("查询看板 {} 的任务列表成功，共 {} 个", board_id, tasks.len());
        Ok(tasks)
    }

    #[instrument(skip(self, changes), fields(task_id = %id, owner_id = %owner_id))]
    async fn update_fields(
        &self,
        id: i64,
        owner_id: i64,
        changes: &TaskChanges,
    ) -> OpsboardResult<Task> {
        let context = task_context!(RepositoryOperation::Update, task_id = id, owner_id = owner_id);

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepositoryErrorHelpers::task_database_error(context.clone(), e))?;

        // 行锁保证状态变更与序号分配对同一任务串行执行
        let current = sqlx::query(
            r#"
            SELECT t.id, t.board_id, t.title, t.description, t.status, t.priority, t.due_date, t.tags, t.assigned_to, t.position, t.created_at, t.updated_at
            FROM tasks t
            JOIN boards b ON t.board_id = b.id
            WHERE t.id = $1 AND b.owner_id = $2
            FOR UPDATE OF t
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| RepositoryErrorHelpers::task_database_error(context.clone(), e))?;

        let Some(current) = current else {
            return Err(RepositoryErrorHelpers::task_not_found(context));
        };
        let current = Self::row_to_task(&current)?;

        let status_change = match changes.status {
            Some(new_status) if new_status != current.status => Some(new_status),
            _ => None,
        };

        let row = if let Some(new_status) = status_change {
            // 状态变更走追加语义: 任务落到目标列末尾，源列留下空洞
            sqlx::query(
                r#"
                UPDATE tasks
                SET title = COALESCE($2, title),
                    description = COALESCE($3, description),
                    priority = COALESCE($4, priority),
                    due_date = COALESCE($5, due_date),
                    tags = COALESCE($6, tags),
                    assigned_to = COALESCE($7, assigned_to),
                    status = $8,
                    position = (SELECT COALESCE(MAX(position) + 1, 0) FROM tasks WHERE board_id = $9 AND status = $8),
                    updated_at = NOW()
                WHERE id = $1
                RETURNING id, board_id, title, description, status, priority, due_date, tags, assigned_to, position, created_at, updated_at
                "#,
            )
            .bind(id)
            .bind(&changes.title)
            .bind(&changes.description)
            .bind(changes.priority)
            .bind(changes.due_date)
            .bind(&changes.tags)
            .bind(&changes.assigned_to)
            .bind(new_status)
            .bind(current.board_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| RepositoryErrorHelpers::task_database_error(context.clone(), e))?
        } else {
            sqlx::query(
                r#"
                UPDATE tasks
                SET title = COALESCE($2, title),
                    description = COALESCE($3, description),
                    priority = COALESCE($4, priority),
                    due_date = COALESCE($5, due_date),
                    tags = COALESCE($6, tags),
                    assigned_to = COALESCE($7, assigned_to),
                    updated_at = NOW()
                WHERE id = $1
                RETURNING id, board_id, title, description, status, priority, due_date, tags, assigned_to, position, created_at, updated_at
                "#,
            )
            .bind(id)
            .bind(&changes.title)
            .bind(&changes.description)
            .bind(changes.priority)
            .bind(changes.due_date)
            .bind(&changes.tags)
            .bind(&changes.assigned_to)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| RepositoryErrorHelpers::task_database_error(context.clone(), e))?
        };

        let updated_task = Self::row_to_task(&row)?;

        tx.commit()
            .await
            .map_err(|e| RepositoryErrorHelpers::task_database_error(context.clone(), e))?;

        RepositoryErrorHelpers::log_task_success(
            context,
            &updated_task.entity_description(),
            Some(&format!(
                "状态: {:?}, 序号: {}",
                updated_task.status, updated_task.position
            )),
        );
        Ok(updated_task)
    }

    #[instrument(skip(self), fields(
        task_id = %id,
        owner_id = %owner_id,
        new_status = ?new_status,
        new_position = %new_position,
    ))]
    async fn move_task(
        &self,
        id: i64,
        owner_id: i64,
        new_status: TaskStatus,
        new_position: i64,
    ) -> OpsboardResult<Task> {
        let context = task_context!(RepositoryOperation::Move, task_id = id, owner_id = owner_id)
            .with_additional_info(format!("目标: {new_status:?}/{new_position}"));

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepositoryErrorHelpers::task_database_error(context.clone(), e))?;

        let current = sqlx::query(
            r#"
            SELECT t.id, t.board_id, t.title, t.description, t.status, t.priority, t.due_date, t.tags, t.assigned_to, t.position, t.created_at, t.updated_at
            FROM tasks t
            JOIN boards b ON t.board_id = b.id
            WHERE t.id = $1 AND b.owner_id = $2
            FOR UPDATE OF t
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| RepositoryErrorHelpers::task_database_error(context.clone(), e))?;

        let Some(current) = current else {
            return Err(RepositoryErrorHelpers::task_not_found(context));
        };
        let current = Self::row_to_task(&current)?;

        // 锁定受影响的两个分区，同分区的并发移动在此串行化；
        // 固定按 id 顺序取锁，交叉等待由数据库以死锁报出并映射为冲突
        sqlx::query(
            "SELECT id FROM tasks WHERE board_id = $1 AND status IN ($2, $3) ORDER BY id FOR UPDATE",
        )
        .bind(current.board_id)
        .bind(current.status)
        .bind(new_status)
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| RepositoryErrorHelpers::task_database_error(context.clone(), e))?;

        let dest_row =
            sqlx::query("SELECT COUNT(*) AS cnt FROM tasks WHERE board_id = $1 AND status = $2")
                .bind(current.board_id)
                .bind(new_status)
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| RepositoryErrorHelpers::task_database_error(context.clone(), e))?;
        let dest_partition_len: i64 = dest_row.try_get("cnt")?;

        let plan = plan_move(
            current.status,
            current.position,
            new_status,
            new_position,
            dest_partition_len,
        );

        match plan.kind {
            MoveKind::NoOp => {
                tx.commit()
                    .await
                    .map_err(|e| RepositoryErrorHelpers::task_database_error(context.clone(), e))?;
                debug!("移动目标即当前槽位，未发生写入: 任务 ID {}", id);
                return Ok(current);
            }
            MoveKind::TowardEnd => {
                sqlx::query(
                    "UPDATE tasks SET position = position - 1 WHERE board_id = $1 AND status = $2 AND position > $3 AND position <= $4",
                )
                .bind(current.board_id)
                .bind(current.status)
                .bind(current.position)
                .bind(plan.position)
                .execute(&mut *tx)
                .await
                .map_err(|e| RepositoryErrorHelpers::task_database_error(context.clone(), e))?;
            }
            MoveKind::TowardStart => {
                sqlx::query(
                    "UPDATE tasks SET position = position + 1 WHERE board_id = $1 AND status = $2 AND position >= $3 AND position < $4",
                )
                .bind(current.board_id)
                .bind(current.status)
                .bind(plan.position)
                .bind(current.position)
                .execute(&mut *tx)
                .await
                .map_err(|e| RepositoryErrorHelpers::task_database_error(context.clone(), e))?;
            }
            MoveKind::CrossColumn => {
                sqlx::query(
                    "UPDATE tasks SET position = position - 1 WHERE board_id = $1 AND status = $2 AND position > $3",
                )
                .bind(current.board_id)
                .bind(current.status)
                .bind(current.position)
                .execute(&mut *tx)
                .await
                .map_err(|e| RepositoryErrorHelpers::task_database_error(context.clone(), e))?;

                sqlx::query(
                    "UPDATE tasks SET position = position + 1 WHERE board_id = $1 AND status = $2 AND position >= $3",
                )
                .bind(current.board_id)
                .bind(new_status)
                .bind(plan.position)
                .execute(&mut *tx)
                .await
                .map_err(|e| RepositoryErrorHelpers::task_database_error(context.clone(), e))?;
            }
        }

        let row = sqlx::query(
            r#"
            UPDATE tasks
            SET status = $2, position = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING id, board_id, title, description, status, priority, due_date, tags, assigned_to, position, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(plan.status)
        .bind(plan.position)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryErrorHelpers::task_database_error(context.clone(), e))?;

        let moved_task = Self::row_to_task(&row)?;

        // 唯一约束延迟到提交时生效，并发追加或移动的冲突在这里浮现
        tx.commit()
            .await
            .map_err(|e| RepositoryErrorHelpers::task_database_error(context.clone(), e))?;

        RepositoryErrorHelpers::log_task_success(
            context,
            &moved_task.entity_description(),
            Some(&format!(
                "{:?}/{} -> {:?}/{}",
                current.status, current.position, moved_task.status, moved_task.position
            )),
        );
        Ok(moved_task)
    }
}
