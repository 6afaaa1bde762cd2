use async_trait::async_trait;
use opsboard_domain::{
    entities::{Board, BoardChanges, NewBoard},
    repositories::BoardRepository,
};
use opsboard_errors::OpsboardResult;
use sqlx::{Row, SqlitePool};
use tracing::{debug, instrument};

use crate::{
    board_context,
    database::mapping::MappingHelpers,
    error_handling::{RepositoryErrorHelpers, RepositoryOperation},
};

pub struct SqliteBoardRepository {
    pool: SqlitePool,
}

impl SqliteBoardRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_board(row: &sqlx::sqlite::SqliteRow) -> OpsboardResult<Board> {
        let tags = MappingHelpers::parse_tags_sqlite(row, "tags")?;

        Ok(Board {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            tags,
            color: row.try_get("color")?,
            is_archived: row.try_get("is_archived")?,
            owner_id: row.try_get("owner_id")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[async_trait]
impl BoardRepository for SqliteBoardRepository {
    #[instrument(skip(self, board), fields(
        board_name = %board.name,
        owner_id = %board.owner_id,
    ))]
    async fn create(&self, board: &NewBoard) -> OpsboardResult<Board> {
        let context = board_context!(RepositoryOperation::Create)
            .with_board_name(board.name.clone())
            .with_owner_id(board.owner_id);

        let tags_json = MappingHelpers::tags_to_json(&board.tags)?;

        let row = sqlx::query(
            r#"
            INSERT INTO boards (name, description, tags, color, owner_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, description, tags, color, is_archived, owner_id, created_at, updated_at
            "#,
        )
        .bind(&board.name)
        .bind(&board.description)
        .bind(tags_json)
        .bind(&board.color)
        .bind(board.owner_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepositoryErrorHelpers::board_database_error(context.clone(), e))?;

        let created = Self::row_to_board(&row)?;
        RepositoryErrorHelpers::log_board_success(
            context,
            &created.entity_description(),
            Some(&format!("所有者: {}", created.owner_id)),
        );
        Ok(created)
    }

    #[instrument(skip(self), fields(board_id = %id, owner_id = %owner_id))]
    async fn get_by_id(&self, id: i64, owner_id: i64) -> OpsboardResult<Option<Board>> {
        let context = board_context!(RepositoryOperation::Read, board_id = id, owner_id = owner_id);

        let row = sqlx::query(
            "SELECT id, name, description, tags, color, is_archived, owner_id, created_at, updated_at FROM boards WHERE id = $1 AND owner_id = $2"
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryErrorHelpers::board_database_error(context.clone(), e))?;

        match row {
            Some(row) => {
                let board = Self::row_to_board(&row)?;
                debug!("查询看板成功: ID {}, 名称: {}", board.id, board.name);
                Ok(Some(board))
            }
            None => {
                debug!("查询看板不存在: ID {}", id);
                Ok(None)
            }
        }
    }

    #[instrument(skip(self), fields(owner_id = %owner_id))]
    async fn list_active(&self, owner_id: i64) -> OpsboardResult<Vec<Board>> {
        let context = board_context!(RepositoryOperation::Query).with_owner_id(owner_id);

        let rows = sqlx::query(
            "SELECT id, name, description, tags, color, is_archived, owner_id, created_at, updated_at FROM boards WHERE owner_id = $1 AND is_archived = 0 ORDER BY created_at DESC"
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryErrorHelpers::board_database_error(context.clone(), e))?;

        let boards: OpsboardResult<Vec<Board>> = rows.iter().map(Self::row_to_board).collect();
        let result = boards?;
        debug!("查询看板列表成功，返回 {} 个看板", result.len());
        Ok(result)
    }

    #[instrument(skip(self, changes), fields(board_id = %id, owner_id = %owner_id))]
    async fn update(
        &self,
        id: i64,
        owner_id: i64,
        changes: &BoardChanges,
    ) -> OpsboardResult<Board> {
        let context =
            board_context!(RepositoryOperation::Update, board_id = id, owner_id = owner_id);

        let tags_json = changes
            .tags
            .as_deref()
            .map(MappingHelpers::tags_to_json)
            .transpose()?;

        let row = sqlx::query(
            r#"
            UPDATE boards
            SET name = COALESCE($3, name),
                description = COALESCE($4, description),
                tags = COALESCE($5, tags),
                color = COALESCE($6, color),
                is_archived = COALESCE($7, is_archived),
                updated_at = datetime('now')
            WHERE id = $1 AND owner_id = $2
            RETURNING id, name, description, tags, color, is_archived, owner_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .bind(&changes.name)
        .bind(&changes.description)
        .bind(tags_json)
        .bind(&changes.color)
        .bind(changes.is_archived)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryErrorHelpers::board_database_error(context.clone(), e))?;

        let Some(row) = row else {
            return Err(RepositoryErrorHelpers::board_not_found(context));
        };

        let updated = Self::row_to_board(&row)?;
        RepositoryErrorHelpers::log_board_success(context, &updated.entity_description(), None);
        Ok(updated)
    }

    #[instrument(skip(self), fields(board_id = %id, owner_id = %owner_id))]
    async fn archive(&self, id: i64, owner_id: i64) -> OpsboardResult<()> {
        let context =
            board_context!(RepositoryOperation::Archive, board_id = id, owner_id = owner_id);

        let result = sqlx::query(
            "UPDATE boards SET is_archived = 1, updated_at = datetime('now') WHERE id = $1 AND owner_id = $2"
        )
        .bind(id)
        .bind(owner_id)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryErrorHelpers::board_database_error(context.clone(), e))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryErrorHelpers::board_not_found(context));
        }

        RepositoryErrorHelpers::log_board_success(context, &format!("看板 (ID: {id})"), None);
        Ok(())
    }
}
