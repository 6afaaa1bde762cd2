pub mod sqlite_board_repository;
pub mod sqlite_task_repository;

pub use sqlite_board_repository::SqliteBoardRepository;
pub use sqlite_task_repository::SqliteTaskRepository;

use opsboard_errors::OpsboardResult;
use sqlx::SqlitePool;
use tracing::debug;

/// 创建嵌入式SQLite连接池，自动建库建表
pub async fn connect_embedded(database_url: &str) -> OpsboardResult<SqlitePool> {
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
    use std::str::FromStr;

    debug!("Creating embedded SQLite pool at: {}", database_url);

    // 启用外键约束和WAL模式
    let connect_options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .min_connections(1)
        .connect_with(connect_options)
        .await?;

    run_migrations(&pool).await?;

    debug!("Successfully created embedded SQLite pool");
    Ok(pool)
}

/// 运行数据库迁移
async fn run_migrations(pool: &SqlitePool) -> OpsboardResult<()> {
    debug!("Running SQLite database migrations");

    // 创建看板表
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS boards (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            description TEXT,
            tags TEXT NOT NULL DEFAULT '[]',
            color TEXT,
            is_archived INTEGER NOT NULL DEFAULT 0,
            owner_id INTEGER NOT NULL,
            created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    // 创建任务表，序号在 (board_id, status) 分区内从0起连续
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tasks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            board_id INTEGER NOT NULL,
            title TEXT NOT NULL,
            description TEXT,
            status TEXT NOT NULL DEFAULT 'TODO',
            priority TEXT,
            due_date DATETIME,
            tags TEXT NOT NULL DEFAULT '[]',
            assigned_to TEXT,
            position INTEGER NOT NULL CHECK (position >= 0),
            created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
            FOREIGN KEY (board_id) REFERENCES boards(id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;

    let indexes = vec![
        "CREATE INDEX IF NOT EXISTS idx_boards_owner ON boards(owner_id, is_archived)",
        "CREATE INDEX IF NOT EXISTS idx_tasks_board_status_position ON tasks(board_id, status, position)",
    ];

    for index_sql in indexes {
        sqlx::query(index_sql).execute(pool).await?;
    }

    debug!("Successfully completed SQLite database migrations");
    Ok(())
}
