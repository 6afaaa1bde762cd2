pub mod postgres_board_repository;
pub mod postgres_task_repository;

pub use postgres_board_repository::PostgresBoardRepository;
pub use postgres_task_repository::PostgresTaskRepository;
