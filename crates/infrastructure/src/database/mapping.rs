//! Shared database mapping utilities to reduce code duplication
//!
//! Boards and tasks both carry a tag list. PostgreSQL stores it as a native
//! TEXT[] array while SQLite stores it as a JSON string, so row mapping
//! differs per backend and is collected here.

use opsboard_errors::{OpsboardError, OpsboardResult};

/// Helper functions for parsing database fields across different database types
pub struct MappingHelpers;

impl MappingHelpers {
    /// Parse a tag list from a Vec<String> column (PostgreSQL TEXT[])
    pub fn parse_tags_postgres(row: &sqlx::postgres::PgRow, field_name: &str) -> Vec<String> {
        use sqlx::Row;
        row.try_get::<Vec<String>, _>(field_name).unwrap_or_default()
    }

    /// Parse a tag list from a JSON string column (SQLite TEXT)
    pub fn parse_tags_sqlite(
        row: &sqlx::sqlite::SqliteRow,
        field_name: &str,
    ) -> OpsboardResult<Vec<String>> {
        use sqlx::Row;
        if let Ok(Some(json_str)) = row.try_get::<Option<String>, _>(field_name) {
            serde_json::from_str(&json_str)
                .map_err(|e| OpsboardError::Serialization(format!("解析标签失败: {e}")))
        } else {
            Ok(Vec::new())
        }
    }

    /// Serialize a tag list into the JSON string form SQLite columns expect
    pub fn tags_to_json(tags: &[String]) -> OpsboardResult<String> {
        serde_json::to_string(tags)
            .map_err(|e| OpsboardError::Serialization(format!("序列化标签失败: {e}")))
    }
}
