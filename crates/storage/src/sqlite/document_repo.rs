use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use sqlx::Row;

use super::SqliteRepository;
use crate::repository::{Collection, DocumentStore, StorageError};

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

#[async_trait]
impl DocumentStore for SqliteRepository {
    async fn load(&self, collection: Collection) -> Result<Option<Value>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT body
            FROM documents
            WHERE collection = ?1
            ",
        )
        .bind(collection.key())
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let body: String = row.try_get("body").map_err(ser)?;
        serde_json::from_str(&body).map(Some).map_err(ser)
    }

    async fn save(&self, collection: Collection, value: &Value) -> Result<(), StorageError> {
        let body = serde_json::to_string(value).map_err(ser)?;

        sqlx::query(
            r"
            INSERT INTO documents (collection, body, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(collection) DO UPDATE SET
                body = excluded.body,
                updated_at = excluded.updated_at
            ",
        )
        .bind(collection.key())
        .bind(body)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        Ok(())
    }
}
