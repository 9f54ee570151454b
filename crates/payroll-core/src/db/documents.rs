use async_trait::async_trait;
use serde_json::Value;
use sqlx::types::Json;
use sqlx::Row;
use tracing::debug;
use uuid::Uuid;

use super::DbPool;
use crate::store::{with_id, Document, DocumentStore, StoreError};

/// Collections of JSONB documents in a single `documents` table.
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: DbPool,
}

impl PgDocumentStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

/// Connection-level failures make the whole store unavailable; anything
/// else is a rejection of the single statement.
fn classify(collection: &str, err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StoreError::Unavailable(err.to_string()),
        _ => StoreError::Rejected {
            collection: collection.to_string(),
            message: err.to_string(),
        },
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn create(&self, collection: &str, document: Document) -> Result<String, StoreError> {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"
                INSERT INTO documents (id, collection, body)
                VALUES ($1, $2, $3)
            "#,
        )
        .bind(id)
        .bind(collection)
        .bind(Json(Value::Object(document)))
        .execute(&self.pool)
        .await
        .map_err(|err| classify(collection, err))?;

        Ok(id.to_string())
    }

    async fn get_all(
        &self,
        collection: &str,
        order_by: Option<&str>,
    ) -> Result<Vec<Document>, StoreError> {
        let rows = sqlx::query(
            r#"
                SELECT id, body
                FROM documents
                WHERE collection = $1
                ORDER BY body -> $2::text ASC NULLS LAST, created_at ASC
            "#,
        )
        .bind(collection)
        .bind(order_by)
        .fetch_all(&self.pool)
        .await
        .map_err(|err| classify(collection, err))?;

        let mut documents = Vec::with_capacity(rows.len());
        for row in rows {
            let id: Uuid = row.try_get("id").map_err(|err| classify(collection, err))?;
            let Json(body): Json<Value> =
                row.try_get("body").map_err(|err| classify(collection, err))?;
            match body {
                Value::Object(map) => documents.push(with_id(&id.to_string(), map)),
                other => {
                    return Err(StoreError::Rejected {
                        collection: collection.to_string(),
                        message: format!("document {id} is not an object: {other}"),
                    })
                }
            }
        }

        debug!(collection, count = documents.len(), "fetched documents");
        Ok(documents)
    }
}
