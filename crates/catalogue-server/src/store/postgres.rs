//! PostgreSQL-backed document store
//!
//! Documents live in a single `documents` table keyed by `(collection, id)`
//! with the body in a JSONB column. See `migrations/` for the schema.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{types::Json, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{DocumentStore, StoreError, StoredDocument};

/// Rows per multi-row INSERT; keeps bind parameters well below the protocol limit
const INSERT_CHUNK_SIZE: usize = 1000;

#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[derive(sqlx::FromRow)]
struct DocumentRow {
    id: Uuid,
    body: Json<Value>,
}

impl From<DocumentRow> for StoredDocument {
    fn from(row: DocumentRow) -> Self {
        Self {
            id: row.id,
            body: row.body.0,
        }
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    #[tracing::instrument(skip(self, documents), fields(count = documents.len()))]
    async fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Value>,
    ) -> Result<Vec<Uuid>, StoreError> {
        if documents.is_empty() {
            return Ok(Vec::new());
        }

        let rows: Vec<(Uuid, Value)> =
            documents.into_iter().map(|body| (Uuid::new_v4(), body)).collect();
        let ids = rows.iter().map(|(id, _)| *id).collect();

        let mut tx = self.pool.begin().await?;
        for chunk in rows.chunks(INSERT_CHUNK_SIZE) {
            let mut builder: QueryBuilder<Postgres> =
                QueryBuilder::new("INSERT INTO documents (id, collection, body) ");
            builder.push_values(chunk, |mut row, (id, body)| {
                row.push_bind(*id)
                    .push_bind(collection.to_string())
                    .push_bind(Json(body.clone()));
            });
            builder.build().execute(&mut *tx).await?;
        }
        tx.commit().await?;

        tracing::debug!(collection, "Documents inserted");
        Ok(ids)
    }

    async fn find_all(&self, collection: &str) -> Result<Vec<StoredDocument>, StoreError> {
        let rows = sqlx::query_as::<_, DocumentRow>(
            r#"
            SELECT id, body
            FROM documents
            WHERE collection = $1
            ORDER BY seq
            "#,
        )
        .bind(collection)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(StoredDocument::from).collect())
    }

    async fn find_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        let rows = sqlx::query_as::<_, DocumentRow>(
            r#"
            SELECT id, body
            FROM documents
            WHERE collection = $1
              AND jsonb_typeof(body -> $2) IN ('string', 'number', 'boolean')
              AND body ->> $2 = $3
            ORDER BY seq
            "#,
        )
        .bind(collection)
        .bind(field)
        .bind(value)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(StoredDocument::from).collect())
    }

    async fn find_by_id(
        &self,
        collection: &str,
        id: Uuid,
    ) -> Result<Option<StoredDocument>, StoreError> {
        let row = sqlx::query_as::<_, DocumentRow>(
            "SELECT id, body FROM documents WHERE collection = $1 AND id = $2",
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(StoredDocument::from))
    }

    async fn delete_by_id(
        &self,
        collection: &str,
        id: Uuid,
    ) -> Result<Option<StoredDocument>, StoreError> {
        let row = sqlx::query_as::<_, DocumentRow>(
            "DELETE FROM documents WHERE collection = $1 AND id = $2 RETURNING id, body",
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(StoredDocument::from))
    }

    async fn distinct(&self, collection: &str, field: &str) -> Result<Vec<String>, StoreError> {
        let values = sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT body ->> $2 AS value
            FROM documents
            WHERE collection = $1
              AND jsonb_typeof(body -> $2) IN ('string', 'number', 'boolean')
            ORDER BY value COLLATE "C"
            "#,
        )
        .bind(collection)
        .bind(field)
        .fetch_all(&self.pool)
        .await?;

        Ok(values)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
