use super::migrations::run_migrations;
use crate::domain::entities::query_match::QueryMatch;
use crate::domain::error::DomainError;
use crate::domain::ports::vector_index::{validate_top_k, VectorIndex};
use crate::domain::values::embedding_vector::EmbeddingVector;
use crate::domain::values::metadata::Metadata;
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Mutex, MutexGuard};

/// A stored row, as read back by [`SqliteVectorIndex::fetch`].
#[derive(Debug, Clone, PartialEq)]
pub struct StoredEntry {
    pub id: String,
    pub values: Vec<f32>,
    pub metadata: Metadata,
}

/// Local stand-in for the remote index: same namespace and upsert semantics,
/// exhaustive cosine ranking.
pub struct SqliteVectorIndex {
    conn: Mutex<Connection>,
    namespace: String,
}

impl SqliteVectorIndex {
    pub fn open(db_path: &str, namespace: &str) -> Result<Self, DomainError> {
        let conn = Connection::open(db_path)
            .map_err(|e| DomainError::Database(format!("DB error: {e}")))?;
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(|e| DomainError::Database(format!("WAL error: {e}")))?;
        Self::new(conn, namespace)
    }

    pub fn new(conn: Connection, namespace: &str) -> Result<Self, DomainError> {
        run_migrations(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            namespace: namespace.to_string(),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, DomainError> {
        self.conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))
    }

    fn serialize_vector(v: &[f32]) -> Vec<u8> {
        v.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    fn deserialize_vector(bytes: &[u8]) -> Vec<f32> {
        bytes.chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect()
    }

    fn parse_metadata(text: &str) -> Result<Metadata, DomainError> {
        serde_json::from_str(text)
            .map_err(|e| DomainError::Database(format!("Corrupt metadata column: {e}")))
    }

    pub fn fetch(&self, id: &str) -> Result<Option<StoredEntry>, DomainError> {
        let conn = self.lock()?;
        let row = conn
            .query_row(
                "SELECT vector, metadata FROM index_entries WHERE namespace = ?1 AND id = ?2",
                params![self.namespace, id],
                |r| Ok((r.get::<_, Vec<u8>>(0)?, r.get::<_, String>(1)?)),
            )
            .optional()?;

        match row {
            None => Ok(None),
            Some((blob, metadata)) => Ok(Some(StoredEntry {
                id: id.to_string(),
                values: Self::deserialize_vector(&blob),
                metadata: Self::parse_metadata(&metadata)?,
            })),
        }
    }

    pub fn count(&self) -> Result<usize, DomainError> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM index_entries WHERE namespace = ?1",
            params![self.namespace],
            |r| r.get(0),
        )?;
        Ok(count as usize)
    }
}

#[async_trait]
impl VectorIndex for SqliteVectorIndex {
    async fn upsert(
        &self,
        id: &str,
        vector: &EmbeddingVector,
        metadata: &Metadata,
    ) -> Result<(), DomainError> {
        // The first vector fixes the namespace's width; mixed widths would
        // make every cosine against the odd one out meaningless.
        if let Some(expected) = self.dimension() {
            if vector.dimension() != expected {
                return Err(DomainError::InvalidInput(format!(
                    "Vector dimension {} does not match index dimension {expected}",
                    vector.dimension()
                )));
            }
        }

        let conn = self.lock()?;
        let blob = Self::serialize_vector(vector);
        let metadata = serde_json::to_string(metadata)
            .map_err(|e| DomainError::InvalidInput(format!("Unserializable metadata: {e}")))?;
        conn.execute(
            "INSERT OR REPLACE INTO index_entries (namespace, id, vector, metadata, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![self.namespace, id, blob, metadata, Utc::now().to_rfc3339()],
        )
        .map_err(|e| DomainError::Database(format!("Failed to store vector: {e}")))?;
        Ok(())
    }

    async fn query(
        &self,
        vector: &EmbeddingVector,
        top_k: usize,
    ) -> Result<Vec<QueryMatch>, DomainError> {
        validate_top_k(top_k)?;

        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, vector, metadata FROM index_entries WHERE namespace = ?1",
        )?;
        let rows = stmt
            .query_map(params![self.namespace], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, Vec<u8>>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut results = Vec::with_capacity(rows.len());
        for (id, blob, metadata) in rows {
            let stored = Self::deserialize_vector(&blob);
            // Both sides are unit vectors, so the dot product is the cosine.
            let score = vector.dot(&stored) as f32;
            results.push(QueryMatch {
                id,
                score,
                metadata: Some(Self::parse_metadata(&metadata)?),
            });
        }

        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(top_k);
        Ok(results)
    }

    fn namespace(&self) -> &str {
        &self.namespace
    }

    fn dimension(&self) -> Option<usize> {
        let conn = self.lock().ok()?;
        let dimension = conn
            .query_row(
                "SELECT length(vector) / 4 FROM index_entries WHERE namespace = ?1 LIMIT 1",
                params![self.namespace],
                |r| r.get::<_, i64>(0),
            )
            .optional()
            .ok()
            .flatten();
        dimension.map(|d| d as usize)
    }
}
