use crate::domain::entities::query_match::QueryMatch;
use crate::domain::error::DomainError;
use crate::domain::values::embedding_vector::EmbeddingVector;
use crate::domain::values::metadata::Metadata;
use async_trait::async_trait;

/// A namespaced nearest-neighbor index keyed by item id.
///
/// `upsert` replaces any existing entry with the same id. `query` returns at
/// most `top_k` matches ordered by descending score; an index holding fewer
/// entries simply returns fewer. `top_k` of zero is rejected.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    async fn upsert(
        &self,
        id: &str,
        vector: &EmbeddingVector,
        metadata: &Metadata,
    ) -> Result<(), DomainError>;

    async fn query(
        &self,
        vector: &EmbeddingVector,
        top_k: usize,
    ) -> Result<Vec<QueryMatch>, DomainError>;

    fn namespace(&self) -> &str;

    /// Configured vector dimension, if the index knows it.
    fn dimension(&self) -> Option<usize>;
}

pub fn validate_top_k(top_k: usize) -> Result<(), DomainError> {
    if top_k == 0 {
        return Err(DomainError::InvalidInput(
            "top_k must be a positive integer".to_string(),
        ));
    }
    Ok(())
}
