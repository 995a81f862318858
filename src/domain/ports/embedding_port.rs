use crate::domain::error::DomainError;
use crate::domain::values::embedding_vector::EmbeddingVector;
use std::path::Path;

/// Turns an image file into a unit-norm embedding, one image per call.
#[async_trait::async_trait]
pub trait Embedder: Send + Sync {
    async fn vectorize(&self, image_path: &Path) -> Result<EmbeddingVector, DomainError>;

    /// Output dimension, when the backing model reports one.
    fn dimension(&self) -> Option<usize>;
}
