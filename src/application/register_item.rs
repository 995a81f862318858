use crate::domain::entities::catalog_record::CatalogRecord;
use crate::domain::error::DomainError;
use crate::domain::ports::embedding_port::Embedder;
use crate::domain::ports::vector_index::VectorIndex;
use std::path::Path;
use std::sync::Arc;

/// Embeds one catalog image and upserts it under `image_name`.
///
/// The two steps are not atomic. If the upsert fails after a successful
/// embedding, nothing is rolled back; callers retry the whole call.
pub struct RegisterItemUseCase {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
}

impl RegisterItemUseCase {
    pub fn new(embedder: Arc<dyn Embedder>, index: Arc<dyn VectorIndex>) -> Self {
        Self { embedder, index }
    }

    pub async fn execute(&self, record: &CatalogRecord) -> Result<(), DomainError> {
        let vector = self
            .embedder
            .vectorize(Path::new(&record.image_path))
            .await?;
        self.index
            .upsert(&record.image_name, &vector, &record.metadata)
            .await
    }
}
