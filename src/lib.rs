pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

use crate::application::batch_run::BatchRunUseCase;
use crate::application::query_similar::QuerySimilarUseCase;
use crate::application::register_item::RegisterItemUseCase;
use crate::config::{IndexBackend, Settings};
use crate::domain::entities::catalog_record::CatalogRecord;
use crate::domain::entities::query_match::QueryMatch;
use crate::domain::entities::run_report::RunReport;
use crate::domain::error::DomainError;
use crate::domain::ports::catalog_source::CatalogSource;
use crate::domain::ports::embedding_port::Embedder;
use crate::domain::ports::vector_index::VectorIndex;
use crate::infrastructure::embeddings::clip_onnx::ClipOnnxExtractor;
use crate::infrastructure::embeddings::image_embedder::ImageEmbedder;
use crate::infrastructure::pinecone::client::PineconeIndex;
use crate::infrastructure::sqlite::vector_index::SqliteVectorIndex;
use crate::infrastructure::transforms::background_removal::RemoteBackgroundRemover;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub struct ImageRegister {
    register_uc: Arc<RegisterItemUseCase>,
    batch_uc: BatchRunUseCase,
    query_uc: QuerySimilarUseCase,
}

impl ImageRegister {
    /// Build the index client first (cheap, fails fast on credentials), then
    /// load the model.
    pub async fn connect(settings: &Settings, pacing: Duration) -> Result<Self, DomainError> {
        let index: Arc<dyn VectorIndex> = match settings.backend {
            IndexBackend::Pinecone => {
                let pinecone = settings.pinecone.as_ref().ok_or_else(|| {
                    DomainError::Config("Pinecone backend selected without credentials".to_string())
                })?;
                Arc::new(
                    PineconeIndex::connect(&pinecone.api_key, &pinecone.index_name, &settings.namespace)
                        .await?,
                )
            }
            IndexBackend::Sqlite => Arc::new(SqliteVectorIndex::open(&settings.db_path, &settings.namespace)?),
        };

        let extractor = Arc::new(ClipOnnxExtractor::from_file(&settings.model_path)?);
        let mut embedder = ImageEmbedder::new(extractor);
        if let Some(bg) = &settings.background_removal {
            embedder = embedder.with_transform(Arc::new(RemoteBackgroundRemover::new(
                bg.url.clone(),
                bg.api_key.clone(),
            )?));
        }
        info!(
            backend = %settings.backend,
            namespace = %settings.namespace,
            transforms = ?embedder.transform_names(),
            "Pipeline ready"
        );

        Ok(Self::with_providers(Arc::new(embedder), index, pacing))
    }

    pub fn with_providers(
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorIndex>,
        pacing: Duration,
    ) -> Self {
        if let (Some(model_dim), Some(index_dim)) = (embedder.dimension(), index.dimension()) {
            if model_dim != index_dim {
                warn!(
                    model_dim,
                    index_dim,
                    "Embedding dimension does not match the index; upserts will be rejected"
                );
            }
        }

        let register_uc = Arc::new(RegisterItemUseCase::new(embedder.clone(), index.clone()));
        Self {
            batch_uc: BatchRunUseCase::new(register_uc.clone(), pacing),
            register_uc,
            query_uc: QuerySimilarUseCase::new(embedder, index),
        }
    }

    pub async fn register_item(&self, record: &CatalogRecord) -> Result<(), DomainError> {
        self.register_uc.execute(record).await
    }

    /// Per-record failures land in the report; this never fails as a whole.
    pub async fn register_all(&self, records: &[CatalogRecord]) -> RunReport {
        self.batch_uc.execute(records).await
    }

    /// Load the whole catalog before registering anything, so a malformed
    /// catalog aborts the run up front.
    pub async fn register_catalog(&self, catalog: &dyn CatalogSource) -> Result<RunReport, DomainError> {
        let records = catalog.load_all()?;
        info!(count = records.len(), "Loaded catalog");
        Ok(self.register_all(&records).await)
    }

    pub async fn query_similar(&self, image_path: &Path, top_k: usize) -> Result<Vec<QueryMatch>, DomainError> {
        self.query_uc.execute(image_path, top_k).await
    }
}
