use crate::domain::error::DomainError;
use crate::domain::ports::embedding_port::Embedder;
use crate::domain::ports::feature_extractor::FeatureExtractor;
use crate::domain::ports::image_transform::ImageTransform;
use crate::domain::values::embedding_vector::EmbeddingVector;
use image::DynamicImage;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Decode → transforms (in order) → feature extractor → L2 normalization.
pub struct ImageEmbedder {
    extractor: Arc<dyn FeatureExtractor>,
    transforms: Vec<Arc<dyn ImageTransform>>,
}

impl ImageEmbedder {
    pub fn new(extractor: Arc<dyn FeatureExtractor>) -> Self {
        Self {
            extractor,
            transforms: Vec::new(),
        }
    }

    /// Append a pre-processing stage. Stages run in insertion order.
    pub fn with_transform(mut self, transform: Arc<dyn ImageTransform>) -> Self {
        self.transforms.push(transform);
        self
    }

    pub fn transform_names(&self) -> Vec<&str> {
        self.transforms.iter().map(|t| t.name()).collect()
    }

    async fn decode(image_path: &Path) -> Result<DynamicImage, DomainError> {
        let bytes = tokio::fs::read(image_path)
            .await
            .map_err(|e| DomainError::Decode(format!("{}: {e}", image_path.display())))?;
        image::load_from_memory(&bytes)
            .map_err(|e| DomainError::Decode(format!("{}: {e}", image_path.display())))
    }
}

#[async_trait::async_trait]
impl Embedder for ImageEmbedder {
    async fn vectorize(&self, image_path: &Path) -> Result<EmbeddingVector, DomainError> {
        let mut image = Self::decode(image_path).await?;

        for transform in &self.transforms {
            debug!(transform = transform.name(), path = %image_path.display(), "Applying transform");
            image = transform.apply(image).await?;
        }

        // Inference is CPU/GPU bound; keep it off the async workers.
        let extractor = Arc::clone(&self.extractor);
        let raw = tokio::task::spawn_blocking(move || extractor.extract(&image))
            .await
            .map_err(|e| DomainError::Model(format!("Feature extraction task panicked: {e}")))??;

        EmbeddingVector::normalized(raw)
    }

    fn dimension(&self) -> Option<usize> {
        self.extractor.dimension()
    }
}
