use crate::domain::error::DomainError;
use image::DynamicImage;

/// Opaque pretrained model: decoded image in, raw (unnormalized) features out.
///
/// Extraction is CPU/GPU bound and synchronous; callers move it off the
/// async runtime.
pub trait FeatureExtractor: Send + Sync {
    fn extract(&self, image: &DynamicImage) -> Result<Vec<f32>, DomainError>;

    fn dimension(&self) -> Option<usize>;

    /// Model name for logging
    fn name(&self) -> &str;
}
