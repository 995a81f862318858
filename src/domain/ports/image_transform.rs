use crate::domain::error::DomainError;
use async_trait::async_trait;
use image::DynamicImage;

/// A pre-processing stage applied to a decoded image before feature
/// extraction. Stages run in the order they were configured.
#[async_trait]
pub trait ImageTransform: Send + Sync {
    fn name(&self) -> &str;

    async fn apply(&self, image: DynamicImage) -> Result<DynamicImage, DomainError>;
}
