use crate::domain::error::DomainError;
use crate::domain::ports::image_transform::ImageTransform;
use async_trait::async_trait;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageFormat, RgbImage, RgbaImage};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use std::io::Cursor;
use std::time::Duration;
use tracing::debug;

const WHITE: [u8; 3] = [255, 255, 255];

/// Strips the background through an external segmentation service.
///
/// The image is POSTed as PNG; the service answers with a PNG cutout whose
/// removed pixels are transparent. The cutout is flattened onto white and
/// returned as RGB at the original size.
pub struct RemoteBackgroundRemover {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl RemoteBackgroundRemover {
    pub fn new(endpoint: String, api_key: Option<String>) -> Result<Self, DomainError> {
        let client = Client::builder()
            .user_agent("image-register/0.1")
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| DomainError::Transform(format!("HTTP client: {e}")))?;
        Ok(Self {
            client,
            endpoint,
            api_key,
        })
    }
}

#[async_trait]
impl ImageTransform for RemoteBackgroundRemover {
    fn name(&self) -> &str {
        "background_removal"
    }

    async fn apply(&self, image: DynamicImage) -> Result<DynamicImage, DomainError> {
        let (width, height) = image.dimensions();
        let png = encode_png(&image)?;

        let mut req = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "image/png")
            .header(ACCEPT, "image/png")
            .body(png);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| DomainError::Transform(format!("Background removal request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(DomainError::Transform(format!(
                "Background removal service {status}: {body}"
            )));
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| DomainError::Transform(format!("Background removal response: {e}")))?;
        let mut cutout = image::load_from_memory(&bytes)
            .map_err(|e| DomainError::Transform(format!("Background removal returned an undecodable image: {e}")))?;

        if cutout.dimensions() != (width, height) {
            debug!(
                got = ?cutout.dimensions(),
                expected = ?(width, height),
                "Resizing cutout back to source size"
            );
            cutout = cutout.resize_exact(width, height, FilterType::Triangle);
        }

        Ok(DynamicImage::ImageRgb8(flatten_alpha(
            &cutout.to_rgba8(),
            WHITE,
        )))
    }
}

pub fn encode_png(image: &DynamicImage) -> Result<Vec<u8>, DomainError> {
    let mut buf = Cursor::new(Vec::new());
    image
        .write_to(&mut buf, ImageFormat::Png)
        .map_err(|e| DomainError::Transform(format!("PNG encode failed: {e}")))?;
    Ok(buf.into_inner())
}

/// Composite an RGBA image over a solid color, dropping the alpha channel.
pub fn flatten_alpha(rgba: &RgbaImage, background: [u8; 3]) -> RgbImage {
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let px = rgba.get_pixel(x, y);
        let alpha = px[3] as u32;
        let blend = |fg: u8, bg: u8| ((fg as u32 * alpha + bg as u32 * (255 - alpha) + 127) / 255) as u8;
        image::Rgb([
            blend(px[0], background[0]),
            blend(px[1], background[1]),
            blend(px[2], background[2]),
        ])
    })
}
