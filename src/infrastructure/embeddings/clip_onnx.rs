//! CLIP vision encoder running on ONNX Runtime.
//!
//! Expects an ONNX export of a CLIP vision tower with projection (for example
//! `openai/clip-vit-base-patch32` exported as `vision_model.onnx`) taking
//! `pixel_values` `[batch, 3, 224, 224]` and producing `image_embeds`
//! `[batch, dim]` as its first output.

use crate::domain::error::DomainError;
use crate::domain::ports::feature_extractor::FeatureExtractor;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use ndarray::Array4;
use ort::session::Session;
use ort::value::TensorRef;
use std::path::Path;
use std::sync::Mutex;
use tracing::info;

pub const CLIP_INPUT_SIZE: u32 = 224;
pub const CLIP_MEAN: [f32; 3] = [0.481_454_66, 0.457_827_5, 0.408_210_73];
pub const CLIP_STD: [f32; 3] = [0.268_629_54, 0.261_302_58, 0.275_777_11];

pub struct ClipOnnxExtractor {
    session: Mutex<Session>,
    dimension: Option<usize>,
    name: String,
}

impl std::fmt::Debug for ClipOnnxExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClipOnnxExtractor")
            .field("name", &self.name)
            .field("dimension", &self.dimension)
            .finish()
    }
}

impl ClipOnnxExtractor {
    /// Load the model once; the session is shared behind a mutex.
    pub fn from_file(model_path: &Path) -> Result<Self, DomainError> {
        if !model_path.exists() {
            return Err(DomainError::NotFound(format!(
                "ONNX model not found at {}",
                model_path.display()
            )));
        }

        let session = Session::builder()
            .map_err(|e| DomainError::Model(format!("ONNX session builder: {e}")))?
            .with_intra_threads(4)
            .map_err(|e| DomainError::Model(format!("ONNX set threads: {e}")))?
            .commit_from_file(model_path)
            .map_err(|e| DomainError::Model(format!("ONNX load model: {e}")))?;

        // image_embeds is [batch, dim]; dynamic dims report as -1.
        let dimension = session
            .outputs()
            .first()
            .and_then(|out| out.dtype().tensor_shape())
            .and_then(|shape| shape.last().copied())
            .filter(|d| *d > 0)
            .map(|d| d as usize);

        let name = model_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "clip".to_string());

        info!(model = %model_path.display(), dimension = ?dimension, "Loaded CLIP vision model");

        Ok(Self {
            session: Mutex::new(session),
            dimension,
            name,
        })
    }
}

/// Resize the shorter side to `size` (bicubic), center crop to `size`×`size`,
/// and normalize each RGB channel with the CLIP mean/std into NCHW layout.
pub fn preprocess(image: &DynamicImage, size: u32) -> Result<Array4<f32>, DomainError> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(DomainError::Decode(format!(
            "image has zero extent ({width}x{height})"
        )));
    }

    let scale = size as f64 / width.min(height) as f64;
    let new_w = ((width as f64 * scale).round() as u32).max(size);
    let new_h = ((height as f64 * scale).round() as u32).max(size);
    let resized = image.resize_exact(new_w, new_h, FilterType::CatmullRom);

    let left = (new_w - size) / 2;
    let top = (new_h - size) / 2;
    let rgb = resized.crop_imm(left, top, size, size).to_rgb8();

    let side = size as usize;
    let mut pixels = Array4::<f32>::zeros((1, 3, side, side));
    for (x, y, pixel) in rgb.enumerate_pixels() {
        for c in 0..3 {
            pixels[[0, c, y as usize, x as usize]] =
                (pixel[c] as f32 / 255.0 - CLIP_MEAN[c]) / CLIP_STD[c];
        }
    }
    Ok(pixels)
}

impl FeatureExtractor for ClipOnnxExtractor {
    fn extract(&self, image: &DynamicImage) -> Result<Vec<f32>, DomainError> {
        let pixels = preprocess(image, CLIP_INPUT_SIZE)?;
        let input = TensorRef::from_array_view(&pixels)
            .map_err(|e| DomainError::Model(format!("TensorRef pixel_values: {e}")))?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| DomainError::Model(format!("Session lock poisoned: {e}")))?;
        let outputs = session
            .run(ort::inputs![input])
            .map_err(|e| DomainError::Model(format!("ONNX inference failed: {e}")))?;

        let (shape, data) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| DomainError::Model(format!("Extract image_embeds: {e}")))?;

        let dims: Vec<i64> = shape.iter().copied().collect();
        let dim = dims.last().copied().unwrap_or(0).max(0) as usize;
        if dim == 0 || data.len() < dim {
            return Err(DomainError::Model(format!(
                "Unexpected output shape: {dims:?}"
            )));
        }

        // Batch of one: the first row is this image.
        Ok(data[..dim].to_vec())
    }

    fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    fn name(&self) -> &str {
        &self.name
    }
}
