pub mod clip_onnx;
pub mod image_embedder;
