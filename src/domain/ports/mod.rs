pub mod catalog_source;
pub mod embedding_port;
pub mod feature_extractor;
pub mod image_transform;
pub mod vector_index;
