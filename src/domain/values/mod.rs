pub mod embedding_vector;
pub mod metadata;
