pub mod catalog;
pub mod embeddings;
pub mod pinecone;
pub mod sqlite;
pub mod transforms;
