use crate::domain::entities::query_match::QueryMatch;
use crate::domain::error::DomainError;
use crate::domain::ports::embedding_port::Embedder;
use crate::domain::ports::vector_index::{validate_top_k, VectorIndex};
use std::fmt::Write;
use std::path::Path;
use std::sync::Arc;

pub const DEFAULT_TOP_K: usize = 5;

pub struct QuerySimilarUseCase {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
}

impl QuerySimilarUseCase {
    pub fn new(embedder: Arc<dyn Embedder>, index: Arc<dyn VectorIndex>) -> Self {
        Self { embedder, index }
    }

    /// Matches come back in the index's order; they are not re-sorted here.
    pub async fn execute(&self, image_path: &Path, top_k: usize) -> Result<Vec<QueryMatch>, DomainError> {
        validate_top_k(top_k)?;
        let vector = self.embedder.vectorize(image_path).await?;
        self.index.query(&vector, top_k).await
    }
}

/// Render matches as a 1-indexed ranking with 4-decimal scores.
pub fn format_matches(matches: &[QueryMatch]) -> String {
    let mut out = String::new();
    if matches.is_empty() {
        out.push_str("No similar images found.\n");
        return out;
    }

    out.push_str("Similar images:\n");
    for (rank, m) in matches.iter().enumerate() {
        let _ = writeln!(out, "\n{}. ID: {}", rank + 1, m.id);
        let _ = writeln!(out, "   Score: {:.4}", m.score);
        if let Some(metadata) = &m.metadata {
            let json = serde_json::to_string(metadata).unwrap_or_default();
            let _ = writeln!(out, "   Metadata: {json}");
        }
    }
    out
}
