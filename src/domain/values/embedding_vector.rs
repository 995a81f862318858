use crate::domain::error::DomainError;
use serde::Serialize;
use std::ops::Deref;

/// An L2-normalized embedding. The only way to build one is
/// [`EmbeddingVector::normalized`], so every instance has unit norm.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct EmbeddingVector(Vec<f32>);

impl EmbeddingVector {
    /// Divide `raw` by its Euclidean norm.
    ///
    /// Fails on empty, zero-norm, or non-finite input instead of producing NaN.
    pub fn normalized(raw: Vec<f32>) -> Result<Self, DomainError> {
        if raw.is_empty() {
            return Err(DomainError::Normalization(
                "feature vector is empty".to_string(),
            ));
        }
        if raw.iter().any(|v| !v.is_finite()) {
            return Err(DomainError::Normalization(
                "feature vector contains non-finite values".to_string(),
            ));
        }

        // Accumulate in f64 so large dimensions don't lose precision.
        let norm = raw.iter().map(|v| (*v as f64) * (*v as f64)).sum::<f64>().sqrt();
        if norm == 0.0 || !norm.is_finite() {
            return Err(DomainError::Normalization(format!(
                "cannot normalize a vector with norm {norm}"
            )));
        }

        Ok(EmbeddingVector(
            raw.into_iter().map(|v| (v as f64 / norm) as f32).collect(),
        ))
    }

    pub fn dimension(&self) -> usize {
        self.0.len()
    }

    pub fn norm(&self) -> f64 {
        self.0.iter().map(|v| (*v as f64) * (*v as f64)).sum::<f64>().sqrt()
    }

    /// Dot product; equals cosine similarity for two unit vectors.
    pub fn dot(&self, other: &[f32]) -> f64 {
        if self.0.len() != other.len() {
            return 0.0;
        }
        self.0
            .iter()
            .zip(other.iter())
            .map(|(a, b)| *a as f64 * *b as f64)
            .sum()
    }

    pub fn into_inner(self) -> Vec<f32> {
        self.0
    }
}

impl Deref for EmbeddingVector {
    type Target = [f32];

    fn deref(&self) -> &[f32] {
        &self.0
    }
}
