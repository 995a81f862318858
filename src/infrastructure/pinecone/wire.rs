//! Pinecone REST payloads and response handling.

use crate::domain::entities::query_match::QueryMatch;
use crate::domain::error::DomainError;
use crate::domain::values::metadata::Metadata;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize)]
pub struct UpsertRequest<'a> {
    pub vectors: Vec<WireVector<'a>>,
    pub namespace: &'a str,
}

#[derive(Debug, Serialize)]
pub struct WireVector<'a> {
    pub id: &'a str,
    pub values: &'a [f32],
    pub metadata: &'a Metadata,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertResponse {
    #[serde(default)]
    pub upserted_count: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest<'a> {
    pub namespace: &'a str,
    pub vector: &'a [f32],
    pub top_k: usize,
    pub include_values: bool,
    pub include_metadata: bool,
}

#[derive(Debug, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub matches: Vec<WireMatch>,
}

#[derive(Debug, Deserialize)]
pub struct WireMatch {
    pub id: String,
    #[serde(default)]
    pub score: f32,
    #[serde(default)]
    pub metadata: Option<Metadata>,
}

impl From<WireMatch> for QueryMatch {
    fn from(m: WireMatch) -> Self {
        QueryMatch {
            id: m.id,
            score: m.score,
            metadata: m.metadata,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DescribeIndexResponse {
    pub host: String,
    #[serde(default)]
    pub dimension: Option<usize>,
    #[serde(default)]
    pub metric: Option<String>,
}

/// Map a non-success HTTP status to the error the caller should see.
pub fn error_for_status(status: StatusCode, body: &str) -> DomainError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            DomainError::Authentication(format!("Pinecone rejected the API key ({status}): {body}"))
        }
        StatusCode::NOT_FOUND => DomainError::NotFound(format!("Pinecone {status}: {body}")),
        _ => DomainError::RemoteService(format!("Pinecone API {status}: {body}")),
    }
}

/// Pinecone metadata values must be strings, numbers, booleans, or lists of
/// strings. Nulls and nested objects are rejected by the service.
pub fn validate_metadata(metadata: &Metadata) -> Result<(), DomainError> {
    for (key, value) in metadata {
        let supported = match value {
            Value::String(_) | Value::Number(_) | Value::Bool(_) => true,
            Value::Array(items) => items.iter().all(Value::is_string),
            Value::Null | Value::Object(_) => false,
        };
        if !supported {
            return Err(DomainError::InvalidInput(format!(
                "metadata field '{key}' must be a string, number, boolean, or list of strings"
            )));
        }
    }
    Ok(())
}

/// The control plane reports bare hostnames; tests and proxies may pass a
/// full URL.
pub fn normalize_host(host: &str) -> String {
    let host = host.trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{host}")
    }
}
