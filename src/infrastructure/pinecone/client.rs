use super::wire::{
    error_for_status, normalize_host, validate_metadata, DescribeIndexResponse, QueryRequest,
    QueryResponse, UpsertRequest, UpsertResponse, WireVector,
};
use crate::domain::entities::query_match::QueryMatch;
use crate::domain::error::DomainError;
use crate::domain::ports::vector_index::{validate_top_k, VectorIndex};
use crate::domain::values::embedding_vector::EmbeddingVector;
use crate::domain::values::metadata::Metadata;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_NAMESPACE: &str = "ns1";
pub const CONTROL_PLANE_URL: &str = "https://api.pinecone.io";
const API_VERSION: &str = "2024-07";

/// Pinecone serverless index, addressed through its data-plane host.
pub struct PineconeIndex {
    client: Client,
    api_key: String,
    host: String,
    namespace: String,
    dimension: Option<usize>,
}

impl PineconeIndex {
    /// Resolve the index host through the control plane. Bad credentials or a
    /// missing index fail here rather than on the first upsert.
    pub async fn connect(api_key: &str, index_name: &str, namespace: &str) -> Result<Self, DomainError> {
        Self::connect_via(CONTROL_PLANE_URL, api_key, index_name, namespace).await
    }

    pub async fn connect_via(
        control_plane_url: &str,
        api_key: &str,
        index_name: &str,
        namespace: &str,
    ) -> Result<Self, DomainError> {
        check_api_key(api_key)?;
        if index_name.trim().is_empty() {
            return Err(DomainError::Config("Pinecone index name is empty".to_string()));
        }

        let client = build_client()?;
        let url = format!(
            "{}/indexes/{}",
            control_plane_url.trim_end_matches('/'),
            index_name
        );
        let resp = client
            .get(&url)
            .header("Api-Key", api_key)
            .header("X-Pinecone-API-Version", API_VERSION)
            .send()
            .await
            .map_err(|e| DomainError::RemoteService(format!("Pinecone control plane: {e}")))?;
        let resp = check_status(resp).await?;

        let described: DescribeIndexResponse = resp
            .json()
            .await
            .map_err(|e| DomainError::RemoteService(format!("Parse describe_index response: {e}")))?;

        let host = normalize_host(&described.host);
        info!(
            index = index_name,
            host = %host,
            dimension = ?described.dimension,
            metric = ?described.metric,
            namespace,
            "Connected to Pinecone index"
        );

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            host,
            namespace: namespace.to_string(),
            dimension: described.dimension,
        })
    }

    /// Skip the control plane when the data-plane host is already known.
    pub fn with_host(api_key: &str, host: &str, namespace: &str) -> Result<Self, DomainError> {
        check_api_key(api_key)?;
        Ok(Self {
            client: build_client()?,
            api_key: api_key.to_string(),
            host: normalize_host(host),
            namespace: namespace.to_string(),
            dimension: None,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.client
            .post(format!("{}{}", self.host, path))
            .header("Api-Key", &self.api_key)
            .header("X-Pinecone-API-Version", API_VERSION)
    }
}

fn check_api_key(api_key: &str) -> Result<(), DomainError> {
    if api_key.trim().is_empty() {
        return Err(DomainError::Authentication(
            "Pinecone API key is missing".to_string(),
        ));
    }
    Ok(())
}

fn build_client() -> Result<Client, DomainError> {
    Client::builder()
        .user_agent("image-register/0.1")
        .timeout(Duration::from_secs(30))
        .build()
        .map_err(|e| DomainError::RemoteService(format!("HTTP client: {e}")))
}

async fn check_status(resp: Response) -> Result<Response, DomainError> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    Err(error_for_status(status, &body))
}

#[async_trait]
impl VectorIndex for PineconeIndex {
    async fn upsert(
        &self,
        id: &str,
        vector: &EmbeddingVector,
        metadata: &Metadata,
    ) -> Result<(), DomainError> {
        validate_metadata(metadata)?;

        let resp = self
            .post("/vectors/upsert")
            .json(&UpsertRequest {
                vectors: vec![WireVector {
                    id,
                    values: vector,
                    metadata,
                }],
                namespace: &self.namespace,
            })
            .send()
            .await
            .map_err(|e| DomainError::RemoteService(format!("Pinecone upsert: {e}")))?;
        let resp = check_status(resp).await?;

        let ack: UpsertResponse = resp
            .json()
            .await
            .map_err(|e| DomainError::RemoteService(format!("Parse upsert response: {e}")))?;
        debug!(id, upserted = ack.upserted_count, "Pinecone upsert acknowledged");
        Ok(())
    }

    async fn query(
        &self,
        vector: &EmbeddingVector,
        top_k: usize,
    ) -> Result<Vec<QueryMatch>, DomainError> {
        validate_top_k(top_k)?;

        let resp = self
            .post("/query")
            .json(&QueryRequest {
                namespace: &self.namespace,
                vector,
                top_k,
                include_values: false,
                include_metadata: true,
            })
            .send()
            .await
            .map_err(|e| DomainError::RemoteService(format!("Pinecone query: {e}")))?;
        let resp = check_status(resp).await?;

        let result: QueryResponse = resp
            .json()
            .await
            .map_err(|e| DomainError::RemoteService(format!("Parse query response: {e}")))?;
        Ok(result.matches.into_iter().map(QueryMatch::from).collect())
    }

    fn namespace(&self) -> &str {
        &self.namespace
    }

    fn dimension(&self) -> Option<usize> {
        self.dimension
    }
}
