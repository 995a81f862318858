//! Runtime settings resolved from the process environment.

use crate::domain::error::DomainError;
use crate::infrastructure::pinecone::client::DEFAULT_NAMESPACE;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_MODEL_PATH: &str = "./models/clip-vit-base-patch32/vision_model.onnx";
pub const DEFAULT_DB_PATH: &str = "./image_register.db";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexBackend {
    Pinecone,
    Sqlite,
}

impl fmt::Display for IndexBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexBackend::Pinecone => write!(f, "pinecone"),
            IndexBackend::Sqlite => write!(f, "sqlite"),
        }
    }
}

impl FromStr for IndexBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pinecone" => Ok(IndexBackend::Pinecone),
            "sqlite" => Ok(IndexBackend::Sqlite),
            _ => Err(format!("Unknown index backend: {s}")),
        }
    }
}

#[derive(Clone)]
pub struct PineconeSettings {
    pub api_key: String,
    pub index_name: String,
}

impl fmt::Debug for PineconeSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PineconeSettings")
            .field("api_key", &"<redacted>")
            .field("index_name", &self.index_name)
            .finish()
    }
}

#[derive(Clone)]
pub struct BackgroundRemovalSettings {
    pub url: String,
    pub api_key: Option<String>,
}

impl fmt::Debug for BackgroundRemovalSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackgroundRemovalSettings")
            .field("url", &self.url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub backend: IndexBackend,
    pub pinecone: Option<PineconeSettings>,
    pub namespace: String,
    pub db_path: String,
    pub model_path: PathBuf,
    pub background_removal: Option<BackgroundRemovalSettings>,
}

impl Settings {
    pub fn from_env() -> Result<Self, DomainError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, DomainError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let backend = match get("IMAGE_REGISTER_BACKEND") {
            Some(b) => b.parse::<IndexBackend>().map_err(DomainError::Config)?,
            None => IndexBackend::Pinecone,
        };

        let pinecone = match backend {
            IndexBackend::Pinecone => {
                let api_key = get("PINECONE_API_KEY").ok_or_else(|| {
                    DomainError::Authentication("PINECONE_API_KEY is not set".to_string())
                })?;
                let index_name = get("PINECONE_INDEX_NAME").ok_or_else(|| {
                    DomainError::Config("PINECONE_INDEX_NAME is not set".to_string())
                })?;
                Some(PineconeSettings { api_key, index_name })
            }
            IndexBackend::Sqlite => None,
        };

        let background_removal = get("BACKGROUND_REMOVAL_URL").map(|url| BackgroundRemovalSettings {
            url,
            api_key: get("BACKGROUND_REMOVAL_API_KEY"),
        });

        Ok(Self {
            backend,
            pinecone,
            namespace: get("IMAGE_REGISTER_NAMESPACE").unwrap_or_else(|| DEFAULT_NAMESPACE.to_string()),
            db_path: get("IMAGE_REGISTER_DB").unwrap_or_else(|| DEFAULT_DB_PATH.to_string()),
            model_path: get("IMAGE_REGISTER_MODEL")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_PATH)),
            background_removal,
        })
    }
}
