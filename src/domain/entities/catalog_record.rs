use crate::domain::values::metadata::Metadata;
use serde::{Deserialize, Deserializer, Serialize};

/// One image to register. `image_name` doubles as the vector id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogRecord {
    pub image_path: String,
    pub image_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub metadata: Metadata,
}

impl CatalogRecord {
    pub fn new(image_path: impl Into<String>, image_name: impl Into<String>, metadata: Metadata) -> Self {
        Self {
            image_path: image_path.into(),
            image_name: image_name.into(),
            metadata,
        }
    }
}

/// `"metadata": null` reads the same as an absent field.
fn null_as_empty<'de, D>(deserializer: D) -> Result<Metadata, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Metadata>::deserialize(deserializer)?.unwrap_or_default())
}
