use crate::domain::entities::catalog_record::CatalogRecord;
use crate::domain::error::DomainError;
use crate::domain::ports::catalog_source::CatalogSource;
use serde::Deserialize;
use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Deserialize)]
struct CatalogFile {
    items: Vec<CatalogRecord>,
}

/// Catalog stored as `{"items": [{"image_path", "image_name", "metadata"?}, ...]}`.
///
/// `image_name` becomes the vector id, so duplicates would silently overwrite
/// each other in the index. They are rejected unless explicitly allowed.
pub struct JsonCatalog {
    path: PathBuf,
    allow_duplicate_ids: bool,
}

impl JsonCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            allow_duplicate_ids: false,
        }
    }

    pub fn allow_duplicate_ids(mut self, allow: bool) -> Self {
        self.allow_duplicate_ids = allow;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Parse catalog JSON text. Required fields are enforced by serde;
/// `metadata` defaults to an empty map.
pub fn parse_catalog(text: &str) -> Result<Vec<CatalogRecord>, DomainError> {
    let file: CatalogFile = serde_json::from_str(text)
        .map_err(|e| DomainError::Format(format!("Invalid catalog: {e}")))?;

    for (i, record) in file.items.iter().enumerate() {
        if record.image_name.trim().is_empty() {
            return Err(DomainError::Format(format!("item {i}: image_name is empty")));
        }
        if record.image_path.trim().is_empty() {
            return Err(DomainError::Format(format!("item {i}: image_path is empty")));
        }
    }
    Ok(file.items)
}

fn check_unique_ids(records: &[CatalogRecord], allow_duplicates: bool) -> Result<(), DomainError> {
    let mut seen = HashSet::new();
    for (i, record) in records.iter().enumerate() {
        if !seen.insert(record.image_name.as_str()) {
            if !allow_duplicates {
                return Err(DomainError::Format(format!(
                    "item {i}: duplicate image_name '{}'",
                    record.image_name
                )));
            }
            warn!(image_name = %record.image_name, item = i, "Duplicate image_name; the later item will overwrite the earlier one");
        }
    }
    Ok(())
}

impl CatalogSource for JsonCatalog {
    fn load_all(&self) -> Result<Vec<CatalogRecord>, DomainError> {
        let text = std::fs::read_to_string(&self.path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => {
                DomainError::NotFound(format!("catalog file {}", self.path.display()))
            }
            _ => DomainError::Format(format!("cannot read catalog {}: {e}", self.path.display())),
        })?;

        let records = parse_catalog(&text)?;
        check_unique_ids(&records, self.allow_duplicate_ids)?;
        Ok(records)
    }
}
