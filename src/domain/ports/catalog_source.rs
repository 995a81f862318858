use crate::domain::entities::catalog_record::CatalogRecord;
use crate::domain::error::DomainError;

pub trait CatalogSource: Send + Sync {
    /// All records, in source order.
    fn load_all(&self) -> Result<Vec<CatalogRecord>, DomainError>;
}
