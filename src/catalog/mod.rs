pub mod mealdb;
pub mod sources;
pub mod types;

use async_trait::async_trait;
use thiserror::Error;
use types::{DetailRecord, Partition, Summary};

/// Failures surfaced by a catalog call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// Transport failure, non-2xx status, or an unparseable body.
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The requested item id no longer resolves.
    #[error("item not found: {0}")]
    NotFound(String),
}

impl From<reqwest::Error> for CatalogError {
    fn from(e: reqwest::Error) -> Self {
        CatalogError::UpstreamUnavailable(e.to_string())
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(e: serde_json::Error) -> Self {
        CatalogError::UpstreamUnavailable(format!("malformed response: {}", e))
    }
}

/// Remote catalog with independently listed partitions.
///
/// `list_summaries` always returns the full membership of a partition;
/// callers slice client-side.
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn list_partitions(&self) -> Result<Vec<Partition>, CatalogError>;
    async fn list_summaries(&self, partition_id: &str) -> Result<Vec<Summary>, CatalogError>;
    async fn fetch_detail(&self, item_id: &str) -> Result<DetailRecord, CatalogError>;
}

#[async_trait]
impl<C: Catalog + ?Sized> Catalog for std::sync::Arc<C> {
    async fn list_partitions(&self) -> Result<Vec<Partition>, CatalogError> {
        (**self).list_partitions().await
    }

    async fn list_summaries(&self, partition_id: &str) -> Result<Vec<Summary>, CatalogError> {
        (**self).list_summaries(partition_id).await
    }

    async fn fetch_detail(&self, item_id: &str) -> Result<DetailRecord, CatalogError> {
        (**self).fetch_detail(item_id).await
    }
}
