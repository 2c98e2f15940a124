//! Catalog adapters that narrow a live catalog to one partition.
//!
//! `SingleCategory` backs the "recipes in category" view and `SavedList`
//! rehydrates an externally stored list of item ids. Both let the same feed
//! controller drive every browse view.

use super::types::{DetailRecord, Partition, Summary};
use super::{Catalog, CatalogError};
use async_trait::async_trait;
use std::collections::HashSet;

/// Partition id used for the saved-items view.
pub const SAVED_PARTITION: &str = "saved";

/// Exposes a single named partition of the inner catalog.
pub struct SingleCategory<C> {
    inner: C,
    partition: Partition,
}

impl<C: Catalog> SingleCategory<C> {
    pub fn new(inner: C, category: &str) -> Self {
        Self {
            inner,
            partition: Partition::named(category),
        }
    }
}

#[async_trait]
impl<C: Catalog> Catalog for SingleCategory<C> {
    async fn list_partitions(&self) -> Result<Vec<Partition>, CatalogError> {
        Ok(vec![self.partition.clone()])
    }

    async fn list_summaries(&self, partition_id: &str) -> Result<Vec<Summary>, CatalogError> {
        if partition_id != self.partition.id {
            return Ok(Vec::new());
        }
        self.inner.list_summaries(partition_id).await
    }

    async fn fetch_detail(&self, item_id: &str) -> Result<DetailRecord, CatalogError> {
        self.inner.fetch_detail(item_id).await
    }
}

/// One synthetic partition whose membership is a fixed list of item ids.
pub struct SavedList<C> {
    inner: C,
    item_ids: Vec<String>,
}

impl<C: Catalog> SavedList<C> {
    /// Duplicate ids are dropped; the first occurrence keeps its position.
    pub fn new(inner: C, item_ids: impl IntoIterator<Item = String>) -> Self {
        let mut seen = HashSet::new();
        let item_ids = item_ids
            .into_iter()
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty() && seen.insert(id.clone()))
            .collect();
        Self { inner, item_ids }
    }

    pub fn len(&self) -> usize {
        self.item_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.item_ids.is_empty()
    }
}

#[async_trait]
impl<C: Catalog> Catalog for SavedList<C> {
    async fn list_partitions(&self) -> Result<Vec<Partition>, CatalogError> {
        Ok(vec![Partition::named(SAVED_PARTITION)])
    }

    async fn list_summaries(&self, partition_id: &str) -> Result<Vec<Summary>, CatalogError> {
        if partition_id != SAVED_PARTITION {
            return Ok(Vec::new());
        }
        Ok(self
            .item_ids
            .iter()
            .map(|id| Summary::new(id.as_str(), SAVED_PARTITION))
            .collect())
    }

    async fn fetch_detail(&self, item_id: &str) -> Result<DetailRecord, CatalogError> {
        self.inner.fetch_detail(item_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Inner catalog that must never be asked for partitions.
    struct Upstream;

    #[async_trait]
    impl Catalog for Upstream {
        async fn list_partitions(&self) -> Result<Vec<Partition>, CatalogError> {
            Err(CatalogError::UpstreamUnavailable("should not be called".to_string()))
        }

        async fn list_summaries(&self, partition_id: &str) -> Result<Vec<Summary>, CatalogError> {
            Ok(vec![Summary::new("1", partition_id), Summary::new("2", partition_id)])
        }

        async fn fetch_detail(&self, item_id: &str) -> Result<DetailRecord, CatalogError> {
            Ok(DetailRecord {
                item_id: item_id.to_string(),
                title: format!("Meal {}", item_id),
                ..DetailRecord::default()
            })
        }
    }

    #[tokio::test]
    async fn test_single_category_exposes_one_partition() {
        let source = SingleCategory::new(Upstream, "Seafood");
        let partitions = source.list_partitions().await.unwrap();
        assert_eq!(partitions, vec![Partition::named("Seafood")]);
        assert_eq!(source.list_summaries("Seafood").await.unwrap().len(), 2);
        assert!(source.list_summaries("Beef").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_saved_list_dedups_ids_in_order() {
        let ids = ["3", "1", "3", " ", "2"].map(String::from);
        let source = SavedList::new(Upstream, ids);
        assert_eq!(source.len(), 3);
        let summaries = source.list_summaries(SAVED_PARTITION).await.unwrap();
        let ids: Vec<_> = summaries.iter().map(|s| s.item_id.as_str()).collect();
        assert_eq!(ids, vec!["3", "1", "2"]);
        assert!(summaries.iter().all(|s| s.partition_id == SAVED_PARTITION));
    }

    #[tokio::test]
    async fn test_saved_list_delegates_detail() {
        let source = SavedList::new(Upstream, vec!["7".to_string()]);
        let detail = source.fetch_detail("7").await.unwrap();
        assert_eq!(detail.title, "Meal 7");
    }
}
