// In-memory catalog shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use recipe_feed::catalog::types::{DetailRecord, Partition, Summary};
use recipe_feed::catalog::{Catalog, CatalogError};
use recipe_feed::config::FeedConfig;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

pub struct FakeCatalog {
    partitions: Vec<(String, Vec<String>)>,
    missing: HashSet<String>,
    partitions_down: AtomicBool,
    summaries_down: Mutex<HashSet<String>>,
    pub partition_calls: AtomicUsize,
    pub summary_calls: AtomicUsize,
    pub detail_calls: AtomicUsize,
}

impl FakeCatalog {
    /// Partitions with explicit membership lists.
    pub fn with_members(partitions: &[(&str, &[&str])]) -> Self {
        Self {
            partitions: partitions
                .iter()
                .map(|(name, ids)| (name.to_string(), ids.iter().map(|id| id.to_string()).collect()))
                .collect(),
            missing: HashSet::new(),
            partitions_down: AtomicBool::new(false),
            summaries_down: Mutex::new(HashSet::new()),
            partition_calls: AtomicUsize::new(0),
            summary_calls: AtomicUsize::new(0),
            detail_calls: AtomicUsize::new(0),
        }
    }

    /// Partitions of the given sizes with ids "<partition>-<n>".
    pub fn sized(partitions: &[(&str, usize)]) -> Self {
        let mut fake = Self::with_members(&[]);
        fake.partitions = partitions
            .iter()
            .map(|(name, size)| (name.to_string(), (0..*size).map(|i| format!("{}-{}", name, i)).collect()))
            .collect();
        fake
    }

    /// Ids whose detail lookup returns NotFound.
    pub fn missing(mut self, ids: &[&str]) -> Self {
        self.missing = ids.iter().map(|id| id.to_string()).collect();
        self
    }

    pub fn set_partitions_down(&self, down: bool) {
        self.partitions_down.store(down, Ordering::SeqCst);
    }

    pub fn set_summaries_down(&self, partition: &str) {
        self.summaries_down.lock().unwrap().insert(partition.to_string());
    }

    pub fn calls(&self) -> (usize, usize, usize) {
        (
            self.partition_calls.load(Ordering::SeqCst),
            self.summary_calls.load(Ordering::SeqCst),
            self.detail_calls.load(Ordering::SeqCst),
        )
    }
}

#[async_trait]
impl Catalog for FakeCatalog {
    async fn list_partitions(&self) -> Result<Vec<Partition>, CatalogError> {
        tokio::task::yield_now().await;
        self.partition_calls.fetch_add(1, Ordering::SeqCst);
        if self.partitions_down.load(Ordering::SeqCst) {
            return Err(CatalogError::UpstreamUnavailable("connection refused".to_string()));
        }
        Ok(self.partitions.iter().map(|(name, _)| Partition::named(name)).collect())
    }

    async fn list_summaries(&self, partition_id: &str) -> Result<Vec<Summary>, CatalogError> {
        tokio::task::yield_now().await;
        self.summary_calls.fetch_add(1, Ordering::SeqCst);
        if self.summaries_down.lock().unwrap().contains(partition_id) {
            return Err(CatalogError::UpstreamUnavailable("502 Bad Gateway".to_string()));
        }
        Ok(self
            .partitions
            .iter()
            .find(|(name, _)| name == partition_id)
            .map(|(_, ids)| ids.iter().map(|id| Summary::new(id.as_str(), partition_id)).collect())
            .unwrap_or_default())
    }

    async fn fetch_detail(&self, item_id: &str) -> Result<DetailRecord, CatalogError> {
        tokio::task::yield_now().await;
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        if self.missing.contains(item_id) {
            return Err(CatalogError::NotFound(item_id.to_string()));
        }
        Ok(DetailRecord {
            item_id: item_id.to_string(),
            title: format!("Recipe {}", item_id),
            ..DetailRecord::default()
        })
    }
}

/// Default feed settings without the inter-call delay.
pub fn fast_config() -> FeedConfig {
    FeedConfig {
        hydrate_delay_ms: 0,
        ..FeedConfig::default()
    }
}

pub fn uncapped_config() -> FeedConfig {
    FeedConfig {
        cap_pages_per_partition: None,
        ..fast_config()
    }
}
