//! Incremental, partitioned feed aggregation.
//!
//! Each `request_next_page` call loads one page: the next partition in
//! round-robin order is listed, the unconsumed slice of its membership is
//! hydrated, and the results are merged into the feed. The upstream never
//! reports totals, so exhaustion is decided by a heuristic:
//!
//! - the feed holds `partitions * page_size * cap_pages_per_partition` items, or
//! - a page hydrated fewer than `page_size` records and it was the last
//!   partition of a round-robin cycle.
//!
//! At most one page is in flight. A request that arrives while a page is
//! loading (or after the feed stopped) is dropped, not queued.

use super::accumulator::merge;
use super::cursor::PartitionCursorSet;
use super::hydrator::Hydrator;
use crate::catalog::types::{DetailRecord, Partition, Summary};
use crate::catalog::{Catalog, CatalogError};
use crate::config::FeedConfig;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    LoadingPage,
    Exhausted,
    /// Terminal until `reset`.
    Failed(CatalogError),
}

/// Read-only snapshot handed to the view layer.
#[derive(Debug, Clone, Serialize)]
pub struct FeedState {
    pub items: Vec<DetailRecord>,
    /// 1-based index of the next page to load.
    pub current_page_index: usize,
    pub exhausted: bool,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for FeedState {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            current_page_index: 1,
            exhausted: false,
            updated_at: None,
        }
    }
}

/// What one completed page did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageReport {
    pub page_index: usize,
    /// `None` when the catalog has no partitions at all.
    pub partition_id: Option<String>,
    pub slice_len: usize,
    pub hydrated: usize,
    pub added: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    /// Not Idle; nothing was fetched.
    Skipped(ControllerState),
    Loaded(PageReport),
    /// The page completed and the feed is now exhausted.
    Exhausted(PageReport),
    Failed(CatalogError),
}

struct Inner {
    state: ControllerState,
    feed: FeedState,
    cursors: PartitionCursorSet,
    /// Fetched once on the first page request, kept until reset.
    partitions: Option<Arc<Vec<Partition>>>,
}

impl Inner {
    fn new() -> Self {
        Self {
            state: ControllerState::Idle,
            feed: FeedState::default(),
            cursors: PartitionCursorSet::new(),
            partitions: None,
        }
    }
}

/// Owns one feed session: its items, cursors and cached partition list.
///
/// Methods take `&self`; the mutex only guards short state updates and is
/// never held across an await. `LoadingPage` is what keeps pages exclusive.
pub struct FeedController<C> {
    catalog: C,
    config: FeedConfig,
    hydrator: Hydrator,
    inner: Mutex<Inner>,
}

impl<C: Catalog> FeedController<C> {
    pub fn new(catalog: C, config: FeedConfig) -> Self {
        let hydrator = Hydrator::from_config(&config);
        Self {
            catalog,
            config,
            hydrator,
            inner: Mutex::new(Inner::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn feed_state(&self) -> FeedState {
        self.lock().feed.clone()
    }

    pub fn controller_state(&self) -> ControllerState {
        self.lock().state.clone()
    }

    pub fn consumed_count(&self, partition_id: &str) -> usize {
        self.lock().cursors.consumed_count(partition_id)
    }

    /// Cached partition list, once the first page has bootstrapped it.
    pub fn partitions(&self) -> Option<Vec<Partition>> {
        self.lock().partitions.as_ref().map(|p| p.as_ref().clone())
    }

    /// Start a fresh session. Refused while a page is loading.
    pub fn reset(&self) -> bool {
        let mut inner = self.lock();
        if inner.state == ControllerState::LoadingPage {
            return false;
        }
        *inner = Inner::new();
        tracing::debug!("feed reset");
        true
    }

    /// Load the next page if the controller is Idle.
    pub async fn request_next_page(&self) -> PageOutcome {
        let page_index = {
            let mut inner = self.lock();
            if inner.state != ControllerState::Idle {
                tracing::debug!(state = ?inner.state, "page request ignored");
                return PageOutcome::Skipped(inner.state.clone());
            }
            inner.state = ControllerState::LoadingPage;
            inner.feed.current_page_index
        };

        match self.load_page(page_index).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(page = page_index, error = %e, "page load failed");
                self.lock().state = ControllerState::Failed(e.clone());
                PageOutcome::Failed(e)
            }
        }
    }

    /// Memoized partition list. Only one page runs at a time, so the
    /// unlocked fetch cannot race another bootstrap.
    async fn bootstrap_partitions(&self) -> Result<Arc<Vec<Partition>>, CatalogError> {
        let cached = self.lock().partitions.clone();
        if let Some(partitions) = cached {
            return Ok(partitions);
        }
        let partitions = Arc::new(self.catalog.list_partitions().await?);
        tracing::info!(count = partitions.len(), "partitions loaded");
        self.lock().partitions = Some(partitions.clone());
        Ok(partitions)
    }

    async fn load_page(&self, page_index: usize) -> Result<PageOutcome, CatalogError> {
        let partitions = self.bootstrap_partitions().await?;
        let partition_count = partitions.len();
        if partition_count == 0 {
            tracing::warn!("catalog has no partitions");
            let mut inner = self.lock();
            inner.feed.exhausted = true;
            inner.feed.updated_at = Some(Utc::now());
            inner.state = ControllerState::Exhausted;
            return Ok(PageOutcome::Exhausted(PageReport {
                page_index,
                partition_id: None,
                slice_len: 0,
                hydrated: 0,
                added: 0,
            }));
        }

        let target = &partitions[(page_index - 1) % partition_count];
        let summaries = self.catalog.list_summaries(&target.id).await?;
        let slice = self.next_slice(&target.id, &summaries);

        let hydrated = self.hydrator.hydrate(&self.catalog, &slice).await;

        let mut inner = self.lock();
        let before = inner.feed.items.len();
        let merged = merge(&inner.feed.items, &hydrated);
        inner.feed.items = merged;
        inner.cursors.advance(&target.id, slice.len());

        let report = PageReport {
            page_index,
            partition_id: Some(target.id.clone()),
            slice_len: slice.len(),
            hydrated: hydrated.len(),
            added: inner.feed.items.len() - before,
        };

        let cap_reached = self
            .config
            .item_cap(partition_count)
            .is_some_and(|cap| inner.feed.items.len() >= cap);
        let cycle_complete = page_index % partition_count == 0;
        let underfilled = hydrated.len() < self.config.page_size;
        let exhausted = cap_reached || (underfilled && cycle_complete);

        inner.feed.current_page_index = page_index + 1;
        inner.feed.updated_at = Some(Utc::now());

        tracing::debug!(
            page = page_index,
            partition = %target.id,
            consumed = inner.cursors.consumed_count(&target.id),
            slice = report.slice_len,
            hydrated = report.hydrated,
            added = report.added,
            total = inner.feed.items.len(),
            "page loaded"
        );

        if exhausted {
            tracing::info!(total = inner.feed.items.len(), pages = page_index, "feed exhausted");
            inner.feed.exhausted = true;
            inner.state = ControllerState::Exhausted;
            Ok(PageOutcome::Exhausted(report))
        } else {
            inner.state = ControllerState::Idle;
            Ok(PageOutcome::Loaded(report))
        }
    }

    /// Unconsumed part of a partition's membership, at most one page long.
    fn next_slice(&self, partition_id: &str, summaries: &[Summary]) -> Vec<Summary> {
        let mut inner = self.lock();
        inner.cursors.observe_size(partition_id, summaries.len());
        let start = inner.cursors.consumed_count(partition_id).min(summaries.len());
        let end = start.saturating_add(self.config.page_size).min(summaries.len());
        summaries[start..end].to_vec()
    }
}
