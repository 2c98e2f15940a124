//! Serial, spaced-out detail fetching.
//!
//! The upstream has no bulk-detail endpoint, so a page of N summaries costs N
//! detail calls. They run one at a time with a minimum gap between calls to
//! stay under upstream throttling.

use crate::catalog::types::{DetailRecord, Summary};
use crate::catalog::{Catalog, CatalogError};
use crate::config::FeedConfig;
use rand::Rng;
use std::time::Duration;

pub struct Hydrator {
    delay: Duration,
    jitter_ms: u64,
}

impl Hydrator {
    pub fn new(delay: Duration, jitter_ms: u64) -> Self {
        Self { delay, jitter_ms }
    }

    pub fn from_config(config: &FeedConfig) -> Self {
        Self::new(Duration::from_millis(config.hydrate_delay_ms), config.hydrate_jitter_ms)
    }

    /// Gap before the next call: the minimum delay plus optional random jitter.
    fn spacing(&self) -> Duration {
        if self.jitter_ms == 0 {
            return self.delay;
        }
        let extra = rand::thread_rng().gen_range(0..=self.jitter_ms);
        self.delay + Duration::from_millis(extra)
    }

    /// Fetch full detail for each summary, in order.
    ///
    /// Items that fail are logged and left out; the batch itself never fails.
    /// Each returned record carries the partition of its summary.
    pub async fn hydrate<C: Catalog + ?Sized>(
        &self,
        catalog: &C,
        summaries: &[Summary],
    ) -> Vec<DetailRecord> {
        let mut records = Vec::with_capacity(summaries.len());
        for (i, summary) in summaries.iter().enumerate() {
            if i > 0 {
                let gap = self.spacing();
                if !gap.is_zero() {
                    tokio::time::sleep(gap).await;
                }
            }
            match catalog.fetch_detail(&summary.item_id).await {
                Ok(mut record) => {
                    record.partition_id = summary.partition_id.clone();
                    records.push(record);
                }
                Err(CatalogError::NotFound(id)) => {
                    tracing::warn!(item = %id, partition = %summary.partition_id, "detail not found, skipping");
                }
                Err(e) => {
                    tracing::warn!(item = %summary.item_id, error = %e, "detail fetch failed, skipping");
                }
            }
        }
        if records.len() < summaries.len() {
            tracing::debug!(
                requested = summaries.len(),
                hydrated = records.len(),
                "partial batch"
            );
        }
        records
    }
}
