//! # Batch Scheduler
//!
//! Turns an ordered list of segment requests into a fully resolved
//! [`SegmentCache`] while staying inside the routing service's request budget.
//!
//! ## Algorithm
//!
//! 1. Split the requests into contiguous batches of `batch_size`
//! 2. For each batch, in order:
//!    - poll every fetch in the batch concurrently on the current task and
//!      wait for all of them to settle
//!    - store successes; collect items that produced no geometry
//!    - retry each collected item once, serially, after `serial_retry_delay`;
//!      a second miss resolves the index with its straight-line fallback
//!    - report progress after every serial retry and after the batch
//!    - wait `inter_batch_delay` before the next batch
//!
//! Fetches only return outcomes. The scheduler is the single writer to the
//! cache, and each index is written by exactly one step: the concurrent phase
//! when it succeeded there, its serial retry otherwise.

use futures::future::join_all;
use log::{info, warn};
use thiserror::Error;
use tokio::time::{sleep, Instant};

use crate::{
    build_segment_requests, AcquisitionConfig, CacheError, FetchOutcome, ProgressCallback,
    ProgressTracker, RoutingBackend, SegmentCache, SegmentFetcher, SegmentRequest, SegmentResult,
    Waypoint,
};

/// Run-level failures. These indicate programming errors, never routing trouble.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AcquisitionError {
    #[error("request at position {position} carries index {index}")]
    InvalidRequests { position: usize, index: usize },

    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// Batched, rate-limit-aware acquisition of route segments.
pub struct BatchScheduler<B> {
    fetcher: SegmentFetcher<B>,
    config: AcquisitionConfig,
}

impl<B: RoutingBackend> BatchScheduler<B> {
    pub fn new(backend: B, config: AcquisitionConfig) -> Self {
        Self {
            fetcher: SegmentFetcher::new(backend, config.clone()),
            config,
        }
    }

    pub fn config(&self) -> &AcquisitionConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        self.fetcher.backend()
    }

    /// Acquire the segments of a route that starts at `start` and visits `stops` in order.
    pub async fn acquire_route(
        &self,
        start: Waypoint,
        stops: &[Waypoint],
        on_progress: Option<&ProgressCallback>,
    ) -> Result<SegmentCache, AcquisitionError> {
        let requests = build_segment_requests(start, stops);
        self.acquire_all(&requests, on_progress).await
    }

    /// Resolve every request into a fresh cache.
    ///
    /// `requests[i].index` must equal `i`. Individual segment failures never
    /// fail the run; they end up as straight-line fallbacks.
    pub async fn acquire_all(
        &self,
        requests: &[SegmentRequest],
        on_progress: Option<&ProgressCallback>,
    ) -> Result<SegmentCache, AcquisitionError> {
        if let Some((position, req)) = requests.iter().enumerate().find(|(i, r)| r.index != *i) {
            return Err(AcquisitionError::InvalidRequests { position, index: req.index });
        }

        let total = requests.len();
        let mut cache = SegmentCache::with_capacity(total);
        let mut progress = ProgressTracker::new(total, on_progress);

        if total == 0 {
            info!("[BatchScheduler] No segments to acquire");
            progress.report();
            return Ok(cache);
        }

        let batch_size = self.config.effective_batch_size();
        let batch_count = self.config.batch_count(total);
        info!(
            "[BatchScheduler] Starting acquisition of {} segments ({} batches of up to {}, {:?} between batches)",
            total, batch_count, batch_size, self.config.inter_batch_delay
        );

        let start = Instant::now();
        progress.report();

        for (batch_num, batch) in requests.chunks(batch_size).enumerate() {
            let outcomes = join_all(batch.iter().map(|req| self.fetcher.fetch(req))).await;

            let mut failed = Vec::new();
            for (req, outcome) in batch.iter().zip(outcomes) {
                match outcome {
                    FetchOutcome::Geometry(coords) => {
                        cache.put(SegmentResult::routed(req.index, coords))?;
                        progress.record_real();
                    }
                    FetchOutcome::NoGeometry(reason) => failed.push((req, reason)),
                }
            }

            if !failed.is_empty() {
                info!(
                    "[BatchScheduler] Batch {}/{}: {} segment(s) failed, retrying serially",
                    batch_num + 1, batch_count, failed.len()
                );
            }

            for (req, first_reason) in failed {
                sleep(self.config.serial_retry_delay).await;

                match self.fetcher.fetch(req).await {
                    FetchOutcome::Geometry(coords) => {
                        info!("[BatchScheduler] Serial retry succeeded for segment {}", req.index);
                        cache.put(SegmentResult::routed(req.index, coords))?;
                        progress.record_real();
                    }
                    FetchOutcome::NoGeometry(reason) => {
                        warn!(
                            "[BatchScheduler] Segment {} unresolved ({:?}, then {:?}), using straight line",
                            req.index, first_reason, reason
                        );
                        cache.put(SegmentResult::fallback(req, reason))?;
                        progress.record_fallback();
                    }
                }

                progress.report();
            }

            progress.advance(batch.len());
            progress.report();

            if batch_num + 1 < batch_count {
                sleep(self.config.inter_batch_delay).await;
            }
        }

        let elapsed = start.elapsed();
        info!(
            "[BatchScheduler] DONE: {}/{} routed, {} straight-line fallbacks in {:.2}s",
            cache.real_count(), total, cache.fallback_count(), elapsed.as_secs_f64()
        );

        Ok(cache)
    }
}
