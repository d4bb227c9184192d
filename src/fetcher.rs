//! # Segment Fetcher
//!
//! Acquires the geometry of a single segment from a [`RoutingBackend`].
//!
//! - Rate-limit replies are retried in place, a bounded number of times, after
//!   a fixed delay
//! - Hard failures, missing routes, undecodable shapes and timeouts are not
//!   retried here; they surface as [`FetchOutcome::NoGeometry`] and the batch
//!   scheduler decides what to do next
//!
//! The fetcher holds no mutable state, so one instance can serve every
//! concurrent request in a batch.

use log::{debug, error, warn};
use tokio::time::{sleep, timeout, Instant};

use crate::{polyline, AcquisitionConfig, FallbackReason, RouteReply, RoutingBackend, SegmentRequest, Waypoint};

/// Result of fetching one segment.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// Decoded route geometry
    Geometry(Vec<Waypoint>),
    /// No usable geometry; the caller should retry or fall back
    NoGeometry(FallbackReason),
}

/// Single-segment fetcher with rate-limit retry and a per-request timeout.
pub struct SegmentFetcher<B> {
    backend: B,
    config: AcquisitionConfig,
}

impl<B: RoutingBackend> SegmentFetcher<B> {
    pub fn new(backend: B, config: AcquisitionConfig) -> Self {
        Self { backend, config }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Fetch the geometry for `request`.
    pub async fn fetch(&self, request: &SegmentRequest) -> FetchOutcome {
        let index = request.index;
        let mut retries = 0;
        let req_start = Instant::now();

        loop {
            let call = self.backend.route(request.from, request.to);
            let reply = match timeout(self.config.request_timeout, call).await {
                Ok(reply) => reply,
                Err(_) => {
                    warn!(
                        "[Fetch {}] No reply within {:?}, giving up",
                        index, self.config.request_timeout
                    );
                    return FetchOutcome::NoGeometry(FallbackReason::TimedOut);
                }
            };

            match reply {
                RouteReply::Shape(shape) => return decode_shape(index, &shape),
                RouteReply::NoRoute => {
                    warn!("[Fetch {}] Response has no route leg", index);
                    return FetchOutcome::NoGeometry(FallbackReason::NoRoute);
                }
                RouteReply::Failed(reason) => {
                    warn!("[Fetch {}] Request failed: {}", index, reason);
                    return FetchOutcome::NoGeometry(FallbackReason::Failed);
                }
                RouteReply::RateLimited => {
                    if retries >= self.config.max_rate_limit_retries {
                        warn!(
                            "[Fetch {}] 429 Too Many Requests, max retries ({}) reached after {:?}",
                            index, self.config.max_rate_limit_retries, req_start.elapsed()
                        );
                        return FetchOutcome::NoGeometry(FallbackReason::RateLimited);
                    }

                    retries += 1;
                    warn!(
                        "[Fetch {}] 429 Too Many Requests, retry {}/{} after {:?}",
                        index, retries, self.config.max_rate_limit_retries, self.config.rate_limit_delay
                    );
                    sleep(self.config.rate_limit_delay).await;
                }
            }
        }
    }
}

fn decode_shape(index: usize, shape: &str) -> FetchOutcome {
    match polyline::decode(shape) {
        Ok(coords) if coords.iter().any(|p| !p.is_valid()) => {
            error!(
                "[Fetch {}] Shape decodes to out-of-range coordinates ({} points)",
                index,
                coords.len()
            );
            FetchOutcome::NoGeometry(FallbackReason::Undecodable)
        }
        Ok(coords) if !coords.is_empty() => {
            debug!("[Fetch {}] Decoded {} points", index, coords.len());
            FetchOutcome::Geometry(coords)
        }
        Ok(_) => {
            error!("[Fetch {}] Routing service returned an empty shape", index);
            FetchOutcome::NoGeometry(FallbackReason::Undecodable)
        }
        Err(e) => {
            error!("[Fetch {}] Undecodable shape ({} bytes): {}", index, shape.len(), e);
            FetchOutcome::NoGeometry(FallbackReason::Undecodable)
        }
    }
}
