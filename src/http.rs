//! HTTP client for the Valhalla routing service.
//!
//! This module provides the production [`RoutingBackend`]:
//! - Connection pooling and keep-alive for the many small route calls of a run
//! - One request per call; 429 is reported as [`RouteReply::RateLimited`] and
//!   retried by the fetcher, never here
//! - A blocking wrapper for hosts without an async runtime

use std::future::Future;
use std::time::Duration;

use log::{debug, info, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::valhalla::{self, RouteRequest};
use crate::{
    AcquisitionConfig, BatchScheduler, ProgressCallback, RouteReply, RoutingBackend, SegmentCache,
    Waypoint,
};

/// Public Valhalla instance used by default.
pub const DEFAULT_BASE_URL: &str = "https://valhalla1.openstreetmap.de";

/// Connection settings for [`ValhallaClient`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValhallaConfig {
    /// Service root; `/route` is appended. Point this at a proxy to avoid CORS or add auth.
    pub base_url: String,
    /// Valhalla costing model.
    /// Default: "auto"
    pub costing: String,
    /// Distance units for directions.
    /// Default: "kilometers"
    pub units: String,
    /// Transport-level timeout, independent of the fetcher's request timeout.
    /// Default: 30s
    pub http_timeout: Duration,
}

impl Default for ValhallaConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            costing: valhalla::DEFAULT_COSTING.to_string(),
            units: valhalla::DEFAULT_UNITS.to_string(),
            http_timeout: Duration::from_secs(30),
        }
    }
}

/// Valhalla routing client
pub struct ValhallaClient {
    client: Client,
    route_url: String,
    costing: String,
    units: String,
}

impl ValhallaClient {
    /// Create a new client for the given configuration
    pub fn new(config: &ValhallaConfig) -> Result<Self, String> {
        let client = Client::builder()
            .pool_max_idle_per_host(8)
            .pool_idle_timeout(Duration::from_secs(60))
            .tcp_keepalive(Duration::from_secs(30))
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| format!("Failed to create HTTP client: {}", e))?;

        Ok(Self {
            client,
            route_url: format!("{}/route", config.base_url.trim_end_matches('/')),
            costing: config.costing.clone(),
            units: config.units.clone(),
        })
    }

    pub fn route_url(&self) -> &str {
        &self.route_url
    }

    async fn post_route(&self, from: Waypoint, to: Waypoint) -> RouteReply {
        let body = RouteRequest::new(from, to, &self.costing, &self.units);
        let req_start = Instant::now();

        let resp = match self.client.post(&self.route_url).json(&body).send().await {
            Ok(resp) => resp,
            Err(e) => return RouteReply::Failed(format!("Request error: {}", e)),
        };

        let status = resp.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            warn!("[Valhalla] 429 Too Many Requests after {:?}", req_start.elapsed());
            return RouteReply::RateLimited;
        }
        if status == reqwest::StatusCode::BAD_REQUEST {
            // Valhalla reports unroutable pairs as 400 with an error_code body
            return match resp.bytes().await {
                Ok(body) => valhalla::classify_error_body(&body),
                Err(e) => RouteReply::Failed(format!("HTTP 400, body download error: {}", e)),
            };
        }
        if !status.is_success() {
            return RouteReply::Failed(format!("HTTP {}", status));
        }

        let bytes = match resp.bytes().await {
            Ok(b) => b,
            Err(e) => return RouteReply::Failed(format!("Body download error: {}", e)),
        };

        debug!(
            "[Valhalla] {:.1}KB in {:?}",
            bytes.len() as f64 / 1024.0,
            req_start.elapsed()
        );

        valhalla::classify_body(&bytes)
    }
}

impl RoutingBackend for ValhallaClient {
    fn route(&self, from: Waypoint, to: Waypoint) -> impl Future<Output = RouteReply> + Send {
        self.post_route(from, to)
    }
}

/// Synchronous wrapper: acquires every segment of a route on a private tokio runtime.
pub fn preload_segments_blocking(
    valhalla: &ValhallaConfig,
    config: AcquisitionConfig,
    start: Waypoint,
    stops: &[Waypoint],
    on_progress: Option<ProgressCallback>,
) -> Result<SegmentCache, String> {
    use tokio::runtime::Builder;

    info!(
        "[Valhalla] preload_segments_blocking called for {} segments via {}",
        stops.len(), valhalla.base_url
    );

    let rt = Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .map_err(|e| format!("Failed to create tokio runtime: {}", e))?;

    let client = ValhallaClient::new(valhalla)?;
    let scheduler = BatchScheduler::new(client, config);

    rt.block_on(scheduler.acquire_route(start, stops, on_progress.as_ref()))
        .map_err(|e| format!("Segment acquisition aborted: {}", e))
}
