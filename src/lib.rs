//! # Route Segments
//!
//! Rate-limited acquisition of road-network segments between ordered waypoints.
//!
//! This library provides:
//! - A precision-6 polyline codec for routing service geometries
//! - A segment fetcher with bounded rate-limit retries and per-request timeouts
//! - A batch scheduler that respects the routing service's request budget
//! - A write-once, index-keyed segment cache with straight-line fallbacks
//! - Progress reporting and a step-through navigator for completed runs
//!
//! ## Features
//!
//! - **`http`** - Enable the reqwest-based Valhalla routing client
//! - **`full`** - Enable all features
//!
//! ## Quick Start
//!
//! ```rust
//! use route_segments::{Waypoint, build_segment_requests};
//!
//! let start = Waypoint::new(25.0330, 121.5654);
//! let stops = vec![
//!     Waypoint::new(25.0478, 121.5170),
//!     Waypoint::new(25.0375, 121.5637),
//! ];
//!
//! // One request per consecutive pair, start -> first stop first
//! let requests = build_segment_requests(start, &stops);
//! assert_eq!(requests.len(), 2);
//! assert_eq!(requests[0].from, start);
//! assert_eq!(requests[1].to, stops[1]);
//! ```

use serde::{Deserialize, Serialize};

pub mod backend;
pub use backend::{RouteReply, RoutingBackend};

pub mod cache;
pub use cache::{CacheError, FallbackReason, SegmentCache, SegmentResult};

pub mod config;
pub use config::AcquisitionConfig;

pub mod fetcher;
pub use fetcher::{FetchOutcome, SegmentFetcher};

pub mod geo_utils;

pub mod input;
pub use input::{InputError, Order, OptimizationResult, SequenceMode};

pub mod navigator;
pub use navigator::SegmentNavigator;

pub mod polyline;
pub use polyline::PolylineError;

pub mod progress;
pub use progress::{ProgressCallback, ProgressSnapshot, ProgressTracker};

pub mod scheduler;
pub use scheduler::{AcquisitionError, BatchScheduler};

pub mod valhalla;

#[cfg(test)]
mod testing;

// HTTP module for the Valhalla routing client
#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "http")]
pub use http::{preload_segments_blocking, ValhallaClient, ValhallaConfig};

/// Initialize logging for Android hosts.
#[cfg(target_os = "android")]
pub fn init_logging() {
    use android_logger::Config;
    use log::LevelFilter;

    android_logger::init_once(
        Config::default()
            .with_max_level(LevelFilter::Debug)
            .with_tag("RouteSegmentsRust")
    );
}

/// Initialize logging for Android hosts.
///
/// No-op on other platforms; binaries install their own `log` backend.
#[cfg(not(target_os = "android"))]
pub fn init_logging() {}

// ============================================================================
// Core Types
// ============================================================================

/// A geographic waypoint with latitude and longitude in degrees.
///
/// # Example
/// ```
/// use route_segments::Waypoint;
/// let point = Waypoint::new(25.0330, 121.5654); // Taipei
/// assert!(point.is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl Waypoint {
    /// Create a new waypoint.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Check if the point has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }
}

/// Bounding box of a segment geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Bounds {
    /// Create bounds from waypoints.
    pub fn from_points(points: &[Waypoint]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        Some(geo_utils::compute_bounds(points))
    }

    /// Get the center point of the bounds.
    pub fn center(&self) -> Waypoint {
        Waypoint::new(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lng + self.max_lng) / 2.0,
        )
    }
}

/// One segment to acquire: the path between two consecutive waypoints.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmentRequest {
    /// Position of the pair in the route (0 = start -> first stop)
    pub index: usize,
    pub from: Waypoint,
    pub to: Waypoint,
}

impl SegmentRequest {
    /// The synthetic two-point geometry used when no route can be obtained.
    pub fn straight_line(&self) -> Vec<Waypoint> {
        vec![self.from, self.to]
    }
}

/// Build the ordered segment requests for a route.
///
/// The start point sits conceptually before the first stop, so request 0 is
/// `start -> stops[0]` and request `i` is `stops[i - 1] -> stops[i]`. An empty
/// stop list yields no requests.
pub fn build_segment_requests(start: Waypoint, stops: &[Waypoint]) -> Vec<SegmentRequest> {
    std::iter::once(start)
        .chain(stops.iter().copied())
        .zip(stops.iter().copied())
        .enumerate()
        .map(|(index, (from, to))| SegmentRequest { index, from, to })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
