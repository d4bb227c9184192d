//! Routing backend seam.
//!
//! The segment pipeline only needs to know whether a routing call produced a
//! shape, no route, a rate-limit rejection, or some other failure. Transport
//! and wire format belong to the implementor (see `http::ValhallaClient`).

use std::future::Future;
use std::sync::Arc;

use crate::Waypoint;

/// Classified reply of a single routing call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteReply {
    /// Encoded polyline of the first route leg
    Shape(String),
    /// Well-formed response without a route leg
    NoRoute,
    /// The service rejected the call for exceeding its request budget (HTTP 429)
    RateLimited,
    /// Transport, status, or parse failure
    Failed(String),
}

/// Async routing service used by [`SegmentFetcher`](crate::SegmentFetcher).
///
/// Implementations issue exactly one request per call and must not retry on
/// their own; retry policy lives in the fetcher and scheduler.
pub trait RoutingBackend: Send + Sync {
    /// Request a route from `from` to `to`.
    fn route(&self, from: Waypoint, to: Waypoint) -> impl Future<Output = RouteReply> + Send;
}

impl<T: RoutingBackend> RoutingBackend for Arc<T> {
    fn route(&self, from: Waypoint, to: Waypoint) -> impl Future<Output = RouteReply> + Send {
        (**self).route(from, to)
    }
}

impl<T: RoutingBackend> RoutingBackend for &T {
    fn route(&self, from: Waypoint, to: Waypoint) -> impl Future<Output = RouteReply> + Send {
        (**self).route(from, to)
    }
}
