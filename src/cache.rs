//! # Segment Cache
//!
//! Order-indexed, write-once store of acquired segments for one run.
//!
//! The cache is sized up front to the number of segment requests. Each slot is
//! resolved exactly once, either with a decoded route geometry or with the
//! straight-line fallback between the request's endpoints. A second write to a
//! resolved slot is a defect: it is logged and rejected, never applied.

use log::error;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{geo_utils, Bounds, SegmentRequest, Waypoint};

/// Why a segment ended up as a straight line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FallbackReason {
    /// Rate-limit retries were exhausted
    RateLimited,
    /// The service answered without a route leg
    NoRoute,
    /// Transport, status, or parse failure
    Failed,
    /// The returned shape could not be decoded
    Undecodable,
    /// The request exceeded its time budget
    TimedOut,
}

/// Geometry stored for one segment index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentResult {
    pub index: usize,
    /// Ordered (lat, lon) points of the segment
    pub coordinates: Vec<Waypoint>,
    /// True when `coordinates` is the synthetic `[from, to]` line
    pub is_fallback: bool,
    /// Present exactly when `is_fallback` is true
    pub fallback_reason: Option<FallbackReason>,
}

impl SegmentResult {
    /// A segment backed by a decoded route geometry.
    pub fn routed(index: usize, coordinates: Vec<Waypoint>) -> Self {
        Self {
            index,
            coordinates,
            is_fallback: false,
            fallback_reason: None,
        }
    }

    /// The straight-line stand-in for a request that could not be routed.
    pub fn fallback(request: &SegmentRequest, reason: FallbackReason) -> Self {
        Self {
            index: request.index,
            coordinates: request.straight_line(),
            is_fallback: true,
            fallback_reason: Some(reason),
        }
    }

    /// Segment length in meters.
    pub fn length_meters(&self) -> f64 {
        geo_utils::polyline_length(&self.coordinates)
    }

    /// Bounding box for fit-to-segment views. `None` for empty geometries.
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(&self.coordinates)
    }
}

/// Errors raised by [`SegmentCache::put`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    #[error("segment index {index} out of range for cache of {len}")]
    OutOfRange { index: usize, len: usize },

    #[error("segment index {index} already resolved")]
    AlreadyResolved { index: usize },
}

/// Write-once segment store keyed by request index.
#[derive(Debug, Clone, Default)]
pub struct SegmentCache {
    slots: Vec<Option<SegmentResult>>,
}

impl SegmentCache {
    /// Create an empty cache for `len` segments.
    pub fn with_capacity(len: usize) -> Self {
        Self { slots: vec![None; len] }
    }

    /// Resolve the slot at `result.index`.
    pub fn put(&mut self, result: SegmentResult) -> Result<(), CacheError> {
        let len = self.slots.len();
        let index = result.index;
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(CacheError::OutOfRange { index, len })?;

        if slot.is_some() {
            error!("[SegmentCache] Rejected second write to segment {}", index);
            return Err(CacheError::AlreadyResolved { index });
        }

        *slot = Some(result);
        Ok(())
    }

    /// Look up a resolved segment.
    pub fn get(&self, index: usize) -> Option<&SegmentResult> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Declared number of segments.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of slots resolved so far.
    pub fn resolved_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// True once every declared slot holds a segment.
    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    pub fn real_count(&self) -> usize {
        self.iter().filter(|s| !s.is_fallback).count()
    }

    pub fn fallback_count(&self) -> usize {
        self.iter().filter(|s| s.is_fallback).count()
    }

    /// Segments touching stop `order_index`: the one arriving at it and the one leaving it.
    ///
    /// Stop `i` is the destination of segment `i` and the origin of segment
    /// `i + 1`; the last stop has no leaving segment.
    pub fn adjacent(&self, order_index: usize) -> (Option<&SegmentResult>, Option<&SegmentResult>) {
        (self.get(order_index), order_index.checked_add(1).and_then(|i| self.get(i)))
    }

    /// Resolved segments in index order.
    pub fn iter(&self) -> impl Iterator<Item = &SegmentResult> {
        self.slots.iter().flatten()
    }

    /// Geometries of every resolved segment in index order, for drawing the whole route.
    pub fn all_coordinates(&self) -> Vec<&[Waypoint]> {
        self.iter().map(|s| s.coordinates.as_slice()).collect()
    }

    /// Consume the cache, returning resolved segments in index order.
    pub fn into_segments(self) -> Vec<SegmentResult> {
        self.slots.into_iter().flatten().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(index: usize) -> SegmentRequest {
        SegmentRequest {
            index,
            from: Waypoint::new(25.0, 121.0),
            to: Waypoint::new(25.01, 121.01),
        }
    }

    #[test]
    fn test_put_and_get() {
        let mut cache = SegmentCache::with_capacity(2);
        let coords = vec![Waypoint::new(25.0, 121.0), Waypoint::new(25.005, 121.002)];
        cache.put(SegmentResult::routed(1, coords.clone())).unwrap();

        assert!(cache.get(0).is_none());
        let seg = cache.get(1).unwrap();
        assert_eq!(seg.coordinates, coords);
        assert!(!seg.is_fallback);
        assert_eq!(cache.resolved_count(), 1);
        assert!(!cache.is_complete());
    }

    #[test]
    fn test_out_of_range_rejected() {
        let mut cache = SegmentCache::with_capacity(1);
        let err = cache.put(SegmentResult::fallback(&request(1), FallbackReason::Failed));
        assert_eq!(err, Err(CacheError::OutOfRange { index: 1, len: 1 }));
        assert!(cache.get(1).is_none());
    }

    #[test]
    fn test_second_write_not_applied() {
        let mut cache = SegmentCache::with_capacity(1);
        let coords = vec![Waypoint::new(25.0, 121.0), Waypoint::new(25.01, 121.01)];
        cache.put(SegmentResult::routed(0, coords.clone())).unwrap();

        let err = cache.put(SegmentResult::fallback(&request(0), FallbackReason::NoRoute));
        assert_eq!(err, Err(CacheError::AlreadyResolved { index: 0 }));
        assert!(!cache.get(0).unwrap().is_fallback);
    }

    #[test]
    fn test_fallback_is_straight_line() {
        let req = request(0);
        let seg = SegmentResult::fallback(&req, FallbackReason::RateLimited);
        assert_eq!(seg.coordinates, vec![req.from, req.to]);
        assert!(seg.is_fallback);
        assert_eq!(seg.fallback_reason, Some(FallbackReason::RateLimited));
    }

    #[test]
    fn test_adjacent_segments_of_stop() {
        let mut cache = SegmentCache::with_capacity(3);
        for i in 0..3 {
            cache.put(SegmentResult::fallback(&request(i), FallbackReason::Failed)).unwrap();
        }

        let (entering, leaving) = cache.adjacent(0);
        assert_eq!(entering.unwrap().index, 0);
        assert_eq!(leaving.unwrap().index, 1);

        let (entering, leaving) = cache.adjacent(2);
        assert_eq!(entering.unwrap().index, 2);
        assert!(leaving.is_none());

        assert_eq!(cache.adjacent(7), (None, None));
    }

    #[test]
    fn test_counts_and_order() {
        let mut cache = SegmentCache::with_capacity(3);
        cache.put(SegmentResult::fallback(&request(2), FallbackReason::Failed)).unwrap();
        cache.put(SegmentResult::routed(0, request(0).straight_line())).unwrap();
        cache.put(SegmentResult::routed(1, request(1).straight_line())).unwrap();

        assert!(cache.is_complete());
        assert_eq!(cache.real_count(), 2);
        assert_eq!(cache.fallback_count(), 1);
        assert_eq!(cache.all_coordinates().len(), 3);

        let indices: Vec<usize> = cache.into_segments().iter().map(|s| s.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_segment_bounds_and_length() {
        let seg = SegmentResult::fallback(&request(0), FallbackReason::TimedOut);
        let bounds = seg.bounds().unwrap();
        assert_eq!(bounds.min_lat, 25.0);
        assert_eq!(bounds.max_lng, 121.01);
        assert!(seg.length_meters() > 1000.0);
    }
}
