//! Step-through navigation over a completed segment cache.
//!
//! A renderer shows one segment at a time (start -> first stop, then stop to
//! stop) and moves with previous/next/reset controls. Lookups go straight to
//! the cache; navigation never triggers a routing call.

use crate::{Order, SegmentCache, SegmentResult, SequenceMode};

/// Cursor over the segments of one acquisition run.
pub struct SegmentNavigator<'a> {
    cache: &'a SegmentCache,
    position: usize,
}

impl<'a> SegmentNavigator<'a> {
    pub fn new(cache: &'a SegmentCache) -> Self {
        Self { cache, position: 0 }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Segment under the cursor.
    pub fn current(&self) -> Option<&'a SegmentResult> {
        self.cache.get(self.position)
    }

    pub fn has_next(&self) -> bool {
        self.position + 1 < self.cache.len()
    }

    pub fn has_prev(&self) -> bool {
        self.position > 0
    }

    /// Move forward one segment. Returns `None` and stays put at the last segment.
    pub fn next_segment(&mut self) -> Option<&'a SegmentResult> {
        if !self.has_next() {
            return None;
        }
        self.position += 1;
        self.current()
    }

    /// Move back one segment. Returns `None` and stays put at the first segment.
    pub fn prev_segment(&mut self) -> Option<&'a SegmentResult> {
        if !self.has_prev() {
            return None;
        }
        self.position -= 1;
        self.current()
    }

    pub fn reset(&mut self) {
        self.position = 0;
    }

    /// Caption for the current segment, e.g. `"Start → A-01"` or `"A-01 → A-02"`.
    ///
    /// `orders` is the optimizer's stop list the run was built from.
    pub fn label(&self, orders: &[Order], mode: SequenceMode) -> String {
        let name = |i: usize| {
            orders
                .get(i)
                .map_or_else(|| "?".to_string(), |o| o.display_sequence(mode))
        };

        if self.position == 0 {
            format!("Start → {}", name(0))
        } else {
            format!("{} → {}", name(self.position - 1), name(self.position))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{build_segment_requests, FallbackReason, Waypoint};

    fn orders() -> Vec<Order> {
        (1..=3)
            .map(|i| Order {
                lat: 25.0 + i as f64 * 0.01,
                lon: 121.5,
                sequence: Some(i),
                group_sequence: Some(format!("B-{:02}", i)),
                tracking_number: None,
            })
            .collect()
    }

    fn cache_for(orders: &[Order]) -> SegmentCache {
        let stops: Vec<Waypoint> = orders.iter().map(Order::waypoint).collect();
        let mut cache = SegmentCache::with_capacity(stops.len());
        for req in build_segment_requests(Waypoint::new(25.0, 121.5), &stops) {
            cache.put(SegmentResult::fallback(&req, FallbackReason::NoRoute)).unwrap();
        }
        cache
    }

    #[test]
    fn test_walks_forward_and_back() {
        let orders = orders();
        let cache = cache_for(&orders);
        let mut nav = SegmentNavigator::new(&cache);

        assert_eq!(nav.current().unwrap().index, 0);
        assert!(!nav.has_prev());
        assert!(nav.prev_segment().is_none());

        assert_eq!(nav.next_segment().unwrap().index, 1);
        assert_eq!(nav.next_segment().unwrap().index, 2);
        assert!(nav.next_segment().is_none());
        assert_eq!(nav.position(), 2);

        assert_eq!(nav.prev_segment().unwrap().index, 1);
        nav.reset();
        assert_eq!(nav.position(), 0);
    }

    #[test]
    fn test_labels() {
        let orders = orders();
        let cache = cache_for(&orders);
        let mut nav = SegmentNavigator::new(&cache);

        assert_eq!(nav.label(&orders, SequenceMode::Grouped), "Start → B-01");
        nav.next_segment();
        assert_eq!(nav.label(&orders, SequenceMode::Continuous), "1 → 2");
        assert_eq!(nav.label(&orders, SequenceMode::Grouped), "B-01 → B-02");
    }

    #[test]
    fn test_empty_cache() {
        let cache = SegmentCache::with_capacity(0);
        let mut nav = SegmentNavigator::new(&cache);
        assert!(nav.is_empty());
        assert!(nav.current().is_none());
        assert!(nav.next_segment().is_none());
    }
}
