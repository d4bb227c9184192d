//! Segment preloading against an in-process routing backend.
//!
//! The backend rate-limits every fourth call and never routes to one stop,
//! so the run shows in-place retries, a serial retry and a straight-line fallback.
//!
//! Run with: RUST_LOG=info cargo run --example offline_preload

use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use route_segments::{
    polyline, AcquisitionConfig, BatchScheduler, OptimizationResult, ProgressCallback, RouteReply,
    RoutingBackend, SegmentNavigator, SequenceMode, Waypoint,
};

const ORDERS: &str = r#"{"orders": [
    {"lat": 25.0478, "lon": 121.5170, "sequence": 1, "group_sequence": "A-01"},
    {"lat": 25.0418, "lon": 121.5437, "sequence": 2, "group_sequence": "A-02"},
    {"lat": 25.0375, "lon": 121.5637, "sequence": 3, "group_sequence": "B-01"},
    {"lat": 25.0330, "lon": 121.5654, "sequence": 4, "group_sequence": "B-02"},
    {"lat": 25.0260, "lon": 121.5430, "sequence": 5, "group_sequence": "END"}
]}"#;

/// Routes along a dog-leg through the corner of each segment's bounding box.
struct FlakyBackend {
    calls: AtomicU32,
    unroutable: Waypoint,
}

impl RoutingBackend for FlakyBackend {
    fn route(&self, from: Waypoint, to: Waypoint) -> impl Future<Output = RouteReply> + Send {
        let call = self.calls.fetch_add(1, Ordering::Relaxed) + 1;
        let unroutable = self.unroutable;

        async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            if to == unroutable {
                return RouteReply::NoRoute;
            }
            if call % 4 == 0 {
                return RouteReply::RateLimited;
            }
            let corner = Waypoint::new(from.latitude, to.longitude);
            RouteReply::Shape(polyline::encode(&[from, corner, to]))
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let result = OptimizationResult::from_json(ORDERS)?;
    let stops = result.waypoints()?;
    let start = Waypoint::new(25.0330, 121.5000);

    let backend = FlakyBackend { calls: AtomicU32::new(0), unroutable: stops[3] };
    let config = AcquisitionConfig {
        rate_limit_delay: Duration::from_millis(150),
        serial_retry_delay: Duration::from_millis(200),
        inter_batch_delay: Duration::from_millis(300),
        ..Default::default()
    };
    let scheduler = BatchScheduler::new(backend, config);

    let on_progress: ProgressCallback = Arc::new(|s| {
        println!(
            "  loading {}/{} ({:.0}%) | routed {} | straight {}",
            s.processed, s.total, s.percentage(), s.real_count, s.fallback_count
        );
    });

    println!("Preloading {} segments\n", stops.len());
    let cache = scheduler.acquire_route(start, &stops, Some(&on_progress)).await?;

    println!("\nSegments:");
    let mut nav = SegmentNavigator::new(&cache);
    loop {
        if let Some(seg) = nav.current() {
            println!(
                "  {:<16} {:>2} points {:>6.0}m {}",
                nav.label(&result.orders, SequenceMode::Grouped),
                seg.coordinates.len(),
                seg.length_meters(),
                if seg.is_fallback { "(straight line)" } else { "" }
            );
        }
        if nav.next_segment().is_none() {
            break;
        }
    }

    Ok(())
}
