//! Preload every segment of a short route from a Valhalla server.
//!
//! Run with: RUST_LOG=info cargo run --example preload_route --features http [BASE_URL]

use std::sync::Arc;

use route_segments::{
    preload_segments_blocking, AcquisitionConfig, ProgressCallback, ValhallaConfig, Waypoint,
};

fn main() {
    env_logger::init();

    let mut valhalla = ValhallaConfig::default();
    if let Some(base_url) = std::env::args().nth(1) {
        valhalla.base_url = base_url;
    }

    let start = Waypoint::new(25.0330, 121.5654);
    let stops = vec![
        Waypoint::new(25.0478, 121.5170),
        Waypoint::new(25.0418, 121.5437),
        Waypoint::new(25.0375, 121.5637),
        Waypoint::new(25.0260, 121.5430),
    ];

    println!("Valhalla: {}", valhalla.base_url);
    println!("Segments: {}\n", stops.len());

    let on_progress: ProgressCallback = Arc::new(|s| {
        println!("  {}/{} | routed {} | straight {}", s.processed, s.total, s.real_count, s.fallback_count);
    });

    match preload_segments_blocking(&valhalla, AcquisitionConfig::default(), start, &stops, Some(on_progress)) {
        Ok(cache) => {
            println!();
            for seg in cache.iter() {
                println!(
                    "  #{} {:>4} points {:>7.0}m{}",
                    seg.index,
                    seg.coordinates.len(),
                    seg.length_meters(),
                    seg.fallback_reason.map_or(String::new(), |r| format!(" fallback: {:?}", r))
                );
            }
        }
        Err(e) => eprintln!("Preload failed: {}", e),
    }
}
