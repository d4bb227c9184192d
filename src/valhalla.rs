//! Valhalla `/route` wire format.
//!
//! Only the parts the segment pipeline needs are modelled: the two-location
//! request body and the first leg's encoded shape in the response.

use serde::{Deserialize, Serialize};

use crate::{RouteReply, Waypoint};

pub const DEFAULT_COSTING: &str = "auto";
pub const DEFAULT_UNITS: &str = "kilometers";

/// Valhalla error codes meaning the road network has no path between the locations.
///
/// 170: locations in unconnected regions, 171: no suitable edges near a
/// location, 442: no path could be found for input.
pub const NO_ROUTE_ERROR_CODES: [u32; 3] = [170, 171, 442];

/// Request body for a point-to-point route.
#[derive(Debug, Clone, Serialize)]
pub struct RouteRequest {
    pub locations: [Location; 2],
    pub costing: String,
    pub directions_options: DirectionsOptions,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Location {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DirectionsOptions {
    pub units: String,
}

impl RouteRequest {
    pub fn new(from: Waypoint, to: Waypoint, costing: &str, units: &str) -> Self {
        Self {
            locations: [Location::from(from), Location::from(to)],
            costing: costing.to_string(),
            directions_options: DirectionsOptions { units: units.to_string() },
        }
    }
}

impl From<Waypoint> for Location {
    fn from(p: Waypoint) -> Self {
        Self { lat: p.latitude, lon: p.longitude }
    }
}

/// API response for the route endpoint
#[derive(Debug, Deserialize)]
struct RouteApiResponse {
    trip: Option<Trip>,
}

#[derive(Debug, Deserialize)]
struct Trip {
    #[serde(default)]
    legs: Vec<Leg>,
}

#[derive(Debug, Deserialize)]
struct Leg {
    shape: Option<String>,
}

/// Classify a successful (2xx) response body.
///
/// Malformed JSON is a failure; well-formed JSON without a first leg shape is
/// [`RouteReply::NoRoute`].
pub fn classify_body(body: &[u8]) -> RouteReply {
    let data: RouteApiResponse = match serde_json::from_slice(body) {
        Ok(d) => d,
        Err(e) => return RouteReply::Failed(format!("JSON parse error: {}", e)),
    };

    data.trip
        .and_then(|trip| trip.legs.into_iter().next())
        .and_then(|leg| leg.shape)
        .map_or(RouteReply::NoRoute, RouteReply::Shape)
}

/// Error body returned with a 4xx status
#[derive(Debug, Deserialize)]
struct ErrorApiResponse {
    error_code: Option<u32>,
    #[serde(default)]
    error: String,
}

/// Classify a `400 Bad Request` body.
///
/// Error codes in [`NO_ROUTE_ERROR_CODES`] are [`RouteReply::NoRoute`]; any
/// other code or an unparseable body is a failure.
pub fn classify_error_body(body: &[u8]) -> RouteReply {
    match serde_json::from_slice::<ErrorApiResponse>(body) {
        Ok(ErrorApiResponse { error_code: Some(code), .. }) if NO_ROUTE_ERROR_CODES.contains(&code) => {
            RouteReply::NoRoute
        }
        Ok(ErrorApiResponse { error_code, error }) => RouteReply::Failed(format!(
            "HTTP 400 (error_code {}): {}",
            error_code.map_or_else(|| "none".to_string(), |c| c.to_string()),
            error
        )),
        Err(e) => RouteReply::Failed(format!("HTTP 400, unreadable error body: {}", e)),
    }
}
