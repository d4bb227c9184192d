//! # Polyline Codec
//!
//! Decoder (and encoder) for the compact signed-delta polyline format returned
//! by Valhalla-family routing services.
//!
//! Each coordinate is stored as a pair of variable-length integers. A value is
//! split into 5-bit groups, least significant first; every group except the
//! last carries the continuation bit `0x20`, and every byte is offset by 63 to
//! land in printable ASCII. Values are zig-zag encoded deltas from the previous
//! latitude/longitude, scaled by `10^precision`.
//!
//! Valhalla uses precision 6, which is what [`decode`] and [`encode`] assume.
//!
//! ## Example
//!
//! ```rust
//! use route_segments::{Waypoint, polyline};
//!
//! let points = vec![Waypoint::new(38.5, -120.2), Waypoint::new(40.7, -120.95)];
//! let encoded = polyline::encode(&points);
//! assert_eq!(polyline::decode(&encoded).unwrap(), points);
//! ```

use thiserror::Error;

use crate::Waypoint;

/// Precision used by Valhalla shapes (1e-6 degrees).
pub const VALHALLA_PRECISION: u32 = 6;

/// Largest precision whose scale factor fits in an `i64`.
pub const MAX_PRECISION: u32 = 18;

const CONTINUATION_BIT: i64 = 0x20;
const GROUP_MASK: i64 = 0x1f;
const ASCII_OFFSET: u8 = 63;

/// Errors raised while decoding an encoded polyline.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolylineError {
    /// The string ended inside a codeword or between a latitude and its longitude.
    #[error("polyline truncated at byte {position}")]
    Truncated { position: usize },

    /// A byte outside the polyline alphabet (`?`..=`~`).
    #[error("invalid polyline byte {byte:#04x} at position {position}")]
    InvalidByte { position: usize, byte: u8 },

    /// A codeword longer than a 64-bit accumulator can hold.
    #[error("polyline codeword overflows at byte {position}")]
    Overflow { position: usize },

    /// Precision above [`MAX_PRECISION`].
    #[error("unsupported polyline precision {precision} (max {MAX_PRECISION})")]
    UnsupportedPrecision { precision: u32 },
}

fn scale_factor(precision: u32) -> Result<f64, PolylineError> {
    10_i64
        .checked_pow(precision)
        .map(|f| f as f64)
        .ok_or(PolylineError::UnsupportedPrecision { precision })
}

/// Decode a precision-6 polyline into `(latitude, longitude)` waypoints.
pub fn decode(encoded: &str) -> Result<Vec<Waypoint>, PolylineError> {
    decode_scaled(encoded, 1e6)
}

/// Decode a polyline encoded at `precision` decimal places.
///
/// Precision 5 is the classic Google/OSRM format; precision 6 is Valhalla's.
/// Precisions above [`MAX_PRECISION`] are rejected.
///
/// ```rust
/// use route_segments::{Waypoint, polyline};
///
/// let points = polyline::decode_with_precision("_p~iF~ps|U_ulLnnqC_mqNvxq`@", 5).unwrap();
/// assert_eq!(points[0], Waypoint::new(38.5, -120.2));
/// assert_eq!(points.len(), 3);
/// ```
pub fn decode_with_precision(encoded: &str, precision: u32) -> Result<Vec<Waypoint>, PolylineError> {
    decode_scaled(encoded, scale_factor(precision)?)
}

fn decode_scaled(encoded: &str, factor: f64) -> Result<Vec<Waypoint>, PolylineError> {
    let bytes = encoded.as_bytes();

    let mut coordinates = Vec::with_capacity(bytes.len() / 4);
    let mut position = 0;
    let mut lat: i64 = 0;
    let mut lon: i64 = 0;

    while position < bytes.len() {
        lat = lat
            .checked_add(read_delta(bytes, &mut position)?)
            .ok_or(PolylineError::Overflow { position })?;
        if position >= bytes.len() {
            // A latitude without its longitude
            return Err(PolylineError::Truncated { position });
        }
        lon = lon
            .checked_add(read_delta(bytes, &mut position)?)
            .ok_or(PolylineError::Overflow { position })?;

        coordinates.push(Waypoint::new(lat as f64 / factor, lon as f64 / factor));
    }

    Ok(coordinates)
}

/// Read one zig-zag encoded delta starting at `position`, advancing past it.
fn read_delta(bytes: &[u8], position: &mut usize) -> Result<i64, PolylineError> {
    let mut result: i64 = 0;
    let mut shift: u32 = 0;

    loop {
        let Some(&byte) = bytes.get(*position) else {
            return Err(PolylineError::Truncated { position: *position });
        };
        if !(ASCII_OFFSET..=ASCII_OFFSET + 63).contains(&byte) {
            return Err(PolylineError::InvalidByte { position: *position, byte });
        }
        if shift >= 64 {
            return Err(PolylineError::Overflow { position: *position });
        }

        let chunk = (byte - ASCII_OFFSET) as i64;
        result |= (chunk & GROUP_MASK) << shift;
        shift += 5;
        *position += 1;

        if chunk < CONTINUATION_BIT {
            break;
        }
    }

    Ok(if result & 1 == 1 { !(result >> 1) } else { result >> 1 })
}

/// Encode waypoints as a precision-6 polyline.
pub fn encode(points: &[Waypoint]) -> String {
    encode_scaled(points, 1e6)
}

/// Encode waypoints at `precision` decimal places.
pub fn encode_with_precision(points: &[Waypoint], precision: u32) -> Result<String, PolylineError> {
    Ok(encode_scaled(points, scale_factor(precision)?))
}

fn encode_scaled(points: &[Waypoint], factor: f64) -> String {
    let mut out = String::with_capacity(points.len() * 8);
    let mut prev_lat: i64 = 0;
    let mut prev_lon: i64 = 0;

    for p in points {
        let lat = (p.latitude * factor).round() as i64;
        let lon = (p.longitude * factor).round() as i64;
        write_delta(&mut out, lat - prev_lat);
        write_delta(&mut out, lon - prev_lon);
        prev_lat = lat;
        prev_lon = lon;
    }

    out
}

fn write_delta(out: &mut String, delta: i64) {
    let mut value = if delta < 0 { !(delta << 1) } else { delta << 1 };
    while value >= CONTINUATION_BIT {
        out.push(((CONTINUATION_BIT | (value & GROUP_MASK)) as u8 + ASCII_OFFSET) as char);
        value >>= 5;
    }
    out.push((value as u8 + ASCII_OFFSET) as char);
}
