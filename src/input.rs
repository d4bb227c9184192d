//! Waypoint input from the route optimization backend.
//!
//! The optimizer answers with `{"orders": [...]}` in visiting order. Each order
//! carries its coordinates and two labels: a running `sequence` number and a
//! cluster-relative `group_sequence` such as `"B-03"`. The start point is not
//! part of the result; callers supply it separately.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Waypoint;

#[derive(Error, Debug)]
pub enum InputError {
    #[error("invalid optimization result: {0}")]
    Json(#[from] serde_json::Error),

    #[error("order {position} has invalid coordinates ({lat}, {lon})")]
    InvalidWaypoint { position: usize, lat: f64, lon: f64 },
}

/// Which label to show for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SequenceMode {
    /// Running number across the whole route
    Continuous,
    /// Cluster label plus position within the cluster
    #[default]
    Grouped,
}

/// One stop of the optimized route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub sequence: Option<u32>,
    #[serde(default)]
    pub group_sequence: Option<String>,
    #[serde(default)]
    pub tracking_number: Option<String>,
}

impl Order {
    pub fn waypoint(&self) -> Waypoint {
        Waypoint::new(self.lat, self.lon)
    }

    /// Label for this order under `mode`, falling back to the other label when missing.
    pub fn display_sequence(&self, mode: SequenceMode) -> String {
        let continuous = self.sequence.map(|s| s.to_string());
        let grouped = self.group_sequence.clone();
        let label = match mode {
            SequenceMode::Continuous => continuous.or(grouped),
            SequenceMode::Grouped => grouped.or(continuous),
        };
        label.unwrap_or_else(|| "?".to_string())
    }
}

/// Optimization backend result.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OptimizationResult {
    #[serde(default)]
    pub orders: Vec<Order>,
}

impl OptimizationResult {
    pub fn from_json(json: &str) -> Result<Self, InputError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Stops in visiting order. Rejects any order with out-of-range or non-finite coordinates.
    pub fn waypoints(&self) -> Result<Vec<Waypoint>, InputError> {
        self.orders
            .iter()
            .enumerate()
            .map(|(position, order)| {
                let p = order.waypoint();
                if p.is_valid() {
                    Ok(p)
                } else {
                    Err(InputError::InvalidWaypoint { position, lat: order.lat, lon: order.lon })
                }
            })
            .collect()
    }
}
