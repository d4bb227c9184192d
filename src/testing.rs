//! Scripted routing backend shared by the fetcher and scheduler tests.

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::sync::Mutex;

use tokio::time::Instant;

use crate::{polyline, RouteReply, RoutingBackend, Waypoint};

/// One scripted reaction to a routing call.
#[derive(Debug, Clone)]
pub(crate) enum Step {
    /// Answer with a three-point shape through the midpoint
    Route,
    Reply(RouteReply),
    /// Never answer
    Hang,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Call {
    pub from: Waypoint,
    pub to: Waypoint,
    pub at: Instant,
}

/// Backend whose replies are scripted per destination waypoint.
///
/// Destinations without a script (or with an exhausted one) are routed.
#[derive(Default)]
pub(crate) struct ScriptedBackend {
    scripts: Mutex<HashMap<(u64, u64), VecDeque<Step>>>,
    calls: Mutex<Vec<Call>>,
}

fn key(p: Waypoint) -> (u64, u64) {
    (p.latitude.to_bits(), p.longitude.to_bits())
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(self, to: Waypoint, steps: Vec<Step>) -> Self {
        self.scripts.lock().unwrap().insert(key(to), steps.into());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, to: Waypoint) -> usize {
        self.calls().iter().filter(|c| c.to == to).count()
    }
}

impl RoutingBackend for ScriptedBackend {
    fn route(&self, from: Waypoint, to: Waypoint) -> impl Future<Output = RouteReply> + Send {
        let step = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(&key(to))
            .and_then(VecDeque::pop_front)
            .unwrap_or(Step::Route);
        self.calls.lock().unwrap().push(Call { from, to, at: Instant::now() });

        async move {
            match step {
                Step::Route => RouteReply::Shape(routed_shape(from, to)),
                Step::Reply(reply) => reply,
                Step::Hang => std::future::pending().await,
            }
        }
    }
}

pub(crate) fn routed_shape(from: Waypoint, to: Waypoint) -> String {
    let mid = Waypoint::new(
        (from.latitude + to.latitude) / 2.0,
        (from.longitude + to.longitude) / 2.0,
    );
    polyline::encode(&[from, mid, to])
}

/// The geometry a [`Step::Route`] reply decodes to.
pub(crate) fn routed_geometry(from: Waypoint, to: Waypoint) -> Vec<Waypoint> {
    polyline::decode(&routed_shape(from, to)).unwrap()
}

/// A start point and `n` distinct stops.
pub(crate) fn route_points(n: usize) -> (Waypoint, Vec<Waypoint>) {
    let start = Waypoint::new(25.0, 121.0);
    let stops = (0..n)
        .map(|i| Waypoint::new(25.0 + (i + 1) as f64 * 0.01, 121.0 + (i + 1) as f64 * 0.005))
        .collect();
    (start, stops)
}
