//! Exhaustive search for the earliest contacts among all registered pairs.

use super::{pool::EventPool, toi};
use crate::{
    event::{CollisionEvent, ContactKind, Snapshot},
    math::lerp,
    physics::{
        body::{Kinematics, Shape},
        BodyKey,
    },
};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// A collision that was resolved recently,
/// remembered to filter out immediate re-detections of the same contact.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RecentContact {
    pub pair: [BodyKey; 2],
    pub time: f64,
}

/// Everything a scan needs to know about the bodies over one sub-step.
///
/// The per-body slices are indexed by the indices in `pairs`.
pub struct ScanInput<'a> {
    pub keys: &'a [BodyKey],
    pub shapes: &'a [Shape],
    /// Body states at `t_start`.
    pub start: &'a [Kinematics],
    /// Tentative body states at `t_end`.
    pub end: &'a [Kinematics],
    pub pairs: &'a [[usize; 2]],
    pub t_start: f64,
    pub t_end: f64,
    pub overlap_tolerance: f64,
    pub redetection_epsilon: f64,
}

/// Summary of a scan. The events themselves are left in the pool.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScanResult {
    /// Time of the earliest contact, if any.
    pub earliest: Option<f64>,
    /// Number of contacts discarded as re-detections of recent ones.
    pub suppressed: usize,
}

/// Test every pair for contact within the interval and gather the group
/// of contacts sharing the earliest time into `pool`.
///
/// The result is the same regardless of the order pair checks finish in:
/// ties are decided by exact time equality and events are stored
/// with their pair index for ordering.
pub fn scan(input: &ScanInput, recent: &[RecentContact], pool: &mut EventPool) -> ScanResult {
    #[cfg(feature = "parallel")]
    let hits = check_pairs_parallel(input);
    #[cfg(not(feature = "parallel"))]
    let hits = check_pairs(input);

    reduce(hits, recent, input.redetection_epsilon, pool)
}

/// Run the solver on every pair in order. Entry `i` is the contact of pair `i`, if any.
#[cfg_attr(feature = "parallel", allow(dead_code))]
pub fn check_pairs(input: &ScanInput) -> Vec<Option<CollisionEvent>> {
    (0..input.pairs.len())
        .map(|pair_idx| check_pair(input, pair_idx))
        .collect()
}

/// Like `check_pairs`, but spread over the rayon thread pool.
/// The output is in pair order all the same.
#[cfg(feature = "parallel")]
pub fn check_pairs_parallel(input: &ScanInput) -> Vec<Option<CollisionEvent>> {
    (0..input.pairs.len())
        .into_par_iter()
        .map(|pair_idx| check_pair(input, pair_idx))
        .collect()
}

/// Filter re-detections out of the per-pair results
/// and keep the earliest tie group in `pool`.
pub fn reduce(
    hits: Vec<Option<CollisionEvent>>,
    recent: &[RecentContact],
    epsilon: f64,
    pool: &mut EventPool,
) -> ScanResult {
    pool.release_all();

    let mut result = ScanResult::default();
    for evt in hits.into_iter().flatten() {
        if is_redetection(&evt, recent, epsilon) {
            log::trace!(
                "Ignored re-detected contact between {:?} and {:?} at t = {}",
                evt.bodies[0],
                evt.bodies[1],
                evt.time
            );
            result.suppressed += 1;
            continue;
        }
        match result.earliest {
            Some(t) if evt.time > t => {}
            Some(t) if evt.time == t => {
                pool.acquire(evt);
            }
            _ => {
                pool.release_all();
                pool.acquire(evt);
                result.earliest = Some(evt.time);
            }
        }
    }

    result
}

/// A contact is a re-detection if the same pair was resolved within `epsilon`
/// and the balls aren't moving into each other anymore.
///
/// Boundary contacts are never ignored. The solver only reports them
/// for balls heading out of the boundary, which always needs a response.
fn is_redetection(evt: &CollisionEvent, recent: &[RecentContact], epsilon: f64) -> bool {
    if evt.kind != ContactKind::BallBall {
        return false;
    }
    let [a, b] = evt.snapshots;
    let closing_speed = (a.velocity - b.velocity).dot(b.position - a.position);
    closing_speed <= 0.0
        && recent
            .iter()
            .any(|r| r.pair == evt.bodies && (r.time - evt.time).abs() <= epsilon)
}

/// Run the time of impact solver on a single pair.
fn check_pair(input: &ScanInput, pair_idx: usize) -> Option<CollisionEvent> {
    let [i1, i2] = input.pairs[pair_idx];
    let sweep = |i: usize| toi::Sweep {
        shape: input.shapes[i],
        start: input.start[i].position,
        end: input.end[i].position,
    };
    let impact = toi::time_of_impact(&sweep(i1), &sweep(i2), input.overlap_tolerance)?;

    let time = input.t_start + impact.t * (input.t_end - input.t_start);
    let snapshot = |i: usize, position| Snapshot {
        position,
        velocity: lerp(input.start[i].velocity, input.end[i].velocity, impact.t),
    };
    let snapshots = [
        snapshot(i1, impact.positions[0]),
        snapshot(i2, impact.positions[1]),
    ];

    let evt = match (input.shapes[i1], input.shapes[i2]) {
        (Shape::Circle { .. }, Shape::Circle { .. }) => CollisionEvent {
            time,
            bodies: [input.keys[i1], input.keys[i2]],
            point: impact.point,
            snapshots,
            kind: ContactKind::BallBall,
            pair_index: pair_idx,
        },
        (Shape::Rect(_), _) => CollisionEvent {
            time,
            bodies: [input.keys[i1], input.keys[i2]],
            point: impact.point,
            snapshots,
            kind: ContactKind::BallBoundary,
            pair_index: pair_idx,
        },
        // boundary goes first
        (_, Shape::Rect(_)) => CollisionEvent {
            time,
            bodies: [input.keys[i2], input.keys[i1]],
            point: impact.point,
            snapshots: [snapshots[1], snapshots[0]],
            kind: ContactKind::BallBoundary,
            pair_index: pair_idx,
        },
    };
    Some(evt)
}
