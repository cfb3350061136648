use crate::{
    event::{CollisionEvent, CollisionObserver, ContactKind, NoObserver},
    math::{self as m, lerp},
};

use itertools::izip;

//

pub mod body;
pub use body::{
    Ball, Body, BodyError, Boundary, CollisionGroups, Color, Mass, Rect, Shape, ShapeKind,
};

pub mod collision;
use collision::{
    broadphase::Candidate,
    scan::{scan, RecentContact, ScanInput},
    BroadPhase, EventPool,
};

mod entity_set;
pub use entity_set::BodyKey;
use entity_set::EntitySet;

pub mod forcefield;
pub use forcefield::ForceField;

pub mod response;

use body::Kinematics;

//

/// Parameters controlling the numerical behavior of the frame scheduler.
///
/// Loadable from any serde format with the `serde-types` feature.
/// Missing fields take their default values.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde-types", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde-types", serde(default))]
pub struct Tuning {
    /// Contacts between two balls found within this much simulation time of a contact
    /// already resolved for the same pair are treated as numerical noise and ignored,
    /// unless the balls are still moving into each other.
    pub redetection_epsilon: f64,
    /// Balls overlapping each other at the start of a sub-step by less than this
    /// (relative to their size) are considered touching rather than intersecting.
    pub overlap_tolerance: f64,
    /// Maximum number of collisions resolved at the same instant.
    pub max_simultaneous_collisions: usize,
    /// Maximum number of sub-steps in a single call to `advance`.
    pub max_substeps_per_frame: usize,
    /// Fraction of normal velocity a ball keeps when bouncing off a boundary.
    pub boundary_restitution: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Tuning {
            redetection_epsilon: 1e-9,
            overlap_tolerance: 1e-9,
            max_simultaneous_collisions: 12,
            max_substeps_per_frame: 1024,
            boundary_restitution: 1.0,
        }
    }
}

impl Tuning {
    pub fn with_redetection_epsilon(mut self, eps: f64) -> Self {
        self.redetection_epsilon = eps;
        self
    }

    pub fn with_overlap_tolerance(mut self, tolerance: f64) -> Self {
        self.overlap_tolerance = tolerance;
        self
    }

    pub fn with_max_simultaneous_collisions(mut self, max: usize) -> Self {
        self.max_simultaneous_collisions = max;
        self
    }

    pub fn with_max_substeps_per_frame(mut self, max: usize) -> Self {
        self.max_substeps_per_frame = max;
        self
    }

    pub fn with_boundary_restitution(mut self, restitution: f64) -> Self {
        self.boundary_restitution = restitution;
        self
    }
}

/// Errors that abort a frame.
///
/// When one of these is returned, every body is left in the state it had
/// at the time the error occurred and the world's time is set to that time.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ScheduleError {
    #[error("Invalid frame interval from {t_start} to {t_end}")]
    InvalidInterval { t_start: f64, t_end: f64 },
    #[error("Frame starts at {t_start}, before the already simulated time {committed}")]
    TimeWentBackwards { t_start: f64, committed: f64 },
    #[error("{count} simultaneous collisions at t = {time} exceed the limit of {cap} after {iterations} sub-steps (first pair {pair:?})")]
    TooManyCollisions {
        iterations: usize,
        time: f64,
        count: usize,
        cap: usize,
        pair: [BodyKey; 2],
    },
    #[error("Frame needed more than {iterations} sub-steps, stopped at t = {time} (last pair {pair:?})")]
    SubstepLimit {
        iterations: usize,
        time: f64,
        pair: Option<[BodyKey; 2]>,
    },
}

/// Statistics about a single call to `advance`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Number of times all pairs were scanned for contacts.
    pub sub_steps: usize,
    /// Number of collisions resolved.
    pub resolved: usize,
    /// Number of contacts ignored as re-detections of already resolved ones.
    pub suppressed: usize,
}

/// The simulated world: every body plus the state the scheduler keeps between frames.
pub struct Physics {
    tuning: Tuning,
    entity_set: EntitySet,
    /// Simulation time everything has been advanced to.
    time: f64,
    recent: Vec<RecentContact>,
    pool: EventPool,
    // reused between sub-steps to avoid allocating
    group: Vec<CollisionEvent>,
}

impl Default for Physics {
    fn default() -> Self {
        Self::with_tuning(Tuning::default())
    }
}

impl Physics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tuning(tuning: Tuning) -> Self {
        Physics {
            tuning,
            entity_set: EntitySet::new(),
            time: 0.0,
            recent: Vec::new(),
            pool: EventPool::with_capacity(tuning.max_simultaneous_collisions),
            group: Vec::with_capacity(tuning.max_simultaneous_collisions),
        }
    }

    #[inline]
    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    //
    // construction
    //

    pub fn add_ball(&mut self, ball: Ball) -> BodyKey {
        self.insert(ball)
    }

    pub fn add_boundary(&mut self, boundary: Boundary) -> BodyKey {
        self.insert(boundary)
    }

    pub fn insert(&mut self, body: impl Into<Body>) -> BodyKey {
        self.entity_set.insert(body.into())
    }

    /// Add a body from a flat numeric description,
    /// `[x, y, r]` for a ball or `[x, y, width, height]` for a boundary.
    pub fn add_description(&mut self, kind: ShapeKind, data: &[f64]) -> Result<BodyKey, BodyError> {
        Ok(self.insert(Body::from_description(kind, data)?))
    }

    /// Remove all bodies and forget the time and recent collisions.
    pub fn clear(&mut self) {
        self.entity_set.clear();
        self.recent.clear();
        self.pool.release_all();
        self.time = 0.0;
    }

    //
    // queries
    //

    #[inline]
    pub fn get(&self, key: BodyKey) -> Option<&Body> {
        self.entity_set.get(key)
    }

    /// Iterate over every body in insertion order, e.g. for rendering.
    pub fn bodies(&self) -> impl '_ + Iterator<Item = (BodyKey, &Body)> {
        self.entity_set.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entity_set.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entity_set.is_empty()
    }

    /// The simulation time all bodies are currently at.
    #[inline]
    pub fn time(&self) -> f64 {
        self.time
    }

    //
    // simulation
    //

    /// Advance the simulation from `t_start` to `t_end`
    /// with no force field and no collision observer.
    pub fn advance(&mut self, t_start: f64, t_end: f64) -> Result<FrameReport, ScheduleError> {
        self.advance_with(t_start, t_end, &forcefield::NoneField, &mut NoObserver)
    }

    /// Advance the simulation from `t_start` to `t_end`,
    /// stopping at every collision on the way to resolve it exactly.
    ///
    /// The force field is sampled at each ball's position at the start of the frame
    /// and stays constant until its end. `observer` is notified of every resolved collision
    /// in the order they're resolved.
    ///
    /// Frames don't need to be contiguous. If `t_start` is later than [`time`][Self::time],
    /// the gap in between is skipped: bodies don't move during it and
    /// simulation resumes from their current state at `t_start`.
    ///
    /// A ball pushed against a boundary by its acceleration (e.g. resting on a floor
    /// under gravity) is held up by it. That component of its acceleration is ignored
    /// for the rest of the frame, so it comes to rest on the face instead of sinking through.
    pub fn advance_with(
        &mut self,
        t_start: f64,
        t_end: f64,
        forcefield: &impl ForceField,
        observer: &mut impl CollisionObserver,
    ) -> Result<FrameReport, ScheduleError> {
        if !(t_start.is_finite() && t_end.is_finite()) || t_end < t_start {
            return Err(ScheduleError::InvalidInterval { t_start, t_end });
        }
        if t_start < self.time {
            return Err(ScheduleError::TimeWentBackwards {
                t_start,
                committed: self.time,
            });
        }
        self.time = t_start;
        if t_end == t_start {
            return Ok(FrameReport::default());
        }

        // buffers for working variables, indexed the same as `keys`
        let keys: Vec<BodyKey> = self.entity_set.iter().map(|(key, _)| key).collect();
        let shapes: Vec<Shape> = self.entity_set.iter().map(|(_, b)| b.shape()).collect();
        let movable: Vec<bool> = self.entity_set.iter().map(|(_, b)| b.is_movable()).collect();
        let masses: Vec<f64> = self
            .entity_set
            .iter()
            .map(|(_, b)| b.mass().value().unwrap_or(f64::INFINITY))
            .collect();
        let mut current: Vec<Kinematics> = self
            .entity_set
            .iter()
            .map(|(_, b)| b.kinematics())
            .collect();
        let mut accelerations: Vec<m::Vec2> = izip!(&current, &movable)
            .map(|(kin, &movable)| {
                if movable {
                    kin.acceleration + forcefield.value_at(kin.position)
                } else {
                    m::Vec2::zero()
                }
            })
            .collect();
        let mut tentative: Vec<Kinematics> = current.clone();

        // generate potentially colliding pairs,
        // these are re-checked every sub-step
        let candidates: Vec<Candidate> = self
            .entity_set
            .iter()
            .enumerate()
            .map(|(index, (_, body))| Candidate {
                index,
                kind: body.shape().kind(),
                groups: body.groups(),
            })
            .collect();
        let pairs = collision::BruteForce::pairs(candidates.iter().copied());

        let mut report = FrameReport::default();
        let mut cursor = t_start;
        let mut last_pair: Option<[BodyKey; 2]> = None;
        self.prune_recent(cursor);

        let outcome = loop {
            if report.sub_steps >= self.tuning.max_substeps_per_frame {
                break Err(ScheduleError::SubstepLimit {
                    iterations: report.sub_steps,
                    time: cursor,
                    pair: last_pair,
                });
            }
            report.sub_steps += 1;

            // extrapolate to the end of the frame
            let dt = t_end - cursor;
            for (kin, tent, acc, &movable) in
                izip!(&current, &mut tentative, &accelerations, &movable)
            {
                *tent = if movable { kin.extrapolate(*acc, dt) } else { *kin };
            }

            let result = scan(
                &ScanInput {
                    keys: &keys,
                    shapes: &shapes,
                    start: &current,
                    end: &tentative,
                    pairs: &pairs,
                    t_start: cursor,
                    t_end,
                    overlap_tolerance: self.tuning.overlap_tolerance,
                    redetection_epsilon: self.tuning.redetection_epsilon,
                },
                &self.recent,
                &mut self.pool,
            );
            report.suppressed += result.suppressed;

            let t_contact = match result.earliest {
                Some(t) => t,
                None => {
                    std::mem::swap(&mut current, &mut tentative);
                    cursor = t_end;
                    break Ok(());
                }
            };

            self.pool.sorted_events(&mut self.group);
            if self.pool.is_overflowing() {
                break Err(ScheduleError::TooManyCollisions {
                    iterations: report.sub_steps,
                    time: t_contact,
                    count: self.pool.requested(),
                    cap: self.pool.capacity(),
                    pair: self.group.first().map(|evt| evt.bodies).unwrap_or([keys[0]; 2]),
                });
            }

            // roll everything back to the time of contact
            let frac = if dt > 0.0 {
                (t_contact - cursor) / dt
            } else {
                0.0
            };
            for (kin, tent, &movable) in izip!(&mut current, &tentative, &movable) {
                if movable {
                    kin.position = lerp(kin.position, tent.position, frac);
                    kin.velocity = lerp(kin.velocity, tent.velocity, frac);
                }
            }
            cursor = t_contact;

            for evt in &self.group {
                let [i1, i2] = pairs[evt.pair_index];
                match evt.kind {
                    ContactKind::BallBall => {
                        // positions from the solver rather than the interpolation above
                        current[i1].position = evt.snapshots[0].position;
                        current[i2].position = evt.snapshots[1].position;
                        let (mut vel_a, mut vel_b) = (current[i1].velocity, current[i2].velocity);
                        response::ball_ball(
                            current[i1].position,
                            &mut vel_a,
                            masses[i1],
                            current[i2].position,
                            &mut vel_b,
                            masses[i2],
                        );
                        current[i1].velocity = vel_a;
                        current[i2].velocity = vel_b;
                    }
                    ContactKind::BallBoundary => {
                        let (boundary, ball) = if movable[i1] { (i2, i1) } else { (i1, i2) };
                        current[ball].position = evt.snapshots[1].position;
                        if let Shape::Rect(rect) = shapes[boundary] {
                            response::ball_boundary(
                                &mut current[ball].velocity,
                                evt.point,
                                &rect,
                                self.tuning.boundary_restitution,
                            );
                            if response::boundary_support(
                                &mut accelerations[ball],
                                current[ball].velocity,
                                evt.point,
                                &rect,
                                t_end - cursor,
                            ) {
                                log::trace!("{:?} is resting on {:?}", keys[ball], keys[boundary]);
                            }
                        }
                    }
                }

                log::debug!(
                    "Collision between {:?} and {:?} at t = {} at point ({}, {})",
                    evt.bodies[0],
                    evt.bodies[1],
                    evt.time,
                    evt.point.x,
                    evt.point.y
                );
                observer.on_collision(evt);
                self.recent.push(RecentContact {
                    pair: evt.bodies,
                    time: evt.time,
                });
                last_pair = Some(evt.bodies);
                report.resolved += 1;
            }
            self.prune_recent(cursor);
        };

        // apply results back to state from temp buffers
        for (key, kin) in izip!(&keys, &current) {
            if let Some(body) = self.entity_set.get_mut(*key) {
                body.set_motion(kin.position, kin.velocity);
            }
        }
        self.time = cursor;

        match outcome {
            Ok(()) => {
                log::debug!(
                    "Advanced to t = {} in {} sub-steps, {} collisions resolved, {} ignored",
                    t_end,
                    report.sub_steps,
                    report.resolved,
                    report.suppressed
                );
                Ok(report)
            }
            Err(err) => {
                log::warn!("Physics frame aborted: {}", err);
                Err(err)
            }
        }
    }

    /// Forget contacts too old to be re-detected.
    fn prune_recent(&mut self, now: f64) {
        let eps = self.tuning.redetection_epsilon;
        self.recent.retain(|r| r.time >= now - eps);
    }
}
