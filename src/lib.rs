//! A two-dimensional sandbox of balls bouncing around inside boxes,
//! simulated with continuous collision detection.
//!
//! Every frame, [`Physics::advance`] finds the exact time of the earliest contact,
//! rewinds everything to that instant, resolves the collision with a perfectly elastic
//! response and continues from there until the end of the frame is reached.

pub mod event;
pub use event::{
    CollisionEvent, CollisionObserver, ContactKind, EventSink, NoObserver, ObserverFn, Snapshot,
};

pub mod math;
pub use math::{uv, Angle, Polar, Unit, Vec2};

pub mod physics;
pub use physics::{
    body::{Ball, Body, BodyError, Boundary, CollisionGroups, Color, Mass, Rect, Shape, ShapeKind},
    collision,
    forcefield::{self, ForceField},
    BodyKey, FrameReport, Physics, ScheduleError, Tuning,
};

pub mod util;
pub use util::PlaybackClock;
