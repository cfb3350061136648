//! Collision detection: pair generation, time of impact queries
//! and the search for the earliest contacts of a sub-step.

pub mod broadphase;
pub use broadphase::{BroadPhase, BruteForce};

pub mod toi;
pub use toi::{Impact, SweptCircle};

pub mod pool;
pub use pool::EventPool;

pub(crate) mod scan;
