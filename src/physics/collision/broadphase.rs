//! Broad phase collision detection algorithms
//! are responsible for detecting pairs of possibly colliding bodies
//! for further, exact time of impact inspection.

use crate::physics::body::{CollisionGroups, ShapeKind};

/// What the broad phase needs to know about a body.
#[derive(Clone, Copy, Debug)]
pub struct Candidate {
    /// Position of the body in the frame's body buffers.
    pub index: usize,
    pub kind: ShapeKind,
    pub groups: CollisionGroups,
}

impl Candidate {
    /// Check whether this candidate and another can ever produce a contact.
    #[inline]
    pub fn pairs_with(&self, other: &Candidate) -> bool {
        // boundaries never move, so at least one ball is needed
        (self.kind == ShapeKind::Ball || other.kind == ShapeKind::Ball)
            && self.groups.can_collide(&other.groups)
    }
}

/// A broad phase algorithm.
pub trait BroadPhase {
    /// Returns pairs of potentially colliding bodies as buffer indices,
    /// with the earlier body in iteration order first.
    fn pairs(items: impl Iterator<Item = Candidate> + Clone) -> Vec<[usize; 2]>;
}

/// The simplest possible broad phase algorithm,
/// which pairs every body with every other body.
///
/// Quadratic in the number of bodies, which is fine for the handful of balls
/// a sandbox holds, and the resulting pair order is stable.
pub struct BruteForce;

impl BroadPhase for BruteForce {
    fn pairs(mut items: impl Iterator<Item = Candidate> + Clone) -> Vec<[usize; 2]> {
        let mut pairs = Vec::new();
        while let Some(b1) = items.next() {
            for b2 in items.clone() {
                if b1.pairs_with(&b2) {
                    pairs.push([b1.index, b2.index]);
                }
            }
        }

        pairs
    }
}
