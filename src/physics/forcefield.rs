use crate::math::uv;

/// A (possibly) position-dependent acceleration applied to every ball.
///
/// The field is sampled once per ball at the start of each frame
/// and the result is held constant until the frame ends,
/// so that trajectories stay simple enough to solve for exact contact times.
pub trait ForceField {
    fn value_at(&self, position: uv::DVec2) -> uv::DVec2;
}

pub struct NoneField;
impl ForceField for NoneField {
    fn value_at(&self, _: uv::DVec2) -> uv::DVec2 {
        uv::DVec2::zero()
    }
}

/// A combination of two different force fields.
pub struct Sum<F1: ForceField, F2: ForceField>(pub F1, pub F2);
impl<F1: ForceField, F2: ForceField> ForceField for Sum<F1, F2> {
    fn value_at(&self, pos: uv::DVec2) -> uv::DVec2 {
        self.0.value_at(pos) + self.1.value_at(pos)
    }
}

/// Constant gravity field over all of space.
pub struct Gravity(pub uv::DVec2);
impl ForceField for Gravity {
    fn value_at(&self, _pos: uv::DVec2) -> uv::DVec2 {
        self.0
    }
}

/// Gravity that pulls towards a specific point in space.
///
/// With a negative `strength` value this can also be a repulsive force.
pub struct PointGravity {
    /// The position of the gravity source.
    pub position: uv::DVec2,
    /// The strength of gravity at the source.
    pub strength: f64,
    /// How quickly gravity falls off with distance.
    pub falloff: f64,
}
impl ForceField for PointGravity {
    fn value_at(&self, pos: uv::DVec2) -> uv::DVec2 {
        let dist = self.position - pos;
        let dist_sq = dist.mag_sq();
        if dist_sq == 0.0 {
            return uv::DVec2::zero();
        }
        // + 1.0 so that the divisor is 1 at the source
        let strength = self.strength / ((dist_sq + 1.0) * self.falloff);
        strength * dist.normalized()
    }
}
