//! Types, aliases and helper operations for doing math with `ultraviolet`.
use std::f64::consts::PI;
pub use ultraviolet as uv;

pub type Vec2 = uv::DVec2;

/// An angle in either degrees or radians.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde-types", derive(serde::Deserialize, serde::Serialize))]
pub enum Angle {
    Rad(f64),
    Deg(f64),
}
impl Angle {
    /// Get the angle as radians.
    #[inline]
    pub fn rad(&self) -> f64 {
        match self {
            Angle::Rad(rad) => *rad,
            Angle::Deg(deg) => deg * PI / 180.0,
        }
    }

    /// The angle of a vector measured counterclockwise from the positive x axis.
    #[inline]
    pub fn of_vector(v: Vec2) -> Self {
        Angle::Rad(v.y.atan2(v.x))
    }

    /// Unit vector pointing in the direction of this angle.
    #[inline]
    pub fn direction(&self) -> Unit<Vec2> {
        let rad = self.rad();
        Unit::new_unchecked(Vec2::new(rad.cos(), rad.sin()))
    }
}
impl Default for Angle {
    fn default() -> Self {
        Angle::Rad(0.0)
    }
}
impl std::ops::Sub for Angle {
    type Output = Angle;

    #[inline]
    fn sub(self, rhs: Angle) -> Angle {
        Angle::Rad(self.rad() - rhs.rad())
    }
}

/// A wrapper type to indicate a vector should always be normalized.
#[derive(Clone, Copy, Debug)]
pub struct Unit<T>(T);

impl Unit<Vec2> {
    pub const fn new_unchecked(v: Vec2) -> Self {
        Unit(v)
    }
}

impl<T> std::ops::Deref for Unit<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// A vector in polar form, i.e. a length and a direction.
#[derive(Clone, Copy, Debug, Default)]
pub struct Polar {
    pub magnitude: f64,
    pub angle: Angle,
}

impl Polar {
    pub fn from_cartesian(v: Vec2) -> Self {
        Polar {
            magnitude: v.mag(),
            angle: Angle::of_vector(v),
        }
    }

    /// Split the vector into components parallel and perpendicular to a given direction.
    ///
    /// The perpendicular component is measured along the left normal of the direction,
    /// so `parallel * dir + perpendicular * left_normal(dir)` reconstructs the vector.
    pub fn components_along(&self, dir: Angle) -> (f64, f64) {
        let rel = (self.angle - dir).rad();
        (self.magnitude * rel.cos(), self.magnitude * rel.sin())
    }
}

// Vec2 utils

#[inline]
pub fn left_normal(v: Vec2) -> Vec2 {
    Vec2::new(-v.y, v.x)
}

/// Linear interpolation between two points, `t = 0` giving `a` and `t = 1` giving `b`.
#[inline]
pub fn lerp(a: Vec2, b: Vec2, t: f64) -> Vec2 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn polar_components() {
        let v = Vec2::new(3.0, 4.0);
        let p = Polar::from_cartesian(v);
        assert!((p.magnitude - 5.0).abs() < 1e-12);
        let back = p.magnitude * *p.angle.direction();
        assert!((back - v).mag() < 1e-12);

        // components along the y axis: parallel = y, perpendicular is measured
        // along the left normal of +y, which is -x
        let (par, perp) = p.components_along(Angle::Deg(90.0));
        assert!((par - 4.0).abs() < 1e-12);
        assert!((perp + 3.0).abs() < 1e-12);
        let dir = *Angle::Deg(90.0).direction();
        let rebuilt = par * dir + perp * left_normal(dir);
        assert!((rebuilt - v).mag() < 1e-12);
    }

    #[test]
    fn left_normal_turns_counterclockwise() {
        let v = Vec2::new(2.0, -1.0);
        assert_eq!(left_normal(v).dot(v), 0.0);
        assert_eq!(left_normal(v), Vec2::new(1.0, 2.0));
        assert_eq!(left_normal(left_normal(v)), -v);
    }
}
