//! Time of impact queries between shapes moving linearly over a unit time interval.
//!
//! All queries measure time as a fraction `t` of the interval,
//! with `t = 0` at the start state and `t = 1` at the tentative end state.
//! Only contacts where the shapes are moving into each other are reported,
//! and only for `t` in `[0, 1)`.

use crate::math::{self as m, lerp};
use crate::physics::body::{Rect, Shape};

/// Discriminants this far below zero (relative to `b^2`) are treated as tangential contact.
const DISCRIMINANT_EPSILON: f64 = 1e-12;

/// A body's shape and its position at the start and end of the interval.
///
/// Rects are static, so their `start` and `end` are ignored.
#[derive(Clone, Copy, Debug)]
pub struct Sweep {
    pub shape: Shape,
    pub start: m::Vec2,
    pub end: m::Vec2,
}

/// A circle moving linearly over the interval, possibly changing size.
#[derive(Clone, Copy, Debug)]
pub struct SweptCircle {
    pub start: m::Vec2,
    pub end: m::Vec2,
    pub r_start: f64,
    pub r_end: f64,
}

impl SweptCircle {
    /// A circle of constant radius.
    pub fn new(start: m::Vec2, end: m::Vec2, r: f64) -> Self {
        SweptCircle {
            start,
            end,
            r_start: r,
            r_end: r,
        }
    }

    #[inline]
    pub fn center_at(&self, t: f64) -> m::Vec2 {
        lerp(self.start, self.end, t)
    }

    #[inline]
    pub fn radius_at(&self, t: f64) -> f64 {
        self.r_start + (self.r_end - self.r_start) * t
    }
}

/// The moment two shapes first touch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Impact {
    /// Fraction of the interval at which contact happens.
    pub t: f64,
    /// The point of contact in world space.
    pub point: m::Vec2,
    /// Positions of both shapes at the time of contact,
    /// in the order the shapes were given in.
    pub positions: [m::Vec2; 2],
}

/// Find the first time two swept shapes touch, if they do within the interval.
///
/// For circle pairs, `overlap_tolerance` is how deep (relative to the shapes' size)
/// an overlap at `t = 0` may be and still count as touching. Deeper overlaps are contacts
/// that began earlier and don't produce a new impact.
pub fn time_of_impact(a: &Sweep, b: &Sweep, overlap_tolerance: f64) -> Option<Impact> {
    match (a.shape, b.shape) {
        (Shape::Circle { r: r1 }, Shape::Circle { r: r2 }) => circle_circle(
            &SweptCircle::new(a.start, a.end, r1),
            &SweptCircle::new(b.start, b.end, r2),
            overlap_tolerance,
        ),
        (Shape::Rect(rect), Shape::Circle { r }) => {
            circle_in_rect(&rect, &SweptCircle::new(b.start, b.end, r))
        }
        (Shape::Circle { r }, Shape::Rect(rect)) => {
            flip(circle_in_rect(&rect, &SweptCircle::new(a.start, a.end, r)))
        }
        // rects never move
        (Shape::Rect(_), Shape::Rect(_)) => None,
    }
}

fn flip(impact: Option<Impact>) -> Option<Impact> {
    impact.map(|i| Impact {
        positions: [i.positions[1], i.positions[0]],
        ..i
    })
}

//
// CIRCLE <-> CIRCLE
//

/// Solve for the first contact between two moving circles.
///
/// Squared distance between the centers minus the squared sum of radii
/// is a quadratic in `t`, so contact happens at one of its roots.
pub fn circle_circle(a: &SweptCircle, b: &SweptCircle, overlap_tolerance: f64) -> Option<Impact> {
    let dist_start = b.start - a.start;
    let dist_delta = (b.end - a.end) - dist_start;
    let r_sum_start = a.r_start + b.r_start;
    let r_sum_delta = (a.r_end + b.r_end) - r_sum_start;

    if r_sum_start - dist_start.mag() > overlap_tolerance * r_sum_start.max(1.0) {
        // already overlapping, contact began before this interval
        return None;
    }

    let qa = dist_delta.mag_sq() - r_sum_delta * r_sum_delta;
    let qb = 2.0 * (dist_delta.dot(dist_start) - r_sum_delta * r_sum_start);
    let qc = dist_start.mag_sq() - r_sum_start * r_sum_start;

    let t = entering_root(qa, qb, qc)?;

    let center_a = a.center_at(t);
    let center_b = b.center_at(t);
    let r_a = a.radius_at(t);
    let r_b = b.radius_at(t);
    let point = lerp(center_a, center_b, r_a / (r_a + r_b));

    Some(Impact {
        t,
        point,
        positions: [center_a, center_b],
    })
}

/// Find the earliest `t` in `[0, 1)` where `f(t) = a t^2 + b t + c` crosses zero downwards,
/// i.e. where the shapes go from separate (`f > 0`) to touching.
///
/// `c <= 0` means the shapes are touching at `t = 0`,
/// in which case they only count as colliding if they're moving together.
pub fn entering_root(a: f64, b: f64, c: f64) -> Option<f64> {
    if a == 0.0 {
        // no relative acceleration of the quadratic, the equation is linear
        if b == 0.0 {
            // parallel movement, either touching the whole time or never
            return if c == 0.0 { Some(0.0) } else { None };
        }
        let t = -c / b;
        return (b < 0.0 && (0.0..1.0).contains(&t)).then_some(t);
    }

    if c <= 0.0 {
        let closing = b < 0.0 || (b == 0.0 && a < 0.0);
        return closing.then_some(0.0);
    }

    let mut discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        if discriminant >= -DISCRIMINANT_EPSILON * b * b {
            // grazing contact lost to rounding
            discriminant = 0.0;
        } else {
            return None;
        }
    }
    let sqrt_disc = discriminant.sqrt();

    // numerically stable form of the quadratic formula.
    // the entering root is (-b - sqrt(d)) / 2a, where the derivative 2at + b is -sqrt(d)
    let q = -0.5 * (b + b.signum() * sqrt_disc);
    if q == 0.0 {
        return Some(0.0);
    }
    let t = if b >= 0.0 { q / a } else { c / q };

    (0.0..1.0).contains(&t).then_some(t)
}

//
// CIRCLE INSIDE RECT
//

/// A face of an axis-aligned rect, seen from the inside.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Face {
    /// The face at the minimum x coordinate.
    Left,
    /// The face at the maximum x coordinate.
    Right,
    /// The face at the minimum y coordinate.
    Top,
    /// The face at the maximum y coordinate.
    Bottom,
}

impl Face {
    pub const ALL: [Face; 4] = [Face::Left, Face::Right, Face::Top, Face::Bottom];

    #[inline]
    pub fn is_vertical(&self) -> bool {
        matches!(self, Face::Left | Face::Right)
    }

    /// The coordinate of the face along its normal axis.
    pub fn coordinate(&self, rect: &Rect) -> f64 {
        match self {
            Face::Left => rect.min_x(),
            Face::Right => rect.max_x(),
            Face::Top => rect.min_y(),
            Face::Bottom => rect.max_y(),
        }
    }

    /// Signed distance from the circle's edge to the face at the start of the interval
    /// and its change over the interval. Positive distance is inside the rect.
    fn gap(&self, rect: &Rect, c: &SweptCircle) -> (f64, f64) {
        let face = self.coordinate(rect);
        let (p0, p1) = if self.is_vertical() {
            (c.start.x, c.end.x)
        } else {
            (c.start.y, c.end.y)
        };
        match self {
            Face::Left | Face::Top => {
                let gap_start = (p0 - c.r_start) - face;
                let gap_end = (p1 - c.r_end) - face;
                (gap_start, gap_end - gap_start)
            }
            Face::Right | Face::Bottom => {
                let gap_start = face - (p0 + c.r_start);
                let gap_end = face - (p1 + c.r_end);
                (gap_start, gap_end - gap_start)
            }
        }
    }
}

/// Time at which a circle's leading edge reaches a face, given the gap from `Face::gap`.
///
/// A circle already past the face and still moving outwards touches it at `t = 0`,
/// no matter how deep it is, so nothing can leave the rect.
fn face_time(gap_start: f64, gap_delta: f64) -> Option<f64> {
    if gap_delta >= 0.0 {
        // moving away from the face or parallel to it
        return None;
    }
    if gap_start <= 0.0 {
        return Some(0.0);
    }
    let t = -gap_start / gap_delta;
    (t < 1.0).then_some(t)
}

/// Solve for the first contact between a moving circle and the inside of a static rect.
///
/// Each face is an axis-aligned half-plane, so the contact time with each one
/// has a closed form. If two faces are reached at the same time,
/// the contact point is the corner between them.
///
/// Unlike circle pairs, overlaps are never treated as ongoing contact:
/// a circle that is outside a face and moving further out collides at `t = 0`.
///
/// The resulting positions are `[rect corner, circle center]`.
pub fn circle_in_rect(rect: &Rect, c: &SweptCircle) -> Option<Impact> {
    let mut first: Option<(f64, Option<Face>, Option<Face>)> = None;
    for face in Face::ALL {
        let (gap_start, gap_delta) = face.gap(rect, c);
        let t = match face_time(gap_start, gap_delta) {
            Some(t) => t,
            None => continue,
        };
        // track the earliest vertical and horizontal face hit at that time
        let (v, h) = if face.is_vertical() {
            (Some(face), None)
        } else {
            (None, Some(face))
        };
        first = match first {
            Some((t_first, ..)) if t > t_first => first,
            Some((t_first, fv, fh)) if t == t_first => Some((t, fv.or(v), fh.or(h))),
            _ => Some((t, v, h)),
        };
    }

    let (t, vertical, horizontal) = first?;
    let center = c.center_at(t);
    let point = m::Vec2::new(
        vertical.map(|f| f.coordinate(rect)).unwrap_or(center.x),
        horizontal.map(|f| f.coordinate(rect)).unwrap_or(center.y),
    );

    Some(Impact {
        t,
        point,
        positions: [m::Vec2::new(rect.x, rect.y), center],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    const TOL: f64 = 1e-9;

    fn v(x: f64, y: f64) -> m::Vec2 {
        m::Vec2::new(x, y)
    }

    fn unit_box() -> Rect {
        Rect {
            x: 0.0,
            y: 0.0,
            width: 100.0,
            height: 100.0,
        }
    }

    #[test]
    fn head_on_circles() {
        let a = SweptCircle::new(v(-50.0, 0.0), v(0.0, 0.0), 10.0);
        let b = SweptCircle::new(v(50.0, 0.0), v(0.0, 0.0), 10.0);
        let impact = circle_circle(&a, &b, TOL).expect("should collide");
        assert!((impact.t - 0.8).abs() < 1e-12);
        assert!((impact.point - v(0.0, 0.0)).mag() < 1e-9);
        assert!((impact.positions[0] - v(-10.0, 0.0)).mag() < 1e-9);
        assert!((impact.positions[1] - v(10.0, 0.0)).mag() < 1e-9);
    }

    #[test]
    fn contact_point_weighted_by_radius() {
        let a = SweptCircle::new(v(0.0, 0.0), v(0.0, 0.0), 30.0);
        let b = SweptCircle::new(v(100.0, 0.0), v(0.0, 0.0), 10.0);
        let impact = circle_circle(&a, &b, TOL).unwrap();
        assert!((impact.t - 0.6).abs() < 1e-12);
        assert!((impact.point - v(30.0, 0.0)).mag() < 1e-9);
    }

    #[test]
    fn separating_or_parallel_circles_miss() {
        // moving apart
        let a = SweptCircle::new(v(-15.0, 0.0), v(-50.0, 0.0), 5.0);
        let b = SweptCircle::new(v(15.0, 0.0), v(50.0, 0.0), 5.0);
        assert_eq!(circle_circle(&a, &b, TOL), None);
        // same velocity, no relative motion
        let a = SweptCircle::new(v(0.0, 0.0), v(10.0, 10.0), 5.0);
        let b = SweptCircle::new(v(20.0, 0.0), v(30.0, 10.0), 5.0);
        assert_eq!(circle_circle(&a, &b, TOL), None);
        // passing by without touching
        let a = SweptCircle::new(v(0.0, 0.0), v(100.0, 0.0), 5.0);
        let b = SweptCircle::new(v(50.0, 20.0), v(50.0, 20.0), 5.0);
        assert_eq!(circle_circle(&a, &b, TOL), None);
        // contact would happen after the interval
        let a = SweptCircle::new(v(0.0, 0.0), v(10.0, 0.0), 5.0);
        let b = SweptCircle::new(v(100.0, 0.0), v(100.0, 0.0), 5.0);
        assert_eq!(circle_circle(&a, &b, TOL), None);
    }

    #[test]
    fn touching_circles() {
        // just bounced, touching and moving apart: not a new contact
        let a = SweptCircle::new(v(-10.0, 0.0), v(-20.0, 0.0), 10.0);
        let b = SweptCircle::new(v(10.0, 0.0), v(20.0, 0.0), 10.0);
        assert_eq!(circle_circle(&a, &b, TOL), None);
        // touching and pushing together: contact right away
        let a = SweptCircle::new(v(-10.0, 0.0), v(0.0, 0.0), 10.0);
        let b = SweptCircle::new(v(10.0, 0.0), v(10.0, 0.0), 10.0);
        assert_eq!(circle_circle(&a, &b, TOL).map(|i| i.t), Some(0.0));
        // deeply overlapping from the start: continuing contact
        let a = SweptCircle::new(v(-5.0, 0.0), v(0.0, 0.0), 10.0);
        let b = SweptCircle::new(v(5.0, 0.0), v(5.0, 0.0), 10.0);
        assert_eq!(circle_circle(&a, &b, TOL), None);
    }

    #[test]
    fn tangential_contact_resolves() {
        // b grazes a exactly at x = 0
        let a = SweptCircle::new(v(0.0, 0.0), v(0.0, 0.0), 5.0);
        let b = SweptCircle::new(v(-20.0, 10.0), v(20.0, 10.0), 5.0);
        let impact = circle_circle(&a, &b, TOL).expect("grazing contact");
        assert!((impact.t - 0.5).abs() < 1e-6);
        assert!((impact.point - v(0.0, 5.0)).mag() < 1e-3);
    }

    #[test]
    fn growing_circle() {
        let a = SweptCircle {
            start: v(0.0, 0.0),
            end: v(0.0, 0.0),
            r_start: 1.0,
            r_end: 21.0,
        };
        let b = SweptCircle::new(v(20.0, 0.0), v(20.0, 0.0), 9.0);
        let impact = circle_circle(&a, &b, TOL).unwrap();
        // 1 + 20t + 9 = 20
        assert!((impact.t - 0.5).abs() < 1e-12);
        assert!((impact.point - v(11.0, 0.0)).mag() < 1e-9);
    }

    #[test]
    fn degenerate_quadratics() {
        assert_eq!(entering_root(0.0, 0.0, 0.0), Some(0.0));
        assert_eq!(entering_root(0.0, 0.0, 5.0), None);
        assert_eq!(entering_root(0.0, -2.0, 1.0), Some(0.5));
        assert_eq!(entering_root(0.0, 2.0, -1.0), None);
        assert_eq!(entering_root(0.0, -1.0, 2.0), None);
        // no real roots
        assert_eq!(entering_root(1.0, 0.0, 1.0), None);
        // double root at 0.5: (t - 0.5)^2
        assert_eq!(entering_root(1.0, -1.0, 0.25), Some(0.5));
        // slightly negative discriminant from rounding
        assert!(entering_root(1.0, -1.0, 0.25 + 1e-15).is_some());
    }

    #[test]
    fn circle_reaches_each_face() {
        let rect = unit_box();
        let cases = [
            (v(50.0, 50.0), v(-50.0, 50.0), Face::Left, v(0.0, 50.0)),
            (v(5.0, 5.0), v(105.0, 5.0), Face::Right, v(100.0, 5.0)),
            (v(30.0, 50.0), v(30.0, -50.0), Face::Top, v(30.0, 0.0)),
            (v(30.0, 50.0), v(30.0, 150.0), Face::Bottom, v(30.0, 100.0)),
        ];
        for (start, end, face, point) in cases {
            let c = SweptCircle::new(start, end, 5.0);
            let impact = circle_in_rect(&rect, &c)
                .unwrap_or_else(|| panic!("no contact with {:?}", face));
            assert_eq!(impact.point, point, "wrong point for {:?}", face);
            let center = impact.positions[1];
            let edge = if face.is_vertical() {
                (center.x - face.coordinate(&rect)).abs()
            } else {
                (center.y - face.coordinate(&rect)).abs()
            };
            assert!((edge - 5.0).abs() < 1e-9);
        }
        // the right-face case from the start of the box
        let c = SweptCircle::new(v(5.0, 5.0), v(105.0, 5.0), 5.0);
        let impact = circle_in_rect(&rect, &c).unwrap();
        assert!((impact.t - 0.9).abs() < 1e-12);
        assert_eq!(impact.positions[0], v(0.0, 0.0));
    }

    #[test]
    fn circle_hits_corner() {
        let rect = unit_box();
        let c = SweptCircle::new(v(50.0, 50.0), v(-50.0, -50.0), 10.0);
        let impact = circle_in_rect(&rect, &c).unwrap();
        assert!((impact.t - 0.4).abs() < 1e-12);
        assert_eq!(impact.point, v(0.0, 0.0));
    }

    #[test]
    fn circle_in_rect_misses() {
        let rect = unit_box();
        // stays inside
        let c = SweptCircle::new(v(20.0, 20.0), v(80.0, 80.0), 5.0);
        assert_eq!(circle_in_rect(&rect, &c), None);
        // touching the left face but moving away
        let c = SweptCircle::new(v(5.0, 50.0), v(50.0, 50.0), 5.0);
        assert_eq!(circle_in_rect(&rect, &c), None);
        // outside the left face but heading back in
        let c = SweptCircle::new(v(-20.0, 50.0), v(30.0, 50.0), 5.0);
        assert_eq!(circle_in_rect(&rect, &c), None);
        // at rest
        let c = SweptCircle::new(v(50.0, 50.0), v(50.0, 50.0), 5.0);
        assert_eq!(circle_in_rect(&rect, &c), None);
    }

    #[test]
    fn circle_past_face_is_caught() {
        let rect = unit_box();
        // sunk well into the bottom face and still moving down
        let c = SweptCircle::new(v(50.0, 96.0), v(50.0, 97.0), 5.0);
        let impact = circle_in_rect(&rect, &c).expect("escaping circle must collide");
        assert_eq!(impact.t, 0.0);
        assert_eq!(impact.point, v(50.0, 100.0));
        // fully outside and moving away
        let c = SweptCircle::new(v(-20.0, 50.0), v(-30.0, 50.0), 5.0);
        let impact = circle_in_rect(&rect, &c).unwrap();
        assert_eq!(impact.t, 0.0);
        assert_eq!(impact.point.x, 0.0);
    }

    #[test]
    fn dispatch_flips_positions() {
        let rect = unit_box();
        let ball = Sweep {
            shape: Shape::Circle { r: 5.0 },
            start: v(50.0, 50.0),
            end: v(150.0, 50.0),
        };
        let boundary = Sweep {
            shape: Shape::Rect(rect),
            start: v(0.0, 0.0),
            end: v(0.0, 0.0),
        };
        let i1 = time_of_impact(&boundary, &ball, TOL).unwrap();
        let i2 = time_of_impact(&ball, &boundary, TOL).unwrap();
        assert_eq!(i1.t, i2.t);
        assert_eq!(i1.positions[0], i2.positions[1]);
        assert!((i2.positions[0] - v(95.0, 50.0)).mag() < 1e-9);
        assert_eq!(time_of_impact(&boundary, &boundary, TOL), None);
    }

    #[test]
    fn random_circle_pairs_touch_at_reported_time() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut hits = 0;
        for _ in 0..2000 {
            let mut rand_v = || v(rng.gen_range(-100.0..100.0), rng.gen_range(-100.0..100.0));
            let (a_start, a_end, b_start, b_end) = (rand_v(), rand_v(), rand_v(), rand_v());
            let (ra, rb) = (rng.gen_range(1.0..20.0), rng.gen_range(1.0..20.0));
            let a = SweptCircle::new(a_start, a_end, ra);
            let b = SweptCircle::new(b_start, b_end, rb);
            if (b.start - a.start).mag() <= ra + rb {
                continue;
            }
            match circle_circle(&a, &b, TOL) {
                Some(impact) => {
                    hits += 1;
                    assert!((0.0..1.0).contains(&impact.t));
                    let dist = (b.center_at(impact.t) - a.center_at(impact.t)).mag();
                    assert!(
                        (dist - (ra + rb)).abs() < 1e-9,
                        "distance {} vs radii {}",
                        dist,
                        ra + rb
                    );
                }
                None => {
                    for i in 1..100 {
                        let t = i as f64 / 100.0;
                        let dist = (b.center_at(t) - a.center_at(t)).mag();
                        assert!(dist >= ra + rb - 1e-9, "missed overlap at t = {}", t);
                    }
                }
            }
        }
        assert!(hits > 0);
    }

    #[test]
    fn random_circles_in_box_touch_face_at_reported_time() {
        let rect = unit_box();
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..2000 {
            let r = rng.gen_range(1.0..10.0);
            let start = v(rng.gen_range(r..100.0 - r), rng.gen_range(r..100.0 - r));
            let end = v(rng.gen_range(-100.0..200.0), rng.gen_range(-100.0..200.0));
            let c = SweptCircle::new(start, end, r);
            match circle_in_rect(&rect, &c) {
                Some(impact) => {
                    assert!((0.0..1.0).contains(&impact.t));
                    let center = c.center_at(impact.t);
                    let touching = Face::ALL.iter().any(|face| {
                        let coord = if face.is_vertical() { center.x } else { center.y };
                        ((coord - face.coordinate(&rect)).abs() - r).abs() < 1e-9
                    });
                    assert!(touching);
                }
                None => {
                    for i in 1..100 {
                        let p = c.center_at(i as f64 / 100.0);
                        assert!(p.x - r >= -1e-9 && p.x + r <= 100.0 + 1e-9);
                        assert!(p.y - r >= -1e-9 && p.y + r <= 100.0 + 1e-9);
                    }
                }
            }
        }
    }
}
