//! Velocity updates applied to bodies at the instant they collide.
//!
//! Positions are already at the exact contact state when these run,
//! so only velocities change.

use crate::math::{self as m, left_normal, Angle, Polar};
use crate::physics::body::Rect;

/// Perfectly elastic collision between two balls.
///
/// Velocities are split into components along the line between the centers
/// and perpendicular to it. The perpendicular components are unaffected
/// and the parallel ones are exchanged like in a one-dimensional elastic collision.
pub fn ball_ball(
    pos_a: m::Vec2,
    vel_a: &mut m::Vec2,
    mass_a: f64,
    pos_b: m::Vec2,
    vel_b: &mut m::Vec2,
    mass_b: f64,
) {
    let line = Angle::of_vector(pos_b - pos_a);
    let (par_a, perp_a) = Polar::from_cartesian(*vel_a).components_along(line);
    let (par_b, perp_b) = Polar::from_cartesian(*vel_b).components_along(line);

    let mass_sum = mass_a + mass_b;
    let new_par_a = (par_a * (mass_a - mass_b) + 2.0 * mass_b * par_b) / mass_sum;
    let new_par_b = (par_b * (mass_b - mass_a) + 2.0 * mass_a * par_a) / mass_sum;

    let dir = *line.direction();
    let normal = left_normal(dir);
    *vel_a = new_par_a * dir + perp_a * normal;
    *vel_b = new_par_b * dir + perp_b * normal;
}

/// Reflect a ball off the inside of a boundary.
///
/// The struck face is found by comparing the contact point against the rect's edges.
/// A contact point in a corner reflects both components.
/// Only velocity heading out through the struck face is reflected,
/// so a ball already moving back in keeps its velocity.
/// `restitution` of 1 means no energy is lost.
pub fn ball_boundary(vel: &mut m::Vec2, point: m::Vec2, rect: &Rect, restitution: f64) {
    if (point.x == rect.min_x() && vel.x < 0.0) || (point.x == rect.max_x() && vel.x > 0.0) {
        vel.x = -vel.x * restitution;
    }
    if (point.y == rect.min_y() && vel.y < 0.0) || (point.y == rect.max_y() && vel.y > 0.0) {
        vel.y = -vel.y * restitution;
    }
}

/// Let a boundary hold up a ball that its acceleration keeps pushing out.
///
/// If the ball's velocity after `dt` more of `acc` would still carry it out through
/// the face at `point`, the acceleration component into that face is removed
/// for the rest of the frame. This is what keeps a ball resting on a floor under gravity.
///
/// Returns whether anything was removed.
pub fn boundary_support(
    acc: &mut m::Vec2,
    vel: m::Vec2,
    point: m::Vec2,
    rect: &Rect,
    dt: f64,
) -> bool {
    let end_vel = vel + *acc * dt;
    let mut supported = false;
    let outward_x = (point.x == rect.min_x() && acc.x < 0.0 && end_vel.x < 0.0)
        || (point.x == rect.max_x() && acc.x > 0.0 && end_vel.x > 0.0);
    if outward_x {
        acc.x = 0.0;
        supported = true;
    }
    let outward_y = (point.y == rect.min_y() && acc.y < 0.0 && end_vel.y < 0.0)
        || (point.y == rect.max_y() && acc.y > 0.0 && end_vel.y > 0.0);
    if outward_y {
        acc.y = 0.0;
        supported = true;
    }
    supported
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::body::MASS_PER_CUBIC_RADIUS;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn v(x: f64, y: f64) -> m::Vec2 {
        m::Vec2::new(x, y)
    }

    #[test]
    fn equal_masses_swap_head_on() {
        let mut va = v(50.0, 0.0);
        let mut vb = v(-50.0, 0.0);
        ball_ball(v(-10.0, 0.0), &mut va, 1.0, v(10.0, 0.0), &mut vb, 1.0);
        assert!((va - v(-50.0, 0.0)).mag() < 1e-9);
        assert!((vb - v(50.0, 0.0)).mag() < 1e-9);
    }

    #[test]
    fn glancing_blow_keeps_perpendicular_motion() {
        // b sits below and to the right of a at 45 degrees
        let mut va = v(10.0, 0.0);
        let mut vb = v(0.0, 0.0);
        ball_ball(v(0.0, 0.0), &mut va, 1.0, v(1.0, 1.0), &mut vb, 1.0);
        // the component along the diagonal moves over to b
        assert!((va - v(5.0, -5.0)).mag() < 1e-9);
        assert!((vb - v(5.0, 5.0)).mag() < 1e-9);
    }

    #[test]
    fn light_ball_bounces_off_heavy_one() {
        let mut va = v(10.0, 0.0);
        let mut vb = v(0.0, 0.0);
        ball_ball(v(0.0, 0.0), &mut va, 1.0, v(2.0, 0.0), &mut vb, 3.0);
        assert!((va - v(-5.0, 0.0)).mag() < 1e-9);
        assert!((vb - v(5.0, 0.0)).mag() < 1e-9);
    }

    #[test]
    fn random_collisions_conserve_momentum_and_energy() {
        let mut rng = StdRng::seed_from_u64(1234);
        for _ in 0..1000 {
            let r_a: f64 = rng.gen_range(1.0..30.0);
            let r_b: f64 = rng.gen_range(1.0..30.0);
            let mass_a = MASS_PER_CUBIC_RADIUS * r_a.powi(3);
            let mass_b = MASS_PER_CUBIC_RADIUS * r_b.powi(3);
            let angle: f64 = rng.gen_range(0.0..std::f64::consts::TAU);
            let pos_a = v(rng.gen_range(-100.0..100.0), rng.gen_range(-100.0..100.0));
            let pos_b = pos_a + (r_a + r_b) * v(angle.cos(), angle.sin());
            let vel_a0 = v(rng.gen_range(-200.0..200.0), rng.gen_range(-200.0..200.0));
            let vel_b0 = v(rng.gen_range(-200.0..200.0), rng.gen_range(-200.0..200.0));

            let (mut vel_a, mut vel_b) = (vel_a0, vel_b0);
            ball_ball(pos_a, &mut vel_a, mass_a, pos_b, &mut vel_b, mass_b);

            let momentum_before = mass_a * vel_a0 + mass_b * vel_b0;
            let momentum_after = mass_a * vel_a + mass_b * vel_b;
            let scale = momentum_before.mag().max(1.0);
            assert!((momentum_after - momentum_before).mag() / scale < 1e-9);

            let energy_before = mass_a * vel_a0.mag_sq() + mass_b * vel_b0.mag_sq();
            let energy_after = mass_a * vel_a.mag_sq() + mass_b * vel_b.mag_sq();
            assert!((energy_after - energy_before).abs() / energy_before.max(1.0) < 1e-9);

            // motion perpendicular to the line of centers is untouched
            let normal = left_normal((pos_b - pos_a).normalized());
            assert!((vel_a.dot(normal) - vel_a0.dot(normal)).abs() < 1e-9);
            assert!((vel_b.dot(normal) - vel_b0.dot(normal)).abs() < 1e-9);
        }
    }

    #[test]
    fn boundary_reflects_normal_component() {
        let rect = Rect {
            x: 0.0,
            y: 0.0,
            width: 100.0,
            height: 100.0,
        };
        let mut vel = v(100.0, 30.0);
        ball_boundary(&mut vel, v(100.0, 40.0), &rect, 1.0);
        assert_eq!(vel, v(-100.0, 30.0));

        let mut vel = v(20.0, -60.0);
        ball_boundary(&mut vel, v(50.0, 0.0), &rect, 1.0);
        assert_eq!(vel, v(20.0, 60.0));
        assert_eq!(vel.mag(), v(20.0, -60.0).mag());

        // corner
        let mut vel = v(-10.0, -10.0);
        ball_boundary(&mut vel, v(0.0, 0.0), &rect, 1.0);
        assert_eq!(vel, v(10.0, 10.0));

        // inelastic
        let mut vel = v(0.0, 40.0);
        ball_boundary(&mut vel, v(50.0, 100.0), &rect, 0.5);
        assert_eq!(vel, v(0.0, -20.0));
    }

    #[test]
    fn boundary_leaves_inward_motion_alone() {
        let rect = Rect {
            x: 0.0,
            y: 0.0,
            width: 100.0,
            height: 100.0,
        };
        // touching the floor but already on the way up
        let mut vel = v(5.0, -20.0);
        ball_boundary(&mut vel, v(50.0, 100.0), &rect, 1.0);
        assert_eq!(vel, v(5.0, -20.0));

        // corner, only the outward component flips
        let mut vel = v(10.0, -10.0);
        ball_boundary(&mut vel, v(0.0, 0.0), &rect, 1.0);
        assert_eq!(vel, v(10.0, 10.0));
    }

    #[test]
    fn boundary_supports_resting_ball() {
        let rect = Rect {
            x: 0.0,
            y: 0.0,
            width: 100.0,
            height: 100.0,
        };
        let floor = v(50.0, 100.0);

        // at rest on the floor, gravity would push it through
        let mut acc = v(3.0, 500.0);
        assert!(boundary_support(&mut acc, v(0.0, 0.0), floor, &rect, 0.01));
        assert_eq!(acc, v(3.0, 0.0));

        // bouncing up fast enough to leave the floor, gravity stays
        let mut acc = v(0.0, 500.0);
        assert!(!boundary_support(&mut acc, v(0.0, -50.0), floor, &rect, 0.01));
        assert_eq!(acc, v(0.0, 500.0));

        // too slow to get off the floor within the frame
        let mut acc = v(0.0, 500.0);
        assert!(boundary_support(&mut acc, v(0.0, -1.0), floor, &rect, 0.01));
        assert_eq!(acc, v(0.0, 0.0));

        // acceleration pulling away from the face is never touched
        let mut acc = v(0.0, -500.0);
        assert!(!boundary_support(&mut acc, v(0.0, 0.0), floor, &rect, 0.01));
        assert_eq!(acc, v(0.0, -500.0));

        // pinned into a corner by a diagonal field
        let mut acc = v(-100.0, -100.0);
        assert!(boundary_support(&mut acc, v(0.0, 0.0), v(0.0, 0.0), &rect, 0.01));
        assert_eq!(acc, v(0.0, 0.0));
    }
}
