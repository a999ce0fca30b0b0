//! Scalar and vector smoothing helpers.
//!
//! `smooth_damp` is the critically damped spring approximation commonly used
//! for game cameras and controllers: it approaches the target exponentially
//! and never overshoots it.

use glam::{Mat3, Quat, Vec3};

/// Lower bound on smoothing time constants, to keep the spring finite.
pub const MIN_SMOOTH_TIME: f32 = 1e-4;

/// Move `current` toward `target` with a critically damped spring.
///
/// `velocity` is the spring state and must be kept by the caller between
/// calls. `smooth_time` is roughly the time to reach the target.
pub fn smooth_damp(
    current: f32,
    target: f32,
    velocity: &mut f32,
    smooth_time: f32,
    dt: f32,
) -> f32 {
    if dt <= 0.0 {
        return current;
    }
    let smooth_time = smooth_time.max(MIN_SMOOTH_TIME);
    let omega = 2.0 / smooth_time;
    let x = omega * dt;
    let decay = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);

    let change = current - target;
    let temp = (*velocity + omega * change) * dt;
    *velocity = (*velocity - omega * temp) * decay;
    let mut output = target + (change + temp) * decay;

    // Clamp to the target once it has been crossed.
    if (target - current > 0.0) == (output > target) {
        output = target;
        *velocity = 0.0;
    }
    output
}

/// Component-wise [`smooth_damp`] on a vector.
pub fn smooth_damp_vec3(
    current: Vec3,
    target: Vec3,
    velocity: &mut Vec3,
    smooth_time: f32,
    dt: f32,
) -> Vec3 {
    Vec3::new(
        smooth_damp(current.x, target.x, &mut velocity.x, smooth_time, dt),
        smooth_damp(current.y, target.y, &mut velocity.y, smooth_time, dt),
        smooth_damp(current.z, target.z, &mut velocity.z, smooth_time, dt),
    )
}

/// Wrap `t` into `[0, length)`.
pub fn repeat(t: f32, length: f32) -> f32 {
    (t - (t / length).floor() * length).clamp(0.0, length)
}

/// Shortest signed difference from angle `a` to angle `b`, in degrees.
pub fn delta_angle(a: f32, b: f32) -> f32 {
    let mut delta = repeat(b - a, 360.0);
    if delta > 180.0 {
        delta -= 360.0;
    }
    delta
}

/// [`smooth_damp`] for angles in degrees, taking the shortest arc.
pub fn smooth_damp_angle(
    current: f32,
    target: f32,
    velocity: &mut f32,
    smooth_time: f32,
    dt: f32,
) -> f32 {
    let target = current + delta_angle(current, target);
    smooth_damp(current, target, velocity, smooth_time, dt)
}

/// Interpolate between two angles in degrees along the shortest arc.
pub fn lerp_angle(a: f32, b: f32, t: f32) -> f32 {
    a + delta_angle(a, b) * t.clamp(0.0, 1.0)
}

/// Frame-rate independent blend factor for an exponential approach at `rate`.
pub fn exp_blend(rate: f32, dt: f32) -> f32 {
    1.0 - (-rate * dt).exp()
}

/// Heading of a vector on the ground plane, in degrees (+Z is 0, +X is 90).
pub fn heading_degrees(v: Vec3) -> f32 {
    v.x.atan2(v.z).to_degrees()
}

/// The ground-plane part of a vector.
pub fn planar(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Rotation whose forward (+Z) axis points along `dir`, with `up` as the
/// vertical hint. `None` when `dir` is degenerate or parallel to `up`.
pub fn look_rotation(dir: Vec3, up: Vec3) -> Option<Quat> {
    let forward = dir.try_normalize()?;
    let right = up.cross(forward).try_normalize()?;
    let up = forward.cross(right);
    Some(Quat::from_mat3(&Mat3::from_cols(right, up, forward)))
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn smooth_damp_converges_without_overshoot() {
        let mut value = 0.0;
        let mut vel = 0.0;
        for _ in 0..200 {
            value = smooth_damp(value, 5.0, &mut vel, 0.12, 0.02);
            assert!(value <= 5.0);
        }
        assert!((value - 5.0).abs() < 1e-3);
    }

    #[test]
    fn smooth_damp_zero_dt_is_noop() {
        let mut vel = 1.0;
        assert_eq!(smooth_damp(2.0, 5.0, &mut vel, 0.1, 0.0), 2.0);
        assert_eq!(vel, 1.0);
    }

    #[test]
    fn delta_angle_takes_short_way() {
        assert!((delta_angle(350.0, 10.0) - 20.0).abs() < 1e-4);
        assert!((delta_angle(10.0, 350.0) + 20.0).abs() < 1e-4);
        assert!((delta_angle(0.0, 180.0) - 180.0).abs() < 1e-4);
    }

    #[test]
    fn lerp_angle_wraps() {
        let mid = lerp_angle(350.0, 10.0, 0.5);
        assert!((mid - 360.0).abs() < 1e-4);
    }

    #[test]
    fn smooth_damp_angle_crosses_wrap() {
        let mut vel = 0.0;
        let mut yaw = 170.0;
        for _ in 0..100 {
            yaw = smooth_damp_angle(yaw, -170.0, &mut vel, 0.08, 0.02);
        }
        assert!(delta_angle(yaw, -170.0).abs() < 0.1);
        // Took the 20 degree path through 180, not the 340 degree one.
        assert!(yaw > 170.0);
    }

    #[test]
    fn heading_matches_axes() {
        assert!(heading_degrees(Vec3::Z).abs() < 1e-5);
        assert!((heading_degrees(Vec3::X) - 90.0).abs() < 1e-4);
    }

    #[test]
    fn look_rotation_points_forward() {
        let rot = look_rotation(Vec3::new(1.0, 0.0, 0.0), Vec3::Y).unwrap();
        assert!((rot * Vec3::Z - Vec3::X).length() < 1e-5);
        assert!((rot * Vec3::X + Vec3::Z).length() < 1e-5);
        assert!(look_rotation(Vec3::Y, Vec3::Y).is_none());
        assert!(look_rotation(Vec3::ZERO, Vec3::Y).is_none());
    }

    proptest! {
        #[test]
        fn smooth_damp_never_crosses_target(
            start in -50.0f32..50.0,
            target in -50.0f32..50.0,
            smooth_time in 0.01f32..1.0,
            dt in 0.001f32..0.1,
        ) {
            let mut value = start;
            let mut vel = 0.0;
            let below = start <= target;
            for _ in 0..300 {
                value = smooth_damp(value, target, &mut vel, smooth_time, dt);
                if below {
                    prop_assert!(value <= target + 1e-4);
                } else {
                    prop_assert!(value >= target - 1e-4);
                }
            }
        }
    }
}
