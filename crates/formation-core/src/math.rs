use std::f32::consts::{PI, TAU};

use glam::{Quat, Vec3};

/// GLSL-style `mix(a, b, t)` for scalars.
#[inline]
pub fn mix(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}

/// Cubic ease-in-out on [0,1].
pub fn ease_in_out_cubic(x: f32) -> f32 {
    if x < 0.5 {
        4.0 * x * x * x
    } else {
        1.0 - (-2.0 * x + 2.0).powi(3) / 2.0
    }
}

/// Exponential smoothing of `current` toward `target`.
///
/// `rate` is in 1/seconds. Equivalent to `mix(current, target, rate * dt)`
/// for small `dt` but never overshoots when a frame is long.
#[inline]
pub fn damp(current: f32, target: f32, rate: f32, dt: f32) -> f32 {
    mix(current, target, damp_factor(rate, dt))
}

/// Blend factor used by [`damp`]: `1 - exp(-rate * dt)`, in [0,1].
#[inline]
pub fn damp_factor(rate: f32, dt: f32) -> f32 {
    if !(dt > 0.0) || !(rate > 0.0) {
        return 0.0;
    }
    1.0 - (-rate * dt).exp()
}

/// Wrap an angle into (-PI, PI].
#[inline]
pub fn wrap_angle(angle: f32) -> f32 {
    let wrapped = PI - (PI - angle).rem_euclid(TAU);
    if wrapped <= -PI {
        wrapped + TAU
    } else {
        wrapped
    }
}

/// Rotate `v` around the vertical axis by `angle` radians.
#[inline]
pub fn rotate_y(v: Vec3, angle: f32) -> Vec3 {
    let (s, c) = angle.sin_cos();
    Vec3::new(c * v.x + s * v.z, v.y, -s * v.x + c * v.z)
}

/// Orientation whose local +Z axis points from `eye` toward `target`,
/// keeping local +Y as close to world up as possible.
///
/// Degenerate inputs (coincident points, direction parallel to up) are
/// nudged the same way a scene-graph `lookAt` would, so the result is
/// always a finite unit quaternion.
pub fn look_rotation(eye: Vec3, target: Vec3) -> Quat {
    let mut z = target - eye;
    if !z.is_finite() || z.length_squared() < 1e-12 {
        z = Vec3::Z;
    }
    z = z.normalize();

    let mut x = Vec3::Y.cross(z);
    if x.length_squared() < 1e-12 {
        z.z += 1e-4;
        z = z.normalize();
        x = Vec3::Y.cross(z);
    }
    let x = x.normalize();
    let y = z.cross(x);

    Quat::from_mat3(&glam::Mat3::from_cols(x, y, z)).normalize()
}
