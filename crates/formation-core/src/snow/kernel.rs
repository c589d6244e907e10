//! CPU reference of the per-particle snow kernel.
//!
//! Mirrors the WGSL vertex/fragment program shipped by the wasm crate:
//! periodic fall with wrap-around, sinusoidal drift, radius-limited
//! repulsion from the attractor, depth size attenuation and twinkle.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2, Vec3};

use crate::config::SnowConfig;
use crate::snow::field::SnowParticle;

/// Uniform block shared by every particle in a frame. Layout matches the
/// `SnowUniforms` struct in the WGSL kernel.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct SnowUniforms {
    pub attractor: [f32; 3],
    pub time: f32,
    pub fall_height: f32,
    pub influence_radius: f32,
    pub repulsion_strength: f32,
    pub breeze: f32,
    pub point_scale: f32,
    pub twinkle_base: f32,
    pub twinkle_amplitude: f32,
    pub sprite_opacity: f32,
    pub sprite_falloff: f32,
    pub _pad: [f32; 3],
}

impl SnowUniforms {
    pub fn new(config: &SnowConfig, attractor: Vec3, time: f32) -> Self {
        Self {
            attractor: attractor.to_array(),
            time,
            fall_height: config.fall_height,
            influence_radius: config.influence_radius,
            repulsion_strength: config.repulsion_strength,
            breeze: config.breeze,
            point_scale: config.point_scale,
            twinkle_base: config.twinkle_base,
            twinkle_amplitude: config.twinkle_amplitude,
            sprite_opacity: config.sprite_opacity,
            sprite_falloff: config.sprite_falloff,
            _pad: [0.0; 3],
        }
    }
}

/// Kernel output for one particle.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SnowVertex {
    pub position: Vec3,
    /// Point size in pixels; zero when behind the camera.
    pub point_size: f32,
    /// Per-particle twinkle opacity before the sprite falloff.
    pub alpha: f32,
}

/// Y after falling for `time` seconds with one wrap back into the band.
pub fn fall(base_y: f32, fall_speed: f32, time: f32, fall_height: f32) -> f32 {
    let speed = fall_speed * 5.0 + 2.0;
    let mut y = base_y - (time * speed).rem_euclid(fall_height);
    if y < -fall_height * 0.5 {
        y += fall_height;
    }
    y
}

/// Horizontal sinusoidal drift offset (X and Z).
pub fn drift(drift: f32, phase: f32, time: f32) -> Vec3 {
    let freq = drift * 2.0 + 1.0;
    let amp = drift * 2.0 + 0.5;
    Vec3::new(
        (time * freq + phase).sin() * amp,
        0.0,
        (time * freq * 0.8 + phase).cos() * amp,
    )
}

/// Push `pos` away from `attractor` when within `radius`.
///
/// Force falls off as `(1 - d/r)^2 * strength`, with an extra upward
/// `force * breeze`. At zero distance the push is straight up.
pub fn repel(pos: Vec3, attractor: Vec3, radius: f32, strength: f32, breeze: f32) -> Vec3 {
    if !attractor.is_finite() {
        return pos;
    }
    let sep = pos - attractor;
    let dist = sep.length();
    if !(dist < radius) {
        return pos;
    }
    let dir = if dist > 1e-5 { sep / dist } else { Vec3::Y };
    let falloff = 1.0 - dist / radius;
    let force = falloff * falloff * strength;
    let mut out = pos + dir * force;
    out.y += force * breeze;
    out
}

/// World position of `particle` for this frame.
pub fn displace(particle: &SnowParticle, u: &SnowUniforms) -> Vec3 {
    let mut pos = particle.base_position;
    pos.y = fall(pos.y, particle.fall_speed, u.time, u.fall_height);
    pos += drift(particle.drift, particle.phase, u.time);
    repel(
        pos,
        Vec3::from_array(u.attractor),
        u.influence_radius,
        u.repulsion_strength,
        u.breeze,
    )
}

/// Twinkle opacity oscillating with time and per-particle phase.
pub fn twinkle(particle: &SnowParticle, u: &SnowUniforms) -> f32 {
    u.twinkle_base + u.twinkle_amplitude * (u.time + particle.phase).sin()
}

/// Screen size inversely proportional to view-space depth.
pub fn point_size(size: f32, view_depth: f32, point_scale: f32) -> f32 {
    if view_depth <= 1e-4 {
        return 0.0;
    }
    size * (point_scale / view_depth)
}

/// Fragment opacity at `coord` in [0,1]^2 across the point sprite.
///
/// Returns `None` outside the inscribed circle (fragment discarded).
pub fn sprite_alpha(coord: Vec2, alpha: f32, u: &SnowUniforms) -> Option<f32> {
    let r = (coord - Vec2::splat(0.5)).length();
    if r > 0.5 {
        return None;
    }
    let edge = ((0.5 - r) * 2.0).powf(u.sprite_falloff);
    Some(edge * alpha * u.sprite_opacity)
}

/// Run the kernel for one particle.
pub fn shade(particle: &SnowParticle, u: &SnowUniforms, view: &Mat4) -> SnowVertex {
    let position = displace(particle, u);
    let view_pos = view.transform_point3(position);
    SnowVertex {
        position,
        point_size: point_size(particle.size, -view_pos.z, u.point_scale),
        alpha: twinkle(particle, u),
    }
}

/// Run the kernel for every particle, writing into `out`.
///
/// `out` is resized to match `particles`.
pub fn simulate(particles: &[SnowParticle], u: &SnowUniforms, view: &Mat4, out: &mut Vec<SnowVertex>) {
    out.resize(particles.len(), SnowVertex::default());

    #[cfg(feature = "parallel")]
    {
        out.par_iter_mut()
            .zip(particles.par_iter())
            .for_each(|(v, p)| *v = shade(p, u, view));
    }

    #[cfg(not(feature = "parallel"))]
    {
        for (v, p) in out.iter_mut().zip(particles) {
            *v = shade(p, u, view);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniforms_are_16_byte_multiple() {
        assert_eq!(std::mem::size_of::<SnowUniforms>() % 16, 0);
        assert_eq!(std::mem::size_of::<SnowUniforms>(), 64);
    }

    #[test]
    fn test_no_push_outside_radius() {
        let pos = Vec3::new(8.0, 0.0, 0.0);
        assert_eq!(repel(pos, Vec3::ZERO, 8.0, 8.0, 0.5), pos);
        let far = Vec3::new(20.0, 3.0, 0.0);
        assert_eq!(repel(far, Vec3::ZERO, 8.0, 8.0, 0.5), far);
    }

    #[test]
    fn test_zero_distance_is_finite() {
        let out = repel(Vec3::ONE, Vec3::ONE, 8.0, 8.0, 0.5);
        assert!(out.is_finite());
        // Full force (8) straight up plus breeze (4).
        assert!((out - Vec3::new(1.0, 13.0, 1.0)).length() < 1e-4, "{:?}", out);
    }

    #[test]
    fn test_push_points_away() {
        let out = repel(Vec3::new(2.0, 0.0, 0.0), Vec3::ZERO, 8.0, 8.0, 0.0);
        assert!(out.x > 2.0);
        assert_eq!(out.y, 0.0);
    }

    #[test]
    fn test_sprite_discards_outside_circle() {
        let u = SnowUniforms::new(&SnowConfig::default(), Vec3::ZERO, 0.0);
        assert!(sprite_alpha(Vec2::new(0.0, 0.0), 1.0, &u).is_none());
        let center = sprite_alpha(Vec2::splat(0.5), 1.0, &u).unwrap();
        assert!((center - 0.8).abs() < 1e-6);
        let edge = sprite_alpha(Vec2::new(0.5, 0.95), 1.0, &u).unwrap();
        assert!(edge < center);
    }

    #[test]
    fn test_point_size_behind_camera_is_zero() {
        assert_eq!(point_size(2.0, -5.0, 300.0), 0.0);
        assert_eq!(point_size(2.0, 0.0, 300.0), 0.0);
        assert!((point_size(2.0, 10.0, 300.0) - 60.0).abs() < 1e-4);
        assert!(point_size(2.0, 10.0, 300.0) > point_size(2.0, 20.0, 300.0));
    }
}
