use glam::{Vec2, Vec3};

use crate::camera::{CameraTransform, Ray};
use crate::config::{PointerConfig, SmoothingMode};

/// Attractor position before the pointer has ever hit the plane.
///
/// Far enough that no snow particle is inside the influence radius.
pub const FAR_AWAY: Vec3 = Vec3::splat(9999.0);

/// Infinite plane `normal · p + constant = 0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub constant: f32,
}

impl Plane {
    pub fn new(normal: Vec3, constant: f32) -> Self {
        let len = normal.length();
        Self {
            normal: normal / len,
            constant: constant / len,
        }
    }
}

impl Ray {
    /// Intersection with `plane` in front of the ray origin, if any.
    ///
    /// Rays parallel to the plane, hits behind the origin and non-finite
    /// results all yield `None`.
    pub fn intersect_plane(&self, plane: &Plane) -> Option<Vec3> {
        let denom = plane.normal.dot(self.direction);
        if denom.abs() < 1e-6 {
            return None;
        }
        let t = -(self.origin.dot(plane.normal) + plane.constant) / denom;
        if !(t >= 0.0) {
            return None;
        }
        let hit = self.origin + self.direction * t;
        hit.is_finite().then_some(hit)
    }
}

/// Projects the pointer onto the reference plane and smooths the result
/// into the attractor point read by the snow kernel.
pub struct PointerProjector {
    plane: Plane,
    smoothing: f32,
    mode: SmoothingMode,
    attractor: Vec3,
}

impl PointerProjector {
    pub fn new(config: &PointerConfig) -> Self {
        Self {
            plane: Plane::new(config.plane_normal, config.plane_constant),
            smoothing: config.smoothing,
            mode: config.smoothing_mode,
            attractor: FAR_AWAY,
        }
    }

    pub fn attractor(&self) -> Vec3 {
        self.attractor
    }

    pub fn plane(&self) -> &Plane {
        &self.plane
    }

    /// Blend factor applied this frame.
    pub fn smoothing_factor(&self, dt: f32) -> f32 {
        match self.mode {
            SmoothingMode::PerFrame => self.smoothing,
            SmoothingMode::TimeCorrected { reference_fps } => {
                if !(dt > 0.0) {
                    return 0.0;
                }
                1.0 - (1.0 - self.smoothing).powf(dt * reference_fps)
            }
        }
    }

    /// Move the attractor toward the pointer's hit on the plane.
    ///
    /// `pointer` is in normalized device coordinates and is clamped to
    /// [-1,1]. A missed or degenerate intersection keeps the previous
    /// attractor.
    pub fn update(&mut self, camera: &CameraTransform, pointer: Vec2, dt: f32) -> Vec3 {
        if !pointer.is_finite() {
            log::trace!("ignoring non-finite pointer {:?}", pointer);
            return self.attractor;
        }
        let ray = camera.ray_through(pointer);
        let Some(hit) = ray.intersect_plane(&self.plane) else {
            log::trace!("pointer ray missed the reference plane");
            return self.attractor;
        };

        let k = self.smoothing_factor(dt);
        let next = self.attractor.lerp(hit, k);
        if next.is_finite() {
            self.attractor = next;
        }
        self.attractor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parallel_ray_misses() {
        let plane = Plane::new(Vec3::Z, 0.0);
        let ray = Ray {
            origin: Vec3::new(0.0, 0.0, 5.0),
            direction: Vec3::X,
        };
        assert!(ray.intersect_plane(&plane).is_none());
    }

    #[test]
    fn test_hit_behind_origin_misses() {
        let plane = Plane::new(Vec3::Z, 0.0);
        let ray = Ray {
            origin: Vec3::new(0.0, 0.0, 5.0),
            direction: Vec3::Z,
        };
        assert!(ray.intersect_plane(&plane).is_none());
    }

    #[test]
    fn test_time_corrected_matches_per_frame_at_reference_rate() {
        let projector = PointerProjector::new(&PointerConfig::default());
        let k = projector.smoothing_factor(1.0 / 60.0);
        assert!((k - 0.1).abs() < 1e-5, "k = {}", k);
    }
}
