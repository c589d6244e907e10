use glam::{Mat4, Quat, Vec2, Vec3};

use crate::math::{damp_factor, look_rotation};

/// A ray with a unit-length direction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

/// Perspective camera pose, read-only to the formation engine.
///
/// The camera looks down its local -Z axis with +Y up.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraTransform {
    pub position: Vec3,
    pub orientation: Quat,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraTransform {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 1.0, 45.0),
            orientation: Quat::IDENTITY,
            fov_y: 50f32.to_radians(),
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl CameraTransform {
    /// Camera at `position` oriented toward `target`.
    pub fn looking_at(position: Vec3, target: Vec3) -> Self {
        Self {
            position,
            orientation: camera_look_rotation(position, target),
            ..Self::default()
        }
    }

    pub fn forward(&self) -> Vec3 {
        self.orientation * Vec3::NEG_Z
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.orientation, self.position).inverse()
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_y, self.aspect, self.near, self.far)
    }

    /// Ray from the camera through normalized device coordinates.
    ///
    /// `ndc` is clamped to [-1,1] per axis before use.
    pub fn ray_through(&self, ndc: Vec2) -> Ray {
        let ndc = ndc.clamp(Vec2::NEG_ONE, Vec2::ONE);
        let half = (self.fov_y * 0.5).tan();
        let local = Vec3::new(ndc.x * half * self.aspect, ndc.y * half, -1.0);
        Ray {
            origin: self.position,
            direction: (self.orientation * local).normalize_or_zero(),
        }
    }
}

/// Orientation whose local -Z points from `eye` at `target`.
fn camera_look_rotation(eye: Vec3, target: Vec3) -> Quat {
    // A camera looks down -Z, i.e. its +Z faces away from the target.
    look_rotation(target, eye)
}

/// Narrative phase of the intro camera move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IntroPhase {
    Waiting,
    Opening,
    Finished,
}

/// Simple lerp-to-target camera for the intro sequence.
pub struct CameraRig {
    pub phase: IntroPhase,
    pub rate: f32,
    camera: CameraTransform,
}

const WAITING_POSITION: Vec3 = Vec3::new(0.0, 2.5, 18.0);
const WAITING_LOOK: Vec3 = Vec3::new(0.0, 2.5, 0.0);
const OPENING_POSITION: Vec3 = Vec3::new(0.0, 4.0, 12.0);
const FINISHED_POSITION: Vec3 = Vec3::new(0.0, 1.0, 45.0);
const FINISHED_LOOK: Vec3 = Vec3::new(0.0, 1.0, 0.0);

impl CameraRig {
    pub fn new() -> Self {
        Self {
            phase: IntroPhase::Waiting,
            rate: 1.5,
            camera: CameraTransform::looking_at(WAITING_POSITION, WAITING_LOOK),
        }
    }

    pub fn camera(&self) -> &CameraTransform {
        &self.camera
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.camera.aspect = aspect;
        }
    }

    pub fn set_phase(&mut self, phase: IntroPhase) {
        self.phase = phase;
        if phase == IntroPhase::Waiting {
            self.camera.position = WAITING_POSITION;
            self.camera.orientation = camera_look_rotation(WAITING_POSITION, WAITING_LOOK);
        }
    }

    pub fn update(&mut self, dt: f32) {
        let (goal, look) = match self.phase {
            IntroPhase::Waiting => return,
            IntroPhase::Opening => (OPENING_POSITION, WAITING_LOOK),
            IntroPhase::Finished => (FINISHED_POSITION, FINISHED_LOOK),
        };
        let k = damp_factor(self.rate, dt);
        self.camera.position = self.camera.position.lerp(goal, k);
        self.camera.orientation = camera_look_rotation(self.camera.position, look);
    }
}

impl Default for CameraRig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_looking_at_faces_target() {
        let cam = CameraTransform::looking_at(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO);
        let fwd = cam.forward();
        assert!((fwd - Vec3::NEG_Z).length() < 1e-5, "forward = {:?}", fwd);
    }

    #[test]
    fn test_center_ray_matches_forward() {
        let cam = CameraTransform::looking_at(Vec3::new(3.0, 4.0, 20.0), Vec3::new(0.0, 1.0, 0.0));
        let ray = cam.ray_through(Vec2::ZERO);
        assert!((ray.direction - cam.forward()).length() < 1e-5);
        assert_eq!(ray.origin, cam.position);
    }

    #[test]
    fn test_rig_pulls_back_without_entering_tree() {
        let mut rig = CameraRig::new();
        rig.set_phase(IntroPhase::Opening);
        for _ in 0..120 {
            rig.update(1.0 / 60.0);
            let p = rig.camera().position;
            assert!(Vec2::new(p.x, p.z).length() > 9.0, "camera entered tree at {:?}", p);
        }
        rig.set_phase(IntroPhase::Finished);
        for _ in 0..1200 {
            rig.update(1.0 / 60.0);
            let p = rig.camera().position;
            assert!(Vec2::new(p.x, p.z).length() > 9.0, "camera entered tree at {:?}", p);
        }
        assert!((rig.camera().position - FINISHED_POSITION).length() < 0.01);
    }
}
