//! Per-element pose blending.
//!
//! Every frame each element's pose is recomputed from scratch out of its
//! static layout, the global progress, two smoothed transition weights and
//! the camera. Three candidate poses compete:
//!
//! - tree: staggered, spiralling interpolation from chaos to target
//! - memory circle: evenly spaced on a slowly orbiting horizontal ring
//! - focus: a fixed distance in front of the camera
//!
//! They are combined by nested interpolation, tree -> memory -> focus, so a
//! selected element always wins over memory mode.

use std::f32::consts::{PI, TAU};

use glam::{Quat, Vec3};

use crate::camera::CameraTransform;
use crate::config::FormationConfig;
use crate::element::Element;
use crate::math::{damp, ease_in_out_cubic, look_rotation, mix, rotate_y, wrap_angle};

/// Final placement of one element.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub orientation: Quat,
    pub scale: f32,
}

impl Pose {
    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.orientation.is_finite() && self.scale.is_finite()
    }
}

/// Smoothed transition state of a single element.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BlendWeights {
    /// Memory-mode weight in [0,1].
    pub memory: f32,
    /// Selection weight in [0,1].
    pub selection: f32,
    /// Spin angle about the facing axis, in (-PI, PI]. Winds up while
    /// selected and unwinds to zero afterwards.
    pub spin: f32,
}

impl BlendWeights {
    /// Weights after smoothing for `dt` seconds toward the current flags.
    ///
    /// Flipping a flag mid-transition simply re-targets the smoothing.
    pub fn advanced(self, memory_active: bool, selected: bool, dt: f32, cfg: &FormationConfig) -> Self {
        let memory_goal = if memory_active { 1.0 } else { 0.0 };
        let selection_goal = if selected { 1.0 } else { 0.0 };
        let spin = if selected {
            wrap_angle(self.spin + cfg.spin_speed * dt.max(0.0))
        } else {
            damp(wrap_angle(self.spin), 0.0, cfg.selection_rate, dt)
        };
        Self {
            memory: damp(self.memory, memory_goal, cfg.memory_rate, dt).clamp(0.0, 1.0),
            selection: damp(self.selection, selection_goal, cfg.selection_rate, dt).clamp(0.0, 1.0),
            spin,
        }
    }

    /// Blend between facing the tree axis (0) and facing the camera (1).
    pub fn look_weight(&self) -> f32 {
        self.memory.max(self.selection)
    }
}

/// Frame-wide inputs shared by every element.
#[derive(Clone, Copy, Debug)]
pub struct FrameContext<'a> {
    pub progress: f32,
    pub time: f32,
    /// Orbit phase of the memory circle, advanced once per frame by the owner.
    pub circle_phase: f32,
    pub element_count: usize,
    pub camera: &'a CameraTransform,
}

/// Normalized height of a target position within the formation, in [0,1].
pub fn height_fraction(target_y: f32, cfg: &FormationConfig) -> f32 {
    let frac = (target_y - cfg.formation_bottom) / cfg.formation_height;
    if frac.is_nan() {
        return 0.0;
    }
    frac.clamp(0.0, 1.0)
}

/// Staggered local progress before easing.
///
/// Lower elements start earlier: at a fixed global progress, a smaller
/// `height_frac` never yields a smaller local progress.
pub fn local_progress(progress: f32, height_frac: f32, cfg: &FormationConfig) -> f32 {
    let progress = if progress.is_nan() { 0.0 } else { progress.clamp(0.0, 1.0) };
    (progress * cfg.stagger_rate - height_frac * cfg.stagger_spread).clamp(0.0, 1.0)
}

/// Eased local progress of `element` at global `progress`.
pub fn eased_local_progress(element: &Element, progress: f32, cfg: &FormationConfig) -> f32 {
    let h = height_fraction(element.target_position().y, cfg);
    ease_in_out_cubic(local_progress(progress, h, cfg))
}

/// Tree pose position for eased local progress `p`.
///
/// The spiral twist decays to zero as `p` reaches 1. It is applied around
/// the chaos point unwound by the full twist, so `p = 0` sits exactly on the
/// chaos position and `p = 1` exactly on the target (plus bobbing).
pub fn tree_position(element: &Element, p: f32, time: f32, cfg: &FormationConfig) -> Vec3 {
    let unwound = rotate_y(element.chaos_position(), -cfg.twist);
    let base = unwound.lerp(element.target_position(), p);
    let mut pos = rotate_y(base, cfg.twist * (1.0 - p));
    pos.y += (time * cfg.bob_speed + element.id() as f32).sin() * cfg.bob_amplitude;
    pos
}

/// Slot `index` of `count` on the memory circle at orbit `phase`.
pub fn memory_position(index: usize, count: usize, phase: f32, cfg: &FormationConfig) -> Vec3 {
    let step = if count == 0 { 0.0 } else { TAU / count as f32 };
    let angle = index as f32 * step + phase;
    Vec3::new(
        angle.sin() * cfg.memory_radius,
        cfg.memory_height,
        angle.cos() * cfg.memory_radius,
    )
}

/// Point `focus_distance` in front of the camera.
pub fn focus_position(camera: &CameraTransform, cfg: &FormationConfig) -> Vec3 {
    camera.position + camera.forward() * cfg.focus_distance
}

/// Nested interpolation: tree -> memory -> focus.
#[inline]
fn nested<T>(tree: T, memory: T, focus: T, w: &BlendWeights, lerp: impl Fn(T, T, f32) -> T) -> T {
    lerp(lerp(tree, memory, w.memory), focus, w.selection)
}

/// Orientation at `position`: face away from the tree axis when on the
/// tree, face the camera when in memory/focus mode.
///
/// The look target (not the angles) is blended, then a yaw of
/// `PI * (1 - weight)` turns the panel's front outward on the tree.
pub fn blend_orientation(position: Vec3, weights: &BlendWeights, camera: &CameraTransform) -> Quat {
    let weight = weights.look_weight();
    let axis_point = Vec3::new(0.0, position.y, 0.0);
    let look = axis_point.lerp(camera.position, weight);
    look_rotation(position, look) * Quat::from_rotation_y(PI * (1.0 - weight))
}

/// Complete pose of element `index` for this frame.
pub fn blend_pose(
    element: &Element,
    index: usize,
    weights: &BlendWeights,
    ctx: &FrameContext,
    cfg: &FormationConfig,
) -> Pose {
    let p = eased_local_progress(element, ctx.progress, cfg);
    let t = ctx.time;

    let tree = tree_position(element, p, t, cfg);
    let memory = memory_position(index, ctx.element_count, ctx.circle_phase, cfg);
    let focus = focus_position(ctx.camera, cfg);
    let position = nested(tree, memory, focus, weights, Vec3::lerp);

    let mut orientation = blend_orientation(position, weights, ctx.camera);
    let phase = element.id() as f32;
    // Sway fades in with formation and out with memory/focus; spin and
    // wobble follow the selection weight.
    let sway = (t * cfg.sway_speed + phase).sin() * cfg.sway_amplitude * p * (1.0 - weights.look_weight());
    let wobble = (t * cfg.spin_speed).sin() * cfg.spin_wobble * weights.selection;
    orientation = orientation
        * Quat::from_rotation_z(sway)
        * Quat::from_rotation_y(wobble)
        * Quat::from_rotation_z(weights.spin);

    let scale = nested(cfg.base_scale, cfg.memory_scale, cfg.focus_scale, weights, mix);

    Pose {
        position,
        orientation: orientation.normalize(),
        scale,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::ElementLayout;

    fn element(chaos: Vec3, target: Vec3) -> Element {
        Element::new(0, ElementLayout { chaos, target })
    }

    #[test]
    fn test_local_progress_clamps_out_of_range() {
        let cfg = FormationConfig::default();
        assert_eq!(local_progress(-3.0, 0.5, &cfg), 0.0);
        assert_eq!(local_progress(7.0, 0.5, &cfg), 1.0);
        assert_eq!(local_progress(f32::NAN, 0.5, &cfg), 0.0);
    }

    #[test]
    fn test_every_height_completes_at_full_progress() {
        let cfg = FormationConfig::default();
        for i in 0..=10 {
            let h = i as f32 / 10.0;
            assert_eq!(local_progress(1.0, h, &cfg), 1.0, "h = {}", h);
        }
    }

    #[test]
    fn test_tree_position_endpoints() {
        let cfg = FormationConfig {
            bob_amplitude: 0.0,
            ..Default::default()
        };
        let e = element(Vec3::new(12.0, 3.0, -7.0), Vec3::new(4.0, 1.0, 2.0));
        assert!((tree_position(&e, 0.0, 3.0, &cfg) - e.chaos_position()).length() < 1e-4);
        assert!((tree_position(&e, 1.0, 3.0, &cfg) - e.target_position()).length() < 1e-5);
    }

    #[test]
    fn test_memory_position_zero_count_is_finite() {
        let cfg = FormationConfig::default();
        let p = memory_position(0, 0, 0.3, &cfg);
        assert!(p.is_finite());
        assert!((glam::Vec2::new(p.x, p.z).length() - cfg.memory_radius).abs() < 1e-4);
    }

    #[test]
    fn test_memory_slots_evenly_spaced() {
        let cfg = FormationConfig::default();
        let a = memory_position(0, 4, 0.0, &cfg);
        let b = memory_position(1, 4, 0.0, &cfg);
        let c = memory_position(2, 4, 0.0, &cfg);
        assert!((a.distance(b) - b.distance(c)).abs() < 1e-4);
        let (a_xz, c_xz) = (glam::Vec2::new(a.x, a.z), glam::Vec2::new(c.x, c.z));
        assert!((a_xz + c_xz).length() < 1e-4, "opposite slots should mirror: {:?} {:?}", a, c);
        assert_eq!(a.y, c.y);
    }

    #[test]
    fn test_tree_orientation_faces_outward() {
        let cam = CameraTransform::default();
        let pos = Vec3::new(5.0, 2.0, 0.0);
        let q = blend_orientation(pos, &BlendWeights::default(), &cam);
        let front = q * Vec3::Z;
        assert!(front.x > 0.99, "front should point away from axis: {:?}", front);
    }

    #[test]
    fn test_focus_orientation_faces_camera() {
        let cam = CameraTransform::default();
        let pos = Vec3::new(5.0, 2.0, 0.0);
        let w = BlendWeights {
            memory: 0.0,
            selection: 1.0,
            spin: 0.0,
        };
        let q = blend_orientation(pos, &w, &cam);
        let front = q * Vec3::Z;
        let to_cam = (cam.position - pos).normalize();
        assert!(front.dot(to_cam) > 0.99, "front {:?} to_cam {:?}", front, to_cam);
    }

    #[test]
    fn test_weights_never_overshoot() {
        let cfg = FormationConfig::default();
        let w = BlendWeights::default().advanced(true, true, 10.0, &cfg);
        assert!(w.memory <= 1.0 && w.selection <= 1.0);
        assert!(w.selection > 0.99);
    }

    #[test]
    fn test_spin_winds_while_selected_and_unwinds_after() {
        let cfg = FormationConfig::default();
        let mut w = BlendWeights::default();
        for _ in 0..60 {
            w = w.advanced(false, true, 1.0 / 60.0, &cfg);
        }
        assert!((w.spin - cfg.spin_speed).abs() < 1e-4, "spin = {}", w.spin);

        for _ in 0..600 {
            w = w.advanced(false, true, 1.0 / 60.0, &cfg);
            assert!(w.spin > -PI - 1e-5 && w.spin <= PI + 1e-5);
        }
        for _ in 0..600 {
            w = w.advanced(false, false, 1.0 / 60.0, &cfg);
        }
        assert!(w.spin.abs() < 1e-3, "spin = {}", w.spin);
    }

    #[test]
    fn test_scale_precedence() {
        let cfg = FormationConfig::default();
        let cam = CameraTransform::default();
        let e = element(Vec3::ZERO, Vec3::new(3.0, 0.0, 0.0));
        let ctx = FrameContext {
            progress: 1.0,
            time: 0.0,
            circle_phase: 0.0,
            element_count: 1,
            camera: &cam,
        };
        let both = BlendWeights {
            memory: 1.0,
            selection: 1.0,
            spin: 0.0,
        };
        let pose = blend_pose(&e, 0, &both, &ctx, &cfg);
        assert_eq!(pose.scale, cfg.focus_scale);
        let memory_only = BlendWeights {
            memory: 1.0,
            selection: 0.0,
            spin: 0.0,
        };
        let pose = blend_pose(&e, 0, &memory_only, &ctx, &cfg);
        assert_eq!(pose.scale, cfg.memory_scale);
    }
}
