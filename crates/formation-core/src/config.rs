use glam::Vec3;

use crate::error::{FormationError, Result};

/// Per-element pose blending parameters.
#[derive(Clone, Debug)]
pub struct FormationConfig {
    /// Lowest Y of the formed tree; maps to `heightFrac = 0`.
    pub formation_bottom: f32,
    /// Vertical extent of the formed tree; `bottom + height` maps to 1.
    pub formation_height: f32,
    /// How fast local progress runs relative to global progress.
    pub stagger_rate: f32,
    /// Delay (in local-progress units) between the bottom and the top.
    pub stagger_spread: f32,
    /// Spiral twist in radians at zero local progress.
    pub twist: f32,
    pub bob_amplitude: f32,
    pub bob_speed: f32,
    pub sway_amplitude: f32,
    pub sway_speed: f32,
    pub memory_radius: f32,
    pub memory_height: f32,
    /// Orbit speed of the memory circle in radians per second.
    pub memory_rotation_speed: f32,
    /// Distance in front of the camera for a selected element.
    pub focus_distance: f32,
    /// Smoothing rate (1/s) of the memory-mode weight.
    pub memory_rate: f32,
    /// Smoothing rate (1/s) of the selection weight.
    pub selection_rate: f32,
    pub base_scale: f32,
    pub memory_scale: f32,
    pub focus_scale: f32,
    pub spin_speed: f32,
    pub spin_wobble: f32,
}

impl Default for FormationConfig {
    fn default() -> Self {
        Self {
            formation_bottom: -10.0,
            formation_height: 22.0,
            stagger_rate: 2.5,
            stagger_spread: 1.5,
            twist: 10.0,
            bob_amplitude: 0.2,
            bob_speed: 1.5,
            sway_amplitude: 0.08,
            sway_speed: 2.0,
            memory_radius: 18.0,
            memory_height: -5.0,
            memory_rotation_speed: 0.2,
            focus_distance: 10.0,
            memory_rate: 2.0,
            selection_rate: 5.0,
            base_scale: 1.0,
            memory_scale: 1.5,
            focus_scale: 3.0,
            spin_speed: 0.5,
            spin_wobble: 0.1,
        }
    }
}

/// Procedural tree silhouette and scatter volume for the layout generator.
#[derive(Clone, Debug)]
pub struct LayoutConfig {
    /// Cone radius at the bottom of the formation.
    pub base_radius: f32,
    /// Cone radius at the top of the formation.
    pub top_radius: f32,
    /// Elements hang slightly outside the cone surface.
    pub surface_offset: f32,
    /// Fraction band of the formation height that elements occupy.
    pub min_height_frac: f32,
    pub max_height_frac: f32,
    /// Random angular jitter (radians) around the golden-angle spiral.
    pub angle_jitter: f32,
    pub height_jitter: f32,
    /// Scatter sphere for chaos positions.
    pub chaos_center: Vec3,
    pub chaos_radius: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            base_radius: 9.0,
            top_radius: 0.5,
            surface_offset: 1.2,
            min_height_frac: 0.12,
            max_height_frac: 0.82,
            angle_jitter: 0.35,
            height_jitter: 0.03,
            chaos_center: Vec3::new(0.0, 2.0, 0.0),
            chaos_radius: 25.0,
        }
    }
}

/// Snow field generation and kernel parameters.
#[derive(Clone, Debug)]
pub struct SnowConfig {
    pub count: usize,
    /// Horizontal extent (X and Z) of the spawn box.
    pub range: f32,
    /// Height of the periodic fall band.
    pub fall_height: f32,
    /// Upward shift of the spawn box relative to the fall band.
    pub spawn_lift: f32,
    pub influence_radius: f32,
    pub repulsion_strength: f32,
    /// Upward push as a fraction of the repulsion force.
    pub breeze: f32,
    /// Screen-space point size numerator (pixels at unit depth).
    pub point_scale: f32,
    pub twinkle_base: f32,
    pub twinkle_amplitude: f32,
    pub sprite_opacity: f32,
    pub sprite_falloff: f32,
}

impl Default for SnowConfig {
    fn default() -> Self {
        Self {
            count: 3000,
            range: 80.0,
            fall_height: 80.0,
            spawn_lift: 20.0,
            influence_radius: 8.0,
            repulsion_strength: 8.0,
            breeze: 0.5,
            point_scale: 300.0,
            twinkle_base: 0.6,
            twinkle_amplitude: 0.4,
            sprite_opacity: 0.8,
            sprite_falloff: 1.5,
        }
    }
}

/// How the attractor point follows the projected pointer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SmoothingMode {
    /// Fixed factor per frame, whatever the frame duration.
    PerFrame,
    /// Factor applies per reference frame at `reference_fps` and is
    /// rescaled for the actual frame delta.
    TimeCorrected { reference_fps: f32 },
}

#[derive(Clone, Debug)]
pub struct PointerConfig {
    /// Reference plane `normal · p + constant = 0`.
    pub plane_normal: Vec3,
    pub plane_constant: f32,
    pub smoothing: f32,
    pub smoothing_mode: SmoothingMode,
}

impl Default for PointerConfig {
    fn default() -> Self {
        Self {
            plane_normal: Vec3::Z,
            plane_constant: 0.0,
            smoothing: 0.1,
            smoothing_mode: SmoothingMode::TimeCorrected { reference_fps: 60.0 },
        }
    }
}

/// Everything a [`crate::scene::Scene`] needs at construction.
#[derive(Clone, Debug, Default)]
pub struct SceneConfig {
    pub formation: FormationConfig,
    pub layout: LayoutConfig,
    pub snow: SnowConfig,
    pub pointer: PointerConfig,
}

impl SceneConfig {
    /// Reject configurations that would produce degenerate frames.
    pub fn validate(&self) -> Result<()> {
        let f = &self.formation;
        positive("formation_height", f.formation_height)?;
        positive("stagger_rate", f.stagger_rate)?;
        non_negative("stagger_spread", f.stagger_spread)?;
        finite("formation_bottom", f.formation_bottom)?;
        finite("twist", f.twist)?;
        non_negative("bob_amplitude", f.bob_amplitude)?;
        finite("bob_speed", f.bob_speed)?;
        non_negative("sway_amplitude", f.sway_amplitude)?;
        finite("sway_speed", f.sway_speed)?;
        finite("spin_speed", f.spin_speed)?;
        non_negative("spin_wobble", f.spin_wobble)?;
        positive("memory_radius", f.memory_radius)?;
        finite("memory_height", f.memory_height)?;
        finite("memory_rotation_speed", f.memory_rotation_speed)?;
        positive("focus_distance", f.focus_distance)?;
        positive("memory_rate", f.memory_rate)?;
        positive("selection_rate", f.selection_rate)?;
        positive("base_scale", f.base_scale)?;
        positive("memory_scale", f.memory_scale)?;
        positive("focus_scale", f.focus_scale)?;

        let l = &self.layout;
        positive("base_radius", l.base_radius)?;
        non_negative("top_radius", l.top_radius)?;
        if l.top_radius > l.base_radius {
            return reject("top_radius", "must not exceed base_radius");
        }
        non_negative("surface_offset", l.surface_offset)?;
        non_negative("angle_jitter", l.angle_jitter)?;
        non_negative("height_jitter", l.height_jitter)?;
        if !(0.0..=1.0).contains(&l.min_height_frac)
            || !(0.0..=1.0).contains(&l.max_height_frac)
            || l.min_height_frac > l.max_height_frac
        {
            return reject("min_height_frac", "must satisfy 0 <= min <= max <= 1");
        }
        positive("chaos_radius", l.chaos_radius)?;
        if !l.chaos_center.is_finite() {
            return Err(FormationError::NonFinite("chaos_center"));
        }

        let s = &self.snow;
        positive("range", s.range)?;
        positive("fall_height", s.fall_height)?;
        if !(s.spawn_lift >= 0.0 && s.spawn_lift < s.fall_height) {
            return reject("spawn_lift", "must be in [0, fall_height)");
        }
        positive("influence_radius", s.influence_radius)?;
        non_negative("repulsion_strength", s.repulsion_strength)?;
        non_negative("breeze", s.breeze)?;
        positive("point_scale", s.point_scale)?;
        finite("twinkle_base", s.twinkle_base)?;
        finite("twinkle_amplitude", s.twinkle_amplitude)?;
        non_negative("sprite_opacity", s.sprite_opacity)?;
        non_negative("sprite_falloff", s.sprite_falloff)?;

        let p = &self.pointer;
        if !p.plane_normal.is_finite() || p.plane_normal.length_squared() < 1e-12 {
            return reject("plane_normal", "must be a finite non-zero vector");
        }
        finite("plane_constant", p.plane_constant)?;
        if !(p.smoothing > 0.0 && p.smoothing <= 1.0) {
            return reject("smoothing", "must be in (0, 1]");
        }
        if let SmoothingMode::TimeCorrected { reference_fps } = p.smoothing_mode {
            positive("reference_fps", reference_fps)?;
        }

        Ok(())
    }
}

fn reject(field: &'static str, reason: &'static str) -> Result<()> {
    log::warn!("rejecting config: {field} {reason}");
    Err(FormationError::InvalidConfig { field, reason })
}

fn finite(field: &'static str, value: f32) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(FormationError::NonFinite(field))
    }
}

fn positive(field: &'static str, value: f32) -> Result<()> {
    finite(field, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        reject(field, "must be positive")
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<()> {
    finite(field, value)?;
    if value >= 0.0 {
        Ok(())
    } else {
        reject(field, "must not be negative")
    }
}
