use glam::{Mat4, Quat, Vec2, Vec3};

use crate::camera::CameraTransform;
use crate::config::SceneConfig;
use crate::element::{AssetHandle, Element, Selection};
use crate::error::{FormationError, Result};
use crate::layout::generate_layout;
use crate::pointer::PointerProjector;
use crate::pose::{blend_pose, height_fraction, local_progress, BlendWeights, FrameContext, Pose};
use crate::quality::AdaptiveQuality;
use crate::snow::field::{SnowField, SnowParticle};
use crate::snow::kernel::{simulate, SnowUniforms, SnowVertex};
use crate::timeline::{CircleClock, FormationTimeline, Mode};

/// Frame orchestrator: owns the global progress, mode flags and every
/// piece of shared per-frame state, and drives the pose blender and snow
/// uniforms in a fixed order.
pub struct Scene {
    config: SceneConfig,
    elements: Vec<Element>,
    weights: Vec<BlendWeights>,
    poses: Vec<Pose>,
    selection: Selection,
    timeline: FormationTimeline,
    memory_mode: bool,
    circle: CircleClock,
    pointer: PointerProjector,
    snow: SnowField,
    snow_uniforms: SnowUniforms,
    snow_vertices: Vec<SnowVertex>,
    pub quality: AdaptiveQuality,
    time: f32,
}

impl Scene {
    /// Build a scene with `element_count` photo elements.
    ///
    /// The layout and the snow field are derived from `seed`; the snow
    /// field uses a seed stream distinct from the layout's.
    pub fn new(element_count: usize, seed: u64, config: SceneConfig) -> Result<Self> {
        config.validate()?;

        let elements: Vec<Element> = generate_layout(element_count, seed, &config.formation, &config.layout)
            .into_iter()
            .enumerate()
            .map(|(i, layout)| Element::new(i as u32, layout))
            .collect();

        let poses = elements
            .iter()
            .map(|e| Pose {
                position: e.chaos_position(),
                orientation: Quat::IDENTITY,
                scale: config.formation.base_scale,
            })
            .collect();

        let snow = SnowField::generate(&config.snow, seed ^ 0x5eed_5a0f_u64);
        let pointer = PointerProjector::new(&config.pointer);
        let snow_uniforms = SnowUniforms::new(&config.snow, pointer.attractor(), 0.0);
        let quality = AdaptiveQuality::new(snow.len());

        log::debug!(
            "scene created: {} elements, {} snow particles",
            elements.len(),
            snow.len()
        );

        Ok(Self {
            weights: vec![BlendWeights::default(); elements.len()],
            elements,
            poses,
            selection: Selection::default(),
            timeline: FormationTimeline::default(),
            memory_mode: false,
            circle: CircleClock::default(),
            pointer,
            snow,
            snow_uniforms,
            snow_vertices: Vec::new(),
            quality,
            time: 0.0,
            config,
        })
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn poses(&self) -> &[Pose] {
        &self.poses
    }

    pub fn weights(&self) -> &[BlendWeights] {
        &self.weights
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn progress(&self) -> f32 {
        self.timeline.progress()
    }

    pub fn mode(&self) -> Mode {
        self.timeline.mode()
    }

    pub fn set_progress(&mut self, progress: f32) {
        self.timeline.set_progress(progress);
    }

    pub fn begin_forming(&mut self, duration: f32) {
        self.timeline.begin_forming(duration);
    }

    pub fn scatter(&mut self, duration: f32) {
        self.timeline.scatter(duration);
    }

    pub fn memory_mode(&self) -> bool {
        self.memory_mode
    }

    pub fn set_memory_mode(&mut self, active: bool) {
        self.memory_mode = active;
    }

    pub fn circle_phase(&self) -> f32 {
        self.circle.phase()
    }

    /// Index of the focused element, if any.
    pub fn selected(&self) -> Option<usize> {
        self.selection.current()
    }

    /// Toggle selection of `index`; returns the new selection.
    pub fn select(&mut self, index: usize) -> Result<Option<usize>> {
        self.check_index(index)?;
        let current = self.selection.toggle(index);
        log::debug!("selection changed to {:?}", current);
        Ok(current)
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn attach_asset(&mut self, index: usize, asset: Option<AssetHandle>) -> Result<()> {
        self.check_index(index)?;
        self.elements[index].asset = asset;
        Ok(())
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.elements.len() {
            Ok(())
        } else {
            Err(FormationError::IndexOutOfRange {
                index,
                count: self.elements.len(),
            })
        }
    }

    /// Staggered (un-eased) local progress of element `index`.
    pub fn local_progress(&self, index: usize) -> Option<f32> {
        let cfg = &self.config.formation;
        self.elements.get(index).map(|e| {
            let h = height_fraction(e.target_position().y, cfg);
            local_progress(self.timeline.progress(), h, cfg)
        })
    }

    pub fn attractor(&self) -> Vec3 {
        self.pointer.attractor()
    }

    pub fn snow_particles(&self) -> &[SnowParticle] {
        &self.snow.particles
    }

    pub fn snow_uniforms(&self) -> &SnowUniforms {
        &self.snow_uniforms
    }

    /// Advance one frame.
    ///
    /// Order: timeline, pointer projector, circle clock, element poses,
    /// snow uniforms. `pointer` is `None` when no pointer is over the
    /// scene. Never fails; an element whose pose comes out non-finite keeps
    /// its previous pose.
    pub fn step(&mut self, dt: f32, camera: &CameraTransform, pointer: Option<Vec2>) {
        let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };
        self.time += dt;
        self.timeline.advance(dt);

        if let Some(ndc) = pointer {
            self.pointer.update(camera, ndc, dt);
        }

        let cfg = &self.config.formation;
        self.circle.advance(dt, cfg.memory_rotation_speed, self.memory_mode);

        let ctx = FrameContext {
            progress: self.timeline.progress(),
            time: self.time,
            circle_phase: self.circle.phase(),
            element_count: self.elements.len(),
            camera,
        };

        for (i, element) in self.elements.iter().enumerate() {
            let selected = self.selection.is_selected(i);
            let weights = self.weights[i].advanced(self.memory_mode, selected, dt, cfg);
            self.weights[i] = weights;

            let pose = blend_pose(element, i, &weights, &ctx, cfg);
            if pose.is_finite() {
                self.poses[i] = pose;
            } else {
                log::trace!("element {} produced a non-finite pose; keeping previous", i);
            }
        }

        self.snow_uniforms = SnowUniforms::new(&self.config.snow, self.pointer.attractor(), self.time);
    }

    /// Run the CPU snow kernel with the current uniforms.
    ///
    /// Simulates the first `quality.particle_count()` particles.
    pub fn simulate_snow(&mut self, view: &Mat4) -> &[SnowVertex] {
        let n = self.quality.particle_count().min(self.snow.len());
        simulate(&self.snow.particles[..n], &self.snow_uniforms, view, &mut self.snow_vertices);
        &self.snow_vertices
    }

    /// Feed the measured CPU snow kernel time back into adaptive quality.
    pub fn record_snow_time(&mut self, kernel_ms: f32) {
        self.quality.update(kernel_ms);
    }
}
