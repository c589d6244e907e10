//! Procedural layout for the photo elements.
//!
//! Each element gets a scattered "chaos" position and a "target" position on
//! the surface of a cone-shaped tree. Targets follow a golden-angle spiral
//! from the bottom of the cone to the top, so an element's vertical position
//! is also its place in the formation order.

use std::f32::consts::{PI, TAU};

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_hc::Hc128Rng;

use crate::config::{FormationConfig, LayoutConfig};

/// Golden angle in radians; consecutive elements never line up vertically.
const GOLDEN_ANGLE: f32 = PI * (3.0 - 2.236_068);

/// Static per-element layout data.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ElementLayout {
    pub chaos: Vec3,
    pub target: Vec3,
}

/// Cone radius of the tree silhouette at `height_frac` in [0,1].
pub fn cone_radius(layout: &LayoutConfig, height_frac: f32) -> f32 {
    let h = height_frac.clamp(0.0, 1.0);
    layout.base_radius + (layout.top_radius - layout.base_radius) * h
}

/// Generate chaos/target pairs for `count` elements.
///
/// The output is fully determined by `(count, seed)` and the configs.
pub fn generate_layout(
    count: usize,
    seed: u64,
    formation: &FormationConfig,
    layout: &LayoutConfig,
) -> Vec<ElementLayout> {
    let mut rng = Hc128Rng::seed_from_u64(seed);
    let band = layout.max_height_frac - layout.min_height_frac;
    let phase0 = rng.gen::<f32>() * TAU;

    let elements: Vec<ElementLayout> = (0..count)
        .map(|i| {
            let t = (i as f32 + 0.5) / count as f32;
            let jitter_h = (rng.gen::<f32>() - 0.5) * 2.0 * layout.height_jitter;
            let height_frac = (layout.min_height_frac + t * band + jitter_h)
                .clamp(layout.min_height_frac, layout.max_height_frac);

            let angle = phase0
                + i as f32 * GOLDEN_ANGLE
                + (rng.gen::<f32>() - 0.5) * 2.0 * layout.angle_jitter;
            let radius = cone_radius(layout, height_frac) + layout.surface_offset;
            let target = Vec3::new(
                angle.sin() * radius,
                formation.formation_bottom + height_frac * formation.formation_height,
                angle.cos() * radius,
            );

            ElementLayout {
                chaos: random_in_sphere(&mut rng, layout.chaos_center, layout.chaos_radius),
                target,
            }
        })
        .collect();

    log::debug!("generated layout for {} elements (seed {})", count, seed);
    elements
}

/// Uniformly distributed point inside a sphere.
fn random_in_sphere<R: Rng>(rng: &mut R, center: Vec3, radius: f32) -> Vec3 {
    let theta = rng.gen::<f32>() * TAU;
    let cos_phi = rng.gen::<f32>() * 2.0 - 1.0;
    let sin_phi = (1.0 - cos_phi * cos_phi).max(0.0).sqrt();
    let r = radius * rng.gen::<f32>().cbrt();
    center + Vec3::new(sin_phi * theta.cos(), cos_phi, sin_phi * theta.sin()) * r
}
