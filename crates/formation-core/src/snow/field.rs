use std::f32::consts::TAU;

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_hc::Hc128Rng;

use crate::config::SnowConfig;

/// Immutable data of one snow particle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SnowParticle {
    pub base_position: Vec3,
    /// Drift factor in [0,1]; drives both drift frequency and amplitude.
    pub drift: f32,
    /// Fall speed factor in [0.5,1].
    pub fall_speed: f32,
    /// Phase offset in [0, TAU) for drift and twinkle.
    pub phase: f32,
    /// Base point size in [1,3].
    pub size: f32,
}

/// All particles of the field, fixed at creation.
pub struct SnowField {
    pub particles: Vec<SnowParticle>,
}

impl SnowField {
    pub fn generate(config: &SnowConfig, seed: u64) -> Self {
        let mut rng = Hc128Rng::seed_from_u64(seed);
        let particles = (0..config.count)
            .map(|_| {
                let base_position = Vec3::new(
                    (rng.gen::<f32>() - 0.5) * config.range,
                    (rng.gen::<f32>() - 0.5) * config.fall_height + config.spawn_lift,
                    (rng.gen::<f32>() - 0.5) * config.range,
                );
                SnowParticle {
                    base_position,
                    drift: rng.gen::<f32>(),
                    fall_speed: rng.gen::<f32>() * 0.5 + 0.5,
                    phase: rng.gen::<f32>() * TAU,
                    size: rng.gen::<f32>() * 2.0 + 1.0,
                }
            })
            .collect();
        Self { particles }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
}

/// Vertical band `(min, max)` every undisturbed particle stays inside.
///
/// Particles spawn `spawn_lift` above the fall band and the fall wraps
/// only at the bottom, so the band is `fall_height + spawn_lift` tall
/// rather than `fall_height`: `[-fall_height/2, fall_height/2 + spawn_lift]`.
pub fn fall_band(config: &SnowConfig) -> (f32, f32) {
    let half = config.fall_height * 0.5;
    (-half, half + config.spawn_lift)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ranges() {
        let config = SnowConfig::default();
        let field = SnowField::generate(&config, 11);
        assert_eq!(field.len(), config.count);
        let (lo, hi) = fall_band(&config);
        for p in &field.particles {
            assert!((0.5..=1.0).contains(&p.fall_speed));
            assert!((0.0..=1.0).contains(&p.drift));
            assert!((1.0..=3.0).contains(&p.size));
            assert!(p.base_position.y >= lo && p.base_position.y <= hi);
            assert!(p.base_position.x.abs() <= config.range * 0.5);
        }
    }
}
