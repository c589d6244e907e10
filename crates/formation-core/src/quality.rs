const EMA_ALPHA: f32 = 0.3;
const RESTORE_HEADROOM: f32 = 0.6;
const RESTORE_AFTER: u32 = 30;

/// Adaptive snow density for the CPU snow kernel.
///
/// Used by hosts that run the snow kernel on the CPU instead of the GPU:
/// the measured kernel time decides how many of the field's particles are
/// simulated next frame.
pub struct AdaptiveQuality {
    /// Target kernel budget in milliseconds.
    pub budget_ms: f32,
    /// Never simulate fewer particles than this.
    pub min_particles: usize,
    /// Full-quality particle count.
    pub max_particles: usize,
    /// Fraction of `max_particles` removed or restored per adjustment.
    pub step_fraction: f32,
    /// Off by default; while off every particle is simulated.
    pub enabled: bool,
    current: usize,
    /// Exponential moving average of kernel frame time.
    ema_ms: f32,
    /// Frames in a row spent under the restore threshold.
    frames_under_budget: u32,
}

impl AdaptiveQuality {
    pub fn new(max_particles: usize) -> Self {
        Self {
            budget_ms: 4.0,
            min_particles: max_particles / 8,
            max_particles,
            step_fraction: 0.125,
            enabled: false,
            current: max_particles,
            ema_ms: 0.0,
            frames_under_budget: 0,
        }
    }

    /// Number of particles to simulate this frame.
    pub fn particle_count(&self) -> usize {
        if self.enabled {
            self.current
        } else {
            self.max_particles
        }
    }

    fn step(&self) -> usize {
        ((self.max_particles as f32 * self.step_fraction) as usize).max(1)
    }

    /// Feed the measured CPU snow kernel time (ms) of the last frame.
    ///
    /// Above budget the density drops by one step per frame down to
    /// `min_particles`; after `RESTORE_AFTER` consecutive frames below
    /// `RESTORE_HEADROOM * budget_ms` it grows back by one step.
    pub fn update(&mut self, kernel_ms: f32) {
        if !self.enabled || !kernel_ms.is_finite() {
            return;
        }
        self.ema_ms += (kernel_ms - self.ema_ms) * EMA_ALPHA;

        let next = if self.ema_ms > self.budget_ms {
            self.frames_under_budget = 0;
            self.current.saturating_sub(self.step()).max(self.min_particles)
        } else if self.ema_ms < self.budget_ms * RESTORE_HEADROOM {
            self.frames_under_budget += 1;
            if self.frames_under_budget <= RESTORE_AFTER {
                return;
            }
            self.frames_under_budget = 0;
            (self.current + self.step()).min(self.max_particles)
        } else {
            return;
        };

        if next != self.current {
            log::debug!("snow density {} -> {} particles (ema {:.2} ms)", self.current, next, self.ema_ms);
            self.current = next;
        }
    }
}
