use std::f32::consts::TAU;

/// Formation state derived from the global progress.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Chaos,
    Forming,
    Formed,
}

/// Owner of the global progress scalar.
///
/// Progress only moves when a linear animation is running; explicit sets
/// cancel it.
#[derive(Clone, Debug, Default)]
pub struct FormationTimeline {
    progress: f32,
    /// Signed progress change per second; zero when idle.
    velocity: f32,
    goal: f32,
}

impl FormationTimeline {
    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn mode(&self) -> Mode {
        if self.progress <= 0.0 {
            Mode::Chaos
        } else if self.progress >= 1.0 {
            Mode::Formed
        } else {
            Mode::Forming
        }
    }

    pub fn is_animating(&self) -> bool {
        self.velocity != 0.0
    }

    /// Jump to `progress` (clamped to [0,1]) and stop animating.
    pub fn set_progress(&mut self, progress: f32) {
        self.progress = if progress.is_nan() { 0.0 } else { progress.clamp(0.0, 1.0) };
        self.velocity = 0.0;
        self.goal = self.progress;
    }

    /// Animate progress linearly from 0 to 1 over `duration` seconds.
    pub fn begin_forming(&mut self, duration: f32) {
        self.animate_to(1.0, duration);
    }

    /// Animate progress linearly back to 0 over `duration` seconds.
    pub fn scatter(&mut self, duration: f32) {
        self.animate_to(0.0, duration);
    }

    fn animate_to(&mut self, goal: f32, duration: f32) {
        if !(duration > 0.0) || !duration.is_finite() {
            self.set_progress(goal);
            return;
        }
        self.goal = goal;
        self.velocity = (goal - self.progress).signum() / duration;
        if self.progress == goal {
            self.velocity = 0.0;
        }
    }

    pub fn advance(&mut self, dt: f32) {
        if self.velocity == 0.0 || !(dt > 0.0) {
            return;
        }
        let next = self.progress + self.velocity * dt;
        let done = if self.velocity > 0.0 { next >= self.goal } else { next <= self.goal };
        if done {
            self.progress = self.goal;
            self.velocity = 0.0;
        } else {
            self.progress = next;
        }
    }
}

/// Orbit phase of the memory circle.
///
/// Advanced once per frame by the scene and handed to every element, so
/// all elements of a frame see the same phase.
#[derive(Clone, Copy, Debug, Default)]
pub struct CircleClock {
    phase: f32,
}

impl CircleClock {
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Advance by `speed * dt` while `active`. The phase is kept in
    /// [0, TAU) so it never loses precision in long sessions.
    pub fn advance(&mut self, dt: f32, speed: f32, active: bool) {
        if active && dt > 0.0 {
            self.phase = (self.phase + speed * dt).rem_euclid(TAU);
        }
    }
}
