//! Speed profile: step length and tick delay shaped like a human deceleration.

use std::time::Duration;

use rand::Rng;

use crate::config::{PhaseConfig, ProfileConfig};

/// The next pointer-move to emit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    /// Signed step along the drag axis; negative moves back.
    pub length: f64,
    /// Wait before the next tick.
    pub delay: Duration,
}

/// Maps remaining distance to a randomised `(step, delay)` pair.
#[derive(Debug, Clone, Default)]
pub struct SpeedProfile {
    config: ProfileConfig,
}

impl SpeedProfile {
    pub fn new(config: ProfileConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProfileConfig {
        &self.config
    }

    /// Phase for a signed `residue` out of a total `distance`.
    pub fn phase(&self, residue: f64, distance: f64) -> &PhaseConfig {
        if residue > distance / 2.0 {
            &self.config.fast
        } else if residue > distance / 4.0 {
            &self.config.medium
        } else if residue > distance / 10.0 {
            &self.config.slow
        } else {
            &self.config.fine
        }
    }

    /// Next step for `residue = distance - offset`.
    pub fn next<R: Rng + ?Sized>(&self, residue: f64, distance: f64, rng: &mut R) -> Step {
        let phase = self.phase(residue, distance);
        self.shape(phase.step_px, phase, residue, distance, rng)
    }

    /// Like [`SpeedProfile::next`] but with an explicit base step length.
    pub fn next_with_base<R: Rng + ?Sized>(
        &self,
        base_px: f64,
        residue: f64,
        distance: f64,
        rng: &mut R,
    ) -> Step {
        let phase = self.phase(residue, distance);
        self.shape(base_px, phase, residue, distance, rng)
    }

    fn shape<R: Rng + ?Sized>(
        &self,
        base_px: f64,
        phase: &PhaseConfig,
        residue: f64,
        distance: f64,
        rng: &mut R,
    ) -> Step {
        let mut length = base_px + rng.gen_range(0.0..1.0);
        // Past the target: walk back instead of stopping dead.
        if residue <= 0.0 {
            length = -length;
        }

        let delay_ms = rng.gen_range(phase.delay_range()) * self.delay_factor(distance);

        Step {
            length,
            delay: Duration::from_secs_f64(delay_ms.max(0.0) / 1000.0),
        }
    }

    /// Delay multiplier for short drags.
    ///
    /// The thresholds compare against the total distance in pixels, so only
    /// drags of a dozen pixels or so are slowed. A 100px drag runs at 1x.
    fn delay_factor(&self, distance: f64) -> f64 {
        if distance <= self.config.tiny_distance_px {
            self.config.tiny_delay_factor
        } else if distance <= self.config.short_distance_px {
            self.config.short_delay_factor
        } else {
            1.0
        }
    }
}

#[cfg(test)]
#[path = "profile_tests.rs"]
mod tests;
