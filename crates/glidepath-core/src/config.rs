//! Drag engine tuning.

use std::ops::RangeInclusive;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Engine configuration. Defaults reproduce the stock behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DragConfig {
    /// Extra travel added to the recognised distance, taken back on the soft terminal tick.
    #[serde(default = "default_overshoot_px")]
    pub overshoot_px: f64,

    /// Arrival tolerance around the working target.
    #[serde(default = "default_tolerance_px")]
    pub tolerance_px: f64,

    /// Consecutive unchanged readings after which the task stops trying.
    #[serde(default = "default_stuck_limit")]
    pub stuck_limit: u32,

    /// Ticks without a locked signal before falling back to the handle.
    #[serde(default = "default_fallback_after_ticks")]
    pub fallback_after_ticks: u32,

    /// Tracked element narrower than `handle width * factor` counts as narrow.
    #[serde(default = "default_narrow_handle_factor")]
    pub narrow_handle_factor: f64,

    /// Distance removed by the fallback when the tracked element is wide.
    #[serde(default = "default_fallback_shrink_px")]
    pub fallback_shrink_px: f64,

    /// Slide lock time-to-live.
    #[serde(default = "default_lock_ttl_ms")]
    pub lock_ttl_ms: u64,

    /// Delay between the final pointer-up and releasing the slide lock.
    #[serde(default = "default_lock_release_delay_ms")]
    pub lock_release_delay_ms: u64,

    /// Upper bound of the random delay before pointer-up.
    #[serde(default = "default_release_latency_max_ms")]
    pub release_latency_max_ms: u64,

    /// Length of the first pointer-move.
    #[serde(default = "default_opening_step_px")]
    pub opening_step_px: f64,

    /// Seed for reproducible gestures. Entropy when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    #[serde(default)]
    pub profile: ProfileConfig,
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            overshoot_px: default_overshoot_px(),
            tolerance_px: default_tolerance_px(),
            stuck_limit: default_stuck_limit(),
            fallback_after_ticks: default_fallback_after_ticks(),
            narrow_handle_factor: default_narrow_handle_factor(),
            fallback_shrink_px: default_fallback_shrink_px(),
            lock_ttl_ms: default_lock_ttl_ms(),
            lock_release_delay_ms: default_lock_release_delay_ms(),
            release_latency_max_ms: default_release_latency_max_ms(),
            opening_step_px: default_opening_step_px(),
            seed: None,
            profile: ProfileConfig::default(),
        }
    }
}

impl DragConfig {
    pub fn lock_ttl(&self) -> Duration {
        Duration::from_millis(self.lock_ttl_ms)
    }

    pub fn lock_release_delay(&self) -> Duration {
        Duration::from_millis(self.lock_release_delay_ms)
    }
}

fn default_overshoot_px() -> f64 {
    5.0
}

fn default_tolerance_px() -> f64 {
    1.0
}

fn default_stuck_limit() -> u32 {
    5
}

fn default_fallback_after_ticks() -> u32 {
    20
}

fn default_narrow_handle_factor() -> f64 {
    2.0
}

fn default_fallback_shrink_px() -> f64 {
    2.5
}

fn default_lock_ttl_ms() -> u64 {
    3000
}

fn default_lock_release_delay_ms() -> u64 {
    1000
}

fn default_release_latency_max_ms() -> u64 {
    500
}

fn default_opening_step_px() -> f64 {
    20.0
}

/// One distance phase of the speed profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseConfig {
    /// Base step length; up to one extra pixel of jitter is added.
    pub step_px: f64,
    /// Inclusive delay range in milliseconds.
    pub min_delay_ms: f64,
    pub max_delay_ms: f64,
}

impl PhaseConfig {
    pub fn new(step_px: f64, min_delay_ms: f64, max_delay_ms: f64) -> Self {
        Self {
            step_px,
            min_delay_ms,
            max_delay_ms,
        }
    }

    pub(crate) fn delay_range(&self) -> RangeInclusive<f64> {
        self.min_delay_ms..=self.max_delay_ms.max(self.min_delay_ms)
    }
}

/// Speed profile tuning, one phase per bucket of remaining distance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileConfig {
    /// Residue above one half of the distance.
    #[serde(default = "default_fast")]
    pub fast: PhaseConfig,

    /// Residue between one quarter and one half.
    #[serde(default = "default_medium")]
    pub medium: PhaseConfig,

    /// Residue between one tenth and one quarter.
    #[serde(default = "default_slow")]
    pub slow: PhaseConfig,

    /// Residue below one tenth.
    #[serde(default = "default_fine")]
    pub fine: PhaseConfig,

    /// Distances up to this length get `tiny_delay_factor`.
    #[serde(default = "default_tiny_distance_px")]
    pub tiny_distance_px: f64,

    #[serde(default = "default_tiny_delay_factor")]
    pub tiny_delay_factor: f64,

    /// Distances up to this length get `short_delay_factor`.
    #[serde(default = "default_short_distance_px")]
    pub short_distance_px: f64,

    #[serde(default = "default_short_delay_factor")]
    pub short_delay_factor: f64,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            fast: default_fast(),
            medium: default_medium(),
            slow: default_slow(),
            fine: default_fine(),
            tiny_distance_px: default_tiny_distance_px(),
            tiny_delay_factor: default_tiny_delay_factor(),
            short_distance_px: default_short_distance_px(),
            short_delay_factor: default_short_delay_factor(),
        }
    }
}

fn default_fast() -> PhaseConfig {
    PhaseConfig::new(5.0, 0.2, 0.5)
}

fn default_medium() -> PhaseConfig {
    PhaseConfig::new(3.0, 8.0, 12.0)
}

fn default_slow() -> PhaseConfig {
    PhaseConfig::new(2.0, 8.0, 12.0)
}

fn default_fine() -> PhaseConfig {
    PhaseConfig::new(0.0, 18.0, 22.0)
}

fn default_tiny_distance_px() -> f64 {
    10.0
}

fn default_tiny_delay_factor() -> f64 {
    5.0
}

fn default_short_distance_px() -> f64 {
    13.0
}

fn default_short_delay_factor() -> f64 {
    2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DragConfig::default();
        assert_eq!(config.overshoot_px, 5.0);
        assert_eq!(config.stuck_limit, 5);
        assert_eq!(config.lock_ttl(), Duration::from_secs(3));
        assert_eq!(config.lock_release_delay(), Duration::from_secs(1));
        assert_eq!(config.profile.fine.step_px, 0.0);
    }

    #[test]
    fn test_partial_deserialize_keeps_defaults() {
        let config: DragConfig =
            serde_json::from_str(r#"{"overshoot_px": 3.0, "seed": 7}"#).unwrap();
        assert_eq!(config.overshoot_px, 3.0);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.fallback_after_ticks, 20);
        assert_eq!(config.profile.medium, PhaseConfig::new(3.0, 8.0, 12.0));
    }

    #[test]
    fn test_inverted_delay_range_collapses() {
        let phase = PhaseConfig::new(1.0, 10.0, 4.0);
        assert_eq!(phase.delay_range(), 10.0..=10.0);
    }
}
