//! Stall and overshoot classification.

use serde::{Deserialize, Serialize};

/// How the handle behaved on the latest tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Motion {
    Progressing,
    /// No change for more than the stuck limit; treated as arrived.
    Stuck,
    /// Within tolerance of the target.
    AtTarget,
    OverTarget,
}

impl Motion {
    /// Whether this tick takes the terminal path.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Motion::Stuck | Motion::AtTarget)
    }
}

/// Watches successive offsets for stalls and arrival.
#[derive(Debug, Clone)]
pub struct StuckDetector {
    limit: u32,
    tolerance: f64,
    previous: Option<f64>,
    stuck_count: u32,
    changed: bool,
}

impl StuckDetector {
    pub fn new(limit: u32, tolerance: f64) -> Self {
        Self {
            limit,
            tolerance,
            previous: None,
            stuck_count: 0,
            changed: false,
        }
    }

    pub fn stuck_count(&self) -> u32 {
        self.stuck_count
    }

    pub fn previous(&self) -> Option<f64> {
        self.previous
    }

    /// Whether the latest observation differed from the one before it.
    pub fn changed(&self) -> bool {
        self.changed
    }

    /// Record the offset seen this tick and classify it against `target`.
    pub fn observe(&mut self, offset: Option<f64>, target: f64) -> Motion {
        self.changed = offset.is_some() && offset != self.previous;

        // A zero reading is the resting position, never a stall.
        if offset.is_some_and(|v| v != 0.0) {
            if self.changed {
                self.stuck_count = 0;
            } else {
                self.stuck_count += 1;
            }
        }
        self.previous = offset;

        let Some(value) = offset else {
            return Motion::Progressing;
        };

        if self.stuck_count > self.limit {
            Motion::Stuck
        } else if (value - target).abs() <= self.tolerance {
            Motion::AtTarget
        } else if value > target {
            Motion::OverTarget
        } else {
            Motion::Progressing
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progressing() {
        let mut detector = StuckDetector::new(5, 1.0);
        assert_eq!(detector.observe(None, 80.0), Motion::Progressing);
        assert_eq!(detector.observe(Some(10.0), 80.0), Motion::Progressing);
        assert!(detector.changed());
        assert_eq!(detector.observe(Some(20.0), 80.0), Motion::Progressing);
        assert_eq!(detector.stuck_count(), 0);
    }

    #[test]
    fn test_at_target_within_tolerance() {
        let mut detector = StuckDetector::new(5, 1.0);
        assert_eq!(detector.observe(Some(79.0), 80.0), Motion::AtTarget);
        assert_eq!(detector.observe(Some(81.0), 80.0), Motion::AtTarget);
        assert!(Motion::AtTarget.is_terminal());
    }

    #[test]
    fn test_over_target() {
        let mut detector = StuckDetector::new(5, 1.0);
        assert_eq!(detector.observe(Some(84.0), 80.0), Motion::OverTarget);
        assert!(!Motion::OverTarget.is_terminal());
    }

    #[test]
    fn test_stuck_after_limit() {
        let mut detector = StuckDetector::new(5, 1.0);
        assert_eq!(detector.observe(Some(40.0), 80.0), Motion::Progressing);
        for expected in 1..=5 {
            assert_eq!(detector.observe(Some(40.0), 80.0), Motion::Progressing);
            assert_eq!(detector.stuck_count(), expected);
            assert!(!detector.changed());
        }
        assert_eq!(detector.observe(Some(40.0), 80.0), Motion::Stuck);
        assert_eq!(detector.stuck_count(), 6);
        assert!(Motion::Stuck.is_terminal());
    }

    #[test]
    fn test_change_resets_count() {
        let mut detector = StuckDetector::new(5, 1.0);
        detector.observe(Some(40.0), 80.0);
        detector.observe(Some(40.0), 80.0);
        detector.observe(Some(40.0), 80.0);
        assert_eq!(detector.stuck_count(), 2);
        detector.observe(Some(41.0), 80.0);
        assert_eq!(detector.stuck_count(), 0);
    }

    #[test]
    fn test_zero_is_never_stuck() {
        let mut detector = StuckDetector::new(5, 1.0);
        for _ in 0..20 {
            assert_eq!(detector.observe(Some(0.0), 80.0), Motion::Progressing);
        }
        assert_eq!(detector.stuck_count(), 0);
    }
}
