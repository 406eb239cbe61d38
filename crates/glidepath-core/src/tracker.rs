//! Displacement tracking.
//!
//! Sites animate slider handles with one of several CSS mechanisms. The
//! tracker reads six candidate signals every tick and commits to the first one
//! that moves; after that only the committed signal is trusted, even if others
//! change as a side effect of layout.

use serde::{Deserialize, Serialize};

use crate::error::DragError;
use crate::page::{ElementRef, SliderPage, StyleSnapshot};

/// A displacement signal, in lock priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    ElementLeft,
    ParentLeft,
    ElementTransform,
    ParentTransform,
    ElementMargin,
    ParentMargin,
}

impl Signal {
    pub const PRIORITY: [Signal; 6] = [
        Signal::ElementLeft,
        Signal::ParentLeft,
        Signal::ElementTransform,
        Signal::ParentTransform,
        Signal::ElementMargin,
        Signal::ParentMargin,
    ];

    fn read(self, readings: &SignalReadings) -> f64 {
        match self {
            Signal::ElementLeft => readings.element_left,
            Signal::ParentLeft => readings.parent_left,
            Signal::ElementTransform => readings.element_transform,
            Signal::ParentTransform => readings.parent_transform,
            Signal::ElementMargin => readings.element_margin,
            Signal::ParentMargin => readings.parent_margin,
        }
    }
}

/// Which signal the tracker trusts. Leaves `Unset` at most once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceMode {
    #[default]
    Unset,
    Locked(Signal),
}

impl ReferenceMode {
    pub fn signal(&self) -> Option<Signal> {
        match self {
            ReferenceMode::Unset => None,
            ReferenceMode::Locked(signal) => Some(*signal),
        }
    }
}

/// One tick's raw values for all six signals.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SignalReadings {
    pub element_left: f64,
    pub parent_left: f64,
    pub element_transform: f64,
    pub parent_transform: f64,
    pub element_margin: f64,
    pub parent_margin: f64,
}

impl SignalReadings {
    pub fn from_styles(element: &StyleSnapshot, parent: Option<&StyleSnapshot>) -> Self {
        Self {
            element_left: element.left_px(),
            parent_left: parent.map(StyleSnapshot::left_px).unwrap_or(0.0),
            element_transform: element.transform_x(),
            parent_transform: parent.map(StyleSnapshot::transform_x).unwrap_or(0.0),
            element_margin: element.margin_left_px(),
            parent_margin: parent.map(StyleSnapshot::margin_left_px).unwrap_or(0.0),
        }
    }

    /// Read all six signals for `element` from the page.
    pub async fn capture(page: &dyn SliderPage, element: &ElementRef) -> Result<Self, DragError> {
        let style = page.style(element).await?;
        let parent = page.parent_style(element).await?;
        Ok(Self::from_styles(&style, parent.as_ref()))
    }

    pub fn get(&self, signal: Signal) -> f64 {
        signal.read(self)
    }
}

/// Sticky first-signal-that-changes tracker.
#[derive(Debug, Clone)]
pub struct DisplacementTracker {
    baseline: SignalReadings,
    mode: ReferenceMode,
    container_offset: f64,
}

impl DisplacementTracker {
    /// Create a tracker from the tick-0 readings.
    ///
    /// `container_offset` is the screen-space offset of the tracked element
    /// inside its horizontally shifted container; it is added to parent-margin
    /// readings.
    pub fn new(baseline: SignalReadings, container_offset: f64) -> Self {
        Self {
            baseline,
            mode: ReferenceMode::Unset,
            container_offset,
        }
    }

    pub fn mode(&self) -> ReferenceMode {
        self.mode
    }

    pub fn is_locked(&self) -> bool {
        self.mode != ReferenceMode::Unset
    }

    /// Feed one tick of readings; returns the current offset once locked.
    pub fn observe(&mut self, readings: &SignalReadings) -> Option<f64> {
        if self.mode == ReferenceMode::Unset {
            self.mode = Signal::PRIORITY
                .into_iter()
                .find(|signal| self.moved(*signal, readings))
                .map(ReferenceMode::Locked)
                .unwrap_or(ReferenceMode::Unset);
        }

        let signal = self.mode.signal()?;
        let mut offset = readings.get(signal);
        if signal == Signal::ParentMargin && self.container_offset != 0.0 {
            offset += self.container_offset;
        }
        Some(offset)
    }

    fn moved(&self, signal: Signal, readings: &SignalReadings) -> bool {
        let base = self.baseline.get(signal);
        // Transform sliders may already sit at a non-zero offset.
        let pre_offset = signal == Signal::ElementTransform && base != 0.0;
        readings.get(signal) != base || pre_offset
    }
}

#[cfg(test)]
#[path = "tracker_tests.rs"]
mod tests;
