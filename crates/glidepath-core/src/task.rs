//! Drag task data model.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::page::{ElementRef, Notice};
use crate::tracker::ReferenceMode;

/// Identity of one drag task; owner of the slide lock while it runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(Uuid);

impl TaskId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Elements of one slider challenge, already resolved and visible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SliderTarget {
    /// Background image; absent for single-handle sliders.
    pub big_image: Option<ElementRef>,
    /// Element whose displacement is tracked.
    pub small_image: ElementRef,
    /// Element the pointer events go to.
    pub handle: ElementRef,
}

impl SliderTarget {
    /// Puzzle slider: a piece image moving over a background image.
    pub fn puzzle(big_image: ElementRef, small_image: ElementRef, handle: ElementRef) -> Self {
        Self {
            big_image: Some(big_image),
            small_image,
            handle,
        }
    }

    /// Single-handle slider: the handle is both tracked and dragged.
    pub fn single(handle: ElementRef) -> Self {
        Self {
            big_image: None,
            small_image: handle.clone(),
            handle,
        }
    }
}

/// Everything the controller needs to start a task.
#[derive(Debug, Clone)]
pub struct DragRequest {
    pub target: SliderTarget,
    /// Recognised travel in pixels.
    pub distance: f64,
    /// Shown once the drag completes normally.
    pub completion_notice: Option<Notice>,
}

impl DragRequest {
    pub fn new(target: SliderTarget, distance: f64) -> Self {
        Self {
            target,
            distance,
            completion_notice: None,
        }
    }

    pub fn with_completion_notice(mut self, notice: Notice) -> Self {
        self.completion_notice = Some(notice);
        self
    }
}

/// Controller state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPhase {
    Idle,
    /// Lock acquired, pointer-down issued.
    Armed,
    Stepping,
    /// Soft terminal tick seen; waiting for the second.
    Settling,
    /// Pointer-up issued; lock release pending.
    Released,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskOutcome {
    /// Arrived within tolerance.
    Settled,
    /// Stopped moving before arriving; released where it stood.
    Stalled,
    /// The slide lock expired and the fail-safe released the gesture.
    TimedOut,
    /// An element disappeared mid-drag; no pointer-up was sent.
    Aborted,
}

/// One in-flight gesture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlideTask {
    pub id: TaskId,
    pub phase: TaskPhase,
    /// Working target, including any pending overshoot.
    pub target_distance: f64,
    pub reference_mode: ReferenceMode,
    pub current_offset: Option<f64>,
    pub previous_offset: Option<f64>,
    pub tick_count: u32,
    pub stuck_count: u32,
    pub accumulated_step_x: f64,
    pub accumulated_step_y: f64,
    /// Set by the soft terminal tick.
    pub finished: bool,
    /// The handle replaced the tracked element after no signal locked.
    pub low_confidence: bool,
}

impl SlideTask {
    pub fn new(target_distance: f64) -> Self {
        Self {
            id: TaskId::new(),
            phase: TaskPhase::Idle,
            target_distance,
            reference_mode: ReferenceMode::Unset,
            current_offset: None,
            previous_offset: None,
            tick_count: 0,
            stuck_count: 0,
            accumulated_step_x: 0.0,
            accumulated_step_y: 0.0,
            finished: false,
            low_confidence: false,
        }
    }

    /// Signed distance still to travel.
    pub fn residue(&self) -> f64 {
        self.target_distance - self.current_offset.unwrap_or(0.0)
    }
}

/// Summary of a finished task.
#[derive(Debug, Clone)]
pub struct TaskReport {
    pub task: SlideTask,
    pub outcome: TaskOutcome,
    pub soft_terminals: u32,
    pub hard_terminals: u32,
    pub pointer_moves: u64,
    pub elapsed: Duration,
}
