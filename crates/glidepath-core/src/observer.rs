//! Observability hook for drag tasks.

use tracing::{debug, info, warn};

use crate::task::{TaskId, TaskOutcome};
use crate::tracker::Signal;

/// Notable points in a task's life.
#[derive(Debug, Clone, PartialEq)]
pub enum DragEvent {
    Armed { task: TaskId, target: f64 },
    SignalLocked { task: TaskId, signal: Signal, tick: u32 },
    /// No signal locked in time; the handle became the reference and the
    /// target was corrected once.
    LowConfidence { task: TaskId, old_target: f64, new_target: f64 },
    SoftTerminal { task: TaskId, offset: Option<f64>, stuck: bool },
    HardTerminal { task: TaskId, offset: Option<f64> },
    LockExpired { task: TaskId },
    Aborted { task: TaskId, reason: String },
    Done { task: TaskId, outcome: TaskOutcome },
}

/// Receives [`DragEvent`]s. Callbacks run inline on the tick; keep them cheap.
pub trait DragObserver: Send + Sync {
    fn on_event(&self, event: &DragEvent);
}

/// Ignores everything.
pub struct NoopObserver;

impl DragObserver for NoopObserver {
    fn on_event(&self, _event: &DragEvent) {}
}

/// Logs every event through `tracing`.
pub struct TracingObserver;

impl DragObserver for TracingObserver {
    fn on_event(&self, event: &DragEvent) {
        match event {
            DragEvent::Armed { task, target } => info!(%task, target, "drag armed"),
            DragEvent::SignalLocked { task, signal, tick } => {
                debug!(%task, ?signal, tick, "displacement signal locked")
            }
            DragEvent::LowConfidence {
                task,
                old_target,
                new_target,
            } => warn!(
                %task,
                old_target, new_target, "no displacement signal, tracking the handle instead"
            ),
            DragEvent::SoftTerminal { task, offset, stuck } => {
                debug!(%task, ?offset, stuck, "soft terminal tick")
            }
            DragEvent::HardTerminal { task, offset } => {
                debug!(%task, ?offset, "hard terminal tick")
            }
            DragEvent::LockExpired { task } => warn!(%task, "slide lock expired, forcing release"),
            DragEvent::Aborted { task, reason } => warn!(%task, %reason, "drag aborted"),
            DragEvent::Done { task, outcome } => info!(%task, ?outcome, "drag done"),
        }
    }
}
