//! # Glidepath Core
//!
//! Closed-loop drag-gesture synthesis for slider ("drag to verify") challenges.
//!
//! ## Architecture
//!
//! ```text
//!  DragController ── one control loop per SlideTask
//!    │
//!    ├── SlideLock            session-wide mutual exclusion with a TTL
//!    ├── DisplacementTracker  "how far has the handle moved" (six probes)
//!    ├── StuckDetector        progressing / stuck / at-target / over-target
//!    ├── SpeedProfile         (step length, delay) per tick
//!    └── GestureEmitter       pointer-down → pointer-move* → pointer-up
//!                   │
//!                   ▼
//!              SliderPage (trait) ── implemented by a browser backend
//! ```
//!
//! The engine never resolves elements or talks to a recognition service
//! itself: a caller supplies a [`SliderTarget`] and a target distance, and
//! the controller drives the gesture through a [`SliderPage`].

mod config;
mod controller;
mod error;
mod gesture;
mod lock;
mod observer;
mod page;
mod profile;
mod store;
mod stuck;
pub mod style;
mod task;
mod tracker;

#[cfg(test)]
mod test_support;

pub use config::{DragConfig, PhaseConfig, ProfileConfig};
pub use controller::DragController;
pub use error::DragError;
pub use gesture::GestureEmitter;
pub use lock::{LockStatus, SlideLock};
pub use observer::{DragEvent, DragObserver, NoopObserver, TracingObserver};
pub use page::{ElementRef, Notice, PointerEvent, PointerKind, Rect, SliderPage, StyleSnapshot};
pub use profile::{SpeedProfile, Step};
pub use store::ExpiringStore;
pub use stuck::{Motion, StuckDetector};
pub use task::{
    DragRequest, SlideTask, SliderTarget, TaskId, TaskOutcome, TaskPhase, TaskReport,
};
pub use tracker::{DisplacementTracker, ReferenceMode, Signal, SignalReadings};
