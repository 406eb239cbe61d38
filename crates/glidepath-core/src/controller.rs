//! Drag controller: one closed control loop per slider task.
//!
//! ```text
//! Idle ─► Armed ─► Stepping ─► Settling ─► Released ─► Done
//!           │         │            │
//!           └─────────┴────────────┴──► Done   (element gone, no pointer-up)
//! ```
//!
//! Each tick reads the displacement, classifies it, picks the next step and
//! emits one pointer-move, then sleeps for the step's delay before the next
//! tick. Ticks of one task never overlap; different tasks are serialised by
//! the [`SlideLock`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::config::DragConfig;
use crate::error::DragError;
use crate::gesture::GestureEmitter;
use crate::lock::{LockStatus, SlideLock};
use crate::observer::{DragEvent, DragObserver, TracingObserver};
use crate::page::{ElementRef, Notice, SliderPage};
use crate::profile::SpeedProfile;
use crate::stuck::{Motion, StuckDetector};
use crate::task::{DragRequest, SlideTask, TaskId, TaskOutcome, TaskPhase, TaskReport};
use crate::tracker::{DisplacementTracker, SignalReadings};

const TIMEOUT_NOTICE: &str = "Slide timed out. Refresh the captcha and try again.";
const TIMEOUT_NOTICE_DURATION: Duration = Duration::from_secs(2);

/// Per-task working state that does not belong in the public record.
struct TaskRun {
    tracker: DisplacementTracker,
    detector: StuckDetector,
    emitter: GestureEmitter,
    rng: StdRng,
    /// Element currently read for displacement.
    tracked: ElementRef,
    /// Screen-space offset of the handle from the tracked element.
    handle_offset: f64,
    opening_step: Option<f64>,
    soft_terminals: u32,
    hard_terminals: u32,
}

enum Tick {
    Continue(Duration),
    Finished(TaskOutcome),
}

/// Runs drag tasks against a [`SliderPage`].
pub struct DragController {
    config: DragConfig,
    profile: SpeedProfile,
    lock: Arc<SlideLock>,
    observer: Arc<dyn DragObserver>,
    task_counter: AtomicU64,
}

impl DragController {
    /// Controller with its own slide lock.
    pub fn new(config: DragConfig) -> Self {
        let lock = Arc::new(SlideLock::new(config.lock_ttl()));
        Self::with_lock(config, lock)
    }

    /// Controller sharing an existing slide lock.
    pub fn with_lock(config: DragConfig, lock: Arc<SlideLock>) -> Self {
        Self {
            profile: SpeedProfile::new(config.profile.clone()),
            config,
            lock,
            observer: Arc::new(TracingObserver),
            task_counter: AtomicU64::new(0),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn DragObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(&self) -> &DragConfig {
        &self.config
    }

    pub fn lock(&self) -> &Arc<SlideLock> {
        &self.lock
    }

    /// Run one task on a background tokio task.
    pub fn spawn(
        self: &Arc<Self>,
        page: Arc<dyn SliderPage>,
        request: DragRequest,
    ) -> JoinHandle<Result<TaskReport, DragError>> {
        let controller = Arc::clone(self);
        tokio::spawn(async move { controller.run(page.as_ref(), request).await })
    }

    /// Run one task to completion.
    ///
    /// Fails without dispatching anything when the distance is zero, the lock
    /// is held, or an element is missing at arm time. Once armed the task
    /// always reaches `Done` and reports how it ended.
    pub async fn run(
        &self,
        page: &dyn SliderPage,
        request: DragRequest,
    ) -> Result<TaskReport, DragError> {
        if request.distance == 0.0 {
            debug!("recognised distance is zero, nothing to drag");
            return Err(DragError::ZeroDistance);
        }

        let started = Instant::now();
        let mut task = SlideTask::new(request.distance + self.config.overshoot_px);
        self.lock
            .try_acquire(task.id)
            .map_err(DragError::LockBusy)?;

        let mut run = match self.arm(page, &request, &mut task).await {
            Ok(run) => run,
            Err(err) => {
                self.lock.release(task.id);
                return Err(err);
            }
        };

        task.phase = TaskPhase::Stepping;
        let mut delay = Duration::ZERO;
        let outcome = loop {
            tokio::time::sleep(delay).await;
            match self.tick(page, &request, &mut task, &mut run).await {
                Ok(Tick::Continue(next)) => delay = next,
                Ok(Tick::Finished(outcome)) => break outcome,
                Err(err) => {
                    self.lock.release(task.id);
                    self.emit(DragEvent::Aborted {
                        task: task.id,
                        reason: err.to_string(),
                    });
                    break TaskOutcome::Aborted;
                }
            }
        };

        if matches!(outcome, TaskOutcome::Settled | TaskOutcome::Stalled) {
            task.phase = TaskPhase::Released;
            self.schedule_release(task.id);
        }
        task.phase = TaskPhase::Done;
        self.emit(DragEvent::Done {
            task: task.id,
            outcome,
        });

        Ok(TaskReport {
            pointer_moves: run.emitter.moves(),
            soft_terminals: run.soft_terminals,
            hard_terminals: run.hard_terminals,
            elapsed: started.elapsed(),
            outcome,
            task,
        })
    }

    /// Capture the baseline and press the handle.
    async fn arm(
        &self,
        page: &dyn SliderPage,
        request: &DragRequest,
        task: &mut SlideTask,
    ) -> Result<TaskRun, DragError> {
        let target = &request.target;
        let baseline = SignalReadings::capture(page, &target.small_image).await?;
        let handle_rect = page.bounding_rect(&target.handle).await?;
        let small_rect = page.bounding_rect(&target.small_image).await?;
        let container_offset = match &target.big_image {
            Some(big) => small_rect.x - page.bounding_rect(big).await?.x,
            None => 0.0,
        };

        let mut emitter = GestureEmitter::new(target.handle.clone(), handle_rect);
        emitter.press(page).await?;

        task.phase = TaskPhase::Armed;
        self.emit(DragEvent::Armed {
            task: task.id,
            target: task.target_distance,
        });

        Ok(TaskRun {
            tracker: DisplacementTracker::new(baseline, container_offset),
            detector: StuckDetector::new(self.config.stuck_limit, self.config.tolerance_px),
            emitter,
            rng: self.task_rng(),
            tracked: target.small_image.clone(),
            handle_offset: handle_rect.x - small_rect.x,
            opening_step: Some(self.config.opening_step_px),
            soft_terminals: 0,
            hard_terminals: 0,
        })
    }

    async fn tick(
        &self,
        page: &dyn SliderPage,
        request: &DragRequest,
        task: &mut SlideTask,
        run: &mut TaskRun,
    ) -> Result<Tick, DragError> {
        if self.lock.status(task.id) != LockStatus::Held {
            return self.fail_safe(page, task, run).await;
        }

        if !run.tracker.is_locked()
            && !task.low_confidence
            && task.tick_count > self.config.fallback_after_ticks
        {
            self.fall_back_to_handle(page, request, task, run).await?;
        }

        let readings = SignalReadings::capture(page, &run.tracked).await?;
        let offset = run.tracker.observe(&readings);
        if task.reference_mode != run.tracker.mode() {
            task.reference_mode = run.tracker.mode();
            if let Some(signal) = task.reference_mode.signal() {
                self.emit(DragEvent::SignalLocked {
                    task: task.id,
                    signal,
                    tick: task.tick_count,
                });
            }
        }
        task.previous_offset = task.current_offset;
        task.current_offset = offset;

        let motion = run.detector.observe(offset, task.target_distance);
        task.stuck_count = run.detector.stuck_count();
        if run.detector.changed() {
            self.lock.renew(task.id);
        }

        let residue = task.residue();
        let step = match run.opening_step.take() {
            Some(base) => {
                self.profile
                    .next_with_base(base, residue, task.target_distance, &mut run.rng)
            }
            None => self
                .profile
                .next(residue, task.target_distance, &mut run.rng),
        };

        if offset.is_some() && motion.is_terminal() {
            if task.finished {
                return self.finish(page, request, task, run, motion).await;
            }
            // First arrival: back off by the overshoot and let one more
            // corrective tick run before releasing.
            task.finished = true;
            task.phase = TaskPhase::Settling;
            run.soft_terminals += 1;
            self.emit(DragEvent::SoftTerminal {
                task: task.id,
                offset,
                stuck: motion == Motion::Stuck,
            });
            task.target_distance -= self.config.overshoot_px;
        }

        run.emitter.step(page, step.length).await?;
        (task.accumulated_step_x, task.accumulated_step_y) = run.emitter.accumulated();
        task.tick_count += 1;

        debug!(
            task = %task.id,
            tick = task.tick_count,
            ?offset,
            residue,
            step = step.length,
            delay_ms = step.delay.as_secs_f64() * 1000.0,
            "drag tick"
        );
        Ok(Tick::Continue(step.delay))
    }

    /// Hard terminal tick: release the pointer and report.
    async fn finish(
        &self,
        page: &dyn SliderPage,
        request: &DragRequest,
        task: &mut SlideTask,
        run: &mut TaskRun,
        motion: Motion,
    ) -> Result<Tick, DragError> {
        run.hard_terminals += 1;
        self.emit(DragEvent::HardTerminal {
            task: task.id,
            offset: task.current_offset,
        });

        let latency = self.release_latency(&mut run.rng);
        run.emitter.release(page, latency).await?;

        if let Some(notice) = &request.completion_notice {
            self.notify(page, notice).await;
        }

        Ok(Tick::Finished(if motion == Motion::Stuck {
            TaskOutcome::Stalled
        } else {
            TaskOutcome::Settled
        }))
    }

    /// The lock expired under us: tell the user, release, give the lock back.
    async fn fail_safe(
        &self,
        page: &dyn SliderPage,
        task: &mut SlideTask,
        run: &mut TaskRun,
    ) -> Result<Tick, DragError> {
        self.emit(DragEvent::LockExpired { task: task.id });
        self.notify(page, &Notice::new(TIMEOUT_NOTICE, TIMEOUT_NOTICE_DURATION))
            .await;

        let latency = self.release_latency(&mut run.rng);
        let released = run.emitter.release(page, latency).await;
        self.lock.release(task.id);
        released?;

        Ok(Tick::Finished(TaskOutcome::TimedOut))
    }

    /// No signal ever locked: track the handle and correct the target once.
    async fn fall_back_to_handle(
        &self,
        page: &dyn SliderPage,
        request: &DragRequest,
        task: &mut SlideTask,
        run: &mut TaskRun,
    ) -> Result<(), DragError> {
        let handle = &request.target.handle;
        let tracked_width = page.style(&run.tracked).await?.width_px();
        let handle_width = page.style(handle).await?.width_px();

        let old_target = task.target_distance;
        if tracked_width < handle_width * self.config.narrow_handle_factor {
            task.target_distance += run.handle_offset;
        } else {
            task.target_distance -= self.config.fallback_shrink_px;
        }
        run.tracked = handle.clone();
        task.low_confidence = true;

        self.emit(DragEvent::LowConfidence {
            task: task.id,
            old_target,
            new_target: task.target_distance,
        });
        Ok(())
    }

    fn schedule_release(&self, task: TaskId) {
        let lock = Arc::clone(&self.lock);
        let delay = self.config.lock_release_delay();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            lock.release(task);
        });
    }

    async fn notify(&self, page: &dyn SliderPage, notice: &Notice) {
        if let Err(err) = page.show_notice(notice).await {
            warn!(error = %err, "failed to show notice");
        }
    }

    fn release_latency(&self, rng: &mut StdRng) -> Duration {
        Duration::from_millis(rng.gen_range(0..=self.config.release_latency_max_ms))
    }

    fn task_rng(&self) -> StdRng {
        let n = self.task_counter.fetch_add(1, Ordering::Relaxed);
        match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(n)),
            None => StdRng::from_entropy(),
        }
    }

    fn emit(&self, event: DragEvent) {
        self.observer.on_event(&event);
    }
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;
