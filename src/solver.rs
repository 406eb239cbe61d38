//! Detect → recognise → drag, once per captcha.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use glidepath_cdp::BehaviorSlider;
use glidepath_core::{
    DragController, DragError, DragRequest, ExpiringStore, Notice, SliderPage, SliderTarget,
    TaskReport,
};
use glidepath_config::WatchConfig;
use glidepath_recognition::{
    RecognitionError, RecognitionRequest, RecognitionResponse, Recognizer, content_hash,
    strip_data_url,
};
use tracing::{debug, info, warn};

pub(crate) const START_NOTICE: &str = "Sliding started, do not touch the mouse";
const START_NOTICE_DURATION: Duration = Duration::from_secs(5);
const REJECTED_NOTICE_DURATION: Duration = Duration::from_secs(3);

/// A located puzzle slider with its images captured.
#[derive(Debug, Clone)]
pub(crate) struct PuzzleCapture {
    pub target: SliderTarget,
    /// `data:` URLs.
    pub big_image: String,
    pub small_image: String,
    pub big_width: u32,
    pub small_width: u32,
}

pub(crate) struct Solver {
    controller: Arc<DragController>,
    recognizer: Arc<dyn Recognizer>,
    /// Content hashes of background images already attempted.
    solved_images: ExpiringStore<()>,
    /// Track widths of behaviour sliders being attempted.
    active_tracks: ExpiringStore<()>,
    watch: WatchConfig,
}

impl Solver {
    pub fn new(
        controller: Arc<DragController>,
        recognizer: Arc<dyn Recognizer>,
        watch: WatchConfig,
    ) -> Self {
        Self {
            controller,
            recognizer,
            solved_images: ExpiringStore::new(),
            active_tracks: ExpiringStore::new(),
            watch,
        }
    }

    /// Whether a drag is running or its lock release is still pending.
    pub fn is_busy(&self) -> bool {
        self.controller.lock().is_held()
    }

    pub fn purge_expired(&self) {
        self.solved_images.purge_expired();
        self.active_tracks.purge_expired();
    }

    /// Solve a puzzle slider unless its background was attempted recently.
    ///
    /// `Ok(None)` means nothing was dragged.
    pub async fn solve_puzzle(
        &self,
        page: &dyn SliderPage,
        page_url: &str,
        capture: PuzzleCapture,
    ) -> anyhow::Result<Option<TaskReport>> {
        let key = content_hash(strip_data_url(&capture.big_image));
        if !self
            .solved_images
            .set_if_absent(key.clone(), (), Some(self.watch.puzzle_dedupe()))
        {
            debug!(image = %key, "Puzzle already attempted");
            return Ok(None);
        }

        info!(image = %key, "Solving puzzle slider");
        self.notify(page, Notice::new(START_NOTICE, START_NOTICE_DURATION))
            .await;

        let request = RecognitionRequest::puzzle(
            &capture.big_image,
            &capture.small_image,
            capture.big_width,
            capture.small_width,
        );
        let response = match self.recognize(page, page_url, &request).await {
            Ok(Some(response)) => response,
            Ok(None) => return Ok(None),
            Err(e) => {
                if e.is_transient() {
                    // Let the next scan try this image again.
                    self.solved_images.remove(&key);
                }
                return Err(e.into());
            }
        };

        self.drag(page, capture.target, &response).await
    }

    /// Solve a single-handle slider resting at the start of its track.
    pub async fn solve_behavior(
        &self,
        page: &dyn SliderPage,
        page_url: &str,
        slider: BehaviorSlider,
    ) -> anyhow::Result<Option<TaskReport>> {
        if !slider.at_rest() {
            return Ok(None);
        }

        let track_width = slider.track_width as u32;
        let key = track_width.to_string();
        if !self
            .active_tracks
            .set_if_absent(key.clone(), (), Some(self.watch.behavior_dedupe()))
        {
            debug!(track_width, "Behaviour slider already in progress");
            return Ok(None);
        }

        info!(track_width, "Solving behaviour slider");
        let request = RecognitionRequest::behavior(track_width, Utc::now().timestamp_millis());
        // Without a drag the key stays until the dedupe window lapses.
        let Some(response) = self.recognize(page, page_url, &request).await? else {
            return Ok(None);
        };
        let report = self
            .drag(page, SliderTarget::single(slider.handle), &response)
            .await?;
        if report.is_some() {
            self.active_tracks.remove(&key);
        }
        Ok(report)
    }

    /// `Ok(None)` when the service rejected the challenge.
    async fn recognize(
        &self,
        page: &dyn SliderPage,
        page_url: &str,
        request: &RecognitionRequest,
    ) -> Result<Option<RecognitionResponse>, RecognitionError> {
        match self.recognizer.recognize(request, page_url).await {
            Ok(response) => Ok(Some(response)),
            Err(RecognitionError::Rejected { description }) => {
                warn!(
                    reason = description.as_deref().unwrap_or("none"),
                    "Recognition rejected"
                );
                if let Some(description) = description.filter(|d| !d.is_empty()) {
                    self.notify(page, Notice::new(description, REJECTED_NOTICE_DURATION))
                        .await;
                }
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn drag(
        &self,
        page: &dyn SliderPage,
        target: SliderTarget,
        response: &RecognitionResponse,
    ) -> anyhow::Result<Option<TaskReport>> {
        let mut request = DragRequest::new(target, response.distance());
        if let Some(message) = response.message() {
            if self.watch.show_notices {
                request = request
                    .with_completion_notice(Notice::new(message, response.show_duration()));
            }
        }

        match self.controller.run(page, request).await {
            Ok(report) => {
                info!(
                    outcome = ?report.outcome,
                    moves = report.pointer_moves,
                    elapsed_ms = report.elapsed.as_millis() as u64,
                    "Slide finished"
                );
                Ok(Some(report))
            }
            Err(DragError::ZeroDistance) => {
                debug!("Recognised distance is zero, skipping");
                Ok(None)
            }
            Err(DragError::LockBusy(owner)) => {
                debug!(%owner, "Another slide is running");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn notify(&self, page: &dyn SliderPage, notice: Notice) {
        if !self.watch.show_notices {
            return;
        }
        if let Err(e) = page.show_notice(&notice).await {
            debug!("Failed to show notice: {}", e);
        }
    }
}

#[cfg(test)]
#[path = "solver_tests.rs"]
mod tests;
