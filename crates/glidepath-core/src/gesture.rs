//! Synthetic pointer gesture on the slider handle.

use std::time::Duration;

use tracing::trace;

use crate::error::DragError;
use crate::page::{ElementRef, PointerEvent, PointerKind, Rect, SliderPage};

/// Vertical drift applied on every move.
const DRIFT_Y: f64 = -1.0;

/// Emits pointer-down, one pointer-move per tick, then pointer-up.
///
/// Coordinates are the handle's initial box plus the accumulated step.
#[derive(Debug, Clone)]
pub struct GestureEmitter {
    handle: ElementRef,
    screen_origin: (f64, f64),
    client_origin: (f64, f64),
    dx: f64,
    dy: f64,
    moves: u64,
    pressed: bool,
    released: bool,
}

impl GestureEmitter {
    /// Anchor a gesture on the handle's bounding box.
    pub fn new(handle: ElementRef, rect: Rect) -> Self {
        Self {
            handle,
            screen_origin: (rect.x, rect.y),
            client_origin: (
                rect.x + rect.width / 2.0 - 2.0,
                rect.y + rect.height / 2.0 - 2.0,
            ),
            dx: 0.0,
            dy: 0.0,
            moves: 0,
            pressed: false,
            released: false,
        }
    }

    pub fn handle(&self) -> &ElementRef {
        &self.handle
    }

    /// Cumulative pointer displacement since pointer-down.
    pub fn accumulated(&self) -> (f64, f64) {
        (self.dx, self.dy)
    }

    pub fn moves(&self) -> u64 {
        self.moves
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Event of `kind` at the current pointer position.
    pub fn event(&self, kind: PointerKind) -> PointerEvent {
        PointerEvent {
            kind,
            screen_x: self.screen_origin.0 + self.dx,
            screen_y: self.screen_origin.1 + self.dy,
            client_x: self.client_origin.0 + self.dx,
            client_y: self.client_origin.1 + self.dy,
        }
    }

    pub async fn press(&mut self, page: &dyn SliderPage) -> Result<(), DragError> {
        if self.pressed {
            return Ok(());
        }
        page.dispatch_pointer(&self.handle, self.event(PointerKind::Down))
            .await?;
        self.pressed = true;
        Ok(())
    }

    /// Advance by `length` along the drag axis and emit a pointer-move.
    pub async fn step(&mut self, page: &dyn SliderPage, length: f64) -> Result<(), DragError> {
        self.dx += length;
        self.dy += DRIFT_Y;
        let event = self.event(PointerKind::Move);
        page.dispatch_pointer(&self.handle, event).await?;
        self.moves += 1;
        trace!(dx = self.dx, dy = self.dy, "pointer move");
        Ok(())
    }

    /// Wait `latency`, then emit the pointer-up. Emits at most once.
    pub async fn release(
        &mut self,
        page: &dyn SliderPage,
        latency: Duration,
    ) -> Result<(), DragError> {
        if self.released {
            return Ok(());
        }
        self.released = true;
        tokio::time::sleep(latency).await;
        page.dispatch_pointer(&self.handle, self.event(PointerKind::Up))
            .await
    }
}

#[cfg(test)]
#[path = "gesture_tests.rs"]
mod tests;
