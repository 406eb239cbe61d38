//! In-memory page used by unit tests.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::DragError;
use crate::page::{ElementRef, Notice, PointerEvent, Rect, SliderPage, StyleSnapshot};

/// Records dispatched events and serves scripted styles.
#[derive(Default)]
pub(crate) struct RecordingPage {
    pub styles: Mutex<HashMap<ElementRef, StyleSnapshot>>,
    pub parents: Mutex<HashMap<ElementRef, StyleSnapshot>>,
    pub rects: Mutex<HashMap<ElementRef, Rect>>,
    pub events: Mutex<Vec<(ElementRef, PointerEvent)>>,
    pub notices: Mutex<Vec<Notice>>,
    pub gone: Mutex<bool>,
}

impl RecordingPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_left(&self, element: &ElementRef, left: f64) {
        let mut styles = self.styles.lock();
        let style = styles.entry(element.clone()).or_default();
        style.left = format!("{left}px");
    }

    pub fn set_rect(&self, element: &ElementRef, rect: Rect) {
        self.rects.lock().insert(element.clone(), rect);
    }

    pub fn events(&self) -> Vec<(ElementRef, PointerEvent)> {
        self.events.lock().clone()
    }

    fn check_alive(&self, element: &ElementRef) -> Result<(), DragError> {
        if *self.gone.lock() {
            Err(DragError::ElementGone(element.to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl SliderPage for RecordingPage {
    async fn style(&self, element: &ElementRef) -> Result<StyleSnapshot, DragError> {
        self.check_alive(element)?;
        Ok(self.styles.lock().get(element).cloned().unwrap_or_default())
    }

    async fn parent_style(&self, element: &ElementRef) -> Result<Option<StyleSnapshot>, DragError> {
        self.check_alive(element)?;
        Ok(self.parents.lock().get(element).cloned())
    }

    async fn bounding_rect(&self, element: &ElementRef) -> Result<Rect, DragError> {
        self.check_alive(element)?;
        Ok(self.rects.lock().get(element).copied().unwrap_or_default())
    }

    async fn dispatch_pointer(
        &self,
        element: &ElementRef,
        event: PointerEvent,
    ) -> Result<(), DragError> {
        self.check_alive(element)?;
        self.events.lock().push((element.clone(), event));
        Ok(())
    }

    async fn show_notice(&self, notice: &Notice) -> Result<(), DragError> {
        self.notices.lock().push(notice.clone());
        Ok(())
    }
}
