//! Selector-based element lookup.

use glidepath_core::{ElementRef, StyleSnapshot};
use tracing::trace;

use crate::error::CdpError;
use crate::scripts;
use crate::session::PageSession;

/// Resolved elements of a puzzle slider.
#[derive(Debug, Clone, PartialEq)]
pub struct PuzzleSlider {
    pub big_image: ElementRef,
    pub small_image: ElementRef,
    pub handle: ElementRef,
}

/// A resolved single-handle slider and its track geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct BehaviorSlider {
    pub handle: ElementRef,
    /// The handle's computed `left`; zero while the slider is at rest.
    pub left: f64,
    /// Width of the handle's parent, the track.
    pub track_width: f64,
}

impl BehaviorSlider {
    pub fn at_rest(&self) -> bool {
        self.left == 0.0
    }
}

/// Resolves configured selectors to visible elements on one page.
pub struct Locator<'a> {
    session: &'a PageSession,
}

impl<'a> Locator<'a> {
    pub fn new(session: &'a PageSession) -> Self {
        Self { session }
    }

    /// The first element matching `selector` if it is rendered and visible.
    pub async fn find_visible(&self, selector: &str) -> Result<Option<ElementRef>, CdpError> {
        let object = self
            .session
            .evaluate_handle(&scripts::query_visible(selector))
            .await?;
        if object.is_nullish() {
            trace!("No visible element for {}", selector);
            return Ok(None);
        }
        let id = object.object_id.ok_or_else(|| {
            CdpError::InvalidResponse(format!("element for {selector} has no object id"))
        })?;
        Ok(Some(ElementRef::new(id)))
    }

    /// All three puzzle elements, or `None` unless every one is visible.
    pub async fn find_puzzle(
        &self,
        big_image: &str,
        small_image: &str,
        move_item: &str,
    ) -> Result<Option<PuzzleSlider>, CdpError> {
        let Some(big_image) = self.find_visible(big_image).await? else {
            return Ok(None);
        };
        let Some(small_image) = self.find_visible(small_image).await? else {
            return Ok(None);
        };
        let Some(handle) = self.find_visible(move_item).await? else {
            return Ok(None);
        };
        Ok(Some(PuzzleSlider {
            big_image,
            small_image,
            handle,
        }))
    }

    /// The handle of a single-handle slider with its track geometry.
    pub async fn find_behavior(&self, move_item: &str) -> Result<Option<BehaviorSlider>, CdpError> {
        let Some(handle) = self.find_visible(move_item).await? else {
            return Ok(None);
        };
        let style: StyleSnapshot = self
            .session
            .call_function_as(handle.as_str(), scripts::STYLE_FN, None)
            .await?;
        let parent: Option<StyleSnapshot> = self
            .session
            .call_function_as(handle.as_str(), scripts::PARENT_STYLE_FN, None)
            .await?;
        let Some(parent) = parent else {
            return Ok(None);
        };
        Ok(Some(BehaviorSlider {
            handle,
            left: style.left_px(),
            track_width: parent.width_px(),
        }))
    }
}
