//! The seam between the engine and a live page.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::DragError;
use crate::style::{parse_number, parse_transform_x};

/// Opaque handle to a live element, minted by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementRef(String);

impl ElementRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The computed-style properties the tracker needs, as raw strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleSnapshot {
    #[serde(default)]
    pub left: String,
    #[serde(default)]
    pub margin_left: String,
    #[serde(default)]
    pub transform: String,
    #[serde(default)]
    pub width: String,
}

impl StyleSnapshot {
    pub fn left_px(&self) -> f64 {
        parse_number(&self.left)
    }

    pub fn margin_left_px(&self) -> f64 {
        parse_number(&self.margin_left)
    }

    pub fn transform_x(&self) -> f64 {
        parse_transform_x(&self.transform)
    }

    pub fn width_px(&self) -> f64 {
        parse_number(&self.width)
    }
}

/// Viewport-relative bounding box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerKind {
    Down,
    Move,
    Up,
}

impl PointerKind {
    /// DOM event type name.
    pub fn event_type(&self) -> &'static str {
        match self {
            PointerKind::Down => "mousedown",
            PointerKind::Move => "mousemove",
            PointerKind::Up => "mouseup",
        }
    }
}

/// A synthetic pointer event, dispatched on the handle element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub screen_x: f64,
    pub screen_y: f64,
    pub client_x: f64,
    pub client_y: f64,
}

/// A transient, user-visible message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    pub message: String,
    pub duration: Duration,
}

impl Notice {
    pub fn new(message: impl Into<String>, duration: Duration) -> Self {
        Self {
            message: message.into(),
            duration,
        }
    }
}

/// Live page operations the drag engine consumes.
///
/// Any error from a read or dispatch mid-drag aborts the task.
#[async_trait]
pub trait SliderPage: Send + Sync {
    /// Computed style of an element.
    async fn style(&self, element: &ElementRef) -> Result<StyleSnapshot, DragError>;

    /// Computed style of an element's parent, if it has one.
    async fn parent_style(&self, element: &ElementRef) -> Result<Option<StyleSnapshot>, DragError>;

    /// Bounding box of an element.
    async fn bounding_rect(&self, element: &ElementRef) -> Result<Rect, DragError>;

    /// Dispatch a pointer event on an element.
    async fn dispatch_pointer(
        &self,
        element: &ElementRef,
        event: PointerEvent,
    ) -> Result<(), DragError>;

    /// Show a transient notice to the user.
    async fn show_notice(&self, notice: &Notice) -> Result<(), DragError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_snapshot_readers() {
        let style = StyleSnapshot {
            left: "12.9px".to_string(),
            margin_left: "3px".to_string(),
            transform: "matrix(1, 0, 0, 1, 40, 0)".to_string(),
            width: "320px".to_string(),
        };
        assert_eq!(style.left_px(), 12.0);
        assert_eq!(style.margin_left_px(), 3.0);
        assert_eq!(style.transform_x(), 40.0);
        assert_eq!(style.width_px(), 320.0);
    }

    #[test]
    fn test_style_snapshot_deserialize_camel_case() {
        let style: StyleSnapshot =
            serde_json::from_str(r#"{"left":"5px","marginLeft":"2px","transform":"none"}"#)
                .unwrap();
        assert_eq!(style.margin_left, "2px");
        assert_eq!(style.width, "");
    }

    #[test]
    fn test_pointer_kind_event_type() {
        assert_eq!(PointerKind::Down.event_type(), "mousedown");
        assert_eq!(PointerKind::Move.event_type(), "mousemove");
        assert_eq!(PointerKind::Up.event_type(), "mouseup");
    }
}
