//! Trusted mouse input for CDP page session.

use serde_json::json;

use crate::error::CdpError;
use crate::protocol::{MouseButton, MouseEventType};

use super::core::PageSession;

impl PageSession {
    /// Dispatch a browser-level mouse event at viewport coordinates.
    ///
    /// `pressed` keeps the left button held for move events.
    pub async fn dispatch_mouse(
        &self,
        event_type: MouseEventType,
        x: f64,
        y: f64,
        pressed: bool,
    ) -> Result<(), CdpError> {
        let button = match event_type {
            MouseEventType::MouseMoved if !pressed => MouseButton::None,
            _ => MouseButton::Left,
        };
        let buttons = if pressed { 1 } else { 0 };
        self.call(
            "Input.dispatchMouseEvent",
            Some(json!({
                "type": event_type,
                "x": x,
                "y": y,
                "button": button,
                "buttons": buttons,
                "clickCount": 1,
            })),
        )
        .await?;
        Ok(())
    }
}
