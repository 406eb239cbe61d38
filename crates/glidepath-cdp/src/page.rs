//! [`SliderPage`] over a CDP page session.

use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use glidepath_core::{
    DragError, ElementRef, Notice, PointerEvent, PointerKind, Rect, SliderPage, StyleSnapshot,
};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::error::CdpError;
use crate::protocol::MouseEventType;
use crate::scripts;
use crate::session::PageSession;

/// How pointer events reach the page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PointerMode {
    /// Script-dispatched `MouseEvent`s on the handle (untrusted).
    #[default]
    Dom,
    /// Browser-level `Input.dispatchMouseEvent` at the client coordinates.
    Input,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
enum ImageSource {
    Data(String),
    Url(String),
}

/// A live Chrome tab, with element refs being Runtime object ids.
pub struct CdpSliderPage {
    session: Arc<PageSession>,
    mode: PointerMode,
    http: reqwest::Client,
}

impl CdpSliderPage {
    pub fn new(session: Arc<PageSession>) -> Self {
        Self {
            session,
            mode: PointerMode::default(),
            http: reqwest::Client::new(),
        }
    }

    pub fn with_pointer_mode(mut self, mode: PointerMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn session(&self) -> &PageSession {
        &self.session
    }

    async fn call_on<T: for<'de> Deserialize<'de>>(
        &self,
        element: &ElementRef,
        function: &str,
    ) -> Result<T, CdpError> {
        self.session
            .call_function_as(element.as_str(), function, None)
            .await
    }

    /// The element's computed width in pixels.
    pub async fn width(&self, element: &ElementRef) -> Result<f64, CdpError> {
        let style: StyleSnapshot = self.call_on(element, scripts::STYLE_FN).await?;
        Ok(style.width_px())
    }

    /// The element's image as a `data:` URL.
    ///
    /// Remote images are downloaded and base64-encoded.
    pub async fn capture_image(&self, element: &ElementRef) -> Result<String, CdpError> {
        let source: Option<ImageSource> =
            self.call_on(element, scripts::IMAGE_SOURCE_FN).await?;
        match source {
            Some(ImageSource::Data(data_url)) => Ok(data_url),
            Some(ImageSource::Url(url)) => self.download_image(&url).await,
            None => Err(CdpError::ElementNotFound(format!(
                "no image source on {element}"
            ))),
        }
    }

    async fn download_image(&self, url: &str) -> Result<String, CdpError> {
        debug!("Downloading slider image {}", url);
        let response = self.http.get(url).send().await?.error_for_status()?;
        let mime = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("image/png")
            .to_string();
        let bytes = response.bytes().await?;
        Ok(to_data_url(&mime, &bytes))
    }

    async fn dispatch_dom(&self, element: &ElementRef, event: PointerEvent) -> Result<(), CdpError> {
        self.session
            .call_function_on(
                element.as_str(),
                scripts::DISPATCH_FN,
                Some(vec![
                    json!(event.kind.event_type()),
                    json!(event.screen_x),
                    json!(event.screen_y),
                    json!(event.client_x),
                    json!(event.client_y),
                ]),
            )
            .await?;
        Ok(())
    }

    async fn dispatch_input(&self, event: PointerEvent) -> Result<(), CdpError> {
        let (event_type, pressed) = match event.kind {
            PointerKind::Down => (MouseEventType::MousePressed, true),
            PointerKind::Move => (MouseEventType::MouseMoved, true),
            PointerKind::Up => (MouseEventType::MouseReleased, false),
        };
        self.session
            .dispatch_mouse(event_type, event.client_x, event.client_y, pressed)
            .await
    }
}

fn to_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

#[async_trait]
impl SliderPage for CdpSliderPage {
    async fn style(&self, element: &ElementRef) -> Result<StyleSnapshot, DragError> {
        Ok(self.call_on(element, scripts::STYLE_FN).await?)
    }

    async fn parent_style(&self, element: &ElementRef) -> Result<Option<StyleSnapshot>, DragError> {
        Ok(self.call_on(element, scripts::PARENT_STYLE_FN).await?)
    }

    async fn bounding_rect(&self, element: &ElementRef) -> Result<Rect, DragError> {
        Ok(self.call_on(element, scripts::RECT_FN).await?)
    }

    async fn dispatch_pointer(
        &self,
        element: &ElementRef,
        event: PointerEvent,
    ) -> Result<(), DragError> {
        match self.mode {
            PointerMode::Dom => self.dispatch_dom(element, event).await?,
            PointerMode::Input => self.dispatch_input(event).await?,
        }
        Ok(())
    }

    async fn show_notice(&self, notice: &Notice) -> Result<(), DragError> {
        let expression = scripts::show_notice(&notice.message, notice.duration.as_millis());
        self.session.evaluate(&expression).await?;
        Ok(())
    }
}
