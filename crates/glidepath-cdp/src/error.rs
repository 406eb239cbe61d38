//! CDP error types.

use glidepath_core::DragError;
use thiserror::Error;

/// CDP client errors.
#[derive(Debug, Error)]
pub enum CdpError {
    /// Failed to connect to Chrome.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Chrome not found or not running with remote debugging.
    #[error("Chrome not available at {0}. Start Chrome with: chrome --remote-debugging-port=9222")]
    ChromeNotAvailable(String),

    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// Error object returned by the browser.
    #[error("CDP error: {message} (code: {code})")]
    Protocol { code: i64, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP error (endpoint discovery, image download).
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Page not found: {0}")]
    PageNotFound(String),

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// A page script threw.
    #[error("JavaScript error: {0}")]
    JavaScript(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Session closed")]
    SessionClosed,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl CdpError {
    /// Whether the error means a remote object no longer refers to a live node.
    pub fn is_stale_element(&self) -> bool {
        match self {
            CdpError::ElementNotFound(_) => true,
            CdpError::JavaScript(text) => text.contains("detached"),
            CdpError::Protocol { message, .. } => {
                message.contains("Could not find object")
                    || message.contains("Cannot find context")
            }
            _ => false,
        }
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for CdpError {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        CdpError::WebSocket(e.to_string())
    }
}

impl From<reqwest::Error> for CdpError {
    fn from(e: reqwest::Error) -> Self {
        CdpError::Http(e.to_string())
    }
}

impl From<url::ParseError> for CdpError {
    fn from(e: url::ParseError) -> Self {
        CdpError::ConnectionFailed(format!("Invalid URL: {}", e))
    }
}

impl From<CdpError> for DragError {
    fn from(e: CdpError) -> Self {
        if e.is_stale_element() || matches!(e, CdpError::SessionClosed) {
            DragError::ElementGone(e.to_string())
        } else {
            DragError::Page(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stale_object_maps_to_element_gone() {
        let err = CdpError::Protocol {
            code: -32000,
            message: "Could not find object with given id".to_string(),
        };
        assert!(DragError::from(err).is_element_gone());
    }

    #[test]
    fn test_detached_script_error_maps_to_element_gone() {
        let err = CdpError::JavaScript("Uncaught Error: element detached".to_string());
        assert!(DragError::from(err).is_element_gone());
    }

    #[test]
    fn test_session_closed_maps_to_element_gone() {
        assert!(DragError::from(CdpError::SessionClosed).is_element_gone());
        assert!(DragError::from(CdpError::ElementNotFound(".btn".into())).is_element_gone());
    }

    #[test]
    fn test_other_errors_map_to_page() {
        let err = DragError::from(CdpError::Timeout("Runtime.evaluate".to_string()));
        assert!(matches!(err, DragError::Page(ref m) if m.contains("Runtime.evaluate")));

        let err = DragError::from(CdpError::Protocol {
            code: -32601,
            message: "method not found".to_string(),
        });
        assert!(!err.is_element_gone());
    }

    #[test]
    fn test_chrome_not_available_hint() {
        let err = CdpError::ChromeNotAvailable("http://localhost:9222".to_string());
        assert!(err.to_string().contains("--remote-debugging-port"));
    }
}
