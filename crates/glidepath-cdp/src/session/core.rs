//! Core session struct and CDP command dispatch.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::client::Transport;
use crate::error::CdpError;

/// A session attached to a single page/target.
pub struct PageSession {
    target_id: String,
    session_id: String,
    /// Shared with the client and its other sessions.
    transport: Arc<Transport>,
}

impl PageSession {
    pub(crate) fn new(target_id: String, session_id: String, transport: Arc<Transport>) -> Self {
        Self {
            target_id,
            session_id,
            transport,
        }
    }

    pub fn target_id(&self) -> &str {
        &self.target_id
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Send a CDP command to this page session.
    pub async fn call(&self, method: &str, params: Option<Value>) -> Result<Value, CdpError> {
        self.transport
            .call(method, params, Some(&self.session_id))
            .await
    }

    /// Enable required CDP domains.
    pub(crate) async fn enable_domains(&self) -> Result<(), CdpError> {
        self.call("Page.enable", None).await?;
        self.call("Runtime.enable", None).await?;

        debug!("Enabled CDP domains for session {}", self.session_id);
        Ok(())
    }

    /// Current document URL.
    pub async fn url(&self) -> Result<Url, CdpError> {
        let href = self.evaluate("location.href").await?;
        let href = href
            .as_str()
            .ok_or_else(|| CdpError::InvalidResponse("location.href is not a string".into()))?;
        Ok(Url::parse(href)?)
    }

    /// Host of the current document, empty for `about:blank` and friends.
    pub async fn host(&self) -> Result<String, CdpError> {
        Ok(self.url().await?.host_str().unwrap_or_default().to_string())
    }
}
