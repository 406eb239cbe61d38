//! HTTP recognition client.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::RecognitionError;
use crate::protocol::{RecognitionRequest, RecognitionResponse};

/// Version string reported to the service.
pub const DEFAULT_CLIENT_VERSION: &str = "6.5";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Answers "how far must the handle travel".
#[async_trait]
pub trait Recognizer: Send + Sync {
    /// Recognise `request` on behalf of the page at `page_url`.
    ///
    /// A response the service marks invalid is returned as
    /// [`RecognitionError::Rejected`].
    async fn recognize(
        &self,
        request: &RecognitionRequest,
        page_url: &str,
    ) -> Result<RecognitionResponse, RecognitionError>;
}

#[derive(Serialize)]
struct WireRequest<'a> {
    #[serde(flatten)]
    request: &'a RecognitionRequest,
    version: &'a str,
}

/// Posts requests to `{server_url}/hello`.
pub struct HttpRecognizer {
    client: reqwest::Client,
    endpoint: String,
    version: String,
}

impl HttpRecognizer {
    pub fn new(server_url: &str) -> Result<Self, RecognitionError> {
        Self::with_options(server_url, DEFAULT_TIMEOUT, DEFAULT_CLIENT_VERSION)
    }

    pub fn with_options(
        server_url: &str,
        timeout: Duration,
        version: &str,
    ) -> Result<Self, RecognitionError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/hello", server_url.trim_end_matches('/')),
            version: version.to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Recognizer for HttpRecognizer {
    async fn recognize(
        &self,
        request: &RecognitionRequest,
        page_url: &str,
    ) -> Result<RecognitionResponse, RecognitionError> {
        debug!(endpoint = %self.endpoint, kind = ?request.ocr_type, "sending recognition request");
        let body = WireRequest {
            request,
            version: &self.version,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json; charset=UTF-8")
            .header("path", page_url)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(RecognitionError::Api { status, message });
        }

        let text = response.text().await?;
        let parsed: RecognitionResponse = serde_json::from_str(&text)?;
        if !parsed.valid {
            warn!(description = ?parsed.description, "recognition rejected");
            return Err(RecognitionError::Rejected {
                description: parsed.description,
            });
        }
        Ok(parsed)
    }
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
