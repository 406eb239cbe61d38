//! At-most-once recognition per request content.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use glidepath_core::ExpiringStore;

use crate::error::RecognitionError;
use crate::hash::content_hash;
use crate::http::Recognizer;
use crate::protocol::{RecognitionRequest, RecognitionResponse};

#[derive(Debug, Clone)]
enum CacheEntry {
    Pending,
    Accepted(RecognitionResponse),
    Rejected(Option<String>),
}

/// Wraps a [`Recognizer`] so each distinct request reaches the service once.
///
/// The key is the content hash of the serialised request. While a request is
/// in flight its key holds a pending marker and duplicates fail with
/// [`RecognitionError::InFlight`]. The first answer, acceptance or rejection,
/// is then written and replayed. Transport failures clear the marker so the
/// next detection may retry.
pub struct CachedRecognizer<R> {
    inner: R,
    entries: ExpiringStore<CacheEntry>,
    result_ttl: Option<Duration>,
}

impl<R: Recognizer> CachedRecognizer<R> {
    /// `result_ttl` of `None` keeps results for the process lifetime.
    pub fn new(inner: R, result_ttl: Option<Duration>) -> Self {
        Self {
            inner,
            entries: ExpiringStore::new(),
            result_ttl,
        }
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }

    /// Cache key for `request`.
    pub fn key(request: &RecognitionRequest) -> Result<String, RecognitionError> {
        Ok(content_hash(&serde_json::to_string(request)?))
    }

    fn replay(entry: CacheEntry) -> Result<RecognitionResponse, RecognitionError> {
        match entry {
            CacheEntry::Pending => Err(RecognitionError::InFlight),
            CacheEntry::Accepted(response) => Ok(response),
            CacheEntry::Rejected(description) => Err(RecognitionError::Rejected { description }),
        }
    }
}

#[async_trait]
impl<R: Recognizer> Recognizer for CachedRecognizer<R> {
    async fn recognize(
        &self,
        request: &RecognitionRequest,
        page_url: &str,
    ) -> Result<RecognitionResponse, RecognitionError> {
        let key = Self::key(request)?;
        if !self.entries.set_if_absent(key.clone(), CacheEntry::Pending, None) {
            debug!(%key, "replaying cached recognition");
            return match self.entries.get(&key) {
                Some(entry) => Self::replay(entry),
                None => Err(RecognitionError::InFlight),
            };
        }

        let result = self.inner.recognize(request, page_url).await;
        let entry = match &result {
            Ok(response) => CacheEntry::Accepted(response.clone()),
            Err(RecognitionError::Rejected { description }) => {
                CacheEntry::Rejected(description.clone())
            }
            Err(_) => {
                self.entries.remove(&key);
                return result;
            }
        };
        // Pending becomes the result without the key ever being vacant.
        self.entries.replace(key, entry, self.result_ttl);
        result
    }
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
