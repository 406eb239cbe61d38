//! # Glidepath Recognition
//!
//! Client side of the recognition service: given the two slider images (or a
//! placeholder for single-handle sliders) it answers how far the handle must
//! travel.
//!
//! - [`RecognitionRequest`] / [`RecognitionResponse`] - the wire contract
//! - [`HttpRecognizer`] - POSTs to `{server}/hello`
//! - [`CachedRecognizer`] - at-most-once execution per request content
//! - [`content_hash`] - short string hash used for cache and dedupe keys

mod cache;
mod error;
mod hash;
mod http;
mod protocol;

pub use cache::CachedRecognizer;
pub use error::RecognitionError;
pub use hash::content_hash;
pub use http::{HttpRecognizer, Recognizer, DEFAULT_CLIENT_VERSION};
pub use protocol::{
    strip_data_url, ChallengeKind, RecognitionData, RecognitionRequest, RecognitionResponse,
    BEHAVIOR_PLACEHOLDER,
};
