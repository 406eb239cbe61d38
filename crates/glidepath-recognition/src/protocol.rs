//! Recognition service wire types.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use glidepath_core::style::parse_number;

/// Payload sent in place of the piece image for single-handle sliders.
pub const BEHAVIOR_PLACEHOLDER: &str =
    "5oqx5q2J77yM5Li65LqG56iL5bqP55qE5Y+R5bGV5Y+v5o6n77yM5q2k5aSE5b+F6aG75Lyg5Y+C5Yiw5LqR56uv44CC";

const DEFAULT_SHOW_TIME: Duration = Duration::from_secs(5);

/// Challenge type tag, sent as `ocr_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChallengeKind {
    /// Piece image over a background image.
    Puzzle,
    /// Single handle, no images.
    Behavior,
}

impl ChallengeKind {
    pub fn code(self) -> u8 {
        match self {
            ChallengeKind::Puzzle => 4,
            ChallengeKind::Behavior => 5,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            4 => Some(ChallengeKind::Puzzle),
            5 => Some(ChallengeKind::Behavior),
            _ => None,
        }
    }
}

impl Serialize for ChallengeKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

impl<'de> Deserialize<'de> for ChallengeKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = u8::deserialize(deserializer)?;
        ChallengeKind::from_code(code)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown ocr_type {code}")))
    }
}

/// Drop a `data:<mime>;base64,` prefix if present.
pub fn strip_data_url(image: &str) -> &str {
    if image.starts_with("data:") {
        if let Some((_, payload)) = image.split_once("base64,") {
            return payload;
        }
    }
    image
}

/// What the client asks the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognitionRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub big_image: Option<String>,
    pub small_image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub big_image_width: Option<u32>,
    pub small_image_width: u32,
    pub ocr_type: ChallengeKind,
    /// Makes otherwise identical behaviour requests distinct.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salt: Option<i64>,
}

impl RecognitionRequest {
    /// Puzzle request from the two images as captured (data URLs accepted).
    pub fn puzzle(big_image: &str, small_image: &str, big_width: u32, small_width: u32) -> Self {
        Self {
            big_image: Some(strip_data_url(big_image).to_string()),
            small_image: strip_data_url(small_image).to_string(),
            big_image_width: Some(big_width),
            small_image_width: small_width,
            ocr_type: ChallengeKind::Puzzle,
            salt: None,
        }
    }

    /// Behaviour request: placeholder image, the track width and a salt.
    pub fn behavior(track_width: u32, salt: i64) -> Self {
        Self {
            big_image: None,
            small_image: BEHAVIOR_PLACEHOLDER.to_string(),
            big_image_width: None,
            small_image_width: track_width,
            ocr_type: ChallengeKind::Behavior,
            salt: Some(salt),
        }
    }
}

/// `data` arrives as a number from some deployments and a string from others.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecognitionData {
    Number(f64),
    Text(String),
}

impl fmt::Display for RecognitionData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecognitionData::Number(n) => write!(f, "{n}"),
            RecognitionData::Text(s) => f.write_str(s),
        }
    }
}

/// What the service answers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognitionResponse {
    pub valid: bool,
    #[serde(default)]
    pub data: Option<RecognitionData>,
    #[serde(default)]
    pub description: Option<String>,
    /// How long to show `description`, in milliseconds.
    #[serde(default, rename = "showTime")]
    pub show_time: Option<u64>,
}

impl RecognitionResponse {
    /// Travel distance in whole pixels; 0 when missing or unparsable.
    pub fn distance(&self) -> f64 {
        self.data
            .as_ref()
            .map(|data| parse_number(&data.to_string()))
            .unwrap_or(0.0)
    }

    /// Non-empty description, if any.
    pub fn message(&self) -> Option<&str> {
        self.description.as_deref().filter(|d| !d.is_empty())
    }

    pub fn show_duration(&self) -> Duration {
        self.show_time
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_SHOW_TIME)
    }
}
