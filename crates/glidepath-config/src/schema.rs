//! Configuration schema definitions.

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use glidepath_core::{DragConfig, PhaseConfig, ProfileConfig};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub browser: BrowserConfig,

    #[serde(default)]
    pub recognition: RecognitionConfig,

    #[serde(default)]
    pub drag: DragConfig,

    #[serde(default)]
    pub watch: WatchConfig,

    #[serde(default)]
    pub rules: Vec<SliderRule>,
}

impl Config {
    /// Rules whose host matches `host`.
    pub fn rules_for_host<'a>(&'a self, host: &'a str) -> impl Iterator<Item = &'a SliderRule> {
        self.rules.iter().filter(move |rule| rule.matches_host(host))
    }
}

/// Browser connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Remote debugging endpoint of a running Chrome.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Attach to the first page whose URL contains this.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_url_contains: Option<String>,

    #[serde(default)]
    pub pointer_dispatch: PointerDispatch,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            page_url_contains: None,
            pointer_dispatch: PointerDispatch::default(),
        }
    }
}

/// How pointer events are delivered to the handle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerDispatch {
    /// `MouseEvent`s dispatched from page script.
    #[default]
    Dom,
    /// Browser input events.
    Input,
}

fn default_endpoint() -> String {
    "http://localhost:9222".to_string()
}

/// Recognition service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognitionConfig {
    #[serde(default = "default_server_url")]
    pub server_url: String,

    #[serde(default = "default_recognition_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_client_version")]
    pub client_version: String,

    /// How long recognition results are replayed. Forever when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_ttl_secs: Option<u64>,
}

impl RecognitionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn result_ttl(&self) -> Option<Duration> {
        self.result_ttl_secs.map(Duration::from_secs)
    }
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            timeout_secs: default_recognition_timeout(),
            client_version: default_client_version(),
            result_ttl_secs: None,
        }
    }
}

fn default_server_url() -> String {
    "http://127.0.0.1:7000".to_string()
}

fn default_recognition_timeout() -> u64 {
    30
}

fn default_client_version() -> String {
    "6.5".to_string()
}

/// Detection cadence and dedupe windows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Same background image is solved at most once in this window.
    #[serde(default = "default_puzzle_dedupe_secs")]
    pub puzzle_dedupe_secs: u64,

    /// Same behaviour slider is attempted at most once in this window.
    #[serde(default = "default_behavior_dedupe_secs")]
    pub behavior_dedupe_secs: u64,

    #[serde(default = "default_true")]
    pub show_notices: bool,
}

impl WatchConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn puzzle_dedupe(&self) -> Duration {
        Duration::from_secs(self.puzzle_dedupe_secs)
    }

    pub fn behavior_dedupe(&self) -> Duration {
        Duration::from_secs(self.behavior_dedupe_secs)
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            puzzle_dedupe_secs: default_puzzle_dedupe_secs(),
            behavior_dedupe_secs: default_behavior_dedupe_secs(),
            show_notices: true,
        }
    }
}

fn default_interval_ms() -> u64 {
    500
}

fn default_puzzle_dedupe_secs() -> u64 {
    3600
}

fn default_behavior_dedupe_secs() -> u64 {
    60
}

fn default_true() -> bool {
    true
}

/// Which solve pipeline a rule uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    /// Piece image over a background image.
    Puzzle,
    /// A lone handle dragged along a track.
    Behavior,
}

/// One site's slider selectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SliderRule {
    pub name: String,
    /// Page host, e.g. `www.example.com`.
    pub host: String,
    pub kind: RuleKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub big_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub small_image: Option<String>,
    /// The draggable handle.
    pub move_item: String,
}

impl SliderRule {
    pub fn matches_host(&self, host: &str) -> bool {
        self.host.eq_ignore_ascii_case(host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(name: &str, host: &str) -> SliderRule {
        SliderRule {
            name: name.to_string(),
            host: host.to_string(),
            kind: RuleKind::Behavior,
            big_image: None,
            small_image: None,
            move_item: ".handle".to_string(),
        }
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.browser.endpoint, "http://localhost:9222");
        assert_eq!(config.browser.pointer_dispatch, PointerDispatch::Dom);
        assert_eq!(config.recognition.timeout(), Duration::from_secs(30));
        assert_eq!(config.recognition.result_ttl(), None);
        assert_eq!(config.watch.interval(), Duration::from_millis(500));
        assert_eq!(config.watch.puzzle_dedupe(), Duration::from_secs(3600));
        assert_eq!(config.watch.behavior_dedupe(), Duration::from_secs(60));
        assert!(config.watch.show_notices);
        assert_eq!(config.drag.lock_ttl_ms, 3000);
        assert!(config.rules.is_empty());
    }

    #[test]
    fn test_rules_for_host() {
        let config = Config {
            rules: vec![rule("a", "login.example.com"), rule("b", "other.org")],
            ..Default::default()
        };
        let names: Vec<_> = config
            .rules_for_host("LOGIN.example.com")
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(names, vec!["a"]);
    }

    #[test]
    fn test_rule_kind_serialization() {
        let toml = toml::to_string(&rule("a", "h")).unwrap();
        assert!(toml.contains("kind = \"behavior\""));
    }
}
