//! Configuration validation.

use std::collections::HashSet;

use url::Url;

use crate::error::ConfigError;
use crate::schema::{Config, PhaseConfig, RuleKind};

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// Fail with every error joined, or pass the warnings through.
    pub fn into_result(self) -> Result<Vec<ValidationWarning>, ConfigError> {
        if self.is_valid() {
            return Ok(self.warnings);
        }
        let joined = self
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.path, e.message))
            .collect::<Vec<_>>()
            .join("; ");
        Err(ConfigError::Invalid(joined))
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> Result<ValidationResult, ConfigError> {
        let mut result = ValidationResult::default();

        Self::validate_browser(config, &mut result);
        Self::validate_recognition(config, &mut result);
        Self::validate_drag(config, &mut result);
        Self::validate_watch(config, &mut result);
        Self::validate_rules(config, &mut result);

        Ok(result)
    }

    fn validate_browser(config: &Config, result: &mut ValidationResult) {
        if !Self::is_http_url(&config.browser.endpoint) {
            result.add_error(ValidationError::new(
                "browser.endpoint",
                "endpoint must be an http:// or https:// URL",
            ));
        }
    }

    fn validate_recognition(config: &Config, result: &mut ValidationResult) {
        let recognition = &config.recognition;
        if !Self::is_http_url(&recognition.server_url) {
            result.add_error(ValidationError::new(
                "recognition.server_url",
                "server_url must be an http:// or https:// URL",
            ));
        }

        if recognition.timeout_secs == 0 {
            result.add_error(ValidationError::new(
                "recognition.timeout_secs",
                "timeout_secs must be greater than 0",
            ));
        }

        if recognition.client_version.is_empty() {
            result.add_warning(ValidationWarning::new(
                "recognition.client_version",
                "client_version is empty, the service may reject requests",
            ));
        }
    }

    fn validate_drag(config: &Config, result: &mut ValidationResult) {
        let drag = &config.drag;

        if drag.lock_ttl_ms == 0 {
            result.add_error(ValidationError::new(
                "drag.lock_ttl_ms",
                "lock_ttl_ms must be greater than 0",
            ));
        }

        if drag.tolerance_px < 0.0 {
            result.add_error(ValidationError::new(
                "drag.tolerance_px",
                "tolerance_px cannot be negative",
            ));
        }

        if drag.overshoot_px < 0.0 {
            result.add_error(ValidationError::new(
                "drag.overshoot_px",
                "overshoot_px cannot be negative",
            ));
        }

        if drag.stuck_limit == 0 {
            result.add_warning(ValidationWarning::new(
                "drag.stuck_limit",
                "stuck_limit is 0, a single unchanged reading ends the drag",
            ));
        }

        if drag.release_latency_max_ms >= drag.lock_ttl_ms {
            result.add_warning(ValidationWarning::new(
                "drag.release_latency_max_ms",
                "release latency can outlast the lock TTL",
            ));
        }

        let profile = &drag.profile;
        for (name, phase) in [
            ("fast", &profile.fast),
            ("medium", &profile.medium),
            ("slow", &profile.slow),
            ("fine", &profile.fine),
        ] {
            Self::validate_phase(name, phase, result);
        }
    }

    fn validate_phase(name: &str, phase: &PhaseConfig, result: &mut ValidationResult) {
        let path = format!("drag.profile.{name}");
        if phase.step_px < 0.0 {
            result.add_error(ValidationError::new(
                format!("{path}.step_px"),
                "step_px cannot be negative",
            ));
        }
        if phase.min_delay_ms < 0.0 {
            result.add_error(ValidationError::new(
                format!("{path}.min_delay_ms"),
                "min_delay_ms cannot be negative",
            ));
        }
        if phase.max_delay_ms < phase.min_delay_ms {
            result.add_error(ValidationError::new(
                format!("{path}.max_delay_ms"),
                "max_delay_ms must not be below min_delay_ms",
            ));
        }
    }

    fn validate_watch(config: &Config, result: &mut ValidationResult) {
        if config.watch.interval_ms == 0 {
            result.add_error(ValidationError::new(
                "watch.interval_ms",
                "interval_ms must be greater than 0",
            ));
        } else if config.watch.interval_ms < 100 {
            result.add_warning(ValidationWarning::new(
                "watch.interval_ms",
                "interval_ms below 100 polls the page very aggressively",
            ));
        }
    }

    fn validate_rules(config: &Config, result: &mut ValidationResult) {
        if config.rules.is_empty() {
            result.add_warning(ValidationWarning::new(
                "rules",
                "No rules configured, nothing will be watched",
            ));
        }

        let mut seen = HashSet::new();
        for (i, rule) in config.rules.iter().enumerate() {
            let path = format!("rules[{i}]");

            if rule.name.is_empty() {
                result.add_error(ValidationError::new(
                    format!("{path}.name"),
                    "Rule name cannot be empty",
                ));
            } else if !seen.insert(rule.name.as_str()) {
                result.add_warning(ValidationWarning::new(
                    format!("{path}.name"),
                    format!("Duplicate rule name '{}'", rule.name),
                ));
            }

            if rule.host.is_empty() {
                result.add_error(ValidationError::new(
                    format!("{path}.host"),
                    "host cannot be empty",
                ));
            }

            if rule.move_item.trim().is_empty() {
                result.add_error(ValidationError::new(
                    format!("{path}.move_item"),
                    "move_item selector cannot be empty",
                ));
            }

            match rule.kind {
                RuleKind::Puzzle => {
                    for (field, value) in [
                        ("big_image", &rule.big_image),
                        ("small_image", &rule.small_image),
                    ] {
                        if value.as_deref().is_none_or(|s| s.trim().is_empty()) {
                            result.add_error(ValidationError::new(
                                format!("{path}.{field}"),
                                format!("puzzle rules need a {field} selector"),
                            ));
                        }
                    }
                }
                RuleKind::Behavior => {
                    if rule.big_image.is_some() || rule.small_image.is_some() {
                        result.add_warning(ValidationWarning::new(
                            path.clone(),
                            "Image selectors are ignored for behavior rules",
                        ));
                    }
                }
            }
        }
    }

    fn is_http_url(value: &str) -> bool {
        Url::parse(value)
            .map(|url| matches!(url.scheme(), "http" | "https"))
            .unwrap_or(false)
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
