//! Configuration loader.

use std::fs;
use std::path::Path;

use regex::Regex;

use crate::error::ConfigError;
use crate::schema::Config;

/// Configuration loader with environment variable substitution.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let content = fs::read_to_string(path)?;
        Self::load_str(&content)
    }

    /// Load configuration from a string.
    pub fn load_str(content: &str) -> Result<Config, ConfigError> {
        let expanded = Self::expand_env_vars(content)?;
        let config: Config = toml::from_str(&expanded)?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Config, ConfigError> {
        match Self::load(path) {
            Err(ConfigError::NotFound(_)) => Ok(Config::default()),
            other => other,
        }
    }

    /// Expand environment variables in the format `${VAR}`.
    fn expand_env_vars(content: &str) -> Result<String, ConfigError> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ConfigError::Invalid(e.to_string()))?;

        let mut result = content.to_string();
        for cap in re.captures_iter(content) {
            let var_name = &cap[1];
            let var_value = std::env::var(var_name)
                .map_err(|_| ConfigError::EnvVarNotSet(var_name.to_string()))?;
            result = result.replace(&cap[0], &var_value);
        }

        Ok(result)
    }

    /// Expand shell-style paths (e.g., `~/.glidepath`).
    pub fn expand_path(path: &str) -> String {
        shellexpand::tilde(path).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{PointerDispatch, RuleKind};
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_empty_config() {
        let config = ConfigLoader::load_str("").unwrap();
        assert_eq!(config.watch.interval_ms, 500);
        assert_eq!(config.drag.overshoot_px, 5.0);
    }

    #[test]
    fn test_load_full_config() {
        let content = r##"
            [browser]
            endpoint = "http://127.0.0.1:9333"
            page_url_contains = "login"
            pointer_dispatch = "input"

            [recognition]
            server_url = "https://ocr.example.com"
            timeout_secs = 10
            result_ttl_secs = 600

            [drag]
            overshoot_px = 4
            lock_ttl_ms = 5000
            seed = 42

            [drag.profile]
            tiny_delay_factor = 4

            [drag.profile.fine]
            step_px = 1
            min_delay_ms = 15
            max_delay_ms = 25

            [watch]
            interval_ms = 250
            show_notices = false

            [[rules]]
            name = "shop-login"
            host = "shop.example.com"
            kind = "puzzle"
            big_image = "#bg"
            small_image = "#piece"
            move_item = ".slider-btn"

            [[rules]]
            name = "forum"
            host = "forum.example.org"
            kind = "behavior"
            move_item = "#nc_1_n1z"
        "##;
        let config = ConfigLoader::load_str(content).unwrap();

        assert_eq!(config.browser.endpoint, "http://127.0.0.1:9333");
        assert_eq!(config.browser.page_url_contains.as_deref(), Some("login"));
        assert_eq!(config.browser.pointer_dispatch, PointerDispatch::Input);
        assert_eq!(config.recognition.timeout_secs, 10);
        assert_eq!(config.recognition.result_ttl_secs, Some(600));
        assert_eq!(config.recognition.client_version, "6.5");
        assert_eq!(config.drag.overshoot_px, 4.0);
        assert_eq!(config.drag.lock_ttl_ms, 5000);
        assert_eq!(config.drag.seed, Some(42));
        assert_eq!(config.drag.stuck_limit, 5);
        assert_eq!(config.drag.profile.tiny_delay_factor, 4.0);
        assert_eq!(config.drag.profile.fine.step_px, 1.0);
        assert_eq!(config.drag.profile.fast.step_px, 5.0);
        assert_eq!(config.watch.interval_ms, 250);
        assert!(!config.watch.show_notices);
        assert_eq!(config.watch.puzzle_dedupe_secs, 3600);

        assert_eq!(config.rules.len(), 2);
        assert_eq!(config.rules[0].kind, RuleKind::Puzzle);
        assert_eq!(config.rules[0].big_image.as_deref(), Some("#bg"));
        assert_eq!(config.rules[1].kind, RuleKind::Behavior);
        assert_eq!(config.rules[1].small_image, None);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[watch]").unwrap();
        writeln!(file, "interval_ms = 1000").unwrap();

        let config = ConfigLoader::load(file.path()).unwrap();
        assert_eq!(config.watch.interval_ms, 1000);
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = ConfigLoader::load(Path::new("/nonexistent/path/glidepath.toml"));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config =
            ConfigLoader::load_or_default(Path::new("/nonexistent/path/glidepath.toml")).unwrap();
        assert_eq!(config.browser.endpoint, "http://localhost:9222");
    }

    #[test]
    fn test_load_invalid_toml() {
        let result = ConfigLoader::load_str("invalid = [unclosed");
        assert!(matches!(result, Err(ConfigError::TomlParse(_))));
    }

    #[test]
    fn test_unknown_rule_kind() {
        let content = r#"
            [[rules]]
            name = "x"
            host = "h"
            kind = "rotate"
            move_item = ".b"
        "#;
        assert!(ConfigLoader::load_str(content).is_err());
    }

    #[test]
    fn test_expand_env_vars() {
        // SAFETY: unique test-only variable
        unsafe {
            std::env::set_var("GLIDEPATH_TEST_OCR_URL", "https://ocr.internal");
        }
        let content = "[recognition]\nserver_url = \"${GLIDEPATH_TEST_OCR_URL}\"";
        let config = ConfigLoader::load_str(content).unwrap();
        assert_eq!(config.recognition.server_url, "https://ocr.internal");
        unsafe {
            std::env::remove_var("GLIDEPATH_TEST_OCR_URL");
        }
    }

    #[test]
    fn test_expand_env_vars_not_set() {
        let content = "value = \"${GLIDEPATH_NONEXISTENT_VAR_12345}\"";
        let result = ConfigLoader::expand_env_vars(content);
        assert!(matches!(result, Err(ConfigError::EnvVarNotSet(_))));
    }

    #[test]
    fn test_expand_env_vars_no_vars() {
        let content = "value = \"no variables here\"";
        let expanded = ConfigLoader::expand_env_vars(content).unwrap();
        assert_eq!(expanded, content);
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let expanded = ConfigLoader::expand_path("~/glidepath.toml");
        assert!(!expanded.starts_with('~'));
        assert!(expanded.ends_with("/glidepath.toml"));
    }

    #[test]
    fn test_expand_path_no_tilde() {
        let path = "/etc/glidepath.toml";
        assert_eq!(ConfigLoader::expand_path(path), path);
    }
}
