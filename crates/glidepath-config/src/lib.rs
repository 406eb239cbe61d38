//! # Glidepath Config
//!
//! TOML configuration for the Glidepath watcher: browser endpoint,
//! recognition service, drag engine tuning, watch cadence and site rules.

mod error;
mod loader;
mod schema;
mod validator;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::*;
pub use validator::{ConfigValidator, ValidationError, ValidationResult, ValidationWarning};
