//! # Runtime Configuration Module
//!
//! Environment-variable driven switches for the resolution and discovery engine.
//!
//! ## Environment Variables
//!
//! ### `DECLAREST_RESOLVER_CACHE`
//!
//! Whether reader/writer resolutions are memoised per `(type, media type, range)`.
//! Accepts `on`/`off`, `true`/`false`, `1`/`0`, `yes`/`no`.
//!
//! Default: `on`
//!
//! ### `DECLAREST_IMPLICIT_OPTIONS`
//!
//! Whether [`crate::metadata::build_application`] adds an `OPTIONS` method to every
//! resource that does not declare one, answered by the introspection executor.
//!
//! Default: `on`
//!
//! ## Usage
//!
//! ```rust
//! use declarest::runtime_config::RuntimeConfig;
//!
//! let config = RuntimeConfig::from_env();
//! println!("resolver cache: {}", config.resolver_cache);
//! ```

use std::env;

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Memoise codec resolutions (default: on)
    pub resolver_cache: bool,
    /// Add an `OPTIONS` method to resources lacking one (default: on)
    pub implicit_options: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            resolver_cache: true,
            implicit_options: true,
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from environment variables.
    ///
    /// Unrecognised values fall back to the default.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        RuntimeConfig {
            resolver_cache: flag("DECLAREST_RESOLVER_CACHE", defaults.resolver_cache),
            implicit_options: flag("DECLAREST_IMPLICIT_OPTIONS", defaults.implicit_options),
        }
    }
}

fn flag(name: &str, default: bool) -> bool {
    match env::var(name) {
        Ok(val) => parse_flag(&val).unwrap_or(default),
        Err(_) => default,
    }
}

pub(crate) fn parse_flag(val: &str) -> Option<bool> {
    match val.trim().to_ascii_lowercase().as_str() {
        "1" | "on" | "true" | "yes" => Some(true),
        "0" | "off" | "false" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag_variants() {
        assert_eq!(parse_flag("ON"), Some(true));
        assert_eq!(parse_flag(" yes "), Some(true));
        assert_eq!(parse_flag("0"), Some(false));
        assert_eq!(parse_flag("false"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn test_defaults_enable_everything() {
        let config = RuntimeConfig::default();
        assert!(config.resolver_cache);
        assert!(config.implicit_options);
    }
}
