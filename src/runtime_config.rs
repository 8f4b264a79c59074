//! # Runtime Configuration Module
//!
//! Environment-variable configuration for the binding layer's runtime behaviour.
//!
//! ## Environment Variables
//!
//! ### `BRRTBIND_KEY_CACHE`
//!
//! Enables the process-wide minified key table cache. `off`, `false`, `0` or `no`
//! disable it; anything else (or unset) leaves it enabled.
//!
//! With the cache disabled every minified call rebuilds the key table of each schema
//! it touches. Output is identical either way since tables are deterministic.
//!
//! ## Usage
//!
//! ```rust
//! use brrtbind::runtime_config::RuntimeConfig;
//!
//! let config = RuntimeConfig::from_env();
//! println!("Key table cache enabled: {}", config.key_cache);
//! ```
//!
//! Logging variables (`BRRTBIND_LOG_LEVEL`, `BRRTBIND_LOG_FORMAT`) are read by
//! [`crate::logging::LogConfig`].

use std::env;

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Whether the process-wide key table cache is active (default: true)
    pub key_cache: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self { key_cache: true }
    }
}

impl RuntimeConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let key_cache = match env::var("BRRTBIND_KEY_CACHE") {
            Ok(val) => parse_switch(&val),
            Err(_) => true,
        };
        RuntimeConfig { key_cache }
    }
}

fn parse_switch(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "off" | "false" | "0" | "no"
    )
}
