use std::sync::{Arc, OnceLock};

use arc_swap::ArcSwap;

use super::StaticConfig;
use crate::errors::Result;

static CONFIG: OnceLock<ArcSwap<StaticConfig>> = OnceLock::new();

/// Get the global configuration instance
///
/// Falls back to defaults when `init_config` was never called
/// (library use and tests).
pub fn get_config() -> Arc<StaticConfig> {
    CONFIG
        .get_or_init(|| ArcSwap::from_pointee(StaticConfig::default()))
        .load_full()
}

/// Initialize the global configuration
///
/// Loads configuration from `path` (default "config.toml").
/// If the file doesn't exist, uses in-memory defaults plus environment overrides.
/// An unparsable file or override leaves the global untouched and returns the error.
///
/// # Examples
/// ```no_run
/// use ipgeo::config::init_config;
/// init_config(Some("/etc/ipgeo/config.toml")).expect("invalid configuration");
/// ```
pub fn init_config(path: Option<&str>) -> Result<()> {
    let loaded = StaticConfig::load(path)?;
    CONFIG
        .get_or_init(|| ArcSwap::from_pointee(StaticConfig::default()))
        .store(Arc::new(loaded));
    Ok(())
}
