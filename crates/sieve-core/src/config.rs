//! # Process-Wide Configuration
//!
//! The only global knob is a fallback error map consulted after every
//! check-, schema-, and parse-level map has declined. It is guarded by a
//! `parking_lot::RwLock`, which never poisons: a panicking writer cannot
//! leave the configuration unusable.

use parking_lot::RwLock;

use crate::error_map::ErrorMap;

/// Global configuration snapshot.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Fallback error map applied before built-in messages.
    pub error_map: Option<ErrorMap>,
}

static CONFIG: RwLock<Config> = parking_lot::const_rwlock(Config { error_map: None });

/// Replace the global configuration.
pub fn set(config: Config) {
    *CONFIG.write() = config;
}

/// Snapshot of the current global configuration.
pub fn get() -> Config {
    CONFIG.read().clone()
}

/// Install a global fallback error map.
pub fn set_error_map(map: ErrorMap) {
    CONFIG.write().error_map = Some(map);
}

/// The global fallback error map, if one is installed.
pub fn error_map() -> Option<ErrorMap> {
    CONFIG.read().error_map.clone()
}

/// Restore the default configuration.
pub fn reset() {
    set(Config::default());
}
