//! Application directory paths for savetick.
//!
//! Uses the [`dirs`] crate for platform-appropriate directory resolution.
//! The config directory can be overridden for testing or custom deployments
//! with the `SAVETICK_CONFIG_DIR` environment variable.

use std::path::PathBuf;

/// Application config directory.
///
/// Holds the persisted refresh-rate record. Resolves to
/// `dirs::config_dir()/savetick/` by default; override with the
/// `SAVETICK_CONFIG_DIR` environment variable.
#[must_use]
pub fn config_dir() -> PathBuf {
    if let Some(override_dir) = std::env::var_os("SAVETICK_CONFIG_DIR") {
        return PathBuf::from(override_dir);
    }
    dirs::config_dir()
        .map(|d| d.join("savetick"))
        .unwrap_or_else(|| PathBuf::from("/tmp/savetick-config"))
}

/// Default path of the persisted refresh-rate record.
#[must_use]
pub fn refresh_rate_path() -> PathBuf {
    config_dir().join("refresh.toml")
}
