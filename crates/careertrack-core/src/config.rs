//! Configuration model.
//!
//! Loaded from `config.toml` by the infrastructure layer; every field has a
//! default so a missing or partial file is valid.

use crate::application::DEFAULT_FOLLOW_UP_AFTER_DAYS;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default bound on a single remote write, and on the wait for the first
/// snapshot of a new subscription.
pub const DEFAULT_REMOTE_TIMEOUT_SECS: u64 = 10;

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct AppConfig {
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Behaviour of the sync manager.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct SyncConfig {
    /// Days without contact before an open application needs a follow-up.
    pub follow_up_after_days: u32,
    /// Seconds before a remote write, or the first snapshot, is given up on.
    pub remote_timeout_secs: u64,
}

impl SyncConfig {
    pub fn remote_timeout(&self) -> Duration {
        Duration::from_secs(self.remote_timeout_secs)
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            follow_up_after_days: DEFAULT_FOLLOW_UP_AFTER_DAYS,
            remote_timeout_secs: DEFAULT_REMOTE_TIMEOUT_SECS,
        }
    }
}

/// Where the guest blob lives.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct StorageConfig {
    /// Overrides the default guest file under the data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guest_file: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.sync.follow_up_after_days, 7);
        assert_eq!(config.sync.remote_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_partial_sync_section() {
        let config: AppConfig = toml::from_str(
            r#"
            [sync]
            follow_up_after_days = 14

            [storage]
            guest_file = "/tmp/guest.json"
            "#,
        )
        .unwrap();
        assert_eq!(config.sync.follow_up_after_days, 14);
        assert_eq!(config.sync.remote_timeout_secs, DEFAULT_REMOTE_TIMEOUT_SECS);
        assert_eq!(
            config.storage.guest_file,
            Some(PathBuf::from("/tmp/guest.json"))
        );
    }
}
