use careertrack_core::application::DEFAULT_FOLLOW_UP_AFTER_DAYS;
use careertrack_core::config::{DEFAULT_REMOTE_TIMEOUT_SECS, SyncConfig};
use std::time::Duration;

/// Tunables for [`SyncManager`](super::SyncManager).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOptions {
    /// Days without contact before a record needs a follow-up.
    pub follow_up_after_days: u32,
    /// Upper bound for remote writes and for the first snapshot of a
    /// subscription.
    pub remote_timeout: Duration,
}

impl SyncOptions {
    pub fn with_remote_timeout(mut self, timeout: Duration) -> Self {
        self.remote_timeout = timeout;
        self
    }

    pub fn with_follow_up_after_days(mut self, days: u32) -> Self {
        self.follow_up_after_days = days;
        self
    }
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            follow_up_after_days: DEFAULT_FOLLOW_UP_AFTER_DAYS,
            remote_timeout: Duration::from_secs(DEFAULT_REMOTE_TIMEOUT_SECS),
        }
    }
}

impl From<&SyncConfig> for SyncOptions {
    fn from(config: &SyncConfig) -> Self {
        Self {
            follow_up_after_days: config.follow_up_after_days,
            remote_timeout: config.remote_timeout(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_config_defaults() {
        assert_eq!(SyncOptions::default(), SyncOptions::from(&SyncConfig::default()));
    }
}
