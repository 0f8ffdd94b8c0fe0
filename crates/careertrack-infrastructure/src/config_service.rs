//! Configuration service implementation.
//!
//! Loads the application configuration from `config.toml`
//! (`~/.config/careertrack/config.toml` by default).

use crate::paths::CareerTrackPaths;
use careertrack_core::config::AppConfig;
use careertrack_core::error::{Result, TrackerError};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// Configuration service that loads and caches the configuration.
///
/// A missing file yields the defaults; a malformed one is an error rather
/// than being silently replaced.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
    /// Cached configuration loaded from file.
    config: Arc<RwLock<Option<AppConfig>>>,
}

impl ConfigService {
    /// Creates a service for the config file under `paths`.
    pub fn new(paths: &CareerTrackPaths) -> Result<Self> {
        Ok(Self::with_path(paths.config_file()?))
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self {
            path,
            config: Arc::new(RwLock::new(None)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Gets the configuration, loading from file if not cached.
    ///
    /// # Errors
    ///
    /// `TrackerError::Config` when the file exists but cannot be read or parsed.
    pub fn get_config(&self) -> Result<AppConfig> {
        if let Ok(read_lock) = self.config.read()
            && let Some(cached) = read_lock.as_ref()
        {
            return Ok(cached.clone());
        }

        let loaded = Self::load_config(&self.path)?;

        if let Ok(mut write_lock) = self.config.write() {
            *write_lock = Some(loaded.clone());
        }

        Ok(loaded)
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        if let Ok(mut write_lock) = self.config.write() {
            *write_lock = None;
        }
    }

    fn load_config(path: &Path) -> Result<AppConfig> {
        if !path.exists() {
            tracing::debug!("[ConfigService] No config at {:?}, using defaults", path);
            return Ok(AppConfig::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| TrackerError::config(format!("Failed to read {:?}: {}", path, e)))?;
        toml::from_str(&content)
            .map_err(|e| TrackerError::config(format!("Failed to parse {:?}: {}", path, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let service = ConfigService::with_path(temp_dir.path().join("config.toml"));
        assert_eq!(service.get_config().unwrap(), AppConfig::default());
    }

    #[test]
    fn test_loads_and_caches() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[sync]\nfollow_up_after_days = 3\n").unwrap();
        let service = ConfigService::with_path(path.clone());
        assert_eq!(service.get_config().unwrap().sync.follow_up_after_days, 3);

        std::fs::write(&path, "[sync]\nfollow_up_after_days = 5\n").unwrap();
        assert_eq!(service.get_config().unwrap().sync.follow_up_after_days, 3);

        service.invalidate_cache();
        assert_eq!(service.get_config().unwrap().sync.follow_up_after_days, 5);
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[sync\nfollow_up_after_days = ").unwrap();
        let service = ConfigService::with_path(path);
        assert!(matches!(
            service.get_config(),
            Err(TrackerError::Config(_))
        ));
    }
}
