//! Unified path management for careertrack files.
//!
//! Platform directories come from the `dirs` crate (XDG on Linux, the
//! platform conventions elsewhere). A base directory can be supplied instead,
//! which tests and the `--data-dir` CLI flag use.

use std::path::PathBuf;

const APP_DIR: &str = "careertrack";

/// File name of the guest record blob.
pub const GUEST_STORAGE_FILE: &str = "guest_applications.json";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Platform directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

impl From<PathError> for careertrack_core::TrackerError {
    fn from(err: PathError) -> Self {
        careertrack_core::TrackerError::config(err.to_string())
    }
}

/// Path resolution for careertrack.
///
/// # Directory Structure
///
/// ```text
/// ~/.config/careertrack/            # Config directory
/// └── config.toml                   # Application configuration
///
/// ~/.local/share/careertrack/       # Data directory
/// └── guest_applications.json       # Guest record blob
/// ```
///
/// With a base override both directories collapse into the base.
#[derive(Debug, Clone, Default)]
pub struct CareerTrackPaths {
    base: Option<PathBuf>,
}

impl CareerTrackPaths {
    /// Creates a resolver. `None` uses the platform directories.
    pub fn new(base: Option<PathBuf>) -> Self {
        Self { base }
    }

    /// Returns the careertrack configuration directory.
    ///
    /// # Returns
    ///
    /// - `Ok(PathBuf)`: Path to config directory (e.g., `~/.config/careertrack/`)
    /// - `Err(PathError::HomeDirNotFound)`: Could not determine directory
    pub fn config_dir(&self) -> Result<PathBuf, PathError> {
        if let Some(base) = &self.base {
            return Ok(base.clone());
        }
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the careertrack data directory.
    ///
    /// # Returns
    ///
    /// - `Ok(PathBuf)`: Path to data directory (e.g., `~/.local/share/careertrack/`)
    /// - `Err(PathError::HomeDirNotFound)`: Could not determine directory
    pub fn data_dir(&self) -> Result<PathBuf, PathError> {
        if let Some(base) = &self.base {
            return Ok(base.clone());
        }
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the path to the main configuration file.
    pub fn config_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("config.toml"))
    }

    /// Returns the path to the guest record blob.
    pub fn guest_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.data_dir()?.join(GUEST_STORAGE_FILE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_override() {
        let paths = CareerTrackPaths::new(Some(PathBuf::from("/tmp/ct")));
        assert_eq!(
            paths.config_file().unwrap(),
            PathBuf::from("/tmp/ct/config.toml")
        );
        assert_eq!(
            paths.guest_file().unwrap(),
            PathBuf::from("/tmp/ct/guest_applications.json")
        );
    }

    #[test]
    fn test_platform_dirs_end_with_app_dir() {
        let paths = CareerTrackPaths::new(None);
        // Sandboxes without a home directory have nothing to check.
        if let Ok(config_dir) = paths.config_dir() {
            assert!(config_dir.ends_with(APP_DIR));
        }
        if let Ok(guest_file) = paths.guest_file() {
            assert!(guest_file.ends_with(GUEST_STORAGE_FILE));
        }
    }
}
