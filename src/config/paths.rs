//! Path resolution for poncik configuration and data files.
//!
//! All poncik data is stored in `~/.poncik/`:
//! - `config.yaml` - Main configuration file
//! - `poncik.db` - SQLite database for queued settlements and local state
//! - `poncik.log` - Log file used while the TUI owns the terminal

use std::path::PathBuf;

use crate::error::PoncikError;

/// Paths to poncik configuration and data files.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Root directory: `~/.poncik/`
    pub root: PathBuf,
    /// Config file: `~/.poncik/config.yaml`
    pub config_file: PathBuf,
    /// Database file: `~/.poncik/poncik.db`
    pub database: PathBuf,
    /// Log file: `~/.poncik/poncik.log`
    pub log_file: PathBuf,
}

impl Paths {
    /// Create paths based on the user's home directory.
    ///
    /// `PONCIK_HOME` takes precedence over `$HOME/.poncik`.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self, PoncikError> {
        if let Ok(custom) = std::env::var("PONCIK_HOME") {
            return Ok(Self::with_root(PathBuf::from(custom)));
        }

        let home = std::env::var("HOME").map_err(|_| {
            PoncikError::Config("Could not determine home directory".to_string())
        })?;

        Ok(Self::with_root(PathBuf::from(home).join(".poncik")))
    }

    /// Create paths with a custom root directory (useful for testing).
    #[must_use]
    pub fn with_root(root: PathBuf) -> Self {
        Self {
            config_file: root.join("config.yaml"),
            database: root.join("poncik.db"),
            log_file: root.join("poncik.log"),
            root,
        }
    }

    /// Ensure the root directory exists.
    ///
    /// # Errors
    ///
    /// Returns an error if directory creation fails.
    pub fn ensure_dirs(&self) -> Result<(), PoncikError> {
        if !self.root.exists() {
            std::fs::create_dir_all(&self.root).map_err(|e| {
                PoncikError::Config(format!(
                    "Failed to create directory {}: {e}",
                    self.root.display()
                ))
            })?;
        }

        Ok(())
    }
}

impl Default for Paths {
    fn default() -> Self {
        Self::new().unwrap_or_else(|_| Self::with_root(PathBuf::from(".poncik")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_paths_with_root() {
        let root = PathBuf::from("/tmp/test-poncik");
        let paths = Paths::with_root(root.clone());

        assert_eq!(paths.root, root);
        assert_eq!(paths.config_file, root.join("config.yaml"));
        assert_eq!(paths.database, root.join("poncik.db"));
        assert_eq!(paths.log_file, root.join("poncik.log"));
    }

    #[test]
    fn test_ensure_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let paths = Paths::with_root(temp_dir.path().join("nested"));

        paths.ensure_dirs().unwrap();

        assert!(paths.root.exists());
    }
}
