//! Configuration and data directory management.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default upload ceiling in megabytes.
pub const DEFAULT_MAX_UPLOAD_MB: u64 = 10;

/// Paths to all DocOps data directories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataPaths {
    /// Root data directory (e.g., `data/`).
    pub root: PathBuf,
    /// SQLite database directory (`data/db/`).
    pub db: PathBuf,
    /// LLM configuration (`data/llm-config.json`).
    pub llm_config_file: PathBuf,
}

impl DataPaths {
    /// Create data paths from a root directory. Creates directories if needed.
    pub fn new(root: impl AsRef<Path>) -> std::io::Result<Self> {
        let root = root.as_ref().to_path_buf();
        let paths = Self {
            db: root.join("db"),
            llm_config_file: root.join("llm-config.json"),
            root,
        };
        std::fs::create_dir_all(&paths.db)?;
        Ok(paths)
    }
}

/// Top-level DocOps configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocOpsConfig {
    /// HTTP server port.
    pub port: u16,
    /// Data directory paths.
    pub data_paths: DataPaths,
    /// `MOCK_AI=true` forces the heuristic analyzer even when a provider is configured.
    pub mock_ai: bool,
    /// Maximum accepted upload size in megabytes.
    pub max_upload_mb: u64,
}

impl DocOpsConfig {
    /// Create configuration from environment and defaults.
    pub fn from_env(data_dir: impl AsRef<Path>) -> std::io::Result<Self> {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);

        let mock_ai = std::env::var("MOCK_AI")
            .map(|v| v.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        let max_upload_mb = std::env::var("DOCOPS_MAX_UPLOAD_MB")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MAX_UPLOAD_MB);

        let data_paths = DataPaths::new(data_dir)?;

        Ok(Self {
            port,
            data_paths,
            mock_ai,
            max_upload_mb,
        })
    }

    /// Upload ceiling in bytes.
    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_mb * 1024 * 1024
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_data_paths_creates_db_dir() {
        let dir = TempDir::new().unwrap();
        let paths = DataPaths::new(dir.path().join("data")).unwrap();
        assert!(paths.db.is_dir());
        assert!(paths.llm_config_file.ends_with("llm-config.json"));
    }

    #[test]
    fn test_max_upload_bytes() {
        let dir = TempDir::new().unwrap();
        let config = DocOpsConfig {
            port: 3000,
            data_paths: DataPaths::new(dir.path()).unwrap(),
            mock_ai: false,
            max_upload_mb: 10,
        };
        assert_eq!(config.max_upload_bytes(), 10 * 1024 * 1024);
    }
}
