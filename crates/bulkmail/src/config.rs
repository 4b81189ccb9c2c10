//! Configuration file.
//!
//! Loaded from `$BULKMAIL_CONFIG` or `<config dir>/bulkmail/config.json`.
//! A missing file means defaults; command-line flags override both.

use std::path::{Path, PathBuf};

use anyhow::Context;
use bulkmail_api::{DEFAULT_MAIL_API, DEFAULT_USER_API, Endpoints};
use serde::{Deserialize, Serialize};

/// Default log filter.
pub const DEFAULT_LOG_LEVEL: &str = "bulkmail=info,bulkmail_core=info";

/// Session used when none is named.
pub const DEFAULT_SESSION: &str = "default";

/// Persistent settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the user API.
    pub user_api: String,
    /// Base URL of the mail API.
    pub mail_api: String,
    /// Session name; each session has its own draft and token.
    pub session: String,
    /// Session database path; defaults under the data directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<PathBuf>,
    /// Log filter used when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user_api: DEFAULT_USER_API.to_string(),
            mail_api: DEFAULT_MAIL_API.to_string(),
            session: DEFAULT_SESSION.to_string(),
            database: None,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl Config {
    /// Endpoints for the API client.
    ///
    /// # Errors
    ///
    /// Returns an error if either URL is invalid.
    pub fn endpoints(&self) -> anyhow::Result<Endpoints> {
        Endpoints::new(&self.user_api, &self.mail_api).context("Invalid API URL in configuration")
    }

    /// Session database path.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.database.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("bulkmail")
                .join("session.db")
        })
    }
}

/// Default configuration file location.
#[must_use]
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("bulkmail")
        .join("config.json")
}

/// Loads the configuration at `path`, or defaults if there is no file.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub async fn load(path: &Path) -> anyhow::Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    serde_json::from_str(&contents).with_context(|| format!("Invalid config {}", path.display()))
}

/// Writes the configuration to `path`, creating parent directories.
///
/// # Errors
///
/// Returns an error if the directory or file cannot be written.
pub async fn save(config: &Config, path: &Path) -> anyhow::Result<()> {
    if let Some(dir) = path.parent() {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    let contents = serde_json::to_string_pretty(config)?;
    tokio::fs::write(path, contents)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    tracing::info!("Config saved to {:?}", path);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load(&dir.path().join("absent.json")).await.unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.session, "default");
    }

    #[tokio::test]
    async fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        tokio::fs::write(&path, r#"{"mail_api":"https://mail.example.com/api"}"#)
            .await
            .unwrap();

        let config = load(&path).await.unwrap();
        assert_eq!(config.mail_api, "https://mail.example.com/api");
        assert_eq!(config.user_api, DEFAULT_USER_API);
    }

    #[tokio::test]
    async fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            session: "work".to_string(),
            database: Some(dir.path().join("s.db")),
            ..Config::default()
        };

        save(&config, &path).await.unwrap();
        assert_eq!(load(&path).await.unwrap(), config);
    }

    #[tokio::test]
    async fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        tokio::fs::write(&path, "{").await.unwrap();
        assert!(load(&path).await.is_err());
    }

    #[test]
    fn explicit_database_wins() {
        let config = Config {
            database: Some(PathBuf::from("/tmp/x.db")),
            ..Config::default()
        };
        assert_eq!(config.database_path(), PathBuf::from("/tmp/x.db"));
        assert!(Config::default().database_path().ends_with("bulkmail/session.db"));
    }
}
