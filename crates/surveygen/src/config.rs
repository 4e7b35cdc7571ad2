//! Configuration file support for surveygen.
//!
//! Loads `surveygen.toml` from the working directory, falling back to
//! `config.toml` in the user's config directory.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use surveygen_core::DEFAULT_SHARE_BASE_URL;
use surveygen_engine::SignalSet;

/// The project config file name
pub const CONFIG_FILE_NAME: &str = "surveygen.toml";

/// Port `serve` binds when neither the flag nor the config sets one
pub const DEFAULT_PORT: u16 = 3100;

/// Configuration loaded from `surveygen.toml`
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// SQLite database file
    pub database: Option<PathBuf>,
    /// Host used to build share links
    pub share_base_url: Option<String>,
    /// Default tracing level
    pub log_level: Option<String>,
    /// Signals used by `new` when a flag is omitted
    #[serde(default)]
    pub defaults: DefaultsConfig,
    /// `serve` settings
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct DefaultsConfig {
    pub industry: Option<String>,
    pub use_case: Option<String>,
    pub role: Option<String>,
    pub team_type: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    pub port: Option<u16>,
}

impl Config {
    /// Load configuration from the working directory.
    ///
    /// Returns:
    /// - `Ok(Some(config))` if file exists and parses successfully
    /// - `Ok(None)` if file does not exist
    /// - `Err(...)` if file exists but fails to parse (hard error)
    pub fn load(working_dir: &Path) -> Result<Option<Self>> {
        let config_path = working_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            return Ok(None);
        }

        Self::load_from(&config_path).map(Some)
    }

    /// Load configuration from the user's config directory.
    pub fn load_global() -> Result<Option<Self>> {
        let Some(config_path) = Self::global_path() else {
            return Ok(None);
        };

        if !config_path.exists() {
            return Ok(None);
        }

        Self::load_from(&config_path).map(Some)
    }

    /// Load a specific file. The file must exist.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;

        Ok(config)
    }

    /// Resolve the effective configuration.
    /// Priority: explicit path > working directory > global > defaults
    pub fn resolve(explicit: Option<&Path>, working_dir: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.exists() {
                bail!("Config file not found: {}", path.display());
            }
            return Self::load_from(path);
        }

        if let Some(config) = Self::load(working_dir)? {
            return Ok(config);
        }

        Ok(Self::load_global()?.unwrap_or_default())
    }

    /// `~/.config/surveygen/config.toml` on Linux.
    pub fn global_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("surveygen").join("config.toml"))
    }

    pub fn share_base_url(&self) -> &str {
        self.share_base_url
            .as_deref()
            .unwrap_or(DEFAULT_SHARE_BASE_URL)
    }

    pub fn port(&self) -> u16 {
        self.server.port.unwrap_or(DEFAULT_PORT)
    }

    /// Signals `new` starts from before flags are applied.
    pub fn default_signals(&self) -> SignalSet {
        let defaults = &self.defaults;
        SignalSet {
            industry: Some(defaults.industry.as_deref().unwrap_or("Technology").to_string()),
            use_case: Some(
                defaults
                    .use_case
                    .as_deref()
                    .unwrap_or("Employee Engagement")
                    .to_string(),
            ),
            role: Some(defaults.role.as_deref().unwrap_or("HR Manager").to_string()),
            team_type: Some(defaults.team_type.as_deref().unwrap_or("Team").to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_returns_none() {
        let dir = TempDir::new().unwrap();
        assert!(Config::load(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_full_config_parses() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"
database = "surveys.db"
share_base_url = "https://surveys.example.com"
log_level = "debug"

[defaults]
industry = "Healthcare"
use_case = "Market Research"

[server]
port = 8080
"#,
        )
        .unwrap();

        let config = Config::load(dir.path()).unwrap().unwrap();
        assert_eq!(config.database, Some(PathBuf::from("surveys.db")));
        assert_eq!(config.share_base_url(), "https://surveys.example.com");
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.port(), 8080);

        let signals = config.default_signals();
        assert_eq!(signals.industry.as_deref(), Some("Healthcare"));
        assert_eq!(signals.use_case.as_deref(), Some("Market Research"));
        assert_eq!(signals.role.as_deref(), Some("HR Manager"));
        assert_eq!(signals.team_type.as_deref(), Some("Team"));
    }

    #[test]
    fn test_unknown_field_is_an_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "tone = \"casual\"\n").unwrap();
        assert!(Config::load(dir.path()).is_err());
    }

    #[test]
    fn test_unparseable_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "[server\nport = ").unwrap();
        assert!(Config::load(dir.path()).is_err());
    }

    #[test]
    fn test_explicit_path_must_exist() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(Config::resolve(Some(&missing), dir.path()).is_err());
    }

    #[test]
    fn test_explicit_path_wins_over_working_dir() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "log_level = \"warn\"\n").unwrap();
        let explicit = dir.path().join("other.toml");
        std::fs::write(&explicit, "log_level = \"trace\"\n").unwrap();

        let config = Config::resolve(Some(&explicit), dir.path()).unwrap();
        assert_eq!(config.log_level.as_deref(), Some("trace"));
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::default();
        assert_eq!(config.share_base_url(), DEFAULT_SHARE_BASE_URL);
        assert_eq!(config.port(), DEFAULT_PORT);
        assert_eq!(
            config.default_signals().use_case.as_deref(),
            Some("Employee Engagement")
        );
    }
}
