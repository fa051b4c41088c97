//! Runtime configuration.
//!
//! # Responsibility
//! - Define every tunable of the catalog with a usable default.
//! - Layer sources: TOML file, then `BPCATALOG_*` environment variables.
//!   Command-line flags are applied last by the binary.
//!
//! # Invariants
//! - A missing default config file is not an error; an explicitly named one is.
//! - Unknown TOML keys are rejected so typos surface early.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Prefix shared by every environment override.
pub const ENV_PREFIX: &str = "BPCATALOG_";

const APP_DIR_NAME: &str = "bpcatalog";
const CONFIG_FILE_NAME: &str = "config.toml";

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration load failure.
#[derive(Debug)]
pub enum ConfigError {
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    /// An environment override could not be parsed.
    InvalidValue { key: String, value: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "invalid config `{}`: {source}", path.display())
            }
            Self::InvalidValue { key, value } => {
                write!(f, "invalid value `{value}` for `{key}`")
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::InvalidValue { .. } => None,
        }
    }
}

/// Hosting API target for contributions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GitHubConfig {
    pub api_base_url: String,
    pub owner: String,
    pub repo: String,
    /// Dataset path inside the upstream repository.
    pub data_file: String,
    pub base_branch: String,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.github.com".to_string(),
            owner: "david-j-cox".to_string(),
            repo: "catalog-of-principles-and-processes".to_string(),
            data_file: "data.json".to_string(),
            base_branch: "main".to_string(),
            user_agent: format!("bpcatalog/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: 30,
        }
    }
}

impl GitHubConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Full catalog configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogConfig {
    /// Canonical dataset: file path or `http(s)://` URL.
    pub dataset: String,
    pub storage_path: PathBuf,
    pub log_dir: PathBuf,
    pub log_level: String,
    pub search_debounce_ms: u64,
    pub notice_success_ms: u64,
    pub notice_error_ms: u64,
    pub github: GitHubConfig,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        let data_dir = default_data_dir();
        Self {
            dataset: "data.json".to_string(),
            storage_path: data_dir.join("catalog.sqlite3"),
            log_dir: data_dir.join("logs"),
            log_level: crate::logging::default_log_level().to_string(),
            search_debounce_ms: 300,
            notice_success_ms: 3_000,
            notice_error_ms: 5_000,
            github: GitHubConfig::default(),
        }
    }
}

impl CatalogConfig {
    /// Loads configuration from `path`, or from the default location when
    /// `path` is `None`, then applies process environment overrides.
    ///
    /// # Errors
    /// - [`ConfigError::Read`] when an explicit `path` cannot be read.
    /// - [`ConfigError::Parse`] when the file is not valid config TOML.
    /// - [`ConfigError::InvalidValue`] when a numeric override is malformed.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match default_config_path().filter(|path| path.is_file()) {
                Some(path) => Self::from_file(&path)?,
                None => Self::default(),
            },
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Parses a TOML config file; absent keys keep their defaults.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Applies `BPCATALOG_*` overrides read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(&format!("{ENV_PREFIX}{name}")).filter(|value| !value.trim().is_empty())
        };

        if let Some(value) = var("DATASET") {
            self.dataset = value;
        }
        if let Some(value) = var("STORAGE_PATH") {
            self.storage_path = PathBuf::from(value);
        }
        if let Some(value) = var("LOG_DIR") {
            self.log_dir = PathBuf::from(value);
        }
        if let Some(value) = var("LOG_LEVEL") {
            self.log_level = value;
        }
        if let Some(value) = var("SEARCH_DEBOUNCE_MS") {
            self.search_debounce_ms = parse_number("SEARCH_DEBOUNCE_MS", &value)?;
        }
        if let Some(value) = var("NOTICE_SUCCESS_MS") {
            self.notice_success_ms = parse_number("NOTICE_SUCCESS_MS", &value)?;
        }
        if let Some(value) = var("NOTICE_ERROR_MS") {
            self.notice_error_ms = parse_number("NOTICE_ERROR_MS", &value)?;
        }
        if let Some(value) = var("GITHUB_API_BASE_URL") {
            self.github.api_base_url = value;
        }
        if let Some(value) = var("GITHUB_OWNER") {
            self.github.owner = value;
        }
        if let Some(value) = var("GITHUB_REPO") {
            self.github.repo = value;
        }
        if let Some(value) = var("GITHUB_DATA_FILE") {
            self.github.data_file = value;
        }
        if let Some(value) = var("GITHUB_BASE_BRANCH") {
            self.github.base_branch = value;
        }
        if let Some(value) = var("GITHUB_USER_AGENT") {
            self.github.user_agent = value;
        }
        if let Some(value) = var("GITHUB_TIMEOUT_SECS") {
            self.github.timeout_secs = parse_number("GITHUB_TIMEOUT_SECS", &value)?;
        }
        Ok(())
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn notice_success(&self) -> Duration {
        Duration::from_millis(self.notice_success_ms)
    }

    pub fn notice_error(&self) -> Duration {
        Duration::from_millis(self.notice_error_ms)
    }
}

/// `<config dir>/bpcatalog/config.toml`, when the platform has one.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .or_else(dirs::data_dir)
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR_NAME)
}

fn parse_number(name: &str, value: &str) -> ConfigResult<u64> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|_| ConfigError::InvalidValue {
            key: format!("{ENV_PREFIX}{name}"),
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::{CatalogConfig, ConfigError};
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn defaults_match_documented_values() {
        let config = CatalogConfig::default();
        assert_eq!(config.search_debounce_ms, 300);
        assert_eq!(config.notice_success_ms, 3_000);
        assert_eq!(config.notice_error_ms, 5_000);
        assert_eq!(config.github.base_branch, "main");
        assert_eq!(config.github.data_file, "data.json");
    }

    #[test]
    fn toml_overrides_only_named_keys() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(
            file,
            "dataset = \"https://example.org/data.json\"\nsearch_debounce_ms = 50\n\n[github]\nowner = \"someone\""
        )
        .expect("write config");

        let config = CatalogConfig::from_file(file.path()).expect("config should parse");
        assert_eq!(config.dataset, "https://example.org/data.json");
        assert_eq!(config.search_debounce_ms, 50);
        assert_eq!(config.github.owner, "someone");
        assert_eq!(config.github.base_branch, "main");
        assert_eq!(config.notice_error_ms, 5_000);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "datset = \"typo\"").expect("write config");
        let error = CatalogConfig::from_file(file.path()).expect_err("typo must fail");
        assert!(matches!(error, ConfigError::Parse { .. }));
    }

    #[test]
    fn env_overrides_win_over_file_values() {
        let env = HashMap::from([
            ("BPCATALOG_DATASET".to_string(), "local.json".to_string()),
            ("BPCATALOG_NOTICE_ERROR_MS".to_string(), "750".to_string()),
            ("BPCATALOG_GITHUB_REPO".to_string(), "fork".to_string()),
            (
                "BPCATALOG_GITHUB_USER_AGENT".to_string(),
                "catalog-mirror/2".to_string(),
            ),
        ]);
        let mut config = CatalogConfig::default();
        config
            .apply_env(|key| env.get(key).cloned())
            .expect("overrides apply");

        assert_eq!(config.dataset, "local.json");
        assert_eq!(config.notice_error_ms, 750);
        assert_eq!(config.github.repo, "fork");
        assert_eq!(config.github.user_agent, "catalog-mirror/2");
    }

    #[test]
    fn malformed_numeric_override_is_reported() {
        let mut config = CatalogConfig::default();
        let error = config
            .apply_env(|key| (key == "BPCATALOG_SEARCH_DEBOUNCE_MS").then(|| "soon".to_string()))
            .expect_err("non-numeric value must fail");
        assert!(error.to_string().contains("BPCATALOG_SEARCH_DEBOUNCE_MS"));
    }
}
