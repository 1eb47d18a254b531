// Configuration loading and parsing (config/tunnelbot.toml).

use std::path::{Path, PathBuf};

use chrono::{Days, NaiveDate};
use serde::Deserialize;
use thiserror::Error;

const CONFIG_FILE: &str = "tunnelbot.toml";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Config structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub run: RunConfig,
    pub statcast: StatcastConfig,
    pub players: PlayersConfig,
    #[serde(default)]
    pub retry: RetryConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RunConfig {
    /// Fixed date to score. When absent, the run scores yesterday.
    #[serde(default)]
    pub date: Option<NaiveDate>,
    /// Where report artifacts are written. Falls back to the platform data
    /// directory.
    #[serde(default)]
    pub output_dir: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatcastSourceKind {
    Savant,
    Csv,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatcastConfig {
    pub source: StatcastSourceKind,
    pub base_url: String,
    #[serde(default)]
    pub csv_path: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerSourceKind {
    StatsApi,
    Register,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlayersConfig {
    pub source: PlayerSourceKind,
    pub stats_api_url: String,
    #[serde(default)]
    pub register_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    /// Additional attempts after the first failure.
    pub max_retries: u32,
    /// Pause between attempts; 0 retries immediately.
    #[serde(default)]
    pub backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            backoff_ms: 0,
        }
    }
}

impl Config {
    /// The date this run scores: the configured date, or the day before
    /// `today`.
    pub fn target_date(&self, today: NaiveDate) -> NaiveDate {
        self.run
            .date
            .or_else(|| today.checked_sub_days(Days::new(1)))
            .unwrap_or(today)
    }

    pub fn output_dir(&self) -> PathBuf {
        if let Some(dir) = &self.run.output_dir {
            return PathBuf::from(dir);
        }
        directories::ProjectDirs::from("", "", "tunnelbot")
            .map(|dirs| dirs.data_dir().join("output"))
            .unwrap_or_else(|| PathBuf::from("output"))
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate `config/tunnelbot.toml` relative to `base_dir`.
///
/// Does not copy defaults; prefer `load_config()`.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join(CONFIG_FILE);
    let text = read_file(&path)?;
    let config = parse_config(&text).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        source: e,
    })?;
    validate(&config)?;
    Ok(config)
}

fn parse_config(text: &str) -> Result<Config, toml::de::Error> {
    toml::from_str(text)
}

/// Copy `defaults/tunnelbot.toml` into `config/` if it is not already there.
/// Returns the path written, if any.
pub fn ensure_config_file(base_dir: &Path) -> Result<Option<PathBuf>, ConfigError> {
    let default_path = base_dir.join("defaults").join(CONFIG_FILE);
    let config_dir = base_dir.join("config");
    let target = config_dir.join(CONFIG_FILE);

    if target.exists() {
        return Ok(None);
    }
    if !default_path.exists() {
        return Err(ConfigError::DefaultsCopyError {
            message: format!(
                "neither defaults/{CONFIG_FILE} nor config/{CONFIG_FILE} found in {}; \
                 run from the project root",
                base_dir.display()
            ),
        });
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;
    std::fs::copy(&default_path, &target).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to copy {}: {e}", default_path.display()),
    })?;
    Ok(Some(target))
}

/// Load config relative to the current working directory, copying the
/// default file first if needed.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_file(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.into(),
        message: message.into(),
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    let statcast = &config.statcast;
    match statcast.source {
        StatcastSourceKind::Savant if statcast.base_url.trim().is_empty() => {
            return Err(invalid("statcast.base_url", "must not be empty"));
        }
        StatcastSourceKind::Csv if statcast.csv_path.is_none() => {
            return Err(invalid("statcast.csv_path", "required when source = \"csv\""));
        }
        _ => {}
    }
    if statcast.timeout_secs == 0 {
        return Err(invalid("statcast.timeout_secs", "must be > 0"));
    }

    let players = &config.players;
    match players.source {
        PlayerSourceKind::StatsApi if players.stats_api_url.trim().is_empty() => {
            return Err(invalid("players.stats_api_url", "must not be empty"));
        }
        PlayerSourceKind::Register if players.register_path.is_none() => {
            return Err(invalid(
                "players.register_path",
                "required when source = \"register\"",
            ));
        }
        _ => {}
    }

    if config.retry.max_retries > 50 {
        return Err(invalid(
            "retry.max_retries",
            format!("must be at most 50, got {}", config.retry.max_retries),
        ));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    /// Path to the tunnelbot-app crate root (works from the crate or the
    /// workspace root).
    fn project_root() -> PathBuf {
        let cwd = std::env::current_dir().unwrap();
        if cwd.join("defaults").exists() {
            cwd
        } else if cwd.join("crates/tunnelbot-app/defaults").exists() {
            cwd.join("crates/tunnelbot-app")
        } else {
            panic!("Cannot locate defaults/ directory from CWD {:?}", cwd);
        }
    }

    fn default_text() -> String {
        fs::read_to_string(project_root().join("defaults").join(CONFIG_FILE)).unwrap()
    }

    fn write_config(name: &str, text: &str) -> PathBuf {
        let tmp = std::env::temp_dir().join(name);
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("config")).unwrap();
        fs::write(tmp.join("config").join(CONFIG_FILE), text).unwrap();
        tmp
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn default_config_parses_and_validates() {
        let config = parse_config(&default_text()).expect("defaults should parse");
        validate(&config).expect("defaults should validate");

        assert!(config.run.date.is_none());
        assert_eq!(config.run.output_dir.as_deref(), Some("output"));
        assert_eq!(config.statcast.source, StatcastSourceKind::Savant);
        assert_eq!(
            config.statcast.base_url,
            "https://baseballsavant.mlb.com/statcast_search/csv"
        );
        assert_eq!(config.statcast.timeout_secs, 120);
        assert_eq!(config.players.source, PlayerSourceKind::StatsApi);
        assert_eq!(config.players.stats_api_url, "https://statsapi.mlb.com/api/v1");
        assert_eq!(config.retry.max_retries, 5);
        assert_eq!(config.retry.backoff_ms, 0);
    }

    #[test]
    fn load_copies_defaults_when_missing() {
        let tmp = std::env::temp_dir().join("tunnelbot_config_copy_defaults");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("defaults")).unwrap();
        fs::write(tmp.join("defaults").join(CONFIG_FILE), default_text()).unwrap();

        let copied = ensure_config_file(&tmp).unwrap();
        assert_eq!(copied, Some(tmp.join("config").join(CONFIG_FILE)));
        assert_eq!(ensure_config_file(&tmp).unwrap(), None);

        let config = load_config_from(&tmp).unwrap();
        assert_eq!(config.retry.max_retries, 5);

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn missing_defaults_and_config_is_error() {
        let tmp = std::env::temp_dir().join("tunnelbot_config_nothing");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(&tmp).unwrap();

        let err = ensure_config_file(&tmp).unwrap_err();
        assert!(matches!(err, ConfigError::DefaultsCopyError { .. }));

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn missing_file_is_file_not_found() {
        let tmp = std::env::temp_dir().join("tunnelbot_config_missing_file");
        let _ = fs::remove_dir_all(&tmp);
        let err = load_config_from(&tmp).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let tmp = write_config("tunnelbot_config_bad_toml", "[statcast\nsource = ");
        let err = load_config_from(&tmp).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn csv_source_requires_path() {
        let text = default_text().replace("source = \"savant\"", "source = \"csv\"");
        let tmp = write_config("tunnelbot_config_csv_no_path", &text);
        match load_config_from(&tmp).unwrap_err() {
            ConfigError::ValidationError { field, .. } => assert_eq!(field, "statcast.csv_path"),
            other => panic!("unexpected error: {other:?}"),
        }
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn register_source_requires_path() {
        let text = default_text().replace("source = \"stats_api\"", "source = \"register\"");
        let tmp = write_config("tunnelbot_config_register_no_path", &text);
        match load_config_from(&tmp).unwrap_err() {
            ConfigError::ValidationError { field, .. } => {
                assert_eq!(field, "players.register_path")
            }
            other => panic!("unexpected error: {other:?}"),
        }
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_zero_timeout() {
        let text = default_text().replace("timeout_secs = 120", "timeout_secs = 0");
        let tmp = write_config("tunnelbot_config_zero_timeout", &text);
        match load_config_from(&tmp).unwrap_err() {
            ConfigError::ValidationError { field, .. } => {
                assert_eq!(field, "statcast.timeout_secs")
            }
            other => panic!("unexpected error: {other:?}"),
        }
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn retry_section_is_optional() {
        let text = default_text().replace("[retry]\nmax_retries = 5\nbackoff_ms = 0\n", "");
        let config = parse_config(&text).unwrap();
        assert_eq!(config.retry.max_retries, 5);
        assert_eq!(config.retry.backoff_ms, 0);
    }

    #[test]
    fn target_date_defaults_to_yesterday() {
        let config = parse_config(&default_text()).unwrap();
        assert_eq!(config.target_date(date(2024, 5, 1)), date(2024, 4, 30));
        assert_eq!(config.target_date(date(2024, 1, 1)), date(2023, 12, 31));
    }

    #[test]
    fn configured_date_overrides_yesterday() {
        let text = default_text().replace("# date = \"2024-05-01\"", "date = \"2024-06-02\"");
        let config = parse_config(&text).unwrap();
        assert_eq!(config.target_date(date(2024, 9, 9)), date(2024, 6, 2));
    }

    #[test]
    fn explicit_output_dir_is_used() {
        let config = parse_config(&default_text()).unwrap();
        assert_eq!(config.output_dir(), PathBuf::from("output"));
    }
}
