//! Viewer configuration
//!
//! Loaded from an optional TOML file. Every field has a default, and values
//! outside their valid range fall back to the default with a warning rather
//! than failing the run.

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

/// File looked up in the working directory when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "auditverse.toml";

const LOG_LEVELS: [&str; 4] = ["debug", "info", "warn", "error"];
const SPEED_RANGE: RangeInclusive<u64> = 100..=60_000;
const THRESHOLD_RANGE: RangeInclusive<f64> = 0.0..=10.0;
const RECENCY_RANGE: RangeInclusive<u32> = 1..=120;
const MAX_ROWS_RANGE: RangeInclusive<usize> = 100..=100_000;

/// Errors loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for [`ViewerConfig`]
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `debug`, `info`, `warn` or `error`
    pub level: String,
    /// Emit JSON lines instead of compact text
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Interval between playback steps
    pub speed_ms: u64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            speed_ms: auditverse_player::DEFAULT_SPEED_MS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewsConfig {
    pub high_residual_threshold: f64,
    /// Months an audit keeps a risk covered
    pub audit_recency_months: u32,
}

impl Default for ViewsConfig {
    fn default() -> Self {
        Self {
            high_residual_threshold: auditverse_views::DEFAULT_HIGH_RESIDUAL_THRESHOLD,
            audit_recency_months: auditverse_views::DEFAULT_AUDIT_RECENCY_MONTHS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Cap on every exported collection
    pub max_rows: usize,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self { max_rows: 10_000 }
    }
}

/// Full configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub logging: LoggingConfig,
    pub playback: PlaybackConfig,
    pub views: ViewsConfig,
    pub export: ExportConfig,
}

fn check_range<T>(
    name: &str,
    value: &mut T,
    range: &RangeInclusive<T>,
    default: T,
    warnings: &mut Vec<String>,
) where
    T: PartialOrd + Display + Copy,
{
    if !range.contains(&*value) {
        warnings.push(format!(
            "{name} out of valid range ({value} not in {}..={}), using {default}",
            range.start(),
            range.end()
        ));
        *value = default;
    }
}

impl ViewerConfig {
    /// Parse from TOML text
    ///
    /// # Errors
    /// Returns [`ConfigError::Parse`] for malformed TOML or mistyped fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Read and parse a config file
    ///
    /// # Errors
    /// Returns [`ConfigError::Read`] if the file cannot be read, or
    /// [`ConfigError::Parse`] if it does not parse.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Load `path` if given, else [`DEFAULT_CONFIG_FILE`] if present, else defaults
    ///
    /// # Errors
    /// See [`ViewerConfig::load`].
    pub fn discover(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.is_file() {
                    Self::load(fallback)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Replace out-of-range values with defaults
    ///
    /// Returns one warning per replaced value. Logging is usually not set up
    /// yet when this runs, so the caller logs them afterwards.
    pub fn validate(&mut self) -> Vec<String> {
        let defaults = Self::default();
        let mut warnings = Vec::new();

        if !LOG_LEVELS.contains(&self.logging.level.as_str()) {
            warnings.push(format!(
                "invalid log level '{}', using {}",
                self.logging.level, defaults.logging.level
            ));
            self.logging.level = defaults.logging.level;
        }
        check_range(
            "playback.speed_ms",
            &mut self.playback.speed_ms,
            &SPEED_RANGE,
            defaults.playback.speed_ms,
            &mut warnings,
        );
        check_range(
            "views.high_residual_threshold",
            &mut self.views.high_residual_threshold,
            &THRESHOLD_RANGE,
            defaults.views.high_residual_threshold,
            &mut warnings,
        );
        check_range(
            "views.audit_recency_months",
            &mut self.views.audit_recency_months,
            &RECENCY_RANGE,
            defaults.views.audit_recency_months,
            &mut warnings,
        );
        check_range(
            "export.max_rows",
            &mut self.export.max_rows,
            &MAX_ROWS_RANGE,
            defaults.export.max_rows,
            &mut warnings,
        );
        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn empty_file_gives_defaults() {
        let config = ViewerConfig::from_toml_str("").unwrap();

        assert_eq!(config, ViewerConfig::default());
        assert_eq!(config.playback.speed_ms, 2000);
        assert_eq!(config.export.max_rows, 10_000);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = ViewerConfig::from_toml_str(
            r#"
            [logging]
            json = true

            [views]
            high_residual_threshold = 8.5
            "#,
        )
        .unwrap();

        assert!(config.logging.json);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.views.high_residual_threshold, 8.5);
    }

    #[test]
    fn out_of_range_values_fall_back() {
        let mut config = ViewerConfig::from_toml_str(
            r#"
            [logging]
            level = "verbose"

            [playback]
            speed_ms = 5

            [export]
            max_rows = 500
            "#,
        )
        .unwrap();

        let warnings = config.validate();

        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].starts_with("invalid log level 'verbose'"));
        assert!(warnings[1].starts_with("playback.speed_ms out of valid range"));
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.playback.speed_ms, 2000);
        assert_eq!(config.export.max_rows, 500);
    }

    #[test]
    fn nan_threshold_falls_back() {
        let mut config = ViewerConfig::default();
        config.views.high_residual_threshold = f64::NAN;

        assert_eq!(config.validate().len(), 1);
        assert_eq!(config.views.high_residual_threshold, 7.0);
    }

    #[test]
    fn zero_audit_recency_falls_back() {
        let mut config = ViewerConfig::from_toml_str("[views]\naudit_recency_months = 0").unwrap();

        let warnings = config.validate();

        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].starts_with("views.audit_recency_months out of valid range"));
        assert_eq!(config.views.audit_recency_months, 12);
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[playback]\nspeed_ms = 750").unwrap();

        let config = ViewerConfig::load(file.path()).unwrap();

        assert_eq!(config.playback.speed_ms, 750);
    }

    #[test]
    fn load_errors_are_typed() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        assert!(matches!(
            ViewerConfig::load(&missing),
            Err(ConfigError::Read { .. })
        ));

        assert!(matches!(
            ViewerConfig::from_toml_str("[playback]\nspeed_ms = \"fast\""),
            Err(ConfigError::Parse(_))
        ));
    }
}
