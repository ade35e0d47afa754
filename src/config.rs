//! Process-wide calculator settings.
//!
//! A [`CalculatorConfig`] is built once at startup and never mutated
//! afterwards; the facade shares it read-only with its observers.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::Number;

const DEFAULT_MAX_HISTORY_SIZE: usize = 100;
const DEFAULT_PRECISION: u32 = 10;
const DEFAULT_MAX_INPUT_VALUE: Number = 1_000_000.0;
const DEFAULT_ENCODING: &str = "utf-8";
const HISTORY_FILE_NAME: &str = "calculator_history.csv";
const LOG_FILE_NAME: &str = "calculator.log";

/// Rejected configuration values.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `max_history_size` must be at least one.
    #[error("max_history_size must be positive")]
    ZeroHistorySize,
    /// `max_input_value` must be a positive finite number.
    #[error("max_input_value must be a positive finite number, got {0}")]
    InvalidMaxInput(Number),
    /// Only UTF-8 history files are supported.
    #[error("unsupported encoding `{0}`")]
    UnsupportedEncoding(String),
    /// The config file could not be read.
    #[error("failed to read config `{}`: {source}", path.display())]
    Read {
        /// Config file path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// The config document is not valid JSON for this struct.
    #[error("invalid config document: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Calculator settings with the defaults applied to every missing field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculatorConfig {
    /// Root for the default log and history directories.
    pub base_dir: PathBuf,
    /// Overrides `<base_dir>/logs`.
    pub log_dir: Option<PathBuf>,
    /// Overrides `<base_dir>/history`.
    pub history_dir: Option<PathBuf>,
    /// Overrides `<history_dir>/calculator_history.csv`.
    pub history_file: Option<PathBuf>,
    /// Overrides `<log_dir>/calculator.log`.
    pub log_file: Option<PathBuf>,
    /// Maximum number of records kept in history.
    pub max_history_size: usize,
    /// Save the full history after every calculation.
    pub auto_save: bool,
    /// Decimal places kept in results.
    pub precision: u32,
    /// Largest accepted operand magnitude.
    pub max_input_value: Number,
    /// Text encoding of the history file.
    pub default_encoding: String,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            log_dir: None,
            history_dir: None,
            history_file: None,
            log_file: None,
            max_history_size: DEFAULT_MAX_HISTORY_SIZE,
            auto_save: true,
            precision: DEFAULT_PRECISION,
            max_input_value: DEFAULT_MAX_INPUT_VALUE,
            default_encoding: DEFAULT_ENCODING.to_string(),
        }
    }
}

impl CalculatorConfig {
    /// Default settings rooted at `base_dir`.
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            ..Self::default()
        }
    }

    /// Parses a JSON document; absent fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a JSON config file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Directory holding log files.
    pub fn log_dir(&self) -> PathBuf {
        self.log_dir
            .clone()
            .unwrap_or_else(|| self.base_dir.join("logs"))
    }

    /// Directory holding the history file.
    pub fn history_dir(&self) -> PathBuf {
        self.history_dir
            .clone()
            .unwrap_or_else(|| self.base_dir.join("history"))
    }

    /// Full path of the persisted history.
    pub fn history_file(&self) -> PathBuf {
        self.history_file
            .clone()
            .unwrap_or_else(|| self.history_dir().join(HISTORY_FILE_NAME))
    }

    /// Full path of the log file.
    pub fn log_file(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| self.log_dir().join(LOG_FILE_NAME))
    }

    /// Checks every value for consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_history_size == 0 {
            return Err(ConfigError::ZeroHistorySize);
        }
        if !self.max_input_value.is_finite() || self.max_input_value <= 0.0 {
            return Err(ConfigError::InvalidMaxInput(self.max_input_value));
        }
        let encoding = self.default_encoding.to_ascii_lowercase();
        if encoding != "utf-8" && encoding != "utf8" {
            return Err(ConfigError::UnsupportedEncoding(self.default_encoding.clone()));
        }
        Ok(())
    }
}
