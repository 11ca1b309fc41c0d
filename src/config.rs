// Configuration file handling.
//
// Report defaults can live in a `.proceed-report.toml` file. Command-line
// flags override anything set here.

use crate::error::{ReportError, Result};
use crate::loader::InputFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEFAULT_CONFIG_FILE: &str = ".proceed-report.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub input: InputConfig,

    #[serde(default)]
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputConfig {
    /// Input format when `--format` is not given.
    #[serde(default)]
    pub format: InputFormat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Directory the CSV and JSON exports are written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Rows shown in the console preview.
    #[serde(default = "default_preview_rows")]
    pub preview_rows: usize,

    /// Decimal places for rendered figures.
    #[serde(default = "default_decimals")]
    pub decimals: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            preview_rows: default_preview_rows(),
            decimals: default_decimals(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_preview_rows() -> usize {
    20
}

fn default_decimals() -> usize {
    2
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.report.preview_rows == 0 {
            return Err(ReportError::InvalidArgument(
                "report.preview_rows must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Load the explicit config file if given, otherwise the default file
    /// in the working directory if it exists, otherwise built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            debug!("Loading config from {}", path.display());
            return Self::from_file(path);
        }
        let default_path = Path::new(DEFAULT_CONFIG_FILE);
        if default_path.exists() {
            debug!("Loading config from {}", DEFAULT_CONFIG_FILE);
            return Self::from_file(default_path);
        }
        Ok(Self::default())
    }

    pub fn default_toml() -> Result<String> {
        Ok(toml::to_string_pretty(&Self::default())?)
    }
}
