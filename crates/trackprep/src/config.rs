//! Configuration management for trackprep.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Configuration directory name.
const APP_DIR_NAME: &str = "trackprep";

/// Environment variable prefix.
const ENV_PREFIX: &str = "TRACKPREP_";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `TRACKPREP_`, sections split on `__`)
/// 2. TOML config file at `~/.config/trackprep/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Input configuration.
    pub input: InputConfig,
    /// Colony location.
    pub colony: ColonyConfig,
    /// Processing configuration.
    pub processing: ProcessingConfig,
    /// Output configuration.
    pub output: OutputConfig,
}

/// Where raw data comes from and how to read it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Directory scanned for `*.csv` files.
    pub data_dir: PathBuf,
    /// `chrono` format of the `DateGMT` column.
    pub date_format: String,
}

/// Reference point for the distance feature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColonyConfig {
    /// Latitude in decimal degrees (negative south).
    pub latitude: f64,
    /// Longitude in decimal degrees (negative west).
    pub longitude: f64,
}

/// Feature engineering settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Columns that are mode-imputed and one-hot encoded.
    pub categorical_columns: Vec<String>,
    /// Neighbour count for position imputation.
    pub knn_neighbors: usize,
    /// Numeric columns standardised to zero mean and unit variance.
    pub scale_columns: Vec<String>,
    /// `chrono` format of the `DateGMT` column.
    ///
    /// Filled from [`InputConfig::date_format`] by [`Config::processing`].
    #[serde(skip)]
    pub date_format: String,
    /// Colony used for the distance feature.
    ///
    /// Filled from [`Config::colony`] by [`Config::processing`].
    #[serde(skip)]
    pub colony: ColonyConfig,
}

/// Where processed data goes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output directory.
    pub output_dir: PathBuf,
    /// File name without extension.
    pub file_stem: String,
    /// Write a CSV copy.
    pub write_csv: bool,
    /// Write a `SQLite` database.
    pub write_sqlite: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            date_format: "%d/%m/%Y".to_string(),
        }
    }
}

impl Default for ColonyConfig {
    /// The Copacabana colony, King George Island.
    fn default() -> Self {
        Self {
            latitude: -62.21,
            longitude: -58.42,
        }
    }
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            categorical_columns: default_categorical_columns(),
            knn_neighbors: 5,
            scale_columns: vec!["distance_to_colony_km".to_string()],
            date_format: InputConfig::default().date_format,
            colony: ColonyConfig::default(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("./data/processed"),
            file_stem: "penguin_tracking_processed".to_string(),
            write_csv: true,
            write_sqlite: true,
        }
    }
}

/// Default categorical columns.
fn default_categorical_columns() -> Vec<String> {
    ["Sex", "Age", "Breed Stage", "ArgosQuality"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(APP_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.processing.knn_neighbors == 0 {
            return Err(Error::config_validation(
                "knn_neighbors must be greater than 0",
            ));
        }

        if !(-90.0..=90.0).contains(&self.colony.latitude) {
            return Err(Error::config_validation(format!(
                "colony latitude {} is outside [-90, 90]",
                self.colony.latitude
            )));
        }

        if !(-180.0..=180.0).contains(&self.colony.longitude) {
            return Err(Error::config_validation(format!(
                "colony longitude {} is outside [-180, 180]",
                self.colony.longitude
            )));
        }

        if self.input.date_format.trim().is_empty() {
            return Err(Error::config_validation("date_format must not be empty"));
        }

        if self.output.file_stem.trim().is_empty() {
            return Err(Error::config_validation("file_stem must not be empty"));
        }

        if !self.output.write_csv && !self.output.write_sqlite {
            return Err(Error::config_validation(
                "at least one of write_csv and write_sqlite must be enabled",
            ));
        }

        Ok(())
    }

    /// Processing settings with the input and colony settings folded in.
    #[must_use]
    pub fn processing(&self) -> ProcessingConfig {
        ProcessingConfig {
            date_format: self.input.date_format.clone(),
            colony: self.colony,
            ..self.processing.clone()
        }
    }
}
