//! Run configuration and name-mapping files.
//!
//! Both files are YAML, loaded once at startup into strongly typed structs
//! and validated before any processing starts. Nothing downstream looks up
//! configuration keys by name.
//!
//! # Example
//!
//! ```rust
//! use chatrace::config::Config;
//!
//! let yaml = r#"
//! paths:
//!   input_data_folder: data
//!   outputs_folder: outputs
//!   videos_folder: videos
//!   full_parsed_file: full_parsed.parquet
//! configs:
//!   truncate_names_chars: 20
//! skip_words: ["notice"]
//! bcr_configs:
//!   n_bars: 10
//!   steps_per_period: 10
//!   period_length: 500
//! "#;
//!
//! let config = Config::from_yaml_str(yaml)?;
//! assert_eq!(config.processing.truncate_names_chars, 20);
//! assert_eq!(config.race.title_for("family"), "Bar Chart family");
//! # Ok::<(), chatrace::ChatraceError>(())
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::period::Period;
use crate::error::ChatraceError;
use crate::format::OutputFormat;
use crate::parsing::DEFAULT_TIMESTAMP_FORMAT;

/// Default location of the configuration file, relative to the working
/// directory.
pub const DEFAULT_CONFIG_PATH: &str = "configs/default_config.yaml";

/// Complete run configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Input and output locations.
    pub paths: PathsConfig,

    /// Record normalization settings.
    #[serde(rename = "configs")]
    pub processing: ProcessingConfig,

    /// Author substrings whose records are dropped.
    pub skip_words: Vec<String>,

    /// Formats every table is written in (default: parquet and xlsx).
    #[serde(default = "OutputFormat::defaults")]
    pub formats: Vec<OutputFormat>,

    /// Lookback windows summarized in addition to the whole record set.
    #[serde(default)]
    pub summary_windows: Vec<Period>,

    /// Export line format.
    #[serde(default)]
    pub parser: ParserConfig,

    /// Bar-chart-race settings.
    #[serde(rename = "bcr_configs")]
    pub race: RaceSettings,
}

/// Input and output locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PathsConfig {
    /// Root of the per-project full-parse snapshots.
    pub input_data_folder: PathBuf,
    /// Root of the per-project tables.
    pub outputs_folder: PathBuf,
    /// Root of the per-project videos.
    pub videos_folder: PathBuf,
    /// File name of the full-parse snapshot.
    pub full_parsed_file: String,
}

impl PathsConfig {
    /// `<input_data_folder>/<project>/<full_parsed_file>`.
    pub fn full_parsed_path(&self, project: &str) -> PathBuf {
        self.input_data_folder
            .join(project)
            .join(&self.full_parsed_file)
    }

    /// `<outputs_folder>/<project>`.
    pub fn output_dir(&self, project: &str) -> PathBuf {
        self.outputs_folder.join(project)
    }

    /// `<videos_folder>/<project>`.
    pub fn video_dir(&self, project: &str) -> PathBuf {
        self.videos_folder.join(project)
    }
}

/// Record normalization settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum author name length, in characters.
    pub truncate_names_chars: usize,
}

/// Export line format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParserConfig {
    /// chrono format of the timestamp segment.
    #[serde(default = "default_timestamp_format")]
    pub timestamp_format: String,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            timestamp_format: default_timestamp_format(),
        }
    }
}

fn default_timestamp_format() -> String {
    DEFAULT_TIMESTAMP_FORMAT.to_string()
}

/// Bar-chart-race settings as written in the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RaceSettings {
    /// Bars shown per frame.
    pub n_bars: usize,
    /// Animation steps between two dates.
    pub steps_per_period: u32,
    /// Duration of one date, in milliseconds.
    pub period_length: u32,
    /// Video title; defaults to `Bar Chart <project>`.
    #[serde(default)]
    pub title: Option<String>,
    /// External renderer program and leading arguments.
    #[serde(default)]
    pub command: Vec<String>,
}

impl RaceSettings {
    /// The configured title, or `Bar Chart <project>`.
    pub fn title_for(&self, project: &str) -> String {
        self.title
            .clone()
            .unwrap_or_else(|| format!("Bar Chart {project}"))
    }
}

impl Config {
    /// Reads, parses and validates a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ChatraceError> {
        let path = path.as_ref();
        let data = fs::read_to_string(path).map_err(|err| {
            ChatraceError::config(
                Some(path.to_path_buf()),
                format!("cannot read configuration: {err}"),
            )
        })?;
        let config: Config = serde_yml::from_str(&data).map_err(|err| {
            ChatraceError::config(Some(path.to_path_buf()), err.to_string())
        })?;
        config
            .validate()
            .map_err(|message| ChatraceError::config(Some(path.to_path_buf()), message))?;
        Ok(config)
    }

    /// Parses and validates configuration text.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ChatraceError> {
        let config: Config = serde_yml::from_str(yaml)?;
        config
            .validate()
            .map_err(|message| ChatraceError::config(None, message))?;
        Ok(config)
    }

    /// Checks value ranges serde cannot express.
    pub fn validate(&self) -> Result<(), String> {
        if self.processing.truncate_names_chars == 0 {
            return Err("configs.truncate_names_chars must be positive".into());
        }
        if self.race.n_bars == 0 {
            return Err("bcr_configs.n_bars must be positive".into());
        }
        if self.race.steps_per_period == 0 {
            return Err("bcr_configs.steps_per_period must be positive".into());
        }
        if self.formats.is_empty() {
            return Err("formats must name at least one output format".into());
        }
        if self.paths.full_parsed_file.trim().is_empty() {
            return Err("paths.full_parsed_file must not be empty".into());
        }
        for (i, window) in self.summary_windows.iter().enumerate() {
            if self.summary_windows[..i].contains(window) {
                return Err(format!("summary_windows lists '{window}' more than once"));
            }
        }
        Ok(())
    }
}

/// Raw-author to display-name substitutions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NameMap {
    /// Exact raw sender → canonical name.
    pub mapping: HashMap<String, String>,
}

impl NameMap {
    /// Reads and parses a mapping file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ChatraceError> {
        let path = path.as_ref();
        let data = fs::read_to_string(path).map_err(|err| {
            ChatraceError::config(
                Some(path.to_path_buf()),
                format!("cannot read mapping: {err}"),
            )
        })?;
        Self::from_yaml_str(&data)
            .map_err(|err| ChatraceError::config(Some(path.to_path_buf()), err.to_string()))
    }

    /// Parses mapping text.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ChatraceError> {
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    /// Returns `true` if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }

    /// Consumes the map, returning the substitutions.
    pub fn into_inner(self) -> HashMap<String, String> {
        self.mapping
    }
}
