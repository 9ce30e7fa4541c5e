//! Bar-chart-race handoff.
//!
//! The animation itself is produced by an external renderer. This module
//! owns everything up to that boundary:
//!
//! - [`RaceConfig`] - the settings bundle handed to the renderer
//! - [`race_frames`] - per-date rankings, the shape every frame of the race takes
//! - [`RaceRenderer`] - the renderer seam, with [`CommandRenderer`] spawning a program
//!
//! # Example
//!
//! ```
//! use chatrace::core::aggregate::pivot;
//! use chatrace::message::Record;
//! use chatrace::race::race_frames;
//! use chrono::NaiveDate;
//!
//! let day = |d| NaiveDate::from_ymd_opt(2023, 12, d).unwrap().and_hms_opt(10, 0, 0).unwrap();
//! let records = vec![
//!     Record::new(day(1), "Alice", "hi"),
//!     Record::new(day(1), "Bob", "hey"),
//!     Record::new(day(2), "Bob", "yo"),
//! ];
//!
//! let frames = race_frames(&pivot(&records), 1);
//! assert_eq!(frames[1].bars[0].sender, "Bob");
//! assert_eq!(frames[1].total, 3);
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::RaceSettings;
use crate::core::aggregate::PivotTable;
use crate::core::output::write_csv;
use crate::core::table::Table;
use crate::error::ChatraceError;

/// Date label format of each frame.
pub const PERIOD_TEMPLATE: &str = "%B %d, %Y";

/// Settings bundle handed to the renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RaceConfig {
    /// Bars shown per frame.
    pub bar_count: usize,
    /// Animation steps between two dates.
    pub steps_per_period: u32,
    /// Duration of one date, in milliseconds.
    pub period_length_ms: u32,
    /// Video title.
    pub title: String,
    /// chrono format of the date label.
    pub period_template: String,
}

impl RaceConfig {
    /// Creates a config with the given title and default timing
    /// (10 bars, 10 steps, 500 ms).
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            bar_count: 10,
            steps_per_period: 10,
            period_length_ms: 500,
            title: title.into(),
            period_template: PERIOD_TEMPLATE.to_string(),
        }
    }

    /// Builds the bundle from file settings, titling it
    /// `Bar Chart <project>` unless a title is configured.
    pub fn from_settings(settings: &RaceSettings, project: &str) -> Self {
        Self::new(settings.title_for(project))
            .with_bar_count(settings.n_bars)
            .with_steps_per_period(settings.steps_per_period)
            .with_period_length_ms(settings.period_length)
    }

    /// Sets the number of bars.
    #[must_use]
    pub fn with_bar_count(mut self, n: usize) -> Self {
        self.bar_count = n;
        self
    }

    /// Sets the steps per period.
    #[must_use]
    pub fn with_steps_per_period(mut self, n: u32) -> Self {
        self.steps_per_period = n;
        self
    }

    /// Sets the period length.
    #[must_use]
    pub fn with_period_length_ms(mut self, ms: u32) -> Self {
        self.period_length_ms = ms;
        self
    }
}

/// One bar of a frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bar {
    /// Author.
    pub sender: String,
    /// Cumulative messages at the frame's date.
    pub value: u64,
}

/// The ranking shown for one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RaceFrame {
    /// Frame date.
    pub date: NaiveDate,
    /// Top bars, largest first (ties by name).
    pub bars: Vec<Bar>,
    /// Sum over all authors, shown or not.
    pub total: u64,
}

/// Ranks every row of the pivot, keeping the `bar_count` largest bars.
pub fn race_frames(pivot: &PivotTable, bar_count: usize) -> Vec<RaceFrame> {
    pivot
        .rows()
        .map(|(date, row)| {
            let mut bars: Vec<Bar> = pivot
                .senders()
                .iter()
                .zip(row)
                .map(|(sender, value)| Bar {
                    sender: sender.clone(),
                    value: *value,
                })
                .collect();
            bars.sort_by(|a, b| b.value.cmp(&a.value).then_with(|| a.sender.cmp(&b.sender)));
            bars.truncate(bar_count);
            RaceFrame {
                date,
                bars,
                total: row.iter().sum(),
            }
        })
        .collect()
}

/// `<video_dir>/<project>_bcr.mp4`, where `video_dir` is the project's
/// folder under `videos_folder` (see
/// [`PathsConfig::video_dir`](crate::config::PathsConfig::video_dir)).
pub fn video_path(video_dir: &Path, project: &str) -> PathBuf {
    video_dir.join(format!("{project}_bcr.mp4"))
}

/// Something that turns a pivot table into a video file.
pub trait RaceRenderer {
    /// Renders `pivot` with `config` into `output`.
    fn render(
        &self,
        pivot: &PivotTable,
        config: &RaceConfig,
        output: &Path,
    ) -> Result<(), ChatraceError>;
}

/// Renders by spawning an external program.
///
/// Next to the target video it writes `<video stem>.csv` (the pivot,
/// semicolon-delimited, `dt_date` first) and `<video stem>.json` (the
/// [`RaceConfig`]), then runs
/// `<program> <args…> --data <csv> --config <json> --output <mp4>`.
#[derive(Debug, Clone)]
pub struct CommandRenderer {
    program: String,
    args: Vec<String>,
}

impl CommandRenderer {
    /// Creates a renderer for `program`.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Builds a renderer from a configured `[program, args…]` list.
    pub fn from_command(command: &[String]) -> Result<Self, ChatraceError> {
        let (program, args) = command.split_first().ok_or_else(|| {
            ChatraceError::render("no renderer command configured (bcr_configs.command)")
        })?;
        Ok(Self::new(program.clone()).with_args(args.iter().cloned()))
    }

    /// Appends leading arguments.
    #[must_use]
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// The program that will be spawned.
    pub fn program(&self) -> &str {
        &self.program
    }
}

impl RaceRenderer for CommandRenderer {
    fn render(
        &self,
        pivot: &PivotTable,
        config: &RaceConfig,
        output: &Path,
    ) -> Result<(), ChatraceError> {
        if pivot.is_empty() {
            return Err(ChatraceError::render("nothing to render: pivot table is empty"));
        }
        if let Some(parent) = output.parent() {
            fs::create_dir_all(parent)?;
        }

        let data_path = output.with_extension("csv");
        let config_path = output.with_extension("json");
        write_csv(&Table::from_pivot("pivot", pivot), &data_path)?;
        fs::write(&config_path, serde_json::to_string_pretty(config)?)?;
        debug!(data = %data_path.display(), config = %config_path.display(), "wrote renderer inputs");

        let result = Command::new(&self.program)
            .args(&self.args)
            .arg("--data")
            .arg(&data_path)
            .arg("--config")
            .arg(&config_path)
            .arg("--output")
            .arg(output)
            .stdin(Stdio::null())
            .output();

        match result {
            Ok(out) if out.status.success() => {
                info!(video = %output.display(), "rendered bar chart race");
                Ok(())
            }
            Ok(out) => Err(ChatraceError::render(format!(
                "'{}' exited with {}: {}",
                self.program,
                out.status,
                String::from_utf8_lossy(&out.stderr).trim()
            ))),
            Err(err) => Err(ChatraceError::render(format!(
                "failed to run '{}': {err}",
                self.program
            ))),
        }
    }
}
