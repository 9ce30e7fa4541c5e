//! Command-line interface definition using clap.
//!
//! This module defines:
//! - [`Args`] - CLI argument structure
//! - [`init_logging`] - tracing subscriber setup for the binary
//! - [`load_name_map`] - mapping-file loading with the interactive fallback

use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::NaiveDate;
use clap::Parser;
use tracing::warn;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::{DEFAULT_CONFIG_PATH, NameMap};
use crate::core::period::{Period, parse_start_date};
use crate::error::ChatraceError;

/// Turn a WhatsApp chat export into per-author message tables and a
/// bar-chart-race video.
#[derive(Parser, Debug, Clone)]
#[command(name = "chatrace")]
#[command(version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    chatrace -n family -d exports/family.txt
    chatrace -n family -d exports/family.txt -m configs/family_map.yaml --video
    chatrace -n work -d work.txt -p 6m --anon
    chatrace -n work -d work.txt -s 2024-01-01 -c configs/work.yaml")]
pub struct Args {
    /// Project name (prompted for when omitted)
    #[arg(short, long)]
    pub name: Option<String>,

    /// Path to the exported chat text (prompted for when omitted)
    #[arg(short, long, value_name = "FILE")]
    pub data: Option<PathBuf>,

    /// Path to the YAML configuration
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Path to the YAML name mapping
    #[arg(short, long, value_name = "FILE")]
    pub map: Option<PathBuf>,

    /// Keep only messages after this date (YYYY-MM-DD)
    #[arg(short, long, value_name = "DATE", value_parser = parse_date_arg)]
    pub start_date: Option<NaiveDate>,

    /// Keep only messages newer than this lookback (e.g. 6m, 1y, 30d)
    #[arg(short, long, value_name = "PERIOD", value_parser = parse_period_arg)]
    pub period: Option<Period>,

    /// Render the bar chart race video
    #[arg(long)]
    pub video: bool,

    /// Replace author names with user1, user2, ...
    #[arg(long)]
    pub anon: bool,

    /// Debug-level logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Also append errors (skipped lines included) to
    /// <DIR>/<YYYYMMDD>/chatrace_error.log
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,
}

fn parse_date_arg(s: &str) -> Result<NaiveDate, String> {
    parse_start_date(s).map_err(|e| e.to_string())
}

fn parse_period_arg(s: &str) -> Result<Period, String> {
    s.parse::<Period>().map_err(|e| e.to_string())
}

/// Installs the log subscriber.
///
/// Stderr gets `RUST_LOG` when set; otherwise `debug` with `verbose`, else
/// `info`. With `log_dir`, error events are also appended to
/// [`error_log_path`] for `today`. Calling it twice is harmless.
pub fn init_logging(
    verbose: bool,
    log_dir: Option<&Path>,
    today: NaiveDate,
) -> Result<(), ChatraceError> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(filter);

    let file_layer = match log_dir {
        Some(dir) => {
            let path = error_log_path(dir, today);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(&path)?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .with_writer(Mutex::new(file))
                    .with_filter(LevelFilter::ERROR),
            )
        }
        None => None,
    };

    let _ = tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .try_init();
    Ok(())
}

/// `<log_dir>/<YYYYMMDD>/chatrace_error.log`.
pub fn error_log_path(log_dir: &Path, day: NaiveDate) -> PathBuf {
    log_dir
        .join(day.format("%Y%m%d").to_string())
        .join("chatrace_error.log")
}

/// Loads the name mapping at `path`, if any.
///
/// A missing or malformed file is fatal unless `interactive` is set, in
/// which case it is logged and the run continues with no substitutions.
pub fn load_name_map(
    path: Option<&Path>,
    interactive: bool,
) -> Result<HashMap<String, String>, ChatraceError> {
    let Some(path) = path else {
        return Ok(HashMap::new());
    };

    match NameMap::load(path) {
        Ok(map) => Ok(map.into_inner()),
        Err(err) if interactive => {
            warn!(error = %err, "continuing without name mapping");
            Ok(HashMap::new())
        }
        Err(err) => Err(err),
    }
}
