//! End-to-end run: parse, persist the raw parse, normalize, aggregate, write
//! tables and optionally render the race.
//!
//! [`Pipeline`] owns the validated [`Config`]; per-invocation choices (name
//! map, time filters, anonymization, video) come in through [`RunOptions`].
//! The current time is passed in, so runs are reproducible in tests.
//!
//! Output layout for project `family`:
//!
//! ```text
//! <input_data_folder>/family/<full_parsed_file>
//! <outputs_folder>/family/<stem>.<ext>            normalized records
//! <outputs_folder>/family/<stem>_pivot.<ext>      cumulative daily pivot
//! <outputs_folder>/family/<stem>_summary.xlsx     one sheet per window
//! <videos_folder>/family/family_bcr.mp4           with RunOptions::video
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::core::aggregate::{pivot, window_summaries};
use crate::core::normalize::{NormalizeOptions, normalize};
use crate::core::period::Period;
use crate::core::table::Table;
use crate::error::ChatraceError;
use crate::format::{OutputFormat, write_table, write_workbook};
use crate::parser::ExportParser;
use crate::race::{CommandRenderer, RaceConfig, RaceRenderer, video_path};

/// Per-invocation choices.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Raw sender → canonical name.
    pub name_map: HashMap<String, String>,
    /// Relative lookback.
    pub period: Option<Period>,
    /// Absolute start date.
    pub start_date: Option<NaiveDate>,
    /// Replace senders with pseudonyms.
    pub anonymize: bool,
    /// Render the bar chart race.
    pub video: bool,
}

impl RunOptions {
    /// Creates options with no filters, no anonymization and no video.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the name map.
    #[must_use]
    pub fn with_name_map(mut self, name_map: HashMap<String, String>) -> Self {
        self.name_map = name_map;
        self
    }

    /// Sets the relative lookback.
    #[must_use]
    pub fn with_period(mut self, period: Option<Period>) -> Self {
        self.period = period;
        self
    }

    /// Sets the absolute start date.
    #[must_use]
    pub fn with_start_date(mut self, date: Option<NaiveDate>) -> Self {
        self.start_date = date;
        self
    }

    /// Enables anonymization.
    #[must_use]
    pub fn with_anonymize(mut self, anonymize: bool) -> Self {
        self.anonymize = anonymize;
        self
    }

    /// Enables video rendering.
    #[must_use]
    pub fn with_video(mut self, video: bool) -> Self {
        self.video = video;
        self
    }
}

/// What a run did.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// Messages parsed from the export.
    pub parsed: usize,
    /// Export lines skipped.
    pub skipped: usize,
    /// Records left after normalization.
    pub records: usize,
    /// Distinct senders after normalization.
    pub senders: usize,
    /// Output file stem.
    pub stem: String,
    /// Full-parse snapshot.
    pub full_parsed: PathBuf,
    /// Every table file written, in write order.
    pub outputs: Vec<PathBuf>,
    /// Rendered video, if any.
    pub video: Option<PathBuf>,
}

/// The configured pipeline.
pub struct Pipeline {
    config: Config,
    renderer: Option<Box<dyn RaceRenderer>>,
}

impl Pipeline {
    /// Creates a pipeline. Videos are rendered with the configured
    /// `bcr_configs.command` unless [`with_renderer`](Self::with_renderer)
    /// overrides it.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            renderer: None,
        }
    }

    /// Uses `renderer` for videos.
    #[must_use]
    pub fn with_renderer(mut self, renderer: impl RaceRenderer + 'static) -> Self {
        self.renderer = Some(Box::new(renderer));
        self
    }

    /// The configuration in use.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Merges file configuration and per-run choices.
    pub fn normalize_options(&self, run: &RunOptions) -> NormalizeOptions {
        let mut options = NormalizeOptions::new()
            .with_name_map(run.name_map.clone())
            .with_truncate_chars(self.config.processing.truncate_names_chars)
            .with_skip_words(self.config.skip_words.iter().cloned())
            .with_anonymize(run.anonymize);
        if let Some(period) = run.period {
            options = options.with_period(period);
        }
        if let Some(date) = run.start_date {
            options = options.with_start_date(date);
        }
        options
    }

    /// Runs every stage for `project` over the export at `data_path`.
    ///
    /// Stops at the first write failure; files already written stay.
    pub fn run(
        &self,
        project: &str,
        data_path: &Path,
        run: &RunOptions,
        now: NaiveDateTime,
    ) -> Result<RunReport, ChatraceError> {
        let parser = ExportParser::with_timestamp_format(&self.config.parser.timestamp_format);
        let parsed = parser.parse(data_path)?;

        let mut report = RunReport {
            parsed: parsed.messages.len(),
            skipped: parsed.skipped.len(),
            ..RunReport::default()
        };

        report.full_parsed = self.config.paths.full_parsed_path(project);
        write_snapshot(
            &Table::from_messages("full_parsed", &parsed.messages),
            &report.full_parsed,
        )?;
        info!(path = %report.full_parsed.display(), "saved full parse");

        let normalized = normalize(parsed.messages, &self.normalize_options(run), project, now)?;
        let records = normalized.records;
        report.stem = normalized.stem;
        report.records = records.len();
        report.senders = {
            let mut senders: Vec<&str> = records.iter().map(|r| r.sender.as_str()).collect();
            senders.sort_unstable();
            senders.dedup();
            senders.len()
        };
        info!(
            records = report.records,
            senders = report.senders,
            stem = %report.stem,
            "normalized records"
        );
        if records.is_empty() {
            warn!("no records left after normalization; outputs will be empty");
        }

        let out_dir = self.config.paths.output_dir(project);
        fs::create_dir_all(&out_dir)?;

        let pivot_table = pivot(&records);
        let summaries = window_summaries(&records, &self.config.summary_windows, now);

        let record_table = Table::from_records(&report.stem, &records);
        let pivot_stem = format!("{}_pivot", report.stem);
        let pivot_out = Table::from_pivot(&pivot_stem, &pivot_table);
        let summary_tables: Vec<Table> = summaries
            .iter()
            .map(|s| Table::from_summary(&s.label, &s.rows))
            .collect();

        for &format in &self.config.formats {
            for table in [&record_table, &pivot_out] {
                let path = format.path_for(&out_dir, &table.name);
                write_table(table, &path, format)?;
                debug!(path = %path.display(), "wrote table");
                report.outputs.push(path);
            }
            report
                .outputs
                .extend(write_summaries(&summary_tables, &out_dir, &report.stem, format)?);
        }
        info!(
            dir = %out_dir.display(),
            files = report.outputs.len(),
            "wrote outputs"
        );

        if run.video {
            if pivot_table.is_empty() {
                warn!("skipping video: no records to animate");
            } else {
                let output = video_path(&self.config.paths.video_dir(project), project);
                let race = RaceConfig::from_settings(&self.config.race, project);
                match &self.renderer {
                    Some(renderer) => renderer.render(&pivot_table, &race, &output)?,
                    None => CommandRenderer::from_command(&self.config.race.command)?
                        .render(&pivot_table, &race, &output)?,
                }
                report.video = Some(output);
            }
        }

        Ok(report)
    }
}

/// Writes the full-parse snapshot in the format its file extension names,
/// Parquet when the extension is not recognized.
fn write_snapshot(table: &Table, path: &Path) -> Result<(), ChatraceError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let format = OutputFormat::from_path(path).unwrap_or(OutputFormat::Parquet);
    write_table(table, path, format)
}

/// XLSX gets one workbook with a sheet per window; other formats get one
/// file per window.
fn write_summaries(
    tables: &[Table],
    dir: &Path,
    stem: &str,
    format: OutputFormat,
) -> Result<Vec<PathBuf>, ChatraceError> {
    if format == OutputFormat::Xlsx {
        let path = format.path_for(dir, &format!("{stem}_summary"));
        write_workbook(tables, &path)?;
        return Ok(vec![path]);
    }

    tables
        .iter()
        .map(|table| {
            let path = format.path_for(dir, &format!("{stem}_summary_{}", table.name));
            write_table(table, &path, format).map(|()| path)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ParserConfig, PathsConfig, ProcessingConfig, RaceSettings};
    use crate::core::aggregate::PivotTable;
    use std::cell::RefCell;
    use std::rc::Rc;
    use tempfile::{TempDir, tempdir};

    const EXPORT: &str = "Messages are end-to-end encrypted.\n\
                          12/01/23, 10:00 - Alice: hi\n\
                          12/01/23, 10:05 - Bob: hey\n\
                          12/02/23, 09:00 - Alice: yo\n\
                          12/02/23, 09:30 - Group notice: Bob changed the icon\n";

    fn config(root: &Path, formats: Vec<OutputFormat>) -> Config {
        Config {
            paths: PathsConfig {
                input_data_folder: root.join("data"),
                outputs_folder: root.join("outputs"),
                videos_folder: root.join("videos"),
                full_parsed_file: "full_parsed.csv".into(),
            },
            processing: ProcessingConfig {
                truncate_names_chars: 20,
            },
            skip_words: vec!["notice".into()],
            formats,
            summary_windows: vec![Period::days(30)],
            parser: ParserConfig::default(),
            race: RaceSettings {
                n_bars: 5,
                steps_per_period: 10,
                period_length: 500,
                title: None,
                command: Vec::new(),
            },
        }
    }

    fn setup() -> (TempDir, PathBuf) {
        let dir = tempdir().unwrap();
        let export = dir.path().join("chat.txt");
        fs::write(&export, EXPORT).unwrap();
        (dir, export)
    }

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 12, 10)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_run_csv_outputs() {
        let (dir, export) = setup();
        let pipeline = Pipeline::new(config(dir.path(), vec![OutputFormat::Csv]));

        let report = pipeline
            .run("family", &export, &RunOptions::new(), now())
            .unwrap();

        assert_eq!(report.parsed, 4);
        assert_eq!(report.skipped, 0);
        assert_eq!(report.records, 3);
        assert_eq!(report.senders, 2);
        assert_eq!(report.stem, "family");
        assert!(report.video.is_none());

        let out = dir.path().join("outputs").join("family");
        let pivot = fs::read_to_string(out.join("family_pivot.csv")).unwrap();
        assert_eq!(pivot, "dt_date;Alice;Bob\n2023-12-01;1;1\n2023-12-02;2;1\n");

        let summary = fs::read_to_string(out.join("family_summary_all.csv")).unwrap();
        assert!(summary.contains("Alice;2;66.7"));
        assert!(out.join("family_summary_30d.csv").exists());

        let full = fs::read_to_string(&report.full_parsed).unwrap();
        assert!(full.contains("Group notice"));
        assert_eq!(report.outputs.len(), 4);
    }

    #[test]
    fn test_run_stem_with_filters() {
        let (dir, export) = setup();
        let pipeline = Pipeline::new(config(dir.path(), vec![OutputFormat::Csv]));
        let run = RunOptions::new()
            .with_period(Some(Period::days(30)))
            .with_start_date(NaiveDate::from_ymd_opt(2023, 12, 1));

        let report = pipeline.run("family", &export, &run, now()).unwrap();

        assert_eq!(report.stem, "family_period_0y0m30d_20231201");
        assert_eq!(report.records, 3);
        assert!(
            dir.path()
                .join("outputs/family/family_period_0y0m30d_20231201.csv")
                .exists()
        );
    }

    #[test]
    fn test_run_with_mapping_and_anonymization() {
        let (dir, export) = setup();
        let pipeline = Pipeline::new(config(dir.path(), vec![OutputFormat::Csv]));
        let run = RunOptions::new()
            .with_name_map(HashMap::from([("Bob".to_string(), "Robert".to_string())]))
            .with_anonymize(true);

        pipeline.run("family", &export, &run, now()).unwrap();

        let records =
            fs::read_to_string(dir.path().join("outputs/family/family.csv")).unwrap();
        assert!(records.contains(";user1;"));
        assert!(records.contains(";user2;"));
        assert!(!records.contains("Robert"));
        assert!(!records.contains("Alice"));
    }

    #[test]
    fn test_video_without_command_fails() {
        let (dir, export) = setup();
        let pipeline = Pipeline::new(config(dir.path(), vec![OutputFormat::Csv]));
        let err = pipeline
            .run("family", &export, &RunOptions::new().with_video(true), now())
            .unwrap_err();
        assert!(matches!(err, ChatraceError::Render(_)));
    }

    struct Recording(Rc<RefCell<Vec<(usize, String, PathBuf)>>>);

    impl RaceRenderer for Recording {
        fn render(
            &self,
            pivot: &PivotTable,
            config: &RaceConfig,
            output: &Path,
        ) -> Result<(), ChatraceError> {
            self.0
                .borrow_mut()
                .push((pivot.dates().len(), config.title.clone(), output.to_path_buf()));
            Ok(())
        }
    }

    #[test]
    fn test_video_uses_injected_renderer() {
        let (dir, export) = setup();
        let calls = Rc::new(RefCell::new(Vec::new()));
        let pipeline = Pipeline::new(config(dir.path(), vec![OutputFormat::Csv]))
            .with_renderer(Recording(Rc::clone(&calls)));

        let report = pipeline
            .run("family", &export, &RunOptions::new().with_video(true), now())
            .unwrap();

        let calls = calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, 2);
        assert_eq!(calls[0].1, "Bar Chart family");
        assert_eq!(
            calls[0].2,
            dir.path().join("videos/family/family_bcr.mp4")
        );
        assert_eq!(report.video.as_deref(), Some(calls[0].2.as_path()));
    }

    #[test]
    fn test_empty_result_skips_video() {
        let (dir, export) = setup();
        let calls = Rc::new(RefCell::new(Vec::new()));
        let pipeline = Pipeline::new(config(dir.path(), vec![OutputFormat::Csv]))
            .with_renderer(Recording(Rc::clone(&calls)));
        let run = RunOptions::new()
            .with_video(true)
            .with_start_date(NaiveDate::from_ymd_opt(2024, 1, 1));

        let report = pipeline.run("family", &export, &run, now()).unwrap();

        assert_eq!(report.records, 0);
        assert!(report.video.is_none());
        assert!(calls.borrow().is_empty());
        let pivot =
            fs::read_to_string(dir.path().join("outputs/family/family_20240101_pivot.csv"))
                .unwrap();
        assert_eq!(pivot, "dt_date\n");
    }

    #[test]
    fn test_missing_export_is_io_error() {
        let dir = tempdir().unwrap();
        let pipeline = Pipeline::new(config(dir.path(), vec![OutputFormat::Csv]));
        let err = pipeline
            .run("family", &dir.path().join("nope.txt"), &RunOptions::new(), now())
            .unwrap_err();
        assert!(err.is_io());
    }

    #[cfg(feature = "xlsx-output")]
    #[test]
    fn test_xlsx_summary_workbook() {
        let (dir, export) = setup();
        let pipeline = Pipeline::new(config(dir.path(), vec![OutputFormat::Xlsx]));
        let report = pipeline
            .run("family", &export, &RunOptions::new(), now())
            .unwrap();

        let out = dir.path().join("outputs/family");
        assert!(out.join("family.xlsx").exists());
        assert!(out.join("family_pivot.xlsx").exists());
        assert!(out.join("family_summary.xlsx").exists());
        assert_eq!(report.outputs.len(), 3);
    }

    #[cfg(feature = "xlsx-output")]
    #[test]
    fn test_xlsx_keeps_running_on_over_long_message() {
        let (dir, export) = setup();
        let long = format!("{EXPORT}12/03/23, 08:00 - Bob: {}\n", "x".repeat(40_000));
        fs::write(&export, long).unwrap();

        let pipeline = Pipeline::new(config(dir.path(), vec![OutputFormat::Xlsx]));
        let report = pipeline
            .run("family", &export, &RunOptions::new(), now())
            .unwrap();

        assert_eq!(report.records, 4);
        assert!(dir.path().join("outputs/family/family.xlsx").exists());
    }

    #[cfg(feature = "parquet-output")]
    #[test]
    fn test_parquet_pivot_with_sender_named_like_index() {
        let (dir, export) = setup();
        fs::write(&export, format!("{EXPORT}12/03/23, 08:00 - dt_date: hi\n")).unwrap();

        let pipeline = Pipeline::new(config(dir.path(), vec![OutputFormat::Parquet]));
        pipeline
            .run("family", &export, &RunOptions::new(), now())
            .unwrap();

        assert!(dir.path().join("outputs/family/family_pivot.parquet").exists());
    }
}
