//! End-to-end CLI tests for chatrace.
//!
//! These tests run the actual binary against a temporary project layout
//! and check its output and the files it writes.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test --test cli_e2e
//! ```

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{TempDir, tempdir};

// ============================================================================
// Test Fixtures
// ============================================================================

const EXPORT: &str = "12/01/23, 09:00 - Messages and calls are end-to-end encrypted.
12/01/23, 10:00 - Alice: hi
12/01/23, 10:05 - +1 555 0100: hey
12/02/23, 09:00 - Alice: yo
this line continues the previous message
12/02/23, 09:30 - Group notice: icon changed
12/03/23, 18:45 - Carol: 👋
";

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        Self::with_race("")
    }

    /// `race_extra` is appended to the `bcr_configs` block.
    fn with_race(race_extra: &str) -> Self {
        let dir = tempdir().expect("Failed to create temp dir");
        let root = dir.path().display().to_string();

        let config = format!(
            "paths:
  input_data_folder: {root}/data
  outputs_folder: {root}/outputs
  videos_folder: {root}/videos
  full_parsed_file: full_parsed.csv
configs:
  truncate_names_chars: 20
skip_words: [\"notice\"]
formats: [csv]
summary_windows: [\"30d\"]
bcr_configs:
  n_bars: 10
  steps_per_period: 10
  period_length: 500
{race_extra}"
        );
        fs::write(dir.path().join("config.yaml"), config).unwrap();
        fs::write(dir.path().join("chat.txt"), EXPORT).unwrap();
        fs::write(
            dir.path().join("map.yaml"),
            "mapping:\n  \"+1 555 0100\": Bob\n",
        )
        .unwrap();

        Self { dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn outputs(&self, project: &str) -> PathBuf {
        self.dir.path().join("outputs").join(project)
    }

    /// `chatrace -n <project> -d chat.txt -c config.yaml`
    fn cmd(&self, project: &str) -> Command {
        let mut cmd = chatrace_cmd();
        cmd.arg("-n")
            .arg(project)
            .arg("-d")
            .arg(self.path("chat.txt"))
            .arg("-c")
            .arg(self.path("config.yaml"))
            .env_remove("RUST_LOG");
        cmd
    }
}

fn chatrace_cmd() -> Command {
    let cmd = std::process::Command::new(env!("CARGO_BIN_EXE_chatrace"));
    Command::from_std(cmd)
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| panic!("{}: {e}", path.display()))
}

// ============================================================================
// Basic Functionality
// ============================================================================

mod basic {
    use super::*;

    #[test]
    fn test_run_writes_outputs() {
        let fx = Fixture::new();
        fx.cmd("family")
            .assert()
            .success()
            .stdout(predicate::str::contains("Done"))
            .stdout(predicate::str::contains("Kept:      4 messages"));

        let out = fx.outputs("family");
        for name in [
            "family.csv",
            "family_pivot.csv",
            "family_summary_all.csv",
            "family_summary_30d.csv",
        ] {
            assert!(out.join(name).exists(), "missing {name}");
        }
        assert!(fx.path("data/family/full_parsed.csv").exists());
    }

    #[test]
    fn test_skipped_lines_reported() {
        let fx = Fixture::new();
        fx.cmd("family")
            .assert()
            .success()
            .stdout(predicate::str::contains("Skipped:   1 lines"));
    }

    #[test]
    fn test_full_parse_keeps_raw_senders() {
        let fx = Fixture::new();
        fx.cmd("family").assert().success();

        let snapshot = read(&fx.path("data/family/full_parsed.csv"));
        assert!(snapshot.starts_with("dt;name;msg\n"));
        assert!(snapshot.contains("Group notice"));
        assert!(snapshot.contains("+1 555 0100"));
    }

    #[test]
    fn test_help_lists_flags() {
        chatrace_cmd()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("--period"))
            .stdout(predicate::str::contains("--anon"));
    }
}

// ============================================================================
// Flags
// ============================================================================

mod flags {
    use super::*;

    #[test]
    fn test_map_substitutes_names() {
        let fx = Fixture::new();
        fx.cmd("family")
            .arg("-m")
            .arg(fx.path("map.yaml"))
            .assert()
            .success();

        let summary = read(&fx.outputs("family").join("family_summary_all.csv"));
        assert!(summary.contains("Bob;1;"));
        assert!(!summary.contains("+1 555 0100"));
    }

    #[test]
    fn test_anon_hides_names() {
        let fx = Fixture::new();
        fx.cmd("family").arg("--anon").assert().success();

        let pivot = read(&fx.outputs("family").join("family_pivot.csv"));
        assert_eq!(pivot.lines().next(), Some("dt_date;user1;user2;user3"));
        assert!(!pivot.contains("Alice"));
    }

    #[test]
    fn test_start_date_names_outputs() {
        let fx = Fixture::new();
        fx.cmd("family")
            .args(["-s", "2023-12-01"])
            .assert()
            .success()
            .stdout(predicate::str::contains("family_20231201"));

        let records = read(&fx.outputs("family").join("family_20231201.csv"));
        assert_eq!(records.lines().count(), 1 + 4);
    }

    #[test]
    fn test_start_date_filters_everything_before() {
        let fx = Fixture::new();
        fx.cmd("family")
            .args(["-s", "2023-12-02"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Kept:      2 messages"));
    }

    #[test]
    fn test_period_names_outputs() {
        let fx = Fixture::new();
        fx.cmd("family")
            .args(["-p", "1y"])
            .assert()
            .success()
            .stdout(predicate::str::contains("family_period_1y0m0d"));

        assert!(fx.outputs("family").join("family_period_1y0m0d.csv").exists());
    }

    #[test]
    fn test_log_dir_keeps_skipped_lines() {
        let fx = Fixture::new();
        fx.cmd("family")
            .arg("--log-dir")
            .arg(fx.path("logs"))
            .assert()
            .success();

        let days: Vec<PathBuf> = fs::read_dir(fx.path("logs"))
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect();
        assert_eq!(days.len(), 1);
        let log = read(&days[0].join("chatrace_error.log"));
        assert!(log.contains("skipping line"), "{log}");
        assert!(log.contains("this line continues the previous message"));
        assert!(!log.contains("INFO"));
    }

    #[test]
    fn test_verbose_logs_to_stderr() {
        let fx = Fixture::new();
        fx.cmd("family")
            .arg("-v")
            .assert()
            .success()
            .stderr(predicate::str::contains("DEBUG"));
    }
}

// ============================================================================
// Video
// ============================================================================

mod video {
    use super::*;

    #[test]
    fn test_video_without_renderer_command_fails() {
        let fx = Fixture::new();
        fx.cmd("family")
            .arg("--video")
            .assert()
            .failure()
            .stderr(predicate::str::contains("❌ Error"));
    }

    #[cfg(unix)]
    #[test]
    fn test_video_runs_renderer_command() {
        let fx = Fixture::with_race(
            "  title: Family race\n  command: [\"sh\", \"-c\", \"cp \\\"$2\\\" \\\"$6\\\"\", \"render\"]\n",
        );
        fx.cmd("family")
            .arg("--video")
            .assert()
            .success()
            .stdout(predicate::str::contains("Video"));

        let video = fx.path("videos/family/family_bcr.mp4");
        let pivot = read(&video);
        assert!(pivot.starts_with("dt_date;"));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

mod errors {
    use super::*;

    #[test]
    fn test_missing_config_fails() {
        let fx = Fixture::new();
        chatrace_cmd()
            .args(["-n", "family", "-d"])
            .arg(fx.path("chat.txt"))
            .arg("-c")
            .arg(fx.path("nope.yaml"))
            .assert()
            .failure()
            .stderr(predicate::str::contains("❌ Error"));
    }

    #[test]
    fn test_missing_export_fails() {
        let fx = Fixture::new();
        chatrace_cmd()
            .args(["-n", "family", "-d"])
            .arg(fx.path("missing.txt"))
            .arg("-c")
            .arg(fx.path("config.yaml"))
            .assert()
            .failure()
            .stderr(predicate::str::contains("❌ Error"));
    }

    #[test]
    fn test_invalid_period_rejected() {
        let fx = Fixture::new();
        fx.cmd("family")
            .args(["-p", "6w"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("--period"));
    }

    #[test]
    fn test_invalid_start_date_rejected() {
        let fx = Fixture::new();
        fx.cmd("family")
            .args(["-s", "01/12/2023"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("--start-date"));
    }

    #[test]
    fn test_bad_map_is_fatal_without_terminal() {
        let fx = Fixture::new();
        fx.cmd("family")
            .arg("-m")
            .arg(fx.path("missing_map.yaml"))
            .assert()
            .failure()
            .stderr(predicate::str::contains("❌ Error"));

        assert!(!fx.outputs("family").exists());
    }

    #[test]
    fn test_missing_name_on_closed_stdin_fails() {
        let fx = Fixture::new();
        chatrace_cmd()
            .arg("-d")
            .arg(fx.path("chat.txt"))
            .arg("-c")
            .arg(fx.path("config.yaml"))
            .write_stdin("")
            .assert()
            .failure();
    }

    #[test]
    fn test_prompted_name_is_used() {
        let fx = Fixture::new();
        chatrace_cmd()
            .arg("-d")
            .arg(fx.path("chat.txt"))
            .arg("-c")
            .arg(fx.path("config.yaml"))
            .write_stdin("\nprompted\n")
            .assert()
            .success();

        assert!(fx.outputs("prompted").join("prompted.csv").exists());
    }
}
