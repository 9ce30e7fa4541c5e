//! # chatrace CLI
//!
//! Command-line interface for the chatrace library.

use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process;
use std::time::Instant;

use chrono::Local;
use clap::Parser as ClapParser;

use chatrace::ChatraceError;
use chatrace::cli::{Args, init_logging, load_name_map};
use chatrace::config::Config;
use chatrace::pipeline::{Pipeline, RunOptions};
use chatrace::prompt::prompt_required;

fn main() {
    if let Err(e) = run() {
        eprintln!("❌ Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<(), ChatraceError> {
    let total_start = Instant::now();
    let args = <Args as ClapParser>::parse();
    init_logging(
        args.verbose,
        args.log_dir.as_deref(),
        Local::now().date_naive(),
    )?;

    let interactive = io::stdin().is_terminal();

    let name = match args.name.clone() {
        Some(name) => name,
        None => ask("Project name")?,
    };
    let data = match args.data.clone() {
        Some(data) => data,
        None => PathBuf::from(ask("Path to the chat export")?),
    };

    // Print header
    println!("📦 chatrace v{}", env!("CARGO_PKG_VERSION"));
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("🔧 Project: '{}'", name);
    println!("📋 Data:    {}", data.display());
    println!("📋 Config:  {}", args.config.display());
    match &args.map {
        Some(map) => println!("🗺️  Map:     {}", map.display()),
        None => println!("🗺️  Map:     (none)"),
    }
    if let Some(period) = args.period {
        println!("📅 Period:  {}", period);
    }
    if let Some(start) = args.start_date {
        println!("📅 After:   {}", start);
    }
    if args.anon {
        println!("🕶️  Anonymized authors");
    }
    println!();

    let config = Config::load(&args.config)?;
    let name_map = load_name_map(args.map.as_deref(), interactive)?;
    if args.map.is_some() && name_map.is_empty() {
        println!("⚠️  No name substitutions loaded");
    }

    let options = RunOptions::new()
        .with_name_map(name_map)
        .with_period(args.period)
        .with_start_date(args.start_date)
        .with_anonymize(args.anon)
        .with_video(args.video);

    println!("⏳ Processing...");
    let now = Local::now().naive_local();
    let report = Pipeline::new(config).run(&name, &data, &options, now)?;

    let total_time = total_start.elapsed();

    println!();
    println!("✅ Done! Outputs saved as {}.*", report.stem);
    for path in &report.outputs {
        println!("   {}", path.display());
    }
    if let Some(video) = &report.video {
        println!("🎬 Video:   {}", video.display());
    }

    // Summary
    println!();
    println!("📊 Summary:");
    println!("   Parsed:    {} messages", report.parsed);
    println!("   Skipped:   {} lines", report.skipped);
    println!("   Kept:      {} messages", report.records);
    println!("   Authors:   {}", report.senders);
    println!("   Snapshot:  {}", report.full_parsed.display());

    println!();
    println!("⚡ Total time: {:.2}s", total_time.as_secs_f64());

    Ok(())
}

/// Prompts on stdin/stdout for a required value.
fn ask(label: &str) -> Result<String, ChatraceError> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();
    Ok(prompt_required(&mut input, &mut output, label)?)
}
