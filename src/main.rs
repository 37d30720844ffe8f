use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use oddsy_merge::calendar::parse_mackolik_date;
use oddsy_merge::config::PipelineConfig;
use oddsy_merge::filter::{FilterReport, run_filter};
use oddsy_merge::pipeline::{MergeSummary, merge_all_dates};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Merge,
    Filter,
    Run,
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let command = parse_command(&args)?;
    let mut cfg = PipelineConfig::from_env();
    if let Some(raw) = parse_today_arg(&args) {
        cfg.today = Some(parse_mackolik_date(&raw).context("invalid --today")?);
    }

    if matches!(command, Command::Merge | Command::Run) {
        let summary = merge_all_dates(&cfg)?;
        print_merge_summary(&summary);
    }
    if matches!(command, Command::Filter | Command::Run) {
        let report = run_filter(&cfg)?;
        print_filter_report(&report);
    }

    Ok(())
}

fn parse_command(args: &[String]) -> Result<Command> {
    let mut positional = None;
    let mut skip_next = false;
    for arg in args {
        if skip_next {
            skip_next = false;
            continue;
        }
        if arg == "--today" {
            skip_next = true;
            continue;
        }
        if !arg.starts_with("--") {
            positional = Some(arg.as_str());
            break;
        }
    }
    let Some(first) = positional else {
        return Ok(Command::Run);
    };
    match first {
        "merge" => Ok(Command::Merge),
        "filter" => Ok(Command::Filter),
        "run" => Ok(Command::Run),
        other => Err(anyhow::anyhow!(
            "unknown command {other}, expected merge, filter or run"
        )),
    }
}

fn parse_today_arg(args: &[String]) -> Option<String> {
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix("--today=") {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == "--today" {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() {
                return Some(next.trim().to_string());
            }
        }
    }
    None
}

fn print_merge_summary(summary: &MergeSummary) {
    println!("Merge complete");
    println!("Files: {}", summary.days_found);
    println!(
        "Merged days: {} (past {}, no sofascore {}, bad date {}, repeated date {})",
        summary.days_merged,
        summary.days_skipped_past,
        summary.days_skipped_missing_b,
        summary.days_skipped_invalid,
        summary.days_skipped_superseded
    );
    for report in &summary.reports {
        println!(
            " - {}: {} merged, {} unmatched, {} rejected -> {}",
            report.date,
            report.merged,
            report.unmatched.len(),
            report.rejected,
            report.output.display()
        );
    }
    if !summary.errors.is_empty() {
        println!("Errors: {}", summary.errors.len());
        for err in summary.errors.iter().take(8) {
            println!(" - {err}");
        }
    }
}

fn print_filter_report(report: &FilterReport) {
    println!("Filter complete");
    println!("Merged files: {} ({} fixtures)", report.merged_files, report.fixtures);
    println!("Half-time goals: {}", report.half_time_goals);
    println!("Daily choices: {}", report.daily_choices);
    println!("Daily surprises: {}", report.daily_surprises);
    println!("Dropping odds: {}", report.dropping_odds);
    if !report.errors.is_empty() {
        println!("Errors: {}", report.errors.len());
        for err in report.errors.iter().take(8) {
            println!(" - {err}");
        }
    }
}
