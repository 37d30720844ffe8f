use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rayon::prelude::*;
use tracing::{info, warn};

use crate::calendar::{
    format_sofascore_date, is_current_or_future, istanbul_now_iso, istanbul_today,
    parse_mackolik_date,
};
use crate::config::PipelineConfig;
use crate::reconcile::{UnmatchedFixture, reconcile};
use crate::records::{MackolikDay, MergedDay, SofascoreFile, SofascoreMatch};

pub const SOFASCORE_PREFIX: &str = "sofascore_matches_";
pub const MERGED_PREFIX: &str = "merged_";

#[derive(Debug, Clone)]
pub struct DayReport {
    pub date: String,
    pub source_a: PathBuf,
    pub source_b: PathBuf,
    pub output: PathBuf,
    pub mackolik_total: usize,
    pub sofascore_total: usize,
    pub merged: usize,
    pub unmatched: Vec<UnmatchedFixture>,
    pub rejected: usize,
}

#[derive(Debug, Clone)]
pub enum DayOutcome {
    Merged(DayReport),
    SkippedPast { date: String },
    SkippedInvalidDate { raw: String },
    SkippedMissingSofascore { date: String, expected: PathBuf },
    /// Another Mackolik file later in name order carries the same date.
    SkippedSuperseded { date: String, by: PathBuf },
}

#[derive(Debug, Clone, Default)]
pub struct MergeSummary {
    pub days_found: usize,
    pub days_merged: usize,
    pub days_skipped_past: usize,
    pub days_skipped_invalid: usize,
    pub days_skipped_missing_b: usize,
    pub days_skipped_superseded: usize,
    pub reports: Vec<DayReport>,
    pub errors: Vec<String>,
}

pub fn load_mackolik_day(path: &Path) -> Result<MackolikDay> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed reading mackolik file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("invalid mackolik json {}", path.display()))
}

pub fn load_sofascore_day(path: &Path) -> Result<Vec<SofascoreMatch>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed reading sofascore file {}", path.display()))?;
    let file: SofascoreFile = serde_json::from_str(&raw)
        .with_context(|| format!("invalid sofascore json {}", path.display()))?;
    Ok(file.into_matches())
}

pub fn sofascore_path_for(dir: &Path, date: NaiveDate) -> PathBuf {
    dir.join(format!("{SOFASCORE_PREFIX}{}.json", format_sofascore_date(date)))
}

pub fn merged_path_for(dir: &Path, date: &str) -> PathBuf {
    dir.join(format!("{MERGED_PREFIX}{date}.json"))
}

pub fn write_merged_day(dir: &Path, day: &MergedDay) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed creating output dir {}", dir.display()))?;
    let path = merged_path_for(dir, &day.date);
    let body = serde_json::to_string_pretty(day).context("failed encoding merged day")?;
    fs::write(&path, body).with_context(|| format!("failed writing {}", path.display()))?;
    Ok(path)
}

/// JSON files directly inside `dir`, sorted by file name.
pub fn list_json_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("failed listing {}", dir.display()))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry
            .with_context(|| format!("failed listing {}", dir.display()))?
            .path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Reconcile one Mackolik day file with the Sofascore file of the same date
/// and write the merged document.
pub fn merge_day(source_a: &Path, cfg: &PipelineConfig, today: NaiveDate) -> Result<DayOutcome> {
    let day_a = load_mackolik_day(source_a)?;
    merge_loaded_day(source_a, day_a, cfg, today)
}

fn merge_loaded_day(
    source_a: &Path,
    day_a: MackolikDay,
    cfg: &PipelineConfig,
    today: NaiveDate,
) -> Result<DayOutcome> {
    let Ok(date) = parse_mackolik_date(&day_a.date) else {
        warn!(file = %source_a.display(), date = %day_a.date, "unparseable date, skipping");
        return Ok(DayOutcome::SkippedInvalidDate { raw: day_a.date });
    };
    if !is_current_or_future(date, today) {
        info!(file = %source_a.display(), date = %day_a.date, "past date, skipping");
        return Ok(DayOutcome::SkippedPast { date: day_a.date });
    }

    let source_b = sofascore_path_for(&cfg.sofascore_dir, date);
    if !source_b.is_file() {
        warn!(date = %day_a.date, expected = %source_b.display(), "no sofascore file for date");
        return Ok(DayOutcome::SkippedMissingSofascore {
            date: day_a.date,
            expected: source_b,
        });
    }
    let day_b = load_sofascore_day(&source_b)?;

    info!(
        date = %day_a.date,
        mackolik = day_a.matches.len(),
        sofascore = day_b.len(),
        "reconciling day"
    );
    let outcome = reconcile(&day_a.matches, &day_b, Some(date), &cfg.reconcile);
    for unmatched in &outcome.unmatched {
        info!(fixture = %unmatched, reason = ?unmatched.reason, "unmatched");
    }

    let merged = outcome.merged.len();
    let rejected = outcome.rejected.len();
    let unmatched = outcome.unmatched.clone();
    let document = outcome.into_merged_day(day_a.date.clone(), istanbul_now_iso());
    let output = write_merged_day(&cfg.merged_dir, &document)?;
    info!(
        date = %day_a.date,
        merged,
        unmatched = unmatched.len(),
        output = %output.display(),
        "day written"
    );

    Ok(DayOutcome::Merged(DayReport {
        date: day_a.date,
        source_a: source_a.to_path_buf(),
        source_b,
        output,
        mackolik_total: day_a.matches.len(),
        sofascore_total: day_b.len(),
        merged,
        unmatched,
        rejected,
    }))
}

/// Merge every Mackolik day that is today or later. Days run in parallel and
/// one day's failure never stops the others. When several files carry the
/// same date only the last one in name order is merged.
pub fn merge_all_dates(cfg: &PipelineConfig) -> Result<MergeSummary> {
    let today = cfg.today.unwrap_or_else(istanbul_today);
    let files = list_json_files(&cfg.mackolik_dir)?;

    let mut summary = MergeSummary {
        days_found: files.len(),
        ..Default::default()
    };
    if files.is_empty() {
        warn!(dir = %cfg.mackolik_dir.display(), "no mackolik json files found");
        return Ok(summary);
    }
    info!(files = files.len(), today = %today, "merging days");

    let loaded: Vec<(PathBuf, Result<MackolikDay>)> = files
        .par_iter()
        .map(|path| (path.clone(), load_mackolik_day(path)))
        .collect();

    let mut owner: HashMap<String, usize> = HashMap::new();
    for (idx, (_, day)) in loaded.iter().enumerate() {
        if let Ok(day) = day {
            owner.insert(day.date.trim().to_string(), idx);
        }
    }
    let owners: Vec<PathBuf> = loaded.iter().map(|(path, _)| path.clone()).collect();

    let results: Vec<(PathBuf, Result<DayOutcome>)> = loaded
        .into_par_iter()
        .enumerate()
        .map(|(idx, (path, day))| {
            let result = day.and_then(|day| match owner.get(day.date.trim()) {
                Some(&winner) if winner != idx => {
                    warn!(
                        file = %path.display(),
                        date = %day.date,
                        by = %owners[winner].display(),
                        "date repeated by a later file, skipping"
                    );
                    Ok(DayOutcome::SkippedSuperseded {
                        date: day.date,
                        by: owners[winner].clone(),
                    })
                }
                _ => merge_loaded_day(&path, day, cfg, today),
            });
            (path, result)
        })
        .collect();

    for (path, result) in results {
        match result {
            Ok(DayOutcome::Merged(report)) => {
                summary.days_merged += 1;
                summary.reports.push(report);
            }
            Ok(DayOutcome::SkippedPast { .. }) => summary.days_skipped_past += 1,
            Ok(DayOutcome::SkippedInvalidDate { .. }) => summary.days_skipped_invalid += 1,
            Ok(DayOutcome::SkippedMissingSofascore { .. }) => summary.days_skipped_missing_b += 1,
            Ok(DayOutcome::SkippedSuperseded { .. }) => summary.days_skipped_superseded += 1,
            Err(err) => {
                warn!(file = %path.display(), error = %format!("{err:#}"), "day failed");
                summary.errors.push(format!("{}: {err:#}", path.display()));
            }
        }
    }

    info!(
        merged = summary.days_merged,
        skipped_past = summary.days_skipped_past,
        skipped_missing_b = summary.days_skipped_missing_b,
        skipped_superseded = summary.days_skipped_superseded,
        errors = summary.errors.len(),
        "merge finished"
    );
    Ok(summary)
}
