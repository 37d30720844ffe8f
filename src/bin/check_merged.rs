use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

use oddsy_merge::calendar::parse_mackolik_date;
use oddsy_merge::config::PipelineConfig;
use oddsy_merge::pipeline::{MERGED_PREFIX, list_json_files};
use oddsy_merge::records::MergedDay;

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PipelineConfig::from_env().merged_dir);

    // DD.MM.YYYY names do not sort chronologically, so compare parsed dates.
    let latest = list_json_files(&dir)?
        .into_iter()
        .filter_map(|p| {
            let date = p
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| s.strip_prefix(MERGED_PREFIX))
                .and_then(|s| parse_mackolik_date(s).ok())?;
            Some((date, p))
        })
        .max_by_key(|(date, _)| *date)
        .map(|(_, p)| p);
    let Some(latest) = latest else {
        println!("No merged JSON files found in {}", dir.display());
        return Ok(());
    };

    let raw = fs::read_to_string(&latest)
        .with_context(|| format!("failed reading {}", latest.display()))?;
    let day: MergedDay = serde_json::from_str(&raw)
        .with_context(|| format!("invalid merged json {}", latest.display()))?;

    println!("Latest merged file: {}", latest.display());
    println!("Date: {}", day.date);
    println!("Total merged: {}", day.total_merged);
    println!();
    println!("First 5 merged matches:");
    for (idx, m) in day.matches.iter().take(5).enumerate() {
        let draw = m
            .beraberlik_orani
            .map(|d| format!("{d:.2}"))
            .unwrap_or_else(|| "-".to_string());
        println!("{}. {} vs {} ({}, X {draw})", idx + 1, m.home_team, m.away_team, m.saat);
    }

    Ok(())
}
