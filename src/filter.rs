use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_xlsxwriter::{Workbook, Worksheet};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::calendar::{
    format_mackolik_date, is_current_or_future, istanbul_today, parse_mackolik_date,
};
use crate::config::PipelineConfig;
use crate::pipeline::{MERGED_PREFIX, list_json_files};
use crate::records::{MergedDay, MergedFixture};

pub const HALF_TIME_DRAW_MIN: f64 = 3.50;
pub const HALF_TIME_DRAW_MAX: f64 = 8.00;
pub const OVER_2_5_DRAW_ODDS: &[f64] = &[4.00, 4.10, 4.33, 4.50, 4.75];
pub const OVER_3_5_DRAW_ODDS: &[f64] = &[5.00, 5.25, 5.75, 6.00, 7.00, 8.00];
pub const SURPRISE_DRAW_ODDS: &[f64] = &[4.50, 4.75, 5.00, 5.25, 5.75, 6.00, 7.00, 8.00];

const ODDS_TOLERANCE: f64 = 0.005;

pub const CATEGORY_OVER_2_5: &str = "2.5 Üst";
pub const CATEGORY_OVER_3_5: &str = "3.5 Üst";
pub const CATEGORY_MS_OVER_5_5: &str = "MS 5.5 Üst";

pub const HALF_TIME_GOALS_FILE: &str = "halfTimeGoals.json";
pub const DAILY_CHOICES_FILE: &str = "dailyChoices.json";
pub const DAILY_SURPRISES_FILE: &str = "dailySurprises.json";
pub const DROPPING_ODDS_FILE: &str = "droppingOdds.json";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HalfTimeGoalPick {
    pub home_team: String,
    pub away_team: String,
    pub saat: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryPick {
    pub home_team: String,
    pub away_team: String,
    pub saat: String,
    pub kategori: String,
    #[serde(rename = "2_5_ust", skip_serializing_if = "Option::is_none", default)]
    pub ust_2_5: Option<f64>,
    #[serde(rename = "3_5_ust", skip_serializing_if = "Option::is_none", default)]
    pub ust_3_5: Option<f64>,
    #[serde(rename = "ms_5_5_ust", skip_serializing_if = "Option::is_none", default)]
    pub ms_ust_5_5: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct DailyLists {
    pub half_time_goals: Vec<HalfTimeGoalPick>,
    pub daily_choices: Vec<CategoryPick>,
    pub daily_surprises: Vec<CategoryPick>,
}

#[derive(Debug, Clone, Default)]
pub struct FilterReport {
    pub merged_files: usize,
    pub fixtures: usize,
    pub half_time_goals: usize,
    pub daily_choices: usize,
    pub daily_surprises: usize,
    pub dropping_odds: usize,
    pub outputs: Vec<PathBuf>,
    pub errors: Vec<String>,
}

fn odds_in(value: f64, set: &[f64]) -> bool {
    set.iter().any(|v| (value - v).abs() < ODDS_TOLERANCE)
}

fn positive(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v > 0.0)
}

fn pick(m: &MergedFixture, kategori: &str) -> CategoryPick {
    CategoryPick {
        home_team: m.home_team.clone(),
        away_team: m.away_team.clone(),
        saat: m.saat.clone(),
        kategori: kategori.to_string(),
        ust_2_5: None,
        ust_3_5: None,
        ms_ust_5_5: None,
    }
}

/// Build the three prediction lists from merged fixtures, keyed off the
/// draw odds. Choices list all 2.5 picks before all 3.5 picks.
pub fn build_daily_lists(matches: &[MergedFixture]) -> DailyLists {
    let mut lists = DailyLists::default();

    for m in matches {
        let Some(draw) = m.beraberlik_orani else {
            continue;
        };
        if (HALF_TIME_DRAW_MIN..=HALF_TIME_DRAW_MAX).contains(&draw) {
            lists.half_time_goals.push(HalfTimeGoalPick {
                home_team: m.home_team.clone(),
                away_team: m.away_team.clone(),
                saat: m.saat.clone(),
            });
        }
    }

    for m in matches {
        if let (Some(draw), Some(price)) = (m.beraberlik_orani, positive(m.ust_2_5))
            && odds_in(draw, OVER_2_5_DRAW_ODDS)
        {
            lists.daily_choices.push(CategoryPick {
                ust_2_5: Some(price),
                ..pick(m, CATEGORY_OVER_2_5)
            });
        }
    }
    for m in matches {
        if let (Some(draw), Some(price)) = (m.beraberlik_orani, positive(m.ust_3_5))
            && odds_in(draw, OVER_3_5_DRAW_ODDS)
        {
            lists.daily_choices.push(CategoryPick {
                ust_3_5: Some(price),
                ..pick(m, CATEGORY_OVER_3_5)
            });
        }
    }

    for m in matches {
        if let (Some(draw), Some(price)) = (m.beraberlik_orani, positive(m.ms_ust_5_5))
            && odds_in(draw, SURPRISE_DRAW_ODDS)
        {
            lists.daily_surprises.push(CategoryPick {
                ms_ust_5_5: Some(price),
                ..pick(m, CATEGORY_MS_OVER_5_5)
            });
        }
    }

    lists
}

/// Merged fixtures from every `merged_<DD.MM.YYYY>.json` dated today or later.
pub fn load_current_merged(
    dir: &Path,
    today: NaiveDate,
    report: &mut FilterReport,
) -> Result<Vec<MergedFixture>> {
    let mut out = Vec::new();
    for path in list_json_files(dir)? {
        let Some(date) = path
            .file_stem()
            .and_then(|s| s.to_str())
            .and_then(|s| s.strip_prefix(MERGED_PREFIX))
            .and_then(|s| parse_mackolik_date(s).ok())
        else {
            continue;
        };
        if !is_current_or_future(date, today) {
            continue;
        }
        let parsed = fs::read_to_string(&path)
            .with_context(|| format!("failed reading {}", path.display()))
            .and_then(|raw| {
                serde_json::from_str::<MergedDay>(&raw)
                    .with_context(|| format!("invalid merged json {}", path.display()))
            });
        match parsed {
            Ok(day) => {
                report.merged_files += 1;
                out.extend(day.matches);
            }
            Err(err) => {
                warn!(error = %format!("{err:#}"), "skipping merged file");
                report.errors.push(format!("{err:#}"));
            }
        }
    }
    Ok(out)
}

fn load_dropping_odds(path: &Path, report: &mut FilterReport) -> Vec<Value> {
    if !path.is_file() {
        return Vec::new();
    }
    let parsed = fs::read_to_string(path)
        .with_context(|| format!("failed reading {}", path.display()))
        .and_then(|raw| {
            serde_json::from_str::<Vec<Value>>(&raw)
                .with_context(|| format!("invalid dropping odds json {}", path.display()))
        });
    match parsed {
        Ok(rows) => rows,
        Err(err) => {
            warn!(error = %format!("{err:#}"), "dropping odds unreadable");
            report.errors.push(format!("{err:#}"));
            Vec::new()
        }
    }
}

fn write_json<T: Serialize + ?Sized>(dir: &Path, name: &str, value: &T) -> Result<PathBuf> {
    let path = dir.join(name);
    let body = serde_json::to_string_pretty(value).context("failed encoding filter output")?;
    fs::write(&path, body).with_context(|| format!("failed writing {}", path.display()))?;
    Ok(path)
}

/// Produce the frontend's daily JSON lists from the merged directory.
pub fn run_filter(cfg: &PipelineConfig) -> Result<FilterReport> {
    let today = cfg.today.unwrap_or_else(istanbul_today);
    let mut report = FilterReport::default();

    let matches = if cfg.merged_dir.is_dir() {
        load_current_merged(&cfg.merged_dir, today, &mut report)?
    } else {
        warn!(dir = %cfg.merged_dir.display(), "merged directory missing");
        Vec::new()
    };
    report.fixtures = matches.len();
    if report.merged_files == 0 {
        warn!(today = %today, "no current merged files, leaving lists untouched");
        return Ok(report);
    }

    let lists = build_daily_lists(&matches);
    let dropping = load_dropping_odds(&cfg.dropping_odds_file, &mut report);

    fs::create_dir_all(&cfg.data_dir)
        .with_context(|| format!("failed creating {}", cfg.data_dir.display()))?;
    report
        .outputs
        .push(write_json(&cfg.data_dir, HALF_TIME_GOALS_FILE, &lists.half_time_goals)?);
    report
        .outputs
        .push(write_json(&cfg.data_dir, DAILY_CHOICES_FILE, &lists.daily_choices)?);
    report
        .outputs
        .push(write_json(&cfg.data_dir, DAILY_SURPRISES_FILE, &lists.daily_surprises)?);
    report
        .outputs
        .push(write_json(&cfg.data_dir, DROPPING_ODDS_FILE, &dropping)?);

    report.half_time_goals = lists.half_time_goals.len();
    report.daily_choices = lists.daily_choices.len();
    report.daily_surprises = lists.daily_surprises.len();
    report.dropping_odds = dropping.len();

    if cfg.xlsx_backup {
        match write_backups(&cfg.backup_dir, today, &lists) {
            Ok(paths) => report.outputs.extend(paths),
            Err(err) => {
                warn!(error = %format!("{err:#}"), "xlsx backup failed");
                report.errors.push(format!("{err:#}"));
            }
        }
    }

    info!(
        fixtures = report.fixtures,
        half_time_goals = report.half_time_goals,
        daily_choices = report.daily_choices,
        daily_surprises = report.daily_surprises,
        dropping_odds = report.dropping_odds,
        "filter finished"
    );
    Ok(report)
}

/// Spreadsheet copies of the non-empty lists, one file per list.
pub fn write_backups(dir: &Path, today: NaiveDate, lists: &DailyLists) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).with_context(|| format!("failed creating {}", dir.display()))?;
    let stamp = format_mackolik_date(today);
    let mut written = Vec::new();

    if !lists.half_time_goals.is_empty() {
        let mut rows = vec![vec![
            "home_team".to_string(),
            "away_team".to_string(),
            "saat".to_string(),
        ]];
        rows.extend(
            lists
                .half_time_goals
                .iter()
                .map(|p| vec![p.home_team.clone(), p.away_team.clone(), p.saat.clone()]),
        );
        let path = dir.join(format!("ilk_yari_gol_{stamp}.xlsx"));
        save_workbook(&path, &rows)?;
        written.push(path);
    }
    if !lists.daily_choices.is_empty() {
        let path = dir.join(format!("gunun_tercihleri_{stamp}.xlsx"));
        save_workbook(&path, &category_rows(&lists.daily_choices))?;
        written.push(path);
    }
    if !lists.daily_surprises.is_empty() {
        let path = dir.join(format!("gunun_surprizleri_{stamp}.xlsx"));
        save_workbook(&path, &category_rows(&lists.daily_surprises))?;
        written.push(path);
    }
    Ok(written)
}

fn category_rows(picks: &[CategoryPick]) -> Vec<Vec<String>> {
    let fmt = |v: Option<f64>| v.map(|x| format!("{x:.2}")).unwrap_or_default();
    let mut rows = vec![vec![
        "home_team".to_string(),
        "away_team".to_string(),
        "saat".to_string(),
        "kategori".to_string(),
        "oran".to_string(),
    ]];
    for p in picks {
        rows.push(vec![
            p.home_team.clone(),
            p.away_team.clone(),
            p.saat.clone(),
            p.kategori.clone(),
            fmt(p.ust_2_5.or(p.ust_3_5).or(p.ms_ust_5_5)),
        ]);
    }
    rows
}

fn save_workbook(path: &Path, rows: &[Vec<String>]) -> Result<()> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    write_rows(sheet, rows)?;
    workbook
        .save(path)
        .with_context(|| format!("failed saving {}", path.display()))
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_idx as u32, col_idx as u16, value)
                .context("failed writing xlsx cell")?;
        }
    }
    Ok(())
}
