use std::env;
use std::path::PathBuf;

use chrono::NaiveDate;

use crate::calendar::parse_mackolik_date;
use crate::matcher::MIN_MATCH_SCORE;
use crate::reconcile::ReconcileConfig;

const DEFAULT_MACKOLIK_DIR: &str = "mackolik-excel-json/json_output";
const DEFAULT_SOFASCORE_DIR: &str = "sofa";
const DEFAULT_MERGED_DIR: &str = "merged/merged_json";
const DEFAULT_DATA_DIR: &str = "oddsy-data/data";
const DEFAULT_DROPPING_ODDS_FILE: &str = "filtered/oran_dusen_maclar.json";
const DEFAULT_BACKUP_DIR: &str = "filtered";

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub mackolik_dir: PathBuf,
    pub sofascore_dir: PathBuf,
    pub merged_dir: PathBuf,
    pub data_dir: PathBuf,
    pub dropping_odds_file: PathBuf,
    pub backup_dir: PathBuf,
    pub xlsx_backup: bool,
    pub reconcile: ReconcileConfig,
    /// Overrides the Istanbul calendar date, mainly for reruns.
    pub today: Option<NaiveDate>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl PipelineConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let path = |key: &str, default: &str| {
            PathBuf::from(get(key).unwrap_or_else(|| default.to_string()))
        };

        let min_score = get("ODDSY_MIN_MATCH_SCORE")
            .and_then(|v| v.parse::<f64>().ok())
            .filter(|v| v.is_finite())
            .unwrap_or(MIN_MATCH_SCORE)
            .clamp(0.0, 2.0);

        Self {
            mackolik_dir: path("ODDSY_MACKOLIK_DIR", DEFAULT_MACKOLIK_DIR),
            sofascore_dir: path("ODDSY_SOFASCORE_DIR", DEFAULT_SOFASCORE_DIR),
            merged_dir: path("ODDSY_MERGED_DIR", DEFAULT_MERGED_DIR),
            data_dir: path("ODDSY_DATA_DIR", DEFAULT_DATA_DIR),
            dropping_odds_file: path("ODDSY_DROPPING_ODDS_FILE", DEFAULT_DROPPING_ODDS_FILE),
            backup_dir: path("ODDSY_BACKUP_DIR", DEFAULT_BACKUP_DIR),
            xlsx_backup: get("ODDSY_XLSX_BACKUP")
                .map(|v| parse_bool(&v))
                .unwrap_or(true),
            reconcile: ReconcileConfig { min_score },
            today: get("ODDSY_TODAY").and_then(|v| parse_mackolik_date(&v).ok()),
        }
    }
}

fn parse_bool(raw: &str) -> bool {
    let t = raw.trim().to_ascii_lowercase();
    !(t.is_empty() || t == "0" || t == "false" || t == "off" || t == "no")
}
