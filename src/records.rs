use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum RecordError {
    #[error("malformed {source_name} record #{index}: {reason}")]
    MalformedInput {
        source_name: &'static str,
        index: usize,
        reason: String,
    },
    #[error("invalid date {raw:?}, expected {expected}")]
    InvalidDate { raw: String, expected: &'static str },
}

/// Source A (Mackolik) day file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MackolikDay {
    /// `DD.MM.YYYY`, Istanbul local date.
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub total_matches: usize,
    #[serde(default)]
    pub matches: Vec<MackolikMatch>,
}

/// Source A fixture. Odds are decimal prices; the exporter writes 0.0 for a
/// missing price.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct MackolikMatch {
    #[serde(default)]
    pub home_team: String,
    #[serde(default)]
    pub away_team: String,
    #[serde(default)]
    pub saat: String,
    #[serde(default)]
    pub ms_1: Option<f64>,
    #[serde(default)]
    pub ms_x: Option<f64>,
    #[serde(default)]
    pub ms_2: Option<f64>,
    #[serde(default)]
    pub kg_var: Option<f64>,
    #[serde(default)]
    pub kg_yok: Option<f64>,
    #[serde(default)]
    pub ust_2_5: Option<f64>,
    #[serde(default)]
    pub alt_2_5: Option<f64>,
    #[serde(default)]
    pub ust_3_5: Option<f64>,
    #[serde(default)]
    pub alt_3_5: Option<f64>,
    #[serde(default)]
    pub ust_5_5: Option<f64>,
}

/// Sofascore event ids arrive as numbers but older dumps stored strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventId {
    Number(u64),
    Text(String),
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventId::Number(n) => write!(f, "{n}"),
            EventId::Text(s) => f.write_str(s),
        }
    }
}

/// Source B (Sofascore) fixture.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SofascoreMatch {
    #[serde(default)]
    pub event_id: Option<EventId>,
    /// `YYYY-MM-DD HH:MM:SS`, or `"N/A"` when the provider had no start time.
    #[serde(default)]
    pub date_time: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub league: Option<String>,
    #[serde(default)]
    pub home_team: String,
    #[serde(default)]
    pub away_team: String,
    #[serde(default)]
    pub home_win: Option<f64>,
    #[serde(default)]
    pub draw: Option<f64>,
    #[serde(default)]
    pub away_win: Option<f64>,
    #[serde(default)]
    pub over_2_5: Option<f64>,
    #[serde(default)]
    pub under_2_5: Option<f64>,
    #[serde(default)]
    pub over_3_5: Option<f64>,
    #[serde(default)]
    pub under_3_5: Option<f64>,
    #[serde(default)]
    pub btts_yes: Option<f64>,
    #[serde(default)]
    pub btts_no: Option<f64>,
}

impl SofascoreMatch {
    /// Index key: raw names joined with `_`.
    pub fn key(&self) -> String {
        fixture_key(&self.home_team, &self.away_team)
    }

    pub fn kickoff(&self) -> Option<&str> {
        self.date_time
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("n/a"))
    }
}

pub fn fixture_key(home: &str, away: &str) -> String {
    format!("{home}_{away}")
}

/// Sofascore dumps are either a bare array or wrapped in `{"matches": [...]}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SofascoreFile {
    List(Vec<SofascoreMatch>),
    Wrapped {
        #[serde(default)]
        matches: Vec<SofascoreMatch>,
    },
}

impl SofascoreFile {
    pub fn into_matches(self) -> Vec<SofascoreMatch> {
        match self {
            SofascoreFile::List(m) | SofascoreFile::Wrapped { matches: m } => m,
        }
    }
}

/// One reconciled fixture. Field names are the frontend filter's contract.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MergedFixture {
    pub event_id: Option<EventId>,
    pub date_time: Option<String>,
    pub home_team: String,
    pub away_team: String,
    pub saat: String,
    pub beraberlik_orani: Option<f64>,
    pub kg_var: Option<f64>,
    #[serde(rename = "2_5_ust")]
    pub ust_2_5: Option<f64>,
    #[serde(rename = "3_5_ust")]
    pub ust_3_5: Option<f64>,
    #[serde(rename = "ms_5_5_ust")]
    pub ms_ust_5_5: Option<f64>,
}

/// Serialized output for one day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MergedDay {
    pub date: String,
    pub timestamp: String,
    pub total_merged: usize,
    pub matches: Vec<MergedFixture>,
}

pub trait TeamPair {
    const SOURCE: &'static str;
    fn home_team(&self) -> &str;
    fn away_team(&self) -> &str;
}

impl TeamPair for MackolikMatch {
    const SOURCE: &'static str = "mackolik";
    fn home_team(&self) -> &str {
        &self.home_team
    }
    fn away_team(&self) -> &str {
        &self.away_team
    }
}

impl TeamPair for SofascoreMatch {
    const SOURCE: &'static str = "sofascore";
    fn home_team(&self) -> &str {
        &self.home_team
    }
    fn away_team(&self) -> &str {
        &self.away_team
    }
}

/// Both team names must be present and non-blank.
pub fn validate<T: TeamPair>(index: usize, record: &T) -> Result<(), RecordError> {
    let missing = match (
        record.home_team().trim().is_empty(),
        record.away_team().trim().is_empty(),
    ) {
        (false, false) => return Ok(()),
        (true, true) => "home_team and away_team missing",
        (true, false) => "home_team missing",
        (false, true) => "away_team missing",
    };
    Err(RecordError::MalformedInput {
        source_name: T::SOURCE,
        index,
        reason: missing.to_string(),
    })
}
