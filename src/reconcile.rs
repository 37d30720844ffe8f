use std::collections::{HashMap, HashSet};
use std::fmt;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::calendar::format_sofascore_date;
use crate::matcher::{CandidateSet, MIN_MATCH_SCORE};
use crate::normalize::normalize_team_name;
use crate::records::{
    MackolikMatch, MergedDay, MergedFixture, RecordError, SofascoreMatch, fixture_key, validate,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReconcileConfig {
    /// Floor used inside the matcher (inclusive) and for the per-leg
    /// acceptance check here (exclusive).
    pub min_score: f64,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            min_score: MIN_MATCH_SCORE,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum UnmatchReason {
    /// At least one leg did not clear the threshold.
    NoConfidentMatch { home_score: f64, away_score: f64 },
    /// Both legs matched but B has no fixture with that exact pairing.
    KeyNotFound { key: String },
    /// The same home/away pair already produced a merged fixture today.
    DuplicateFixture,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnmatchedFixture {
    pub home_team: String,
    pub away_team: String,
    pub reason: UnmatchReason,
}

impl fmt::Display for UnmatchedFixture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} vs {}", self.home_team, self.away_team)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReconcileOutcome {
    pub merged: Vec<MergedFixture>,
    pub unmatched: Vec<UnmatchedFixture>,
    /// Records excluded at the boundary, from either source.
    pub rejected: Vec<RecordError>,
}

impl ReconcileOutcome {
    pub fn unmatched_labels(&self) -> Vec<String> {
        self.unmatched.iter().map(|u| u.to_string()).collect()
    }

    pub fn into_merged_day(
        self,
        date: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> MergedDay {
        MergedDay {
            date: date.into(),
            timestamp: timestamp.into(),
            total_merged: self.merged.len(),
            matches: self.merged,
        }
    }
}

/// Pair one day of Mackolik fixtures with the same day's Sofascore fixtures.
///
/// Each A fixture resolves its home and away names independently against the
/// B home and away universes; both legs must score above the threshold and
/// the recombined `home_away` key must exist in B. Failures are recorded per
/// fixture and never stop the run. `day` is only used to build a kickoff when
/// B has none; no date filtering happens here.
pub fn reconcile(
    day_a: &[MackolikMatch],
    day_b: &[SofascoreMatch],
    day: Option<NaiveDate>,
    cfg: &ReconcileConfig,
) -> ReconcileOutcome {
    let mut outcome = ReconcileOutcome::default();

    let mut index: HashMap<String, &SofascoreMatch> = HashMap::with_capacity(day_b.len());
    let mut valid_b = Vec::with_capacity(day_b.len());
    for (i, fixture) in day_b.iter().enumerate() {
        if let Err(err) = validate(i, fixture) {
            warn!(%err, "excluding sofascore record");
            outcome.rejected.push(err);
            continue;
        }
        let key = fixture.key();
        if index.insert(key.clone(), fixture).is_some() {
            warn!(key = %key, "duplicate sofascore fixture key, keeping last");
            continue;
        }
        valid_b.push(fixture);
    }

    let home_universe = CandidateSet::new(valid_b.iter().map(|m| m.home_team.as_str()));
    let away_universe = CandidateSet::new(valid_b.iter().map(|m| m.away_team.as_str()));

    let mut emitted: HashSet<(&str, &str)> = HashSet::new();

    for (i, fixture) in day_a.iter().enumerate() {
        if let Err(err) = validate(i, fixture) {
            warn!(%err, "excluding mackolik record");
            outcome.rejected.push(err);
            continue;
        }

        let unmatched = |reason| UnmatchedFixture {
            home_team: fixture.home_team.clone(),
            away_team: fixture.away_team.clone(),
            reason,
        };

        if emitted.contains(&(fixture.home_team.as_str(), fixture.away_team.as_str())) {
            debug!(home = %fixture.home_team, away = %fixture.away_team, "duplicate fixture");
            outcome.unmatched.push(unmatched(UnmatchReason::DuplicateFixture));
            continue;
        }

        let home_name = normalize_team_name(&fixture.home_team);
        let away_name = normalize_team_name(&fixture.away_team);
        let home = home_universe.best_match(&home_name, cfg.min_score);
        let away = away_universe.best_match(&away_name, cfg.min_score);

        let (Some(best_home), Some(best_away)) = (home.candidate, away.candidate) else {
            debug!(
                home = %fixture.home_team,
                away = %fixture.away_team,
                home_score = home.score,
                away_score = away.score,
                "no confident match"
            );
            outcome.unmatched.push(unmatched(UnmatchReason::NoConfidentMatch {
                home_score: home.score,
                away_score: away.score,
            }));
            continue;
        };

        // The matcher floor is inclusive; acceptance here is strict.
        if home.score <= cfg.min_score || away.score <= cfg.min_score {
            debug!(
                home = %fixture.home_team,
                away = %fixture.away_team,
                home_score = home.score,
                away_score = away.score,
                "leg score at threshold"
            );
            outcome.unmatched.push(unmatched(UnmatchReason::NoConfidentMatch {
                home_score: home.score,
                away_score: away.score,
            }));
            continue;
        }

        let key = fixture_key(best_home, best_away);
        let Some(source_b) = index.get(&key) else {
            debug!(
                home = %fixture.home_team,
                away = %fixture.away_team,
                key = %key,
                "key not found"
            );
            outcome
                .unmatched
                .push(unmatched(UnmatchReason::KeyNotFound { key }));
            continue;
        };

        debug!(
            home = %fixture.home_team,
            away = %fixture.away_team,
            matched = %key,
            "merged"
        );
        emitted.insert((fixture.home_team.as_str(), fixture.away_team.as_str()));
        outcome.merged.push(merge_fixture(fixture, source_b, day));
    }

    info!(
        merged = outcome.merged.len(),
        unmatched = outcome.unmatched.len(),
        rejected = outcome.rejected.len(),
        "reconcile finished"
    );
    outcome
}

fn merge_fixture(a: &MackolikMatch, b: &SofascoreMatch, day: Option<NaiveDate>) -> MergedFixture {
    let date_time = b.kickoff().map(str::to_string).or_else(|| {
        let saat = a.saat.trim();
        match day {
            Some(d) if !saat.is_empty() => {
                Some(format!("{} {saat}:00", format_sofascore_date(d)))
            }
            _ => None,
        }
    });

    MergedFixture {
        event_id: b.event_id.clone(),
        date_time,
        home_team: a.home_team.clone(),
        away_team: a.away_team.clone(),
        saat: a.saat.clone(),
        beraberlik_orani: b.draw,
        kg_var: a.kg_var,
        ust_2_5: a.ust_2_5,
        ust_3_5: a.ust_3_5,
        ms_ust_5_5: a.ust_5_5,
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{ReconcileConfig, UnmatchReason, reconcile};
    use crate::records::{EventId, MackolikMatch, RecordError, SofascoreMatch};

    fn a(home: &str, away: &str) -> MackolikMatch {
        MackolikMatch {
            home_team: home.to_string(),
            away_team: away.to_string(),
            saat: "20:00".to_string(),
            kg_var: Some(1.7),
            ust_2_5: Some(1.9),
            ust_3_5: Some(3.1),
            ust_5_5: Some(9.0),
            ..Default::default()
        }
    }

    fn b(id: u64, home: &str, away: &str, draw: f64) -> SofascoreMatch {
        SofascoreMatch {
            event_id: Some(EventId::Number(id)),
            date_time: Some("2026-02-09 17:00:00".to_string()),
            country: None,
            league: None,
            home_team: home.to_string(),
            away_team: away.to_string(),
            home_win: None,
            draw: Some(draw),
            away_win: None,
            over_2_5: None,
            under_2_5: None,
            over_3_5: None,
            under_3_5: None,
            btts_yes: None,
            btts_no: None,
        }
    }

    fn day() -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(2026, 2, 9)
    }

    #[test]
    fn merges_across_spelling_differences() {
        let out = reconcile(
            &[a("Galatasaray", "Fenerbahce")],
            &[b(123, "Galatasaray SK", "Fenerbahçe", 3.40)],
            day(),
            &ReconcileConfig::default(),
        );
        assert_eq!(out.merged.len(), 1);
        let m = &out.merged[0];
        assert_eq!(m.event_id, Some(EventId::Number(123)));
        assert_eq!(m.beraberlik_orani, Some(3.40));
        assert_eq!(m.home_team, "Galatasaray");
        assert_eq!(m.away_team, "Fenerbahce");
        assert_eq!(m.saat, "20:00");
        assert_eq!(m.date_time.as_deref(), Some("2026-02-09 17:00:00"));
        assert_eq!(m.kg_var, Some(1.7));
        assert_eq!(m.ms_ust_5_5, Some(9.0));
        assert!(out.unmatched.is_empty());
    }

    #[test]
    fn unrelated_names_stay_unmatched() {
        let out = reconcile(
            &[a("Deportivo X", "Club Y")],
            &[b(1, "Kayserispor", "Trabzonspor", 3.2)],
            day(),
            &ReconcileConfig::default(),
        );
        assert!(out.merged.is_empty());
        assert_eq!(out.unmatched_labels(), ["Deportivo X vs Club Y"]);
        assert!(matches!(
            out.unmatched[0].reason,
            UnmatchReason::NoConfidentMatch { .. }
        ));
    }

    #[test]
    fn empty_b_day_is_not_an_error() {
        let out = reconcile(
            &[a("Galatasaray", "Fenerbahce"), a("Rizespor", "Sivasspor")],
            &[],
            day(),
            &ReconcileConfig::default(),
        );
        assert!(out.merged.is_empty());
        assert_eq!(out.unmatched.len(), 2);
    }

    #[test]
    fn cross_paired_legs_report_missing_key() {
        // Each leg resolves, but B never paired these two teams.
        let out = reconcile(
            &[a("Gaziantep", "Erzurumspor")],
            &[
                b(1, "Gaziantep FK", "Kocaelispor", 3.3),
                b(2, "Sakaryaspor", "Erzurumspor FK", 3.5),
            ],
            day(),
            &ReconcileConfig::default(),
        );
        assert!(out.merged.is_empty());
        assert_eq!(
            out.unmatched[0].reason,
            UnmatchReason::KeyNotFound {
                key: "Gaziantep FK_Erzurumspor FK".to_string()
            }
        );
    }

    #[test]
    fn picks_single_best_home_candidate() {
        let out = reconcile(
            &[a("Sheffield Utd", "Leeds")],
            &[
                b(10, "Sheffield Wednesday", "Leeds United", 3.6),
                b(11, "Sheffield United", "Leeds United", 3.3),
            ],
            day(),
            &ReconcileConfig::default(),
        );
        assert_eq!(out.merged.len(), 1);
        assert_eq!(out.merged[0].event_id, Some(EventId::Number(11)));
    }

    #[test]
    fn leg_exactly_at_threshold_is_rejected() {
        // Both legs score exactly 0.6: accepted by the matcher, refused here.
        let out = reconcile(
            &[a("abcde", "fghij")],
            &[b(5, "abcxy", "fghxy", 3.0)],
            day(),
            &ReconcileConfig::default(),
        );
        assert!(out.merged.is_empty());
        assert_eq!(
            out.unmatched[0].reason,
            UnmatchReason::NoConfidentMatch {
                home_score: 0.6,
                away_score: 0.6
            }
        );
    }

    #[test]
    fn duplicate_pairs_merge_once() {
        let out = reconcile(
            &[a("Galatasaray", "Fenerbahce"), a("Galatasaray", "Fenerbahce")],
            &[b(123, "Galatasaray SK", "Fenerbahçe", 3.40)],
            day(),
            &ReconcileConfig::default(),
        );
        assert_eq!(out.merged.len(), 1);
        assert_eq!(out.unmatched[0].reason, UnmatchReason::DuplicateFixture);
    }

    #[test]
    fn repeated_sofascore_key_keeps_last_record() {
        let out = reconcile(
            &[a("Rizespor", "Sivasspor")],
            &[
                b(1, "Rizespor", "Sivasspor", 3.1),
                b(2, "Rizespor", "Sivasspor", 4.5),
            ],
            day(),
            &ReconcileConfig::default(),
        );
        assert_eq!(out.merged.len(), 1);
        assert_eq!(out.merged[0].event_id, Some(EventId::Number(2)));
        assert_eq!(out.merged[0].beraberlik_orani, Some(4.5));
    }

    #[test]
    fn malformed_records_are_excluded() {
        let out = reconcile(
            &[a("", "Fenerbahce"), a("Galatasaray", "Fenerbahce")],
            &[
                b(9, "Galatasaray SK", "", 3.1),
                b(123, "Galatasaray SK", "Fenerbahçe", 3.40),
            ],
            day(),
            &ReconcileConfig::default(),
        );
        assert_eq!(out.merged.len(), 1);
        assert_eq!(out.rejected.len(), 2);
        assert!(
            out.rejected
                .iter()
                .all(|e| matches!(e, RecordError::MalformedInput { .. }))
        );
    }

    #[test]
    fn kickoff_falls_back_to_mackolik_time() {
        let mut source_b = b(7, "Rizespor", "Sivasspor", 3.2);
        source_b.date_time = Some("N/A".to_string());
        let out = reconcile(
            &[a("Rizespor", "Sivasspor")],
            &[source_b],
            day(),
            &ReconcileConfig::default(),
        );
        assert_eq!(out.merged[0].date_time.as_deref(), Some("2026-02-09 20:00:00"));
    }

    #[test]
    fn does_not_filter_by_date() {
        // Same names on a "different" day still merge: pairing days is the
        // caller's job.
        let mut source_b = b(8, "Rizespor", "Sivasspor", 3.2);
        source_b.date_time = Some("2026-02-10 19:00:00".to_string());
        let out = reconcile(
            &[a("Rizespor", "Sivasspor")],
            &[source_b],
            day(),
            &ReconcileConfig::default(),
        );
        assert_eq!(out.merged.len(), 1);
    }

    #[test]
    fn merged_day_counts_matches() {
        let out = reconcile(
            &[a("Galatasaray", "Fenerbahce")],
            &[b(123, "Galatasaray SK", "Fenerbahçe", 3.40)],
            day(),
            &ReconcileConfig::default(),
        );
        let doc = out.into_merged_day("09.02.2026", "2026-02-09T10:00:00+03:00");
        assert_eq!(doc.total_merged, 1);
        assert_eq!(doc.date, "09.02.2026");
    }
}
