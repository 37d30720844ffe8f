use std::collections::HashSet;

use crate::normalize::{NormalizedName, normalize_team_name};
use crate::similarity::score;

/// Minimum composite score for a candidate to count as a match.
pub const MIN_MATCH_SCORE: f64 = 0.60;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BestMatch<'a> {
    /// `None` when nothing reached the floor.
    pub candidate: Option<&'a str>,
    /// Best score seen, reported even when below the floor.
    pub score: f64,
}

impl BestMatch<'_> {
    fn none(score: f64) -> Self {
        Self {
            candidate: None,
            score,
        }
    }
}

/// All team names one provider reported for one side on one day, each
/// normalized once. Iteration order is the input order with repeated raw
/// spellings dropped, so ties always resolve to the first-seen name.
#[derive(Debug, Clone, Default)]
pub struct CandidateSet {
    entries: Vec<(String, NormalizedName)>,
}

impl CandidateSet {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut entries = Vec::new();
        for name in names {
            let raw = name.as_ref();
            if raw.trim().is_empty() || !seen.insert(raw.to_string()) {
                continue;
            }
            entries.push((raw.to_string(), normalize_team_name(raw)));
        }
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(raw, _)| raw.as_str())
    }

    /// Highest-scoring candidate for an already normalized name.
    ///
    /// An exact normalized match returns immediately with 1.0. Otherwise the
    /// strictly greatest score wins, first seen on ties, and anything below
    /// `floor` is reported as no match.
    pub fn best_match(&self, name: &NormalizedName, floor: f64) -> BestMatch<'_> {
        let mut best: Option<&str> = None;
        let mut best_score = 0.0;

        for (raw, normalized) in &self.entries {
            if name == normalized {
                return BestMatch {
                    candidate: Some(raw.as_str()),
                    score: 1.0,
                };
            }
            let s = score(name, normalized);
            if s > best_score {
                best_score = s;
                best = Some(raw.as_str());
            }
        }

        if best_score < floor {
            return BestMatch::none(best_score);
        }
        BestMatch {
            candidate: best,
            score: best_score,
        }
    }
}

/// One-shot form of [`CandidateSet::best_match`] for a raw name and a raw
/// candidate list.
pub fn find_best_match<'a, S>(name: &str, candidates: &'a [S], floor: f64) -> BestMatch<'a>
where
    S: AsRef<str>,
{
    let normalized = normalize_team_name(name);
    let mut best: Option<&'a str> = None;
    let mut best_score = 0.0;

    for candidate in candidates {
        let raw = candidate.as_ref();
        let other = normalize_team_name(raw);
        if normalized == other {
            return BestMatch {
                candidate: Some(raw),
                score: 1.0,
            };
        }
        let s = score(&normalized, &other);
        if s > best_score {
            best_score = s;
            best = Some(raw);
        }
    }

    if best_score < floor {
        return BestMatch::none(best_score);
    }
    BestMatch {
        candidate: best,
        score: best_score,
    }
}
