use std::collections::HashMap;
use std::fmt;

use deunicode::deunicode;
use once_cell::sync::Lazy;

/// Club designators replaced only when they stand alone as a word.
/// An empty replacement drops the word.
const DESIGNATORS: &[(&str, &str)] = &[
    ("fc", ""),
    ("cf", ""),
    ("sc", ""),
    ("ac", ""),
    ("as", ""),
    ("us", ""),
    ("cd", ""),
    ("ud", ""),
    ("sd", ""),
    ("sk", ""),
    ("fk", ""),
    ("ca", ""),
    ("club", ""),
    ("city", ""),
    ("town", ""),
    ("athletic", "ath"),
    ("united", "utd"),
    ("sporting", "sp"),
    ("olympique", "ol"),
    ("real", "r"),
    ("metropolitan", "metro"),
    ("phoenix", "phx"),
    ("wanderers", "wand"),
    ("rovers", "rov"),
];

static DESIGNATOR_MAP: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| DESIGNATORS.iter().copied().collect());

/// A team name in comparison form. Never shown to users.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct NormalizedName(String);

impl NormalizedName {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.0.split(' ').filter(|t| !t.is_empty())
    }

    pub fn first_token(&self) -> Option<&str> {
        self.tokens().next()
    }
}

impl fmt::Display for NormalizedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NormalizedName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Canonicalize a raw provider team name.
///
/// Transliterates to ASCII, lowercases, drops apostrophes and periods, turns
/// hyphens and any other punctuation into spaces, rewrites standalone club
/// designators ("fc", "united", "real", ...) and collapses whitespace.
/// Pure and idempotent; may return an empty name for noise-only input.
pub fn normalize_team_name(raw: &str) -> NormalizedName {
    // Transliterate before lowercasing so "İ" becomes "i" rather than "i̇".
    let ascii = deunicode(raw.trim()).to_lowercase();

    let mut cleaned = String::with_capacity(ascii.len());
    for ch in ascii.trim().chars() {
        match ch {
            '\'' | '`' | '.' => {}
            c if c.is_ascii_alphanumeric() => cleaned.push(c),
            _ => cleaned.push(' '),
        }
    }

    let words: Vec<&str> = cleaned
        .split_whitespace()
        .filter_map(|w| match DESIGNATOR_MAP.get(w) {
            Some(replacement) if replacement.is_empty() => None,
            Some(replacement) => Some(*replacement),
            None => Some(w),
        })
        .collect();

    NormalizedName(words.join(" "))
}
