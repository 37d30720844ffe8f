use std::collections::HashSet;

use rapidfuzz::distance::indel;

use crate::normalize::NormalizedName;

pub const SUBSTRING_BONUS: f64 = 0.3;
pub const FIRST_TOKEN_BONUS: f64 = 0.2;
pub const SHARED_TOKEN_BONUS: f64 = 0.1;

/// Composite similarity between two normalized names.
///
/// Identical names score exactly 1.0. Otherwise the LCS ratio is topped up
/// with additive bonuses for containment, a shared first word and each
/// distinct shared word, so the result can exceed 1.0. Two names that both
/// normalize to nothing are identical; an empty name against a non-empty one
/// scores 0.0.
pub fn score(a: &NormalizedName, b: &NormalizedName) -> f64 {
    if a == b {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let (sa, sb) = (a.as_str(), b.as_str());
    let mut total = lcs_ratio(sa, sb);

    if sa.contains(sb) || sb.contains(sa) {
        total += SUBSTRING_BONUS;
    }

    if let (Some(fa), Some(fb)) = (a.first_token(), b.first_token())
        && fa == fb
    {
        total += FIRST_TOKEN_BONUS;
    }

    let a_tokens: HashSet<&str> = a.tokens().collect();
    let shared = b
        .tokens()
        .collect::<HashSet<&str>>()
        .intersection(&a_tokens)
        .count();
    total += shared as f64 * SHARED_TOKEN_BONUS;

    total
}

/// `2 * LCS / (len(a) + len(b))` over chars; 1.0 for two empty strings.
pub fn lcs_ratio(a: &str, b: &str) -> f64 {
    indel::normalized_similarity(a.chars(), b.chars())
}

#[cfg(test)]
mod tests {
    use super::{lcs_ratio, score};
    use crate::normalize::normalize_team_name;

    fn s(a: &str, b: &str) -> f64 {
        score(&normalize_team_name(a), &normalize_team_name(b))
    }

    #[test]
    fn exact_match_is_one() {
        assert_eq!(s("Galatasaray", "Galatasaray"), 1.0);
        // Equal after normalization short-circuits too.
        assert_eq!(s("Galatasaray", "Galatasaray SK"), 1.0);
    }

    #[test]
    fn lcs_ratio_bounds() {
        assert_eq!(lcs_ratio("abc", "abc"), 1.0);
        assert_eq!(lcs_ratio("abc", "xyz"), 0.0);
        assert_eq!(lcs_ratio("", ""), 1.0);
        assert_eq!(lcs_ratio("abcde", "abcxy"), 0.6);
        // Multi-byte chars count once.
        assert!((lcs_ratio("münchen", "munchen") - 12.0 / 14.0).abs() < 1e-9);
    }

    #[test]
    fn containment_and_token_bonuses_add_up() {
        // "barcelona b" vs "barcelona": ratio 18/20, +0.3 substring,
        // +0.2 first token, +0.1 one shared token.
        let got = s("Barcelona B", "Barcelona");
        assert!((got - (0.9 + 0.3 + 0.2 + 0.1)).abs() < 1e-9, "got {got}");
    }

    #[test]
    fn disjoint_names_score_low() {
        assert!(s("Deportivo X", "Kayserispor") < 0.6);
        assert!(s("Club Y", "Trabzonspor") < 0.6);
    }

    #[test]
    fn noise_only_names_are_identical() {
        assert_eq!(s("FC", "SC"), 1.0);
        assert_eq!(s("F.C.", "Club"), 1.0);
    }

    #[test]
    fn empty_name_against_real_name_scores_zero() {
        assert_eq!(s("FC", "Arsenal"), 0.0);
        assert_eq!(s("Arsenal", "SC"), 0.0);
    }

    #[test]
    fn score_is_symmetric() {
        let pairs = [
            ("Galatasaray", "Galatasaray SK"),
            ("Manchester United", "Man Utd"),
            ("Inter Milan", "Internazionale"),
            ("Bayern München", "FC Bayern Munich"),
            ("Gaziantep FK", "Gazişehir Gaziantep"),
            ("Sheffield Wednesday", "Sheffield United"),
            ("Atletico Madrid", "Club Atlético de Madrid"),
            ("abcab", "bacba"),
        ];
        for (a, b) in pairs {
            assert_eq!(s(a, b), s(b, a), "asymmetric for {a:?} / {b:?}");
        }
    }
}
