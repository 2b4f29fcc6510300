use std::collections::HashSet;

/// Normalized strings are identical
pub const EXACT_MATCH: u32 = 0;
/// One normalized string contains the other
pub const CONTAINS_MATCH: u32 = 1;
/// The strings share at least one token
pub const TOKEN_OVERLAP: u32 = 2;
/// Nothing in common, or a location is missing
pub const FAR: u32 = 100;

/// Closeness of two free-text locations, lower is closer
///
/// This is a deterministic string heuristic, not a geographic distance:
/// * either side missing or blank => [`FAR`]
/// * equal after trimming and case folding => [`EXACT_MATCH`]
/// * one contains the other => [`CONTAINS_MATCH`]
/// * a common token (split on whitespace, `,`, `.`, `-`) => [`TOKEN_OVERLAP`]
/// * otherwise => [`FAR`]
pub fn proximity_score(a: Option<&str>, b: Option<&str>) -> u32 {
    let (Some(a), Some(b)) = (a, b) else {
        return FAR;
    };

    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();
    if a.is_empty() || b.is_empty() {
        return FAR;
    }

    if a == b {
        return EXACT_MATCH;
    }
    if a.contains(&b) || b.contains(&a) {
        return CONTAINS_MATCH;
    }

    let tokens_a = tokens(&a);
    if tokens(&b).iter().any(|t| tokens_a.contains(t)) {
        return TOKEN_OVERLAP;
    }

    FAR
}

#[inline]
fn tokens(s: &str) -> HashSet<&str> {
    s.split(|c: char| c.is_whitespace() || matches!(c, ',' | '.' | '-'))
        .filter(|t| !t.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match_ignores_case_and_padding() {
        assert_eq!(proximity_score(Some("  Pune "), Some("pune")), EXACT_MATCH);
    }

    #[test]
    fn test_substring() {
        assert_eq!(proximity_score(Some("Kothrud, Pune"), Some("pune")), CONTAINS_MATCH);
        assert_eq!(proximity_score(Some("pune"), Some("Kothrud, Pune")), CONTAINS_MATCH);
    }

    #[test]
    fn test_token_overlap() {
        assert_eq!(proximity_score(Some("Baner-Pune"), Some("Pune.Camp")), TOKEN_OVERLAP);
        assert_eq!(proximity_score(Some("north side, springfield"), Some("springfield east")), TOKEN_OVERLAP);
    }

    #[test]
    fn test_missing_or_unrelated_is_far() {
        assert_eq!(proximity_score(None, Some("Pune")), FAR);
        assert_eq!(proximity_score(Some("Pune"), Some("   ")), FAR);
        assert_eq!(proximity_score(Some("Mumbai"), Some("Delhi")), FAR);
    }

    #[test]
    fn test_separators_alone_do_not_overlap() {
        // Empty tokens produced by adjacent separators must not count as common
        assert_eq!(proximity_score(Some("a,,b"), Some("c,,d")), FAR);
    }
}
