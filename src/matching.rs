//! Fuzzy team-name reconciliation
//!
//! Dataset team names and scraped team names disagree in spelling,
//! abbreviation and formatting ("Univ. of Louisville" vs "Louisville"),
//! so candidates are paired by normalized string similarity instead of
//! a manual alias table.

use strsim::normalized_levenshtein;

/// Minimum similarity (0-100 scale) for an accepted pairing.
/// A score of exactly the threshold is accepted.
pub const MATCH_THRESHOLD: f64 = 80.0;

/// Tokens that carry no distinguishing weight between school names
const FILLER_TOKENS: &[&str] = &["university", "univ", "of", "the", "college"];

/// A candidate pairing with its confidence score
#[derive(Debug, Clone, PartialEq)]
pub struct NameMatch<'a> {
    pub name: &'a str,
    pub score: f64,
}

/// Lowercase, fold punctuation to spaces, collapse whitespace and drop
/// filler tokens. Names made up entirely of filler keep their tokens
/// unfiltered so they still compare against each other.
pub fn normalize(name: &str) -> String {
    let folded: String = name
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();

    let tokens: Vec<&str> = folded.split_whitespace().collect();
    let kept: Vec<&str> = tokens
        .iter()
        .copied()
        .filter(|t| !FILLER_TOKENS.contains(t))
        .collect();

    if kept.is_empty() {
        tokens.join(" ")
    } else {
        kept.join(" ")
    }
}

/// Similarity between two raw names on a 0-100 scale.
///
/// Word order is not penalized: the token-sorted forms are scored as
/// well and the better ratio wins.
pub fn similarity(a: &str, b: &str) -> f64 {
    score_normalized(&normalize(a), &normalize(b))
}

fn score_normalized(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let direct = normalized_levenshtein(a, b);
    let sorted = normalized_levenshtein(&sort_tokens(a), &sort_tokens(b));
    direct.max(sorted) * 100.0
}

fn sort_tokens(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// Find the best candidate for a query name, if it is confident enough.
///
/// Every candidate is scored and the maximum wins; the comparison is
/// strict, so equal top scores keep the first-encountered candidate.
/// Returns `None` when the candidate set is empty or the best score
/// falls below [`MATCH_THRESHOLD`].
pub fn best_match<'a, I>(query: &str, candidates: I) -> Option<NameMatch<'a>>
where
    I: IntoIterator<Item = &'a str>,
{
    let normalized_query = normalize(query);

    let mut best: Option<NameMatch<'a>> = None;
    for candidate in candidates {
        let score = score_normalized(&normalized_query, &normalize(candidate));
        if best.as_ref().map_or(true, |b| score > b.score) {
            best = Some(NameMatch {
                name: candidate,
                score,
            });
        }
    }

    best.filter(|m| m.score >= MATCH_THRESHOLD)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("Univ. of Louisville"), "louisville");
        assert_eq!(normalize("North Carolina St."), "north carolina st");
        assert_eq!(normalize("Miami (FL)"), "miami fl");
        assert_eq!(normalize("  Gonzaga  "), "gonzaga");
    }

    #[test]
    fn test_normalize_all_filler_falls_back() {
        // nothing but filler keeps the raw tokens instead of going empty
        assert_eq!(normalize("The University"), "the university");
    }

    #[test]
    fn test_similarity_identical_names() {
        assert_eq!(similarity("Louisville", "Louisville"), 100.0);
        assert_eq!(similarity("Univ. of Louisville", "Louisville"), 100.0);
    }

    #[test]
    fn test_similarity_ignores_word_order() {
        assert_eq!(similarity("State Michigan", "Michigan State"), 100.0);
    }

    #[test]
    fn test_similarity_unrelated_names() {
        assert!(similarity("Gonzaga", "Kentucky") < MATCH_THRESHOLD);
    }

    #[test]
    fn test_best_match_abbreviated_query() {
        let candidates = ["Duke", "Louisville", "Kansas"];
        let m = best_match("Univ. of Louisville", candidates).unwrap();

        assert_eq!(m.name, "Louisville");
        assert!(m.score >= MATCH_THRESHOLD);
    }

    #[test]
    fn test_best_match_threshold_boundary() {
        // one edit in five characters scores exactly 80 and is accepted
        assert_eq!(similarity("bruin", "bruix"), 80.0);
        let m = best_match("bruin", ["bruix"]).unwrap();
        assert_eq!(m.name, "bruix");

        // one edit in four characters scores 75 and is rejected
        assert_eq!(similarity("bru", "brux"), 75.0);
        assert!(best_match("bru", ["brux"]).is_none());
    }

    #[test]
    fn test_best_match_rejects_weak_candidates() {
        assert!(best_match("Gonzaga", ["Kentucky", "Duke"]).is_none());
    }

    #[test]
    fn test_best_match_empty_candidates() {
        assert!(best_match("Louisville", []).is_none());
    }

    #[test]
    fn test_best_match_tie_keeps_first() {
        // equal top scores resolve to candidate iteration order
        let m = best_match("Saint Marys", ["Saint Marys", "Saint  Marys"]).unwrap();
        assert_eq!(m.name, "Saint Marys");
        assert_eq!(m.score, 100.0);
    }
}
