//! Tiered title matching.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::external_catalog::CandidateBook;
use crate::metrics;

/// A single matching tier: picks the first qualifying candidate, if any.
pub type TierFn = for<'a> fn(&str, &'a [CandidateBook]) -> Option<&'a CandidateBook>;

/// Which tier produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    /// Title equals the query, ignoring case.
    Exact,
    /// Query is a contiguous substring of the title, ignoring case.
    Contains,
    /// Every query word appears in the title as a whole word.
    Keywords,
}

impl MatchTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchTier::Exact => "exact",
            MatchTier::Contains => "contains",
            MatchTier::Keywords => "keywords",
        }
    }

    /// The pure function implementing this tier.
    pub fn tier_fn(&self) -> TierFn {
        match self {
            MatchTier::Exact => exact_match,
            MatchTier::Contains => containment_match,
            MatchTier::Keywords => keyword_match,
        }
    }
}

/// The selected candidate and how it was found.
#[derive(Debug, Clone, PartialEq)]
pub struct TitleMatch<'a> {
    pub candidate: &'a CandidateBook,
    pub tier: MatchTier,
}

/// Selects at most one candidate for a user-supplied title.
#[derive(Debug, Clone)]
pub struct TitleMatcher {
    tiers: Vec<MatchTier>,
}

impl TitleMatcher {
    /// Matcher with the standard tier order: exact, contains, keywords.
    pub fn new() -> Self {
        Self {
            tiers: vec![MatchTier::Exact, MatchTier::Contains, MatchTier::Keywords],
        }
    }

    /// Matcher with a custom tier order.
    pub fn with_tiers(tiers: Vec<MatchTier>) -> Self {
        Self { tiers }
    }

    pub fn tiers(&self) -> &[MatchTier] {
        &self.tiers
    }

    /// Try each tier in order and return the first hit.
    ///
    /// `candidates` must be in the order the remote source returned them.
    pub fn find_best<'a>(
        &self,
        query: &str,
        candidates: &'a [CandidateBook],
    ) -> Option<TitleMatch<'a>> {
        let found = self.tiers.iter().find_map(|tier| {
            (tier.tier_fn())(query, candidates).map(|candidate| TitleMatch {
                candidate,
                tier: *tier,
            })
        });

        match &found {
            Some(m) => {
                debug!(
                    "Title match: query='{}' tier={} title='{}'",
                    query,
                    m.tier.as_str(),
                    m.candidate.title
                );
                metrics::MATCH_TIER
                    .with_label_values(&[m.tier.as_str()])
                    .inc();
            }
            None => {
                debug!(
                    "No title match: query='{}' candidates={}",
                    query,
                    candidates.len()
                );
                metrics::MATCH_TIER.with_label_values(&["none"]).inc();
            }
        }

        found
    }
}

impl Default for TitleMatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// First candidate whose title equals the trimmed query, ignoring case.
pub fn exact_match<'a>(query: &str, candidates: &'a [CandidateBook]) -> Option<&'a CandidateBook> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return None;
    }
    candidates
        .iter()
        .find(|c| c.title.to_lowercase() == query)
}

/// First candidate whose title contains the query, ignoring case.
///
/// Only query-within-title counts, never title-within-query.
pub fn containment_match<'a>(
    query: &str,
    candidates: &'a [CandidateBook],
) -> Option<&'a CandidateBook> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return None;
    }
    candidates
        .iter()
        .find(|c| c.title.to_lowercase().contains(&query))
}

/// First candidate whose title contains every query word as a whole word.
pub fn keyword_match<'a>(
    query: &str,
    candidates: &'a [CandidateBook],
) -> Option<&'a CandidateBook> {
    let query = query.to_lowercase();
    let keywords: Vec<&str> = query.split_whitespace().collect();
    if keywords.is_empty() {
        return None;
    }
    candidates.iter().find(|c| {
        let title = c.title.to_lowercase();
        keywords.iter().all(|kw| contains_whole_word(&title, kw))
    })
}

/// Whether `word` occurs in `haystack` bounded by non-alphanumeric
/// characters or the string edges on both sides.
pub fn contains_whole_word(haystack: &str, word: &str) -> bool {
    if word.is_empty() {
        return false;
    }
    haystack
        .char_indices()
        .filter(|(start, _)| haystack[*start..].starts_with(word))
        .any(|(start, _)| {
            let end = start + word.len();
            let before_ok = haystack[..start]
                .chars()
                .next_back()
                .map_or(true, |c| !c.is_alphanumeric());
            let after_ok = haystack[end..]
                .chars()
                .next()
                .map_or(true, |c| !c.is_alphanumeric());
            before_ok && after_ok
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(id: &str, title: &str) -> CandidateBook {
        CandidateBook {
            id: id.to_string(),
            title: title.to_string(),
            authors: vec![],
            languages: vec!["en".to_string()],
            download_count: 0,
        }
    }

    #[test]
    fn test_no_candidates_is_no_match() {
        let matcher = TitleMatcher::new();
        assert!(matcher.find_best("Anything", &[]).is_none());
    }

    #[test]
    fn test_exact_match_case_varied() {
        let candidates = vec![book("42", "Mushoku Tensei Jobless Reincarnation")];
        let matcher = TitleMatcher::new();

        let found = matcher
            .find_best("mushoku TENSEI jobless reincarnation", &candidates)
            .unwrap();
        assert_eq!(found.tier, MatchTier::Exact);
        assert_eq!(found.candidate.title, "Mushoku Tensei Jobless Reincarnation");
    }

    #[test]
    fn test_exact_tier_beats_earlier_contains_hit() {
        let candidates = vec![
            book("1", "Frankenstein; Or, The Modern Prometheus"),
            book("2", "Frankenstein"),
        ];
        let found = TitleMatcher::new()
            .find_best("frankenstein", &candidates)
            .unwrap();
        assert_eq!(found.tier, MatchTier::Exact);
        assert_eq!(found.candidate.id, "2");
    }

    #[test]
    fn test_exact_tier_trims_query() {
        let candidates = vec![book("1", "Dracula")];
        let found = TitleMatcher::new().find_best("  Dracula  ", &candidates).unwrap();
        assert_eq!(found.tier, MatchTier::Exact);
    }

    #[test]
    fn test_contains_tier_first_in_source_order() {
        let candidates = vec![
            book("1", "The Adventures of Sherlock Holmes"),
            book("2", "The Return of Sherlock Holmes"),
        ];
        let found = TitleMatcher::new()
            .find_best("sherlock holmes", &candidates)
            .unwrap();
        assert_eq!(found.tier, MatchTier::Contains);
        assert_eq!(found.candidate.id, "1");
    }

    #[test]
    fn test_contains_is_query_within_title_only() {
        let candidates = vec![book("1", "Emma")];
        assert!(containment_match("Emma Woodhouse", &candidates).is_none());
        assert!(TitleMatcher::new()
            .find_best("Emma Woodhouse", &candidates)
            .is_none());
    }

    #[test]
    fn test_prefix_of_a_longer_title_is_a_contains_hit() {
        let candidates = vec![book("15", "Tensei no Shitara Slime Datta Ken")];
        let found = TitleMatcher::new().find_best("Tensei", &candidates).unwrap();
        assert_eq!(found.tier, MatchTier::Contains);
    }

    #[test]
    fn test_keyword_tier_requires_whole_words() {
        // Not contiguous, and "tense" only appears inside "tensei".
        let candidates = vec![book("15", "Tensei no Shitara Slime Datta Ken")];
        assert!(TitleMatcher::new()
            .find_best("slime tense", &candidates)
            .is_none());
    }

    #[test]
    fn test_keyword_tier_matches_out_of_order_words() {
        let candidates = vec![
            book("1", "Tensei no Shitara Slime Datta Ken"),
            book("2", "Slime Datta Ken: Tensei Edition"),
        ];
        let found = TitleMatcher::new()
            .find_best("slime tensei", &candidates)
            .unwrap();
        assert_eq!(found.tier, MatchTier::Keywords);
        assert_eq!(found.candidate.id, "1");
    }

    #[test]
    fn test_keyword_tier_needs_every_keyword_in_same_candidate() {
        let candidates = vec![book("1", "War and Peace"), book("2", "Peace of Mind")];
        assert!(keyword_match("war mind", &candidates).is_none());
    }

    #[test]
    fn test_keyword_tier_alone_rejects_substring_of_larger_word() {
        let candidates = vec![book("15", "Tensei no Shitara Slime Datta Ken")];
        assert!(keyword_match("Tense", &candidates).is_none());
        assert!(keyword_match("Tensei", &candidates).is_some());
    }

    #[test]
    fn test_contains_tier_wins_over_keywords_elsewhere() {
        // Candidate 1 only satisfies keywords; candidate 2 contains the phrase.
        let candidates = vec![
            book("1", "Great Expectations: Gatsby Notes"),
            book("2", "The Great Gatsby"),
        ];
        let found = TitleMatcher::new().find_best("great gatsby", &candidates).unwrap();
        assert_eq!(found.tier, MatchTier::Contains);
        assert_eq!(found.candidate.id, "2");
    }

    #[test]
    fn test_custom_tier_order() {
        let candidates = vec![book("1", "Moby Dick; Or, The Whale")];
        let matcher = TitleMatcher::with_tiers(vec![MatchTier::Exact]);
        assert!(matcher.find_best("moby dick", &candidates).is_none());
        assert_eq!(matcher.tiers(), &[MatchTier::Exact]);
    }

    #[test]
    fn test_contains_whole_word_boundaries() {
        assert!(contains_whole_word("the great gatsby: a novel", "gatsby"));
        assert!(contains_whole_word("gatsby", "gatsby"));
        assert!(contains_whole_word("(gatsby)", "gatsby"));
        assert!(!contains_whole_word("gatsbyesque", "gatsby"));
        assert!(!contains_whole_word("the ungatsby", "gatsby"));
        assert!(!contains_whole_word("anything", ""));
    }

    #[test]
    fn test_contains_whole_word_finds_later_occurrence() {
        assert!(contains_whole_word("tensei2 tensei", "tensei"));
    }

    #[test]
    fn test_contains_whole_word_unicode() {
        assert!(contains_whole_word("les misérables", "misérables"));
        assert!(!contains_whole_word("lesmisérables", "misérables"));
    }

    #[test]
    fn test_tier_serialization() {
        assert_eq!(
            serde_json::to_string(&MatchTier::Keywords).unwrap(),
            "\"keywords\""
        );
    }
}
