//! Candidate link ordering
//!
//! When the oracle attaches its own relevance ranking that ordering wins.
//! Otherwise links are scored locally: the score of a link is the number of
//! configured keyword occurrences (case-insensitive) in its title and URL
//! concatenated. Both sorts are stable, so ties keep their original order.

use crate::oracle::CandidateLink;

/// Keyword occurrence count over the link's title and URL
pub fn score_link(link: &CandidateLink, keywords: &[String]) -> usize {
    let haystack = format!("{} {}", link.title, link.url).to_lowercase();
    keywords
        .iter()
        .map(|kw| {
            let needle = kw.to_lowercase();
            if needle.is_empty() {
                0
            } else {
                haystack.matches(&needle).count()
            }
        })
        .sum()
}

/// Orders candidates for expansion and applies the per-page cap
///
/// `ranked` means the oracle supplied relevance labels; those are sorted
/// high-first and unlabeled links sink to the end. A `max` of 0 means
/// unlimited.
pub fn order_candidates(
    mut links: Vec<CandidateLink>,
    keywords: &[String],
    ranked: bool,
    max: u32,
) -> Vec<CandidateLink> {
    if ranked {
        links.sort_by_key(|link| {
            std::cmp::Reverse(link.relevance.map(|r| r.rank()).unwrap_or(0))
        });
    } else {
        links.sort_by_key(|link| std::cmp::Reverse(score_link(link, keywords)));
    }

    if max > 0 {
        links.truncate(max as usize);
    }
    links
}
