//! Concrete metadata provider implementations.
//!
//! Each sub-module wraps one external service and implements
//! [`MetadataProvider`](super::provider::MetadataProvider).

pub mod anidb;
pub mod anilist;
pub mod jikan;
pub mod kitsu;
pub mod omdb;
pub mod tmdb;
pub mod trakt;
pub mod tvdb;
pub mod tvmaze;

pub use anidb::AnidbProvider;
pub use anilist::AnilistProvider;
pub use jikan::JikanProvider;
pub use kitsu::KitsuProvider;
pub use omdb::OmdbProvider;
pub use tmdb::TmdbProvider;
pub use trakt::TraktProvider;
pub use tvdb::TvdbProvider;
pub use tvmaze::TvmazeProvider;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use reelname_common::{ProviderKind, Result};

static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));

/// A search hit that can be ranked against the query.
pub(crate) trait Candidate {
    fn candidate_title(&self) -> &str;
    fn candidate_year(&self) -> Option<u16>;
}

/// Score a search hit by title similarity and year proximity.
pub(crate) fn confidence(
    query_title: &str,
    result_title: &str,
    query_year: Option<u16>,
    result_year: Option<u16>,
) -> f64 {
    // Title scoring
    let base = if query_title == result_title {
        0.5
    } else if query_title.eq_ignore_ascii_case(result_title) {
        0.4
    } else if result_title
        .to_lowercase()
        .contains(&query_title.to_lowercase())
    {
        0.2
    } else {
        0.1
    };

    // Year scoring
    let year_bonus = match (query_year, result_year) {
        (Some(q), Some(r)) if q == r => 0.3,
        (Some(q), Some(r)) if q.abs_diff(r) <= 1 => 0.15,
        _ => 0.0,
    };

    base + year_bonus
}

/// The highest-confidence hit; on a tie the upstream's own order wins.
pub(crate) fn best_match<T: Candidate>(
    hits: impl IntoIterator<Item = T>,
    title: &str,
    year: Option<u16>,
) -> Option<T> {
    let mut best: Option<(f64, T)> = None;
    for hit in hits {
        let score = confidence(title, hit.candidate_title(), year, hit.candidate_year());
        if best.as_ref().map_or(true, |(top, _)| score > *top) {
            best = Some((score, hit));
        }
    }
    best.map(|(_, hit)| hit)
}

/// Extract a four-digit year from a date string like `"2023-04-15"`.
pub(crate) fn parse_year(date: Option<&str>) -> Option<u16> {
    date.and_then(|d| d.get(..4))
        .and_then(|y| y.parse::<u16>().ok())
}

/// Drop HTML tags and surrounding whitespace; `None` if nothing is left.
pub(crate) fn strip_html(text: Option<&str>) -> Option<String> {
    let text = text?;
    let plain = HTML_TAG.replace_all(text, "");
    let plain = plain.trim();
    (!plain.is_empty()).then(|| plain.to_string())
}

/// The outcome of a follow-up episode request, once the show is known.
///
/// A failure here is logged and treated as "no episode details" so the
/// show-level record still reaches the caller.
pub(crate) fn episode_details<T>(provider: ProviderKind, result: Result<T>) -> Option<T> {
    match result {
        Ok(details) => Some(details),
        Err(e) => {
            warn!(%provider, error = %e, "episode lookup failed; keeping show record");
            None
        }
    }
}

/// `None` for missing, blank, or `N/A` values.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty() && v != "N/A")
}
