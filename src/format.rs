//! Filename formatting from a resolved [`MetadataRecord`].
//!
//! Patterns use `{token}` placeholders from a fixed vocabulary:
//!
//! | token            | value                                  |
//! |------------------|----------------------------------------|
//! | `{title}`        | movie title or series title            |
//! | `{year}`         | release year / first-aired year        |
//! | `{season}`       | season, two digits (`01`)              |
//! | `{episode}`      | episode, two digits (`02`)             |
//! | `{episodeTitle}` | episode title                          |
//! | `{S}` / `{E}`    | `S01` / `E02`                          |
//!
//! Unknown placeholders are left as written.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use reelname_common::MetadataRecord;

/// Characters that are stripped from formatted names.
pub const ILLEGAL_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([A-Za-z]+)\}").expect("placeholder regex"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex"));

/// Token values extracted from a record.
///
/// # Example
///
/// ```
/// use reelname::format::TokenValues;
/// use reelname_common::{EpisodeRecord, ProviderKind};
///
/// let record = EpisodeRecord::new(ProviderKind::Tvmaze, "Foo", 1, 2).into();
/// let values = TokenValues::from_record(&record);
///
/// assert_eq!(values.get("S").as_deref(), Some("S01"));
/// assert_eq!(values.substitute("{title} {E}"), "Foo E02");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenValues {
    title: String,
    year: String,
    season: u32,
    episode: u32,
    episode_title: String,
}

impl TokenValues {
    /// Collect token values. Absent text degrades to empty and absent
    /// numbers to `1`.
    pub fn from_record(record: &MetadataRecord) -> Self {
        Self {
            title: record.title().to_string(),
            year: record.year().map(|y| y.to_string()).unwrap_or_default(),
            season: record.season().unwrap_or(1),
            episode: record.episode().unwrap_or(1),
            episode_title: record.episode_title().unwrap_or_default().to_string(),
        }
    }

    /// Value of a single token, or `None` when the name is not a token.
    pub fn get(&self, token: &str) -> Option<String> {
        let value = match token {
            "title" => self.title.clone(),
            "year" => self.year.clone(),
            "season" => format!("{:02}", self.season),
            "episode" => format!("{:02}", self.episode),
            "episodeTitle" => self.episode_title.clone(),
            "S" => format!("S{:02}", self.season),
            "E" => format!("E{:02}", self.episode),
            _ => return None,
        };
        Some(value)
    }

    /// Replace every known placeholder in one left-to-right pass.
    ///
    /// Substituted text is never rescanned, so a title that itself contains
    /// `{year}` comes through literally.
    pub fn substitute(&self, pattern: &str) -> String {
        PLACEHOLDER
            .replace_all(pattern, |caps: &Captures| {
                self.get(&caps[1]).unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }
}

/// Collapse whitespace runs, trim, then drop characters illegal in filenames.
pub fn sanitize(name: &str) -> String {
    let collapsed = WHITESPACE.replace_all(name, " ");
    collapsed
        .trim()
        .chars()
        .filter(|c| !ILLEGAL_CHARS.contains(c))
        .collect()
}

/// Format `record` through `pattern`.
///
/// Never fails; missing fields produce empty strings.
pub fn format(record: &MetadataRecord, pattern: &str) -> String {
    sanitize(&TokenValues::from_record(record).substitute(pattern))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelname_common::{EpisodeRecord, MovieRecord, ProviderKind};

    fn episode() -> MetadataRecord {
        let mut record = EpisodeRecord::new(ProviderKind::Tvmaze, "Foo", 1, 2);
        record.episode_title = Some("Pilot".to_string());
        record.into()
    }

    #[test]
    fn test_episode_pattern() {
        assert_eq!(
            format(&episode(), "{title} - S{season}E{episode} - {episodeTitle}"),
            "Foo - S01E02 - Pilot"
        );
    }

    #[test]
    fn test_prefixed_tokens() {
        assert_eq!(format(&episode(), "{title} {S}{E}"), "Foo S01E02");
    }

    #[test]
    fn test_idempotent() {
        let record = episode();
        let pattern = "{title} - {S}{E} - {episodeTitle}";
        assert_eq!(format(&record, pattern), format(&record, pattern));
    }

    #[test]
    fn test_not_recursive() {
        let record = MovieRecord::new(ProviderKind::Tmdb, "The {year} Show", Some(1999));
        assert_eq!(
            format(&record.into(), "{title} ({year})"),
            "The {year} Show (1999)"
        );
    }

    #[test]
    fn test_movie_defaults() {
        let record = MovieRecord::new(ProviderKind::Omdb, "Inception", Some(2010)).into();
        assert_eq!(format(&record, "{title} ({year})"), "Inception (2010)");
        // Movies have no numbering; both default to 1.
        assert_eq!(format(&record, "{S}{E} {episodeTitle}"), "S01E01");
    }

    #[test]
    fn test_missing_year_is_empty() {
        let record = MovieRecord::new(ProviderKind::Kitsu, "Akira", None).into();
        assert_eq!(format(&record, "{title} {year}"), "Akira");
    }

    #[test]
    fn test_illegal_characters_stripped() {
        let record = MovieRecord::new(ProviderKind::Tmdb, "Mission: Impossible?", None).into();
        assert_eq!(format(&record, "{title}"), "Mission Impossible");

        let record = MovieRecord::new(ProviderKind::Tmdb, "AC/DC <Live>|\"\\*", None).into();
        assert_eq!(format(&record, "{title}"), "ACDC Live");
    }

    #[test]
    fn test_whitespace_collapsed() {
        assert_eq!(sanitize("  Foo \t  Bar\n "), "Foo Bar");
    }

    #[test]
    fn test_unknown_placeholder_kept() {
        assert_eq!(format(&episode(), "{title} {quality}"), "Foo {quality}");
    }

    #[test]
    fn test_large_numbers_not_truncated() {
        let record = EpisodeRecord::new(ProviderKind::Anidb, "One Piece", 1, 1015).into();
        assert_eq!(format(&record, "{title} {E}"), "One Piece E1015");
    }
}
