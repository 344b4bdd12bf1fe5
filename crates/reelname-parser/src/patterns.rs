//! Compiled regular expressions shared by the parser and the detector.
//!
//! Parse patterns are anchored at the start and capture everything before
//! the marker as the title. `_` counts as a word character for `\b`, so
//! markers are delimited with explicit separator classes instead.

use once_cell::sync::Lazy;
use regex::Regex;

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("built-in pattern must compile")
}

/// `Title.S01E02`, `Title S1 E2`, `title_s01e002`.
pub(crate) static TV_SEASON_EPISODE: Lazy<Regex> = Lazy::new(|| {
    compile(
        r"(?i)^(?:(?P<title>.*?)[\s._\-\[(]+)?S(?P<season>\d{1,2})[\s._\-]*E(?P<episode>\d{1,4})",
    )
});

/// `Title.1x02`.
pub(crate) static TV_CROSS: Lazy<Regex> = Lazy::new(|| {
    compile(
        r"(?i)^(?:(?P<title>.*?)[\s._\-\[(]+)?(?P<season>\d{1,2})x(?P<episode>\d{1,3})(?:\D|$)",
    )
});

/// `Title Episode 12`; carries no season.
pub(crate) static TV_EPISODE_WORD: Lazy<Regex> = Lazy::new(|| {
    compile(r"(?i)^(?:(?P<title>.*?)[\s._\-\[(]+)?Episode[\s._\-]*(?P<episode>\d{1,4})(?:\D|$)")
});

/// `Title (2010)`, `Title.2010.1080p`, `Title [2010]`.
pub(crate) static MOVIE_TITLE_YEAR: Lazy<Regex> = Lazy::new(|| {
    compile(r"^(?P<title>.+?)[\s._\-\[(]+(?P<year>(?:19|20)\d{2})(?:\D|$)")
});

/// A year trailing an already-cleaned title: `Doctor Who 2005`, `Doctor Who (2005)`.
pub(crate) static TRAILING_YEAR: Lazy<Regex> = Lazy::new(|| {
    compile(r"^(?P<title>.+?)(?:\s+|\s*[(\[])(?P<year>(?:19|20)\d{2})[)\]]?$")
});

pub(crate) static DETECT_SEASON_EPISODE: Lazy<Regex> =
    Lazy::new(|| compile(r"(?i)(?:^|[^a-z0-9])S\d{1,2}[\s._\-]*E\d{1,4}"));

pub(crate) static DETECT_CROSS: Lazy<Regex> =
    Lazy::new(|| compile(r"(?i)(?:^|[^a-z0-9])\d{1,2}x\d{1,3}(?:\D|$)"));

pub(crate) static DETECT_EPISODE_WORD: Lazy<Regex> =
    Lazy::new(|| compile(r"(?i)(?:^|[^a-z])Episode[\s._\-]*\d+"));

/// Fansub-style absolute episode in brackets: `[Group] Show [05]`.
pub(crate) static DETECT_BRACKET_NUMBER: Lazy<Regex> = Lazy::new(|| compile(r"\[\d{1,4}\]"));

pub(crate) static DETECT_YEAR: Lazy<Regex> =
    Lazy::new(|| compile(r"(?:^|\D)(?:19|20)\d{2}(?:\D|$)"));

/// Season/episode or year annotations at the end of a cleaned title.
pub(crate) static TRAILING_ANNOTATION: Lazy<Regex> = Lazy::new(|| {
    compile(
        r"(?i)[\s\-]*(?:\bS\d{1,2}(?:\s*E\d{1,4})?\b.*|\bSeason\s*\d+\b.*|[(\[](?:19|20)\d{2}[)\]].*)$",
    )
});

pub(crate) static SEPARATORS: Lazy<Regex> = Lazy::new(|| compile(r"[._]"));

pub(crate) static WHITESPACE: Lazy<Regex> = Lazy::new(|| compile(r"\s+"));
