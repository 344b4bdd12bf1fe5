//! Title cleanup helpers.
//!
//! [`clean_title`] is what the parser applies to every extracted title.
//! [`normalize_title`] and [`title_words`] produce the lower-cased forms the
//! AniDB title cache compares against.

use crate::patterns::{SEPARATORS, TRAILING_ANNOTATION, WHITESPACE};

/// Replace `.` and `_` with spaces, collapse whitespace, and trim.
///
/// Dangling dashes left over from `Show - S01E02` style names are trimmed
/// as well.
///
/// ```
/// use reelname_parser::normalize::clean_title;
///
/// assert_eq!(clean_title("The.Mandalorian."), "The Mandalorian");
/// assert_eq!(clean_title("  Show_Name  - "), "Show Name");
/// ```
pub fn clean_title(raw: &str) -> String {
    let spaced = SEPARATORS.replace_all(raw, " ");
    let collapsed = WHITESPACE.replace_all(&spaced, " ");
    collapsed
        .trim()
        .trim_matches(|c: char| c == '-' || c.is_whitespace())
        .to_string()
}

/// Strip a trailing `S01E02`, `Season 2`, or `(2020)` annotation.
///
/// ```
/// use reelname_parser::normalize::strip_annotations;
///
/// assert_eq!(strip_annotations("Naruto Shippuuden Season 2"), "Naruto Shippuuden");
/// assert_eq!(strip_annotations("Akira (1988)"), "Akira");
/// assert_eq!(strip_annotations("Bleach S01E05"), "Bleach");
/// ```
pub fn strip_annotations(title: &str) -> String {
    let stripped = TRAILING_ANNOTATION.replace(title, "");
    if stripped.trim().is_empty() {
        title.trim().to_string()
    } else {
        stripped.trim().to_string()
    }
}

/// Clean, strip annotations, and lower-case a title for cache comparison.
pub fn normalize_title(title: &str) -> String {
    strip_annotations(&clean_title(title)).to_lowercase()
}

/// Split a normalized title into words, dropping punctuation around each word.
pub fn title_words(title: &str) -> Vec<&str> {
    title
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|w| !w.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_title_normalizes_separators() {
        assert_eq!(clean_title("Show.Name_Here"), "Show Name Here");
        assert_eq!(clean_title("a   b\t c"), "a b c");
        assert_eq!(clean_title(""), "");
        assert_eq!(clean_title("---"), "");
    }

    #[test]
    fn clean_title_keeps_inner_dashes() {
        assert_eq!(clean_title("Spider-Man"), "Spider-Man");
        assert_eq!(clean_title("Re-Zero -"), "Re-Zero");
    }

    #[test]
    fn strip_annotations_variants() {
        assert_eq!(strip_annotations("Bleach S01E05 720p"), "Bleach");
        assert_eq!(strip_annotations("Bleach S2"), "Bleach");
        assert_eq!(strip_annotations("Bleach Season 02"), "Bleach");
        assert_eq!(strip_annotations("Your Name (2016)"), "Your Name");
        assert_eq!(strip_annotations("Steins;Gate"), "Steins;Gate");
    }

    #[test]
    fn strip_annotations_never_empties() {
        assert_eq!(strip_annotations("S01E01"), "S01E01");
    }

    #[test]
    fn normalize_title_lowercases() {
        assert_eq!(normalize_title("Naruto.Shippuuden.Season.2"), "naruto shippuuden");
        assert_eq!(normalize_title("Cowboy Bebop"), "cowboy bebop");
    }

    #[test]
    fn title_words_trims_punctuation() {
        assert_eq!(
            title_words("attack on titan: the final season"),
            vec!["attack", "on", "titan", "the", "final", "season"]
        );
        assert_eq!(title_words("steins;gate"), vec!["steins;gate"]);
        assert!(title_words("  !! ").is_empty());
    }
}
