//! Ordered pattern matching over a single filename.

use regex::{Captures, Regex};
use reelname_common::paths::strip_media_extension;

use crate::model::{MovieParse, ParsedFilename, TvParse};
use crate::normalize::clean_title;
use crate::patterns::{
    MOVIE_TITLE_YEAR, TRAILING_YEAR, TV_CROSS, TV_EPISODE_WORD, TV_SEASON_EPISODE,
};

/// Episode patterns in the order they are tried.
fn tv_patterns() -> [&'static Regex; 3] {
    [&TV_SEASON_EPISODE, &TV_CROSS, &TV_EPISODE_WORD]
}

fn number<T: std::str::FromStr>(caps: &Captures<'_>, group: &str) -> Option<T> {
    caps.name(group).and_then(|m| m.as_str().parse().ok())
}

/// Parse a filename into TV or movie fields.
///
/// The three episode patterns are tried first, in order, and the first one
/// that matches wins. If none match the name is treated as a movie; that
/// branch always succeeds, with a `None` year when the name carries none.
pub fn parse_filename(filename: &str) -> ParsedFilename {
    let name = strip_media_extension(filename.trim());

    for pattern in tv_patterns() {
        if let Some(caps) = pattern.captures(name) {
            let Some(episode) = number::<u32>(&caps, "episode") else {
                continue;
            };
            let season = number::<u32>(&caps, "season").unwrap_or(1);
            let raw_title = caps.name("title").map_or("", |m| m.as_str());
            let (title, year) = split_trailing_year(clean_title(raw_title));
            return ParsedFilename::Tv(TvParse {
                title,
                season,
                episode,
                year,
            });
        }
    }

    if let Some(caps) = MOVIE_TITLE_YEAR.captures(name) {
        let title = clean_title(caps.name("title").map_or("", |m| m.as_str()));
        if !title.is_empty() {
            return ParsedFilename::Movie(MovieParse {
                title,
                year: number(&caps, "year"),
            });
        }
    }

    ParsedFilename::Movie(MovieParse {
        title: clean_title(name),
        year: None,
    })
}

/// Pull `Doctor Who 2005` apart into title and year, unless that would
/// leave the title empty (`1923`).
fn split_trailing_year(title: String) -> (String, Option<u16>) {
    if let Some(caps) = TRAILING_YEAR.captures(&title) {
        let head = clean_title(caps.name("title").map_or("", |m| m.as_str()));
        if !head.is_empty() {
            return (head, number(&caps, "year"));
        }
    }
    (title, None)
}
