//! Movie/TV classification of a raw filename.

use reelname_common::MediaType;

use crate::patterns::{
    DETECT_BRACKET_NUMBER, DETECT_CROSS, DETECT_EPISODE_WORD, DETECT_SEASON_EPISODE, DETECT_YEAR,
};

/// Classify a filename as movie, TV, or unknown.
///
/// Episode markers are checked before the year so that a TV name carrying
/// an air-date year is not mistaken for a movie.
///
/// ```
/// use reelname_common::MediaType;
/// use reelname_parser::detect_media_type;
///
/// assert_eq!(detect_media_type("Show.S01E01.mkv"), MediaType::Tv);
/// assert_eq!(detect_media_type("Movie.2020.mkv"), MediaType::Movie);
/// assert_eq!(detect_media_type("home_video.mkv"), MediaType::Unknown);
/// ```
pub fn detect_media_type(filename: &str) -> MediaType {
    let tv_markers = [
        &*DETECT_SEASON_EPISODE,
        &*DETECT_CROSS,
        &*DETECT_EPISODE_WORD,
        &*DETECT_BRACKET_NUMBER,
    ];
    if tv_markers.iter().any(|re| re.is_match(filename)) {
        return MediaType::Tv;
    }
    if DETECT_YEAR.is_match(filename) {
        return MediaType::Movie;
    }
    MediaType::Unknown
}
