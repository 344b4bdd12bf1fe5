//! # reelname-parser
//!
//! Turns loosely structured media filenames into structured fields.
//!
//! This crate is pure and synchronous: no network, no filesystem. It
//! provides the ordered filename patterns, the movie/TV detector, the anime
//! keyword heuristic, and the title normalization used by the AniDB title
//! cache.
//!
//! ## Quick Start
//!
//! ```
//! use reelname_common::MediaType;
//! use reelname_parser::{build_query, ParsedFilename};
//!
//! let query = build_query("The.Mandalorian.S01E02.1080p.mkv");
//!
//! assert_eq!(query.media_type(), MediaType::Tv);
//! assert_eq!(query.title(), "The Mandalorian");
//! assert_eq!(query.season(), Some(1));
//! assert_eq!(query.episode(), Some(2));
//! assert!(matches!(query.parsed(), ParsedFilename::Tv(_)));
//! ```

pub mod anime;
pub mod model;
pub mod normalize;

mod detect;
mod filename;
mod patterns;

pub use anime::AnimeClassifier;
pub use detect::detect_media_type;
pub use filename::parse_filename;
pub use model::{MediaQuery, MovieParse, ParsedFilename, TvParse};

/// Parse and classify a filename in one step.
///
/// The detector runs on the raw name, the parser on the extension-stripped
/// name; both results are frozen into the returned [`MediaQuery`].
pub fn build_query(filename: &str) -> MediaQuery {
    let media_type = detect_media_type(filename);
    let parsed = parse_filename(filename);
    MediaQuery::new(filename.to_string(), media_type, parsed)
}
