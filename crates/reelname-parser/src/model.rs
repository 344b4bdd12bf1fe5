//! Parse results and the query handed to the resolver.

use reelname_common::MediaType;

/// Fields extracted from a TV episode filename.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TvParse {
    /// Cleaned series title.
    pub title: String,
    /// Season number; 1 when the pattern carried none.
    pub season: u32,
    /// Episode number.
    pub episode: u32,
    /// Year found at the end of the series title, if any.
    pub year: Option<u16>,
}

/// Fields extracted from a movie filename.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MovieParse {
    /// Cleaned title.
    pub title: String,
    /// Release year, when the name had one.
    pub year: Option<u16>,
}

/// Result of running the ordered filename patterns.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "lowercase"))]
pub enum ParsedFilename {
    /// One of the episode patterns matched.
    Tv(TvParse),
    /// Fallback: title with optional year.
    Movie(MovieParse),
}

impl ParsedFilename {
    /// The cleaned title regardless of shape.
    pub fn title(&self) -> &str {
        match self {
            Self::Tv(tv) => &tv.title,
            Self::Movie(movie) => &movie.title,
        }
    }

    /// Whether an episode pattern matched.
    pub fn is_tv(&self) -> bool {
        matches!(self, Self::Tv(_))
    }
}

/// A parsed, classified resolution request.
///
/// Built once from a filename; fields are read-only so the detected media
/// type cannot be re-derived downstream.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MediaQuery {
    raw_filename: String,
    media_type: MediaType,
    parsed: ParsedFilename,
}

impl MediaQuery {
    pub(crate) fn new(raw_filename: String, media_type: MediaType, parsed: ParsedFilename) -> Self {
        Self {
            raw_filename,
            media_type,
            parsed,
        }
    }

    /// The filename exactly as supplied.
    pub fn raw_filename(&self) -> &str {
        &self.raw_filename
    }

    /// Classification from the detector.
    pub fn media_type(&self) -> MediaType {
        self.media_type
    }

    /// Structured fields from the parser.
    pub fn parsed(&self) -> &ParsedFilename {
        &self.parsed
    }

    /// Cleaned title.
    pub fn title(&self) -> &str {
        self.parsed.title()
    }

    /// Year, from either parse shape.
    pub fn year(&self) -> Option<u16> {
        match &self.parsed {
            ParsedFilename::Tv(tv) => tv.year,
            ParsedFilename::Movie(movie) => movie.year,
        }
    }

    /// Season, for episode parses.
    pub fn season(&self) -> Option<u32> {
        match &self.parsed {
            ParsedFilename::Tv(tv) => Some(tv.season),
            ParsedFilename::Movie(_) => None,
        }
    }

    /// Episode, for episode parses.
    pub fn episode(&self) -> Option<u32> {
        match &self.parsed {
            ParsedFilename::Tv(tv) => Some(tv.episode),
            ParsedFilename::Movie(_) => None,
        }
    }
}
