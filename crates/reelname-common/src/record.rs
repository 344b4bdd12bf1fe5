//! Normalized metadata records produced by providers.
//!
//! Every provider maps its own response shape onto one of these two records.
//! Field names are the compatibility surface; everything a given provider
//! cannot supply is left as `None` or empty and degrades to an empty string
//! when formatted.

use serde::{Deserialize, Serialize};

use crate::ProviderKind;

/// Metadata for a single film.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieRecord {
    /// Display title.
    pub title: String,
    /// Release year.
    pub year: Option<u16>,
    /// Synopsis text.
    pub overview: Option<String>,
    /// Audience rating normalized to a 0-10 scale.
    pub rating: Option<f64>,
    /// Genre labels.
    #[serde(default)]
    pub genres: Vec<String>,
    /// Provider that produced this record.
    pub source: ProviderKind,
    /// The provider's own identifier for the title.
    pub provider_id: Option<String>,
}

/// Metadata for a single episode of a series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeRecord {
    /// Series title.
    pub show_title: String,
    /// Year the series premiered.
    pub show_year: Option<u16>,
    /// Season number.
    pub season: u32,
    /// Episode number within the season.
    pub episode: u32,
    /// Episode title.
    pub episode_title: Option<String>,
    /// Episode synopsis, falling back to the series synopsis.
    pub overview: Option<String>,
    /// Audience rating normalized to a 0-10 scale.
    pub rating: Option<f64>,
    /// Genre labels of the series.
    #[serde(default)]
    pub genres: Vec<String>,
    /// Provider that produced this record.
    pub source: ProviderKind,
    /// The provider's own identifier for the series.
    pub provider_id: Option<String>,
    /// First air date of the episode (ISO-8601).
    pub air_date: Option<String>,
    /// Continuous episode number for providers that do not reset per season.
    pub absolute_episode: Option<u32>,
}

impl EpisodeRecord {
    /// Create an episode record with only the identifying fields set.
    pub fn new(
        source: ProviderKind,
        show_title: impl Into<String>,
        season: u32,
        episode: u32,
    ) -> Self {
        Self {
            show_title: show_title.into(),
            show_year: None,
            season,
            episode,
            episode_title: None,
            overview: None,
            rating: None,
            genres: Vec::new(),
            source,
            provider_id: None,
            air_date: None,
            absolute_episode: None,
        }
    }
}

impl MovieRecord {
    /// Create a movie record with only the identifying fields set.
    pub fn new(source: ProviderKind, title: impl Into<String>, year: Option<u16>) -> Self {
        Self {
            title: title.into(),
            year,
            overview: None,
            rating: None,
            genres: Vec::new(),
            source,
            provider_id: None,
        }
    }
}

/// A resolved movie or episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MetadataRecord {
    /// A film.
    Movie(MovieRecord),
    /// A series episode.
    Episode(EpisodeRecord),
}

impl MetadataRecord {
    /// Provider that produced this record.
    pub fn source(&self) -> ProviderKind {
        match self {
            Self::Movie(m) => m.source,
            Self::Episode(e) => e.source,
        }
    }

    /// Movie title, or series title for episodes.
    pub fn title(&self) -> &str {
        match self {
            Self::Movie(m) => &m.title,
            Self::Episode(e) => &e.show_title,
        }
    }

    /// Release year, or premiere year for episodes.
    pub fn year(&self) -> Option<u16> {
        match self {
            Self::Movie(m) => m.year,
            Self::Episode(e) => e.show_year,
        }
    }

    /// Season number; movies have none.
    pub fn season(&self) -> Option<u32> {
        match self {
            Self::Movie(_) => None,
            Self::Episode(e) => Some(e.season),
        }
    }

    /// Episode number; movies have none.
    pub fn episode(&self) -> Option<u32> {
        match self {
            Self::Movie(_) => None,
            Self::Episode(e) => Some(e.episode),
        }
    }

    /// Episode title; movies have none.
    pub fn episode_title(&self) -> Option<&str> {
        match self {
            Self::Movie(_) => None,
            Self::Episode(e) => e.episode_title.as_deref(),
        }
    }

    /// Synopsis text.
    pub fn overview(&self) -> Option<&str> {
        match self {
            Self::Movie(m) => m.overview.as_deref(),
            Self::Episode(e) => e.overview.as_deref(),
        }
    }

    /// Audience rating on a 0-10 scale.
    pub fn rating(&self) -> Option<f64> {
        match self {
            Self::Movie(m) => m.rating,
            Self::Episode(e) => e.rating,
        }
    }
}

impl From<MovieRecord> for MetadataRecord {
    fn from(record: MovieRecord) -> Self {
        Self::Movie(record)
    }
}

impl From<EpisodeRecord> for MetadataRecord {
    fn from(record: EpisodeRecord) -> Self {
        Self::Episode(record)
    }
}
