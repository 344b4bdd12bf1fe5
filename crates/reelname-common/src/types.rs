//! Core type definitions for media classification and provider names.
//!
//! All enums serialize in lowercase so they can be used directly as
//! configuration values and command line arguments.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Kind of media a filename describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    /// A feature film.
    Movie,
    /// An episode of a TV series.
    Tv,
    /// Nothing in the filename indicated either.
    #[default]
    Unknown,
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Movie => write!(f, "movie"),
            Self::Tv => write!(f, "tv"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

impl FromStr for MediaType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "movie" | "film" => Ok(Self::Movie),
            "tv" | "series" | "show" => Ok(Self::Tv),
            "unknown" => Ok(Self::Unknown),
            _ => Err(Error::invalid_input(format!("invalid media type: {s}"))),
        }
    }
}

/// External metadata service identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// The Movie Database.
    Tmdb,
    /// TheTVDB v4.
    Tvdb,
    /// TVmaze.
    Tvmaze,
    /// Trakt.
    Trakt,
    /// The Open Movie Database.
    Omdb,
    /// AniList (GraphQL).
    Anilist,
    /// Kitsu.
    Kitsu,
    /// Jikan, the unofficial MyAnimeList API.
    Jikan,
    /// AniDB HTTP API backed by the local title cache.
    Anidb,
}

impl ProviderKind {
    /// Every provider, in declaration order.
    pub const ALL: [ProviderKind; 9] = [
        Self::Tmdb,
        Self::Tvdb,
        Self::Tvmaze,
        Self::Trakt,
        Self::Omdb,
        Self::Anilist,
        Self::Kitsu,
        Self::Jikan,
        Self::Anidb,
    ];

    /// Short lowercase identifier (e.g. `"tmdb"`).
    pub fn name(self) -> &'static str {
        match self {
            Self::Tmdb => "tmdb",
            Self::Tvdb => "tvdb",
            Self::Tvmaze => "tvmaze",
            Self::Trakt => "trakt",
            Self::Omdb => "omdb",
            Self::Anilist => "anilist",
            Self::Kitsu => "kitsu",
            Self::Jikan => "jikan",
            Self::Anidb => "anidb",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ProviderKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == lower)
            .or(match lower.as_str() {
                "thetvdb" => Some(Self::Tvdb),
                "mal" | "myanimelist" => Some(Self::Jikan),
                _ => None,
            })
            .ok_or_else(|| Error::invalid_input(format!("unknown provider: {s}")))
    }
}
