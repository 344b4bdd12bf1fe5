//! AniList metadata provider (GraphQL, no credential).
//!
//! AniList has no per-episode titles, so TV lookups return the series with
//! the requested season/episode and no episode title.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use reelname_common::{EpisodeRecord, MovieRecord, ProviderKind, Result};

use super::strip_html;
use crate::metadata::http::{HttpClient, DEFAULT_TIMEOUT};
use crate::metadata::provider::{
    Capabilities, MetadataProvider, ProviderDescriptor, SearchOutcome,
};
use crate::metadata::rate_limit::RateLimiter;

const ANILIST_URL: &str = "https://graphql.anilist.co";

const MOVIE_QUERY: &str = "query ($search: String, $year: Int) { \
    Media(search: $search, type: ANIME, format: MOVIE, seasonYear: $year) { \
    id title { romaji english } startDate { year } description(asHtml: false) \
    averageScore genres } }";

const TV_QUERY: &str = "query ($search: String) { \
    Media(search: $search, type: ANIME, format_not: MOVIE) { \
    id title { romaji english } startDate { year } description(asHtml: false) \
    averageScore genres } }";

#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    data: Option<MediaData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct MediaData {
    media: Option<AnilistMedia>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnilistMedia {
    id: u64,
    title: AnilistTitle,
    start_date: Option<AnilistDate>,
    description: Option<String>,
    average_score: Option<f64>,
    #[serde(default)]
    genres: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct AnilistTitle {
    romaji: Option<String>,
    english: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AnilistDate {
    year: Option<u16>,
}

impl AnilistMedia {
    /// English title when there is one, romaji otherwise.
    fn display_title(&self) -> Option<&str> {
        self.title
            .english
            .as_deref()
            .or(self.title.romaji.as_deref())
            .filter(|t| !t.trim().is_empty())
    }

    fn year(&self) -> Option<u16> {
        self.start_date.as_ref().and_then(|d| d.year)
    }

    /// `averageScore` is 0-100.
    fn rating(&self) -> Option<f64> {
        self.average_score.map(|s| s / 10.0)
    }
}

/// AniList provider.
pub struct AnilistProvider {
    http: HttpClient,
    url: String,
}

impl AnilistProvider {
    pub fn new(limiter: Arc<RateLimiter>) -> Result<Self> {
        Ok(Self {
            http: HttpClient::new(ProviderKind::Anilist, DEFAULT_TIMEOUT, limiter)?,
            url: ANILIST_URL.to_string(),
        })
    }

    /// Point the provider at a different GraphQL endpoint.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    async fn media(&self, query: &str, variables: serde_json::Value) -> Result<Option<AnilistMedia>> {
        let request = self
            .http
            .post(&self.url)
            .header("accept", "application/json")
            .json(&json!({ "query": query, "variables": variables }));
        let response = self.http.json::<GraphqlResponse>(request).await?;
        Ok(response.and_then(|r| r.data).and_then(|d| d.media))
    }
}

#[async_trait]
impl MetadataProvider for AnilistProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Anilist
    }

    fn descriptor(&self) -> ProviderDescriptor {
        ProviderDescriptor::keyless(ProviderKind::Anilist, Capabilities::BOTH)
    }

    async fn search_movie(&self, title: &str, year: Option<u16>) -> SearchOutcome {
        debug!(title, ?year, "AniList search movie");

        let Some(media) = self
            .media(MOVIE_QUERY, json!({ "search": title, "year": year }))
            .await?
        else {
            return Ok(None);
        };
        let Some(name) = media.display_title() else {
            return Ok(None);
        };

        let mut record = MovieRecord::new(ProviderKind::Anilist, name, media.year());
        record.overview = strip_html(media.description.as_deref());
        record.rating = media.rating();
        record.provider_id = Some(media.id.to_string());
        record.genres = media.genres;
        Ok(Some(record.into()))
    }

    async fn search_tv(&self, title: &str, season: u32, episode: u32) -> SearchOutcome {
        debug!(title, season, episode, "AniList search series");

        let Some(media) = self.media(TV_QUERY, json!({ "search": title })).await? else {
            return Ok(None);
        };
        let Some(name) = media.display_title() else {
            return Ok(None);
        };

        let mut record = EpisodeRecord::new(ProviderKind::Anilist, name, season, episode);
        record.show_year = media.year();
        record.overview = strip_html(media.description.as_deref());
        record.rating = media.rating();
        record.provider_id = Some(media.id.to_string());
        record.genres = media.genres;
        Ok(Some(record.into()))
    }
}
