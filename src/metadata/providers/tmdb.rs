//! TMDB (The Movie Database) metadata provider.
//!
//! Implements [`MetadataProvider`] by querying the TMDB v3 REST API.
//!
//! Features:
//! - Search results ranked by title similarity and year proximity.
//! - Episode details fetched from `/tv/{id}/season/{s}/episode/{e}`; a show
//!   without that episode still yields a show-level record.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use reelname_common::{EpisodeRecord, Error, MovieRecord, ProviderKind, Result};

use super::{best_match, episode_details, non_empty, parse_year, Candidate};
use crate::metadata::http::{HttpClient, DEFAULT_TIMEOUT};
use crate::metadata::provider::{
    Capabilities, MetadataProvider, ProviderDescriptor, SearchOutcome,
};
use crate::metadata::rate_limit::RateLimiter;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";

// ---------------------------------------------------------------------------
// TMDB API response types (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct TmdbSearchResponse<T> {
    results: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct TmdbMovieSearchResult {
    id: u64,
    title: Option<String>,
    release_date: Option<String>,
    overview: Option<String>,
    vote_average: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct TmdbTvSearchResult {
    id: u64,
    name: Option<String>,
    first_air_date: Option<String>,
    overview: Option<String>,
    vote_average: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct TmdbEpisodeDetail {
    name: Option<String>,
    overview: Option<String>,
    air_date: Option<String>,
    vote_average: Option<f64>,
}

impl Candidate for TmdbMovieSearchResult {
    fn candidate_title(&self) -> &str {
        self.title.as_deref().unwrap_or_default()
    }
    fn candidate_year(&self) -> Option<u16> {
        parse_year(self.release_date.as_deref())
    }
}

impl Candidate for TmdbTvSearchResult {
    fn candidate_title(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }
    fn candidate_year(&self) -> Option<u16> {
        parse_year(self.first_air_date.as_deref())
    }
}

// ---------------------------------------------------------------------------
// Provider implementation
// ---------------------------------------------------------------------------

/// TMDB metadata provider.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use reelname::metadata::providers::TmdbProvider;
/// use reelname::metadata::rate_limit::RateLimiter;
///
/// let provider = TmdbProvider::new("your-api-key", "en-US", Arc::new(RateLimiter::default()))
///     .unwrap();
/// ```
pub struct TmdbProvider {
    http: HttpClient,
    base_url: String,
    api_key: String,
    language: String,
}

impl TmdbProvider {
    /// Create a new TMDB provider with the given API key and language.
    ///
    /// The `language` parameter should be an ISO-639-1 language tag such as
    /// `"en-US"`.
    pub fn new(
        api_key: impl Into<String>,
        language: impl Into<String>,
        limiter: Arc<RateLimiter>,
    ) -> Result<Self> {
        Ok(Self {
            http: HttpClient::new(ProviderKind::Tmdb, DEFAULT_TIMEOUT, limiter)?,
            base_url: TMDB_BASE_URL.to_string(),
            api_key: api_key.into().trim().to_string(),
            language: language.into(),
        })
    }

    /// Point the provider at a different API root.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    fn require_key(&self) -> Result<()> {
        if self.api_key.is_empty() {
            return Err(Error::configuration("TMDB API key is not set"));
        }
        Ok(())
    }

    /// Build a GET request carrying the API key and language.
    fn request(&self, path: &str) -> reqwest::RequestBuilder {
        self.http
            .get(&format!("{}{path}", self.base_url))
            .query(&[("api_key", &self.api_key), ("language", &self.language)])
    }
}

#[async_trait]
impl MetadataProvider for TmdbProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Tmdb
    }

    fn descriptor(&self) -> ProviderDescriptor {
        ProviderDescriptor::keyed(
            ProviderKind::Tmdb,
            Capabilities::BOTH,
            !self.api_key.is_empty(),
        )
    }

    async fn search_movie(&self, title: &str, year: Option<u16>) -> SearchOutcome {
        self.require_key()?;
        debug!(title, ?year, "TMDB search movie");

        let mut request = self.request("/search/movie").query(&[("query", title)]);
        if let Some(y) = year {
            request = request.query(&[("year", y)]);
        }

        let Some(body) = self
            .http
            .json::<TmdbSearchResponse<TmdbMovieSearchResult>>(request)
            .await?
        else {
            return Ok(None);
        };

        let Some(hit) = best_match(body.results, title, year) else {
            return Ok(None);
        };

        let mut record = MovieRecord::new(
            ProviderKind::Tmdb,
            hit.candidate_title(),
            hit.candidate_year(),
        );
        record.overview = non_empty(hit.overview);
        record.rating = hit.vote_average;
        record.provider_id = Some(hit.id.to_string());
        Ok(Some(record.into()))
    }

    async fn search_tv(&self, title: &str, season: u32, episode: u32) -> SearchOutcome {
        self.require_key()?;
        debug!(title, season, episode, "TMDB search TV");

        let request = self.request("/search/tv").query(&[("query", title)]);
        let Some(body) = self
            .http
            .json::<TmdbSearchResponse<TmdbTvSearchResult>>(request)
            .await?
        else {
            return Ok(None);
        };

        let Some(show) = best_match(body.results, title, None) else {
            return Ok(None);
        };

        let mut record = EpisodeRecord::new(
            ProviderKind::Tmdb,
            show.candidate_title(),
            season,
            episode,
        );
        record.show_year = show.candidate_year();
        record.overview = non_empty(show.overview);
        record.rating = show.vote_average;
        record.provider_id = Some(show.id.to_string());

        let path = format!("/tv/{}/season/{season}/episode/{episode}", show.id);
        let detail = self
            .http
            .json::<TmdbEpisodeDetail>(self.request(&path))
            .await;
        if let Some(detail) = episode_details(ProviderKind::Tmdb, detail).flatten() {
            record.episode_title = non_empty(detail.name);
            record.overview = non_empty(detail.overview).or(record.overview);
            record.air_date = non_empty(detail.air_date);
            record.rating = detail.vote_average.or(record.rating);
        }

        Ok(Some(record.into()))
    }
}
