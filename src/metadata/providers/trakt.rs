//! Trakt metadata provider.
//!
//! Requests carry the application client id in the `trakt-api-key` header
//! together with `trakt-api-version: 2`. Search results arrive already
//! ordered by Trakt's relevance score.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use reelname_common::{EpisodeRecord, Error, MovieRecord, ProviderKind, Result};

use super::{best_match, episode_details, non_empty, Candidate};
use crate::metadata::http::{HttpClient, DEFAULT_TIMEOUT};
use crate::metadata::provider::{
    Capabilities, MetadataProvider, ProviderDescriptor, SearchOutcome,
};
use crate::metadata::rate_limit::RateLimiter;

const TRAKT_BASE_URL: &str = "https://api.trakt.tv";
const TRAKT_API_VERSION: &str = "2";

#[derive(Debug, Deserialize)]
struct TraktIds {
    trakt: u64,
}

#[derive(Debug, Deserialize)]
struct TraktMedia {
    title: String,
    year: Option<u16>,
    ids: TraktIds,
    overview: Option<String>,
    rating: Option<f64>,
    #[serde(default)]
    genres: Vec<String>,
}

impl Candidate for TraktMedia {
    fn candidate_title(&self) -> &str {
        &self.title
    }
    fn candidate_year(&self) -> Option<u16> {
        self.year
    }
}

#[derive(Debug, Deserialize)]
struct TraktMovieHit {
    movie: TraktMedia,
}

#[derive(Debug, Deserialize)]
struct TraktShowHit {
    show: TraktMedia,
}

#[derive(Debug, Deserialize)]
struct TraktEpisode {
    title: Option<String>,
    overview: Option<String>,
    rating: Option<f64>,
    first_aired: Option<String>,
}

/// Trakt provider.
pub struct TraktProvider {
    http: HttpClient,
    base_url: String,
    client_id: String,
}

impl TraktProvider {
    pub fn new(client_id: impl Into<String>, limiter: Arc<RateLimiter>) -> Result<Self> {
        Ok(Self {
            http: HttpClient::new(ProviderKind::Trakt, DEFAULT_TIMEOUT, limiter)?,
            base_url: TRAKT_BASE_URL.to_string(),
            client_id: client_id.into().trim().to_string(),
        })
    }

    /// Point the provider at a different API root.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    fn request(&self, path: &str) -> Result<reqwest::RequestBuilder> {
        if self.client_id.is_empty() {
            return Err(Error::configuration("Trakt client id is not set"));
        }
        Ok(self
            .http
            .get(&format!("{}{path}", self.base_url))
            .header("content-type", "application/json")
            .header("trakt-api-key", &self.client_id)
            .header("trakt-api-version", TRAKT_API_VERSION)
            .query(&[("extended", "full")]))
    }
}

#[async_trait]
impl MetadataProvider for TraktProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Trakt
    }

    fn descriptor(&self) -> ProviderDescriptor {
        ProviderDescriptor::keyed(
            ProviderKind::Trakt,
            Capabilities::BOTH,
            !self.client_id.is_empty(),
        )
    }

    async fn search_movie(&self, title: &str, year: Option<u16>) -> SearchOutcome {
        debug!(title, ?year, "Trakt search movie");

        let mut request = self.request("/search/movie")?.query(&[("query", title)]);
        if let Some(y) = year {
            request = request.query(&[("years", y)]);
        }
        let Some(hits) = self.http.json::<Vec<TraktMovieHit>>(request).await? else {
            return Ok(None);
        };

        let Some(movie) = best_match(hits.into_iter().map(|h| h.movie), title, year) else {
            return Ok(None);
        };

        let mut record = MovieRecord::new(ProviderKind::Trakt, movie.title, movie.year);
        record.overview = non_empty(movie.overview);
        record.rating = movie.rating;
        record.genres = movie.genres;
        record.provider_id = Some(movie.ids.trakt.to_string());
        Ok(Some(record.into()))
    }

    async fn search_tv(&self, title: &str, season: u32, episode: u32) -> SearchOutcome {
        debug!(title, season, episode, "Trakt search show");

        let request = self.request("/search/show")?.query(&[("query", title)]);
        let Some(hits) = self.http.json::<Vec<TraktShowHit>>(request).await? else {
            return Ok(None);
        };

        let Some(show) = best_match(hits.into_iter().map(|h| h.show), title, None) else {
            return Ok(None);
        };

        let show_id = show.ids.trakt;
        let mut record = EpisodeRecord::new(ProviderKind::Trakt, show.title, season, episode);
        record.show_year = show.year;
        record.overview = non_empty(show.overview);
        record.rating = show.rating;
        record.genres = show.genres;
        record.provider_id = Some(show_id.to_string());

        let path = format!("/shows/{show_id}/seasons/{season}/episodes/{episode}");
        let detail = self.http.json::<TraktEpisode>(self.request(&path)?).await;
        if let Some(ep) = episode_details(ProviderKind::Trakt, detail).flatten() {
            record.episode_title = non_empty(ep.title);
            record.overview = non_empty(ep.overview).or(record.overview);
            record.rating = ep.rating.or(record.rating);
            record.air_date = ep
                .first_aired
                .map(|d| d.get(..10).unwrap_or(&d).to_string());
        }

        Ok(Some(record.into()))
    }
}
