//! OMDb metadata provider.
//!
//! OMDb answers every request with HTTP 200 and reports misses through
//! `"Response": "False"`, so that flag is checked before anything else.
//! Missing values come back as the string `"N/A"`.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use reelname_common::{EpisodeRecord, Error, MovieRecord, ProviderKind, Result};

use super::{episode_details, non_empty, parse_year};
use crate::metadata::http::{HttpClient, DEFAULT_TIMEOUT};
use crate::metadata::provider::{
    Capabilities, MetadataProvider, ProviderDescriptor, SearchOutcome,
};
use crate::metadata::rate_limit::RateLimiter;

const OMDB_BASE_URL: &str = "https://www.omdbapi.com/";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct OmdbTitle {
    response: String,
    title: Option<String>,
    year: Option<String>,
    plot: Option<String>,
    genre: Option<String>,
    released: Option<String>,
    #[serde(rename = "imdbRating")]
    imdb_rating: Option<String>,
    #[serde(rename = "imdbID")]
    imdb_id: Option<String>,
    error: Option<String>,
}

impl OmdbTitle {
    fn found(&self) -> bool {
        self.response.eq_ignore_ascii_case("true")
    }

    fn rating(&self) -> Option<f64> {
        self.imdb_rating.as_deref().and_then(|r| r.parse().ok())
    }

    fn genres(&self) -> Vec<String> {
        self.genre
            .as_deref()
            .filter(|g| *g != "N/A")
            .map(|g| g.split(',').map(|s| s.trim().to_string()).collect())
            .unwrap_or_default()
    }
}

/// OMDb provider.
pub struct OmdbProvider {
    http: HttpClient,
    base_url: String,
    api_key: String,
}

impl OmdbProvider {
    pub fn new(api_key: impl Into<String>, limiter: Arc<RateLimiter>) -> Result<Self> {
        Ok(Self {
            http: HttpClient::new(ProviderKind::Omdb, DEFAULT_TIMEOUT, limiter)?,
            base_url: OMDB_BASE_URL.to_string(),
            api_key: api_key.into().trim().to_string(),
        })
    }

    /// Point the provider at a different API root.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    async fn lookup(&self, params: &[(&str, String)]) -> Result<Option<OmdbTitle>> {
        if self.api_key.is_empty() {
            return Err(Error::configuration("OMDb API key is not set"));
        }
        let request = self
            .http
            .get(&self.base_url)
            .query(&[("apikey", &self.api_key)])
            .query(params);
        let Some(title) = self.http.json::<OmdbTitle>(request).await? else {
            return Ok(None);
        };
        if !title.found() {
            debug!(error = ?title.error, "OMDb has no match");
            return Ok(None);
        }
        Ok(Some(title))
    }
}

#[async_trait]
impl MetadataProvider for OmdbProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Omdb
    }

    fn descriptor(&self) -> ProviderDescriptor {
        ProviderDescriptor::keyed(
            ProviderKind::Omdb,
            Capabilities::BOTH,
            !self.api_key.is_empty(),
        )
    }

    async fn search_movie(&self, title: &str, year: Option<u16>) -> SearchOutcome {
        debug!(title, ?year, "OMDb search movie");

        let mut params = vec![("t", title.to_string()), ("type", "movie".to_string())];
        if let Some(y) = year {
            params.push(("y", y.to_string()));
        }
        let Some(hit) = self.lookup(&params).await? else {
            return Ok(None);
        };

        let mut record = MovieRecord::new(
            ProviderKind::Omdb,
            hit.title.clone().unwrap_or_else(|| title.to_string()),
            parse_year(hit.year.as_deref()),
        );
        record.rating = hit.rating();
        record.genres = hit.genres();
        record.overview = non_empty(hit.plot);
        record.provider_id = non_empty(hit.imdb_id);
        Ok(Some(record.into()))
    }

    async fn search_tv(&self, title: &str, season: u32, episode: u32) -> SearchOutcome {
        debug!(title, season, episode, "OMDb search series");

        let Some(series) = self
            .lookup(&[("t", title.to_string()), ("type", "series".to_string())])
            .await?
        else {
            return Ok(None);
        };

        let mut record = EpisodeRecord::new(
            ProviderKind::Omdb,
            series.title.clone().unwrap_or_else(|| title.to_string()),
            season,
            episode,
        );
        record.show_year = parse_year(series.year.as_deref());
        record.rating = series.rating();
        record.genres = series.genres();
        record.overview = non_empty(series.plot);
        record.provider_id = non_empty(series.imdb_id);

        if let Some(series_id) = record.provider_id.clone() {
            let episode_hit = self
                .lookup(&[
                    ("i", series_id),
                    ("Season", season.to_string()),
                    ("Episode", episode.to_string()),
                ])
                .await;
            if let Some(ep) = episode_details(ProviderKind::Omdb, episode_hit).flatten() {
                let rating = ep.rating();
                record.episode_title = non_empty(ep.title);
                record.overview = non_empty(ep.plot).or(record.overview);
                record.air_date = non_empty(ep.released);
                record.rating = rating.or(record.rating);
            }
        }

        Ok(Some(record.into()))
    }
}
