//! TVmaze metadata provider (TV only, no credential).

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use reelname_common::{EpisodeRecord, ProviderKind, Result};

use super::{episode_details, non_empty, parse_year, strip_html};
use crate::metadata::http::{HttpClient, DEFAULT_TIMEOUT};
use crate::metadata::provider::{
    Capabilities, MetadataProvider, ProviderDescriptor, SearchOutcome,
};
use crate::metadata::rate_limit::RateLimiter;

const TVMAZE_BASE_URL: &str = "https://api.tvmaze.com";

#[derive(Debug, Deserialize)]
struct TvmazeRating {
    average: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct TvmazeShow {
    id: u64,
    name: String,
    premiered: Option<String>,
    summary: Option<String>,
    rating: Option<TvmazeRating>,
    #[serde(default)]
    genres: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct TvmazeEpisode {
    name: Option<String>,
    summary: Option<String>,
    airdate: Option<String>,
    rating: Option<TvmazeRating>,
}

/// TVmaze provider.
///
/// Uses `singlesearch`, which returns the single best show or 404.
pub struct TvmazeProvider {
    http: HttpClient,
    base_url: String,
}

impl TvmazeProvider {
    pub fn new(limiter: Arc<RateLimiter>) -> Result<Self> {
        Ok(Self {
            http: HttpClient::new(ProviderKind::Tvmaze, DEFAULT_TIMEOUT, limiter)?,
            base_url: TVMAZE_BASE_URL.to_string(),
        })
    }

    /// Point the provider at a different API root.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

#[async_trait]
impl MetadataProvider for TvmazeProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Tvmaze
    }

    fn descriptor(&self) -> ProviderDescriptor {
        ProviderDescriptor::keyless(ProviderKind::Tvmaze, Capabilities::TV_ONLY)
    }

    async fn search_movie(&self, _title: &str, _year: Option<u16>) -> SearchOutcome {
        Ok(None)
    }

    async fn search_tv(&self, title: &str, season: u32, episode: u32) -> SearchOutcome {
        debug!(title, season, episode, "TVmaze search");

        let request = self
            .http
            .get(&format!("{}/singlesearch/shows", self.base_url))
            .query(&[("q", title)]);
        let Some(show) = self.http.json::<TvmazeShow>(request).await? else {
            return Ok(None);
        };

        let mut record = EpisodeRecord::new(ProviderKind::Tvmaze, &show.name, season, episode);
        record.show_year = parse_year(show.premiered.as_deref());
        record.overview = strip_html(show.summary.as_deref());
        record.rating = show.rating.and_then(|r| r.average);
        record.genres = show.genres;
        record.provider_id = Some(show.id.to_string());

        let request = self
            .http
            .get(&format!("{}/shows/{}/episodebynumber", self.base_url, show.id))
            .query(&[("season", season), ("number", episode)]);
        let detail = self.http.json::<TvmazeEpisode>(request).await;
        if let Some(ep) = episode_details(ProviderKind::Tvmaze, detail).flatten() {
            record.episode_title = non_empty(ep.name);
            record.overview = strip_html(ep.summary.as_deref()).or(record.overview);
            record.air_date = non_empty(ep.airdate);
            record.rating = ep.rating.and_then(|r| r.average).or(record.rating);
        }

        Ok(Some(record.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(server: &MockServer) -> TvmazeProvider {
        TvmazeProvider::new(Arc::new(RateLimiter::new(Duration::from_millis(1))))
            .unwrap()
            .with_base_url(server.uri())
    }

    #[tokio::test]
    async fn resolves_episode_and_strips_html() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/singlesearch/shows"))
            .and(query_param("q", "Breaking Bad"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": 169, "name": "Breaking Bad", "premiered": "2008-01-20",
                "summary": "<p>A chemistry teacher.</p>",
                "rating": {"average": 9.2}, "genres": ["Drama", "Crime"]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/shows/169/episodebynumber"))
            .and(query_param("season", "1"))
            .and(query_param("number", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": "Pilot", "summary": "<p>Walter's diagnosis.</p>", "airdate": "2008-01-20",
                "rating": {"average": null}
            })))
            .mount(&server)
            .await;

        let record = provider(&server)
            .search_tv("Breaking Bad", 1, 1)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.episode_title(), Some("Pilot"));
        assert_eq!(record.overview(), Some("Walter's diagnosis."));
        assert_eq!(record.rating(), Some(9.2));
        assert_eq!(record.year(), Some(2008));
    }

    #[tokio::test]
    async fn episode_failure_keeps_show() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/singlesearch/shows"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": 169, "name": "Breaking Bad", "premiered": "2008-01-20",
                "summary": "<p>A chemistry teacher.</p>"
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/shows/169/episodebynumber"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let record = provider(&server)
            .search_tv("Breaking Bad", 1, 1)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.title(), "Breaking Bad");
        assert_eq!(record.episode_title(), None);
        assert_eq!(record.overview(), Some("A chemistry teacher."));
    }

    #[tokio::test]
    async fn unknown_show_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        assert!(provider(&server).search_tv("zzz", 1, 1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn movies_are_not_served() {
        let server = MockServer::start().await;
        let tvmaze = provider(&server);
        assert!(!tvmaze.descriptor().serves_movies());
        assert!(tvmaze.descriptor().is_available());
        assert!(tvmaze.search_movie("Heat", None).await.unwrap().is_none());
    }
}
