//! TheTVDB v4 metadata provider (TV only).
//!
//! The API key is exchanged for a bearer token on first use via
//! `POST /login`; the token is cached for the lifetime of the provider and
//! discarded when the API answers 401 so the next call logs in again.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Deserialize;
use tracing::debug;

use reelname_common::{EpisodeRecord, Error, ProviderKind, Result};

use super::{best_match, episode_details, non_empty, Candidate};
use crate::metadata::http::{HttpClient, DEFAULT_TIMEOUT};
use crate::metadata::provider::{
    Capabilities, MetadataProvider, ProviderDescriptor, SearchOutcome,
};
use crate::metadata::rate_limit::RateLimiter;

const TVDB_BASE_URL: &str = "https://api4.thetvdb.com/v4";

#[derive(Debug, Deserialize)]
struct TvdbEnvelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct TvdbLogin {
    token: String,
}

#[derive(Debug, Deserialize)]
struct TvdbSearchHit {
    tvdb_id: String,
    name: Option<String>,
    year: Option<String>,
    overview: Option<String>,
}

impl Candidate for TvdbSearchHit {
    fn candidate_title(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }
    fn candidate_year(&self) -> Option<u16> {
        self.year.as_deref().and_then(|y| y.parse().ok())
    }
}

#[derive(Debug, Deserialize)]
struct TvdbEpisodePage {
    #[serde(default)]
    episodes: Vec<TvdbEpisode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TvdbEpisode {
    name: Option<String>,
    overview: Option<String>,
    aired: Option<String>,
    season_number: Option<u32>,
    number: Option<u32>,
}

/// TheTVDB provider.
pub struct TvdbProvider {
    http: HttpClient,
    base_url: String,
    api_key: String,
    token: Mutex<Option<String>>,
}

impl TvdbProvider {
    pub fn new(api_key: impl Into<String>, limiter: Arc<RateLimiter>) -> Result<Self> {
        Ok(Self {
            http: HttpClient::new(ProviderKind::Tvdb, DEFAULT_TIMEOUT, limiter)?,
            base_url: TVDB_BASE_URL.to_string(),
            api_key: api_key.into().trim().to_string(),
            token: Mutex::new(None),
        })
    }

    /// Point the provider at a different API root.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// A cached bearer token, logging in when there is none.
    async fn token(&self) -> Result<String> {
        let cached = self.token.lock().clone();
        if let Some(token) = cached {
            return Ok(token);
        }
        if self.api_key.is_empty() {
            return Err(Error::configuration("TVDB API key is not set"));
        }

        debug!("TVDB login");
        let request = self
            .http
            .post(&format!("{}/login", self.base_url))
            .json(&serde_json::json!({ "apikey": self.api_key }));
        let login = self
            .http
            .json::<TvdbEnvelope<TvdbLogin>>(request)
            .await?
            .ok_or_else(|| Error::transport("TVDB login endpoint not found"))?;

        *self.token.lock() = Some(login.data.token.clone());
        Ok(login.data.token)
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Option<T>> {
        let token = self.token().await?;
        let request = self
            .http
            .get(&format!("{}{path}", self.base_url))
            .bearer_auth(token)
            .query(query);
        let result = self.http.json(request).await;
        if matches!(result, Err(Error::Unauthorized(_))) {
            debug!("TVDB token rejected; discarding it");
            self.token.lock().take();
        }
        result
    }
}

#[async_trait]
impl MetadataProvider for TvdbProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Tvdb
    }

    fn descriptor(&self) -> ProviderDescriptor {
        ProviderDescriptor::keyed(
            ProviderKind::Tvdb,
            Capabilities::TV_ONLY,
            !self.api_key.is_empty(),
        )
    }

    async fn search_movie(&self, _title: &str, _year: Option<u16>) -> SearchOutcome {
        Ok(None)
    }

    async fn search_tv(&self, title: &str, season: u32, episode: u32) -> SearchOutcome {
        debug!(title, season, episode, "TVDB search");

        let Some(hits) = self
            .get::<TvdbEnvelope<Vec<TvdbSearchHit>>>(
                "/search",
                &[("query", title.to_string()), ("type", "series".to_string())],
            )
            .await?
        else {
            return Ok(None);
        };

        let Some(show) = best_match(hits.data, title, None) else {
            return Ok(None);
        };

        let mut record = EpisodeRecord::new(
            ProviderKind::Tvdb,
            show.candidate_title(),
            season,
            episode,
        );
        record.show_year = show.candidate_year();
        record.overview = non_empty(show.overview);
        let series_id = show.tvdb_id;

        let page = self
            .get::<TvdbEnvelope<TvdbEpisodePage>>(
                &format!("/series/{series_id}/episodes/default"),
                &[
                    ("season", season.to_string()),
                    ("episodeNumber", episode.to_string()),
                ],
            )
            .await;

        let found = episode_details(ProviderKind::Tvdb, page).flatten().and_then(|p| {
            p.data
                .episodes
                .into_iter()
                .find(|e| e.season_number == Some(season) && e.number == Some(episode))
        });
        if let Some(ep) = found {
            record.episode_title = non_empty(ep.name);
            record.overview = non_empty(ep.overview).or(record.overview);
            record.air_date = non_empty(ep.aired);
        }
        record.provider_id = Some(series_id);

        Ok(Some(record.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(key: &str, server: &MockServer) -> TvdbProvider {
        TvdbProvider::new(key, Arc::new(RateLimiter::new(Duration::from_millis(1))))
            .unwrap()
            .with_base_url(server.uri())
    }

    async fn mount_login(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/login"))
            .and(body_json(serde_json::json!({"apikey": "secret"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"data": {"token": "tok"}})),
            )
            .expect(1)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn logs_in_once_and_fetches_episode() {
        let server = MockServer::start().await;
        mount_login(&server).await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(header("authorization", "Bearer tok"))
            .and(query_param("query", "Severance"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{"tvdb_id": "371980", "name": "Severance", "year": "2022"}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/series/371980/episodes/default"))
            .and(query_param("season", "1"))
            .and(query_param("episodeNumber", "3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {"episodes": [
                    {"name": "In Perpetuity", "seasonNumber": 1, "number": 3, "aired": "2022-02-25"}
                ]}
            })))
            .mount(&server)
            .await;

        let tvdb = provider("secret", &server);
        let record = tvdb.search_tv("Severance", 1, 3).await.unwrap().unwrap();
        assert_eq!(record.title(), "Severance");
        assert_eq!(record.year(), Some(2022));
        assert_eq!(record.episode_title(), Some("In Perpetuity"));

        // Second lookup reuses the cached token.
        tvdb.search_tv("Severance", 1, 3).await.unwrap();
    }

    #[tokio::test]
    async fn episode_failure_keeps_show() {
        let server = MockServer::start().await;
        mount_login(&server).await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{"tvdb_id": "371980", "name": "Severance", "year": "2022"}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/series/371980/episodes/default"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let record = provider("secret", &server)
            .search_tv("Severance", 1, 3)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.title(), "Severance");
        assert_eq!(record.episode(), Some(3));
        assert_eq!(record.episode_title(), None);
    }

    #[tokio::test]
    async fn rejected_token_logs_in_again() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"data": {"token": "expired"}})),
            )
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"data": {"token": "fresh"}})),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(header("authorization", "Bearer expired"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(header("authorization", "Bearer fresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{"tvdb_id": "371980", "name": "Severance", "year": "2022"}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/series/371980/episodes/default"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let tvdb = provider("secret", &server);
        let err = tvdb.search_tv("Severance", 1, 3).await.unwrap_err();
        assert!(matches!(err, Error::Unauthorized(_)));

        let record = tvdb.search_tv("Severance", 1, 3).await.unwrap().unwrap();
        assert_eq!(record.title(), "Severance");
    }

    #[tokio::test]
    async fn no_key_is_unavailable_and_tv_only() {
        let server = MockServer::start().await;
        let d = provider("", &server).descriptor();
        assert!(!d.is_available());
        assert!(!d.capabilities.movie);
        assert!(provider("", &server).search_tv("x", 1, 1).await.is_err());
    }

    #[tokio::test]
    async fn failed_login_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = provider("bad", &server).search_tv("x", 1, 1).await.unwrap_err();
        assert!(err.is_transport());
    }
}
