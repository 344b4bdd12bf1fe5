//! Jikan (unofficial MyAnimeList API) metadata provider.
//!
//! Jikan throttles aggressively, so the registry gives this provider a
//! stricter limiter than the default.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use reelname_common::{EpisodeRecord, MovieRecord, ProviderKind, Result};

use super::{best_match, episode_details, non_empty, parse_year, Candidate};
use crate::metadata::http::HttpClient;
use crate::metadata::provider::{
    Capabilities, MetadataProvider, ProviderDescriptor, SearchOutcome,
};
use crate::metadata::rate_limit::RateLimiter;

const JIKAN_BASE_URL: &str = "https://api.jikan.moe/v4";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Minimum interval between Jikan requests.
pub const JIKAN_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, Deserialize)]
struct JikanPage<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct JikanAired {
    from: Option<String>,
}

#[derive(Debug, Deserialize)]
struct JikanGenre {
    name: String,
}

#[derive(Debug, Deserialize)]
struct JikanAnime {
    mal_id: u64,
    title: String,
    title_english: Option<String>,
    year: Option<u16>,
    aired: Option<JikanAired>,
    synopsis: Option<String>,
    score: Option<f64>,
    #[serde(default)]
    genres: Vec<JikanGenre>,
}

#[derive(Debug, Deserialize)]
struct JikanEpisode {
    title: Option<String>,
    synopsis: Option<String>,
    aired: Option<String>,
    score: Option<f64>,
}

impl Candidate for JikanAnime {
    fn candidate_title(&self) -> &str {
        self.title_english.as_deref().unwrap_or(&self.title)
    }
    fn candidate_year(&self) -> Option<u16> {
        self.year
            .or_else(|| parse_year(self.aired.as_ref().and_then(|a| a.from.as_deref())))
    }
}

/// Jikan provider.
pub struct JikanProvider {
    http: HttpClient,
    base_url: String,
}

impl JikanProvider {
    pub fn new(limiter: Arc<RateLimiter>) -> Result<Self> {
        Ok(Self {
            http: HttpClient::new(ProviderKind::Jikan, REQUEST_TIMEOUT, limiter)?,
            base_url: JIKAN_BASE_URL.to_string(),
        })
    }

    /// Point the provider at a different API root.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    async fn search(&self, title: &str, kind: &str, year: Option<u16>) -> Result<Option<JikanAnime>> {
        let request = self
            .http
            .get(&format!("{}/anime", self.base_url))
            .query(&[("q", title), ("type", kind), ("limit", "5")]);
        let hits = self
            .http
            .json::<JikanPage<Vec<JikanAnime>>>(request)
            .await?
            .map(|p| p.data)
            .unwrap_or_default();
        Ok(best_match(hits, title, year))
    }
}

#[async_trait]
impl MetadataProvider for JikanProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Jikan
    }

    fn descriptor(&self) -> ProviderDescriptor {
        ProviderDescriptor::keyless(ProviderKind::Jikan, Capabilities::BOTH)
    }

    async fn search_movie(&self, title: &str, year: Option<u16>) -> SearchOutcome {
        debug!(title, ?year, "Jikan search movie");

        let Some(anime) = self.search(title, "movie", year).await? else {
            return Ok(None);
        };

        let mut record = MovieRecord::new(
            ProviderKind::Jikan,
            anime.candidate_title(),
            anime.candidate_year(),
        );
        record.rating = anime.score;
        record.overview = non_empty(anime.synopsis);
        record.genres = anime.genres.into_iter().map(|g| g.name).collect();
        record.provider_id = Some(anime.mal_id.to_string());
        Ok(Some(record.into()))
    }

    async fn search_tv(&self, title: &str, season: u32, episode: u32) -> SearchOutcome {
        debug!(title, season, episode, "Jikan search series");

        let Some(anime) = self.search(title, "tv", None).await? else {
            return Ok(None);
        };

        let mut record = EpisodeRecord::new(
            ProviderKind::Jikan,
            anime.candidate_title(),
            season,
            episode,
        );
        record.show_year = anime.candidate_year();
        record.rating = anime.score;
        record.overview = non_empty(anime.synopsis);
        record.genres = anime.genres.into_iter().map(|g| g.name).collect();
        record.provider_id = Some(anime.mal_id.to_string());

        let request = self.http.get(&format!(
            "{}/anime/{}/episodes/{episode}",
            self.base_url, anime.mal_id
        ));
        let detail = self.http.json::<JikanPage<JikanEpisode>>(request).await;
        if let Some(ep) = episode_details(ProviderKind::Jikan, detail).flatten() {
            let ep = ep.data;
            record.episode_title = non_empty(ep.title);
            record.overview = non_empty(ep.synopsis).or(record.overview);
            record.air_date = ep.aired.map(|d| d.get(..10).unwrap_or(&d).to_string());
            record.rating = ep.score.or(record.rating);
        }

        Ok(Some(record.into()))
    }
}
