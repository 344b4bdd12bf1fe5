//! Kitsu metadata provider (JSON:API, no credential).

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use reelname_common::{EpisodeRecord, MovieRecord, ProviderKind, Result};

use super::{best_match, episode_details, non_empty, parse_year, Candidate};
use crate::metadata::http::{HttpClient, DEFAULT_TIMEOUT};
use crate::metadata::provider::{
    Capabilities, MetadataProvider, ProviderDescriptor, SearchOutcome,
};
use crate::metadata::rate_limit::RateLimiter;

const KITSU_BASE_URL: &str = "https://kitsu.io/api/edge";
const JSON_API: &str = "application/vnd.api+json";
const PAGE_LIMIT: &str = "5";

#[derive(Debug, Deserialize)]
struct KitsuDocument<T> {
    #[serde(default = "Vec::new")]
    data: Vec<KitsuResource<T>>,
}

#[derive(Debug, Deserialize)]
struct KitsuResource<T> {
    id: String,
    attributes: T,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KitsuAnime {
    canonical_title: Option<String>,
    titles: Option<KitsuTitles>,
    start_date: Option<String>,
    synopsis: Option<String>,
    /// Percentage as a decimal string, e.g. `"82.26"`.
    average_rating: Option<String>,
    subtype: Option<String>,
}

#[derive(Debug, Deserialize)]
struct KitsuTitles {
    en: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KitsuEpisode {
    canonical_title: Option<String>,
    synopsis: Option<String>,
    airdate: Option<String>,
}

impl KitsuAnime {
    fn is_movie(&self) -> bool {
        self.subtype
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case("movie"))
    }

    fn rating(&self) -> Option<f64> {
        self.average_rating
            .as_deref()
            .and_then(|r| r.parse::<f64>().ok())
            .map(|r| r / 10.0)
    }
}

impl Candidate for KitsuResource<KitsuAnime> {
    fn candidate_title(&self) -> &str {
        let a = &self.attributes;
        a.titles
            .as_ref()
            .and_then(|t| t.en.as_deref())
            .or(a.canonical_title.as_deref())
            .unwrap_or_default()
    }
    fn candidate_year(&self) -> Option<u16> {
        parse_year(self.attributes.start_date.as_deref())
    }
}

/// Kitsu provider.
pub struct KitsuProvider {
    http: HttpClient,
    base_url: String,
}

impl KitsuProvider {
    pub fn new(limiter: Arc<RateLimiter>) -> Result<Self> {
        Ok(Self {
            http: HttpClient::new(ProviderKind::Kitsu, DEFAULT_TIMEOUT, limiter)?,
            base_url: KITSU_BASE_URL.to_string(),
        })
    }

    /// Point the provider at a different API root.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<KitsuResource<T>>> {
        let request = self
            .http
            .get(&format!("{}{path}", self.base_url))
            .header("accept", JSON_API)
            .query(query);
        Ok(self
            .http
            .json::<KitsuDocument<T>>(request)
            .await?
            .map(|doc| doc.data)
            .unwrap_or_default())
    }
}

#[async_trait]
impl MetadataProvider for KitsuProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Kitsu
    }

    fn descriptor(&self) -> ProviderDescriptor {
        ProviderDescriptor::keyless(ProviderKind::Kitsu, Capabilities::BOTH)
    }

    async fn search_movie(&self, title: &str, year: Option<u16>) -> SearchOutcome {
        debug!(title, ?year, "Kitsu search movie");

        let hits = self
            .get::<KitsuAnime>(
                "/anime",
                &[
                    ("filter[text]", title),
                    ("filter[subtype]", "movie"),
                    ("page[limit]", PAGE_LIMIT),
                ],
            )
            .await?;
        let Some(hit) = best_match(hits, title, year) else {
            return Ok(None);
        };

        let mut record = MovieRecord::new(
            ProviderKind::Kitsu,
            hit.candidate_title(),
            hit.candidate_year(),
        );
        record.rating = hit.attributes.rating();
        record.overview = non_empty(hit.attributes.synopsis);
        record.provider_id = Some(hit.id);
        Ok(Some(record.into()))
    }

    async fn search_tv(&self, title: &str, season: u32, episode: u32) -> SearchOutcome {
        debug!(title, season, episode, "Kitsu search series");

        let hits = self
            .get::<KitsuAnime>(
                "/anime",
                &[("filter[text]", title), ("page[limit]", PAGE_LIMIT)],
            )
            .await?;
        let series = hits.into_iter().filter(|h| !h.attributes.is_movie());
        let Some(show) = best_match(series, title, None) else {
            return Ok(None);
        };

        let mut record = EpisodeRecord::new(
            ProviderKind::Kitsu,
            show.candidate_title(),
            season,
            episode,
        );
        record.show_year = show.candidate_year();
        record.rating = show.attributes.rating();
        record.overview = non_empty(show.attributes.synopsis);

        let number = episode.to_string();
        let episodes = self
            .get::<KitsuEpisode>(
                &format!("/anime/{}/episodes", show.id),
                &[("filter[number]", number.as_str())],
            )
            .await;
        let episodes = episode_details(ProviderKind::Kitsu, episodes).unwrap_or_default();
        if let Some(ep) = episodes.into_iter().next() {
            record.episode_title = non_empty(ep.attributes.canonical_title);
            record.overview = non_empty(ep.attributes.synopsis).or(record.overview);
            record.air_date = non_empty(ep.attributes.airdate);
        }
        record.provider_id = Some(show.id);

        Ok(Some(record.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(server: &MockServer) -> KitsuProvider {
        KitsuProvider::new(Arc::new(RateLimiter::new(Duration::from_millis(1))))
            .unwrap()
            .with_base_url(server.uri())
    }

    #[tokio::test]
    async fn series_lookup_skips_movies() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/anime"))
            .and(header("accept", JSON_API))
            .and(query_param("filter[text]", "Cowboy Bebop"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [
                    {"id": "4", "attributes": {"canonicalTitle": "Cowboy Bebop: Tengoku no Tobira",
                        "subtype": "movie", "startDate": "2001-09-01"}},
                    {"id": "1", "attributes": {"canonicalTitle": "Cowboy Bebop",
                        "titles": {"en": "Cowboy Bebop"}, "subtype": "TV",
                        "startDate": "1998-04-03", "averageRating": "82.0"}}
                ]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/anime/1/episodes"))
            .and(query_param("filter[number]", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{"id": "10", "attributes": {"canonicalTitle": "Asteroid Blues",
                    "airdate": "1998-10-24"}}]
            })))
            .mount(&server)
            .await;

        let record = provider(&server)
            .search_tv("Cowboy Bebop", 1, 1)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.title(), "Cowboy Bebop");
        assert_eq!(record.episode_title(), Some("Asteroid Blues"));
        assert_eq!(record.rating(), Some(8.2));
        assert_eq!(record.year(), Some(1998));
    }

    #[tokio::test]
    async fn empty_document_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": []})))
            .mount(&server)
            .await;

        assert!(provider(&server).search_movie("zzz", None).await.unwrap().is_none());
    }
}
