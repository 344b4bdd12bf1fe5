//! Resolver integration tests against mocked provider APIs.

use std::sync::Arc;
use std::time::Duration;

use reelname::format::format;
use reelname::metadata::providers::{JikanProvider, TmdbProvider, TvmazeProvider};
use reelname::metadata::{ProviderRegistry, RateLimiter, Resolver};
use reelname_common::ProviderKind;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn limiter() -> Arc<RateLimiter> {
    Arc::new(RateLimiter::new(Duration::from_millis(1)))
}

async fn tmdb_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/movie"))
        .and(query_param("query", "Inception"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "results": [{"id": 27205, "title": "Inception", "release_date": "2010-07-15",
                         "overview": "Dreams within dreams", "vote_average": 8.4}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search/tv"))
        .and(query_param("query", "Breaking Bad"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "results": [{"id": 1396, "name": "Breaking Bad", "first_air_date": "2008-01-20"}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tv/1396/season/1/episode/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": "Pilot", "air_date": "2008-01-20"
        })))
        .mount(&server)
        .await;
    server
}

fn tmdb(server: &MockServer) -> Arc<TmdbProvider> {
    Arc::new(
        TmdbProvider::new("k", "en-US", limiter())
            .unwrap()
            .with_base_url(server.uri()),
    )
}

fn tvmaze(server: &MockServer) -> Arc<TvmazeProvider> {
    Arc::new(
        TvmazeProvider::new(limiter())
            .unwrap()
            .with_base_url(server.uri()),
    )
}

#[tokio::test]
async fn movie_resolves_and_formats() {
    let server = tmdb_server().await;
    let mut registry = ProviderRegistry::new();
    registry.register(tmdb(&server));
    let resolver = Resolver::new(Arc::new(registry));

    let record = resolver
        .resolve("Inception.2010.1080p.BluRay.x264.mkv", None)
        .await
        .expect("tmdb should resolve the movie");

    assert_eq!(record.source(), ProviderKind::Tmdb);
    assert_eq!(format(&record, "{title} ({year})"), "Inception (2010)");
}

#[tokio::test]
async fn tv_falls_back_past_failing_provider() {
    let tvmaze_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&tvmaze_server)
        .await;
    let tmdb_server = tmdb_server().await;

    let mut registry = ProviderRegistry::new();
    registry.register(tvmaze(&tvmaze_server));
    registry.register(tmdb(&tmdb_server));
    let resolver = Resolver::new(Arc::new(registry));

    let record = resolver
        .resolve("Breaking.Bad.S01E01.720p.mkv", None)
        .await
        .expect("tmdb should answer after tvmaze fails");

    assert_eq!(record.source(), ProviderKind::Tmdb);
    assert_eq!(
        format(&record, "{title} - {S}{E} - {episodeTitle}"),
        "Breaking Bad - S01E01 - Pilot"
    );
    assert!(!tvmaze_server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn first_success_stops_the_chain() {
    let tvmaze_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/singlesearch/shows"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": 169, "name": "Breaking Bad", "premiered": "2008-01-20"
        })))
        .mount(&tvmaze_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/shows/169/episodebynumber"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": "Pilot"
        })))
        .mount(&tvmaze_server)
        .await;
    let tmdb_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"results": []})))
        .expect(0)
        .mount(&tmdb_server)
        .await;

    let mut registry = ProviderRegistry::new();
    registry.register(tvmaze(&tvmaze_server));
    registry.register(tmdb(&tmdb_server));
    let resolver = Resolver::new(Arc::new(registry));

    let record = resolver
        .resolve("Breaking.Bad.S01E01.mkv", None)
        .await
        .unwrap();
    assert_eq!(record.source(), ProviderKind::Tvmaze);
    assert_eq!(record.episode_title(), Some("Pilot"));
}

#[tokio::test]
async fn override_queries_only_that_provider() {
    let tvmaze_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&tvmaze_server)
        .await;
    let tmdb_server = tmdb_server().await;

    let mut registry = ProviderRegistry::new();
    registry.register(tvmaze(&tvmaze_server));
    registry.register(tmdb(&tmdb_server));
    let resolver = Resolver::new(Arc::new(registry));

    let record = resolver
        .resolve("Breaking.Bad.S01E01.mkv", Some(ProviderKind::Tvmaze))
        .await;
    assert!(record.is_none());
    assert!(tmdb_server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn anime_title_goes_to_anime_provider_first() {
    let jikan_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/anime"))
        .and(query_param("type", "tv"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [{"mal_id": 1735, "title": "Naruto: Shippuuden",
                      "title_english": "Naruto Shippuden", "year": 2007}]
        })))
        .mount(&jikan_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/anime/1735/episodes/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {"title": "The Results of Training"}
        })))
        .mount(&jikan_server)
        .await;
    let tmdb_server = MockServer::start().await;

    let mut registry = ProviderRegistry::new();
    registry.register(tmdb(&tmdb_server));
    registry.register(Arc::new(
        JikanProvider::new(limiter())
            .unwrap()
            .with_base_url(jikan_server.uri()),
    ));
    let resolver = Resolver::new(Arc::new(registry));

    let record = resolver
        .resolve("Naruto.Shippuden.S01E03.1080p.mkv", None)
        .await
        .unwrap();
    assert_eq!(record.source(), ProviderKind::Jikan);
    assert_eq!(record.episode_title(), Some("The Results of Training"));
    assert!(tmdb_server.received_requests().await.unwrap().is_empty());
}
