//! AniDB HTTP API provider (TV only).
//!
//! A lookup is two steps: the local [`TitleCache`] turns the title into an
//! AniDB id, then `httpapi?request=anime` returns the full anime document as
//! gzip-compressed XML. AniDB numbers episodes absolutely within an anime
//! entry; the returned record carries that number in `absolute_episode`.
//!
//! AniDB bans clients that exceed one request every few seconds. Every
//! instance must be built with the same shared limiter.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use tracing::{debug, warn};

use reelname_common::{EpisodeRecord, Error, ProviderKind, Result};

use super::parse_year;
use crate::metadata::anidb_titles::{gunzip_if_needed, TitleCache};
use crate::metadata::http::HttpClient;
use crate::metadata::provider::{
    Capabilities, MetadataProvider, ProviderDescriptor, SearchOutcome,
};
use crate::metadata::rate_limit::RateLimiter;

const ANIDB_API_URL: &str = "http://api.anidb.net:9001/httpapi";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const PROTOCOL_VERSION: &str = "1";

// ---------------------------------------------------------------------------
// XML document model
// ---------------------------------------------------------------------------

#[derive(Debug, Default, PartialEq)]
struct AnidbTitle {
    lang: Option<String>,
    kind: Option<String>,
    text: String,
}

#[derive(Debug, Default, PartialEq)]
struct AnidbEpisode {
    /// Regular episode number; specials, credits and trailers have none.
    number: Option<u32>,
    titles: Vec<(Option<String>, String)>,
    airdate: Option<String>,
    rating: Option<f64>,
    summary: Option<String>,
}

#[derive(Debug, Default, PartialEq)]
struct AnidbAnime {
    id: Option<u32>,
    titles: Vec<AnidbTitle>,
    start_date: Option<String>,
    description: Option<String>,
    rating: Option<f64>,
    episodes: Vec<AnidbEpisode>,
}

#[derive(Debug, PartialEq)]
enum AnidbResponse {
    Anime(AnidbAnime),
    Error(String),
}

impl AnidbAnime {
    /// Official English title, else the main (romanized) title.
    fn display_title(&self) -> Option<&str> {
        let official_en = self.titles.iter().find(|t| {
            t.kind.as_deref() == Some("official") && t.lang.as_deref() == Some("en")
        });
        let main = self.titles.iter().find(|t| t.kind.as_deref() == Some("main"));
        official_en
            .or(main)
            .or(self.titles.first())
            .map(|t| t.text.as_str())
    }

    fn episode(&self, number: u32) -> Option<&AnidbEpisode> {
        self.episodes.iter().find(|e| e.number == Some(number))
    }
}

impl AnidbEpisode {
    /// English title, else the romanized one, else whatever is first.
    fn title(&self) -> Option<&str> {
        let by_lang = |lang: &str| {
            self.titles
                .iter()
                .find(|(l, _)| l.as_deref() == Some(lang))
                .map(|(_, t)| t.as_str())
        };
        by_lang("en")
            .or_else(|| by_lang("x-jat"))
            .or_else(|| self.titles.first().map(|(_, t)| t.as_str()))
    }
}

/// Parse an `httpapi?request=anime` document.
fn parse_anime(xml: &[u8]) -> Result<AnidbResponse> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut path: Vec<String> = Vec::new();
    let mut anime = AnidbAnime::default();
    let mut episode: Option<AnidbEpisode> = None;
    let mut lang: Option<String> = None;
    let mut title_kind: Option<String> = None;
    let mut regular_epno = false;
    let mut error: Option<String> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                lang = None;
                title_kind = None;

                for attr in e.attributes().flatten() {
                    let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
                    let value = String::from_utf8_lossy(&attr.value).to_string();
                    match (name.as_str(), key.as_str()) {
                        ("anime", "id") if path.is_empty() => anime.id = value.parse().ok(),
                        (_, "xml:lang") => lang = Some(value),
                        ("title", "type") => title_kind = Some(value),
                        ("epno", "type") => regular_epno = value == "1",
                        _ => {}
                    }
                }

                if name == "episode" && path.last().map(String::as_str) == Some("episodes") {
                    episode = Some(AnidbEpisode::default());
                }
                path.push(name);
            }
            Ok(Event::End(_)) => {
                if path.pop().as_deref() == Some("episode") {
                    if let Some(ep) = episode.take() {
                        anime.episodes.push(ep);
                    }
                }
            }
            Ok(Event::Text(e)) => {
                let text = e.unescape().unwrap_or_default().to_string();
                let depth = path.len();
                let current = path.last().map(String::as_str).unwrap_or_default();
                let parent = depth
                    .checked_sub(2)
                    .and_then(|i| path.get(i))
                    .map(String::as_str)
                    .unwrap_or_default();

                match (parent, current) {
                    ("", "error") => error = Some(text),
                    ("anime", "startdate") => anime.start_date = Some(text),
                    ("anime", "description") => anime.description = Some(text),
                    ("titles", "title") if depth == 3 => anime.titles.push(AnidbTitle {
                        lang: lang.clone(),
                        kind: title_kind.clone(),
                        text,
                    }),
                    ("ratings", "permanent") => anime.rating = text.parse().ok(),
                    ("episode", field) => {
                        if let Some(ep) = episode.as_mut() {
                            match field {
                                "epno" => {
                                    ep.number = regular_epno.then(|| text.parse().ok()).flatten()
                                }
                                "airdate" => ep.airdate = Some(text),
                                "rating" => ep.rating = text.parse().ok(),
                                "title" => ep.titles.push((lang.clone(), text)),
                                "summary" => ep.summary = Some(text),
                                _ => {}
                            }
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::parse(format!("AniDB XML parse error: {e}"))),
            _ => {}
        }
        buf.clear();
    }

    match error {
        Some(message) => Ok(AnidbResponse::Error(message)),
        None if anime.id.is_some() => Ok(AnidbResponse::Anime(anime)),
        None => Err(Error::parse("AniDB response has no <anime> element")),
    }
}

// ---------------------------------------------------------------------------
// Provider implementation
// ---------------------------------------------------------------------------

/// AniDB provider.
pub struct AnidbProvider {
    http: HttpClient,
    base_url: String,
    client: String,
    client_version: u32,
    titles: Arc<TitleCache>,
}

impl AnidbProvider {
    /// Create a provider for a registered AniDB client.
    ///
    /// `limiter` must be the process-wide AniDB limiter and `titles` the
    /// shared title cache.
    pub fn new(
        client: impl Into<String>,
        client_version: u32,
        limiter: Arc<RateLimiter>,
        titles: Arc<TitleCache>,
    ) -> Result<Self> {
        Ok(Self {
            http: HttpClient::new(ProviderKind::Anidb, REQUEST_TIMEOUT, limiter)?,
            base_url: ANIDB_API_URL.to_string(),
            client: client.into().trim().to_string(),
            client_version,
            titles,
        })
    }

    /// Point the provider at a different API root.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    async fn fetch_anime(&self, aid: u32) -> Result<Option<AnidbAnime>> {
        let request = self.http.get(&self.base_url).query(&[
            ("request", "anime".to_string()),
            ("client", self.client.clone()),
            ("clientver", self.client_version.to_string()),
            ("protover", PROTOCOL_VERSION.to_string()),
            ("aid", aid.to_string()),
        ]);
        let Some(body) = self.http.bytes(request).await? else {
            return Ok(None);
        };

        match parse_anime(&gunzip_if_needed(&body)?)? {
            AnidbResponse::Anime(anime) => Ok(Some(anime)),
            AnidbResponse::Error(message) if message.to_lowercase().contains("banned") => {
                warn!(aid, "AniDB reports this client as banned");
                Err(Error::transport(format!("AniDB: {message}")))
            }
            AnidbResponse::Error(message) => {
                debug!(aid, error = %message, "AniDB returned an error document");
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl MetadataProvider for AnidbProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Anidb
    }

    fn descriptor(&self) -> ProviderDescriptor {
        ProviderDescriptor::keyed(
            ProviderKind::Anidb,
            Capabilities::TV_ONLY,
            !self.client.is_empty(),
        )
        .with_absolute_numbering()
    }

    async fn search_movie(&self, _title: &str, _year: Option<u16>) -> SearchOutcome {
        Ok(None)
    }

    async fn search_tv(&self, title: &str, season: u32, episode: u32) -> SearchOutcome {
        if self.client.is_empty() {
            return Err(Error::configuration("AniDB client name is not set"));
        }

        let Some(hit) = self.titles.search(title).await? else {
            debug!(title, "no AniDB id for title");
            return Ok(None);
        };
        debug!(title, aid = hit.anidb_id, kind = ?hit.kind, season, episode, "AniDB lookup");

        let Some(anime) = self.fetch_anime(hit.anidb_id).await? else {
            return Ok(None);
        };

        let show_title = anime.display_title().unwrap_or(&hit.title).to_string();
        let mut record = EpisodeRecord::new(ProviderKind::Anidb, show_title, 1, episode);
        record.show_year = parse_year(anime.start_date.as_deref());
        record.rating = anime.rating;
        record.overview = anime.description.clone();
        record.provider_id = Some(hit.anidb_id.to_string());
        record.absolute_episode = Some(episode);

        if let Some(ep) = anime.episode(episode) {
            record.episode_title = ep.title().map(str::to_string);
            record.air_date = ep.airdate.clone();
            record.rating = ep.rating.or(record.rating);
            if ep.summary.is_some() {
                record.overview = ep.summary.clone();
            }
        }

        Ok(Some(record.into()))
    }
}
