//! Local AniDB title database with fuzzy title-to-ID matching.
//!
//! AniDB publishes a daily dump of every anime title as a gzip-compressed,
//! pipe-delimited file (`aid|type|language|title`). The [`TitleCache`]
//! downloads it once, keeps the decompressed copy on disk, and reloads it
//! when the file (or the in-memory copy) is older than the configured TTL.
//!
//! Lookups go through [`TitleIndex::search`], which tries three passes and
//! stops at the first one that produces a hit:
//!
//! 1. exact: a cached title equal to the normalized query
//! 2. prefix: a cached title that is a whole-word prefix of the query, or
//!    the other way around
//! 3. fuzzy: the best word-overlap score
//!    `|common| / max(|query words|, |title words|)`, accepted at 0.5 or above

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Utc};
use flate2::read::GzDecoder;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use reelname_common::{Error, Result};
use reelname_parser::normalize::{normalize_title, title_words};

use super::http::HttpClient;

/// Where AniDB publishes the title dump.
pub const TITLES_URL: &str = "http://anidb.net/api/anime-titles.dat.gz";

/// Name of the decompressed dump inside the cache directory.
pub const TITLES_FILE: &str = "anime-titles.dat";

/// Minimum word-overlap score for a fuzzy match.
pub const FUZZY_THRESHOLD: f64 = 0.5;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

// ---------------------------------------------------------------------------
// Index
// ---------------------------------------------------------------------------

/// All known titles of one anime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleCacheEntry {
    pub anidb_id: u32,
    /// Lower-cased, whitespace-collapsed titles.
    pub titles: BTreeSet<String>,
}

/// Which pass produced a match.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MatchKind {
    Exact,
    Prefix,
    Fuzzy(f64),
}

/// Result of a title search.
#[derive(Debug, Clone, PartialEq)]
pub struct TitleMatch {
    pub anidb_id: u32,
    /// The cached title that matched.
    pub title: String,
    pub kind: MatchKind,
}

/// In-memory `anidb_id -> titles` map.
///
/// Iteration is ordered by AniDB id, so ties inside a pass go to the lowest id.
#[derive(Debug, Default, Clone)]
pub struct TitleIndex {
    entries: BTreeMap<u32, TitleCacheEntry>,
}

impl TitleIndex {
    /// Parse the pipe-delimited dump. Comment lines and malformed lines are skipped.
    pub fn parse(text: &str) -> Self {
        let mut index = Self::default();
        for line in text.lines() {
            if line.starts_with('#') {
                continue;
            }
            let mut fields = line.splitn(4, '|');
            let (Some(aid), Some(_kind), Some(_lang), Some(title)) =
                (fields.next(), fields.next(), fields.next(), fields.next())
            else {
                continue;
            };
            if let Ok(aid) = aid.trim().parse::<u32>() {
                index.insert(aid, title);
            }
        }
        index
    }

    /// Add a title for `anidb_id`.
    pub fn insert(&mut self, anidb_id: u32, title: &str) {
        let title = title.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
        if title.is_empty() {
            return;
        }
        self.entries
            .entry(anidb_id)
            .or_insert_with(|| TitleCacheEntry {
                anidb_id,
                titles: BTreeSet::new(),
            })
            .titles
            .insert(title);
    }

    /// Number of distinct anime.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, anidb_id: u32) -> Option<&TitleCacheEntry> {
        self.entries.get(&anidb_id)
    }

    fn titles(&self) -> impl Iterator<Item = (u32, &str)> {
        self.entries
            .values()
            .flat_map(|e| e.titles.iter().map(move |t| (e.anidb_id, t.as_str())))
    }

    /// Find the anime best matching a free-form title.
    ///
    /// Trailing `S01E02`, `Season 2`, and `(2020)` annotations are removed
    /// before comparing.
    pub fn search(&self, query: &str) -> Option<TitleMatch> {
        let query = normalize_title(query);
        if query.is_empty() {
            return None;
        }

        if let Some((aid, title)) = self.titles().find(|(_, t)| *t == query) {
            return Some(TitleMatch {
                anidb_id: aid,
                title: title.to_string(),
                kind: MatchKind::Exact,
            });
        }

        if let Some((aid, title)) = self
            .titles()
            .find(|(_, t)| is_word_prefix(t, &query) || is_word_prefix(&query, t))
        {
            return Some(TitleMatch {
                anidb_id: aid,
                title: title.to_string(),
                kind: MatchKind::Prefix,
            });
        }

        let query_words: HashSet<&str> = title_words(&query).into_iter().collect();
        if query_words.is_empty() {
            return None;
        }

        let mut best: Option<(f64, u32, &str)> = None;
        for (aid, title) in self.titles() {
            let score = overlap_score(&query_words, title);
            if best.map_or(true, |(top, _, _)| score > top) {
                best = Some((score, aid, title));
            }
        }

        best.filter(|(score, _, _)| *score >= FUZZY_THRESHOLD)
            .map(|(score, aid, title)| TitleMatch {
                anidb_id: aid,
                title: title.to_string(),
                kind: MatchKind::Fuzzy(score),
            })
    }
}

/// `short` is a prefix of `long` ending on a word boundary.
fn is_word_prefix(short: &str, long: &str) -> bool {
    !short.is_empty()
        && short.len() < long.len()
        && long.starts_with(short)
        && long[short.len()..].starts_with(' ')
}

fn overlap_score(query_words: &HashSet<&str>, title: &str) -> f64 {
    let title_words: HashSet<&str> = title_words(title).into_iter().collect();
    if title_words.is_empty() {
        return 0.0;
    }
    let common = query_words.intersection(&title_words).count();
    common as f64 / query_words.len().max(title_words.len()) as f64
}

// ---------------------------------------------------------------------------
// Cache
// ---------------------------------------------------------------------------

struct LoadedTitles {
    index: Arc<TitleIndex>,
    loaded_at: DateTime<Utc>,
}

/// Lazily loaded, time-boxed title index shared by every AniDB provider.
///
/// The first caller loads the index while later callers wait on the same
/// lock, so the dump is downloaded at most once per expiry period.
pub struct TitleCache {
    http: HttpClient,
    source_url: String,
    path: PathBuf,
    ttl: Duration,
    state: Mutex<Option<LoadedTitles>>,
}

impl TitleCache {
    /// Create a cache storing the dump under `cache_dir`.
    pub fn new(http: HttpClient, cache_dir: &Path, ttl: Duration) -> Self {
        Self {
            http,
            source_url: TITLES_URL.to_string(),
            path: cache_dir.join(TITLES_FILE),
            ttl,
            state: Mutex::new(None),
        }
    }

    /// Download from a different URL (mirrors, tests).
    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = url.into();
        self
    }

    /// Location of the decompressed dump on disk.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The current index, loading or refreshing it first if needed.
    pub async fn index(&self) -> Result<Arc<TitleIndex>> {
        let mut state = self.state.lock().await;
        if let Some(loaded) = state.as_ref() {
            if !self.is_expired(loaded.loaded_at) {
                return Ok(Arc::clone(&loaded.index));
            }
            debug!("in-memory title index expired");
        }

        let (index, loaded_at) = self.load(false).await?;
        let index = Arc::new(index);
        *state = Some(LoadedTitles {
            index: Arc::clone(&index),
            loaded_at,
        });
        Ok(index)
    }

    /// Download a fresh dump regardless of age and swap it in.
    pub async fn refresh(&self) -> Result<Arc<TitleIndex>> {
        let mut state = self.state.lock().await;
        let (index, loaded_at) = self.load(true).await?;
        let index = Arc::new(index);
        *state = Some(LoadedTitles {
            index: Arc::clone(&index),
            loaded_at,
        });
        Ok(index)
    }

    /// Search the index, loading it on first use.
    pub async fn search(&self, title: &str) -> Result<Option<TitleMatch>> {
        let index = self.index().await?;
        let found = index.search(title);
        debug!(title, found = ?found, "title cache lookup");
        Ok(found)
    }

    fn is_expired(&self, loaded_at: DateTime<Utc>) -> bool {
        chrono::Duration::from_std(self.ttl)
            .map(|ttl| Utc::now() - loaded_at > ttl)
            .unwrap_or(false)
    }

    /// Modification time of the dump if it is still within the TTL.
    fn fresh_file_modified(&self) -> Option<SystemTime> {
        std::fs::metadata(&self.path)
            .and_then(|m| m.modified())
            .ok()
            .filter(|modified| {
                SystemTime::now()
                    .duration_since(*modified)
                    .is_ok_and(|age| age <= self.ttl)
            })
    }

    /// Load the index along with the time its data was fetched.
    ///
    /// A dump read from disk carries the file's modification time so the
    /// in-memory copy expires together with the file. A stale copy used
    /// after a failed download is stamped now, so the next attempt waits
    /// a full TTL instead of hitting AniDB on every lookup.
    async fn load(&self, force_download: bool) -> Result<(TitleIndex, DateTime<Utc>)> {
        if !force_download {
            if let Some(modified) = self.fresh_file_modified() {
                debug!(path = %self.path.display(), "loading cached title dump");
                let index = read_index(self.path.clone()).await?;
                return Ok((index, DateTime::<Utc>::from(modified)));
            }
        }

        match self.download().await {
            Ok(()) => Ok((read_index(self.path.clone()).await?, Utc::now())),
            Err(e) if self.path.exists() => {
                warn!(error = %e, "title dump download failed; using stale copy");
                Ok((read_index(self.path.clone()).await?, Utc::now()))
            }
            Err(e) => Err(e),
        }
    }

    async fn download(&self) -> Result<()> {
        info!(url = %self.source_url, "downloading AniDB title dump");
        let body = self
            .http
            .bytes(self.http.get(&self.source_url))
            .await?
            .ok_or_else(|| Error::upstream_empty("AniDB title dump not found"))?;

        let path = self.path.clone();
        tokio::task::spawn_blocking(move || persist_dump(&body, &path))
            .await
            .map_err(|e| Error::Io(std::io::Error::other(format!("title dump task failed: {e}"))))??;
        Ok(())
    }
}

/// Inflate a body that starts with the gzip magic bytes; pass others through.
///
/// AniDB compresses responses whether or not the client asked for it.
pub(crate) fn gunzip_if_needed(body: &[u8]) -> Result<Vec<u8>> {
    if !body.starts_with(&GZIP_MAGIC) {
        return Ok(body.to_vec());
    }
    let mut out = Vec::new();
    GzDecoder::new(body)
        .read_to_end(&mut out)
        .map_err(|e| Error::parse(format!("invalid gzip body: {e}")))?;
    Ok(out)
}

/// Decompress (if gzipped) and atomically write the dump to `path`.
fn persist_dump(body: &[u8], path: &Path) -> Result<()> {
    let text = gunzip_if_needed(body)?;

    let dir = path
        .parent()
        .ok_or_else(|| Error::invalid_input("title cache path has no parent"))?;
    std::fs::create_dir_all(dir)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    std::io::Write::write_all(&mut tmp, &text)?;
    tmp.persist(path).map_err(|e| Error::Io(e.error))?;
    Ok(())
}

async fn read_index(path: PathBuf) -> Result<TitleIndex> {
    let index = tokio::task::spawn_blocking(move || -> Result<TitleIndex> {
        let bytes = std::fs::read(&path)?;
        Ok(TitleIndex::parse(&String::from_utf8_lossy(&bytes)))
    })
    .await
    .map_err(|e| Error::Io(std::io::Error::other(format!("title index task failed: {e}"))))??;

    info!(anime = index.len(), "title index loaded");
    Ok(index)
}
