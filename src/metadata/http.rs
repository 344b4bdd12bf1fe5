//! Uniform HTTP access for providers.
//!
//! Every provider sends its requests through an [`HttpClient`], which applies
//! the provider's [`RateLimiter`], a bounded timeout, and HTTP 429 retries,
//! and folds every failure into the shared error taxonomy:
//!
//! - connection, timeout, and non-success status -> [`Error::Transport`]
//! - a 401 -> [`Error::Unauthorized`], so token-based providers can log in again
//! - a 404 -> `Ok(None)` (nothing there)
//! - a body that does not deserialize -> [`Error::Parse`]

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use reelname_common::{Error, ProviderKind, Result};

use super::rate_limit::RateLimiter;

/// Timeout used by providers that do not pick their own.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const MAX_RETRIES: u32 = 3;

/// Longest `Retry-After` wait honoured before retrying a 429.
const MAX_RETRY_AFTER_SECS: u64 = 30;

/// Rate-limited, timeout-bounded HTTP client bound to one provider.
#[derive(Debug, Clone)]
pub struct HttpClient {
    provider: ProviderKind,
    client: reqwest::Client,
    limiter: Arc<RateLimiter>,
}

impl HttpClient {
    /// Build a client for `provider` with its own timeout and limiter.
    pub fn new(provider: ProviderKind, timeout: Duration, limiter: Arc<RateLimiter>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(5)))
            .user_agent(concat!("reelname/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            provider,
            client,
            limiter,
        })
    }

    /// The limiter this client waits on.
    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    /// Start a GET request.
    pub fn get(&self, url: &str) -> RequestBuilder {
        self.client.get(url)
    }

    /// Start a POST request.
    pub fn post(&self, url: &str) -> RequestBuilder {
        self.client.post(url)
    }

    /// Send a request and deserialize a JSON body; `None` on 404.
    pub async fn json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<Option<T>> {
        let Some(body) = self.bytes(request).await? else {
            return Ok(None);
        };
        serde_json::from_slice(&body)
            .map(Some)
            .map_err(|e| Error::parse(format!("{} response: {e}", self.provider)))
    }

    /// Send a request and return the raw body; `None` on 404.
    pub async fn bytes(&self, request: RequestBuilder) -> Result<Option<Vec<u8>>> {
        let Some(response) = self.send(request).await? else {
            return Ok(None);
        };
        let body = response
            .bytes()
            .await
            .map_err(|e| classify(self.provider, e))?;
        Ok(Some(body.to_vec()))
    }

    /// Execute with rate limiting and 429-retry logic.
    async fn send(&self, request: RequestBuilder) -> Result<Option<reqwest::Response>> {
        let mut retries = 0u32;
        loop {
            let attempt = request
                .try_clone()
                .ok_or_else(|| Error::transport("request body cannot be replayed"))?;

            self.limiter.acquire().await;

            let resp = attempt
                .send()
                .await
                .map_err(|e| classify(self.provider, e))?;

            let status = resp.status();
            if status == StatusCode::TOO_MANY_REQUESTS && retries < MAX_RETRIES {
                retries += 1;
                let wait = retry_after_secs(resp.headers());
                warn!(
                    provider = %self.provider,
                    retry = retries,
                    wait_secs = wait,
                    "rate limited upstream, backing off"
                );
                tokio::time::sleep(Duration::from_secs(wait)).await;
                continue;
            }

            if status == StatusCode::NOT_FOUND {
                debug!(provider = %self.provider, url = %resp.url(), "not found");
                return Ok(None);
            }

            if status == StatusCode::UNAUTHORIZED {
                return Err(Error::unauthorized(format!(
                    "{} returned HTTP {}",
                    self.provider, status
                )));
            }

            if !status.is_success() {
                return Err(Error::transport(format!(
                    "{} returned HTTP {}",
                    self.provider, status
                )));
            }

            return Ok(Some(resp));
        }
    }
}

/// Seconds to wait after a 429: the `Retry-After` value, 1 when absent or
/// unreadable, and never more than [`MAX_RETRY_AFTER_SECS`].
fn retry_after_secs(headers: &HeaderMap) -> u64 {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(1)
        .min(MAX_RETRY_AFTER_SECS)
}

/// Map a reqwest failure onto the error taxonomy.
fn classify(provider: ProviderKind, err: reqwest::Error) -> Error {
    if err.is_decode() {
        Error::parse(format!("{provider}: {err}"))
    } else {
        Error::transport(format!("{provider}: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug, Deserialize)]
    struct Echo {
        value: u32,
    }

    fn client() -> HttpClient {
        HttpClient::new(
            ProviderKind::Tvmaze,
            Duration::from_secs(5),
            Arc::new(RateLimiter::new(Duration::from_millis(1))),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn json_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/echo"))
            .and(query_param("q", "two words"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"value": 7})))
            .mount(&server)
            .await;

        let http = client();
        let req = http
            .get(&format!("{}/echo", server.uri()))
            .query(&[("q", "two words")]);
        let echo: Option<Echo> = http.json(req).await.unwrap();
        assert_eq!(echo.unwrap().value, 7);
    }

    #[tokio::test]
    async fn not_found_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let http = client();
        let echo: Option<Echo> = http
            .json(http.get(&format!("{}/missing", server.uri())))
            .await
            .unwrap();
        assert!(echo.is_none());
    }

    #[tokio::test]
    async fn server_error_is_transport() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let http = client();
        let err = http
            .json::<Echo>(http.get(&server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
    }

    #[tokio::test]
    async fn malformed_body_is_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let http = client();
        let err = http
            .json::<Echo>(http.get(&server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[tokio::test]
    async fn retries_after_429() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "0"))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"value": 1})))
            .mount(&server)
            .await;

        let http = client();
        let echo: Option<Echo> = http.json(http.get(&server.uri())).await.unwrap();
        assert_eq!(echo.unwrap().value, 1);
    }

    #[tokio::test]
    async fn unauthorized_is_typed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let http = client();
        let err = http
            .json::<Echo>(http.get(&server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Unauthorized(_)));
        assert!(err.is_transport());
    }

    #[test]
    fn retry_after_is_capped() {
        let mut headers = HeaderMap::new();
        assert_eq!(retry_after_secs(&headers), 1);

        headers.insert(RETRY_AFTER, "5".parse().unwrap());
        assert_eq!(retry_after_secs(&headers), 5);

        headers.insert(RETRY_AFTER, "86400".parse().unwrap());
        assert_eq!(retry_after_secs(&headers), MAX_RETRY_AFTER_SECS);

        headers.insert(RETRY_AFTER, "Wed, 21 Oct 2026 07:28:00 GMT".parse().unwrap());
        assert_eq!(retry_after_secs(&headers), 1);
    }

    #[tokio::test]
    async fn connection_refused_is_transport() {
        let http = client();
        let err = http
            .json::<Echo>(http.get("http://127.0.0.1:9/"))
            .await
            .unwrap_err();
        assert!(err.is_transport());
    }
}
