use std::time::Duration;

use futures_util::StreamExt;
use loadmore_logging::loadmore_debug;
use url::Url;

use crate::{EngineEvent, FailureKind, FetchError, RawPage};

/// Response header carrying the cursor for the next page.
pub const DEFAULT_NEXT_URL_HEADER: &str = "next-url";

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_bytes: u64,
    pub next_url_header: String,
    /// Resolves relative `data-next` and cursor values.
    pub base_url: Option<Url>,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            max_bytes: 5 * 1024 * 1024,
            next_url_header: DEFAULT_NEXT_URL_HEADER.to_string(),
            base_url: None,
        }
    }
}

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelProgressSink {
    tx: std::sync::mpsc::Sender<EngineEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: std::sync::mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

/// Issues a single GET for a page. Non-2xx statuses are errors.
///
/// `referrer` is the absolute URL of the previous page in the chain, used to
/// resolve a relative `url` when no base URL is configured.
#[async_trait::async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(&self, url: &str, referrer: Option<&str>) -> Result<RawPage, FetchError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestPageFetcher {
    settings: FetchSettings,
    header: String,
    client: reqwest::Client,
}

impl ReqwestPageFetcher {
    pub fn new(settings: FetchSettings) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))?;
        let header = settings.next_url_header.to_ascii_lowercase();
        Ok(Self {
            settings,
            header,
            client,
        })
    }

    fn resolve(&self, raw: &str, referrer: Option<&str>) -> Result<Url, FetchError> {
        match Url::parse(raw) {
            Ok(url) => Ok(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                let base = match (&self.settings.base_url, referrer) {
                    (Some(base), _) => base.clone(),
                    (None, Some(referrer)) => Url::parse(referrer).map_err(|err| {
                        FetchError::new(FailureKind::InvalidUrl, err.to_string())
                    })?,
                    (None, None) => {
                        return Err(FetchError::new(
                            FailureKind::InvalidUrl,
                            format!("relative url {raw:?} without a base url"),
                        ))
                    }
                };
                base.join(raw)
                    .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))
            }
            Err(err) => Err(FetchError::new(FailureKind::InvalidUrl, err.to_string())),
        }
    }
}

#[async_trait::async_trait]
impl PageFetcher for ReqwestPageFetcher {
    async fn fetch_page(&self, url: &str, referrer: Option<&str>) -> Result<RawPage, FetchError> {
        let target = self.resolve(url, referrer)?;
        let resolved = target.to_string();
        loadmore_debug!("GET {}", target);

        let response = self
            .client
            .get(target)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        if let Some(content_len) = response.content_length() {
            if content_len > self.settings.max_bytes {
                return Err(FetchError::new(
                    FailureKind::TooLarge {
                        max_bytes: self.settings.max_bytes,
                        actual: Some(content_len),
                    },
                    "response too large",
                ));
            }
        }

        let next_url = response
            .headers()
            .get(self.header.as_str())
            .and_then(|value| value.to_str().ok())
            .and_then(cursor_from_header);

        let mut body = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = body.len() as u64 + chunk.len() as u64;
            if next_len > self.settings.max_bytes {
                return Err(FetchError::new(
                    FailureKind::TooLarge {
                        max_bytes: self.settings.max_bytes,
                        actual: Some(next_len),
                    },
                    "response too large",
                ));
            }
            body.extend_from_slice(&chunk);
        }

        Ok(RawPage {
            url: resolved,
            body,
            next_url,
        })
    }
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::new(FailureKind::Timeout, err.to_string());
    }
    FetchError::new(FailureKind::Network, err.to_string())
}

/// A blank header value means there is no next page; anything else is kept
/// verbatim.
fn cursor_from_header(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
