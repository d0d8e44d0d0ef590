use std::fmt;

pub type InstanceId = usize;

/// One pre-rendered item, appended verbatim by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFragment {
    pub html: String,
}

/// A 2xx response before its body has been validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPage {
    /// Absolute URL the request was sent to.
    pub url: String,
    pub body: Vec<u8>,
    /// Cursor header value as sent by the server.
    pub next_url: Option<String>,
}

/// A validated page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResponse {
    /// Absolute URL the page was served from; relative cursors resolve
    /// against it when no base URL is configured.
    pub url: String,
    pub fragments: Vec<ItemFragment>,
    pub next_url: Option<String>,
    /// Requests issued for this chain, including the successful one.
    pub attempts: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Retrying {
        instance: InstanceId,
        attempt: u32,
        remaining: u32,
        error: FetchError,
    },
    PageCompleted {
        instance: InstanceId,
        result: Result<PageResponse, LoadError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    Network,
}

impl FailureKind {
    /// Whether re-issuing the identical request could succeed. An unusable
    /// URL or an oversized 2xx body fails the same way every time.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, FailureKind::InvalidUrl | FailureKind::TooLarge { .. })
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::Network => write!(f, "network error"),
        }
    }
}

/// The response body did not match `[{"html": string}, ...]`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContractViolation {
    #[error("body is not valid json: {0}")]
    InvalidJson(String),
    #[error("expected a json array, found {found}")]
    NotAnArray { found: &'static str },
    #[error("item {index} has no string `html` field")]
    MissingHtml { index: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    #[error("gave up after {attempts} attempt(s): {last}")]
    Transport { attempts: u32, last: FetchError },
    #[error("malformed page after {attempts} attempt(s): {violation}")]
    Contract {
        attempts: u32,
        violation: ContractViolation,
    },
}

impl LoadError {
    pub fn attempts(&self) -> u32 {
        match self {
            LoadError::Transport { attempts, .. } | LoadError::Contract { attempts, .. } => {
                *attempts
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to start async runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error("failed to build http client: {0}")]
    Client(#[from] FetchError),
}
