//! Error taxonomy for the resolution engine and content fetch layer.
//!
//! Probe failures are never represented here — they are plain booleans
//! consumed inside the orchestrator. Only conditions the orchestrator
//! cannot recover from locally become a [`BridgeError`], and each variant
//! carries enough structure for the HTTP layer to pick a status code
//! without inspecting message text.

use thiserror::Error;

/// Errors surfaced by topic resolution, title canonicalization, and
/// post-resolution content fetches.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The topic string contained no usable tokens after cleanup.
    #[error("topic contains no usable tokens")]
    EmptyTopic,

    /// An explicit wiki override was malformed: missing scheme or
    /// hostname, or a scheme other than http/https.
    #[error("invalid wiki url: {0}")]
    InvalidWikiUrl(String),

    /// A hostname (explicit or resolved) does not end with any
    /// allow-listed suffix.
    #[error("host not allowed: {0}")]
    HostNotAllowed(String),

    /// Every slug, host, and endpoint candidate was probed without a
    /// single success, and the hub fallback produced nothing usable.
    #[error("no candidate wiki could be confirmed for topic {0:?}")]
    TopicNotResolved(String),

    /// The wiki itself was confirmed, but the requested page does not
    /// exist there.
    #[error("wiki confirmed but page {0:?} does not exist there")]
    PageNotFound(String),

    /// A confirmed wiki base failed on the actual content fetch across
    /// all of its candidate endpoints.
    #[error("upstream wiki error: {0}")]
    Upstream(String),
}

impl BridgeError {
    /// Machine-readable error code, stable across message wording changes.
    pub fn code(&self) -> &'static str {
        match self {
            BridgeError::EmptyTopic | BridgeError::InvalidWikiUrl(_) => "bad_request",
            BridgeError::HostNotAllowed(_) => "not_allowed",
            BridgeError::TopicNotResolved(_) | BridgeError::PageNotFound(_) => "not_found",
            BridgeError::Upstream(_) => "upstream_error",
        }
    }

    /// The HTTP status this error maps to at the endpoint layer.
    pub fn http_status(&self) -> u16 {
        match self {
            BridgeError::EmptyTopic | BridgeError::InvalidWikiUrl(_) => 400,
            BridgeError::HostNotAllowed(_) => 403,
            BridgeError::TopicNotResolved(_) | BridgeError::PageNotFound(_) => 404,
            BridgeError::Upstream(_) => 502,
        }
    }
}
