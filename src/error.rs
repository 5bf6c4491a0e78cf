//! Error type shared by the library.
//!
//! Only the feed request can fail.  Everything else in the pipeline degrades
//! to empty strings or a no-op render, so this enum stays small.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The HTTP request itself failed (DNS, TLS, connection reset, ...).
    #[error("feed request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered, but not with a success status.
    #[error("feed request to {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// The body was not a Blogger JSON envelope.
    #[error("invalid feed JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// `home_url` could not be turned into a feed URL.
    #[error("invalid feed root {url:?}: {source}")]
    Url {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// A string-encoded tag list (`data-tags='["a","b"]'`) did not decode.
    #[error("tag list {raw:?} is not a JSON array of strings: {source}")]
    Tags {
        raw: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
