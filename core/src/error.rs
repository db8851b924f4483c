//! Error types for the PetFriends API client.
//!
//! # Design
//! HTTP status codes are never errors here: a 403 or 500 comes back as an
//! `ApiResponse` with the raw text body, and callers assert on it directly.
//! `ApiError` covers only what prevents a response from being produced or
//! read: transport failures, unreadable photo files, undecodable JSON, and
//! missing configuration.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection, DNS, TLS, malformed URL or header value.
    #[error("transport error: {0}")]
    Transport(#[from] ureq::Error),

    /// A photo file could not be opened or read.
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A body declared as JSON did not decode into the expected shape.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The token endpoint did not hand out a usable `key`.
    #[error("no auth key in response (HTTP {status}): {body}")]
    InvalidToken { status: u16, body: String },

    #[error("configuration error: {0}")]
    Config(String),
}
