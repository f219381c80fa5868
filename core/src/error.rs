//! Error types for the todo API client.
//!
//! # Design
//! `NotFound` gets a dedicated variant because the view needs to tell "the
//! row is gone" apart from every other failure. The server puts its error
//! text in an `{"error": ...}` body; `Http` carries that text when present
//! and the raw body otherwise.

use thiserror::Error;

/// Errors returned by `TodoClient` build and parse methods.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 404: the requested todo does not exist.
    #[error("todo not found")]
    NotFound,

    /// The server returned an unexpected status.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}
