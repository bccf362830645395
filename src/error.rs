//! Error types for the wikitopics library.
//!
//! Failures come in three weights:
//!
//! * [`WikiTopicsError`] (**fatal**): the run cannot produce any output
//!   (invalid configuration, no service credentials, every page failed).
//!   Returned as `Err(WikiTopicsError)` from the top-level `run*` functions.
//!
//! * [`FetchError`] / [`SectionError`] (**non-fatal**): one page or one
//!   section failed. They are logged and recorded in
//!   [`crate::output::RunStats`]; the rest of the run carries on.
//!
//! * [`WriteError`]: a snapshot could not be written. The writer logs it
//!   and returns control to the pipeline unchanged.
//!
//! [`ServiceError`] is the error type of the two upstream collaborators
//! (article source and topic extractor) and is wrapped by the others.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the wikitopics library.
#[derive(Debug, Error)]
pub enum WikiTopicsError {
    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// An upstream service is missing credentials or could not be built.
    #[error("Service '{service}' is not configured.\n{hint}")]
    ServiceNotConfigured { service: String, hint: String },

    /// The page list was empty after de-duplication.
    #[error("No pages to fetch")]
    NoPages,

    // ── Fetch errors ──────────────────────────────────────────────────────
    /// A page failed while running with `strict_fetch`.
    #[error("Failed to fetch page '{page}': {reason}")]
    FetchFailed { page: String, reason: String },

    /// Every page retrieval failed; there is nothing to segment.
    #[error("All {total} pages failed to fetch.\nFirst error: {first_error}")]
    AllPagesFailed { total: usize, first_error: String },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error returned by an upstream collaborator call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ServiceError {
    /// Connection, DNS or TLS failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// The request exceeded the configured timeout.
    #[error("request timed out after {secs}s")]
    Timeout { secs: u64 },

    /// The service answered with a non-success HTTP status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body did not have the expected shape.
    #[error("unexpected response: {0}")]
    Decode(String),
}

/// A non-fatal failure to retrieve one page.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
#[error("Page '{page}': {detail}")]
pub struct FetchError {
    pub page: String,
    pub detail: String,
}

/// A non-fatal failure to enrich one section.
///
/// The section is still written to the final output, without topics.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
#[error("{page} -> {title} (level {level}): {detail}")]
pub struct SectionError {
    pub page: String,
    pub title: String,
    pub level: u32,
    pub detail: String,
}

/// Failure writing a JSON snapshot.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("Failed to serialise snapshot for '{path}': {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
