//! Shared types used by the store client.

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Errors returned while interacting with the document store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Base URL failed to parse or normalize.
    #[error("Invalid store URL: {0}")]
    InvalidUrl(String),
    /// HTTP layer failed before receiving a response.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The store responded with an unexpected status code.
    #[error("Unexpected store response ({status}): {body}")]
    UnexpectedStatus {
        /// HTTP status returned from the store.
        status: StatusCode,
        /// Body payload associated with the failing response.
        body: String,
    },
}

/// Outcome of a single-document insert keyed by identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutOutcome {
    /// The document was stored under the requested identifier.
    Created,
    /// A document with the same identifier already exists.
    Conflict,
}

/// Per-document outcome reported by a bulk write.
#[derive(Debug, Clone, Deserialize)]
pub struct BulkDocResult {
    /// Identifier of the document this result describes.
    pub id: String,
    /// True when the store acknowledged the write.
    #[serde(default)]
    pub ok: bool,
    /// Error class reported by the store (for example `conflict`).
    #[serde(default)]
    pub error: Option<String>,
    /// Human-readable failure reason.
    #[serde(default)]
    pub reason: Option<String>,
}

impl BulkDocResult {
    /// True when this document was written.
    pub fn succeeded(&self) -> bool {
        self.ok && self.error.is_none()
    }
}

#[derive(Deserialize)]
pub(crate) struct DatabaseInfo {
    pub(crate) doc_count: u64,
}

#[derive(Deserialize)]
pub(crate) struct FindResponse {
    #[serde(default)]
    pub(crate) docs: Vec<serde_json::Value>,
}
