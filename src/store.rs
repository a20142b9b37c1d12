//! Document store integration.
//!
//! Quizmill persists questions and their deduplicated sub-entities into a
//! CouchDB-compatible document store over its REST API. The store contract
//! consumed here is small: idempotent database creation, index creation on a
//! named field, fetch/insert by identifier, a bulk insert that tolerates
//! per-document failures, and simple count/find queries for verification.

mod client;
mod types;

pub use client::CouchStore;
pub use types::{BulkDocResult, PutOutcome, StoreError};
