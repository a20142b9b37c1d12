#![deny(missing_docs)]

//! Core library for the Quizmill ingestion service.

/// HTTP routing and REST handlers for the parse service.
pub mod api;
/// Bounded response cache for the parse service.
pub mod cache;
/// Byte-range chunk planning for parallel ingestion.
pub mod chunk;
/// Environment-driven configuration management.
pub mod config;
/// Content-addressed get-or-create storage for shared sub-entities.
pub mod dedup;
/// SQL export of parsed questions.
pub mod export;
/// Structured logging and tracing setup.
pub mod logging;
/// Parse service metrics helpers.
pub mod metrics;
/// Core data types for questions and persisted documents.
pub mod model;
/// Markdown question extraction engine.
pub mod parse;
/// Parallel ingestion coordinator.
pub mod pipeline;
/// Document store integration.
pub mod store;
/// Buffered batch persistence.
pub mod writer;
