#![deny(missing_docs)]

//! Core library for the document intake service.

/// HTTP routing and REST handlers.
pub mod api;
/// Environment-driven configuration management.
pub mod config;
/// Document records and the stores that persist them.
pub mod documents;
/// Retrieval of stored file bytes by reference.
pub mod fetch;
/// Upload workflow around the processing pipeline.
pub mod intake;
/// Structured logging and tracing setup.
pub mod logging;
/// Intake metrics helpers.
pub mod metrics;
/// Classification, extraction, and reconciliation of uploads.
pub mod processing;
/// Object storage for uploaded bytes.
pub mod storage;
/// Generative model clients and the summarization adapter.
pub mod summarization;
