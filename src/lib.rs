#![deny(missing_docs)]

//! Core library for recovering section structure from document layout and ranking it for a
//! persona and task.

/// Environment-driven configuration management.
pub mod config;
/// Embedding client abstraction and adapters.
pub mod embedding;
/// Text runs and the sources that load them.
pub mod layout;
/// Structured logging and tracing setup.
pub mod logging;
/// Run metrics helpers.
pub mod metrics;
/// JSON report formatting.
pub mod output;
/// Ranking pipeline orchestration.
pub mod processing;
/// Global top-K ranking.
pub mod ranking;
/// Query embedding, relevance scoring, and excerpt refinement.
pub mod relevance;
/// Layout-heuristic section and subsection segmentation.
pub mod segment;
