//! Core types and service wiring for the bin collection calendar.
//!
//! A weekly schedule is ingested from a tabular source into a durable
//! key-value store keyed by week, then queried for the next collection
//! relative to a given date.

/// Idempotent loading of source batches into the store.
pub mod ingest;
/// In-memory store used by tests and embedders.
pub mod memory;
/// Domain models shared by all adapters.
pub mod model;
/// Traits describing the store, and the shared error types.
pub mod ports;
/// Next-collection lookup with one-week rollover.
pub mod resolve;
/// High-level service facade used by clients.
pub mod service;
/// Source batches and the origins that deliver them.
pub mod source;

pub use ingest::sync;
pub use memory::*;
pub use model::*;
pub use ports::*;
pub use resolve::resolve;
pub use service::*;
pub use source::*;
