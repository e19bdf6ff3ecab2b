//! Cardsmith Storage - SQLite persistence layer.
//!
//! This crate provides the local store the engine and UI share:
//!
//! - Configuration key-value storage
//! - Saved recipients ("remember this card")
//! - The rolling generation-metrics log, bounded at 100 entries
//!
//! # Example
//!
//! ```no_run
//! use cardsmith_storage::{CardStore, GenerationMetrics};
//!
//! let store = CardStore::in_memory().unwrap();
//! store.append_metrics(GenerationMetrics {
//!     first_gen_passed: true,
//!     regeneration_count: 0,
//!     user_prompt_needed: false,
//! }).unwrap();
//! ```

pub mod error;
pub mod models;
mod store;

pub use error::{Result, StorageError};
pub use models::{
    GenerationMetrics, MetricsEntry, MetricsSummary, NewRecipient, SavedRecipient,
};
pub use store::{CardStore, METRICS_LOG_CAPACITY};
