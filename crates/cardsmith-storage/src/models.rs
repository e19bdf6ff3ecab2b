//! Storage data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One generation round's outcome, appended to the rolling metrics log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationMetrics {
    /// Whether every first-attempt candidate passed the QA threshold.
    pub first_gen_passed: bool,
    /// How many automatic regeneration rounds ran.
    pub regeneration_count: u32,
    /// Whether the user was asked for more detail.
    pub user_prompt_needed: bool,
}

/// A stored metrics entry with its row id and timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsEntry {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub metrics: GenerationMetrics,
}

/// Aggregate rates over the rolling metrics log.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricsSummary {
    /// Entries in the log.
    pub total: u32,
    /// Share of rounds where the first generation passed outright.
    pub first_gen_pass_rate: f64,
    /// Share of rounds that needed at least one regeneration.
    pub regeneration_rate: f64,
    /// Share of rounds that ended asking the user for detail.
    pub user_prompt_rate: f64,
}

impl MetricsSummary {
    /// An empty summary (no entries yet).
    pub fn empty() -> Self {
        Self {
            total: 0,
            first_gen_pass_rate: 0.0,
            regeneration_rate: 0.0,
            user_prompt_rate: 0.0,
        }
    }
}

/// A remembered recipient with an arbitrary card payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedRecipient {
    pub id: i64,
    /// Recipient display name.
    pub name: String,
    /// Relationship to the sender.
    pub relationship: String,
    /// Arbitrary card details (answers, chosen template, last message).
    pub payload: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Input for saving a recipient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRecipient {
    pub name: String,
    pub relationship: String,
    pub payload: serde_json::Value,
}
