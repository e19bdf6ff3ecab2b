//! Message quality scoring.
//!
//! Safety is a gate, not a weighted input: guardrail and vibe hard bans are
//! checked first and short-circuit scoring entirely, so provider-scored
//! dimensions are never consulted for a message already known to be unsafe.
//! A provider outage degrades to a fixed default passing score; scoring
//! failures never block the user.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use cardsmith_core::{
    detect_high_risk_occasions, CardAnswers, GuardrailRuleSet, GuardrailValidationResult, VibeMap,
};

use crate::provider::GenerationProvider;
use crate::rubric::{QaDimension, QaDimensionScore, RUBRIC};

/// Thresholds and bounds for scoring and regeneration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaConfig {
    /// Total score (0-20) required to pass.
    pub minimum_threshold: u8,
    /// Totals below this trigger automatic regeneration.
    pub auto_regenerate_threshold: u8,
    /// Hard cap on automatic regeneration rounds.
    pub max_auto_regenerations: u32,
}

impl Default for QaConfig {
    fn default() -> Self {
        Self {
            minimum_threshold: 12,
            auto_regenerate_threshold: 10,
            max_auto_regenerations: 1,
        }
    }
}

/// Per-candidate scoring record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QaScoreResult {
    /// One entry per dimension, in rubric order.
    pub dimensions: Vec<QaDimensionScore>,
    /// Sum of the four dimension scores, 0-20.
    pub total_score: u8,
    /// total >= minimum threshold.
    pub passes_threshold: bool,
    /// total below the auto-regenerate bound, or a hard safety violation.
    pub should_auto_regenerate: bool,
    /// Set only in the failing-but-not-regenerating band.
    pub suggested_user_prompt: Option<String>,
    /// Guardrail detail when validation ran against detected occasions.
    pub guardrail: Option<GuardrailValidationResult>,
}

impl QaScoreResult {
    /// Returns the lowest-scoring dimension (rubric order breaks ties).
    pub fn lowest_dimension(&self) -> QaDimension {
        self.dimensions
            .iter()
            .min_by_key(|d| d.score)
            .map(|d| d.dimension)
            .unwrap_or(QaDimension::Specificity)
    }
}

/// Scores candidate messages against guardrails, vibe bans, and the rubric.
pub struct QaScorer {
    rules: GuardrailRuleSet,
    vibe_map: VibeMap,
    config: QaConfig,
}

impl QaScorer {
    /// Creates a scorer with the given thresholds.
    pub fn new(config: QaConfig) -> Self {
        Self {
            rules: GuardrailRuleSet::with_defaults(),
            vibe_map: VibeMap::with_defaults(),
            config,
        }
    }

    /// Creates a scorer with default thresholds.
    pub fn with_defaults() -> Self {
        Self::new(QaConfig::default())
    }

    /// Returns the scorer's configuration.
    pub fn config(&self) -> QaConfig {
        self.config
    }

    /// Scores one candidate message.
    ///
    /// Step 1 runs guardrail validation and vibe hard bans with no external
    /// calls; a hard hit short-circuits. Step 2 asks the provider for the
    /// four rubric dimensions. Step 3 totals and classifies. A missing or
    /// failing provider yields the fixed default passing score.
    pub async fn score_message(
        &self,
        provider: Option<&dyn GenerationProvider>,
        message: &str,
        answers: &CardAnswers,
    ) -> QaScoreResult {
        let occasions = detect_high_risk_occasions(answers);
        let validation = self.rules.validate_message(message, &occasions);

        if !validation.is_valid() {
            debug!("guardrail hard violation: short-circuiting score");
            return self.short_circuit(0, "Matches a banned phrase for this occasion.", validation);
        }

        let entry = self.vibe_map.lookup(&answers.vibes);
        if let Some(banned) = VibeMap::check_hard_bans(message, entry) {
            debug!(banned, "vibe hard ban: short-circuiting score");
            return self.short_circuit(
                1,
                "Contains phrasing the selected vibe forbids.",
                validation,
            );
        }

        let dimensions = match provider {
            Some(p) => match p.score_rubric(message, RUBRIC).await {
                Ok(raw) => normalize_dimensions(raw),
                Err(e) => {
                    warn!(error = %e, "rubric scoring failed; using default passing score");
                    default_passing_dimensions()
                }
            },
            None => {
                warn!("no scoring provider configured; using default passing score");
                default_passing_dimensions()
            }
        };

        self.finish(dimensions, validation)
    }

    fn short_circuit(
        &self,
        safety_score: u8,
        safety_feedback: &str,
        validation: GuardrailValidationResult,
    ) -> QaScoreResult {
        let dimensions: Vec<QaDimensionScore> = QaDimension::all()
            .iter()
            .map(|dim| {
                if *dim == QaDimension::Safety {
                    QaDimensionScore::new(*dim, safety_score, safety_feedback)
                } else {
                    QaDimensionScore::new(*dim, 3, "Not evaluated: message failed safety gate.")
                }
            })
            .collect();
        let total_score = dimensions.iter().map(|d| d.score).sum();

        QaScoreResult {
            dimensions,
            total_score,
            passes_threshold: false,
            should_auto_regenerate: true,
            suggested_user_prompt: None,
            guardrail: Some(validation),
        }
    }

    fn finish(
        &self,
        dimensions: Vec<QaDimensionScore>,
        validation: GuardrailValidationResult,
    ) -> QaScoreResult {
        let total_score: u8 = dimensions.iter().map(|d| d.score).sum();
        let passes_threshold = total_score >= self.config.minimum_threshold;
        let should_auto_regenerate = total_score < self.config.auto_regenerate_threshold;

        let mut result = QaScoreResult {
            dimensions,
            total_score,
            passes_threshold,
            should_auto_regenerate,
            suggested_user_prompt: None,
            guardrail: Some(validation),
        };

        // Failing but not low enough to blind-regenerate: ask the user,
        // targeted at whichever dimension scored lowest.
        if !passes_threshold && !should_auto_regenerate {
            result.suggested_user_prompt =
                Some(result.lowest_dimension().user_prompt().to_string());
        }
        result
    }
}

/// Re-pairs provider scores with the fixed dimension order, defaulting any
/// dimension the provider omitted to 3.
fn normalize_dimensions(raw: Vec<QaDimensionScore>) -> Vec<QaDimensionScore> {
    QaDimension::all()
        .iter()
        .map(|dim| {
            raw.iter()
                .find(|s| s.dimension == *dim)
                .cloned()
                .unwrap_or_else(|| {
                    QaDimensionScore::new(*dim, 3, "No score returned for this dimension.")
                })
        })
        .collect()
}

/// The fixed default passing score: 3 on every dimension, total 12.
///
/// A deliberate availability-over-precision tradeoff: a scorer outage makes
/// messages look mediocre-but-acceptable rather than blocking delivery.
fn default_passing_dimensions() -> Vec<QaDimensionScore> {
    QaDimension::all()
        .iter()
        .map(|dim| QaDimensionScore::new(*dim, 3, "Scoring unavailable; default applied."))
        .collect()
}
