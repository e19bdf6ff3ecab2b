//! Generation orchestration.
//!
//! Drives the bounded generate/score/regenerate loop: one generation round,
//! fan-out scoring of all candidates, at most `max_auto_regenerations`
//! regeneration rounds informed by the weakest dimension, then a decision to
//! deliver or ask the user for more detail. Regeneration rounds are strictly
//! sequential because each round's prompt depends on the previous round's
//! scores; scoring within a round is concurrent and re-paired by index.

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use cardsmith_core::{CardAnswers, DesignTemplate, HolidayOverlay, VibeMap};
use cardsmith_storage::{CardStore, GenerationMetrics};

use crate::error::{EngineError, Result};
use crate::provider::{GenerationProvider, GenerationRequest, CANDIDATES_PER_ROUND};
use crate::rubric::QaDimension;
use crate::score::{QaConfig, QaScoreResult, QaScorer};

/// Generic stand-ins used when a round yields fewer than 4 usable candidates.
const FALLBACK_MESSAGES: [&str; 4] = [
    "Thinking of you today and sending all my warmth.",
    "You mean more to me than I manage to say. Today felt like the day to say it.",
    "Wishing you a day that feels as kind as you've been to everyone around you.",
    "No clever words here, just a full heart and this card to prove it.",
];

/// A candidate message paired with its score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub message: String,
    pub score: QaScoreResult,
}

/// The outcome of a full generation round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QaGenerationResult {
    /// The kept candidates, best first, at most 4.
    pub candidates: Vec<ScoredCandidate>,
    /// How many automatic regeneration rounds ran.
    pub regeneration_attempts: u32,
    /// True when more than half of the kept candidates still fail.
    pub user_prompt_needed: bool,
    /// The friendly prompt to show when the user should add detail.
    pub suggested_user_prompt: Option<String>,
    /// The metrics recorded for this round.
    pub metrics: GenerationMetrics,
}

/// Drives generation, scoring, and the bounded regeneration loop.
pub struct Orchestrator<P: GenerationProvider> {
    provider: P,
    scorer: QaScorer,
    vibe_map: VibeMap,
    store: Option<CardStore>,
}

impl<P: GenerationProvider> Orchestrator<P> {
    /// Creates an orchestrator without metrics persistence.
    pub fn new(provider: P, config: QaConfig) -> Self {
        Self {
            provider,
            scorer: QaScorer::new(config),
            vibe_map: VibeMap::with_defaults(),
            store: None,
        }
    }

    /// Attaches a store for the rolling metrics log.
    pub fn with_store(mut self, store: CardStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Generates candidates, scores them, and regenerates within the bound.
    ///
    /// Issues at most `1 + max_auto_regenerations` generation calls total.
    pub async fn generate_and_score(&self, answers: &CardAnswers) -> Result<QaGenerationResult> {
        let config = self.scorer.config();
        let entry = self.vibe_map.lookup(&answers.vibes);
        let tone_guidance = if entry.message.encouraged_tones.is_empty() {
            None
        } else {
            Some(format!(
                "Aim for: {}. Humor {}/10, warmth {}/10.",
                entry.message.encouraged_tones.join(", "),
                entry.message.humor_level,
                entry.message.warmth_level,
            ))
        };

        let mut request = GenerationRequest {
            answers: answers.clone(),
            attempt: 0,
            avoid_messages: Vec::new(),
            improvement_hint: None,
            tone_guidance,
            min_words: entry.message.min_words,
            max_words: entry.message.max_words,
        };

        let raw = self.provider.generate_messages(&request).await?;
        if raw.is_empty() {
            return Err(EngineError::NoCandidates);
        }
        let messages = postprocess(raw);
        let mut candidates = self.score_all(&messages, answers).await;
        let first_gen_passed = candidates.iter().all(|c| c.score.passes_threshold);

        let mut regeneration_attempts = 0u32;
        if first_gen_passed {
            info!("all first-generation candidates passed");
        }

        while !first_gen_passed
            && candidates.iter().any(|c| c.score.should_auto_regenerate)
            && regeneration_attempts < config.max_auto_regenerations
        {
            regeneration_attempts += 1;
            let weakest = weakest_dimension(&candidates);
            debug!(
                attempt = regeneration_attempts,
                weakest = weakest.name(),
                "regenerating candidates"
            );

            request.attempt = regeneration_attempts;
            request.improvement_hint = Some(weakest.improvement_instruction().to_string());
            request.avoid_messages = candidates.iter().map(|c| c.message.clone()).collect();

            let raw = match self.provider.generate_messages(&request).await {
                Ok(raw) => raw,
                Err(e) => {
                    // Keep what we have rather than losing the round.
                    warn!(error = %e, "regeneration call failed; keeping prior candidates");
                    break;
                }
            };
            let new_messages = postprocess(raw);
            let new_candidates = self.score_all(&new_messages, answers).await;

            candidates.extend(new_candidates);
            candidates.sort_by(|a, b| b.score.total_score.cmp(&a.score.total_score));
            candidates.truncate(CANDIDATES_PER_ROUND);
        }

        // Best first, even when the regeneration loop never ran; the surfaced
        // prompt must come from the top-scoring failing candidate.
        candidates.sort_by(|a, b| b.score.total_score.cmp(&a.score.total_score));

        let failing = candidates
            .iter()
            .filter(|c| !c.score.passes_threshold)
            .count();
        let user_prompt_needed = failing > CANDIDATES_PER_ROUND / 2;
        let suggested_user_prompt = if user_prompt_needed {
            candidates
                .iter()
                .find(|c| !c.score.passes_threshold)
                .map(|c| {
                    c.score
                        .suggested_user_prompt
                        .clone()
                        .unwrap_or_else(|| c.score.lowest_dimension().user_prompt().to_string())
                })
        } else {
            None
        };

        let metrics = GenerationMetrics {
            first_gen_passed,
            regeneration_count: regeneration_attempts,
            user_prompt_needed,
        };
        self.record_metrics(metrics);

        info!(
            first_gen_passed,
            regeneration_attempts, user_prompt_needed, "generation round complete"
        );
        Ok(QaGenerationResult {
            candidates,
            regeneration_attempts,
            user_prompt_needed,
            suggested_user_prompt,
            metrics,
        })
    }

    /// Scores candidates concurrently; results re-pair with their message by
    /// position, not arrival order.
    async fn score_all(&self, messages: &[String], answers: &CardAnswers) -> Vec<ScoredCandidate> {
        let scores = join_all(
            messages
                .iter()
                .map(|m| self.scorer.score_message(Some(&self.provider), m, answers)),
        )
        .await;

        messages
            .iter()
            .zip(scores)
            .map(|(message, score)| ScoredCandidate {
                message: message.clone(),
                score,
            })
            .collect()
    }

    fn record_metrics(&self, metrics: GenerationMetrics) {
        if let Some(store) = &self.store {
            // Metrics are best-effort; a storage hiccup never blocks a card.
            if let Err(e) = store.append_metrics(metrics) {
                warn!(error = %e, "failed to append generation metrics");
            }
        }
    }
}

/// Trims, drops empties, dedupes (case-insensitive), and pads to exactly 4.
fn postprocess(raw: Vec<String>) -> Vec<String> {
    let mut messages: Vec<String> = Vec::new();
    for msg in raw {
        let trimmed = msg.trim().to_string();
        if trimmed.is_empty() {
            continue;
        }
        if messages
            .iter()
            .any(|m| m.eq_ignore_ascii_case(&trimmed))
        {
            continue;
        }
        messages.push(trimmed);
    }
    messages.truncate(CANDIDATES_PER_ROUND);

    let mut fallbacks = FALLBACK_MESSAGES.iter();
    while messages.len() < CANDIDATES_PER_ROUND {
        match fallbacks.next() {
            Some(fallback) => {
                if !messages.iter().any(|m| m == fallback) {
                    messages.push(fallback.to_string());
                }
            }
            None => break,
        }
    }
    messages
}

/// The dimension with the lowest summed score across all candidates.
/// Ties break in rubric order.
fn weakest_dimension(candidates: &[ScoredCandidate]) -> QaDimension {
    QaDimension::all()
        .iter()
        .copied()
        .min_by_key(|dim| {
            candidates
                .iter()
                .flat_map(|c| &c.score.dimensions)
                .filter(|d| d.dimension == *dim)
                .map(|d| u32::from(d.score))
                .sum::<u32>()
        })
        .unwrap_or(QaDimension::Specificity)
}

/// Composes the full image prompt from template, overlay, and negatives.
pub fn compose_image_prompt(
    template: &DesignTemplate,
    overlay: Option<&HolidayOverlay>,
    negatives: &[String],
) -> String {
    let mut prompt = format!("Greeting card artwork: {}.", template.prompt_suffix);
    if let Some(overlay) = overlay {
        if !overlay.visual_treatment.is_empty() {
            prompt.push(' ');
            prompt.push_str(&overlay.visual_treatment);
        }
    }
    if !negatives.is_empty() {
        prompt.push_str(&format!(" Strictly avoid: {}.", negatives.join(", ")));
    }
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rubric::QaDimensionScore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    /// Scripted provider: one message batch per generation call, rubric
    /// scores chosen by message content ("good" scores high).
    struct ScriptedProvider {
        batches: Mutex<Vec<Vec<String>>>,
        generation_calls: AtomicU32,
        requests_seen: Mutex<Vec<GenerationRequest>>,
    }

    impl ScriptedProvider {
        fn new(batches: Vec<Vec<String>>) -> Self {
            Self {
                batches: Mutex::new(batches),
                generation_calls: AtomicU32::new(0),
                requests_seen: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> u32 {
            self.generation_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl GenerationProvider for ScriptedProvider {
        async fn generate_messages(&self, request: &GenerationRequest) -> crate::Result<Vec<String>> {
            self.generation_calls.fetch_add(1, Ordering::SeqCst);
            self.requests_seen.lock().unwrap().push(request.clone());
            let mut batches = self.batches.lock().unwrap();
            if batches.is_empty() {
                Ok(Vec::new())
            } else {
                Ok(batches.remove(0))
            }
        }

        async fn score_rubric(
            &self,
            message: &str,
            _rubric: &str,
        ) -> crate::Result<Vec<QaDimensionScore>> {
            let score = if message.contains("good") { 4 } else { 1 };
            Ok(QaDimension::all()
                .iter()
                .map(|dim| QaDimensionScore::new(*dim, score, "scripted"))
                .collect())
        }

        async fn generate_image(&self, _p: &str, _a: &str) -> crate::Result<String> {
            unimplemented!("not used in orchestration tests")
        }
    }

    fn batch(prefix: &str) -> Vec<String> {
        (1..=4).map(|i| format!("{prefix} message {i}")).collect()
    }

    fn answers() -> CardAnswers {
        CardAnswers::new().with_occasion("birthday")
    }

    #[tokio::test]
    async fn clean_pass_returns_immediately() {
        let provider = ScriptedProvider::new(vec![batch("good")]);
        let orchestrator =
            Orchestrator::new(provider, QaConfig::default()).with_store(CardStore::in_memory().unwrap());

        let result = orchestrator.generate_and_score(&answers()).await.unwrap();

        assert_eq!(result.regeneration_attempts, 0);
        assert!(!result.user_prompt_needed);
        assert!(result.metrics.first_gen_passed);
        assert_eq!(result.candidates.len(), 4);
        assert!(result.candidates.iter().all(|c| c.score.passes_threshold));
        assert_eq!(orchestrator.provider.calls(), 1);
    }

    #[tokio::test]
    async fn regeneration_is_bounded_at_two_calls() {
        // Every batch scores 4/20: always auto-regenerate, never passes.
        let provider = ScriptedProvider::new(vec![batch("bad"), batch("worse"), batch("never")]);
        let orchestrator = Orchestrator::new(provider, QaConfig::default());

        let result = orchestrator.generate_and_score(&answers()).await.unwrap();

        assert_eq!(orchestrator.provider.calls(), 2);
        assert_eq!(result.regeneration_attempts, 1);
        assert!(result.user_prompt_needed);
        assert!(!result.metrics.first_gen_passed);
    }

    #[tokio::test]
    async fn regeneration_recovers_with_better_candidates() {
        let provider = ScriptedProvider::new(vec![batch("bad"), batch("good")]);
        let orchestrator = Orchestrator::new(provider, QaConfig::default());

        let result = orchestrator.generate_and_score(&answers()).await.unwrap();

        assert_eq!(result.regeneration_attempts, 1);
        assert!(!result.user_prompt_needed);
        assert!(!result.metrics.first_gen_passed);
        assert!(result
            .candidates
            .iter()
            .all(|c| c.message.contains("good")));
    }

    #[tokio::test]
    async fn regeneration_request_carries_hint_and_avoid_list() {
        let provider = ScriptedProvider::new(vec![batch("bad"), batch("good")]);
        let orchestrator = Orchestrator::new(provider, QaConfig::default());
        orchestrator.generate_and_score(&answers()).await.unwrap();

        let requests = orchestrator.provider.requests_seen.lock().unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].attempt, 0);
        assert!(requests[0].improvement_hint.is_none());
        assert_eq!(requests[1].attempt, 1);
        assert!(requests[1].improvement_hint.is_some());
        assert_eq!(requests[1].avoid_messages.len(), 4);
        assert!(requests[1].avoid_messages[0].contains("bad"));
    }

    /// Scores every message into the failing-but-not-regenerating band;
    /// messages containing "sharper" score 11 (lowest: specificity), the
    /// rest 10 (lowest: tone match).
    struct BandScorer {
        batch: Mutex<Vec<Vec<String>>>,
    }

    #[async_trait]
    impl GenerationProvider for BandScorer {
        async fn generate_messages(&self, _r: &GenerationRequest) -> crate::Result<Vec<String>> {
            Ok(self.batch.lock().unwrap().remove(0))
        }

        async fn score_rubric(
            &self,
            message: &str,
            _rubric: &str,
        ) -> crate::Result<Vec<QaDimensionScore>> {
            let scores: [u8; 4] = if message.contains("sharper") {
                [1, 3, 3, 4]
            } else {
                [3, 1, 3, 3]
            };
            Ok(QaDimension::all()
                .iter()
                .zip(scores)
                .map(|(dim, s)| QaDimensionScore::new(*dim, s, "scripted"))
                .collect())
        }

        async fn generate_image(&self, _p: &str, _a: &str) -> crate::Result<String> {
            unimplemented!("not used in orchestration tests")
        }
    }

    #[tokio::test]
    async fn user_prompt_comes_from_top_scoring_failing_candidate() {
        // All four land in [10, 12): nobody auto-regenerates, everyone fails.
        // The 11-point candidate arrives third; its specificity prompt must
        // win over the arrival-order first candidate's tone-match prompt.
        let provider = BandScorer {
            batch: Mutex::new(vec![vec![
                "vague one".to_string(),
                "vague two".to_string(),
                "sharper draft".to_string(),
                "vague three".to_string(),
            ]]),
        };
        let orchestrator = Orchestrator::new(provider, QaConfig::default());

        let result = orchestrator.generate_and_score(&answers()).await.unwrap();

        assert_eq!(result.regeneration_attempts, 0);
        assert!(result.user_prompt_needed);
        assert!(result.candidates[0].message.contains("sharper"));
        assert_eq!(result.candidates[0].score.total_score, 11);
        assert_eq!(
            result.suggested_user_prompt.as_deref(),
            Some(QaDimension::Specificity.user_prompt())
        );
    }

    #[tokio::test]
    async fn short_batches_are_padded_with_fallbacks() {
        let provider =
            ScriptedProvider::new(vec![vec!["good one".to_string(), "good two".to_string()]]);
        let orchestrator = Orchestrator::new(provider, QaConfig::default());

        let result = orchestrator.generate_and_score(&answers()).await.unwrap();
        assert_eq!(result.candidates.len(), 4);
        assert!(result
            .candidates
            .iter()
            .any(|c| c.message == FALLBACK_MESSAGES[0]));
    }

    #[tokio::test]
    async fn empty_generation_is_terminal() {
        let provider = ScriptedProvider::new(vec![vec![]]);
        let orchestrator = Orchestrator::new(provider, QaConfig::default());

        let err = orchestrator.generate_and_score(&answers()).await.unwrap_err();
        assert!(matches!(err, EngineError::NoCandidates));
    }

    #[tokio::test]
    async fn metrics_are_appended_to_store() {
        let provider = ScriptedProvider::new(vec![batch("good")]);
        let store = CardStore::in_memory().unwrap();
        let orchestrator = Orchestrator::new(provider, QaConfig::default()).with_store(store);

        orchestrator.generate_and_score(&answers()).await.unwrap();

        let entries = orchestrator
            .store
            .as_ref()
            .unwrap()
            .recent_metrics(10)
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].metrics.first_gen_passed);
        assert_eq!(entries[0].metrics.regeneration_count, 0);
    }

    #[tokio::test]
    async fn empty_regeneration_batch_still_yields_four_candidates() {
        // Only one batch scripted: the regeneration call returns an empty
        // list, which post-processing pads from the fallback pool.
        let provider = ScriptedProvider::new(vec![batch("bad")]);
        let orchestrator = Orchestrator::new(provider, QaConfig::default());

        let result = orchestrator.generate_and_score(&answers()).await.unwrap();
        assert_eq!(result.candidates.len(), 4);
        assert!(result.user_prompt_needed);
    }

    #[test]
    fn postprocess_dedupes_case_insensitively() {
        let messages = postprocess(vec![
            "Hello there".to_string(),
            "hello THERE".to_string(),
            "  ".to_string(),
            "Another".to_string(),
        ]);
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0], "Hello there");
        assert_eq!(messages[1], "Another");
        // Padded from the fallback pool.
        assert_eq!(messages[2], FALLBACK_MESSAGES[0]);
    }

    #[test]
    fn weakest_dimension_breaks_ties_in_rubric_order() {
        let candidates = vec![ScoredCandidate {
            message: "m".to_string(),
            score: QaScoreResult {
                dimensions: QaDimension::all()
                    .iter()
                    .map(|d| QaDimensionScore::new(*d, 2, ""))
                    .collect(),
                total_score: 8,
                passes_threshold: false,
                should_auto_regenerate: true,
                suggested_user_prompt: None,
                guardrail: None,
            },
        }];
        assert_eq!(weakest_dimension(&candidates), QaDimension::Specificity);
    }

    #[test]
    fn compose_image_prompt_joins_parts() {
        let template = cardsmith_core::get_template(cardsmith_core::TemplateId::NightSkyQuiet);
        let negatives = vec!["confetti".to_string(), "bright".to_string()];
        let prompt = compose_image_prompt(template, None, &negatives);
        assert!(prompt.contains("indigo night sky"));
        assert!(prompt.contains("Strictly avoid: confetti, bright."));
    }
}
