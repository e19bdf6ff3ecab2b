//! Cardsmith generation engine.
//!
//! The async half of Cardsmith: provider integration, rubric-based QA
//! scoring with a safety gate, and the bounded generate/score/regenerate
//! orchestration loop. All pure policy (vibes, guardrails, holiday conflict
//! resolution) lives in `cardsmith-core`; this crate applies it to live
//! generation traffic and records outcomes in `cardsmith-storage`.

pub mod error;
pub mod orchestrate;
pub mod provider;
pub mod rubric;
pub mod score;

pub use error::{EngineError, Result};
pub use orchestrate::{compose_image_prompt, Orchestrator, QaGenerationResult, ScoredCandidate};
pub use provider::{
    generate_image_with_retry, GenerationProvider, GenerationRequest, HttpProvider,
    ProviderConfig, CANDIDATES_PER_ROUND, IMAGE_ATTEMPTS,
};
pub use rubric::{QaDimension, QaDimensionScore, RUBRIC};
pub use score::{QaConfig, QaScoreResult, QaScorer};
