//! Cardsmith Core - content-safety and style-resolution policy engine.
//!
//! The deterministic rules layer that decides what a generation provider is
//! allowed to produce for a greeting card and how its output is constrained:
//!
//! - Vibe mapping: mood tags to design styles and message constraints
//! - Holiday overlays: palette/mood modifiers, parsed once and cached
//! - Guardrails: per-occasion hard bans and soft warnings
//! - Conflict resolution: holiday overlays restrained for high-risk occasions
//! - Style recommendation: emotional-risk overrides ahead of vibe preferences
//!
//! Everything here is synchronous, pure, and side-effect-free. Scoring and
//! generation orchestration live in `cardsmith-engine`; persistence lives in
//! `cardsmith-storage`.

pub mod answers;
pub mod conflict;
pub mod guardrails;
pub mod holiday;
mod holiday_data;
pub mod recommend;
pub mod templates;
pub mod vibes;

pub use answers::CardAnswers;
pub use conflict::{
    resolve_holiday_conflict, ConflictResolution, ConflictType, CONFLICT_PRIORITY,
};
pub use guardrails::{
    detect_high_risk_occasions, GuardrailRuleSet, GuardrailValidationResult, GuardrailViolation,
    HighRiskOccasion, RuleSeverity,
};
pub use holiday::{map_special_day, HolidayId, HolidayOverlay, OverlayLibrary};
pub use recommend::{choose_template, recommend_design_starter};
pub use templates::{get_template, template_catalog, DesignTemplate, TemplateId};
pub use vibes::{
    canonical_vibe_key, MessageConstraints, StyleConstraints, Vibe, VibeMap, VibeMappingEntry,
};
