//! Holiday/high-risk-occasion conflict resolution.
//!
//! When a holiday overlay coincides with a high-risk occasion, the overlay
//! must be restrained: the card still acknowledges the day, but celebratory
//! energy is stripped and a quiet template is forced. Detection is
//! order-independent; resolution is priority-ordered by an explicit constant,
//! consulted first-match.
//!
//! The degradation strategy differs deliberately by conflict type: grief,
//! apology, and professional conflicts keep only the palette sentences of the
//! visual treatment (preserve "what color", discard "what mood"), while
//! illness substitutes energy words in place so comforting elements survive.

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::answers::CardAnswers;
use crate::guardrails::{detect_high_risk_occasions, HighRiskOccasion};
use crate::holiday::{HolidayId, HolidayOverlay, OverlayLibrary};
use crate::templates::TemplateId;

/// The kind of conflict between a holiday and a detected occasion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictType {
    Grief,
    Apology,
    Illness,
    Professional,
}

/// Resolution priority, most restrictive first. Grief outranks even apology:
/// silence and restraint take precedence over apology's need for calm.
pub const CONFLICT_PRIORITY: [ConflictType; 4] = [
    ConflictType::Grief,
    ConflictType::Apology,
    ConflictType::Illness,
    ConflictType::Professional,
];

impl ConflictType {
    /// Maps a detected occasion to its conflict type (1:1).
    pub fn from_occasion(occasion: HighRiskOccasion) -> ConflictType {
        match occasion {
            HighRiskOccasion::Grief => ConflictType::Grief,
            HighRiskOccasion::Apology => ConflictType::Apology,
            HighRiskOccasion::Illness => ConflictType::Illness,
            HighRiskOccasion::Professional => ConflictType::Professional,
        }
    }

    /// Returns a human-readable name for this conflict type.
    pub fn name(&self) -> &'static str {
        match self {
            ConflictType::Grief => "grief",
            ConflictType::Apology => "apology",
            ConflictType::Illness => "illness",
            ConflictType::Professional => "professional",
        }
    }

    /// The template forced onto callers when this conflict is present.
    pub fn forced_template(&self) -> TemplateId {
        match self {
            ConflictType::Apology => TemplateId::LetterpressMinimal,
            ConflictType::Illness => TemplateId::NightSkyQuiet,
            ConflictType::Grief => TemplateId::BotanicalSilhouette,
            ConflictType::Professional => TemplateId::LetterpressMinimal,
        }
    }

    /// Negative-prompt words specific to this conflict type.
    pub fn negative_terms(&self) -> &'static [&'static str] {
        match self {
            ConflictType::Apology => {
                &["bright", "energetic", "joyful", "excited", "playful", "cheerful"]
            }
            ConflictType::Grief => &[
                "happy",
                "cheerful",
                "bright",
                "festive",
                "celebratory",
                "joyous",
                "upbeat",
            ],
            ConflictType::Illness => {
                &["loud", "frantic", "overwhelming", "energetic", "busy", "harsh"]
            }
            ConflictType::Professional => {
                &["whimsical", "cutesy", "intimate", "romantic", "glittery"]
            }
        }
    }
}

/// Negative terms applied to every conflict regardless of type.
const CELEBRATION_NEGATIVES: [&str; 5] =
    ["confetti", "balloons", "streamers", "fireworks", "party"];

/// Used when a visual treatment has no palette sentences to keep.
const NEUTRAL_TREATMENT: &str = "Soft, muted tones with plenty of quiet space.";

/// The outcome of reconciling a holiday with the detected occasions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictResolution {
    /// True when a high-risk occasion forced overlay restraint.
    pub has_conflict: bool,
    /// The winning conflict type, when present.
    pub conflict_type: Option<ConflictType>,
    /// The overlay to apply: original when no conflict, restrained otherwise,
    /// `None` when no holiday applies at all.
    pub resolved_overlay: Option<HolidayOverlay>,
    /// Overrides the user/recommender template choice when a conflict exists.
    pub forced_template: Option<TemplateId>,
    /// Merged negative-prompt terms for image generation.
    pub additional_negatives: Vec<String>,
    /// Human-readable one-liner describing the resolution.
    pub explanation: String,
}

impl ConflictResolution {
    fn no_holiday() -> Self {
        Self {
            has_conflict: false,
            conflict_type: None,
            resolved_overlay: None,
            forced_template: None,
            additional_negatives: Vec::new(),
            explanation: "No holiday overlay applies.".to_string(),
        }
    }
}

/// Resolves a holiday overlay against the occasions detected in the answers.
///
/// - No holiday (or "other"): no conflict, no overlay.
/// - Holiday, no high-risk occasions: the overlay passes through unmodified,
///   with its own avoid-list surfaced as negatives.
/// - Holiday plus one or more occasions: the single highest-priority conflict
///   (per [`CONFLICT_PRIORITY`]) restrains the overlay and forces a template.
pub fn resolve_holiday_conflict(
    library: &mut OverlayLibrary,
    holiday: Option<HolidayId>,
    answers: &CardAnswers,
) -> ConflictResolution {
    let holiday = match holiday {
        None | Some(HolidayId::Other) => return ConflictResolution::no_holiday(),
        Some(id) => id,
    };

    let overlay = library.get(holiday).clone();
    let detected = detect_high_risk_occasions(answers);
    let conflicts: Vec<ConflictType> = detected
        .iter()
        .map(|o| ConflictType::from_occasion(*o))
        .collect();

    if conflicts.is_empty() {
        // Holiday still applies, just unmodified.
        let negatives = overlay.avoid_list.clone();
        return ConflictResolution {
            has_conflict: false,
            conflict_type: None,
            explanation: format!("{} overlay applied unmodified.", holiday.as_str()),
            resolved_overlay: Some(overlay),
            forced_template: None,
            additional_negatives: negatives,
        };
    }

    // First match in the priority order wins, regardless of detection order.
    let winner = CONFLICT_PRIORITY
        .iter()
        .copied()
        .find(|c| conflicts.contains(c))
        .unwrap_or(ConflictType::Professional);

    let forced = winner.forced_template();
    let mut restrained = overlay.clone();

    restrained.visual_treatment = match winner {
        ConflictType::Illness => neutralize_energy_words(&overlay.visual_treatment),
        ConflictType::Grief | ConflictType::Apology | ConflictType::Professional => {
            extract_palette_sentences(&overlay.visual_treatment)
        }
    };
    // Forces callers onto the forced template instead of holiday preferences.
    restrained.best_base_styles.clear();

    let mut negatives: Vec<String> = Vec::new();
    for term in winner.negative_terms() {
        push_unique(&mut negatives, term);
    }
    for term in CELEBRATION_NEGATIVES {
        push_unique(&mut negatives, term);
    }
    for term in &overlay.avoid_list {
        push_unique(&mut negatives, term);
    }

    let explanation = format!(
        "{} overlay restrained for {}: forcing {} and stripping celebratory energy.",
        holiday.as_str(),
        winner.name(),
        forced.as_str()
    );
    info!(
        holiday = holiday.as_str(),
        conflict = winner.name(),
        forced = forced.as_str(),
        "holiday conflict resolved"
    );

    ConflictResolution {
        has_conflict: true,
        conflict_type: Some(winner),
        resolved_overlay: Some(restrained),
        forced_template: Some(forced),
        additional_negatives: negatives,
        explanation,
    }
}

fn push_unique(list: &mut Vec<String>, term: &str) {
    let term = term.trim();
    if term.is_empty() {
        return;
    }
    if !list.iter().any(|t| t.eq_ignore_ascii_case(term)) {
        list.push(term.to_string());
    }
}

const PALETTE_KEYWORDS: [&str; 7] = [
    "palette", "color", "colour", "tone", "hue", "shade", "muted",
];

/// Keeps only the sentences of a visual treatment that talk about palette.
///
/// A designed degradation: "what color" survives, "what mood/energy" does
/// not, since energy is exactly what must be suppressed. Falls back to a
/// fixed neutral sentence when no palette sentences exist.
pub fn extract_palette_sentences(treatment: &str) -> String {
    let kept: Vec<String> = treatment
        .split('.')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter(|s| {
            let lower = s.to_lowercase();
            PALETTE_KEYWORDS.iter().any(|kw| lower.contains(kw))
        })
        .map(|s| format!("{s}."))
        .collect();

    if kept.is_empty() {
        NEUTRAL_TREATMENT.to_string()
    } else {
        kept.join(" ")
    }
}

/// Replaces celebration/excitement root words with "calm", in place.
///
/// Sentence structure is preserved: comforting elements stay, energy words
/// are neutralized rather than removed.
pub fn neutralize_energy_words(treatment: &str) -> String {
    let pattern = Regex::new(
        r"(?i)\b\w*(celebrat|festiv|joyful|excit|merry|jolly|cheer|upbeat|lively)\w*\b",
    )
    .expect("energy-word pattern is valid");
    pattern.replace_all(treatment, "calm").into_owned()
}
