//! The fixed QA rubric.
//!
//! Four dimensions, each scored 0-5 with every integer anchored to a concrete
//! description. The anchoring is what makes scores comparable across calls;
//! do not loosen it. The improvement instructions and user prompts are fixed
//! strings, one per dimension.

use serde::{Deserialize, Serialize};

/// One scored axis of message quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QaDimension {
    Specificity,
    ToneMatch,
    ClicheAvoidance,
    Safety,
}

impl QaDimension {
    /// Returns all dimensions in rubric order.
    pub fn all() -> &'static [QaDimension] {
        &[
            QaDimension::Specificity,
            QaDimension::ToneMatch,
            QaDimension::ClicheAvoidance,
            QaDimension::Safety,
        ]
    }

    /// Returns a human-readable name for this dimension.
    pub fn name(&self) -> &'static str {
        match self {
            QaDimension::Specificity => "Specificity",
            QaDimension::ToneMatch => "Tone Match",
            QaDimension::ClicheAvoidance => "Cliche Avoidance",
            QaDimension::Safety => "Safety",
        }
    }

    /// The regeneration instruction used when this dimension scores lowest.
    pub fn improvement_instruction(&self) -> &'static str {
        match self {
            QaDimension::Specificity => {
                "Use the sender's concrete details: names, shared moments, and \
                 particulars only these two people would know."
            }
            QaDimension::ToneMatch => {
                "Match the requested vibe exactly: honor the humor and warmth \
                 levels instead of drifting toward a generic greeting register."
            }
            QaDimension::ClicheAvoidance => {
                "Avoid stock card phrases entirely; say one true thing plainly \
                 rather than reaching for a familiar formula."
            }
            QaDimension::Safety => {
                "Remove any phrasing that minimizes, deflects, or pressures; \
                 for sensitive occasions, restraint beats reassurance."
            }
        }
    }

    /// The friendly prompt shown when the user should add detail.
    ///
    /// Users never see raw scores or rule names, only one of these four.
    pub fn user_prompt(&self) -> &'static str {
        match self {
            QaDimension::Specificity => {
                "Could you share one specific memory or detail about them? \
                 Even something small makes the message feel truly yours."
            }
            QaDimension::ToneMatch => {
                "Tell us a little more about how you want this to feel - \
                 lighter, warmer, more serious?"
            }
            QaDimension::ClicheAvoidance => {
                "What would you say to them in your own words? A sentence of \
                 yours helps us skip the greeting-card phrases."
            }
            QaDimension::Safety => {
                "This is a delicate moment. What do you most want them to \
                 know right now?"
            }
        }
    }
}

/// A single dimension's score with one-sentence feedback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QaDimensionScore {
    pub dimension: QaDimension,
    /// 0-5, anchored by [`RUBRIC`].
    pub score: u8,
    /// One sentence of feedback for this dimension.
    pub feedback: String,
}

impl QaDimensionScore {
    /// Creates a score, clamping into the 0-5 range.
    pub fn new(dimension: QaDimension, score: u8, feedback: impl Into<String>) -> Self {
        Self {
            dimension,
            score: score.min(5),
            feedback: feedback.into(),
        }
    }
}

/// The anchored scoring rubric sent to the provider, verbatim.
pub const RUBRIC: &str = "\
Score the greeting-card message on four dimensions, 0-5 each. Use the anchors \
exactly; half points are not allowed.

SPECIFICITY
 0 = could be sent to anyone, no detail at all
 1 = a single generic placeholder (a name slot, 'your gift')
 2 = mentions the occasion but nothing personal
 3 = one concrete personal detail, loosely used
 4 = personal details woven naturally through the message
 5 = unmistakably about this one recipient; details carry the message

TONE MATCH
 0 = contradicts the requested vibe outright
 1 = wrong register most of the way through
 2 = right register in places, noticeable drift
 3 = broadly on-vibe with flat patches
 4 = consistently on-vibe
 5 = on-vibe and calibrated: humor and warmth land at the requested levels

CLICHE AVOIDANCE
 0 = strung-together stock phrases
 1 = leans on cliches with small original gaps
 2 = half formula, half fresh
 3 = mostly fresh, one familiar crutch
 4 = fresh phrasing throughout
 5 = fresh and memorable; at least one line nobody else would write

SAFETY
 0 = contains phrasing banned for this occasion
 1 = skirts a banned pattern or pressures the recipient
 2 = tone-deaf for the occasion though not banned
 3 = safe but emotionally careless in places
 4 = safe and considerate
 5 = safe, considerate, and actively attuned to the occasion's risks

Reply with a JSON array of four objects: \
{\"dimension\": \"specificity|tone_match|cliche_avoidance|safety\", \
\"score\": 0-5, \"feedback\": \"one sentence\"}.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_dimensions_in_order() {
        let all = QaDimension::all();
        assert_eq!(all.len(), 4);
        assert_eq!(all[0], QaDimension::Specificity);
        assert_eq!(all[3], QaDimension::Safety);
    }

    #[test]
    fn every_dimension_has_fixed_strings() {
        for dim in QaDimension::all() {
            assert!(!dim.improvement_instruction().is_empty());
            assert!(!dim.user_prompt().is_empty());
            assert!(!dim.name().is_empty());
        }
    }

    #[test]
    fn user_prompts_never_mention_scores_or_rules() {
        for dim in QaDimension::all() {
            let prompt = dim.user_prompt().to_lowercase();
            assert!(!prompt.contains("score"));
            assert!(!prompt.contains("rule"));
            assert!(!prompt.contains("ban"));
        }
    }

    #[test]
    fn score_clamps_to_five() {
        let s = QaDimensionScore::new(QaDimension::Safety, 9, "fine");
        assert_eq!(s.score, 5);
    }

    #[test]
    fn rubric_anchors_every_integer() {
        for anchor in ["0 =", "1 =", "2 =", "3 =", "4 =", "5 ="] {
            assert_eq!(RUBRIC.matches(anchor).count(), 4, "anchor '{anchor}'");
        }
    }

    #[test]
    fn dimension_serialization_matches_rubric_reply_format() {
        assert_eq!(
            serde_json::to_string(&QaDimension::ClicheAvoidance).unwrap(),
            "\"cliche_avoidance\""
        );
        assert_eq!(
            serde_json::to_string(&QaDimension::ToneMatch).unwrap(),
            "\"tone_match\""
        );
    }
}
