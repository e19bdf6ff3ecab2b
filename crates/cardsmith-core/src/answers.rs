//! The wizard answer set.
//!
//! Everything the policy engine knows about a card comes from here. Fields are
//! free-form strings from the UI; the engine treats them defensively.

use serde::{Deserialize, Serialize};

/// Answers collected by the card wizard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CardAnswers {
    /// What the card is for ("birthday", "messed up", "passed away", ...).
    #[serde(default)]
    pub occasion: String,
    /// Who the card is for, relationally ("my boss", "mom", "old friend").
    #[serde(default)]
    pub relationship: String,
    /// The recipient's name, if given.
    #[serde(default)]
    pub recipient_name: String,
    /// Selected mood tags, 0-2 expected, free-form tolerated.
    #[serde(default)]
    pub vibes: Vec<String>,
    /// Holiday or special day, display string or machine id.
    #[serde(default)]
    pub special_day: String,
    /// Recent life event context ("new job", "surgery", "lost her cat").
    #[serde(default)]
    pub life_event: String,
    /// Personal details to weave into the message.
    #[serde(default)]
    pub personal_details: String,
}

impl CardAnswers {
    /// Creates an empty answer set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the occasion.
    pub fn with_occasion(mut self, occasion: impl Into<String>) -> Self {
        self.occasion = occasion.into();
        self
    }

    /// Sets the relationship.
    pub fn with_relationship(mut self, relationship: impl Into<String>) -> Self {
        self.relationship = relationship.into();
        self
    }

    /// Sets the recipient name.
    pub fn with_recipient(mut self, name: impl Into<String>) -> Self {
        self.recipient_name = name.into();
        self
    }

    /// Sets the vibe tags.
    pub fn with_vibes(mut self, vibes: Vec<String>) -> Self {
        self.vibes = vibes;
        self
    }

    /// Sets the special day.
    pub fn with_special_day(mut self, day: impl Into<String>) -> Self {
        self.special_day = day.into();
        self
    }

    /// Sets the life event.
    pub fn with_life_event(mut self, event: impl Into<String>) -> Self {
        self.life_event = event.into();
        self
    }

    /// Sets the personal details.
    pub fn with_personal_details(mut self, details: impl Into<String>) -> Self {
        self.personal_details = details.into();
        self
    }

    /// Concatenates the fields high-risk detection scans, lowercased.
    ///
    /// Covers occasion, life event, special day, vibes, and relationship.
    /// Personal details are deliberately excluded: they describe the
    /// recipient, not the emotional context of the card.
    pub fn risk_text(&self) -> String {
        let mut parts: Vec<&str> = vec![
            &self.occasion,
            &self.life_event,
            &self.special_day,
            &self.relationship,
        ];
        for vibe in &self.vibes {
            parts.push(vibe);
        }
        parts
            .iter()
            .filter(|p| !p.trim().is_empty())
            .map(|p| p.trim())
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn risk_text_joins_and_lowercases() {
        let answers = CardAnswers::new()
            .with_occasion("Messed Up")
            .with_relationship("My Boss")
            .with_vibes(vec!["Apologetic".to_string()]);
        let text = answers.risk_text();
        assert_eq!(text, "messed up my boss apologetic");
    }

    #[test]
    fn risk_text_skips_empty_fields() {
        let answers = CardAnswers::new().with_occasion("  birthday  ");
        assert_eq!(answers.risk_text(), "birthday");
    }

    #[test]
    fn risk_text_excludes_personal_details() {
        let answers = CardAnswers::new()
            .with_occasion("birthday")
            .with_personal_details("she lost a bet about surgery");
        assert!(!answers.risk_text().contains("surgery"));
    }

    #[test]
    fn answers_serialize_roundtrip() {
        let answers = CardAnswers::new()
            .with_occasion("wedding")
            .with_vibes(vec!["Funny".to_string(), "Heartfelt".to_string()]);
        let json = serde_json::to_string(&answers).unwrap();
        let back: CardAnswers = serde_json::from_str(&json).unwrap();
        assert_eq!(answers, back);
    }

    #[test]
    fn missing_fields_default_on_deserialize() {
        let answers: CardAnswers = serde_json::from_str(r#"{"occasion":"birthday"}"#).unwrap();
        assert_eq!(answers.occasion, "birthday");
        assert!(answers.vibes.is_empty());
    }
}
