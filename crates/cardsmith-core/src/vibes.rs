//! Vibe mapping table and layered fallback lookup.
//!
//! Maps one or two user-selected mood tags to style preferences and message
//! constraints. The table is built once and never mutated; lookup is total
//! (exact combo, then first vibe alone, then the heartfelt default).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::templates::TemplateId;

/// A user-selectable mood tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Vibe {
    Funny,
    Heartfelt,
    Apologetic,
    Proud,
    Playful,
    Grateful,
    Romantic,
    Encouraging,
    Nostalgic,
}

impl Vibe {
    /// Returns all vibes.
    pub fn all() -> &'static [Vibe] {
        &[
            Vibe::Funny,
            Vibe::Heartfelt,
            Vibe::Apologetic,
            Vibe::Proud,
            Vibe::Playful,
            Vibe::Grateful,
            Vibe::Romantic,
            Vibe::Encouraging,
            Vibe::Nostalgic,
        ]
    }

    /// Returns the lowercase tag for this vibe.
    pub fn as_str(&self) -> &'static str {
        match self {
            Vibe::Funny => "funny",
            Vibe::Heartfelt => "heartfelt",
            Vibe::Apologetic => "apologetic",
            Vibe::Proud => "proud",
            Vibe::Playful => "playful",
            Vibe::Grateful => "grateful",
            Vibe::Romantic => "romantic",
            Vibe::Encouraging => "encouraging",
            Vibe::Nostalgic => "nostalgic",
        }
    }

    /// Parses a free-form tag (case-insensitive) into a vibe.
    pub fn parse(s: &str) -> Option<Vibe> {
        let normalized = s.trim().to_lowercase();
        Vibe::all().iter().copied().find(|v| v.as_str() == normalized)
    }
}

/// Tone and length constraints for message generation under a vibe combo.
///
/// Serialize-only: rows borrow from the static table and are never read back.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageConstraints {
    /// How much humor to allow, 0 (none) to 10 (constant).
    pub humor_level: u8,
    /// How warm the register should be, 0 (cool) to 10 (effusive).
    pub warmth_level: u8,
    /// Minimum message length in words.
    pub min_words: usize,
    /// Maximum message length in words.
    pub max_words: usize,
    /// Tone keywords to encourage in generation.
    pub encouraged_tones: Vec<&'static str>,
    /// Phrases to steer away from (flagged, not blocking).
    pub soft_bans: Vec<&'static str>,
    /// Phrases that invalidate a message outright (lowercase substrings).
    pub hard_bans: Vec<&'static str>,
}

/// Template preferences for a vibe combo, in order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StyleConstraints {
    pub primary: TemplateId,
    pub secondary: TemplateId,
    pub fallback: TemplateId,
}

/// One row of the vibe mapping table. Serialize-only, like
/// [`MessageConstraints`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VibeMappingEntry {
    /// Canonical lowercase `+`-joined key.
    pub key: &'static str,
    pub styles: StyleConstraints,
    pub message: MessageConstraints,
}

/// The vibe mapping table. Built once, read-only afterwards.
#[derive(Debug, Clone)]
pub struct VibeMap {
    entries: HashMap<&'static str, VibeMappingEntry>,
}

/// Normalizes raw vibe tags into the canonical combo key.
///
/// Empties are dropped, tags are trimmed and lowercased, sorted
/// alphabetically, and joined with `+`. Order of input is insignificant.
pub fn canonical_vibe_key(vibes: &[String]) -> String {
    let mut tags: Vec<String> = vibes
        .iter()
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
        .collect();
    tags.sort();
    tags.join("+")
}

impl VibeMap {
    /// Builds the default mapping table.
    pub fn with_defaults() -> Self {
        let mut entries = HashMap::new();
        for entry in default_entries() {
            entries.insert(entry.key, entry);
        }
        Self { entries }
    }

    /// Looks up the mapping entry for 0-2 vibe tags.
    ///
    /// Fallback chain: exact combo key, then the first tag alone, then the
    /// heartfelt default. Always returns an entry.
    pub fn lookup(&self, vibes: &[String]) -> &VibeMappingEntry {
        let combo = canonical_vibe_key(vibes);
        if let Some(entry) = self.entries.get(combo.as_str()) {
            return entry;
        }

        if let Some(first) = vibes.iter().find(|v| !v.trim().is_empty()) {
            let single = first.trim().to_lowercase();
            if let Some(entry) = self.entries.get(single.as_str()) {
                debug!(combo = %combo, fell_back_to = %single, "vibe combo miss");
                return entry;
            }
        }

        debug!(combo = %combo, "vibe lookup fell through to heartfelt default");
        self.entries
            .get("heartfelt")
            .expect("heartfelt entry is always present in the default table")
    }

    /// Returns the three allowed styles for an entry, in preference order.
    ///
    /// Callers try each in sequence and only move on when the current one is
    /// excluded elsewhere (e.g. by conflict resolution).
    pub fn allowed_styles(entry: &VibeMappingEntry) -> [TemplateId; 3] {
        [
            entry.styles.primary,
            entry.styles.secondary,
            entry.styles.fallback,
        ]
    }

    /// Checks a message against the entry's vibe-specific hard bans.
    ///
    /// Returns the first banned phrase found, if any. Case-insensitive
    /// substring match, deliberately conservative.
    pub fn check_hard_bans<'a>(
        message: &str,
        entry: &'a VibeMappingEntry,
    ) -> Option<&'a str> {
        let lower = message.to_lowercase();
        entry
            .message
            .hard_bans
            .iter()
            .copied()
            .find(|ban| lower.contains(ban))
    }

    /// Number of entries in the table.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for VibeMap {
    fn default() -> Self {
        Self::with_defaults()
    }
}

fn constraints(
    humor_level: u8,
    warmth_level: u8,
    min_words: usize,
    max_words: usize,
    encouraged_tones: Vec<&'static str>,
    soft_bans: Vec<&'static str>,
    hard_bans: Vec<&'static str>,
) -> MessageConstraints {
    MessageConstraints {
        humor_level,
        warmth_level,
        min_words,
        max_words,
        encouraged_tones,
        soft_bans,
        hard_bans,
    }
}

fn styles(primary: TemplateId, secondary: TemplateId, fallback: TemplateId) -> StyleConstraints {
    StyleConstraints {
        primary,
        secondary,
        fallback,
    }
}

fn default_entries() -> Vec<VibeMappingEntry> {
    use TemplateId::*;
    vec![
        // === Single vibes ===
        VibeMappingEntry {
            key: "funny",
            styles: styles(ConfettiPop, RetroPostcard, PaperCollage),
            message: constraints(
                9,
                4,
                20,
                60,
                vec!["witty", "light", "surprising"],
                vec!["knock knock", "walked into a bar"],
                vec!["just kidding but seriously"],
            ),
        },
        VibeMappingEntry {
            key: "heartfelt",
            styles: styles(FloralWhisper, WatercolorSunrise, CozyKnit),
            message: constraints(
                1,
                9,
                30,
                80,
                vec!["sincere", "warm", "specific"],
                vec!["words cannot express", "from the bottom of my heart"],
                vec![],
            ),
        },
        VibeMappingEntry {
            key: "apologetic",
            styles: styles(LetterpressMinimal, BotanicalSilhouette, NightSkyQuiet),
            message: constraints(
                0,
                6,
                30,
                90,
                vec!["accountable", "direct", "humble"],
                vec!["if i hurt you", "mistakes were made"],
                vec!["no big deal", "get over it", "you're overreacting"],
            ),
        },
        VibeMappingEntry {
            key: "proud",
            styles: styles(GoldenFoil, ArtDecoFrame, ConfettiPop),
            message: constraints(
                3,
                8,
                25,
                70,
                vec!["admiring", "specific", "uplifting"],
                vec!["knew you could do it all along"],
                vec!["about time", "finally"],
            ),
        },
        VibeMappingEntry {
            key: "playful",
            styles: styles(PaperCollage, ChildlikeCrayon, ConfettiPop),
            message: constraints(
                7,
                6,
                15,
                50,
                vec!["bouncy", "teasing", "affectionate"],
                vec![],
                vec![],
            ),
        },
        VibeMappingEntry {
            key: "grateful",
            styles: styles(WatercolorSunrise, FloralWhisper, LinocutGarden),
            message: constraints(
                2,
                9,
                25,
                70,
                vec!["thankful", "specific", "humble"],
                vec!["i owe you one"],
                vec![],
            ),
        },
        VibeMappingEntry {
            key: "romantic",
            styles: styles(GoldenFoil, FloralWhisper, NightSkyQuiet),
            message: constraints(
                2,
                10,
                25,
                80,
                vec!["intimate", "tender", "devoted"],
                vec!["roses are red"],
                vec![],
            ),
        },
        VibeMappingEntry {
            key: "encouraging",
            styles: styles(WatercolorSunrise, LinocutGarden, CozyKnit),
            message: constraints(
                2,
                8,
                25,
                70,
                vec!["steady", "believing", "patient"],
                vec!["everything happens for a reason"],
                vec!["just think positive", "it could be worse"],
            ),
        },
        VibeMappingEntry {
            key: "nostalgic",
            styles: styles(RetroPostcard, CozyKnit, PaperCollage),
            message: constraints(
                3,
                8,
                30,
                80,
                vec!["remembering", "fond", "wistful"],
                vec!["the good old days"],
                vec![],
            ),
        },
        // === Pair combos (keys sorted alphabetically) ===
        VibeMappingEntry {
            key: "funny+heartfelt",
            styles: styles(PaperCollage, WatercolorSunrise, FloralWhisper),
            message: constraints(
                6,
                8,
                30,
                80,
                vec!["warm", "wry", "affectionate"],
                vec!["but seriously"],
                vec![],
            ),
        },
        VibeMappingEntry {
            key: "funny+playful",
            styles: styles(ConfettiPop, ChildlikeCrayon, RetroPostcard),
            message: constraints(
                10,
                5,
                15,
                50,
                vec!["absurd", "bouncy", "quick"],
                vec![],
                vec![],
            ),
        },
        VibeMappingEntry {
            key: "heartfelt+romantic",
            styles: styles(FloralWhisper, GoldenFoil, NightSkyQuiet),
            message: constraints(
                1,
                10,
                30,
                90,
                vec!["devoted", "tender", "specific"],
                vec!["roses are red"],
                vec![],
            ),
        },
        VibeMappingEntry {
            key: "grateful+heartfelt",
            styles: styles(WatercolorSunrise, FloralWhisper, CozyKnit),
            message: constraints(
                1,
                9,
                30,
                80,
                vec!["thankful", "moved", "specific"],
                vec!["words cannot express"],
                vec![],
            ),
        },
        VibeMappingEntry {
            key: "encouraging+proud",
            styles: styles(GoldenFoil, WatercolorSunrise, ArtDecoFrame),
            message: constraints(
                2,
                9,
                25,
                70,
                vec!["admiring", "believing", "forward-looking"],
                vec![],
                vec!["about time"],
            ),
        },
        VibeMappingEntry {
            key: "apologetic+heartfelt",
            styles: styles(LetterpressMinimal, FloralWhisper, BotanicalSilhouette),
            message: constraints(
                0,
                8,
                35,
                100,
                vec!["accountable", "tender", "direct"],
                vec!["if i hurt you"],
                vec!["no big deal", "you're overreacting"],
            ),
        },
        VibeMappingEntry {
            key: "funny+nostalgic",
            styles: styles(RetroPostcard, PaperCollage, ChildlikeCrayon),
            message: constraints(
                7,
                7,
                25,
                70,
                vec!["fond", "teasing", "remembering"],
                vec!["the good old days"],
                vec![],
            ),
        },
        VibeMappingEntry {
            key: "heartfelt+nostalgic",
            styles: styles(CozyKnit, RetroPostcard, WatercolorSunrise),
            message: constraints(
                2,
                9,
                30,
                85,
                vec!["wistful", "warm", "specific"],
                vec!["the good old days"],
                vec![],
            ),
        },
        VibeMappingEntry {
            key: "grateful+proud",
            styles: styles(GoldenFoil, WatercolorSunrise, FloralWhisper),
            message: constraints(
                2,
                9,
                25,
                70,
                vec!["admiring", "thankful", "specific"],
                vec![],
                vec![],
            ),
        },
        VibeMappingEntry {
            key: "playful+romantic",
            styles: styles(FloralWhisper, PaperCollage, GoldenFoil),
            message: constraints(
                6,
                9,
                20,
                60,
                vec!["flirty", "teasing", "tender"],
                vec!["roses are red"],
                vec![],
            ),
        },
        VibeMappingEntry {
            key: "encouraging+heartfelt",
            styles: styles(WatercolorSunrise, CozyKnit, LinocutGarden),
            message: constraints(
                1,
                9,
                30,
                80,
                vec!["steady", "warm", "believing"],
                vec!["everything happens for a reason"],
                vec!["just think positive", "it could be worse"],
            ),
        },
        VibeMappingEntry {
            key: "funny+proud",
            styles: styles(ConfettiPop, GoldenFoil, RetroPostcard),
            message: constraints(
                7,
                7,
                20,
                60,
                vec!["celebrating", "teasing", "admiring"],
                vec![],
                vec!["about time", "finally"],
            ),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map() -> VibeMap {
        VibeMap::with_defaults()
    }

    #[test]
    fn canonical_key_sorts_and_joins() {
        let key = canonical_vibe_key(&["Heartfelt".to_string(), "Funny".to_string()]);
        assert_eq!(key, "funny+heartfelt");
    }

    #[test]
    fn canonical_key_drops_empties() {
        let key = canonical_vibe_key(&["".to_string(), "  Funny ".to_string()]);
        assert_eq!(key, "funny");
    }

    #[test]
    fn lookup_exact_combo() {
        let entry = map().lookup(&["Funny".to_string(), "Heartfelt".to_string()]).clone();
        assert_eq!(entry.key, "funny+heartfelt");
    }

    #[test]
    fn lookup_order_insensitive() {
        let m = map();
        let a = m.lookup(&["Funny".to_string(), "Heartfelt".to_string()]).key;
        let b = m.lookup(&["Heartfelt".to_string(), "Funny".to_string()]).key;
        assert_eq!(a, b);
    }

    #[test]
    fn lookup_falls_back_to_first_vibe() {
        // "proud+romantic" is not a mapped combo; falls back to "proud".
        let m = map();
        let entry = m.lookup(&["Proud".to_string(), "Romantic".to_string()]);
        assert_eq!(entry.key, "proud");
    }

    #[test]
    fn lookup_falls_back_to_heartfelt_default() {
        let m = map();
        let entry = m.lookup(&["extremely sparkly".to_string()]);
        assert_eq!(entry.key, "heartfelt");
    }

    #[test]
    fn lookup_empty_input_is_heartfelt() {
        let m = map();
        assert_eq!(m.lookup(&[]).key, "heartfelt");
        assert_eq!(m.lookup(&["".to_string()]).key, "heartfelt");
    }

    #[test]
    fn lookup_is_total_over_arbitrary_strings() {
        let m = map();
        let junk = [
            vec![],
            vec!["".to_string()],
            vec!["💥".to_string()],
            vec!["FUNNY".to_string(), "???".to_string()],
            vec!["a".repeat(500)],
        ];
        for vibes in junk {
            let entry = m.lookup(&vibes);
            let allowed = VibeMap::allowed_styles(entry);
            assert_eq!(allowed.len(), 3);
        }
    }

    #[test]
    fn allowed_styles_preserves_preference_order() {
        let m = map();
        let entry = m.lookup(&["apologetic".to_string()]);
        let allowed = VibeMap::allowed_styles(entry);
        assert_eq!(allowed[0], TemplateId::LetterpressMinimal);
        assert_eq!(allowed[1], TemplateId::BotanicalSilhouette);
        assert_eq!(allowed[2], TemplateId::NightSkyQuiet);
    }

    #[test]
    fn hard_ban_check_matches_case_insensitively() {
        let m = map();
        let entry = m.lookup(&["apologetic".to_string()]);
        let hit = VibeMap::check_hard_bans("Honestly it was No Big Deal.", entry);
        assert_eq!(hit, Some("no big deal"));
    }

    #[test]
    fn hard_ban_check_passes_clean_message() {
        let m = map();
        let entry = m.lookup(&["apologetic".to_string()]);
        assert!(VibeMap::check_hard_bans("I own what I did and I am sorry.", entry).is_none());
    }

    #[test]
    fn table_rows_serialize_for_ui_payloads() {
        let m = map();
        let entry = m.lookup(&["funny".to_string()]);
        let json = serde_json::to_string(entry).unwrap();
        assert!(json.contains("\"key\":\"funny\""));
        assert!(json.contains("\"humor_level\""));
    }

    #[test]
    fn every_single_vibe_has_an_entry() {
        let m = map();
        for vibe in Vibe::all() {
            let entry = m.lookup(&[vibe.as_str().to_string()]);
            assert_eq!(entry.key, vibe.as_str());
        }
    }
}
