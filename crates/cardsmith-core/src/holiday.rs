//! Holiday identification and overlay parsing.
//!
//! Overlays are palette/mood modifiers layered on top of a base design style.
//! Source text lives in [`crate::holiday_data`]; the [`OverlayLibrary`] parses
//! a block on first access and caches the result. The parser is tolerant:
//! missing optional sections degrade to empty fields, never an error.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::holiday_data;
use crate::templates::TemplateId;

/// A recognized holiday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HolidayId {
    Christmas,
    Hanukkah,
    NewYear,
    Valentines,
    Easter,
    MothersDay,
    FathersDay,
    Thanksgiving,
    Halloween,
    /// An occasion the sender marked as a holiday we don't model.
    Other,
}

impl HolidayId {
    /// Returns all holiday ids.
    pub fn all() -> &'static [HolidayId] {
        &[
            HolidayId::Christmas,
            HolidayId::Hanukkah,
            HolidayId::NewYear,
            HolidayId::Valentines,
            HolidayId::Easter,
            HolidayId::MothersDay,
            HolidayId::FathersDay,
            HolidayId::Thanksgiving,
            HolidayId::Halloween,
            HolidayId::Other,
        ]
    }

    /// Returns the machine id for this holiday.
    pub fn as_str(&self) -> &'static str {
        match self {
            HolidayId::Christmas => "christmas",
            HolidayId::Hanukkah => "hanukkah",
            HolidayId::NewYear => "new_year",
            HolidayId::Valentines => "valentines",
            HolidayId::Easter => "easter",
            HolidayId::MothersDay => "mothers_day",
            HolidayId::FathersDay => "fathers_day",
            HolidayId::Thanksgiving => "thanksgiving",
            HolidayId::Halloween => "halloween",
            HolidayId::Other => "other",
        }
    }
}

/// Maps a special-day answer to a holiday id.
///
/// Accepts both display strings ("Valentine's Day") and machine ids
/// ("valentines_day"). Unknown strings map to `None`; `Other` is only
/// produced by explicit synonyms like "Other Holiday".
pub fn map_special_day(raw: &str) -> Option<HolidayId> {
    let normalized = raw
        .trim()
        .to_lowercase()
        .replace(['\'', '’'], "")
        .replace(['-', '_'], " ");
    let normalized = normalized.split_whitespace().collect::<Vec<_>>().join(" ");

    match normalized.as_str() {
        "christmas" | "christmas day" | "xmas" => Some(HolidayId::Christmas),
        "hanukkah" | "chanukah" => Some(HolidayId::Hanukkah),
        "new year" | "new years" | "new years day" | "new years eve" | "new year day" => {
            Some(HolidayId::NewYear)
        }
        "valentines" | "valentines day" | "valentine" | "valentine day" => {
            Some(HolidayId::Valentines)
        }
        "easter" | "easter sunday" => Some(HolidayId::Easter),
        "mothers day" | "mother day" | "mothering sunday" => Some(HolidayId::MothersDay),
        "fathers day" | "father day" => Some(HolidayId::FathersDay),
        "thanksgiving" | "thanksgiving day" => Some(HolidayId::Thanksgiving),
        "halloween" | "all hallows eve" => Some(HolidayId::Halloween),
        "other" | "other holiday" | "another holiday" => Some(HolidayId::Other),
        _ => None,
    }
}

/// A parsed holiday overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HolidayOverlay {
    /// Which holiday this overlay belongs to.
    pub id: HolidayId,
    /// Free-text emotional guidance for message generation.
    pub emotional_rule: String,
    /// Terms to exclude from generated content.
    pub avoid_list: Vec<String>,
    /// Palette/mood description appended to image prompts.
    pub visual_treatment: String,
    /// Preferred base templates for this holiday.
    pub best_base_styles: Vec<TemplateId>,
    /// Optional extra guidance for message text.
    pub text_override: Option<String>,
}

const STYLES_MARKER: &str = "---BEST BASE STYLES---";
const OVERRIDE_MARKER: &str = "---TEXT OVERRIDE---";

/// Parses one overlay source block.
///
/// Line 1: emotional rule. Line 2: comma-separated avoid list. Blank line,
/// then the visual-treatment paragraph up to the first section marker.
/// Both marker sections are optional. Malformed input degrades to empty
/// fields; this function does not fail.
pub fn parse_overlay(id: HolidayId, source: &str) -> HolidayOverlay {
    let mut lines = source.lines();

    let emotional_rule = lines.next().unwrap_or("").trim().to_string();
    let avoid_list = lines
        .next()
        .unwrap_or("")
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    let rest: Vec<&str> = lines.collect();

    let mut visual_lines = Vec::new();
    let mut style_lines = Vec::new();
    let mut override_lines = Vec::new();
    let mut section = Section::Visual;

    for line in rest {
        let trimmed = line.trim();
        if trimmed == STYLES_MARKER {
            section = Section::Styles;
            continue;
        }
        if trimmed == OVERRIDE_MARKER {
            section = Section::Override;
            continue;
        }
        match section {
            Section::Visual => visual_lines.push(trimmed),
            Section::Styles => style_lines.push(trimmed),
            Section::Override => override_lines.push(trimmed),
        }
    }

    let visual_treatment = visual_lines
        .iter()
        .filter(|l| !l.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ");

    let best_base_styles = style_lines
        .iter()
        .filter_map(|l| {
            let id = l.trim_start_matches(['-', '*']).trim();
            if id.is_empty() {
                None
            } else {
                TemplateId::parse(id)
            }
        })
        .collect();

    let override_text = override_lines
        .iter()
        .filter(|l| !l.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ");
    let text_override = if override_text.is_empty() {
        None
    } else {
        Some(override_text)
    };

    HolidayOverlay {
        id,
        emotional_rule,
        avoid_list,
        visual_treatment,
        best_base_styles,
        text_override,
    }
}

enum Section {
    Visual,
    Styles,
    Override,
}

/// Overlay lookup with a per-instance parse cache.
///
/// Owned by the caller (not a process-wide singleton) so tests can reset
/// state by constructing a fresh library.
#[derive(Debug, Default)]
pub struct OverlayLibrary {
    cache: HashMap<HolidayId, HolidayOverlay>,
}

impl OverlayLibrary {
    /// Creates an empty library; overlays parse lazily on first access.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the overlay for a holiday, parsing and caching on first use.
    pub fn get(&mut self, id: HolidayId) -> &HolidayOverlay {
        self.cache.entry(id).or_insert_with(|| {
            debug!(holiday = id.as_str(), "parsing holiday overlay");
            parse_overlay(id, source_for(id))
        })
    }

    /// Number of overlays parsed so far.
    pub fn parsed_count(&self) -> usize {
        self.cache.len()
    }
}

fn source_for(id: HolidayId) -> &'static str {
    match id {
        HolidayId::Christmas => holiday_data::CHRISTMAS,
        HolidayId::Hanukkah => holiday_data::HANUKKAH,
        HolidayId::NewYear => holiday_data::NEW_YEAR,
        HolidayId::Valentines => holiday_data::VALENTINES,
        HolidayId::Easter => holiday_data::EASTER,
        HolidayId::MothersDay => holiday_data::MOTHERS_DAY,
        HolidayId::FathersDay => holiday_data::FATHERS_DAY,
        HolidayId::Thanksgiving => holiday_data::THANKSGIVING,
        HolidayId::Halloween => holiday_data::HALLOWEEN,
        HolidayId::Other => holiday_data::OTHER,
    }
}
