//! Design-starter recommendation.
//!
//! Ordered hard overrides, then the vibe mapping. Each rule is an
//! unconditional override, not a weighted vote: when emotional risk is high,
//! reduce visual emotion, whatever the vibes say.

use tracing::debug;

use crate::answers::CardAnswers;
use crate::conflict::ConflictResolution;
use crate::guardrails::{detect_high_risk_occasions, HighRiskOccasion};
use crate::templates::{template_catalog, TemplateId};
use crate::vibes::VibeMap;

/// Recommends a design template for an answer set.
///
/// Precedence, first match wins:
/// 1. apology signal: serious ownership, `letterpress_minimal`
/// 2. illness/distress signal: patient comfort, `night_sky_quiet`
/// 3. professional relationship: respectful distance, `letterpress_minimal`
/// 4. vibe mapping, primary then secondary then fallback
/// 5. `floral_whisper`
///
/// Evaluated independently of the conflict resolver; when both apply, the
/// resolver's forced template wins at the call site (see [`choose_template`])
/// because it incorporates the higher-priority grief signal.
pub fn recommend_design_starter(vibe_map: &VibeMap, answers: &CardAnswers) -> TemplateId {
    let detected = detect_high_risk_occasions(answers);

    if detected.contains(&HighRiskOccasion::Apology) {
        debug!("apology signal: forcing letterpress_minimal");
        return TemplateId::LetterpressMinimal;
    }
    if detected.contains(&HighRiskOccasion::Illness) {
        debug!("illness signal: forcing night_sky_quiet");
        return TemplateId::NightSkyQuiet;
    }
    if detected.contains(&HighRiskOccasion::Professional) {
        debug!("professional relationship: forcing letterpress_minimal");
        return TemplateId::LetterpressMinimal;
    }

    let entry = vibe_map.lookup(&answers.vibes);
    VibeMap::allowed_styles(entry)
        .into_iter()
        .find(|id| template_catalog().iter().any(|t| t.id == *id))
        .unwrap_or(TemplateId::FloralWhisper)
}

/// Applies conflict-resolution precedence to a recommendation.
///
/// The resolver's forced template incorporates holiday context and the full
/// priority order (grief outranks apology-as-occasion), so it overrides the
/// recommender whenever a conflict is present.
pub fn choose_template(resolution: &ConflictResolution, recommended: TemplateId) -> TemplateId {
    resolution.forced_template.unwrap_or(recommended)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conflict::resolve_holiday_conflict;
    use crate::holiday::{HolidayId, OverlayLibrary};

    fn map() -> VibeMap {
        VibeMap::with_defaults()
    }

    #[test]
    fn apology_signal_forces_letterpress() {
        let answers = CardAnswers::new()
            .with_occasion("I really messed up")
            .with_vibes(vec!["Funny".to_string()]);
        assert_eq!(
            recommend_design_starter(&map(), &answers),
            TemplateId::LetterpressMinimal
        );
    }

    #[test]
    fn illness_signal_forces_night_sky() {
        let answers = CardAnswers::new().with_life_event("in the hospital");
        assert_eq!(
            recommend_design_starter(&map(), &answers),
            TemplateId::NightSkyQuiet
        );
    }

    #[test]
    fn professional_signal_forces_letterpress() {
        let answers = CardAnswers::new()
            .with_occasion("congratulations")
            .with_relationship("my manager");
        assert_eq!(
            recommend_design_starter(&map(), &answers),
            TemplateId::LetterpressMinimal
        );
    }

    #[test]
    fn apology_outranks_illness_in_recommendation() {
        let answers = CardAnswers::new()
            .with_occasion("sorry I forgot")
            .with_life_event("surgery recovery");
        assert_eq!(
            recommend_design_starter(&map(), &answers),
            TemplateId::LetterpressMinimal
        );
    }

    #[test]
    fn no_risk_falls_through_to_vibe_mapping() {
        let answers = CardAnswers::new()
            .with_occasion("birthday")
            .with_vibes(vec!["Funny".to_string()]);
        assert_eq!(
            recommend_design_starter(&map(), &answers),
            TemplateId::ConfettiPop
        );
    }

    #[test]
    fn unknown_vibes_still_recommend_something() {
        let answers = CardAnswers::new()
            .with_occasion("birthday")
            .with_vibes(vec!["sparkly nonsense".to_string()]);
        // Heartfelt default's primary.
        assert_eq!(
            recommend_design_starter(&map(), &answers),
            TemplateId::FloralWhisper
        );
    }

    #[test]
    fn forced_template_overrides_recommendation() {
        let answers = CardAnswers::new().with_occasion("her father passed away");
        let mut library = OverlayLibrary::new();
        let resolution =
            resolve_holiday_conflict(&mut library, Some(HolidayId::Christmas), &answers);
        let recommended = recommend_design_starter(&map(), &answers);
        let chosen = choose_template(&resolution, recommended);
        assert_eq!(chosen, TemplateId::BotanicalSilhouette);
    }

    #[test]
    fn no_conflict_keeps_recommendation() {
        let answers = CardAnswers::new()
            .with_occasion("birthday")
            .with_vibes(vec!["Playful".to_string()]);
        let mut library = OverlayLibrary::new();
        let resolution = resolve_holiday_conflict(&mut library, None, &answers);
        let recommended = recommend_design_starter(&map(), &answers);
        assert_eq!(choose_template(&resolution, recommended), recommended);
    }
}
