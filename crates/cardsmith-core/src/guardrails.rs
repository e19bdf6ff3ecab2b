//! High-risk occasion detection and guardrail validation.
//!
//! The same phrase can be harmless in a celebration card and harmful in a
//! grief card, so rules are scoped by occasion: detection runs first, then
//! only the rule sets for the detected occasions apply. Rules are declarative
//! data (pattern + metadata) so the table can be tested by iteration.
//!
//! Matching is case-insensitive and deliberately conservative; for high-risk
//! occasions the product blocks rather than permits.

use regex::{Regex, RegexSet};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::answers::CardAnswers;

/// Occasions where generated content carries elevated harm potential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HighRiskOccasion {
    Grief,
    Illness,
    Apology,
    Professional,
}

impl HighRiskOccasion {
    /// Returns all occasions in stable detection order.
    pub fn all() -> &'static [HighRiskOccasion] {
        &[
            HighRiskOccasion::Grief,
            HighRiskOccasion::Illness,
            HighRiskOccasion::Apology,
            HighRiskOccasion::Professional,
        ]
    }

    /// Returns a human-readable name for this occasion.
    pub fn name(&self) -> &'static str {
        match self {
            HighRiskOccasion::Grief => "Grief",
            HighRiskOccasion::Illness => "Illness",
            HighRiskOccasion::Apology => "Apology",
            HighRiskOccasion::Professional => "Professional",
        }
    }

    fn detection_keywords(&self) -> &'static [&'static str] {
        match self {
            HighRiskOccasion::Grief => &[
                "passed away",
                "passed on",
                "passing of",
                "loss of",
                "lost his",
                "lost her",
                "lost their",
                "died",
                "death",
                "funeral",
                "memorial",
                "condolence",
                "sympathy",
                "grief",
                "grieving",
                "bereavement",
                "late husband",
                "late wife",
            ],
            HighRiskOccasion::Illness => &[
                "sick",
                "illness",
                "surgery",
                "hospital",
                "diagnos",
                "recovery",
                "recovering",
                "get well",
                "cancer",
                "chemo",
                "injury",
                "injured",
                "unwell",
                "health scare",
                "treatment",
            ],
            HighRiskOccasion::Apology => &[
                "sorry",
                "apolog",
                "messed up",
                "screwed up",
                "mistake",
                "forgive",
                "my fault",
                "i was wrong",
                "make it right",
                "make amends",
            ],
            HighRiskOccasion::Professional => &[
                "boss",
                "coworker",
                "co-worker",
                "colleague",
                "client",
                "manager",
                "supervisor",
                "mentor",
                "employee",
                "business",
                "professional",
                "work",
            ],
        }
    }
}

/// Detects which high-risk occasions apply to an answer set.
///
/// Pure keyword matching over the answers' risk text. Zero or more occasions
/// may apply; results follow the stable order of [`HighRiskOccasion::all`].
pub fn detect_high_risk_occasions(answers: &CardAnswers) -> Vec<HighRiskOccasion> {
    let text = answers.risk_text();
    let mut detected = Vec::new();
    for occasion in HighRiskOccasion::all() {
        if occasion
            .detection_keywords()
            .iter()
            .any(|kw| text.contains(kw))
        {
            detected.push(*occasion);
        }
    }
    if !detected.is_empty() {
        debug!(?detected, "high-risk occasions detected");
    }
    detected
}

/// Whether a matched rule invalidates the message or only flags it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleSeverity {
    /// A match invalidates the message outright.
    HardBan,
    /// A match is flagged but does not block.
    SoftWarning,
}

/// A single guardrail rule: one occasion, one severity, one or more patterns.
#[derive(Debug)]
pub struct GuardrailRule {
    /// Stable rule identifier.
    pub id: &'static str,
    /// The occasion this rule belongs to.
    pub occasion: HighRiskOccasion,
    /// Hard ban or soft warning.
    pub severity: RuleSeverity,
    /// Fast multi-pattern pre-check.
    regex_set: RegexSet,
    /// Individual patterns for extracting the matched text.
    regexes: Vec<Regex>,
    /// Why this phrasing is harmful in this context.
    pub explanation: &'static str,
    /// Suggested alternative phrasings, possibly empty.
    pub alternatives: &'static [&'static str],
}

impl GuardrailRule {
    fn new(
        id: &'static str,
        occasion: HighRiskOccasion,
        severity: RuleSeverity,
        patterns: &[&str],
        explanation: &'static str,
        alternatives: &'static [&'static str],
    ) -> Self {
        // Case-insensitive matching across the whole table.
        let prefixed: Vec<String> = patterns.iter().map(|p| format!("(?i){p}")).collect();
        let regex_set = RegexSet::new(&prefixed).expect("invalid guardrail pattern");
        let regexes = prefixed
            .iter()
            .map(|p| Regex::new(p).expect("invalid guardrail pattern"))
            .collect();
        Self {
            id,
            occasion,
            severity,
            regex_set,
            regexes,
            explanation,
            alternatives,
        }
    }

    /// Returns the first matching text in the message, if any pattern hits.
    ///
    /// Only the first match per rule is recorded; further matches of the same
    /// rule add no information.
    pub fn first_match(&self, message: &str) -> Option<String> {
        if !self.regex_set.is_match(message) {
            return None;
        }
        self.regexes
            .iter()
            .find_map(|r| r.find(message))
            .map(|m| m.as_str().to_string())
    }
}

/// A recorded rule violation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuardrailViolation {
    /// Which rule matched.
    pub rule_id: String,
    /// The occasion the rule belongs to.
    pub occasion: HighRiskOccasion,
    /// Hard ban or soft warning.
    pub severity: RuleSeverity,
    /// The text that matched.
    pub matched_text: String,
    /// Why this phrasing is harmful here.
    pub explanation: String,
    /// Suggested alternative phrasings.
    pub alternatives: Vec<String>,
}

/// Result of validating a message against the applicable guardrails.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GuardrailValidationResult {
    /// Violations that invalidate the message.
    pub hard_violations: Vec<GuardrailViolation>,
    /// Violations that flag without blocking.
    pub soft_violations: Vec<GuardrailViolation>,
}

impl GuardrailValidationResult {
    /// A message is valid iff it has no hard violations. Soft warnings may
    /// still be present on a valid message.
    pub fn is_valid(&self) -> bool {
        self.hard_violations.is_empty()
    }
}

/// The full guardrail rule table.
pub struct GuardrailRuleSet {
    rules: Vec<GuardrailRule>,
}

impl GuardrailRuleSet {
    /// Builds the default rule table for all four occasions.
    pub fn with_defaults() -> Self {
        Self {
            rules: default_rules(),
        }
    }

    /// Returns every rule, for table-driven tests and inspection.
    pub fn rules(&self) -> &[GuardrailRule] {
        &self.rules
    }

    /// Returns the rules scoped to one occasion.
    pub fn rules_for(&self, occasion: HighRiskOccasion) -> impl Iterator<Item = &GuardrailRule> {
        self.rules.iter().filter(move |r| r.occasion == occasion)
    }

    /// Validates a message against the rules for the given occasions.
    ///
    /// Each applicable rule records at most one violation (its first match).
    /// Hard and soft violations are kept separately so both can be inspected
    /// independently.
    pub fn validate_message(
        &self,
        message: &str,
        occasions: &[HighRiskOccasion],
    ) -> GuardrailValidationResult {
        let mut result = GuardrailValidationResult::default();

        for occasion in occasions {
            for rule in self.rules_for(*occasion) {
                if let Some(matched) = rule.first_match(message) {
                    let violation = GuardrailViolation {
                        rule_id: rule.id.to_string(),
                        occasion: rule.occasion,
                        severity: rule.severity,
                        matched_text: matched,
                        explanation: rule.explanation.to_string(),
                        alternatives: rule.alternatives.iter().map(|s| s.to_string()).collect(),
                    };
                    match rule.severity {
                        RuleSeverity::HardBan => result.hard_violations.push(violation),
                        RuleSeverity::SoftWarning => result.soft_violations.push(violation),
                    }
                }
            }
        }

        if !result.is_valid() {
            debug!(
                hard = result.hard_violations.len(),
                soft = result.soft_violations.len(),
                "message failed guardrail validation"
            );
        }
        result
    }
}

impl Default for GuardrailRuleSet {
    fn default() -> Self {
        Self::with_defaults()
    }
}

fn default_rules() -> Vec<GuardrailRule> {
    use HighRiskOccasion::*;
    use RuleSeverity::*;

    vec![
        // === Grief: hard bans ===
        GuardrailRule::new(
            "grief_silver_lining",
            Grief,
            HardBan,
            &["at least", "silver lining", "look on the bright side"],
            "Minimizes the loss by hunting for an upside the mourner didn't ask for",
            &[
                "I'm thinking of you",
                "There are no words; I'm here",
            ],
        ),
        GuardrailRule::new(
            "grief_better_place",
            Grief,
            HardBan,
            &["better place", "with the angels", "god needed"],
            "Imposes a spiritual frame the recipient may not share and reframes the death as good",
            &["They meant so much to so many people"],
        ),
        GuardrailRule::new(
            "grief_reason",
            Grief,
            HardBan,
            &["everything happens for a reason", "meant to be", "part of the plan"],
            "Tells the mourner their loss was justified",
            &["This is so unfair, and I'm so sorry"],
        ),
        GuardrailRule::new(
            "grief_stay_strong",
            Grief,
            HardBan,
            &["stay strong", "be strong", "keep your chin up"],
            "Demands performance from someone who is allowed to fall apart",
            &["However you're feeling is okay", "You don't have to be anything right now"],
        ),
        GuardrailRule::new(
            "grief_time_heals",
            Grief,
            HardBan,
            &["time heals"],
            "Promises a timetable for pain that nobody can promise",
            &["Whenever you want company, I'm here"],
        ),
        GuardrailRule::new(
            "grief_move_on",
            Grief,
            HardBan,
            &["move on", "get over", "closure soon"],
            "Pressures the mourner to be done grieving",
            &["Take all the time you need"],
        ),
        GuardrailRule::new(
            "grief_know_how_you_feel",
            Grief,
            HardBan,
            &["i know how you feel", "i know exactly what you"],
            "Centers the sender's experience over the mourner's",
            &["I can't imagine what you're carrying"],
        ),
        // === Grief: soft warnings ===
        GuardrailRule::new(
            "grief_generic_loss",
            Grief,
            SoftWarning,
            &["sorry for your loss"],
            "Formulaic; a specific memory of the person lands far better",
            &["I'll always remember the way they..."],
        ),
        GuardrailRule::new(
            "grief_they_would_want",
            Grief,
            SoftWarning,
            &["would have wanted", "would want you to"],
            "Speaks for the dead; safer to speak only for the sender",
            &[],
        ),
        // === Illness: hard bans ===
        GuardrailRule::new(
            "illness_battle_outcome",
            Illness,
            HardBan,
            &["lose the battle", "lost the battle", "fight harder", "don't give up the fight"],
            "Battle framing makes worsening illness sound like personal failure",
            &["I'm with you through all of this"],
        ),
        GuardrailRule::new(
            "illness_guaranteed_recovery",
            Illness,
            HardBan,
            &["you'll be fine", "everything will be fine", "back on your feet in no time"],
            "Promises an outcome nobody can promise",
            &["I'm hoping hard for good days ahead"],
        ),
        GuardrailRule::new(
            "illness_toxic_positivity",
            Illness,
            HardBan,
            &["just stay positive", "positive vibes only", "good vibes only"],
            "Makes honest fear or exhaustion feel forbidden",
            &["It's okay to have hard days; I'm around for those too"],
        ),
        GuardrailRule::new(
            "illness_cause_blame",
            Illness,
            HardBan,
            &["brought this on", "should have caught it sooner", "if you had taken care"],
            "Blames the patient for being ill",
            &[],
        ),
        // === Illness: soft warnings ===
        GuardrailRule::new(
            "illness_generic_get_well",
            Illness,
            SoftWarning,
            &["get well soon"],
            "Fine but generic, and lands poorly for chronic or terminal illness",
            &["Thinking of you today and every day"],
        ),
        GuardrailRule::new(
            "illness_warrior_language",
            Illness,
            SoftWarning,
            &["warrior", "so brave", "toughest person i know"],
            "Hero framing can feel like pressure to perform strength",
            &[],
        ),
        GuardrailRule::new(
            "illness_miracle",
            Illness,
            SoftWarning,
            &["miracle"],
            "Sets up hope the sender can't underwrite",
            &[],
        ),
        // === Apology: hard bans ===
        GuardrailRule::new(
            "apology_but_deflection",
            Apology,
            HardBan,
            &["sorry,? but"],
            "'Sorry, but' cancels the apology and pivots to self-defense",
            &["I'm sorry. I was wrong to..."],
        ),
        GuardrailRule::new(
            "apology_excuses",
            Apology,
            HardBan,
            &["i was tired", "i was stressed", "i was busy", "i had a lot going on"],
            "Explains the harm away instead of owning it",
            &["There's no excuse for what I did"],
        ),
        GuardrailRule::new(
            "apology_conditional",
            Apology,
            HardBan,
            &["if you were offended", "if you felt hurt", "if i hurt you"],
            "Makes the harm hypothetical and the recipient's fault for feeling it",
            &["I hurt you, and I'm sorry"],
        ),
        GuardrailRule::new(
            "apology_blame_shift",
            Apology,
            HardBan,
            &["you made me", "you started", "we both said things"],
            "Shifts responsibility onto the person owed the apology",
            &["What I did was my choice and my responsibility"],
        ),
        GuardrailRule::new(
            "apology_minimizing",
            Apology,
            HardBan,
            &["not a big deal", "overreact", "too sensitive", "blown out of proportion"],
            "Tells the recipient their hurt is wrong-sized",
            &["What I did mattered, and it hurt you"],
        ),
        // === Apology: soft warnings ===
        GuardrailRule::new(
            "apology_passive_voice",
            Apology,
            SoftWarning,
            &["mistakes were made", "things got out of hand"],
            "Passive voice hides the actor; own the verb",
            &["I made a mistake"],
        ),
        GuardrailRule::new(
            "apology_rush_to_resolution",
            Apology,
            SoftWarning,
            &["can we just move on", "put this behind us", "water under the bridge"],
            "Asks for forgiveness on the sender's schedule",
            &["Take whatever time you need with this"],
        ),
        GuardrailRule::new(
            "apology_self_flagellation",
            Apology,
            SoftWarning,
            &["i'm the worst", "i'm a terrible person", "you must hate me"],
            "Turns the apology into a request for reassurance",
            &[],
        ),
        // === Professional: hard bans ===
        GuardrailRule::new(
            "professional_intimacy",
            Professional,
            HardBan,
            &["love you", "xoxo", "kisses", "sweetheart", "honey", "darling"],
            "Intimate register is inappropriate for a workplace relationship",
            &["With appreciation", "Warm regards"],
        ),
        GuardrailRule::new(
            "professional_appearance",
            Professional,
            HardBan,
            &["beautiful", "gorgeous", "handsome", "cute"],
            "Comments on appearance don't belong in workplace cards",
            &["Your work on ... has been outstanding"],
        ),
        GuardrailRule::new(
            "professional_age_jokes",
            Professional,
            HardBan,
            &["over the hill", "so old", "ancient", "dinosaur"],
            "Age jokes read as hostile in a professional context",
            &["Here's to everything you've built"],
        ),
        GuardrailRule::new(
            "professional_party_pressure",
            Professional,
            HardBan,
            &["get wasted", "drinks on you", "party hard"],
            "Alcohol pressure is a liability in workplace messaging",
            &["Enjoy the celebration"],
        ),
        // === Professional: soft warnings ===
        GuardrailRule::new(
            "professional_overfamiliar",
            Professional,
            SoftWarning,
            &["buddy", "\\bpal\\b", "\\bdude\\b"],
            "Overly casual address may not match the working relationship",
            &[],
        ),
        GuardrailRule::new(
            "professional_compensation",
            Professional,
            SoftWarning,
            &["big raise", "pay bump", "salary"],
            "Compensation references can embarrass in a shared-card context",
            &[],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> GuardrailRuleSet {
        GuardrailRuleSet::with_defaults()
    }

    fn answers_with_occasion(occasion: &str) -> CardAnswers {
        CardAnswers::new().with_occasion(occasion)
    }

    // === Detection ===

    #[test]
    fn detects_grief_from_occasion() {
        let detected = detect_high_risk_occasions(&answers_with_occasion("her father passed away"));
        assert_eq!(detected, vec![HighRiskOccasion::Grief]);
    }

    #[test]
    fn detects_apology_from_messed_up() {
        let detected = detect_high_risk_occasions(&answers_with_occasion("messed up"));
        assert_eq!(detected, vec![HighRiskOccasion::Apology]);
    }

    #[test]
    fn detects_illness_from_life_event() {
        let answers = CardAnswers::new()
            .with_occasion("thinking of you")
            .with_life_event("recovering from surgery");
        let detected = detect_high_risk_occasions(&answers);
        assert_eq!(detected, vec![HighRiskOccasion::Illness]);
    }

    #[test]
    fn detects_professional_from_relationship() {
        let answers = CardAnswers::new()
            .with_occasion("work anniversary")
            .with_relationship("my boss");
        let detected = detect_high_risk_occasions(&answers);
        assert!(detected.contains(&HighRiskOccasion::Professional));
    }

    #[test]
    fn detects_multiple_occasions() {
        let answers = CardAnswers::new()
            .with_occasion("sorry about the mix-up")
            .with_relationship("coworker");
        let detected = detect_high_risk_occasions(&answers);
        assert_eq!(
            detected,
            vec![HighRiskOccasion::Apology, HighRiskOccasion::Professional]
        );
    }

    #[test]
    fn detection_order_is_stable() {
        let answers = CardAnswers::new()
            .with_occasion("sorry she is sick and her dog passed away")
            .with_relationship("colleague");
        let detected = detect_high_risk_occasions(&answers);
        assert_eq!(
            detected,
            vec![
                HighRiskOccasion::Grief,
                HighRiskOccasion::Illness,
                HighRiskOccasion::Apology,
                HighRiskOccasion::Professional,
            ]
        );
    }

    #[test]
    fn detects_nothing_for_plain_celebration() {
        let detected = detect_high_risk_occasions(&answers_with_occasion("birthday"));
        assert!(detected.is_empty());
    }

    #[test]
    fn detection_is_case_insensitive() {
        let detected = detect_high_risk_occasions(&answers_with_occasion("PASSED AWAY"));
        assert_eq!(detected, vec![HighRiskOccasion::Grief]);
    }

    // === Table sanity ===

    #[test]
    fn every_occasion_has_hard_and_soft_rules() {
        let set = rules();
        for occasion in HighRiskOccasion::all() {
            let hard = set
                .rules_for(*occasion)
                .filter(|r| r.severity == RuleSeverity::HardBan)
                .count();
            let soft = set
                .rules_for(*occasion)
                .filter(|r| r.severity == RuleSeverity::SoftWarning)
                .count();
            assert!(hard > 0, "{} has no hard bans", occasion.name());
            assert!(soft > 0, "{} has no soft warnings", occasion.name());
        }
    }

    #[test]
    fn rule_ids_are_unique() {
        let set = rules();
        let mut ids: Vec<_> = set.rules().iter().map(|r| r.id).collect();
        ids.sort();
        let before = ids.len();
        ids.dedup();
        assert_eq!(ids.len(), before);
    }

    #[test]
    fn every_hard_ban_has_an_explanation() {
        for rule in rules().rules() {
            assert!(!rule.explanation.is_empty(), "{} missing explanation", rule.id);
        }
    }

    // === Validation ===

    #[test]
    fn apology_but_deflection_matches_spec_scenario() {
        let set = rules();
        let result = set.validate_message(
            "I'm sorry, but I was tired",
            &[HighRiskOccasion::Apology],
        );
        assert!(!result.is_valid());
        let ids: Vec<_> = result
            .hard_violations
            .iter()
            .map(|v| v.rule_id.as_str())
            .collect();
        assert!(ids.contains(&"apology_but_deflection"));
        assert!(ids.contains(&"apology_excuses"));
    }

    #[test]
    fn sorry_but_without_comma_still_matches() {
        let set = rules();
        let result = set.validate_message("sorry but it happened", &[HighRiskOccasion::Apology]);
        assert!(!result.is_valid());
    }

    #[test]
    fn stay_strong_blocks_grief_but_not_celebration() {
        let set = rules();
        let msg = "Stay strong, you've got this!";
        let grief = set.validate_message(msg, &[HighRiskOccasion::Grief]);
        assert!(!grief.is_valid());

        // Same phrase with no detected occasions: no rules apply.
        let none = set.validate_message(msg, &[]);
        assert!(none.is_valid());
        assert!(none.soft_violations.is_empty());
    }

    #[test]
    fn soft_warning_does_not_invalidate() {
        let set = rules();
        let result = set.validate_message(
            "Get well soon, we miss you around here.",
            &[HighRiskOccasion::Illness],
        );
        assert!(result.is_valid());
        assert_eq!(result.soft_violations.len(), 1);
        assert_eq!(result.soft_violations[0].rule_id, "illness_generic_get_well");
    }

    #[test]
    fn hard_and_soft_are_independently_inspectable() {
        let set = rules();
        let result = set.validate_message(
            "You'll be fine! Get well soon!",
            &[HighRiskOccasion::Illness],
        );
        assert!(!result.is_valid());
        assert_eq!(result.hard_violations.len(), 1);
        assert_eq!(result.soft_violations.len(), 1);
    }

    #[test]
    fn one_violation_per_rule_even_with_repeats() {
        let set = rules();
        let result = set.validate_message(
            "Stay strong. Really, stay strong.",
            &[HighRiskOccasion::Grief],
        );
        let stay_strong: Vec<_> = result
            .hard_violations
            .iter()
            .filter(|v| v.rule_id == "grief_stay_strong")
            .collect();
        assert_eq!(stay_strong.len(), 1);
    }

    #[test]
    fn validation_is_case_insensitive() {
        let set = rules();
        let result = set.validate_message("AT LEAST they lived a long life", &[HighRiskOccasion::Grief]);
        assert!(!result.is_valid());
    }

    #[test]
    fn violation_carries_matched_text_and_alternatives() {
        let set = rules();
        let result = set.validate_message(
            "if you were offended, I apologize",
            &[HighRiskOccasion::Apology],
        );
        let v = &result.hard_violations[0];
        assert_eq!(v.matched_text.to_lowercase(), "if you were offended");
        assert!(!v.alternatives.is_empty());
    }

    #[test]
    fn professional_intimacy_blocked() {
        let set = rules();
        let result = set.validate_message(
            "Love you lots, congrats on the promotion!",
            &[HighRiskOccasion::Professional],
        );
        assert!(!result.is_valid());
        assert_eq!(result.hard_violations[0].rule_id, "professional_intimacy");
    }

    #[test]
    fn clean_message_passes_all_occasions() {
        let set = rules();
        let result = set.validate_message(
            "I'm holding you close in my thoughts this week.",
            HighRiskOccasion::all(),
        );
        assert!(result.is_valid());
        assert!(result.soft_violations.is_empty());
    }
}
