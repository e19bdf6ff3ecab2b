//! The closed design-template catalog.
//!
//! Thirteen templates, fixed at compile time. Every other component refers to
//! templates by [`TemplateId`]; the catalog is a lookup table, never extended
//! at runtime.

use serde::{Deserialize, Serialize};

/// Stable identifier for a design template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateId {
    /// Soft florals, hand-lettered, gentle.
    FloralWhisper,
    /// Sparse letterpress type on heavy stock. The restrained option.
    LetterpressMinimal,
    /// Deep blues, stars, stillness. For quiet comfort.
    NightSkyQuiet,
    /// Pressed-flower silhouettes, muted and memorial.
    BotanicalSilhouette,
    /// Confetti burst, saturated color, high energy.
    ConfettiPop,
    /// Warm watercolor washes at dawn.
    WatercolorSunrise,
    /// Metallic foil accents on cream.
    GoldenFoil,
    /// Torn-paper layers, playful craft feel.
    PaperCollage,
    /// Mid-century travel-postcard kitsch.
    RetroPostcard,
    /// Crayon scrawl, deliberately naive.
    ChildlikeCrayon,
    /// Geometric gilded frame, formal.
    ArtDecoFrame,
    /// Knitted textures, hygge warmth.
    CozyKnit,
    /// Two-tone linocut garden print.
    LinocutGarden,
}

impl TemplateId {
    /// Returns every template id in catalog order.
    pub fn all() -> &'static [TemplateId] {
        &[
            TemplateId::FloralWhisper,
            TemplateId::LetterpressMinimal,
            TemplateId::NightSkyQuiet,
            TemplateId::BotanicalSilhouette,
            TemplateId::ConfettiPop,
            TemplateId::WatercolorSunrise,
            TemplateId::GoldenFoil,
            TemplateId::PaperCollage,
            TemplateId::RetroPostcard,
            TemplateId::ChildlikeCrayon,
            TemplateId::ArtDecoFrame,
            TemplateId::CozyKnit,
            TemplateId::LinocutGarden,
        ]
    }

    /// Returns the stable string id for this template.
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateId::FloralWhisper => "floral_whisper",
            TemplateId::LetterpressMinimal => "letterpress_minimal",
            TemplateId::NightSkyQuiet => "night_sky_quiet",
            TemplateId::BotanicalSilhouette => "botanical_silhouette",
            TemplateId::ConfettiPop => "confetti_pop",
            TemplateId::WatercolorSunrise => "watercolor_sunrise",
            TemplateId::GoldenFoil => "golden_foil",
            TemplateId::PaperCollage => "paper_collage",
            TemplateId::RetroPostcard => "retro_postcard",
            TemplateId::ChildlikeCrayon => "childlike_crayon",
            TemplateId::ArtDecoFrame => "art_deco_frame",
            TemplateId::CozyKnit => "cozy_knit",
            TemplateId::LinocutGarden => "linocut_garden",
        }
    }

    /// Parses a string id (case-insensitive) into a template id.
    pub fn parse(s: &str) -> Option<TemplateId> {
        let normalized = s.trim().to_lowercase();
        TemplateId::all()
            .iter()
            .copied()
            .find(|t| t.as_str() == normalized)
    }
}

/// A design template: id plus the human and prompt-facing descriptions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignTemplate {
    /// Stable identifier.
    pub id: TemplateId,
    /// Display name shown in the wizard.
    pub name: &'static str,
    /// Human description of the look.
    pub description: &'static str,
    /// Style suffix appended to image-generation prompts.
    pub prompt_suffix: &'static str,
}

/// Returns the full template catalog in stable order.
pub fn template_catalog() -> &'static [DesignTemplate] {
    &CATALOG
}

/// Looks up a template by id. Total over [`TemplateId`].
pub fn get_template(id: TemplateId) -> &'static DesignTemplate {
    // The catalog covers every TemplateId variant.
    CATALOG
        .iter()
        .find(|t| t.id == id)
        .unwrap_or(&CATALOG[0])
}

static CATALOG: [DesignTemplate; 13] = [
    DesignTemplate {
        id: TemplateId::FloralWhisper,
        name: "Floral Whisper",
        description: "Soft watercolor florals with gentle hand lettering",
        prompt_suffix: "delicate watercolor florals, soft pastel palette, hand-lettered script, airy white space",
    },
    DesignTemplate {
        id: TemplateId::LetterpressMinimal,
        name: "Letterpress Minimal",
        description: "Sparse letterpress type on heavy cream stock",
        prompt_suffix: "minimal letterpress typography, debossed serif text, heavy cream paper texture, generous margins, no illustration",
    },
    DesignTemplate {
        id: TemplateId::NightSkyQuiet,
        name: "Night Sky Quiet",
        description: "Deep blue night sky with scattered stars, calm and still",
        prompt_suffix: "deep indigo night sky, scattered soft stars, quiet horizon, muted navy and silver palette, serene stillness",
    },
    DesignTemplate {
        id: TemplateId::BotanicalSilhouette,
        name: "Botanical Silhouette",
        description: "Pressed-flower silhouettes in muted, memorial tones",
        prompt_suffix: "pressed botanical silhouettes, muted sage and ivory palette, soft shadows, understated and dignified",
    },
    DesignTemplate {
        id: TemplateId::ConfettiPop,
        name: "Confetti Pop",
        description: "Confetti burst in saturated party colors",
        prompt_suffix: "exploding confetti, saturated primary colors, bold geometric shapes, festive high energy",
    },
    DesignTemplate {
        id: TemplateId::WatercolorSunrise,
        name: "Watercolor Sunrise",
        description: "Warm watercolor washes in dawn colors",
        prompt_suffix: "warm watercolor wash, sunrise gradient of peach and gold, soft bleeding edges, hopeful glow",
    },
    DesignTemplate {
        id: TemplateId::GoldenFoil,
        name: "Golden Foil",
        description: "Metallic gold foil accents on cream",
        prompt_suffix: "gold foil accents, cream background, elegant flourishes, luxe metallic shimmer",
    },
    DesignTemplate {
        id: TemplateId::PaperCollage,
        name: "Paper Collage",
        description: "Torn-paper layers with a playful craft feel",
        prompt_suffix: "torn paper collage, layered craft textures, playful asymmetry, cheerful mixed palette",
    },
    DesignTemplate {
        id: TemplateId::RetroPostcard,
        name: "Retro Postcard",
        description: "Mid-century travel-postcard lettering and kitsch",
        prompt_suffix: "vintage travel postcard style, mid-century bold lettering, halftone texture, nostalgic teal and coral",
    },
    DesignTemplate {
        id: TemplateId::ChildlikeCrayon,
        name: "Childlike Crayon",
        description: "Deliberately naive crayon scrawl",
        prompt_suffix: "childlike crayon drawing, wobbly lines, bright waxy strokes, innocent charm",
    },
    DesignTemplate {
        id: TemplateId::ArtDecoFrame,
        name: "Art Deco Frame",
        description: "Geometric gilded frame, formal and polished",
        prompt_suffix: "art deco geometric frame, gilded lines on deep emerald, symmetrical elegance, formal polish",
    },
    DesignTemplate {
        id: TemplateId::CozyKnit,
        name: "Cozy Knit",
        description: "Knitted textures and hygge warmth",
        prompt_suffix: "knitted wool texture, warm oatmeal and rust palette, cozy domestic warmth, soft focus",
    },
    DesignTemplate {
        id: TemplateId::LinocutGarden,
        name: "Linocut Garden",
        description: "Two-tone linocut garden print",
        prompt_suffix: "two-tone linocut print, carved garden motifs, ink on cream, handmade texture",
    },
];
