//! Per-holiday overlay source text.
//!
//! Each block follows the overlay format parsed in [`crate::holiday`]:
//! line 1 is the emotional rule, line 2 the comma-separated avoid list, then a
//! blank line and the visual-treatment paragraph, then the optional
//! `---BEST BASE STYLES---` and `---TEXT OVERRIDE---` sections.

pub(crate) const CHRISTMAS: &str = "\
Warmth over spectacle; the card should feel like coming home.
gift obligations, santa for adults, shopping stress

A palette of deep evergreen, cranberry red, and warm candlelit gold. Twinkling lights, falling snow, and a merry, festive energy throughout. Evoke the jolly bustle of a family gathering winding down into quiet.

---BEST BASE STYLES---
- cozy_knit
- golden_foil
- watercolor_sunrise

---TEXT OVERRIDE---
Lean on shared rituals and the feeling of being gathered in one place.
";

pub(crate) const HANUKKAH: &str = "\
Light against darkness; endurance and family continuity.
generic christmas imagery, commercial gifting

A palette of midnight blue, white, and candle gold. Eight small flames building night by night, a quiet glow against winter dark. Celebratory but intimate, a table of family faces lit from the center.

---BEST BASE STYLES---
- night_sky_quiet
- golden_foil
";

pub(crate) const NEW_YEAR: &str = "\
Fresh starts without pressure; reflection before resolution.
diet culture, new year new you, productivity shaming

A palette of champagne gold, black, and silver confetti tones. Fireworks, clock hands at midnight, an excited celebratory burst of streamers. Energy is high and festive, all sparkle and anticipation.

---BEST BASE STYLES---
- confetti_pop
- art_deco_frame
- golden_foil
";

pub(crate) const VALENTINES: &str = "\
Affection that feels personal, never performative.
jewelry-ad cliches, possessive framing, heart emoji spam

A palette of blush pink, deep red, and cream. Soft romantic light, hand-drawn hearts used sparingly. Tender rather than steamy, with joyful warmth in the details.

---BEST BASE STYLES---
- floral_whisper
- golden_foil

---TEXT OVERRIDE---
Name one concrete thing loved about the recipient; skip grand abstractions.
";

pub(crate) const EASTER: &str = "\
Renewal and soft spring brightness.
candy overload, bunny kitsch for adults

A palette of pale yellow, lilac, and spring green. Budding branches, morning light, cheerful pastel blooms. Gentle festive lift, like the first warm weekend of the year.

---BEST BASE STYLES---
- floral_whisper
- linocut_garden
- watercolor_sunrise
";

pub(crate) const MOTHERS_DAY: &str = "\
Specific gratitude over idealized motherhood; many relationships are complicated.
perfect-mother pedestal, domestic stereotypes, guilt trips

A palette of soft rose, sage, and ivory. Garden textures and morning light, unhurried and warm. Celebration in a minor key, more embrace than parade.

---BEST BASE STYLES---
- floral_whisper
- linocut_garden
- cozy_knit
";

pub(crate) const FATHERS_DAY: &str = "\
Earned appreciation, not sitcom-dad jokes by default.
grilling cliches, lazy-dad tropes, tool-aisle shorthand

A palette of slate blue, tan, and forest green. Sturdy textures, woodgrain and canvas, steady warm light. Quietly celebratory, proud without fuss.

---BEST BASE STYLES---
- linocut_garden
- letterpress_minimal
- cozy_knit
";

pub(crate) const THANKSGIVING: &str = "\
Gratitude grounded in people, not menu logistics.
food-coma jokes, family-argument tropes, pilgrim imagery

A palette of burnt orange, ochre, and deep brown. Harvest tables, late autumn light, abundance without clutter. Warm festive fullness, the hum of a crowded kitchen.

---BEST BASE STYLES---
- cozy_knit
- watercolor_sunrise
- linocut_garden
";

pub(crate) const HALLOWEEN: &str = "\
Playful spookiness; fun-scary, never gruesome.
gore, real-world fears, horror movie violence

A palette of pumpkin orange, black, and twilight purple. Crooked silhouettes, paper bats, a grinning moon. Mischievous festive energy, excited kids on a dark street.

---BEST BASE STYLES---
- paper_collage
- childlike_crayon
";

pub(crate) const OTHER: &str = "\
Follow the sender's occasion; the day matters because they say it does.
assuming a religious frame, borrowed traditions

A palette of neutral cream and one accent tone drawn from the chosen style. Keep the treatment simple so the occasion's own character can lead.
";
