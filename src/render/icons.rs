// Icon references -> drawable glyphs
//
// Cards carry Font Awesome class names ("fa-solid fa-rocket"), but icon fonts
// aren't available when rasterizing. Each reference is matched by keyword
// against a small glyph set that ordinary Unicode fonts cover; anything
// unrecognized falls back to the stage's 1-based ordinal.

/// Keyword table, checked in order; first hit wins
const GLYPHS: &[(&[&str], &str)] = &[
    (&["lightbulb", "bulb", "idea", "brain"], "✦"),
    (&["rocket", "arrow", "forward", "play", "road", "route"], "➤"),
    (&["check", "flag", "trophy", "award", "medal", "crown"], "✔"),
    (&["star", "sparkle", "wand", "magic"], "★"),
    (&["heart", "hand", "handshake"], "♥"),
    (&["gear", "cog", "wrench", "tool", "screwdriver"], "⚙"),
    (&["book", "pen", "pencil", "feather", "graduation", "scroll"], "✎"),
    (&["search", "magnifying", "eye", "compass", "bullseye", "crosshair"], "◎"),
    (&["chart", "growth", "stairs", "layer", "mountain", "seedling"], "▲"),
    (&["user", "people", "users", "person", "child"], "●"),
    (&["clock", "hourglass", "calendar", "time"], "◷"),
    (&["bolt", "fire", "flame", "lightning"], "ϟ"),
    (&["puzzle", "cube", "box", "shapes", "diagram", "sitemap"], "◆"),
];

/// Glyph for a stage icon reference; `ordinal` is 1-based
pub fn glyph_for(icon: &str, ordinal: usize) -> String {
    let icon = icon.to_lowercase();

    // Font Awesome names live in the `fa-<name>` classes; style classes
    // like `fa-solid` carry no meaning here.
    let names = icon
        .split_whitespace()
        .map(|class| class.strip_prefix("fa-").unwrap_or(class))
        .filter(|name| {
            !matches!(
                *name,
                "solid" | "regular" | "light" | "thin" | "duotone" | "brands" | "fa" | "fas" | "far"
            )
        });

    for name in names {
        for (keywords, glyph) in GLYPHS {
            if keywords.iter().any(|k| name.contains(k)) {
                return (*glyph).to_string();
            }
        }
    }

    ordinal.to_string()
}
