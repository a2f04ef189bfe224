//! Style Catalogue: the named styles the reader registers on startup, with
//! the day/night palettes and font defaults used to seed them.

use crate::types::style::{rules, Style};

pub const DAY_MODE: &str = "dayMode";
pub const NIGHT_MODE: &str = "nightMode";
pub const FONT_FAMILY: &str = "fontFamily";
pub const FONT_SIZE: &str = "fontSize";
pub const FONT_WEIGHT: &str = "fontWeight";
pub const PAGE_WIDTH: &str = "pageWidth";
pub const MAXIMIZE_PAGE: &str = "maximizePage";
pub const APPLE_BUGS: &str = "appleBugs";

/// Warm paper colours for custom day mode.
struct DayPalette;
impl DayPalette {
    const BACKGROUND: &'static str = "#f8f4e8";
    const COLOR: &'static str = "#3a3a3a";
}

/// Low-glare colours for night shift.
struct NightPalette;
impl NightPalette {
    const BACKGROUND: &'static str = "#121212";
    const COLOR: &'static str = "#c8c8c8";
}

const DEFAULT_FONT_FAMILY: &str = "Georgia, serif";
const DEFAULT_FONT_SIZE: u32 = 100;
const DEFAULT_FONT_WEIGHT: &str = "normal";

/// Validates a hex color string (e.g. "#2ea44f" or "#fff").
pub fn is_valid_hex_color(color: &str) -> bool {
    match color.strip_prefix('#') {
        Some(hex) => matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

/// Every catalogue style, seeded with defaults. `max_width` is the page
/// width in `em`.
pub fn default_styles(max_width: u32) -> Vec<Style> {
    vec![
        Style::new(
            DAY_MODE,
            "*",
            rules([("color", DayPalette::COLOR), ("background", DayPalette::BACKGROUND)]),
        ),
        Style::new(
            NIGHT_MODE,
            "*",
            rules([("color", NightPalette::COLOR), ("background", NightPalette::BACKGROUND)]),
        ),
        Style::new(FONT_FAMILY, "*", rules([("font-family", DEFAULT_FONT_FAMILY)])),
        Style::new(
            FONT_SIZE,
            "*",
            rules([("font-size", format!("{}%", DEFAULT_FONT_SIZE))]),
        ),
        Style::new(FONT_WEIGHT, "*", rules([("font-weight", DEFAULT_FONT_WEIGHT)])),
        Style::new(
            PAGE_WIDTH,
            "#viewer",
            rules([("max-width", format!("{}em", max_width))]),
        ),
        Style::new(
            MAXIMIZE_PAGE,
            "#viewer",
            rules([
                ("margin", "auto"),
                ("width", "100%"),
                ("height", "95%"),
                ("top", "5%"),
            ]),
        ),
        Style::new(
            APPLE_BUGS,
            "document, html, body, p, span, div",
            rules([("cursor", "pointer")]),
        ),
    ]
}

/// Leading integer of a CSS length (`"72em"` → 72, `"110%"` → 110).
pub fn parse_length(value: &str) -> Option<u32> {
    let digits: String = value.trim().chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

/// iOS devices need the click workaround style.
pub fn needs_apple_workaround(user_agent: &str) -> bool {
    ["iPad", "iPhone", "iPod"]
        .iter()
        .any(|device| user_agent.contains(device))
}
