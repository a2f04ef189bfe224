//! Appearance form: colours, fonts and page layout mapped onto the style
//! catalogue.

use serde::Serialize;

use crate::reader::Reader;
use crate::services::style_catalogue::{
    self, is_valid_hex_color, parse_length, APPLE_BUGS, DAY_MODE, FONT_FAMILY, FONT_SIZE,
    FONT_WEIGHT, MAXIMIZE_PAGE, NIGHT_MODE, PAGE_WIDTH,
};
use crate::types::errors::SettingsError;

/// Colours of a preview swatch.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Swatch {
    pub background: String,
    pub color: String,
}

/// Font preview.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FontSample {
    pub font_family: String,
    pub font_size: String,
    pub font_weight: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct StylesController {
    pub day_background: String,
    pub day_color: String,
    pub night_background: String,
    pub night_color: String,
    pub use_custom_colors: bool,
    pub custom_font_family: bool,
    pub font_family: String,
    pub custom_font_size: bool,
    /// Percent.
    pub font_size: u32,
    pub custom_font_weight: bool,
    pub font_weight: String,
    /// In `em`.
    pub page_width: u32,
    pub maximize_page: bool,
    pub day_example: Swatch,
    pub night_example: Swatch,
    pub font_example: FontSample,
}

fn rule(reader: &Reader, style: &str, property: &str) -> String {
    reader
        .style(style)
        .and_then(|s| s.rules.get(property))
        .cloned()
        .unwrap_or_default()
}

fn check_color(color: &str) -> Result<(), SettingsError> {
    if is_valid_hex_color(color) {
        Ok(())
    } else {
        Err(SettingsError::InvalidValue(format!("not a hex colour: {}", color)))
    }
}

impl StylesController {
    /// Registers the catalogue, fills the form from the registered styles and
    /// applies every active style.
    pub fn new(reader: &mut Reader) -> Self {
        for style in style_catalogue::default_styles(reader.settings.max_width) {
            reader.add_style(&style.name, &style.selector, style.rules, style.extra);
        }

        let mut controller = Self::default();
        controller.reflect(reader);

        let apple = reader
            .settings
            .user_agent
            .as_deref()
            .map_or(false, style_catalogue::needs_apple_workaround);
        if apple {
            reader.activate_style(APPLE_BUGS);
        }

        let active: Vec<String> = reader.active_styles().map(str::to_string).collect();
        for name in active {
            match name.as_str() {
                DAY_MODE => controller.use_custom_colors = true,
                FONT_FAMILY => controller.custom_font_family = true,
                FONT_SIZE => controller.custom_font_size = true,
                FONT_WEIGHT => controller.custom_font_weight = true,
                MAXIMIZE_PAGE => controller.maximize_page = true,
                NIGHT_MODE => reader.settings.night_mode = true,
                APPLE_BUGS => tracing::info!("Apple mobile bugs detected, applying workarounds"),
                _ => {}
            }
            reader.enable_style(&name);
        }
        controller
    }

    /// Copies the current rule values into the form and swatches.
    pub fn reflect(&mut self, reader: &Reader) {
        self.day_background = rule(reader, DAY_MODE, "background");
        self.day_color = rule(reader, DAY_MODE, "color");
        self.night_background = rule(reader, NIGHT_MODE, "background");
        self.night_color = rule(reader, NIGHT_MODE, "color");
        self.font_family = rule(reader, FONT_FAMILY, "font-family");
        self.font_weight = rule(reader, FONT_WEIGHT, "font-weight");
        let size = rule(reader, FONT_SIZE, "font-size");
        self.font_size = parse_length(&size).unwrap_or(100);
        self.page_width =
            parse_length(&rule(reader, PAGE_WIDTH, "max-width")).unwrap_or(reader.settings.max_width);

        self.day_example = Swatch {
            background: self.day_background.clone(),
            color: self.day_color.clone(),
        };
        self.night_example = Swatch {
            background: self.night_background.clone(),
            color: self.night_color.clone(),
        };
        self.font_example = FontSample {
            font_family: self.font_family.clone(),
            font_size: size,
            font_weight: self.font_weight.clone(),
        };
    }

    pub fn font_family_disabled(&self) -> bool {
        !self.custom_font_family
    }

    pub fn font_size_disabled(&self) -> bool {
        !self.custom_font_size
    }

    pub fn font_weight_disabled(&self) -> bool {
        !self.custom_font_weight
    }

    fn toggle_style(reader: &mut Reader, name: &str, on: bool) {
        if on {
            reader.enable_style(name);
        } else {
            reader.disable_style(name);
        }
    }

    // ---- colours ----

    pub fn set_day_background(&mut self, reader: &mut Reader, color: &str) -> Result<(), SettingsError> {
        check_color(color)?;
        self.day_background = color.to_string();
        self.day_example.background = color.to_string();
        reader.update_style_rule(DAY_MODE, "background", color);
        Ok(())
    }

    pub fn set_day_color(&mut self, reader: &mut Reader, color: &str) -> Result<(), SettingsError> {
        check_color(color)?;
        self.day_color = color.to_string();
        self.day_example.color = color.to_string();
        reader.update_style_rule(DAY_MODE, "color", color);
        Ok(())
    }

    pub fn set_night_background(&mut self, reader: &mut Reader, color: &str) -> Result<(), SettingsError> {
        check_color(color)?;
        self.night_background = color.to_string();
        self.night_example.background = color.to_string();
        reader.update_style_rule(NIGHT_MODE, "background", color);
        Ok(())
    }

    pub fn set_night_color(&mut self, reader: &mut Reader, color: &str) -> Result<(), SettingsError> {
        check_color(color)?;
        self.night_color = color.to_string();
        self.night_example.color = color.to_string();
        reader.update_style_rule(NIGHT_MODE, "color", color);
        Ok(())
    }

    /// "Use custom colours" checkbox.
    pub fn set_use_custom_colors(&mut self, reader: &mut Reader, on: bool) {
        self.use_custom_colors = on;
        Self::toggle_style(reader, DAY_MODE, on);
    }

    pub fn toggle_day(&mut self, reader: &mut Reader) {
        let on = !self.use_custom_colors;
        self.set_use_custom_colors(reader, on);
    }

    /// Night shift: flips the night style and `nightMode` with it. The
    /// persisted active-style set is the source of truth.
    pub fn toggle_night(&mut self, reader: &mut Reader) {
        let on = !reader.is_style_active(NIGHT_MODE);
        Self::toggle_style(reader, NIGHT_MODE, on);
        reader.settings.night_mode = on;
    }

    // ---- fonts ----

    pub fn set_custom_font_family(&mut self, reader: &mut Reader, on: bool) {
        self.custom_font_family = on;
        Self::toggle_style(reader, FONT_FAMILY, on);
    }

    pub fn set_font_family(&mut self, reader: &mut Reader, family: &str) {
        self.font_family = family.to_string();
        self.font_example.font_family = family.to_string();
        reader.update_style_rule(FONT_FAMILY, "font-family", family);
    }

    pub fn set_custom_font_size(&mut self, reader: &mut Reader, on: bool) {
        self.custom_font_size = on;
        Self::toggle_style(reader, FONT_SIZE, on);
    }

    pub fn set_font_size(&mut self, reader: &mut Reader, percent: u32) {
        let value = format!("{}%", percent);
        self.font_size = percent;
        self.font_example.font_size = value.clone();
        reader.update_style_rule(FONT_SIZE, "font-size", &value);
    }

    pub fn set_custom_font_weight(&mut self, reader: &mut Reader, on: bool) {
        self.custom_font_weight = on;
        Self::toggle_style(reader, FONT_WEIGHT, on);
    }

    pub fn set_font_weight(&mut self, reader: &mut Reader, weight: &str) {
        self.font_weight = weight.to_string();
        self.font_example.font_weight = weight.to_string();
        reader.update_style_rule(FONT_WEIGHT, "font-weight", weight);
    }

    // ---- page ----

    /// Page width in `em`, written to the `max-width` rule the viewer reads.
    pub fn set_page_width(&mut self, reader: &mut Reader, em: u32) {
        self.page_width = em;
        reader.update_style_rule(PAGE_WIDTH, "max-width", &format!("{}em", em));
        reader.enable_style(PAGE_WIDTH);
    }

    pub fn set_maximize_page(&mut self, reader: &mut Reader, on: bool) {
        self.maximize_page = on;
        Self::toggle_style(reader, MAXIMIZE_PAGE, on);
    }
}
