//! Configuration types for the Flowbox editor.
//!
//! This module provides the configuration structures that tune the editor's
//! interaction thresholds, text measurement, visual style and palette. All
//! types implement [`serde::Deserialize`] with every field defaulted, so a
//! configuration file only needs to mention what it changes.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining all sections.
//! - [`EditorConfig`] - Drag threshold and palette geometry.
//! - [`TextConfig`] - Which text measurer sizes the leaf boxes.
//! - [`StyleConfig`] - Colors of the SVG rendering.
//! - [`PaletteConfig`] - Optional replacement of the palette catalogue.
//!
//! # Example
//!
//! ```
//! # use flowbox::config::AppConfig;
//! let config = AppConfig::default();
//! assert_eq!(config.editor().drag_threshold(), 5.0);
//! assert!(config.style().svg_style().is_ok());
//! ```

use serde::Deserialize;

use flowbox_core::{
    color::Color,
    text::{FontMeasurer, MonospaceMeasurer, TextMeasurer},
};

use crate::{
    palette::{self, PaletteItem},
    surface::SvgStyle,
};

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    editor: EditorConfig,

    #[serde(default)]
    text: TextConfig,

    #[serde(default)]
    style: StyleConfig,

    #[serde(default)]
    palette: PaletteConfig,
}

impl AppConfig {
    pub fn new(
        editor: EditorConfig,
        text: TextConfig,
        style: StyleConfig,
        palette: PaletteConfig,
    ) -> Self {
        Self {
            editor,
            text,
            style,
            palette,
        }
    }

    pub fn editor(&self) -> &EditorConfig {
        &self.editor
    }

    pub fn text(&self) -> &TextConfig {
        &self.text
    }

    pub fn style(&self) -> &StyleConfig {
        &self.style
    }

    pub fn palette(&self) -> &PaletteConfig {
        &self.palette
    }

    /// Style of the SVG rendering, with labels drawn in the configured font.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured color string cannot be parsed.
    pub fn svg_style(&self) -> Result<SvgStyle, String> {
        Ok(self
            .style
            .svg_style()?
            .with_font(self.text.font_family(), self.text.font_size()))
    }
}

/// Interaction thresholds and palette geometry.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Distance in pixels the pointer must travel after a press before the
    /// press turns into a drag.
    drag_threshold: f32,

    /// Width of the strip at the left edge that opens the palette, which is
    /// also how much of the closed palette stays visible.
    palette_trigger_width: f32,

    /// Height of the palette column.
    palette_height: f32,
}

impl EditorConfig {
    pub fn new(drag_threshold: f32, palette_trigger_width: f32, palette_height: f32) -> Self {
        Self {
            drag_threshold,
            palette_trigger_width,
            palette_height,
        }
    }

    pub fn drag_threshold(&self) -> f32 {
        self.drag_threshold
    }

    pub fn palette_trigger_width(&self) -> f32 {
        self.palette_trigger_width
    }

    pub fn palette_height(&self) -> f32 {
        self.palette_height
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self::new(5.0, 10.0, 1000.0)
    }
}

/// Available text measurers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasurerKind {
    /// Shapes text with the system fonts.
    #[default]
    Font,
    /// Fixed advance per character.
    Monospace,
}

/// Text measurement settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    measurer: MeasurerKind,
    font_family: String,
    font_size: u16,
    char_width: f32,
    line_height: f32,
}

impl TextConfig {
    pub fn measurer(&self) -> MeasurerKind {
        self.measurer
    }

    pub fn font_family(&self) -> &str {
        &self.font_family
    }

    pub fn font_size(&self) -> u16 {
        self.font_size
    }

    /// Selects the measurer (builder style).
    pub fn with_measurer(mut self, measurer: MeasurerKind) -> Self {
        self.measurer = measurer;
        self
    }

    /// Creates the configured [`TextMeasurer`].
    pub fn build_measurer(&self) -> Box<dyn TextMeasurer> {
        match self.measurer {
            MeasurerKind::Font => Box::new(FontMeasurer::new(&self.font_family, self.font_size)),
            MeasurerKind::Monospace => {
                Box::new(MonospaceMeasurer::new(self.char_width, self.line_height))
            }
        }
    }
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            measurer: MeasurerKind::default(),
            font_family: "Arial".to_string(),
            font_size: 15,
            char_width: 8.0,
            line_height: 18.0,
        }
    }
}

/// Visual styling of the SVG rendering. Unset colors fall back to the
/// defaults of [`SvgStyle`].
#[derive(Debug, Default, Clone, Deserialize)]
pub struct StyleConfig {
    #[serde(default)]
    background_color: Option<String>,

    #[serde(default)]
    selection_color: Option<String>,

    #[serde(default)]
    cursor_color: Option<String>,
}

impl StyleConfig {
    /// Builds the [`SvgStyle`] with the default label font.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured color string cannot be parsed.
    pub fn svg_style(&self) -> Result<SvgStyle, String> {
        let defaults = SvgStyle::default();
        Ok(SvgStyle::new(
            parse_color("background", self.background_color.as_deref())?
                .unwrap_or(defaults.background_color()),
            parse_color("selection", self.selection_color.as_deref())?
                .unwrap_or(defaults.selection_color()),
            parse_color("cursor", self.cursor_color.as_deref())?
                .unwrap_or(defaults.cursor_color()),
        ))
    }
}

fn parse_color(name: &str, value: Option<&str>) -> Result<Option<Color>, String> {
    value
        .map(Color::new)
        .transpose()
        .map_err(|err| format!("Invalid {name} color in config: {err}"))
}

/// Palette catalogue settings.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct PaletteConfig {
    #[serde(default)]
    items: Option<Vec<PaletteItem>>,
}

impl PaletteConfig {
    pub fn new(items: Vec<PaletteItem>) -> Self {
        Self { items: Some(items) }
    }

    /// The configured catalogue, or the built-in one.
    pub fn items(&self) -> Vec<PaletteItem> {
        self.items
            .clone()
            .unwrap_or_else(palette::default_catalogue)
    }
}
