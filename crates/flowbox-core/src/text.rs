//! Text measurement service.
//!
//! Leaf boxes size themselves from the rendered size of their label. The
//! measurement is abstracted behind [`TextMeasurer`] so hosts can plug in
//! whatever matches their renderer.
//!
//! Two implementations are provided:
//!
//! - [`FontMeasurer`] shapes the text with cosmic-text using real font
//!   metrics.
//! - [`MonospaceMeasurer`] uses a fixed advance per character and a fixed
//!   line height. It is deterministic, which makes it the right choice for
//!   tests and headless runs.
//!
//! ```
//! # use flowbox_core::text::{MonospaceMeasurer, TextMeasurer};
//! let measurer = MonospaceMeasurer::new(8.0, 16.0);
//! let size = measurer.measure("Invoke");
//! assert_eq!(size.width(), 48.0);
//! assert_eq!(size.height(), 16.0);
//! ```

use std::{
    fmt,
    sync::{Mutex, OnceLock, PoisonError},
};

use cosmic_text::{Attrs, Buffer, Family, FontSystem, Metrics, Shaping};
use log::info;

use crate::geometry::Size;

/// Measures the rendered size of a label string.
pub trait TextMeasurer: fmt::Debug {
    /// Returns the size of `text` once rendered. Empty text measures as zero.
    fn measure(&self, text: &str) -> Size;
}

/// Deterministic measurer with a fixed character advance and line height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonospaceMeasurer {
    char_width: f32,
    line_height: f32,
}

impl MonospaceMeasurer {
    pub fn new(char_width: f32, line_height: f32) -> Self {
        Self {
            char_width,
            line_height,
        }
    }
}

impl Default for MonospaceMeasurer {
    fn default() -> Self {
        Self::new(8.0, 18.0)
    }
}

impl TextMeasurer for MonospaceMeasurer {
    fn measure(&self, text: &str) -> Size {
        if text.is_empty() {
            return Size::default();
        }
        let (lines, widest) = text
            .lines()
            .fold((0usize, 0usize), |(lines, widest), line| {
                (lines + 1, widest.max(line.chars().count()))
            });
        Size::new(
            widest as f32 * self.char_width,
            lines as f32 * self.line_height,
        )
    }
}

/// Measures text by shaping it with cosmic-text.
///
/// All instances share one lazily created `FontSystem`, since loading the
/// system fonts is expensive.
#[derive(Debug, Clone)]
pub struct FontMeasurer {
    font_family: String,
    font_size: u16,
}

impl FontMeasurer {
    /// Creates a measurer for the given font family and size in points.
    pub fn new(font_family: impl Into<String>, font_size: u16) -> Self {
        Self {
            font_family: font_family.into(),
            font_size,
        }
    }
}

impl Default for FontMeasurer {
    fn default() -> Self {
        Self::new("Arial", 15)
    }
}

impl TextMeasurer for FontMeasurer {
    fn measure(&self, text: &str) -> Size {
        if text.is_empty() {
            return Size::default();
        }

        let mut font_system = FONT_SYSTEM
            .get_or_init(|| {
                info!("Initializing FontSystem");
                Mutex::new(FontSystem::new())
            })
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        // Points to pixels at standard DPI
        let font_size_px = f32::from(self.font_size) * 1.33;
        let metrics = Metrics::new(font_size_px, font_size_px * 1.15);

        let mut buffer = Buffer::new(&mut font_system, metrics);
        let mut buffer = buffer.borrow_with(&mut font_system);
        let attrs = Attrs::new().family(Family::Name(&self.font_family));
        buffer.set_size(None, None);
        buffer.set_text(text, &attrs, Shaping::Advanced, None);
        buffer.shape_until_scroll(true);

        let mut max_width: f32 = 0.0;
        let mut total_height: f32 = 0.0;
        let layout_runs: Vec<_> = buffer.layout_runs().collect();
        if layout_runs.is_empty() {
            max_width = text.len() as f32 * (font_size_px * 0.55);
            total_height = metrics.line_height;
        } else {
            for run in &layout_runs {
                if let Some(last) = run.glyphs.last() {
                    max_width = max_width.max(last.x + last.w);
                }
                total_height += metrics.line_height;
            }
        }

        Size::new(max_width, total_height)
    }
}

static FONT_SYSTEM: OnceLock<Mutex<FontSystem>> = OnceLock::new();
