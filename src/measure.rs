//! Font specifications and the text measurement oracle.

use core::fmt;

use crate::error::MetricsError;
use crate::spacing::{px_value, DEFAULT_BASE_FONT_SIZE_PX};

/// Font weights accepted in an assembled font string.
pub(crate) const FONT_WEIGHTS: &[&str] = &[
    "normal", "bold", "bolder", "lighter", "100", "200", "300", "400", "500", "600", "700", "800",
    "900",
];
/// Font styles accepted in an assembled font string.
pub(crate) const FONT_STYLES: &[&str] = &["normal", "italic", "oblique"];
/// Font variants accepted in an assembled font string.
pub(crate) const FONT_VARIANTS: &[&str] = &["normal", "small-caps"];

/// Default font weight.
pub const DEFAULT_FONT_WEIGHT: &str = "400";
/// Default font size.
pub const DEFAULT_FONT_SIZE: &str = "16px";
/// Default font family stack.
pub const DEFAULT_FONT_FAMILY: &str = "Helvetica, Arial, sans-serif";

/// Resolved font used for a measurement run.
///
/// Renders as a canvas-style font shorthand:
/// `"<weight> <style> <variant> <size>px <family>"`, omitting absent parts.
#[derive(Clone, Debug, PartialEq)]
pub struct FontSpec {
    pub weight: Option<String>,
    pub style: Option<String>,
    pub variant: Option<String>,
    pub size_px: f32,
    pub family: String,
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            weight: Some(DEFAULT_FONT_WEIGHT.to_string()),
            style: None,
            variant: None,
            size_px: DEFAULT_BASE_FONT_SIZE_PX,
            family: DEFAULT_FONT_FAMILY.to_string(),
        }
    }
}

impl FontSpec {
    /// Font with the given size and family and default weight.
    pub fn new(size_px: f32, family: impl Into<String>) -> Self {
        Self {
            size_px,
            family: family.into(),
            ..Self::default()
        }
    }

    /// Same font at a different pixel size.
    pub fn with_size_px(mut self, size_px: f32) -> Self {
        self.size_px = size_px;
        self
    }

    /// Numeric weight (`normal` = 400, `bold` = 700).
    pub fn weight_value(&self) -> u16 {
        match self.weight.as_deref() {
            Some("bold") | Some("bolder") => 700,
            Some("lighter") => 300,
            Some(w) => w.parse().unwrap_or(400),
            None => 400,
        }
    }

    /// Whether the font asks for an italic or oblique face.
    pub fn is_italic(&self) -> bool {
        matches!(self.style.as_deref(), Some("italic") | Some("oblique"))
    }

    /// Parse a canvas-style font shorthand such as `"bold 14px Helvetica"`.
    ///
    /// A `/line-height` suffix on the size is accepted and ignored.
    pub fn parse(font: &str) -> Result<Self, MetricsError> {
        let mut spec = Self {
            weight: None,
            style: None,
            variant: None,
            size_px: DEFAULT_BASE_FONT_SIZE_PX,
            family: String::new(),
        };
        let mut rest = font.trim();
        loop {
            let (token, tail) = match rest.split_once(char::is_whitespace) {
                Some((token, tail)) => (token, tail.trim_start()),
                None => (rest, ""),
            };
            if token.is_empty() {
                break;
            }
            if spec.weight.is_none() && FONT_WEIGHTS.contains(&token) && token != "normal" {
                spec.weight = Some(token.to_string());
            } else if spec.style.is_none() && FONT_STYLES.contains(&token) && token != "normal" {
                spec.style = Some(token.to_string());
            } else if spec.variant.is_none() && FONT_VARIANTS.contains(&token) {
                spec.variant = Some(token.to_string());
            } else if token == "normal" {
                // Shorthand slots left at their initial value.
            } else {
                let size = token.split('/').next().unwrap_or(token);
                spec.size_px = px_value(size, DEFAULT_BASE_FONT_SIZE_PX)?;
                spec.family = tail.trim().to_string();
                break;
            }
            rest = tail;
        }
        if spec.family.is_empty() {
            spec.family = DEFAULT_FONT_FAMILY.to_string();
        }
        Ok(spec)
    }
}

impl fmt::Display for FontSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for part in [&self.weight, &self.style, &self.variant]
            .into_iter()
            .flatten()
        {
            write!(f, "{} ", part)?;
        }
        write!(f, "{}px {}", self.size_px, self.family)
    }
}

/// Text measurement oracle.
///
/// Implementations return the rendered advance width of `text` in `font`.
pub trait TextMeasurer: Send + Sync {
    /// Measure rendered text width in pixels.
    fn measure_text_px(&self, text: &str, font: &FontSpec) -> f32;

    /// Verify the measurer can serve `font` before a run starts.
    ///
    /// Default accepts every font.
    fn check_font(&self, font: &FontSpec) -> Result<(), MetricsError> {
        let _ = font;
        Ok(())
    }
}

/// Measurer bound to one font for the duration of a layout call.
#[derive(Clone, Copy)]
pub struct MeasureContext<'a> {
    measurer: &'a dyn TextMeasurer,
    font: &'a FontSpec,
}

impl<'a> MeasureContext<'a> {
    /// Bind `measurer` to `font`, failing if the oracle cannot serve it.
    pub fn new(measurer: &'a dyn TextMeasurer, font: &'a FontSpec) -> Result<Self, MetricsError> {
        measurer.check_font(font)?;
        Ok(Self { measurer, font })
    }

    /// Active font.
    pub fn font(&self) -> &FontSpec {
        self.font
    }

    /// Measured width of `text` in the active font.
    pub fn measure(&self, text: &str) -> f32 {
        if text.is_empty() {
            return 0.0;
        }
        self.measurer.measure_text_px(text, self.font)
    }
}

impl fmt::Debug for MeasureContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MeasureContext")
            .field("font", &self.font)
            .finish()
    }
}
