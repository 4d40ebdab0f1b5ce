//! CSS length conversion and word/letter spacing addons.

use crate::error::MetricsError;

/// Base font size used to resolve `em`/`rem` lengths when none is given.
pub const DEFAULT_BASE_FONT_SIZE_PX: f32 = 16.0;

const CSS_PX_PER_PT: f32 = 96.0 / 72.0;

/// Keyword values that leave spacing at its default.
const SPACING_KEYWORDS: &[&str] = &["inherit", "initial", "unset", "normal"];

/// Convert a CSS length to pixels.
///
/// Supports `px`, `pt`, `em` and `rem`. A bare number is read as pixels.
pub fn px_value(value: &str, base_font_size_px: f32) -> Result<f32, MetricsError> {
    let trimmed = value.trim();
    let split = numeric_prefix_len(trimmed);
    let Ok(number) = trimmed[..split].parse::<f32>() else {
        return Err(MetricsError::unsupported_unit(value, trimmed));
    };
    let unit = trimmed[split..].trim().to_ascii_lowercase();
    match unit.as_str() {
        "" | "px" => Ok(number),
        "pt" => Ok(number * CSS_PX_PER_PT),
        "em" | "rem" => Ok(number * base_font_size_px),
        _ => Err(MetricsError::unsupported_unit(value, &unit)),
    }
}

fn numeric_prefix_len(value: &str) -> usize {
    let mut seen_digit = false;
    let mut seen_dot = false;
    for (idx, ch) in value.char_indices() {
        match ch {
            '+' | '-' if idx == 0 => {}
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            _ => return if seen_digit { idx } else { 0 },
        }
    }
    if seen_digit {
        value.len()
    } else {
        0
    }
}

fn spacing_addon(value: &str, base_font_size_px: f32) -> Result<f32, MetricsError> {
    let value = value.trim();
    if value.is_empty() || SPACING_KEYWORDS.contains(&value) {
        return Ok(0.0);
    }
    px_value(value, base_font_size_px)
}

/// Extra width contributed by CSS `word-spacing` and `letter-spacing`.
///
/// Lengths are parsed once at construction; [`extra_width`](Self::extra_width)
/// is called for every width probe of a wrapping run.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SpacingModel {
    /// Pixels added per interior word boundary.
    pub word_addon: f32,
    /// Pixels added per code point.
    pub letter_addon: f32,
}

impl SpacingModel {
    /// Spacing model that adds nothing.
    pub const NONE: Self = Self {
        word_addon: 0.0,
        letter_addon: 0.0,
    };

    /// Parse raw `word-spacing` / `letter-spacing` style values.
    pub fn new(word_spacing: &str, letter_spacing: &str) -> Result<Self, MetricsError> {
        Self::with_base_font_size(word_spacing, letter_spacing, DEFAULT_BASE_FONT_SIZE_PX)
    }

    /// Parse spacing values resolving `em`/`rem` against `base_font_size_px`.
    pub fn with_base_font_size(
        word_spacing: &str,
        letter_spacing: &str,
        base_font_size_px: f32,
    ) -> Result<Self, MetricsError> {
        Ok(Self {
            word_addon: spacing_addon(word_spacing, base_font_size_px)?,
            letter_addon: spacing_addon(letter_spacing, base_font_size_px)?,
        })
    }

    /// Whether this model never changes a measured width.
    pub fn is_zero(&self) -> bool {
        self.word_addon == 0.0 && self.letter_addon == 0.0
    }

    /// Additional pixels for `text`.
    pub fn extra_width(&self, text: &str) -> f32 {
        if self.is_zero() {
            return 0.0;
        }
        let boundaries = text.split_whitespace().count().saturating_sub(1);
        let chars = text.chars().count();
        boundaries as f32 * self.word_addon + chars as f32 * self.letter_addon
    }
}
