//! embedded-graphics mono-font backend for `text-metrics`.
//!
//! [`MonoFontMeasurer`] answers width queries with the advance of the
//! built-in mono font closest to the requested size, scaled to that size.
//! [`draw_lines`] renders already-wrapped lines onto a binary display.

#![cfg_attr(
    not(test),
    deny(
        clippy::disallowed_methods,
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::panic_in_result_fn,
        clippy::todo,
        clippy::unimplemented
    )
)]

use embedded_graphics::{
    mono_font::{
        ascii::{
            FONT_10X20, FONT_6X13_BOLD, FONT_6X13_ITALIC, FONT_6X9, FONT_7X13_ITALIC, FONT_7X14,
            FONT_7X14_BOLD, FONT_8X13, FONT_8X13_BOLD, FONT_8X13_ITALIC, FONT_9X18,
            FONT_9X18_BOLD,
        },
        MonoFont, MonoTextStyle,
    },
    pixelcolor::BinaryColor,
    prelude::*,
    text::{Baseline, Text},
};
use std::borrow::Cow;
use text_metrics::{FontSpec, MetricsError, TextMeasurer};

/// Why font selection had to fall back to a different face.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FontFallbackReason {
    UnknownFamily,
    UnsupportedWeightItalic,
}

/// Mono face picked for a font specification.
#[derive(Clone, Copy, Debug)]
pub struct FontSelection {
    pub font: &'static MonoFont<'static>,
    pub fallback_reason: Option<FontFallbackReason>,
}

impl FontSelection {
    /// Horizontal advance of one glyph at the face's native size.
    pub fn native_advance(&self) -> u32 {
        self.font.character_size.width + self.font.character_spacing
    }

    /// Horizontal advance of one glyph scaled to `size_px`.
    pub fn advance_at(&self, size_px: f32) -> f32 {
        let em = self.font.character_size.height.max(1) as f32;
        self.native_advance() as f32 * size_px / em
    }

    pub fn text_style(&self) -> MonoTextStyle<'static, BinaryColor> {
        MonoTextStyle::new(self.font, BinaryColor::On)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SizeBucket {
    Small,
    Medium,
    Large,
    Xl,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Variant {
    Regular,
    Italic,
    Bold,
    BoldItalic,
}

/// Text measurer backed by embedded-graphics ASCII mono fonts.
#[derive(Clone, Copy, Debug, Default)]
pub struct MonoFontMeasurer;

impl MonoFontMeasurer {
    pub fn new() -> Self {
        Self
    }

    fn size_bucket_for(size_px: f32) -> SizeBucket {
        if size_px >= 24.0 {
            SizeBucket::Xl
        } else if size_px >= 20.0 {
            SizeBucket::Large
        } else if size_px >= 16.0 {
            SizeBucket::Medium
        } else {
            SizeBucket::Small
        }
    }

    fn variant_for(font: &FontSpec) -> Variant {
        let bold = font.weight_value() >= 700;
        match (bold, font.is_italic()) {
            (true, true) => Variant::BoldItalic,
            (true, false) => Variant::Bold,
            (false, true) => Variant::Italic,
            (false, false) => Variant::Regular,
        }
    }

    fn face_for(
        bucket: SizeBucket,
        variant: Variant,
    ) -> (&'static MonoFont<'static>, Option<FontFallbackReason>) {
        let unsupported = Some(FontFallbackReason::UnsupportedWeightItalic);
        match (bucket, variant) {
            (SizeBucket::Small, Variant::Regular) => (&FONT_6X9, None),
            (SizeBucket::Small, Variant::Italic) => (&FONT_6X13_ITALIC, None),
            (SizeBucket::Small, Variant::Bold) => (&FONT_6X13_BOLD, None),
            (SizeBucket::Small, Variant::BoldItalic) => (&FONT_6X13_BOLD, unsupported),
            (SizeBucket::Medium, Variant::Regular) => (&FONT_7X14, None),
            (SizeBucket::Medium, Variant::Italic) => (&FONT_7X13_ITALIC, None),
            (SizeBucket::Medium, Variant::Bold) => (&FONT_7X14_BOLD, None),
            (SizeBucket::Medium, Variant::BoldItalic) => (&FONT_7X14_BOLD, unsupported),
            (SizeBucket::Large, Variant::Regular) => (&FONT_8X13, None),
            (SizeBucket::Large, Variant::Italic) => (&FONT_8X13_ITALIC, None),
            (SizeBucket::Large, Variant::Bold) => (&FONT_8X13_BOLD, None),
            (SizeBucket::Large, Variant::BoldItalic) => (&FONT_8X13_BOLD, unsupported),
            (SizeBucket::Xl, Variant::Regular) => (&FONT_10X20, None),
            (SizeBucket::Xl, Variant::Italic) => (&FONT_9X18, unsupported),
            (SizeBucket::Xl, Variant::Bold) => (&FONT_9X18_BOLD, None),
            (SizeBucket::Xl, Variant::BoldItalic) => (&FONT_9X18_BOLD, unsupported),
        }
    }

    fn family_supported(family: &str) -> bool {
        family.split(',').any(|name| {
            matches!(
                name.trim()
                    .trim_matches('"')
                    .trim_matches('\'')
                    .to_ascii_lowercase()
                    .as_str(),
                "monospace" | "mono" | "fixed" | "serif" | "sans-serif"
            )
        })
    }

    /// Face used for `font`, with the reason if it is not an exact match.
    pub fn select(&self, font: &FontSpec) -> FontSelection {
        let mut fallback_reason =
            (!Self::family_supported(&font.family)).then_some(FontFallbackReason::UnknownFamily);
        let (face, style_fallback) =
            Self::face_for(Self::size_bucket_for(font.size_px), Self::variant_for(font));
        if style_fallback.is_some() {
            fallback_reason = style_fallback;
        }
        FontSelection {
            font: face,
            fallback_reason,
        }
    }
}

impl TextMeasurer for MonoFontMeasurer {
    fn measure_text_px(&self, text: &str, font: &FontSpec) -> f32 {
        let selection = self.select(font);
        let glyphs = normalize_text_for_mono(text).chars().count();
        glyphs as f32 * selection.advance_at(font.size_px)
    }

    fn check_font(&self, font: &FontSpec) -> Result<(), MetricsError> {
        if !font.size_px.is_finite() || font.size_px < 0.0 {
            return Err(MetricsError::MeasurementUnavailable {
                font: font.to_string(),
                reason: "font size must be a finite non-negative number",
            });
        }
        if let Some(reason) = self.select(font).fallback_reason {
            log::warn!("Mono font fallback for '{}': {:?}", font, reason);
        }
        Ok(())
    }
}

/// Map characters the ASCII mono fonts lack to close ASCII stand-ins and drop
/// invisible break hints.
pub fn normalize_text_for_mono(text: &str) -> Cow<'_, str> {
    if !text.chars().any(|ch| {
        matches!(
            ch,
            '\u{00A0}' // nbsp
                | '\u{00AD}' // soft hyphen
                | '\u{200B}' // zero width space
                | '\u{2013}' // en dash
                | '\u{2014}' // em dash
                | '\u{2018}' // left single quote
                | '\u{2019}' // right single quote
                | '\u{201C}' // left double quote
                | '\u{201D}' // right double quote
                | '\u{2026}' // ellipsis
        )
    }) {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\u{00AD}' | '\u{200B}' => {}
            '\u{00A0}' => out.push(' '),
            '\u{2013}' | '\u{2014}' => out.push('-'),
            '\u{2018}' | '\u{2019}' => out.push('\''),
            '\u{201C}' | '\u{201D}' => out.push('"'),
            '\u{2026}' => out.push_str("..."),
            other => out.push(other),
        }
    }
    Cow::Owned(out)
}

/// Draw wrapped lines top-down starting at `origin`, one every
/// `line_height_px` pixels, with the face [`MonoFontMeasurer`] selects for
/// `font` at its native size.
///
/// Returns the height covered by the drawn lines.
pub fn draw_lines<D, S>(
    display: &mut D,
    lines: &[S],
    font: &FontSpec,
    origin: Point,
    line_height_px: u32,
) -> Result<u32, D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
    S: AsRef<str>,
{
    let selection = MonoFontMeasurer.select(font);
    let style = selection.text_style();
    let step = line_height_px.max(1);
    let mut y = origin.y;
    for line in lines {
        let text = normalize_text_for_mono(line.as_ref());
        if !text.is_empty() {
            Text::with_baseline(text.as_ref(), Point::new(origin.x, y), style, Baseline::Top)
                .draw(display)?;
        }
        y = y.saturating_add(step as i32);
    }
    Ok(step.saturating_mul(lines.len() as u32))
}
