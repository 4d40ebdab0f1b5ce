//! Built-in measurement oracle using standard PostScript font metrics.
//!
//! Widths come from the Helvetica and Helvetica-Bold AFM tables (Arial is
//! metric-compatible), in 1/1000 em. Monospace family stacks use Courier,
//! whose glyphs all advance 600 units. Code points outside the tables fall
//! back to per-category estimates.

use crate::error::MetricsError;
use crate::measure::{FontSpec, TextMeasurer};

const UNITS_PER_EM: f32 = 1000.0;
const COURIER_ADVANCE: u16 = 600;
const FALLBACK_ADVANCE: u16 = 556;
const WIDE_ADVANCE: u16 = 1000;

// U+0020..=U+007E
#[rustfmt::skip]
static HELVETICA_ASCII: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
static HELVETICA_BOLD_ASCII: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

// U+00A0..=U+00BF; letters U+00C0..=U+00FF resolve through their base letter.
#[rustfmt::skip]
static HELVETICA_LATIN1_SYMBOLS: [u16; 32] = [
    278, 333, 556, 556, 556, 556, 260, 556, 333, 737, 370, 556, 584, 0, 737, 333,
    400, 584, 333, 333, 333, 556, 537, 278, 333, 333, 365, 556, 834, 834, 834, 611,
];

/// Family of standard metrics selected for a font stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StandardFamily {
    /// Helvetica / Arial.
    Helvetica,
    /// Courier (monospace).
    Courier,
}

impl StandardFamily {
    /// Pick the metrics family for a CSS font-family stack.
    pub fn for_font_family(family: &str) -> Self {
        let first = family
            .split(',')
            .next()
            .unwrap_or_default()
            .trim()
            .trim_matches(|c| c == '"' || c == '\'')
            .to_ascii_lowercase();
        if first.contains("mono") || first.contains("courier") || first == "fixed" {
            Self::Courier
        } else {
            Self::Helvetica
        }
    }
}

/// Measurer backed by standard font metrics tables.
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardFontMeasurer;

impl StandardFontMeasurer {
    /// Create the standard-metrics measurer.
    pub fn new() -> Self {
        Self
    }

    /// Advance width of one code point in 1/1000 em.
    pub fn advance_units(ch: char, family: StandardFamily, bold: bool) -> u16 {
        if is_zero_width(ch) {
            return 0;
        }
        if family == StandardFamily::Courier {
            return if is_wide(ch) { WIDE_ADVANCE } else { COURIER_ADVANCE };
        }
        let ascii = if bold {
            &HELVETICA_BOLD_ASCII
        } else {
            &HELVETICA_ASCII
        };
        match ch {
            ' '..='~' => ascii[ch as usize - 0x20],
            '\t' => ascii[0],
            '\u{00A0}'..='\u{00BF}' => HELVETICA_LATIN1_SYMBOLS[ch as usize - 0xA0],
            '\u{00C0}'..='\u{00FF}' => latin1_letter_units(ch, ascii),
            _ => general_units(ch, bold),
        }
    }
}

impl TextMeasurer for StandardFontMeasurer {
    fn measure_text_px(&self, text: &str, font: &FontSpec) -> f32 {
        let family = StandardFamily::for_font_family(&font.family);
        let bold = font.weight_value() >= 600;
        let units: u32 = text
            .chars()
            .map(|ch| u32::from(Self::advance_units(ch, family, bold)))
            .sum();
        units as f32 * font.size_px / UNITS_PER_EM
    }

    fn check_font(&self, font: &FontSpec) -> Result<(), MetricsError> {
        if !font.size_px.is_finite() || font.size_px < 0.0 {
            return Err(MetricsError::MeasurementUnavailable {
                font: font.to_string(),
                reason: "font size must be a finite, non-negative pixel value",
            });
        }
        Ok(())
    }
}

fn is_zero_width(ch: char) -> bool {
    matches!(
        ch,
        '\u{00AD}' | '\u{200B}'..='\u{200F}' | '\u{2060}' | '\u{FEFF}' | '\u{0300}'..='\u{036F}'
    ) || ch.is_control() && ch != '\t'
}

fn is_wide(ch: char) -> bool {
    matches!(
        ch,
        '\u{1100}'..='\u{115F}'
            | '\u{2E80}'..='\u{A4CF}'
            | '\u{AC00}'..='\u{D7A3}'
            | '\u{F900}'..='\u{FAFF}'
            | '\u{FE30}'..='\u{FE4F}'
            | '\u{FF00}'..='\u{FF60}'
            | '\u{FFE0}'..='\u{FFE6}'
            | '\u{20000}'..='\u{3FFFD}'
    )
}

fn latin1_letter_units(ch: char, ascii: &[u16; 95]) -> u16 {
    let base = match ch {
        '\u{00C6}' => return 1000,
        '\u{00E6}' => return 889,
        '\u{00D7}' | '\u{00F7}' => return 584,
        '\u{00DF}' => return 611,
        '\u{00D0}' => 'D',
        '\u{00DE}' => 'P',
        '\u{00F0}' | '\u{00FE}' => 'o',
        '\u{00C0}'..='\u{00C5}' => 'A',
        '\u{00C7}' => 'C',
        '\u{00C8}'..='\u{00CB}' => 'E',
        '\u{00CC}'..='\u{00CF}' => 'I',
        '\u{00D1}' => 'N',
        '\u{00D2}'..='\u{00D6}' | '\u{00D8}' => 'O',
        '\u{00D9}'..='\u{00DC}' => 'U',
        '\u{00DD}' => 'Y',
        '\u{00E0}'..='\u{00E5}' => 'a',
        '\u{00E7}' => 'c',
        '\u{00E8}'..='\u{00EB}' => 'e',
        // Accented i is drawn on a dotless i, wider than plain `i`.
        '\u{00EC}'..='\u{00EF}' => return 278,
        '\u{00F1}' => 'n',
        '\u{00F2}'..='\u{00F6}' => 'o',
        '\u{00F8}' => return 611,
        '\u{00F9}'..='\u{00FC}' => 'u',
        '\u{00FD}' | '\u{00FF}' => 'y',
        _ => return FALLBACK_ADVANCE,
    };
    ascii[base as usize - 0x20]
}

fn general_units(ch: char, bold: bool) -> u16 {
    match ch {
        '\u{2000}' | '\u{2002}' => 500,
        '\u{2001}' | '\u{2003}' | '\u{3000}' => 1000,
        '\u{2004}' => 333,
        '\u{2005}' => 250,
        '\u{2006}' => 167,
        '\u{2007}' => 556,
        '\u{2008}' | '\u{1680}' => 278,
        '\u{2009}' | '\u{202F}' => 200,
        '\u{200A}' => 100,
        '\u{205F}' => 222,
        '\u{2010}' | '\u{2011}' | '\u{058A}' => 333,
        '\u{2012}' | '\u{2013}' => 556,
        '\u{2014}' | '\u{2026}' | '\u{2030}' | '\u{2122}' => 1000,
        '\u{2018}' | '\u{2019}' | '\u{201A}' => {
            if bold {
                278
            } else {
                222
            }
        }
        '\u{201C}' | '\u{201D}' | '\u{201E}' => {
            if bold {
                500
            } else {
                333
            }
        }
        '\u{2020}' | '\u{2021}' | '\u{20AC}' => 556,
        '\u{2022}' => 350,
        '\u{2027}' => 278,
        '\u{2039}' | '\u{203A}' | '\u{1FFD}' => 333,
        c if is_wide(c) => WIDE_ADVANCE,
        c if c.is_whitespace() => 278,
        _ => FALLBACK_ADVANCE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn helvetica(size_px: f32) -> FontSpec {
        FontSpec::new(size_px, "Helvetica, Arial, sans-serif")
    }

    #[test]
    fn ascii_widths_follow_helvetica_afm() {
        assert_eq!(
            StandardFontMeasurer::advance_units('a', StandardFamily::Helvetica, false),
            556
        );
        assert_eq!(
            StandardFontMeasurer::advance_units('i', StandardFamily::Helvetica, false),
            222
        );
        assert_eq!(
            StandardFontMeasurer::advance_units('W', StandardFamily::Helvetica, false),
            944
        );
        assert_eq!(
            StandardFontMeasurer::advance_units('b', StandardFamily::Helvetica, true),
            611
        );
        assert_eq!(
            StandardFontMeasurer::advance_units('~', StandardFamily::Helvetica, false),
            584
        );
    }

    #[test]
    fn measures_scaled_widths() {
        let measurer = StandardFontMeasurer::new();
        // L(556) o(556) r(333) e(556) m(833) space(278) i(222) p(556) s(500) u(556) m(833)
        let w = measurer.measure_text_px("Lorem ipsum", &helvetica(14.0));
        assert!((w - 80.906).abs() < 1e-3, "{}", w);
        assert_eq!(measurer.measure_text_px("", &helvetica(14.0)), 0.0);
    }

    #[test]
    fn invisible_characters_have_no_width() {
        let measurer = StandardFontMeasurer::new();
        let font = helvetica(20.0);
        let plain = measurer.measure_text_px("consectetur", &font);
        let soft = measurer.measure_text_px("con\u{00AD}sec\u{200B}tetur", &font);
        assert_eq!(plain, soft);
    }

    #[test]
    fn latin1_letters_use_base_letter_widths() {
        let measurer = StandardFontMeasurer::new();
        let font = helvetica(10.0);
        assert_eq!(
            measurer.measure_text_px("über", &font),
            measurer.measure_text_px("uber", &font)
        );
    }

    #[test]
    fn monospace_stacks_use_courier() {
        let measurer = StandardFontMeasurer::new();
        let font = FontSpec::new(10.0, "'Courier New', monospace");
        assert_eq!(measurer.measure_text_px("iiii", &font), 24.0);
        assert_eq!(
            StandardFamily::for_font_family("ui-monospace, Menlo"),
            StandardFamily::Courier
        );
        assert_eq!(
            StandardFamily::for_font_family("Arial"),
            StandardFamily::Helvetica
        );
    }

    #[test]
    fn bold_weights_are_wider() {
        let measurer = StandardFontMeasurer::new();
        let regular = measurer.measure_text_px("bold text", &helvetica(16.0));
        let mut font = helvetica(16.0);
        font.weight = Some("bold".to_string());
        assert!(measurer.measure_text_px("bold text", &font) > regular);
    }

    #[test]
    fn rejects_non_finite_sizes() {
        let measurer = StandardFontMeasurer::new();
        assert!(measurer.check_font(&helvetica(f32::NAN)).is_err());
        assert!(measurer.check_font(&helvetica(-1.0)).is_err());
        assert!(measurer.check_font(&helvetica(0.0)).is_ok());
    }
}
