//! Line-break opportunity classes for a simplified UAX #14 subset.
//!
//! Only the classes the line engine acts on are recognized. Each class is
//! backed by a sorted static table so lookups are a binary search over a
//! handful of code points.
//!
//! See <http://www.unicode.org/reports/tr14/#Table1>.

/// Break opportunity carried by a single character.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BreakClass {
    /// No break opportunity.
    #[default]
    None,
    /// Break before and after (em dash).
    B2,
    /// Break after; the character is removed when the break is taken.
    BAI,
    /// Soft hyphen: invisible unless broken, then rendered as `-`.
    SHY,
    /// Break after; the character stays on the line above.
    BA,
    /// Break before; the character moves to the next line.
    BB,
    /// Mandatory break.
    BK,
}

impl BreakClass {
    /// Short class tag as used in UAX #14 tables.
    pub fn name(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::B2 => "B2",
            Self::BAI => "BAI",
            Self::SHY => "SHY",
            Self::BA => "BA",
            Self::BB => "BB",
            Self::BK => "BK",
        }
    }

    /// Whether the class offers any break opportunity.
    pub fn is_breakable(self) -> bool {
        !matches!(self, Self::None)
    }
}

// B2: break opportunity before and after.
static B2: &[char] = &['\u{2014}'];

// BA variant whose character is dropped at the break: spaces, tab, ZW space
// and the line/paragraph separators HTML does not interpret.
static BAI: &[char] = &[
    '\u{0009}', '\u{0020}', '\u{1680}', '\u{2000}', '\u{2001}', '\u{2002}', '\u{2003}', '\u{2004}',
    '\u{2005}', '\u{2006}', '\u{2008}', '\u{2009}', '\u{200A}', '\u{200B}', '\u{2028}', '\u{2029}',
    '\u{205F}', '\u{3000}',
];

static SHY: &[char] = &['\u{00AD}'];

// Hyphens, visible word dividers and historic word separators.
static BA: &[char] = &[
    '\u{007C}', '\u{058A}', '\u{05BE}', '\u{0F0B}', '\u{1361}', '\u{16EB}', '\u{16EC}', '\u{16ED}',
    '\u{17D8}', '\u{17DA}', '\u{2010}', '\u{2012}', '\u{2013}', '\u{2027}', '\u{2056}', '\u{2058}',
    '\u{2059}', '\u{205A}', '\u{205B}', '\u{205D}', '\u{205E}', '\u{2E19}', '\u{2E2A}', '\u{2E2B}',
    '\u{2E2C}', '\u{2E2D}', '\u{2E30}', '\u{10100}', '\u{10101}', '\u{10102}', '\u{1039F}',
    '\u{103D0}', '\u{1091F}', '\u{12470}',
];

static BB: &[char] = &['\u{00B4}', '\u{1FFD}'];

static BK: &[char] = &['\u{000A}'];

// Precedence is part of the contract: first match wins.
static CLASS_TABLES: [(BreakClass, &[char]); 6] = [
    (BreakClass::B2, B2),
    (BreakClass::BAI, BAI),
    (BreakClass::SHY, SHY),
    (BreakClass::BA, BA),
    (BreakClass::BB, BB),
    (BreakClass::BK, BK),
];

/// Classify a character into its break opportunity class.
pub fn classify(ch: char) -> BreakClass {
    CLASS_TABLES
        .iter()
        .find(|(_, table)| table.binary_search(&ch).is_ok())
        .map(|(class, _)| *class)
        .unwrap_or(BreakClass::None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_are_sorted_for_binary_search() {
        for (class, table) in CLASS_TABLES.iter() {
            assert!(
                table.windows(2).all(|w| w[0] < w[1]),
                "{} table must be strictly ascending",
                class.name()
            );
        }
    }

    #[test]
    fn known_characters_map_to_their_class() {
        assert_eq!(classify('\u{2014}'), BreakClass::B2);
        assert_eq!(classify(' '), BreakClass::BAI);
        assert_eq!(classify('\t'), BreakClass::BAI);
        assert_eq!(classify('\u{200B}'), BreakClass::BAI);
        assert_eq!(classify('\u{3000}'), BreakClass::BAI);
        assert_eq!(classify('\u{00AD}'), BreakClass::SHY);
        assert_eq!(classify('\u{2013}'), BreakClass::BA);
        assert_eq!(classify('|'), BreakClass::BA);
        assert_eq!(classify('\u{10101}'), BreakClass::BA);
        assert_eq!(classify('\u{00B4}'), BreakClass::BB);
        assert_eq!(classify('\n'), BreakClass::BK);
    }

    #[test]
    fn unclassified_characters_have_no_break() {
        for ch in ['a', 'Z', '0', '-', '.', ',', '\u{00A0}', '\u{2007}', '\r', '\u{1F600}'] {
            assert_eq!(classify(ch), BreakClass::None, "{:?}", ch);
        }
    }

    #[test]
    fn classification_is_stable_across_calls() {
        let sample = "Lo\u{00AD}rem ip\u{2014}sum\u{2013}do|lor\n\u{00B4}";
        let first: Vec<BreakClass> = sample.chars().map(classify).collect();
        for _ in 0..3 {
            let again: Vec<BreakClass> = sample.chars().map(classify).collect();
            assert_eq!(first, again);
        }
    }

    #[test]
    fn only_none_is_unbreakable() {
        assert!(!BreakClass::None.is_breakable());
        for (class, _) in CLASS_TABLES.iter() {
            assert!(class.is_breakable());
        }
    }
}
