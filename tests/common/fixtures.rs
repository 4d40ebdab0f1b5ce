use text_metrics::{FontSpec, StyleMap, TextMeasurer, TextMetrics};

pub const LOREM: &str = "Lorem ipsum dolor sit amet, consectetur adipisicing elit. \
                         Aliquam atque cum dolor explicabo incidunt.";

pub const LOREM_LINES_100PX: &[&str] = &[
    "Lorem ipsum",
    "dolor sit amet,",
    "consectetur",
    "adipisicing elit.",
    "Aliquam atque",
    "cum dolor",
    "explicabo",
    "incidunt.",
];

pub const FISH: &str = "Von Kabeljau über Lachs und Thunfisch bis hin zu Zander \u{2013} \
                        unsere Fisch-Vielfalt wird Sie begeistern. Bestimmt!";

/// `14px Helvetica, Arial, sans-serif`, weight 400, 20px line height.
pub fn lorem_styles() -> StyleMap {
    StyleMap::new()
        .with("fontSize", "14px")
        .with("fontWeight", "400")
        .with("fontFamily", "Helvetica, Arial, sans-serif")
        .with("lineHeight", "20px")
}

pub fn lorem_metrics() -> TextMetrics {
    TextMetrics::from_options(lorem_styles())
}

/// Every visible code point is `advance` pixels wide.
pub struct FixedWidthMeasurer {
    pub advance: f32,
}

impl TextMeasurer for FixedWidthMeasurer {
    fn measure_text_px(&self, text: &str, _font: &FontSpec) -> f32 {
        text.chars()
            .filter(|ch| !matches!(ch, '\u{00AD}' | '\u{200B}'))
            .count() as f32
            * self.advance
    }
}

const WORDS: &[&str] = &[
    "lorem", "ipsum", "dolor", "sit", "amet", "con\u{00AD}sec\u{00AD}te\u{00AD}tur", "adi",
    "pisicing", "well\u{2013}known", "elit\u{2014}sed", "do", "eius\u{00AD}mod", "tempor",
    "in\u{00AD}ci\u{00AD}di\u{00AD}dunt", "ut", "labore", "et", "dolore", "magna",
];

/// Deterministic paragraph of `words` words drawn from a fixed vocabulary.
pub fn paragraph(seed: u64, words: usize) -> String {
    let mut state = seed;
    let mut out = String::new();
    for idx in 0..words {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        if idx > 0 {
            out.push(if (state >> 60) == 0 { '\n' } else { ' ' });
        }
        out.push_str(WORDS[((state >> 33) % WORDS.len() as u64) as usize]);
    }
    out
}
