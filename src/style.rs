//! Style resolution for text measurement.
//!
//! Styles come either from an element handle ([`StyleElement`]) or from an
//! inline option map ([`StyleMap`]). A [`StyleLookup`] layers overwrite maps
//! on top of that source; the first non-empty value wins.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use smallvec::SmallVec;

use crate::error::MetricsError;
use crate::measure::{
    FontSpec, DEFAULT_FONT_FAMILY, DEFAULT_FONT_SIZE, DEFAULT_FONT_WEIGHT, FONT_STYLES,
    FONT_VARIANTS, FONT_WEIGHTS,
};
use crate::spacing::{px_value, SpacingModel, DEFAULT_BASE_FONT_SIZE_PX};

/// Style property map with CSS (kebab-case) keys.
///
/// Keys given in camelCase (`fontSize`) are stored as `font-size`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StyleMap {
    entries: BTreeMap<String, String>,
}

impl StyleMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        self.entries.insert(normalize_key(key), value.into());
    }

    /// Raw value for `key` (camelCase or kebab-case).
    pub fn get(&self, key: &str) -> Option<&str> {
        match self.entries.get(key) {
            Some(value) => Some(value.as_str()),
            None => self.entries.get(&normalize_key(key)).map(String::as_str),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }


    /// Decode a JSON object such as `{"fontSize": "14px", "width": 100}`.
    pub fn from_json_str(json: &str) -> Result<Self, MetricsError> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_json_value(&value)
    }

    /// Decode a JSON object value.
    ///
    /// Strings are kept as-is, numbers are stringified (`14` reads as `14px`
    /// where a length is expected), `null` entries are skipped.
    pub fn from_json_value(value: &Value) -> Result<Self, MetricsError> {
        let Value::Object(object) = value else {
            return Err(MetricsError::InvalidOptions {
                message: format!("expected an object, found {}", json_kind(value)),
            });
        };
        let mut map = Self::new();
        for (key, value) in object {
            match value {
                Value::Null => {}
                Value::String(s) => map.insert(key, s.clone()),
                Value::Number(n) => map.insert(key, n.to_string()),
                Value::Bool(b) => map.insert(key, b.to_string()),
                other => {
                    return Err(MetricsError::InvalidOptions {
                        message: format!(
                            "option '{}' must be a scalar, found {}",
                            key,
                            json_kind(other)
                        ),
                    })
                }
            }
        }
        Ok(map)
    }
}

impl<K, V> FromIterator<(K, V)> for StyleMap
where
    K: AsRef<str>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.insert(key.as_ref(), value);
        }
        map
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// `fontSize` -> `font-size`. Kebab-case keys pass through unchanged.
pub fn normalize_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for ch in key.chars() {
        if ch.is_ascii_uppercase() {
            out.push('-');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Element handle able to report computed styles.
pub trait StyleElement: Send + Sync {
    /// Computed value of a CSS property, `None` when unset.
    fn property_value(&self, property: &str) -> Option<String>;

    /// Rendered text content of the element.
    fn text_content(&self) -> Option<String> {
        None
    }

    /// Laid-out width of the element in pixels.
    fn offset_width(&self) -> Option<f32> {
        None
    }
}

/// Where base styles come from.
#[derive(Clone)]
pub enum StyleSource {
    Element(Arc<dyn StyleElement>),
    Inline(StyleMap),
}

impl StyleSource {
    pub fn property_value(&self, property: &str) -> Option<String> {
        match self {
            Self::Element(element) => element.property_value(property),
            Self::Inline(map) => map.get(property).map(str::to_string),
        }
    }

    pub fn text_content(&self) -> Option<String> {
        match self {
            Self::Element(element) => element.text_content(),
            Self::Inline(_) => None,
        }
    }

    pub fn offset_width(&self) -> Option<f32> {
        match self {
            Self::Element(element) => element.offset_width(),
            Self::Inline(_) => None,
        }
    }
}

impl Default for StyleSource {
    fn default() -> Self {
        Self::Inline(StyleMap::new())
    }
}

impl fmt::Debug for StyleSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Element(_) => f.write_str("Element(..)"),
            Self::Inline(map) => f.debug_tuple("Inline").field(map).finish(),
        }
    }
}

/// Layered style lookup: overwrite maps first, then the style source.
#[derive(Clone, Debug)]
pub struct StyleLookup<'a> {
    layers: SmallVec<[&'a StyleMap; 2]>,
    source: &'a StyleSource,
}

impl<'a> StyleLookup<'a> {
    pub fn new(source: &'a StyleSource) -> Self {
        Self {
            layers: SmallVec::new(),
            source,
        }
    }

    /// Add an overwrite layer below the layers already present.
    pub fn with_overwrites(mut self, overwrites: &'a StyleMap) -> Self {
        if !overwrites.is_empty() {
            self.layers.push(overwrites);
        }
        self
    }

    pub fn source(&self) -> &'a StyleSource {
        self.source
    }

    /// Value from the overwrite layers only.
    pub fn overwrite(&self, key: &str) -> Option<&'a str> {
        self.layers
            .iter()
            .copied()
            .filter_map(|layer| layer.get(key))
            .map(str::trim)
            .find(|value| !value.is_empty())
    }

    /// First non-empty value for `key`.
    pub fn get(&self, key: &str) -> Option<String> {
        if let Some(value) = self.overwrite(key) {
            return Some(value.to_string());
        }
        self.source
            .property_value(key)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    pub fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    /// Base size for `em`/`rem` lengths.
    pub fn base_font_size_px(&self) -> Result<f32, MetricsError> {
        match self.get("base-font-size") {
            Some(value) => px_value(&value, DEFAULT_BASE_FONT_SIZE_PX),
            None => Ok(DEFAULT_BASE_FONT_SIZE_PX),
        }
    }

    /// Spacing model from `word-spacing` and `letter-spacing`.
    pub fn spacing(&self) -> Result<SpacingModel, MetricsError> {
        SpacingModel::with_base_font_size(
            &self.get("word-spacing").unwrap_or_default(),
            &self.get("letter-spacing").unwrap_or_default(),
            self.base_font_size_px()?,
        )
    }
}

/// Assemble the measurement font from a style lookup.
///
/// A `font` overwrite is parsed as a shorthand and wins over the individual
/// properties. Weight, style and variant outside their keyword sets are
/// dropped from the font.
pub fn font_spec(lookup: &StyleLookup<'_>) -> Result<FontSpec, MetricsError> {
    if let Some(font) = lookup.overwrite("font") {
        return FontSpec::parse(font);
    }
    let base = lookup.base_font_size_px()?;

    let weight = lookup.get_or("font-weight", DEFAULT_FONT_WEIGHT);
    let weight = if FONT_WEIGHTS.contains(&weight.as_str()) {
        Some(weight)
    } else {
        log::warn!("font-weight '{}' is not supported; dropped from font", weight);
        None
    };
    let style = lookup
        .get("font-style")
        .filter(|style| FONT_STYLES.contains(&style.as_str()));
    let variant = lookup
        .get("font-variant")
        .filter(|variant| FONT_VARIANTS.contains(&variant.as_str()));
    let size_px = px_value(&lookup.get_or("font-size", DEFAULT_FONT_SIZE), base)?;
    let family = lookup.get_or("font-family", DEFAULT_FONT_FAMILY);

    Ok(FontSpec {
        weight,
        style,
        variant,
        size_px,
        family,
    })
}

/// Apply a CSS `text-transform` value.
pub fn styled_text(text: &str, transform: Option<&str>) -> String {
    match transform.map(str::trim) {
        Some("uppercase") => text.to_uppercase(),
        Some("lowercase") => text.to_lowercase(),
        Some("capitalize") => capitalize_words(text),
        _ => text.to_string(),
    }
}

fn capitalize_words(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for ch in text.chars() {
        if at_word_start && ch.is_alphabetic() {
            out.extend(ch.to_uppercase());
        } else {
            out.push(ch);
        }
        at_word_start = ch.is_whitespace();
    }
    out
}

// Markup shortcuts understood before entity decoding, matched ASCII
// case-insensitively.
const ENTITY_SHORTCUTS: &[(&str, char)] = &[
    ("&shy;", '\u{00AD}'),
    ("&mdash;", '\u{2014}'),
    ("&ndash;", '\u{2013}'),
    ("&nbsp;", '\u{00A0}'),
];

/// Normalize text before measuring.
///
/// `<wbr>` becomes a zero width space, `<br>` a line feed, `&shy;`,
/// `&mdash;`, `&ndash;`, `&nbsp;` their characters; predefined XML and numeric
/// character references are decoded. Unknown references are kept as written.
/// The result is trimmed.
pub fn prepare_text(text: &str) -> String {
    let replaced = replace_markup(text);
    let decoded = if has_entity_reference(&replaced) {
        decode_entities(&replaced)
    } else {
        replaced
    };
    decoded.trim().to_string()
}

// Decode each reference on its own so one unknown name does not keep the
// others from decoding.
fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        let Some(len) = entity_len(rest.as_bytes()) else {
            out.push('&');
            rest = &rest[1..];
            continue;
        };
        let reference = &rest[..len];
        match quick_xml::escape::unescape_with(
            reference,
            quick_xml::escape::resolve_predefined_entity,
        ) {
            Ok(decoded) => out.push_str(&decoded),
            Err(err) => {
                log::warn!("Keeping unresolved entity {} verbatim: {}", reference, err);
                out.push_str(reference);
            }
        }
        rest = &rest[len..];
    }
    out.push_str(rest);
    out
}

fn replace_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find(['<', '&']) {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        if let Some((ch, len)) = match_markup(rest) {
            out.push(ch);
            rest = &rest[len..];
        } else {
            // '<' and '&' are single bytes.
            out.push_str(&rest[..1]);
            rest = &rest[1..];
        }
    }
    out.push_str(rest);
    out
}

fn match_markup(text: &str) -> Option<(char, usize)> {
    if text.starts_with('&') {
        return ENTITY_SHORTCUTS
            .iter()
            .find(|(entity, _)| starts_with_ignore_case(text, entity))
            .map(|(entity, ch)| (*ch, entity.len()));
    }
    if starts_with_ignore_case(text, "<wbr>") {
        return Some(('\u{200B}', "<wbr>".len()));
    }
    if starts_with_ignore_case(text, "<br") {
        let after = &text[3..];
        let tag_rest = after.trim_start();
        let tag_rest = tag_rest.strip_prefix('/').unwrap_or(tag_rest);
        if tag_rest.starts_with('>') {
            let len = text.len() - tag_rest.len() + 1;
            return Some(('\n', len));
        }
    }
    None
}

fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
    text.len() >= prefix.len()
        && text.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}

/// Whether `text` contains something shaped like `&name;`, `&#123;` or `&#x1F;`.
pub fn has_entity_reference(text: &str) -> bool {
    let bytes = text.as_bytes();
    (0..bytes.len()).any(|idx| entity_len(&bytes[idx..]).is_some())
}

// Length of the reference at the start of `bytes`, `;` included.
fn entity_len(bytes: &[u8]) -> Option<usize> {
    let body = bytes.strip_prefix(b"&")?;
    let hash = usize::from(body.first() == Some(&b'#'));
    let name = body[hash..]
        .iter()
        .take_while(|b| b.is_ascii_alphanumeric())
        .count();
    (name > 0 && body.get(hash + name) == Some(&b';')).then_some(hash + name + 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeElement {
        styles: StyleMap,
        text: Option<String>,
        width: Option<f32>,
    }

    impl StyleElement for FakeElement {
        fn property_value(&self, property: &str) -> Option<String> {
            self.styles.get(property).map(str::to_string)
        }

        fn text_content(&self) -> Option<String> {
            self.text.clone()
        }

        fn offset_width(&self) -> Option<f32> {
            self.width
        }
    }

    #[test]
    fn camel_case_keys_are_normalized() {
        let map = StyleMap::new()
            .with("fontSize", "14px")
            .with("line-height", "20px");
        assert_eq!(map.get("font-size"), Some("14px"));
        assert_eq!(map.get("fontSize"), Some("14px"));
        assert_eq!(map.get("lineHeight"), Some("20px"));
        assert_eq!(normalize_key("letterSpacing"), "letter-spacing");
        assert_eq!(normalize_key("word-break"), "word-break");
    }

    #[test]
    fn decodes_json_option_maps() {
        let map =
            StyleMap::from_json_str(r#"{"fontSize": "14px", "width": 100, "fontStyle": null}"#)
                .unwrap();
        assert_eq!(map.get("font-size"), Some("14px"));
        assert_eq!(map.get("width"), Some("100"));
        assert_eq!(map.get("font-style"), None);
        assert_eq!(map.len(), 2);

        let err = StyleMap::from_json_str("[1, 2]").unwrap_err();
        assert_eq!(err.code(), "INVALID_OPTIONS");
        let err = StyleMap::from_json_str(r#"{"font": {"size": 1}}"#).unwrap_err();
        assert_eq!(err.code(), "INVALID_OPTIONS");
    }

    #[test]
    fn overwrite_layers_take_precedence_over_source() {
        let source = StyleSource::Inline(StyleMap::new().with("font-size", "12px"));
        let call = StyleMap::new().with("font-size", "20px");
        let ctor = StyleMap::new()
            .with("font-size", "14px")
            .with("font-family", "Georgia");

        let lookup = StyleLookup::new(&source)
            .with_overwrites(&call)
            .with_overwrites(&ctor);
        assert_eq!(lookup.get("font-size").as_deref(), Some("20px"));
        assert_eq!(lookup.get("font-family").as_deref(), Some("Georgia"));

        let lookup = StyleLookup::new(&source).with_overwrites(&ctor);
        assert_eq!(lookup.get("font-size").as_deref(), Some("14px"));
        let lookup = StyleLookup::new(&source);
        assert_eq!(lookup.get("font-size").as_deref(), Some("12px"));
        assert_eq!(lookup.get("font-family"), None);
    }

    #[test]
    fn empty_values_count_as_absent() {
        let source = StyleSource::Inline(StyleMap::new().with("font-size", "12px"));
        let call = StyleMap::new().with("font-size", "  ");
        let lookup = StyleLookup::new(&source).with_overwrites(&call);
        assert_eq!(lookup.get("font-size").as_deref(), Some("12px"));
    }

    #[test]
    fn element_source_reports_styles_text_and_width() {
        let element = FakeElement {
            styles: StyleMap::new().with("font-weight", "bold"),
            text: Some("  hello ".to_string()),
            width: Some(240.0),
        };
        let source = StyleSource::Element(Arc::new(element));
        assert_eq!(source.property_value("font-weight").as_deref(), Some("bold"));
        assert_eq!(source.text_content().as_deref(), Some("  hello "));
        assert_eq!(source.offset_width(), Some(240.0));
        assert_eq!(StyleSource::default().offset_width(), None);
    }

    #[test]
    fn font_spec_uses_defaults() {
        let source = StyleSource::default();
        let font = font_spec(&StyleLookup::new(&source)).unwrap();
        assert_eq!(font.to_string(), "400 16px Helvetica, Arial, sans-serif");
    }

    #[test]
    fn font_spec_filters_keywords() {
        let source = StyleSource::Inline(
            StyleMap::new()
                .with("font-weight", "heavy")
                .with("font-style", "italic")
                .with("font-variant", "all-caps")
                .with("font-size", "1.5em")
                .with("font-family", "Georgia, serif"),
        );
        let font = font_spec(&StyleLookup::new(&source)).unwrap();
        assert_eq!(font.weight, None);
        assert_eq!(font.style.as_deref(), Some("italic"));
        assert_eq!(font.variant, None);
        assert_eq!(font.size_px, 24.0);
        assert_eq!(font.to_string(), "italic 24px Georgia, serif");
    }

    #[test]
    fn font_overwrite_wins_over_properties() {
        let source = StyleSource::Inline(StyleMap::new().with("font-size", "12px"));
        let call = StyleMap::new().with("font", "bold 20px Courier");
        let font = font_spec(&StyleLookup::new(&source).with_overwrites(&call)).unwrap();
        assert_eq!(font.size_px, 20.0);
        assert_eq!(font.family, "Courier");
        assert_eq!(font.weight.as_deref(), Some("bold"));
    }

    #[test]
    fn em_font_size_uses_base_font_size() {
        let source = StyleSource::Inline(
            StyleMap::new()
                .with("font-size", "2em")
                .with("base-font-size", "10px"),
        );
        let font = font_spec(&StyleLookup::new(&source)).unwrap();
        assert_eq!(font.size_px, 20.0);

        let source = StyleSource::Inline(StyleMap::new().with("font-size", "2vh"));
        let err = font_spec(&StyleLookup::new(&source)).unwrap_err();
        assert_eq!(err.code(), "UNSUPPORTED_UNIT");
    }

    #[test]
    fn text_transform() {
        assert_eq!(styled_text("Hello World", Some("uppercase")), "HELLO WORLD");
        assert_eq!(styled_text("Hello World", Some("lowercase")), "hello world");
        assert_eq!(
            styled_text("hello big\u{00AD}world", Some("capitalize")),
            "Hello Big\u{00AD}world"
        );
        assert_eq!(styled_text("Hello", Some("none")), "Hello");
        assert_eq!(styled_text("Hello", None), "Hello");
    }

    #[test]
    fn prepare_text_replaces_markup_shortcuts() {
        assert_eq!(prepare_text("a<wbr>b"), "a\u{200B}b");
        assert_eq!(prepare_text("a<WBR>b"), "a\u{200B}b");
        assert_eq!(prepare_text("a<br>b<br/>c<BR />d"), "a\nb\nc\nd");
        assert_eq!(prepare_text("con&shy;sec"), "con\u{00AD}sec");
        assert_eq!(prepare_text("a&mdash;b&NDASH;c"), "a\u{2014}b\u{2013}c");
        assert_eq!(prepare_text("  padded \n"), "padded");
    }

    #[test]
    fn prepare_text_decodes_character_references() {
        assert_eq!(prepare_text("Tom &amp; Jerry"), "Tom & Jerry");
        assert_eq!(prepare_text("&#65;&#x42;"), "AB");
        // A bare ampersand is not an entity.
        assert_eq!(prepare_text("Tom & Jerry"), "Tom & Jerry");
        // Unknown entities are kept verbatim without blocking known ones.
        assert_eq!(prepare_text("a &hellip; b"), "a &hellip; b");
        assert_eq!(
            prepare_text("a &hellip; &amp; &#65; &lt;b&gt;"),
            "a &hellip; & A <b>"
        );
        assert_eq!(prepare_text("&#xZZ; &amp;"), "&#xZZ; &");
        // Unrelated tags are kept.
        assert_eq!(prepare_text("<bro>"), "<bro>");
    }

    #[test]
    fn detects_entity_references() {
        assert!(has_entity_reference("&hellip;"));
        assert!(has_entity_reference("x &#123; y"));
        assert!(has_entity_reference("&#x1F;"));
        assert!(!has_entity_reference("R&D"));
        assert!(!has_entity_reference("& ;"));
    }
}
