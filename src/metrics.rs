//! Width, height, line breakdown and max font size for a styled text.
//!
//! [`TextMetrics`] binds a style source (element handle or inline option
//! map), constructor overwrites and a measurement oracle. Every call resolves
//! its own style lookup and measurement context; nothing is cached between
//! calls.

use std::sync::Arc;

use serde::Deserialize;

use crate::error::MetricsError;
use crate::lines::{line_width, LineEngine, WrapStrategy};
use crate::measure::{FontSpec, MeasureContext, TextMeasurer};
use crate::spacing::{px_value, SpacingModel};
use crate::standard_font::StandardFontMeasurer;
use crate::style::{
    font_spec, prepare_text, styled_text, StyleElement, StyleLookup, StyleMap, StyleSource,
};

/// Upper bound for the ascending font-size search.
pub const MAX_FONT_SIZE_PX: u32 = 4096;

/// `line-height: normal` as a multiple of the font size.
pub const NORMAL_LINE_HEIGHT: f32 = 1.2;

/// Per-call options.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct MetricsOptions {
    /// Line width budget in pixels; overrides every style source.
    pub width: Option<f32>,
    /// Report the widest wrapped line instead of the single-run width.
    pub multiline: bool,
}

impl MetricsOptions {
    pub fn with_width(mut self, width: f32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn with_multiline(mut self, multiline: bool) -> Self {
        self.multiline = multiline;
        self
    }

    /// Decode options such as `{"width": 100, "multiline": true}`.
    pub fn from_json_str(json: &str) -> Result<Self, MetricsError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Everything one facade call needs, resolved once.
struct CallContext<'a> {
    lookup: StyleLookup<'a>,
    font: FontSpec,
    spacing: SpacingModel,
    text: String,
}

/// Text metrics calculator.
#[derive(Clone)]
pub struct TextMetrics {
    source: StyleSource,
    overwrites: StyleMap,
    measurer: Arc<dyn TextMeasurer>,
}

impl TextMetrics {
    /// Calculator over an explicit style source and constructor overwrites,
    /// measuring with [`StandardFontMeasurer`].
    pub fn new(source: StyleSource, overwrites: StyleMap) -> Self {
        Self {
            source,
            overwrites,
            measurer: Arc::new(StandardFontMeasurer::new()),
        }
    }

    /// Calculator driven by an inline option map only.
    pub fn from_options(options: StyleMap) -> Self {
        Self::new(StyleSource::Inline(options), StyleMap::new())
    }

    /// Calculator reading computed styles from an element.
    pub fn from_element(element: Arc<dyn StyleElement>, overwrites: StyleMap) -> Self {
        Self::new(StyleSource::Element(element), overwrites)
    }

    /// Replace the measurement oracle.
    pub fn with_text_measurer(mut self, measurer: Arc<dyn TextMeasurer>) -> Self {
        self.measurer = measurer;
        self
    }

    /// Font resolved from the constructor overwrites and the style source.
    pub fn font(&self) -> Result<FontSpec, MetricsError> {
        font_spec(&StyleLookup::new(&self.source).with_overwrites(&self.overwrites))
    }

    fn prepare<'a>(
        &'a self,
        text: Option<&str>,
        overwrites: &'a StyleMap,
    ) -> Result<CallContext<'a>, MetricsError> {
        let lookup = StyleLookup::new(&self.source)
            .with_overwrites(overwrites)
            .with_overwrites(&self.overwrites);
        let font = font_spec(&lookup)?;
        let spacing = lookup.spacing()?;

        let raw = match text {
            Some(text) if !text.is_empty() => text.to_string(),
            _ => self.source.text_content().unwrap_or_default(),
        };
        let text = styled_text(
            &prepare_text(&raw),
            lookup.get("text-transform").as_deref(),
        );
        Ok(CallContext {
            lookup,
            font,
            spacing,
            text,
        })
    }

    /// Width budget: options, then the call's `width` overwrite, then the
    /// element's laid-out width, then the `width` style.
    fn width_budget(
        &self,
        call: &CallContext<'_>,
        options: &MetricsOptions,
        overwrites: &StyleMap,
    ) -> Result<Option<f32>, MetricsError> {
        if let Some(width) = options.width {
            return Ok(Some(width));
        }
        let base = call.lookup.base_font_size_px()?;
        if let Some(width) = overwrites.get("width").filter(|w| is_length(w)) {
            return px_value(width, base).map(Some);
        }
        if let Some(width) = self.source.offset_width().filter(|w| *w > 0.0) {
            return Ok(Some(width));
        }
        match call.lookup.get("width") {
            Some(width) if is_length(&width) => px_value(&width, base).map(Some),
            _ => Ok(None),
        }
    }

    fn wrap(
        &self,
        call: &CallContext<'_>,
        font: &FontSpec,
        max: Option<f32>,
    ) -> Result<Vec<String>, MetricsError> {
        let ctx = MeasureContext::new(self.measurer.as_ref(), font)?;
        let strategy = call
            .lookup
            .get("word-break")
            .map(|value| WrapStrategy::from_word_break(&value))
            .unwrap_or_default();
        log::debug!(
            "wrapping {} chars with {:?} strategy, font '{}', max {:?}",
            call.text.chars().count(),
            strategy,
            font,
            max
        );
        LineEngine::new(ctx)
            .with_spacing(call.spacing)
            .with_strategy(strategy)
            .compute_lines(&call.text, max.unwrap_or(f32::INFINITY))
    }

    fn width_with_font(
        &self,
        call: &CallContext<'_>,
        font: &FontSpec,
        options: &MetricsOptions,
        max: Option<f32>,
    ) -> Result<f32, MetricsError> {
        let ctx = MeasureContext::new(self.measurer.as_ref(), font)?;
        if options.multiline {
            let widest = self
                .wrap(call, font, max)?
                .iter()
                .map(|line| line_width(&ctx, &call.spacing, line))
                .fold(0.0, f32::max);
            return Ok(widest);
        }
        Ok(line_width(&ctx, &call.spacing, &call.text))
    }

    /// Rendered width of `text` in pixels.
    ///
    /// With `options.multiline` this is the widest wrapped line. When `text`
    /// is `None` or empty the element's text content is used.
    pub fn width(
        &self,
        text: Option<&str>,
        options: &MetricsOptions,
        overwrites: &StyleMap,
    ) -> Result<f32, MetricsError> {
        let call = self.prepare(text, overwrites)?;
        let max = if options.multiline {
            self.width_budget(&call, options, overwrites)?
        } else {
            None
        };
        self.width_with_font(&call, &call.font, options, max)
    }

    /// Wrapped lines of `text`.
    pub fn lines(
        &self,
        text: Option<&str>,
        options: &MetricsOptions,
        overwrites: &StyleMap,
    ) -> Result<Vec<String>, MetricsError> {
        let call = self.prepare(text, overwrites)?;
        let max = self.width_budget(&call, options, overwrites)?;
        self.wrap(&call, &call.font, max)
    }

    /// Rendered height: `ceil(line count * line height)`.
    pub fn height(
        &self,
        text: Option<&str>,
        options: &MetricsOptions,
        overwrites: &StyleMap,
    ) -> Result<f32, MetricsError> {
        let call = self.prepare(text, overwrites)?;
        let max = self.width_budget(&call, options, overwrites)?;
        let lines = self.wrap(&call, &call.font, max)?;
        if lines.is_empty() {
            return Ok(0.0);
        }
        let line_height = line_height_px(&call.lookup, &call.font)?;
        Ok((lines.len() as f32 * line_height).ceil())
    }

    /// Largest integer font size (as `"<n>px"`) at which `text` fits the
    /// width budget minus horizontal padding.
    ///
    /// Returns `None` when no budget resolves, the budget is not positive
    /// after padding, or the text has no measurable width.
    pub fn max_font_size(
        &self,
        text: Option<&str>,
        options: &MetricsOptions,
        overwrites: &StyleMap,
    ) -> Result<Option<String>, MetricsError> {
        let call = self.prepare(text, overwrites)?;
        let Some(budget) = self.width_budget(&call, options, overwrites)? else {
            return Ok(None);
        };
        let base = call.lookup.base_font_size_px()?;
        let mut max = budget;
        for side in ["padding-left", "padding-right"] {
            if let Some(padding) = call.lookup.get(side) {
                max -= px_value(&padding, base)?;
            }
        }
        if max.is_nan() || max <= 0.0 {
            return Ok(None);
        }

        let size = search_font_size(max, |size| {
            let font = call.font.clone().with_size_px(size as f32);
            self.width_with_font(&call, &font, options, Some(max))
        })?;
        log::debug!("max font size for budget {}px: {:?}", max, size);
        Ok(size.map(|size| format!("{}px", size)))
    }
}

impl core::fmt::Debug for TextMetrics {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TextMetrics")
            .field("source", &self.source)
            .field("overwrites", &self.overwrites)
            .finish_non_exhaustive()
    }
}

/// Probe at half the budget, extrapolate linearly, then step one pixel at a
/// time to the largest size whose width stays within `max`.
fn search_font_size<F>(max: f32, mut width_at: F) -> Result<Option<u32>, MetricsError>
where
    F: FnMut(u32) -> Result<f32, MetricsError>,
{
    let mut size = ((max / 2.0).floor() as u32).clamp(1, MAX_FONT_SIZE_PX);
    let first = width_at(size)?;
    if first.is_nan() || first <= 0.0 {
        return Ok(None);
    }

    size = ((size as f32 / first * max).floor() as u32).min(MAX_FONT_SIZE_PX);
    let mut current = width_at(size)?;

    if current > max {
        while current > max && size > 0 {
            size -= 1;
            current = width_at(size)?;
        }
        return Ok(Some(size));
    }

    while size < MAX_FONT_SIZE_PX {
        if width_at(size + 1)? > max {
            break;
        }
        size += 1;
    }
    Ok(Some(size))
}

/// Line height in pixels: a length, a unitless multiple of the font size, or
/// `normal`.
pub fn line_height_px(lookup: &StyleLookup<'_>, font: &FontSpec) -> Result<f32, MetricsError> {
    let Some(value) = lookup.get("line-height") else {
        return Ok(font.size_px * NORMAL_LINE_HEIGHT);
    };
    if value.eq_ignore_ascii_case("normal") {
        return Ok(font.size_px * NORMAL_LINE_HEIGHT);
    }
    if let Ok(multiple) = value.parse::<f32>() {
        return Ok(font.size_px * multiple);
    }
    px_value(&value, lookup.base_font_size_px()?)
}

// Keywords such as `auto` leave the width budget unresolved.
fn is_length(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "" | "auto" | "none" | "initial" | "inherit" | "unset" | "max-content" | "min-content"
            | "fit-content"
    )
}
