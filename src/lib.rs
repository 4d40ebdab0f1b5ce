//! Browser-style text measurement and line wrapping without a layout pass.
//!
//! Given a text and font/box styles, `text-metrics` computes the rendered
//! width, the wrapped line breakdown, the rendered height and the largest font
//! size that fits a box. Line breaking follows a subset of Unicode line-break
//! classes (spaces, hyphens, soft hyphens, em dashes, mandatory breaks) with a
//! word-preserving default strategy and `word-break: break-all`.
//!
//! ```
//! use text_metrics::{MetricsOptions, StyleMap, TextMetrics};
//!
//! let metrics = TextMetrics::from_options(
//!     StyleMap::new()
//!         .with("fontSize", "14px")
//!         .with("lineHeight", "20px"),
//! );
//! let options = MetricsOptions::default().with_width(100.0);
//! let lines = metrics
//!     .lines(Some("Lorem ipsum dolor sit amet"), &options, &StyleMap::new())
//!     .unwrap();
//! assert_eq!(lines, ["Lorem ipsum", "dolor sit amet"]);
//! ```
//!
//! Widths come from a [`TextMeasurer`]. The default [`StandardFontMeasurer`]
//! uses Helvetica and Courier advance widths; plug in a real shaper with
//! [`TextMetrics::with_text_measurer`].

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

mod break_class;
mod error;
mod lines;
mod measure;
mod metrics;
mod spacing;
mod standard_font;
mod style;

pub use break_class::{classify, BreakClass};
pub use error::MetricsError;
pub use lines::{
    compute_lines_break_all, compute_lines_default, line_width, resolve_split, LineBreakCandidate,
    LineEngine, SplitOutcome, WrapStrategy, RENDERED_HYPHEN,
};
pub use measure::{
    FontSpec, MeasureContext, TextMeasurer, DEFAULT_FONT_FAMILY, DEFAULT_FONT_SIZE,
    DEFAULT_FONT_WEIGHT,
};
pub use metrics::{line_height_px, MetricsOptions, TextMetrics, MAX_FONT_SIZE_PX, NORMAL_LINE_HEIGHT};
pub use spacing::{px_value, SpacingModel, DEFAULT_BASE_FONT_SIZE_PX};
pub use standard_font::{StandardFamily, StandardFontMeasurer};
pub use style::{
    font_spec, has_entity_reference, normalize_key, prepare_text, styled_text, StyleElement,
    StyleLookup, StyleMap, StyleSource,
};
