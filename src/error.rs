//! Error type shared by every text-metrics operation.

use core::fmt;

use crate::break_class::BreakClass;

/// Errors surfaced by measurement, wrapping and option parsing.
#[derive(Clone, Debug, PartialEq)]
pub enum MetricsError {
    /// A CSS length used a unit outside `px`, `pt`, `em`, `rem`.
    UnsupportedUnit {
        /// Raw length value as supplied.
        value: String,
        /// Unit suffix that was not recognized.
        unit: String,
    },
    /// The line engine met a break candidate whose class it cannot split on.
    ///
    /// This is an internal consistency defect, never a user error.
    UndefinedBreak { class: BreakClass },
    /// The measurement oracle cannot serve the requested font.
    MeasurementUnavailable {
        /// Font specification that was requested.
        font: String,
        /// Backend-provided reason.
        reason: &'static str,
    },
    /// An option map could not be decoded.
    InvalidOptions { message: String },
}

impl MetricsError {
    pub(crate) fn unsupported_unit(value: &str, unit: &str) -> Self {
        Self::UnsupportedUnit {
            value: value.to_string(),
            unit: unit.to_string(),
        }
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnsupportedUnit { .. } => "UNSUPPORTED_UNIT",
            Self::UndefinedBreak { .. } => "UNDEFINED_BREAK",
            Self::MeasurementUnavailable { .. } => "MEASUREMENT_UNAVAILABLE",
            Self::InvalidOptions { .. } => "INVALID_OPTIONS",
        }
    }
}

impl fmt::Display for MetricsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedUnit { value, unit } => {
                write!(f, "the unit '{}' is not supported (value={})", unit, value)
            }
            Self::UndefinedBreak { class } => {
                write!(f, "undefined break for class {}", class.name())
            }
            Self::MeasurementUnavailable { font, reason } => {
                write!(f, "text measurement unavailable for '{}': {}", font, reason)
            }
            Self::InvalidOptions { message } => write!(f, "invalid options: {}", message),
        }
    }
}

impl std::error::Error for MetricsError {}

impl From<serde_json::Error> for MetricsError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidOptions {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_unit_and_value() {
        let err = MetricsError::unsupported_unit("3vw", "vw");
        assert_eq!(err.code(), "UNSUPPORTED_UNIT");
        assert_eq!(
            err.to_string(),
            "the unit 'vw' is not supported (value=3vw)"
        );
    }

    #[test]
    fn json_errors_become_invalid_options() {
        let err: MetricsError = serde_json::from_str::<serde_json::Value>("{")
            .map_err(MetricsError::from)
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_OPTIONS");
    }
}
