//! Structured errors for callers of the unit calculator
//!
//! Errors are plain values with a stable machine-readable code, a
//! human-readable message and an optional suggestion.

use crate::NumberError;
use serde::{Deserialize, Serialize};

/// Standard error codes (machine-readable)
pub mod codes {
    pub const PARSE_ERROR: &str = "PARSE_ERROR";
    pub const DIV_ZERO: &str = "DIV_ZERO";
    pub const UNIT_MISMATCH: &str = "UNIT_MISMATCH";
    pub const INCOMPATIBLE_DIMENSION: &str = "INCOMPATIBLE_DIMENSION";
    pub const UNIT_SHAPE_MISMATCH: &str = "UNIT_SHAPE_MISMATCH";
    pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
    pub const INTERNAL: &str = "INTERNAL";
}

/// Severity level of an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The requested operation failed
    Error,
    /// The unit system cannot be used at all
    Fatal,
}

/// Context about where an error occurred
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Input text that caused the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,

    /// Propagation notes
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub notes: Vec<String>,
}

/// Structured error returned by the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReckonError {
    /// Machine-readable error code
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Suggestion for fixing the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,

    /// Where the error occurred
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<ErrorContext>,

    /// Severity level
    pub severity: Severity,
}

impl ReckonError {
    /// Create a new error
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            suggestion: None,
            context: None,
            severity: Severity::Error,
        }
    }

    /// Builder: add suggestion
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Builder: record the offending input
    pub fn with_input(mut self, input: impl Into<String>) -> Self {
        let ctx = self.context.get_or_insert_with(ErrorContext::default);
        ctx.input = Some(input.into());
        self
    }

    /// Builder: add propagation note
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        let ctx = self.context.get_or_insert_with(ErrorContext::default);
        ctx.notes.push(note.into());
        self
    }

    /// Builder: set severity
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn is_fatal(&self) -> bool {
        self.severity == Severity::Fatal
    }

    // ========== Common Error Constructors ==========

    pub fn parse_error(details: impl Into<String>) -> Self {
        Self::new(codes::PARSE_ERROR, format!("Parse error: {}", details.into()))
            .with_suggestion("Write quantities as <number><unit>, e.g. 1.5km")
    }

    pub fn div_zero() -> Self {
        Self::new(codes::DIV_ZERO, "Division by zero")
            .with_suggestion("Ensure divisor is not zero")
    }

    pub fn unit_mismatch(left: &str, right: &str) -> Self {
        Self::new(codes::UNIT_MISMATCH,
            format!("Cannot combine '{}' with '{}'", left, right))
            .with_suggestion("Addition and subtraction need identical units")
    }

    pub fn incompatible_dimension(from: &str, to: &str) -> Self {
        Self::new(codes::INCOMPATIBLE_DIMENSION,
            format!("'{}' and '{}' measure different dimensions", from, to))
    }

    pub fn unit_shape_mismatch(from: &str, to: &str) -> Self {
        Self::new(codes::UNIT_SHAPE_MISMATCH,
            format!("Cannot convert '{}' to '{}': numerator/denominator lengths differ", from, to))
            .with_suggestion("Target unit must pair each source unit by position")
    }

    pub fn configuration(details: impl Into<String>) -> Self {
        Self::new(codes::CONFIG_ERROR, format!("Invalid unit table: {}", details.into()))
            .with_suggestion("Every unit must converge to a base unit that maps to itself")
            .with_severity(Severity::Fatal)
    }

    pub fn internal(details: impl Into<String>) -> Self {
        Self::new(codes::INTERNAL, format!("Internal error: {}", details.into()))
            .with_suggestion("This is a bug, please report it")
            .with_severity(Severity::Fatal)
    }
}

impl std::fmt::Display for ReckonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, " (suggestion: {})", suggestion)?;
        }
        Ok(())
    }
}

impl std::error::Error for ReckonError {}

impl From<NumberError> for ReckonError {
    fn from(err: NumberError) -> Self {
        match err {
            NumberError::ParseError(s) => Self::parse_error(format!("invalid number '{}'", s)),
            NumberError::DivisionByZero => Self::div_zero(),
        }
    }
}
