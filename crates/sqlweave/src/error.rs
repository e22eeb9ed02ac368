//! Error types for sqlweave

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tokens::Span;

/// The result type for sqlweave operations
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline stage that produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Lex,
    Parse,
    Generate,
    Registry,
}

/// Errors that can occur during tokenizing, parsing, dialect lookup and generation.
///
/// Every variant is terminal for the call that raised it.
#[derive(Debug, Error)]
pub enum Error {
    /// Bad character, unterminated quote or unterminated comment.
    #[error("Tokenization error at line {line}, column {column} (offset {offset}): {message}")]
    Tokenize {
        message: String,
        offset: usize,
        line: usize,
        column: usize,
    },

    /// A grammar production could not match the current token.
    #[error("{}", format_parse_error(.message, .expected, .found, .span))]
    Parse {
        message: String,
        expected: Vec<String>,
        found: String,
        span: Option<Span>,
    },

    /// A dialect name that is neither built in nor registered.
    #[error("Unknown dialect: '{name}'")]
    UnknownDialect { name: String },

    /// The AST contains a construct with no valid rendering in the target dialect.
    #[error("Unsupported: {feature} is not supported in {dialect}")]
    Unsupported { feature: String, dialect: String },

    /// A malformed AST handed to the generator.
    #[error("Generation error: {message}")]
    Generate { message: String },

    /// A custom dialect registration conflict.
    #[error("Dialect registry error: {message}")]
    Registry { message: String },
}

fn format_parse_error(message: &str, expected: &[String], found: &str, span: &Option<Span>) -> String {
    let mut out = String::from("Parse error");
    if let Some(span) = span {
        out.push_str(&format!(" at line {}, column {}", span.line, span.column));
    }
    out.push_str(": ");
    out.push_str(message);
    if !expected.is_empty() {
        out.push_str(&format!(" (expected {}", expected.join(" or ")));
        if !found.is_empty() {
            out.push_str(&format!(", found '{}'", found));
        }
        out.push(')');
    }
    out
}

impl Error {
    /// Create a tokenization error
    pub fn tokenize(message: impl Into<String>, offset: usize, line: usize, column: usize) -> Self {
        Error::Tokenize {
            message: message.into(),
            offset,
            line,
            column,
        }
    }

    /// Create a parse error without token context
    pub fn parse(message: impl Into<String>) -> Self {
        Error::Parse {
            message: message.into(),
            expected: Vec::new(),
            found: String::new(),
            span: None,
        }
    }

    /// Create a parse error naming what was expected and what was found
    pub fn unexpected(
        message: impl Into<String>,
        expected: Vec<String>,
        found: impl Into<String>,
        span: Span,
    ) -> Self {
        Error::Parse {
            message: message.into(),
            expected,
            found: found.into(),
            span: Some(span),
        }
    }

    /// Attach the offending token to a parse error raised without one
    pub fn located(self, found: &str, span: Span) -> Self {
        match self {
            Error::Parse {
                message,
                expected,
                span: None,
                ..
            } => Error::Parse {
                message,
                expected,
                found: found.to_string(),
                span: Some(span),
            },
            other => other,
        }
    }

    /// Create an unknown dialect error
    pub fn unknown_dialect(name: impl Into<String>) -> Self {
        Error::UnknownDialect { name: name.into() }
    }

    /// Create an unsupported feature error
    pub fn unsupported(feature: impl Into<String>, dialect: impl Into<String>) -> Self {
        Error::Unsupported {
            feature: feature.into(),
            dialect: dialect.into(),
        }
    }

    /// Create a generation error
    pub fn generate(message: impl Into<String>) -> Self {
        Error::Generate {
            message: message.into(),
        }
    }

    /// Create a registry error
    pub fn registry(message: impl Into<String>) -> Self {
        Error::Registry {
            message: message.into(),
        }
    }

    /// The pipeline stage that failed.
    pub fn stage(&self) -> Stage {
        match self {
            Error::Tokenize { .. } => Stage::Lex,
            Error::Parse { .. } => Stage::Parse,
            Error::Unsupported { .. } | Error::Generate { .. } => Stage::Generate,
            Error::UnknownDialect { .. } | Error::Registry { .. } => Stage::Registry,
        }
    }

    /// Offending input span, when the error carries one.
    pub fn span(&self) -> Option<Span> {
        match self {
            Error::Tokenize {
                offset,
                line,
                column,
                ..
            } => Some(Span::new(*offset, *offset + 1, *line, *column)),
            Error::Parse { span, .. } => *span,
            _ => None,
        }
    }
}

/// Severity level for validation errors
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ValidationSeverity {
    /// An error that prevents the query from being valid
    Error,
    /// A warning about potential issues
    Warning,
}

/// A single validation error or warning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationError {
    pub message: String,
    /// Line number where the error occurred (1-based)
    pub line: Option<usize>,
    /// Column number where the error occurred (1-based)
    pub column: Option<usize>,
    pub severity: ValidationSeverity,
    pub stage: Option<Stage>,
}

impl ValidationError {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line: None,
            column: None,
            severity: ValidationSeverity::Error,
            stage: None,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: ValidationSeverity::Warning,
            ..Self::error(message)
        }
    }

    pub fn with_location(mut self, line: usize, column: usize) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }

    pub fn with_stage(mut self, stage: Stage) -> Self {
        self.stage = Some(stage);
        self
    }
}

impl From<&Error> for ValidationError {
    fn from(err: &Error) -> Self {
        let mut out = ValidationError::error(err.to_string()).with_stage(err.stage());
        if let Some(span) = err.span() {
            out = out.with_location(span.line, span.column);
        }
        out
    }
}

/// Result of validating SQL
#[derive(Debug, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Whether the SQL is valid (no errors, warnings are allowed)
    pub valid: bool,
    pub errors: Vec<ValidationError>,
}

impl ValidationResult {
    pub fn success() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
        }
    }

    pub fn with_errors(errors: Vec<ValidationError>) -> Self {
        let has_errors = errors.iter().any(|e| e.severity == ValidationSeverity::Error);
        Self {
            valid: !has_errors,
            errors,
        }
    }

    pub fn add_error(&mut self, error: ValidationError) {
        if error.severity == ValidationSeverity::Error {
            self.valid = false;
        }
        self.errors.push(error);
    }
}
