//! Structured errors for the UI boundary
//!
//! Every failure of lexing, parsing or evaluation is a `ScriptError`.
//! The embedding application catches exactly this type and renders it
//! inline; anything else is a bug.

use crate::UnitError;
use serde::{Deserialize, Serialize};

/// Standard error codes (machine-readable)
pub mod codes {
    pub const UNEXPECTED_CHAR: &str = "UNEXPECTED_CHAR";
    pub const UNTERMINATED_STRING: &str = "UNTERMINATED_STRING";
    pub const UNTERMINATED_NUMBER: &str = "UNTERMINATED_NUMBER";
    pub const UNTERMINATED_COMMENT: &str = "UNTERMINATED_COMMENT";
    pub const SYNTAX_ERROR: &str = "SYNTAX_ERROR";
    pub const UNDEFINED_VAR: &str = "UNDEFINED_VAR";
    pub const UNDEFINED_FUNC: &str = "UNDEFINED_FUNC";
    pub const ARG_COUNT: &str = "ARG_COUNT";
    pub const ARG_TYPE: &str = "ARG_TYPE";
    pub const TYPE_ERROR: &str = "TYPE_ERROR";
    pub const DIV_ZERO: &str = "DIV_ZERO";
    pub const DOMAIN_ERROR: &str = "DOMAIN_ERROR";
    pub const ITERATION_LIMIT: &str = "ITERATION_LIMIT";
    pub const MODE_MISMATCH: &str = "MODE_MISMATCH";
    pub const UNKNOWN_UNIT: &str = "UNKNOWN_UNIT";
    pub const INVALID_REQUEST: &str = "INVALID_REQUEST";
}

/// Which stage produced the error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    /// Malformed token
    Lex,
    /// Malformed grammar
    Syntax,
    /// Runtime failure
    Eval,
    /// Bad request or configuration around the script
    Request,
}

/// Location in the script source. `offset` counts characters from the
/// start; `line` and `column` are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Position {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(offset: usize, line: usize, column: usize) -> Self {
        Self { offset, line, column }
    }
}

/// Structured script error
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptError {
    pub kind: ErrorKind,

    /// Machine-readable error code
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Suggestion for fixing the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,

    /// Where the error occurred
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

impl ScriptError {
    pub fn new(kind: ErrorKind, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            code: code.into(),
            message: message.into(),
            suggestion: None,
            position: None,
        }
    }

    // ========== Builders ==========

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn at(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    /// Attach a position unless one is already recorded
    pub fn or_at(mut self, position: Position) -> Self {
        if self.position.is_none() {
            self.position = Some(position);
        }
        self
    }

    pub fn is_lex(&self) -> bool {
        self.kind == ErrorKind::Lex
    }

    pub fn is_syntax(&self) -> bool {
        self.kind == ErrorKind::Syntax
    }

    pub fn is_eval(&self) -> bool {
        self.kind == ErrorKind::Eval
    }

    pub fn is_request(&self) -> bool {
        self.kind == ErrorKind::Request
    }

    // ========== Lex Error Constructors ==========

    pub fn unexpected_char(c: char) -> Self {
        Self::new(ErrorKind::Lex, codes::UNEXPECTED_CHAR, format!("Unexpected character '{}'", c))
    }

    pub fn unterminated_string() -> Self {
        Self::new(ErrorKind::Lex, codes::UNTERMINATED_STRING, "Unterminated string literal")
            .with_suggestion("Close the string with a matching quote")
    }

    pub fn unterminated_number(text: &str) -> Self {
        Self::new(ErrorKind::Lex, codes::UNTERMINATED_NUMBER,
            format!("Unterminated number literal '{}'", text))
    }

    pub fn unterminated_comment() -> Self {
        Self::new(ErrorKind::Lex, codes::UNTERMINATED_COMMENT, "Unterminated block comment")
            .with_suggestion("Close the comment with */")
    }

    // ========== Syntax Error Constructors ==========

    pub fn syntax(details: impl Into<String>) -> Self {
        Self::new(ErrorKind::Syntax, codes::SYNTAX_ERROR, details)
    }

    // ========== Request Error Constructors ==========

    pub fn invalid_request(details: impl Into<String>) -> Self {
        Self::new(ErrorKind::Request, codes::INVALID_REQUEST, details)
    }

    // ========== Eval Error Constructors ==========

    pub fn eval(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Eval, code, message)
    }

    pub fn div_zero() -> Self {
        Self::eval(codes::DIV_ZERO, "Division by zero")
            .with_suggestion("Ensure divisor is not zero")
    }

    pub fn undefined_var(name: &str) -> Self {
        Self::eval(codes::UNDEFINED_VAR, format!("Unknown identifier: {}", name))
            .with_suggestion(format!("Define '{}' or check spelling", name))
    }

    pub fn undefined_func(name: &str) -> Self {
        Self::eval(codes::UNDEFINED_FUNC, format!("Unknown function: {}", name))
    }

    pub fn type_error(expected: &str, got: &str) -> Self {
        Self::eval(codes::TYPE_ERROR, format!("Expected {}, got {}", expected, got))
    }

    pub fn invalid_operation(details: impl Into<String>) -> Self {
        Self::eval(codes::TYPE_ERROR, details)
    }

    pub fn arg_count(func: &str, expected: impl std::fmt::Display, got: usize) -> Self {
        Self::eval(codes::ARG_COUNT,
            format!("{}() expects {} arguments, got {}", func, expected, got))
    }

    pub fn arg_type(func: &str, arg: &str, expected: &str, got: &str) -> Self {
        Self::eval(codes::ARG_TYPE,
            format!("{}() argument '{}': expected {}, got {}", func, arg, expected, got))
    }

    pub fn domain_error(details: impl Into<String>) -> Self {
        Self::eval(codes::DOMAIN_ERROR, format!("Domain error: {}", details.into()))
    }

    pub fn iteration_limit(limit: usize) -> Self {
        Self::eval(codes::ITERATION_LIMIT,
            format!("Loop iteration limit exceeded ({} iterations)", limit))
            .with_suggestion("Check the loop bounds or condition")
    }

    pub fn mode_mismatch(mode: &str, got: &str) -> Self {
        Self::eval(codes::MODE_MISMATCH,
            format!("Script for {} must produce a {}, got {}", mode,
                if mode == "reps" { "Number" } else { "Weight" }, got))
    }
}

impl std::fmt::Display for ScriptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(pos) = self.position {
            write!(f, " (line {}, column {})", pos.line, pos.column)?;
        }
        if let Some(ref suggestion) = self.suggestion {
            write!(f, " (suggestion: {})", suggestion)?;
        }
        Ok(())
    }
}

impl std::error::Error for ScriptError {}

impl From<UnitError> for ScriptError {
    fn from(err: UnitError) -> Self {
        match err {
            UnitError::Unknown(u) => Self::eval(codes::UNKNOWN_UNIT, format!("Unknown unit: {}", u))
                .with_suggestion("Use \"lb\" or \"kg\""),
        }
    }
}
