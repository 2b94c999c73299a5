//! Error vocabulary and classification
//!
//! Every failure that reaches the command boundary is reduced to an
//! [`ErrorRecord`]: one code from a small fixed vocabulary plus a human
//! message. Classification is purely local; it inspects types and strings
//! and never talks to the remote API.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::api::ApiError;

/// Machine-readable error codes emitted on stderr
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    AuthMissing,
    NotFound,
    ValidationError,
    ApiError,
    ExtensionError,
}

impl ErrorCode {
    pub const ALL: [ErrorCode; 5] = [
        ErrorCode::AuthMissing,
        ErrorCode::NotFound,
        ErrorCode::ValidationError,
        ErrorCode::ApiError,
        ErrorCode::ExtensionError,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::AuthMissing => "auth_missing",
            ErrorCode::NotFound => "not_found",
            ErrorCode::ValidationError => "validation_error",
            ErrorCode::ApiError => "api_error",
            ErrorCode::ExtensionError => "extension_error",
        }
    }

    /// Parses a code word, returning `None` for anything outside the vocabulary
    pub fn parse(word: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|code| code.as_str() == word)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classified command failure
#[derive(Debug, Error, PartialEq)]
pub enum LtuiError {
    #[error("auth_missing {0}")]
    AuthMissing(String),

    #[error("not_found {0}")]
    NotFound(String),

    #[error("validation_error {0}")]
    Validation(String),

    #[error("api_error {0}")]
    Api(String),

    #[error("extension_error {0}")]
    Extension(String),
}

impl LtuiError {
    /// Not-found error for a reference supplied through a command option
    pub fn reference(kind: &str, reference: &str) -> Self {
        LtuiError::NotFound(format!("{} '{}' not found", kind, reference))
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            LtuiError::AuthMissing(_) => ErrorCode::AuthMissing,
            LtuiError::NotFound(_) => ErrorCode::NotFound,
            LtuiError::Validation(_) => ErrorCode::ValidationError,
            LtuiError::Api(_) => ErrorCode::ApiError,
            LtuiError::Extension(_) => ErrorCode::ExtensionError,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            LtuiError::AuthMissing(m)
            | LtuiError::NotFound(m)
            | LtuiError::Validation(m)
            | LtuiError::Api(m)
            | LtuiError::Extension(m) => m,
        }
    }
}

/// A failure reduced to `{code, message}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorRecord {
    pub code: ErrorCode,
    pub message: String,
}

impl ErrorRecord {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    fn rate_limited() -> Self {
        Self::new(ErrorCode::ApiError, "rate_limited")
    }
}

static RATE_LIMIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)rate.?limit").expect("valid regex"));

/// Maps any failure onto the fixed error vocabulary
pub fn classify(error: &anyhow::Error) -> ErrorRecord {
    if let Some(err) = error.downcast_ref::<LtuiError>() {
        return ErrorRecord::new(err.code(), err.message());
    }

    if let Some(err) = error.downcast_ref::<ApiError>() {
        if err.is_rate_limited() {
            return ErrorRecord::rate_limited();
        }
        return classify_message(&err.to_string());
    }

    // Context layers sit on top; the root cause carries the code word.
    classify_message(&error.root_cause().to_string())
}

/// Classifies a bare error message
pub fn classify_message(message: &str) -> ErrorRecord {
    if RATE_LIMIT.is_match(message) {
        return ErrorRecord::rate_limited();
    }

    if let Some((word, rest)) = message.split_once(' ') {
        if let Some(code) = ErrorCode::parse(word) {
            if !rest.is_empty() {
                return ErrorRecord::new(code, rest);
            }
        }
    }

    ErrorRecord::new(ErrorCode::ApiError, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_errors_keep_their_code() {
        let err = anyhow::Error::new(LtuiError::reference("Team", "XYZ"));
        let record = classify(&err);
        assert_eq!(record.code, ErrorCode::NotFound);
        assert_eq!(record.message, "Team 'XYZ' not found");
    }

    #[test]
    fn display_starts_with_code_word() {
        let err = LtuiError::Validation("Unknown field(s): bogus".to_string());
        assert_eq!(err.to_string(), "validation_error Unknown field(s): bogus");
    }

    #[test]
    fn message_with_code_word_is_split() {
        let record = classify_message("not_found Labels not found: missing-label");
        assert_eq!(record.code, ErrorCode::NotFound);
        assert_eq!(record.message, "Labels not found: missing-label");
    }

    #[test]
    fn unrecognized_messages_become_api_errors_verbatim() {
        let record = classify_message("connection reset by peer");
        assert_eq!(record.code, ErrorCode::ApiError);
        assert_eq!(record.message, "connection reset by peer");

        let record = classify_message("something_else happened");
        assert_eq!(record.code, ErrorCode::ApiError);
        assert_eq!(record.message, "something_else happened");
    }

    #[test]
    fn bare_code_word_is_not_split() {
        let record = classify_message("not_found");
        assert_eq!(record.code, ErrorCode::ApiError);
        assert_eq!(record.message, "not_found");
    }

    #[test]
    fn rate_limit_messages_are_synthesized() {
        for message in ["Rate limit exceeded", "ratelimited by upstream", "RATE-LIMIT hit"] {
            assert_eq!(classify_message(message), ErrorRecord::rate_limited());
        }
    }

    #[test]
    fn rate_limit_flag_on_api_error() {
        let err = anyhow::Error::new(ApiError::Status {
            code: 429,
            body: "slow down".to_string(),
        });
        assert_eq!(classify(&err), ErrorRecord::rate_limited());
    }

    #[test]
    fn context_layers_do_not_hide_the_code() {
        let err = anyhow::anyhow!("validation_error Format 'detail' not supported")
            .context("Failed to render list");
        let record = classify(&err);
        assert_eq!(record.code, ErrorCode::ValidationError);
    }
}
