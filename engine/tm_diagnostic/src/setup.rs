//! Setup-time errors.
//!
//! Factory functions are the public way to build these; they render the
//! message from already-resolved names so the error can outlive the
//! interner it came from.

use crate::ErrorCode;

/// Result of a setup-time operation.
pub type SetupResult<T> = Result<T, SetupError>;

/// A fatal problem in mock wiring, detected before any test method runs.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SetupError {
    /// Declarations collide or are incomplete.
    #[error("error[{code}]: configuration error: {message}")]
    Configuration { code: ErrorCode, message: String },

    /// A mock cannot stand in for the call it matches.
    #[error("error[{code}]: signature mismatch: {message}")]
    SignatureMismatch { code: ErrorCode, message: String },

    /// The class under test cannot be read for rewriting.
    #[error("error[{code}]: instrumentation unavailable: {message}")]
    InstrumentationUnavailable { code: ErrorCode, message: String },
}

impl SetupError {
    pub fn code(&self) -> ErrorCode {
        match self {
            SetupError::Configuration { code, .. }
            | SetupError::SignatureMismatch { code, .. }
            | SetupError::InstrumentationUnavailable { code, .. } => *code,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            SetupError::Configuration { message, .. }
            | SetupError::SignatureMismatch { message, .. }
            | SetupError::InstrumentationUnavailable { message, .. } => message,
        }
    }
}

// Configuration Errors

/// Two declarations produce the same match key.
pub fn ambiguous_mock(key: &str, first: &str, second: &str) -> SetupError {
    SetupError::Configuration {
        code: ErrorCode::E1001,
        message: format!("mocks `{first}` and `{second}` both match `{key}`"),
    }
}

/// A declaration without target class has no receiver parameter.
pub fn receiverless_mock(mock: &str) -> SetupError {
    SetupError::Configuration {
        code: ErrorCode::E1002,
        message: format!(
            "mock `{mock}` has no target class and no parameters, so it names no receiver type"
        ),
    }
}

/// The declared mock body does not exist in its container.
pub fn missing_mock_body(mock: &str) -> SetupError {
    SetupError::Configuration {
        code: ErrorCode::E1003,
        message: format!("mock body `{mock}` not found in its container class"),
    }
}

/// A mock id that this registry never issued.
pub fn unknown_mock(id: u32) -> SetupError {
    SetupError::Configuration {
        code: ErrorCode::E1004,
        message: format!("mock #{id} is not registered"),
    }
}

/// The registry ran out of mock ids.
pub fn too_many_mocks(count: usize) -> SetupError {
    SetupError::Configuration {
        code: ErrorCode::E1005,
        message: format!("cannot register mock #{count}: mock ids are exhausted"),
    }
}

// Signature Errors

/// The mock's return type cannot replace the call's result.
pub fn return_type_mismatch(site: &str, mock: &str, expected: &str, found: &str) -> SetupError {
    SetupError::SignatureMismatch {
        code: ErrorCode::E2001,
        message: format!(
            "mock `{mock}` returns `{found}`, but the call at {site} expects `{expected}`"
        ),
    }
}

// Instrumentation Errors

pub fn class_not_found(class: &str) -> SetupError {
    SetupError::InstrumentationUnavailable {
        code: ErrorCode::E3001,
        message: format!("class `{class}` is not on the class path"),
    }
}

pub fn malformed_body(method: &str, detail: &str) -> SetupError {
    SetupError::InstrumentationUnavailable {
        code: ErrorCode::E3002,
        message: format!("cannot read body of `{method}`: {detail}"),
    }
}
