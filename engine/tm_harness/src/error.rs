//! Harness errors.

use tm_diagnostic::SetupError;
use tm_eval::EvalError;
use tm_ir::TypeParseError;

pub type HarnessResult<T> = Result<T, HarnessError>;

#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    /// Mock wiring failed while setting the session up.
    #[error(transparent)]
    Setup(#[from] SetupError),

    /// An earlier setup error failed the session; no test may run.
    #[error("test class `{test_class}` failed setup: {cause}")]
    SessionFailed {
        test_class: String,
        cause: SetupError,
    },

    #[error("mock registered after `{test_class}` was instrumented")]
    AlreadyInstrumented { test_class: String },

    #[error("test started before `{test_class}` was instrumented")]
    NotInstrumented { test_class: String },

    #[error(transparent)]
    Type(#[from] TypeParseError),

    /// Running code of the class under test failed, including exceptions
    /// thrown by it or by a mock.
    #[error(transparent)]
    Eval(#[from] EvalError),
}

impl HarnessError {
    /// The setup error behind this error, if any.
    pub fn setup_error(&self) -> Option<&SetupError> {
        match self {
            HarnessError::Setup(err) | HarnessError::SessionFailed { cause: err, .. } => Some(err),
            _ => None,
        }
    }

    pub fn eval_error(&self) -> Option<&EvalError> {
        match self {
            HarnessError::Eval(err) => Some(err),
            _ => None,
        }
    }
}
