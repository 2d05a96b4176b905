//! Runtime errors.
//!
//! An exception thrown by interpreted code (or by a mock body) travels as
//! an [`EvalError`] of kind [`EvalErrorKind::Thrown`] with the thrown value
//! attached. The value is carried as-is through every frame, so the caller
//! that catches it sees the same object the mock threw.
//!
//! Factory functions are the public way to construct errors; they populate
//! both `kind` and `message`.

use std::fmt;

use tm_ir::Value;

/// Result of evaluation.
pub type EvalResult = Result<Value, EvalError>;

/// Typed error category.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EvalErrorKind {
    /// An in-program exception; the value is in [`EvalError::thrown`].
    Thrown,

    // Resolution
    NoSuchClass {
        class: String,
    },
    NoSuchMethod {
        method: String,
    },
    MissingNative {
        method: String,
    },
    AbstractMethod {
        method: String,
    },

    // Invocation
    ArityMismatch {
        method: String,
        expected: usize,
        got: usize,
    },
    NullReceiver {
        method: String,
    },
    TypeMismatch {
        expected: String,
        got: String,
    },
    StackOverflow {
        depth: usize,
    },

    // Wiring
    UnknownMock {
        id: u32,
    },

    Custom {
        message: String,
    },
}

impl fmt::Display for EvalErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Thrown => write!(f, "uncaught exception"),

            Self::NoSuchClass { class } => write!(f, "no class `{class}`"),
            Self::NoSuchMethod { method } => write!(f, "no method `{method}`"),
            Self::MissingNative { method } => {
                write!(f, "no native implementation for `{method}`")
            }
            Self::AbstractMethod { method } => {
                write!(f, "cannot invoke abstract method `{method}`")
            }

            Self::ArityMismatch {
                method,
                expected,
                got,
            } => {
                let arg_word = if *expected == 1 {
                    "argument"
                } else {
                    "arguments"
                };
                write!(f, "{method} expects {expected} {arg_word}, got {got}")
            }
            Self::NullReceiver { method } => {
                write!(f, "cannot invoke `{method}` on null")
            }
            Self::TypeMismatch { expected, got } => {
                write!(f, "type mismatch: expected {expected}, got {got}")
            }
            Self::StackOverflow { depth } => {
                write!(f, "maximum call depth exceeded (limit: {depth})")
            }

            Self::UnknownMock { id } => write!(f, "mock #{id} is not registered"),

            Self::Custom { message } => write!(f, "{message}"),
        }
    }
}

/// Snapshot of the interpreter's frames at an error site, innermost first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EvalBacktrace {
    frames: Vec<String>,
}

impl EvalBacktrace {
    pub fn new(frames: Vec<String>) -> Self {
        Self { frames }
    }

    pub fn frames(&self) -> &[String] {
        &self.frames
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }
}

impl fmt::Display for EvalBacktrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.frames.is_empty() {
            return Ok(());
        }
        writeln!(f, "stack backtrace:")?;
        for (i, frame) in self.frames.iter().enumerate() {
            writeln!(f, "  {i}: {frame}")?;
        }
        Ok(())
    }
}

/// Evaluation error.
#[derive(Clone, Debug)]
pub struct EvalError {
    pub kind: EvalErrorKind,
    /// Human-readable message; equals `kind.to_string()` for factory-built
    /// errors other than thrown ones.
    pub message: String,
    /// The thrown value, for [`EvalErrorKind::Thrown`].
    pub thrown: Option<Value>,
    /// Call stack at the error site, attached by the interpreter.
    pub backtrace: Option<EvalBacktrace>,
}

impl EvalError {
    /// Create an error with just a message.
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::from_kind(EvalErrorKind::Custom { message })
    }

    fn from_kind(kind: EvalErrorKind) -> Self {
        let message = kind.to_string();
        Self {
            kind,
            message,
            thrown: None,
            backtrace: None,
        }
    }

    #[must_use]
    pub fn with_backtrace(mut self, backtrace: EvalBacktrace) -> Self {
        if self.backtrace.is_none() {
            self.backtrace = Some(backtrace);
        }
        self
    }

    pub fn is_thrown(&self) -> bool {
        self.kind == EvalErrorKind::Thrown
    }

    /// The thrown value, if this is an in-program exception.
    pub fn thrown_value(&self) -> Option<&Value> {
        self.thrown.as_ref()
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for EvalError {}

// Factory functions

/// An exception thrown by interpreted code.
pub fn thrown(value: Value, message: impl Into<String>) -> EvalError {
    EvalError {
        kind: EvalErrorKind::Thrown,
        message: message.into(),
        thrown: Some(value),
        backtrace: None,
    }
}

pub fn no_such_class(class: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NoSuchClass {
        class: class.to_owned(),
    })
}

pub fn no_such_method(method: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NoSuchMethod {
        method: method.to_owned(),
    })
}

pub fn missing_native(method: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::MissingNative {
        method: method.to_owned(),
    })
}

pub fn abstract_method(method: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::AbstractMethod {
        method: method.to_owned(),
    })
}

pub fn arity_mismatch(method: &str, expected: usize, got: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ArityMismatch {
        method: method.to_owned(),
        expected,
        got,
    })
}

pub fn null_receiver(method: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NullReceiver {
        method: method.to_owned(),
    })
}

pub fn type_mismatch(expected: &str, got: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::TypeMismatch {
        expected: expected.to_owned(),
        got: got.to_owned(),
    })
}

pub fn stack_overflow(depth: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::StackOverflow { depth })
}

pub fn unknown_mock(id: u32) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnknownMock { id })
}
