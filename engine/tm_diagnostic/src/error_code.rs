use std::fmt;

/// Error codes for setup-time diagnostics.
///
/// Format: E#### where the first digit is the category:
/// - E1xxx: Configuration errors
/// - E2xxx: Signature mismatches
/// - E3xxx: Instrumentation unavailable
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Configuration Errors (E1xxx)
    /// Two mock declarations share a match key
    E1001,
    /// Receiver-style mock declares no parameters
    E1002,
    /// Mock body missing from its container class
    E1003,
    /// Mock id not registered in this session
    E1004,
    /// More mocks than a session can number
    E1005,

    // Signature Errors (E2xxx)
    /// Mock return type not assignable to the call's result type
    E2001,

    // Instrumentation Errors (E3xxx)
    /// Class under test not found on the class path
    E3001,
    /// Method body cannot be read
    E3002,
}

impl ErrorCode {
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            ErrorCode::E1001
                | ErrorCode::E1002
                | ErrorCode::E1003
                | ErrorCode::E1004
                | ErrorCode::E1005
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E1003 => "E1003",
            ErrorCode::E1004 => "E1004",
            ErrorCode::E1005 => "E1005",
            ErrorCode::E2001 => "E2001",
            ErrorCode::E3001 => "E3001",
            ErrorCode::E3002 => "E3002",
        }
    }

    /// One-line explanation with the usual fix.
    pub fn explain(&self) -> &'static str {
        match self {
            ErrorCode::E1001 => {
                "two mocks target the same method signature; remove one or change its target"
            }
            ErrorCode::E1002 => {
                "a mock without an explicit target class must take the receiver as its first parameter"
            }
            ErrorCode::E1003 => "the mock container has no method with the declared signature",
            ErrorCode::E1004 => "the mock id was not issued by this registry",
            ErrorCode::E1005 => "a session can hold at most u32::MAX mock declarations",
            ErrorCode::E2001 => {
                "the mock's return type cannot stand in for the value the call site expects"
            }
            ErrorCode::E3001 => "the class under test is not on the class path",
            ErrorCode::E3002 => "a method body references registers outside its frame",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
