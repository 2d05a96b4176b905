//! Diagnostics for mock wiring.
//!
//! Setup-time problems (a broken mock declaration, an incompatible mock
//! signature, a class that cannot be instrumented) fail the whole test
//! class before any test method runs. They are reported as [`SetupError`],
//! each tagged with a stable [`ErrorCode`] for searchability:
//!
//! - `E1xxx`: configuration errors in mock declarations
//! - `E2xxx`: signature mismatches between mock and call site
//! - `E3xxx`: instrumentation unavailable

mod error_code;
mod setup;

pub use error_code::ErrorCode;
pub use setup::{
    ambiguous_mock, class_not_found, malformed_body, missing_mock_body, receiverless_mock,
    return_type_mismatch, too_many_mocks, unknown_mock, SetupError, SetupResult,
};
