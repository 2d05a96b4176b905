//! Runtime side of call-site substitution.
//!
//! - **[`Interpreter`]** runs class IR, dispatching substituted calls to
//!   their mock bodies
//! - **[`InvocationContext`]** carries the source method and test-supplied
//!   values into mock bodies
//! - **[`CallLog`]** records every substituted invocation for verification
//! - **[`TestExecution`]** owns one test method's context and log
//! - **[`Runtime`]** is the session's instrumented view of the class path,
//!   shared read-only by all executions

mod context;
mod diagnostics;
mod errors;
mod execution;
mod interpreter;
mod natives;
mod recorder;
mod runtime;

pub use context::{InvocationContext, SourceMethodGuard};
pub use diagnostics::CallStack;
pub use errors::{
    abstract_method, arity_mismatch, missing_native, no_such_class, no_such_method,
    null_receiver, stack_overflow, thrown, type_mismatch, unknown_mock, EvalBacktrace, EvalError,
    EvalErrorKind, EvalResult,
};
pub use execution::{ExecutionId, TestExecution};
pub use interpreter::Interpreter;
pub use natives::{runtime_exception, NativeCall, NativeFn, NativeRegistry, CONTEXT_CLASS};
pub use recorder::{CallLog, RecordedCall};
pub use runtime::{EvalConfig, Runtime, RuntimeBuilder};
