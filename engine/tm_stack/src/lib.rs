//! Stack growth for deeply nested method execution.
//!
//! The interpreter recurses once per executed call, and a substituted call
//! adds a second frame for the mock body. Long self-call chains in a class
//! under test can therefore exhaust a default thread stack well before the
//! interpreter's own depth limit trips. [`ensure_sufficient_stack`] grows the
//! stack on demand around each frame.
//!
//! - **Red zone**: 128KB. Below this, a new segment is allocated.
//! - **Segment size**: 1MB per growth.
//!
//! On `wasm32` the closure runs directly.

const RED_ZONE: usize = 128 * 1024;

const STACK_PER_SEGMENT: usize = 1024 * 1024;

/// Run `f`, growing the stack first if less than the red zone remains.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_SEGMENT, f)
}

/// WASM manages its own stack.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_frames_survive_deep_chains() {
        fn frame(depth: u32) -> u32 {
            ensure_sufficient_stack(|| if depth == 0 { 0 } else { frame(depth - 1) + 1 })
        }

        assert_eq!(frame(50_000), 50_000);
    }

    #[test]
    fn passes_results_through() {
        let result: Result<&str, String> = ensure_sufficient_stack(|| Ok("mocked"));
        assert_eq!(result, Ok("mocked"));
    }
}
