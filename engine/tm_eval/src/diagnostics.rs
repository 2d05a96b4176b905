//! Call frame tracking for the interpreter.
//!
//! Each method invocation pushes a frame; return pops it. The depth limit
//! is enforced in [`CallStack::push`], and on error the frames are
//! snapshotted into the error's [`EvalBacktrace`].

use tm_ir::{MethodRef, StringInterner};

use crate::errors::{stack_overflow, EvalBacktrace, EvalError};

#[derive(Clone, Debug)]
pub struct CallStack {
    frames: Vec<MethodRef>,
    max_depth: usize,
}

impl CallStack {
    pub fn new(max_depth: usize) -> Self {
        Self {
            frames: Vec::new(),
            max_depth,
        }
    }

    /// Push a frame, failing with a stack overflow at the depth limit. The
    /// frame is not pushed on overflow.
    pub fn push(&mut self, frame: MethodRef) -> Result<(), EvalError> {
        if self.frames.len() >= self.max_depth {
            return Err(stack_overflow(self.max_depth));
        }
        self.frames.push(frame);
        Ok(())
    }

    pub fn pop(&mut self) {
        debug_assert!(
            !self.frames.is_empty(),
            "CallStack::pop() called on empty stack"
        );
        self.frames.pop();
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Frames rendered innermost first.
    pub fn capture(&self, interner: &StringInterner) -> EvalBacktrace {
        EvalBacktrace::new(
            self.frames
                .iter()
                .rev()
                .map(|f| f.display(interner).to_string())
                .collect(),
        )
    }

    /// Attach a backtrace unless the error already carries one.
    pub fn attach_backtrace(&self, err: EvalError, interner: &StringInterner) -> EvalError {
        if self.frames.is_empty() || err.backtrace.is_some() {
            return err;
        }
        err.with_backtrace(self.capture(interner))
    }
}
