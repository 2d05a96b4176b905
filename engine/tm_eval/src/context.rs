//! Invocation context.
//!
//! Each test execution owns one [`InvocationContext`]. Test code writes
//! key/value pairs into it; mock bodies read them back through the
//! `InvocationContext.get` native. The interpreter sets the source method
//! immediately before dispatching a substituted call and restores the
//! previous one when the mock body returns, so nested substituted calls
//! each see their own caller.
//!
//! The source method is tracked per thread: one execution may run
//! substituted calls on several threads without them overwriting each
//! other's source.

use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;
use std::thread::ThreadId;

use tm_ir::{MethodRef, Value};

#[derive(Default)]
pub struct InvocationContext {
    source_methods: Mutex<FxHashMap<ThreadId, MethodRef>>,
    values: RwLock<FxHashMap<String, Value>>,
}

impl InvocationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `key`, replacing any previous value.
    pub fn set(&self, key: impl Into<String>, value: Value) {
        self.values.write().insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.values.read().get(key).cloned()
    }

    pub fn remove(&self, key: &str) -> Option<Value> {
        self.values.write().remove(key)
    }

    /// Method of the class under test that contains the substituted call
    /// currently executing on this thread.
    pub fn current_source_method(&self) -> Option<MethodRef> {
        self.source_methods
            .lock()
            .get(&std::thread::current().id())
            .cloned()
    }

    /// Set this thread's source method until the guard drops.
    pub fn enter_source(&self, method: MethodRef) -> SourceMethodGuard<'_> {
        let thread = std::thread::current().id();
        let previous = self.source_methods.lock().insert(thread, method);
        SourceMethodGuard {
            context: self,
            thread,
            previous,
        }
    }

    /// Drop all values and source methods.
    pub fn clear(&self) {
        self.values.write().clear();
        self.source_methods.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.values.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.read().is_empty()
    }
}

impl std::fmt::Debug for InvocationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvocationContext")
            .field("values", &self.len())
            .finish_non_exhaustive()
    }
}

/// Restores the previous source method of its thread on drop, including
/// during unwinding.
pub struct SourceMethodGuard<'ctx> {
    context: &'ctx InvocationContext,
    thread: ThreadId,
    previous: Option<MethodRef>,
}

impl Drop for SourceMethodGuard<'_> {
    fn drop(&mut self) {
        let mut sources = self.context.source_methods.lock();
        match self.previous.take() {
            Some(previous) => {
                sources.insert(self.thread, previous);
            }
            None => {
                sources.remove(&self.thread);
            }
        }
    }
}
