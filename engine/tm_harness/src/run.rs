//! One running test method.

use std::sync::Arc;

use tm_eval::{Interpreter, RecordedCall, Runtime, TestExecution};
use tm_ir::{Name, SharedInterner, TypeRef, Value};
use tm_verify::{evaluate, VerificationFailure, VerificationQuery, VerificationReport};
use tm_weave::{MatchKey, MethodTarget};

use crate::error::{HarnessError, HarnessResult};

/// A test method's execution against the session's instrumented runtime.
///
/// Owns its invocation context and call log; runs of the same session are
/// fully isolated and may proceed on different threads.
pub struct TestRun {
    runtime: Arc<Runtime>,
    execution: TestExecution,
}

impl TestRun {
    pub(crate) fn new(runtime: Arc<Runtime>, test_class: Name, test_name: &str) -> Self {
        let execution = TestExecution::new(test_class, test_name);
        tracing::debug!(
            execution = execution.id().raw(),
            test = test_name,
            "test started"
        );
        Self { runtime, execution }
    }

    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    pub fn execution(&self) -> &TestExecution {
        &self.execution
    }

    pub fn interner(&self) -> &SharedInterner {
        self.runtime.interner()
    }

    /// `Class.method(args)` with parameter types given as source text.
    pub fn invoke_static(
        &self,
        class: &str,
        method: &str,
        params: &[&str],
        args: &[Value],
    ) -> HarnessResult<Value> {
        let params = self.types(params)?;
        let interner = self.interner();
        let mut interp = Interpreter::new(&self.runtime, &self.execution);
        interp
            .invoke_static(interner.intern(class), interner.intern(method), &params, args)
            .map_err(HarnessError::from)
    }

    /// `receiver.method(args)`.
    pub fn invoke(
        &self,
        receiver: &Value,
        method: &str,
        params: &[&str],
        args: &[Value],
    ) -> HarnessResult<Value> {
        let params = self.types(params)?;
        let method = self.interner().intern(method);
        let mut interp = Interpreter::new(&self.runtime, &self.execution);
        interp
            .invoke_virtual(receiver, method, &params, args)
            .map_err(HarnessError::from)
    }

    /// `new Class(args)`.
    pub fn construct(&self, class: &str, params: &[&str], args: &[Value]) -> HarnessResult<Value> {
        let params = self.types(params)?;
        let class = self.interner().intern(class);
        let mut interp = Interpreter::new(&self.runtime, &self.execution);
        interp
            .construct(class, &params, args)
            .map_err(HarnessError::from)
    }

    /// Make `value` visible to mock bodies of this run under `key`.
    pub fn set(&self, key: &str, value: impl Into<Value>) {
        self.execution.context.set(key, value.into());
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.execution.context.get(key)
    }

    /// Key of `owner.method(params)`.
    pub fn key(&self, owner: &str, method: &str, params: &[&str]) -> HarnessResult<MatchKey> {
        let owner = self.ty(owner)?;
        let method = MethodTarget::Named(self.interner().intern(method));
        Ok(MatchKey::new(owner, method, self.types(params)?))
    }

    /// Key of `new class(params)`.
    pub fn constructor_key(&self, class: &str, params: &[&str]) -> HarnessResult<MatchKey> {
        Ok(MatchKey::new(self.ty(class)?, MethodTarget::Constructor, self.types(params)?))
    }

    /// Substituted calls recorded so far, in ordinal order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.execution.log.snapshot()
    }

    pub fn verify(
        &self,
        query: &VerificationQuery,
    ) -> Result<VerificationReport, VerificationFailure> {
        evaluate(
            query,
            &self.execution.log.snapshot(),
            &*self.runtime,
            self.interner(),
        )
    }

    /// End the test, clearing its context and log.
    pub fn finish(self) {
        tracing::debug!(
            execution = self.execution.id().raw(),
            calls = self.execution.log.len(),
            "test finished"
        );
        self.execution.reset();
    }

    fn ty(&self, text: &str) -> HarnessResult<TypeRef> {
        Ok(TypeRef::parse(text, self.interner())?)
    }

    fn types(&self, texts: &[&str]) -> HarnessResult<Vec<TypeRef>> {
        texts.iter().map(|t| self.ty(t)).collect()
    }
}

impl std::fmt::Debug for TestRun {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestRun")
            .field("execution", &self.execution)
            .finish_non_exhaustive()
    }
}
