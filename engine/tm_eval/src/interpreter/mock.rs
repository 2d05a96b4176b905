//! Dispatch of substituted calls.
//!
//! A [`MockedCall`] whose mock is active for the running execution:
//!
//! 1. appends the call to the execution's log (arguments only, receiver
//!    excluded)
//! 2. sets the execution's source method to the method containing the call
//!    site, for the duration of the mock body
//! 3. runs the mock body, a static method of the mock container, with the
//!    receiver (or `null` for static sites) first when the rewriter asked
//!    for it
//!
//! The mock body's result or exception is the call's result or exception,
//! unchanged. An inactive mock runs the original invocation and records
//! nothing.

use tm_ir::{ClassLookup, MockedCall, Value};

use super::{Interpreter, Registers};
use crate::errors::{no_such_method, unknown_mock, EvalResult};

impl Interpreter<'_> {
    pub(super) fn dispatch_mock(&mut self, mocked: &MockedCall, regs: &Registers) -> EvalResult {
        let runtime = self.runtime;
        let execution = self.execution;
        let interner = runtime.interner();

        let entry = runtime
            .mapping()
            .get(mocked.mock)
            .ok_or_else(|| unknown_mock(mocked.mock.raw()))?;

        if !entry.decl.is_active_for(execution.test_class()) {
            tracing::trace!(
                mock = mocked.mock.raw(),
                "mock not associated with this test class, running original call"
            );
            return self.invoke(&mocked.call, regs);
        }

        let args = regs.collect(&mocked.call.args)?;
        let mut body_args = Vec::with_capacity(args.len() + 1);
        if mocked.pass_receiver {
            let receiver = match mocked.call.receiver {
                Some(var) => regs.get(var)?.clone(),
                None => Value::Null,
            };
            body_args.push(receiver);
        }
        body_args.extend(args.iter().cloned());

        let body = entry.decl.body_ref();
        let Some(def) = runtime
            .lookup_class(body.owner)
            .and_then(|c| c.find_method(body.name, &body.params))
        else {
            return Err(no_such_method(&body.display(interner).to_string()));
        };

        let ordinal =
            execution
                .log
                .record(mocked.mock, entry.key.clone(), args, mocked.source.clone());
        tracing::debug!(
            ordinal,
            mock = %body.display(interner),
            source = %mocked.source.display(interner),
            "dispatching substituted call"
        );

        let _source = execution.context.enter_source(mocked.source.clone());
        self.run_method(body.owner, def, None, &body_args)
    }
}
