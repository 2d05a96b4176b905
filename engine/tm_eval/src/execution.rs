//! Test execution scope.

use std::sync::atomic::{AtomicU64, Ordering};

use tm_ir::Name;

use crate::context::InvocationContext;
use crate::recorder::CallLog;

static NEXT_EXECUTION_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one test method run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExecutionId(u64);

impl ExecutionId {
    fn next() -> Self {
        ExecutionId(NEXT_EXECUTION_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

/// State owned by one running test method: its invocation context and its
/// call log. Nothing here is shared between executions.
#[derive(Debug)]
pub struct TestExecution {
    id: ExecutionId,
    test_class: Name,
    test_name: String,
    pub context: InvocationContext,
    pub log: CallLog,
}

impl TestExecution {
    pub fn new(test_class: Name, test_name: impl Into<String>) -> Self {
        Self {
            id: ExecutionId::next(),
            test_class,
            test_name: test_name.into(),
            context: InvocationContext::new(),
            log: CallLog::new(),
        }
    }

    pub fn id(&self) -> ExecutionId {
        self.id
    }

    pub fn test_class(&self) -> Name {
        self.test_class
    }

    pub fn test_name(&self) -> &str {
        &self.test_name
    }

    /// Clear context and log at the end of the test.
    pub fn reset(&self) {
        self.context.clear();
        self.log.clear();
    }
}
