//! Call recorder.
//!
//! Append-only log of substituted invocations for one test execution.
//! Ordinals come from a single counter per log and are assigned while the
//! append lock is held, so log order and ordinal order always agree, even
//! when several threads record concurrently.
//!
//! Arguments are snapshotted by reference: an object recorded here is the
//! same instance the mock received, and later mutations of it are visible
//! to verification.

use parking_lot::Mutex;
use smallvec::SmallVec;
use std::time::Instant;

use tm_ir::{MethodRef, MockId, Value};
use tm_weave::MatchKey;

/// One substituted invocation.
#[derive(Clone, Debug)]
pub struct RecordedCall {
    /// Position in the log, starting at 0.
    pub ordinal: u64,
    pub mock: MockId,
    pub key: MatchKey,
    /// Arguments of the original call, receiver excluded.
    pub args: SmallVec<[Value; 4]>,
    /// Method of the class under test containing the call site.
    pub source: MethodRef,
    pub at: Instant,
}

#[derive(Default)]
pub struct CallLog {
    calls: Mutex<Vec<RecordedCall>>,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a call, returning its ordinal.
    pub fn record(
        &self,
        mock: MockId,
        key: MatchKey,
        args: impl IntoIterator<Item = Value>,
        source: MethodRef,
    ) -> u64 {
        let args = args.into_iter().collect();
        let mut calls = self.calls.lock();
        let ordinal = calls.len() as u64;
        calls.push(RecordedCall {
            ordinal,
            mock,
            key,
            args,
            source,
            at: Instant::now(),
        });
        tracing::trace!(ordinal, mock = mock.raw(), "recorded call");
        ordinal
    }

    /// Copy of the log in ordinal order.
    pub fn snapshot(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.lock().is_empty()
    }

    pub fn clear(&self) {
        self.calls.lock().clear();
    }
}

impl std::fmt::Debug for CallLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallLog")
            .field("calls", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests;
