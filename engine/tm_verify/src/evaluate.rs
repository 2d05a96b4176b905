//! Verification evaluator.
//!
//! Evaluates a [`VerificationQuery`] against a call log snapshot, read-only.
//!
//! - **any order**: each expectation's count of fully matching calls (key
//!   and every argument matcher) must satisfy the query's count constraint
//! - **in order**: the expectations must match a subsequence of the log in
//!   ordinal order; the earliest match is taken for each expectation, which
//!   finds a subsequence whenever one exists
//! - **exclusion**: no call may match any expectation
//!
//! Failures name the expected and actual counts, list the calls that did
//! match, and render the closest mismatched call: the call with the same
//! key that satisfies the most argument matchers, earliest on ties.

use std::fmt;

use tm_eval::RecordedCall;
use tm_ir::{ClassLookup, StringInterner};

use crate::query::{CallExpectation, CallOrder, VerificationQuery};

/// Passing result: ordinals of the calls that satisfied the query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerificationReport {
    pub matched: Vec<u64>,
}

/// Failing result, rendered for an assertion message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerificationFailure {
    /// The whole query.
    pub query: String,
    /// The expectation that was not met.
    pub expectation: String,
    pub expected: String,
    pub actual: usize,
    /// Calls that matched, in ordinal order.
    pub matching: Vec<String>,
    pub closest: Option<String>,
}

impl fmt::Display for VerificationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "verification failed: {}", self.query)?;
        writeln!(
            f,
            "  expected {} matching {}, found {}",
            self.expected, self.expectation, self.actual
        )?;
        if !self.matching.is_empty() {
            writeln!(f, "  matching calls:")?;
            for call in &self.matching {
                writeln!(f, "    {call}")?;
            }
        }
        if let Some(closest) = &self.closest {
            writeln!(f, "  closest mismatched call: {closest}")?;
        }
        Ok(())
    }
}

impl std::error::Error for VerificationFailure {}

/// Evaluate `query` against `calls`, which must be in ordinal order.
pub fn evaluate(
    query: &VerificationQuery,
    calls: &[RecordedCall],
    classes: &dyn ClassLookup,
    interner: &StringInterner,
) -> Result<VerificationReport, VerificationFailure> {
    let eval = Evaluator {
        query,
        classes,
        interner,
    };
    let result = match query.order {
        CallOrder::InOrder if !query.exclude => eval.in_order(calls),
        CallOrder::InOrder | CallOrder::AnyOrder => eval.counted(calls),
    };
    tracing::debug!(
        query = %query.display(interner),
        calls = calls.len(),
        passed = result.is_ok(),
        "evaluated verification"
    );
    result
}

struct Evaluator<'a> {
    query: &'a VerificationQuery,
    classes: &'a dyn ClassLookup,
    interner: &'a StringInterner,
}

impl Evaluator<'_> {
    fn counted(&self, calls: &[RecordedCall]) -> Result<VerificationReport, VerificationFailure> {
        let times = self.query.effective_times();
        let mut matched = Vec::new();
        for exp in &self.query.expectations {
            let hits: Vec<&RecordedCall> =
                calls.iter().filter(|c| self.is_match(exp, c)).collect();
            if !times.admits(hits.len()) {
                return Err(VerificationFailure {
                    query: self.query.display(self.interner).to_string(),
                    expectation: exp.display(self.interner).to_string(),
                    expected: times.to_string(),
                    actual: hits.len(),
                    matching: hits.iter().map(|c| self.render(c)).collect(),
                    closest: self.closest(exp, calls),
                });
            }
            matched.extend(hits.iter().map(|c| c.ordinal));
        }
        matched.sort_unstable();
        matched.dedup();
        Ok(VerificationReport { matched })
    }

    fn in_order(&self, calls: &[RecordedCall]) -> Result<VerificationReport, VerificationFailure> {
        let expectations = &self.query.expectations;
        let mut matched: Vec<&RecordedCall> = Vec::with_capacity(expectations.len());
        let mut rest = calls;
        for exp in expectations {
            let Some(pos) = rest.iter().position(|c| self.is_match(exp, c)) else {
                return Err(VerificationFailure {
                    query: self.query.display(self.interner).to_string(),
                    expectation: exp.display(self.interner).to_string(),
                    expected: format!("{} calls in order", expectations.len()),
                    actual: matched.len(),
                    matching: matched.iter().map(|c| self.render(c)).collect(),
                    closest: self.closest(exp, rest),
                });
            };
            matched.push(&rest[pos]);
            rest = &rest[pos + 1..];
        }
        Ok(VerificationReport {
            matched: matched.iter().map(|c| c.ordinal).collect(),
        })
    }

    /// Arguments satisfied by `call`, or `None` if the key differs.
    fn score(&self, exp: &CallExpectation, call: &RecordedCall) -> Option<usize> {
        if call.key != exp.key {
            return None;
        }
        let Some(matchers) = &exp.args else {
            return Some(0);
        };
        Some(
            matchers
                .iter()
                .zip(&call.args)
                .filter(|(m, v)| m.is_match(v, self.classes))
                .count(),
        )
    }

    fn is_match(&self, exp: &CallExpectation, call: &RecordedCall) -> bool {
        let Some(score) = self.score(exp, call) else {
            return false;
        };
        match &exp.args {
            None => true,
            Some(matchers) => matchers.len() == call.args.len() && score == matchers.len(),
        }
    }

    fn closest(&self, exp: &CallExpectation, calls: &[RecordedCall]) -> Option<String> {
        let mut best: Option<(usize, &RecordedCall)> = None;
        for call in calls {
            if self.is_match(exp, call) {
                continue;
            }
            let Some(score) = self.score(exp, call) else {
                continue;
            };
            if best.is_none_or(|(s, _)| score > s) {
                best = Some((score, call));
            }
        }
        best.map(|(_, call)| self.render(call))
    }

    fn render(&self, call: &RecordedCall) -> String {
        let args: Vec<String> = call
            .args
            .iter()
            .map(|v| v.display(self.interner).to_string())
            .collect();
        format!(
            "#{} {} with ({}) from {}",
            call.ordinal,
            call.key.display(self.interner),
            args.join(", "),
            call.source.display(self.interner)
        )
    }
}
