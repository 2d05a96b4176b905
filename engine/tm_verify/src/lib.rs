//! Verification of recorded substituted calls.
//!
//! A [`VerificationQuery`] lists [`CallExpectation`]s (a match key plus
//! optional [`ArgMatcher`]s per argument) and how they must appear in a
//! call log: at least once, a given number of times, in order, or never.
//! [`evaluate`] checks a query against a log snapshot and, on failure,
//! explains what it found instead.

mod evaluate;
mod matcher;
mod query;

pub use evaluate::{evaluate, VerificationFailure, VerificationReport};
pub use matcher::{ArgMatcher, ArgMatcherDisplay};
pub use query::{
    CallExpectation, CallOrder, ExpectationDisplay, QueryDisplay, Times, VerificationQuery,
};
