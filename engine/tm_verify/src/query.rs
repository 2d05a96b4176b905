//! Verification queries.
//!
//! ```text
//! // substring called at least once, with (1, anyInt)
//! VerificationQuery::with(
//!     CallExpectation::new(substring_key).args([ArgMatcher::eq(1), ArgMatcher::AnyInt]),
//! )
//!
//! // open before close, other calls may interleave
//! VerificationQuery::with_in_order([CallExpectation::new(open), CallExpectation::new(close)])
//! ```

use std::fmt;

use tm_ir::StringInterner;
use tm_weave::MatchKey;

use crate::matcher::ArgMatcher;

/// One expected call: a key, and optionally one matcher per argument.
#[derive(Clone, Debug)]
pub struct CallExpectation {
    pub key: MatchKey,
    /// `None` accepts any arguments.
    pub args: Option<Vec<ArgMatcher>>,
}

impl CallExpectation {
    pub fn new(key: MatchKey) -> Self {
        Self { key, args: None }
    }

    #[must_use]
    pub fn args(mut self, matchers: impl IntoIterator<Item = ArgMatcher>) -> Self {
        self.args = Some(matchers.into_iter().collect());
        self
    }

    /// Format as `Owner#method(T..)` plus the matchers, if any.
    pub fn display<'a>(&'a self, interner: &'a StringInterner) -> ExpectationDisplay<'a> {
        ExpectationDisplay {
            expectation: self,
            interner,
        }
    }
}

pub struct ExpectationDisplay<'a> {
    expectation: &'a CallExpectation,
    interner: &'a StringInterner,
}

impl fmt::Display for ExpectationDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expectation.key.display(self.interner))?;
        if let Some(args) = &self.expectation.args {
            f.write_str(" with (")?;
            for (i, m) in args.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{}", m.display(self.interner))?;
            }
            f.write_str(")")?;
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum CallOrder {
    #[default]
    AnyOrder,
    /// Expectations must match a subsequence of the log, in order.
    InOrder,
}

/// Count constraint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Times {
    Exactly(usize),
    AtLeast(usize),
    AtMost(usize),
    /// Inclusive range.
    Between(usize, usize),
}

impl Times {
    pub fn admits(self, count: usize) -> bool {
        match self {
            Times::Exactly(n) => count == n,
            Times::AtLeast(n) => count >= n,
            Times::AtMost(n) => count <= n,
            Times::Between(lo, hi) => (lo..=hi).contains(&count),
        }
    }
}

impl fmt::Display for Times {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Times::Exactly(n) => write!(f, "exactly {n}"),
            Times::AtLeast(n) => write!(f, "at least {n}"),
            Times::AtMost(n) => write!(f, "at most {n}"),
            Times::Between(lo, hi) => write!(f, "between {lo} and {hi}"),
        }
    }
}

/// Built only through its constructors, so a count constraint never sits on
/// an in-order or exclusion query.
#[derive(Clone, Debug)]
pub struct VerificationQuery {
    pub(crate) expectations: Vec<CallExpectation>,
    pub(crate) order: CallOrder,
    /// Applies to each expectation of an any-order query; at least once when
    /// unset.
    pub(crate) times: Option<Times>,
    /// Pass only if nothing matches.
    pub(crate) exclude: bool,
}

impl VerificationQuery {
    fn new(expectations: Vec<CallExpectation>) -> Self {
        Self {
            expectations,
            order: CallOrder::AnyOrder,
            times: None,
            exclude: false,
        }
    }

    /// The call happened at least once.
    pub fn with(expectation: CallExpectation) -> Self {
        Self::new(vec![expectation])
    }

    /// Each call happened at least once, in any order.
    pub fn with_all(expectations: impl IntoIterator<Item = CallExpectation>) -> Self {
        Self::new(expectations.into_iter().collect())
    }

    /// The calls happened in this order, possibly with others in between.
    pub fn with_in_order(expectations: impl IntoIterator<Item = CallExpectation>) -> Self {
        Self {
            order: CallOrder::InOrder,
            ..Self::new(expectations.into_iter().collect())
        }
    }

    /// The call never happened.
    pub fn without(expectation: CallExpectation) -> Self {
        Self {
            exclude: true,
            ..Self::new(vec![expectation])
        }
    }

    /// The call happened exactly `n` times.
    pub fn with_times(expectation: CallExpectation, n: usize) -> Self {
        Self::with(expectation).times(Times::Exactly(n))
    }

    /// Constrain how often each expectation matched.
    ///
    /// Only any-order queries count matches. An in-order query checks for a
    /// subsequence and an exclusion always wants zero, so both keep no
    /// constraint and [`count`](Self::count) stays `None` for them.
    #[must_use]
    pub fn times(mut self, times: Times) -> Self {
        if self.order == CallOrder::AnyOrder && !self.exclude {
            self.times = Some(times);
        }
        self
    }

    pub fn expectations(&self) -> &[CallExpectation] {
        &self.expectations
    }

    pub fn order(&self) -> CallOrder {
        self.order
    }

    pub fn is_exclusion(&self) -> bool {
        self.exclude
    }

    /// Count constraint set through [`times`](Self::times).
    pub fn count(&self) -> Option<Times> {
        self.times
    }

    /// Count constraint in effect for each expectation.
    pub fn effective_times(&self) -> Times {
        if self.exclude {
            Times::Exactly(0)
        } else {
            self.times.unwrap_or(Times::AtLeast(1))
        }
    }

    pub fn display<'a>(&'a self, interner: &'a StringInterner) -> QueryDisplay<'a> {
        QueryDisplay {
            query: self,
            interner,
        }
    }
}

pub struct QueryDisplay<'a> {
    query: &'a VerificationQuery,
    interner: &'a StringInterner,
}

impl fmt::Display for QueryDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let q = self.query;
        let verb = match (q.exclude, q.order) {
            (true, _) => "without",
            (false, CallOrder::InOrder) => "in order",
            (false, CallOrder::AnyOrder) => "with",
        };
        f.write_str(verb)?;
        for (i, e) in q.expectations.iter().enumerate() {
            f.write_str(if i == 0 { " " } else { ", " })?;
            write!(f, "{}", e.display(self.interner))?;
        }
        if let Some(times) = q.times {
            write!(f, " ({times})")?;
        }
        Ok(())
    }
}
