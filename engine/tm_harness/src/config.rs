//! Session configuration.

use tm_eval::EvalConfig;
use tm_weave::{DiagnoseLevel, WeaveConfig};

/// Settings for one test-class session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionConfig {
    pub weave: WeaveConfig,
    pub eval: EvalConfig,
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_weave(mut self, weave: WeaveConfig) -> Self {
        self.weave = weave;
        self
    }

    #[must_use]
    pub fn with_eval(mut self, eval: EvalConfig) -> Self {
        self.eval = eval;
        self
    }

    /// Set how much the weaver reports about matching.
    #[must_use]
    pub fn with_diagnose(mut self, level: DiagnoseLevel) -> Self {
        self.weave = self.weave.with_diagnose(level);
        self
    }

    #[must_use]
    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.eval = self.eval.with_max_call_depth(depth);
        self
    }
}
