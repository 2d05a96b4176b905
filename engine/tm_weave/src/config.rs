//! Weaver configuration.

/// How much the rewriter reports about its decisions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum DiagnoseLevel {
    #[default]
    Disabled,
    /// Report each substitution.
    Enabled,
    /// Also report call sites no mock matched.
    Verbose,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WeaveConfig {
    pub diagnose: DiagnoseLevel,
}

impl WeaveConfig {
    #[must_use]
    pub fn with_diagnose(mut self, level: DiagnoseLevel) -> Self {
        self.diagnose = level;
        self
    }

    pub fn reports_substitutions(&self) -> bool {
        self.diagnose >= DiagnoseLevel::Enabled
    }

    pub fn reports_unmatched(&self) -> bool {
        self.diagnose >= DiagnoseLevel::Verbose
    }
}
