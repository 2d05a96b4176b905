//! Session-level instrumentation.
//!
//! The [`Weaver`] owns the original class path and the mock mapping of one
//! test class session, and produces instrumented classes on demand. Results
//! are write-once: the first instrumentation of a class is cached and every
//! later (or concurrent) caller gets that same `Arc`.

use dashmap::DashMap;
use rustc_hash::FxHashMap;
use std::sync::Arc;

use tm_diagnostic::{class_not_found, SetupResult};
use tm_ir::{ClassDef, ClassPath, Name};

use crate::config::WeaveConfig;
use crate::locator::{CallSite, SiteCache};
use crate::registry::MockMapping;
use crate::rewrite::rewrite;

pub struct Weaver {
    class_path: Arc<ClassPath>,
    mapping: Arc<MockMapping>,
    config: WeaveConfig,
    sites: SiteCache,
    instrumented: DashMap<Name, Arc<ClassDef>>,
}

impl Weaver {
    pub fn new(class_path: Arc<ClassPath>, mapping: Arc<MockMapping>, config: WeaveConfig) -> Self {
        if config.reports_unmatched() {
            let interner = class_path.interner();
            for entry in mapping.iter() {
                tracing::debug!(
                    mock = %entry.decl.body_ref().display(interner),
                    key = %entry.key.display(interner),
                    scope = ?entry.decl.scope,
                    "mock mapping entry"
                );
            }
        }
        Self {
            class_path,
            mapping,
            config,
            sites: SiteCache::new(),
            instrumented: DashMap::new(),
        }
    }

    pub fn class_path(&self) -> &Arc<ClassPath> {
        &self.class_path
    }

    pub fn mapping(&self) -> &Arc<MockMapping> {
        &self.mapping
    }

    pub fn config(&self) -> WeaveConfig {
        self.config
    }

    /// Call sites of a class on the original class path.
    pub fn locate(&self, class: Name) -> SetupResult<Arc<[CallSite]>> {
        let def = self.original(class)?;
        self.sites.get_or_locate(def, self.class_path.interner())
    }

    /// Instrumented form of `class`, computed at most once per session.
    pub fn instrument(&self, class: Name) -> SetupResult<Arc<ClassDef>> {
        if let Some(hit) = self.instrumented.get(&class) {
            return Ok(Arc::clone(hit.value()));
        }

        let interner = self.class_path.interner();
        let _span = tracing::debug_span!("instrument", class = interner.lookup(class)).entered();
        let def = self.original(class)?;
        let sites = self.sites.get_or_locate(def, interner)?;
        let outcome = rewrite(
            def,
            &sites,
            &self.mapping,
            self.class_path.as_ref(),
            interner,
            self.config,
        )?;

        let entry = self
            .instrumented
            .entry(class)
            .or_insert_with(|| Arc::new(outcome.class));
        Ok(Arc::clone(entry.value()))
    }

    /// Already-instrumented classes, for an execution overlay.
    pub fn instrumented_classes(&self) -> FxHashMap<Name, Arc<ClassDef>> {
        self.instrumented
            .iter()
            .map(|e| (*e.key(), Arc::clone(e.value())))
            .collect()
    }

    fn original(&self, class: Name) -> SetupResult<&ClassDef> {
        self.class_path
            .get(class)
            .map(AsRef::as_ref)
            .ok_or_else(|| class_not_found(self.class_path.interner().lookup(class)))
    }
}

impl std::fmt::Debug for Weaver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Weaver")
            .field("mocks", &self.mapping.len())
            .field("instrumented", &self.instrumented.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests;
