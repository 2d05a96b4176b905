//! Shared, read-only runtime of one test class session.
//!
//! A [`Runtime`] is the class path as interpreted code sees it: instrumented
//! classes overlay their originals, everything else resolves to the
//! original definitions. It is built once after instrumentation and shared
//! by every test execution of the session.

use rustc_hash::FxHashMap;
use std::sync::Arc;

use tm_ir::{ClassDef, ClassLookup, ClassPath, Name, SharedInterner};
use tm_weave::MockMapping;

use crate::natives::NativeRegistry;

/// Interpreter limits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EvalConfig {
    /// Frames allowed before a call fails with a stack overflow.
    pub max_call_depth: usize,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            max_call_depth: 512,
        }
    }
}

impl EvalConfig {
    #[must_use]
    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }
}

pub struct Runtime {
    class_path: Arc<ClassPath>,
    overlay: FxHashMap<Name, Arc<ClassDef>>,
    mapping: Arc<MockMapping>,
    natives: NativeRegistry,
    config: EvalConfig,
}

impl Runtime {
    pub fn builder(class_path: Arc<ClassPath>) -> RuntimeBuilder {
        RuntimeBuilder::new(class_path)
    }

    pub fn interner(&self) -> &SharedInterner {
        self.class_path.interner()
    }

    pub fn class_path(&self) -> &Arc<ClassPath> {
        &self.class_path
    }

    pub fn mapping(&self) -> &MockMapping {
        &self.mapping
    }

    pub fn natives(&self) -> &NativeRegistry {
        &self.natives
    }

    pub fn config(&self) -> EvalConfig {
        self.config
    }

    /// Whether `class` runs in its instrumented form.
    pub fn is_overlaid(&self, class: Name) -> bool {
        self.overlay.contains_key(&class)
    }
}

impl ClassLookup for Runtime {
    fn lookup_class(&self, name: Name) -> Option<&ClassDef> {
        self.overlay
            .get(&name)
            .map(AsRef::as_ref)
            .or_else(|| self.class_path.lookup_class(name))
    }
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("class_path", &self.class_path)
            .field("instrumented", &self.overlay.len())
            .field("mocks", &self.mapping.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Runtime`].
pub struct RuntimeBuilder {
    class_path: Arc<ClassPath>,
    overlay: FxHashMap<Name, Arc<ClassDef>>,
    mapping: Option<Arc<MockMapping>>,
    natives: Option<NativeRegistry>,
    config: EvalConfig,
}

impl RuntimeBuilder {
    pub fn new(class_path: Arc<ClassPath>) -> Self {
        Self {
            class_path,
            overlay: FxHashMap::default(),
            mapping: None,
            natives: None,
            config: EvalConfig::default(),
        }
    }

    #[must_use]
    pub fn mapping(mut self, mapping: Arc<MockMapping>) -> Self {
        self.mapping = Some(mapping);
        self
    }

    /// Run `class` in place of its original definition.
    #[must_use]
    pub fn instrumented(mut self, class: Arc<ClassDef>) -> Self {
        self.overlay.insert(class.name, class);
        self
    }

    #[must_use]
    pub fn instrumented_all(mut self, classes: impl IntoIterator<Item = Arc<ClassDef>>) -> Self {
        for class in classes {
            self.overlay.insert(class.name, class);
        }
        self
    }

    /// Replace the core natives.
    #[must_use]
    pub fn natives(mut self, natives: NativeRegistry) -> Self {
        self.natives = Some(natives);
        self
    }

    #[must_use]
    pub fn config(mut self, config: EvalConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Runtime {
        let natives = self
            .natives
            .unwrap_or_else(|| NativeRegistry::with_core(self.class_path.interner()));
        Runtime {
            class_path: self.class_path,
            overlay: self.overlay,
            mapping: self.mapping.unwrap_or_default(),
            natives,
            config: self.config,
        }
    }
}
