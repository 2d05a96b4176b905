//! Test-class session lifecycle.
//!
//! ```text
//! new ─► register* ─► instrument ─► begin_test ─► (invoke, verify)* ─► finish
//!                         │
//!                         └─ setup error ─► Failed (every begin_test errors)
//! ```
//!
//! Registration is closed by the first `instrument` call. Instrumentation
//! happens once per session; the instrumented runtime is shared read-only
//! by every test run, including runs on other threads.

use std::sync::Arc;

use tm_diagnostic::SetupError;
use tm_ir::{ClassPath, MockId, Name, SharedInterner, TypeRef};
use tm_eval::Runtime;
use tm_weave::{MockDeclaration, MockRegistry, Weaver};

use crate::config::SessionConfig;
use crate::error::{HarnessError, HarnessResult};
use crate::run::TestRun;

enum SessionState {
    Registering(MockRegistry),
    Ready { weaver: Weaver, runtime: Arc<Runtime> },
    Failed(SetupError),
}

/// Mock wiring and instrumented runtime for one test class.
pub struct TestClassSession {
    test_class: Name,
    class_path: Arc<ClassPath>,
    config: SessionConfig,
    state: SessionState,
}

impl TestClassSession {
    pub fn new(class_path: Arc<ClassPath>, test_class: &str, config: SessionConfig) -> Self {
        let test_class = class_path.interner().intern(test_class);
        Self {
            test_class,
            class_path,
            config,
            state: SessionState::Registering(MockRegistry::new()),
        }
    }

    pub fn interner(&self) -> &SharedInterner {
        self.class_path.interner()
    }

    pub fn test_class(&self) -> Name {
        self.test_class
    }

    pub fn config(&self) -> SessionConfig {
        self.config
    }

    pub fn name(&self, text: &str) -> Name {
        self.interner().intern(text)
    }

    pub fn ty(&self, text: &str) -> HarnessResult<TypeRef> {
        Ok(TypeRef::parse(text, self.interner())?)
    }

    pub fn types(&self, texts: &[&str]) -> HarnessResult<Vec<TypeRef>> {
        texts.iter().map(|t| self.ty(t)).collect()
    }

    /// Add a mock declaration. Only allowed before instrumentation.
    pub fn register(&mut self, decl: MockDeclaration) -> HarnessResult<MockId> {
        let test_class = self.test_class_name();
        match &mut self.state {
            SessionState::Registering(registry) => {
                registry.register(decl).map_err(HarnessError::from)
            }
            SessionState::Ready { .. } => Err(HarnessError::AlreadyInstrumented { test_class }),
            SessionState::Failed(cause) => Err(HarnessError::SessionFailed {
                test_class,
                cause: cause.clone(),
            }),
        }
    }

    /// Build the mock mapping and instrument `classes`.
    ///
    /// A setup error fails the session for good. Calling this again after
    /// success is a no-op.
    pub fn instrument<'a>(
        &mut self,
        classes: impl IntoIterator<Item = &'a str>,
    ) -> HarnessResult<()> {
        let registry = match &self.state {
            SessionState::Registering(registry) => registry,
            SessionState::Ready { .. } => {
                tracing::debug!(test_class = %self.test_class_name(), "already instrumented");
                return Ok(());
            }
            SessionState::Failed(cause) => {
                return Err(HarnessError::SessionFailed {
                    test_class: self.test_class_name(),
                    cause: cause.clone(),
                });
            }
        };

        let _span = tracing::info_span!("instrument", test_class = %self.test_class_name())
            .entered();
        match self.weave(registry, classes) {
            Ok((weaver, runtime)) => {
                tracing::debug!(
                    mocks = weaver.mapping().len(),
                    classes = weaver.instrumented_classes().len(),
                    "session ready"
                );
                self.state = SessionState::Ready {
                    weaver,
                    runtime: Arc::new(runtime),
                };
                Ok(())
            }
            Err(err) => {
                tracing::debug!(code = %err.code(), "session setup failed");
                self.state = SessionState::Failed(err.clone());
                Err(HarnessError::Setup(err))
            }
        }
    }

    fn weave<'a>(
        &self,
        registry: &MockRegistry,
        classes: impl IntoIterator<Item = &'a str>,
    ) -> Result<(Weaver, Runtime), SetupError> {
        let mapping = Arc::new(registry.build_mapping(&self.class_path)?);
        let weaver = Weaver::new(
            Arc::clone(&self.class_path),
            Arc::clone(&mapping),
            self.config.weave,
        );
        for class in classes {
            weaver.instrument(self.interner().intern(class))?;
        }
        let runtime = Runtime::builder(Arc::clone(&self.class_path))
            .mapping(mapping)
            .instrumented_all(weaver.instrumented_classes().into_values())
            .config(self.config.eval)
            .build();
        Ok((weaver, runtime))
    }

    /// Start one test method with a fresh context and call log.
    pub fn begin_test(&self, test_name: &str) -> HarnessResult<TestRun> {
        match &self.state {
            SessionState::Ready { runtime, .. } => {
                Ok(TestRun::new(Arc::clone(runtime), self.test_class, test_name))
            }
            SessionState::Registering(_) => Err(HarnessError::NotInstrumented {
                test_class: self.test_class_name(),
            }),
            SessionState::Failed(cause) => Err(HarnessError::SessionFailed {
                test_class: self.test_class_name(),
                cause: cause.clone(),
            }),
        }
    }

    /// The instrumented runtime, once the session is ready.
    pub fn runtime(&self) -> Option<&Arc<Runtime>> {
        match &self.state {
            SessionState::Ready { runtime, .. } => Some(runtime),
            _ => None,
        }
    }

    pub fn weaver(&self) -> Option<&Weaver> {
        match &self.state {
            SessionState::Ready { weaver, .. } => Some(weaver),
            _ => None,
        }
    }

    pub fn setup_error(&self) -> Option<&SetupError> {
        match &self.state {
            SessionState::Failed(err) => Some(err),
            _ => None,
        }
    }

    fn test_class_name(&self) -> String {
        self.interner().lookup(self.test_class).to_owned()
    }
}

impl std::fmt::Debug for TestClassSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match &self.state {
            SessionState::Registering(registry) => format!("registering ({} mocks)", registry.len()),
            SessionState::Ready { .. } => "ready".to_owned(),
            SessionState::Failed(err) => format!("failed: {err}"),
        };
        f.debug_struct("TestClassSession")
            .field("test_class", &self.test_class_name())
            .field("state", &state)
            .finish_non_exhaustive()
    }
}
