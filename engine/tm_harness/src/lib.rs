//! Test-class sessions for call-site substitution.
//!
//! A [`TestClassSession`] collects the mock declarations of one test class,
//! instruments the class under test once, and hands out a [`TestRun`] per
//! test method. Each run has its own invocation context and call log, and
//! verifies queries against that log only.
//!
//! ```text
//! let mut session = TestClassSession::new(class_path, "StringTest", SessionConfig::new());
//! session.register(decl)?;
//! session.instrument(["Demo"])?;
//! let run = session.begin_test("substring")?;
//! run.invoke_static("Demo", "cut", &["String"], &[Value::from("hello")])?;
//! run.verify(&VerificationQuery::with(expectation))?;
//! run.finish();
//! ```

mod config;
mod error;
mod run;
mod session;

use std::sync::Once;

pub use config::SessionConfig;
pub use error::{HarnessError, HarnessResult};
pub use run::TestRun;
pub use session::TestClassSession;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Safe to call multiple times. Enable with `RUST_LOG=tm_weave=debug` or
/// `RUST_LOG=tm_eval=trace`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
