//! Mock wiring for a class under test.
//!
//! Setup runs in three steps, all before the first test method:
//!
//! 1. **Match** — [`MockRegistry`] collects [`MockDeclaration`]s and builds
//!    an immutable [`MockMapping`] from canonical [`MatchKey`]s to mocks.
//! 2. **Locate** — [`locate`] enumerates every [`CallSite`] in the class
//!    under test.
//! 3. **Rewrite** — [`rewrite`] replaces each matched call with a mock
//!    dispatch. [`Weaver`] drives locate and rewrite per class and caches
//!    the result for the session.
//!
//! Any failure is a [`SetupError`](tm_diagnostic::SetupError) and fails the
//! whole session.

mod config;
mod declaration;
mod locator;
mod match_key;
mod registry;
mod rewrite;
mod weaver;

pub use config::{DiagnoseLevel, WeaveConfig};
pub use declaration::{MockDeclaration, MockKind, MockScope};
pub use locator::{locate, CallSite, CallSiteDisplay, SiteCache};
pub use match_key::{MatchKey, MatchKeyDisplay, MethodTarget};
pub use registry::{MockEntry, MockMapping, MockRegistry};
pub use rewrite::{rewrite, RewriteOutcome, Substitution};
pub use weaver::Weaver;
