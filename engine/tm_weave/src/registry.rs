//! Mock registry and the immutable mapping built from it.
//!
//! Declarations are collected first, then resolved together: every key is
//! computed, every body is checked to exist, and colliding keys are
//! rejected. The resulting [`MockMapping`] is read-only and shared by the
//! rewriter and every test execution.

use rustc_hash::FxHashMap;

use tm_diagnostic::{ambiguous_mock, missing_mock_body, too_many_mocks, unknown_mock, SetupResult};
use tm_ir::{ClassLookup, ClassPath, MockId};

use crate::declaration::MockDeclaration;
use crate::match_key::MatchKey;

/// Declarations registered for one session, in registration order.
///
/// Each declaration keeps the id [`register`](Self::register) issued for
/// it; the mapping reuses those ids.
#[derive(Clone, Debug, Default)]
pub struct MockRegistry {
    decls: Vec<(MockId, MockDeclaration)>,
}

impl MockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a declaration. Validation happens in [`build_mapping`](Self::build_mapping).
    pub fn register(&mut self, decl: MockDeclaration) -> SetupResult<MockId> {
        let id = next_id(self.decls.len())?;
        self.decls.push((id, decl));
        Ok(id)
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    /// Resolve all declarations into a mapping.
    ///
    /// Fails on the first declaration that has no receiver type, whose body
    /// is missing from its container, or whose key another declaration
    /// already claims.
    pub fn build_mapping(&self, class_path: &ClassPath) -> SetupResult<MockMapping> {
        let interner = class_path.interner();
        let mut entries = Vec::with_capacity(self.decls.len());
        let mut by_key: FxHashMap<MatchKey, MockId> = FxHashMap::default();

        for (id, decl) in &self.decls {
            let id = *id;
            let key = MatchKey::for_declaration(decl, interner)?;

            let body = decl.body_ref();
            let has_body = class_path
                .lookup_class(decl.container)
                .and_then(|c| c.find_method(body.name, &body.params))
                .is_some_and(|m| m.is_static && m.sig.ret == decl.return_type);
            if !has_body {
                return Err(missing_mock_body(&body.display(interner).to_string()));
            }

            if let Some(&first) = by_key.get(&key) {
                let first: &MockEntry = &entries[first.index()];
                return Err(ambiguous_mock(
                    &key.display(interner).to_string(),
                    &first.decl.body_ref().display(interner).to_string(),
                    &body.display(interner).to_string(),
                ));
            }
            by_key.insert(key.clone(), id);
            entries.push(MockEntry {
                id,
                decl: decl.clone(),
                key,
            });
        }

        tracing::debug!(mocks = entries.len(), "built mock mapping");
        Ok(MockMapping { entries, by_key })
    }
}

/// Id of the declaration that follows `registered` others.
fn next_id(registered: usize) -> SetupResult<MockId> {
    u32::try_from(registered)
        .map(MockId::new)
        .map_err(|_| too_many_mocks(registered))
}

/// A resolved declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MockEntry {
    pub id: MockId,
    pub decl: MockDeclaration,
    pub key: MatchKey,
}

/// Match key to mock lookup, immutable once built.
#[derive(Clone, Debug, Default)]
pub struct MockMapping {
    entries: Vec<MockEntry>,
    by_key: FxHashMap<MatchKey, MockId>,
}

impl MockMapping {
    pub fn get(&self, id: MockId) -> Option<&MockEntry> {
        self.entries.get(id.index())
    }

    /// Like [`get`](Self::get), as a setup error for ids from elsewhere.
    pub fn entry(&self, id: MockId) -> SetupResult<&MockEntry> {
        self.get(id).ok_or_else(|| unknown_mock(id.raw()))
    }

    pub fn lookup(&self, key: &MatchKey) -> Option<&MockEntry> {
        self.by_key.get(key).and_then(|id| self.get(*id))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MockEntry> {
        self.entries.iter()
    }
}
