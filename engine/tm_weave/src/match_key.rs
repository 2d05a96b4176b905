//! Canonical match keys.
//!
//! A [`MatchKey`] is derived independently from a mock declaration and from
//! a located call site. Matching a site is then a hash lookup: two keys are
//! equal exactly when owner type, method name (or the constructor marker)
//! and erased parameter types are all equal. No supertype widening happens
//! here; the owner is the static type the call site names.

use smallvec::SmallVec;
use std::fmt;

use tm_diagnostic::{receiverless_mock, SetupResult};
use tm_ir::{InvokeKind, Name, StringInterner, TypeRef};

use crate::declaration::{MockDeclaration, MockKind};
use crate::locator::CallSite;

/// Method part of a key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MethodTarget {
    Constructor,
    Named(Name),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MatchKey {
    /// Receiver type, static owner, or constructed type.
    pub owner: TypeRef,
    pub target: MethodTarget,
    pub params: SmallVec<[TypeRef; 4]>,
}

impl MatchKey {
    pub fn new(
        owner: TypeRef,
        target: MethodTarget,
        params: impl IntoIterator<Item = TypeRef>,
    ) -> Self {
        Self {
            owner,
            target,
            params: params.into_iter().collect(),
        }
    }

    /// Key a declaration matches.
    ///
    /// Fails when a receiver-style declaration (no target class) has no
    /// parameter to take the receiver type from.
    pub fn for_declaration(
        decl: &MockDeclaration,
        interner: &StringInterner,
    ) -> SetupResult<MatchKey> {
        match decl.kind {
            MockKind::Constructor => Ok(MatchKey::new(
                decl.return_type,
                MethodTarget::Constructor,
                decl.params.iter().copied(),
            )),
            MockKind::Method => {
                let method = MethodTarget::Named(decl.target_method.unwrap_or(decl.name));
                match decl.target_class {
                    Some(owner) => Ok(MatchKey::new(owner, method, decl.params.iter().copied())),
                    None => {
                        let Some((receiver, rest)) = decl.params.split_first() else {
                            let body = decl.body_ref();
                            return Err(receiverless_mock(
                                &body.display(interner).to_string(),
                            ));
                        };
                        Ok(MatchKey::new(*receiver, method, rest.iter().copied()))
                    }
                }
            }
        }
    }

    /// Key of a located call site.
    pub fn for_site(site: &CallSite) -> MatchKey {
        let target = match site.kind {
            InvokeKind::Construct => MethodTarget::Constructor,
            InvokeKind::Instance | InvokeKind::Static => MethodTarget::Named(site.name),
        };
        MatchKey::new(site.owner, target, site.params.iter().copied())
    }

    pub fn is_constructor(&self) -> bool {
        self.target == MethodTarget::Constructor
    }

    /// Format as `Owner#method(T1, T2)` (requires interner).
    pub fn display<'a>(&'a self, interner: &'a StringInterner) -> MatchKeyDisplay<'a> {
        MatchKeyDisplay {
            key: self,
            interner,
        }
    }
}

/// Helper for displaying a [`MatchKey`] with resolved names.
pub struct MatchKeyDisplay<'a> {
    key: &'a MatchKey,
    interner: &'a StringInterner,
}

impl fmt::Display for MatchKeyDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let method = match self.key.target {
            MethodTarget::Constructor => "<init>",
            MethodTarget::Named(name) => self.interner.lookup(name),
        };
        write!(
            f,
            "{}#{method}(",
            self.key.owner.display(self.interner)
        )?;
        for (i, p) in self.key.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", p.display(self.interner))?;
        }
        f.write_str(")")
    }
}
