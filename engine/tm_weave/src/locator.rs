//! Call-site locator.
//!
//! Enumerates every invocation in a class's method bodies, in method order
//! and then instruction order. Native and abstract methods have no body and
//! contribute nothing. Before enumerating, each body is checked for
//! well-formed register use so the rewriter never sees a body the
//! interpreter could not run.

use dashmap::DashMap;
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;

use tm_diagnostic::{malformed_body, SetupResult};
use tm_ir::{
    ClassDef, Instr, InvokeKind, MethodBody, MethodDef, MethodRef, Name, StringInterner, TypeRef,
};

use crate::match_key::MatchKey;

/// One invocation inside a method body of the class under test.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CallSite {
    /// Method whose body contains the call.
    pub method: MethodRef,
    /// Instruction index within that body.
    pub offset: u32,
    pub kind: InvokeKind,
    /// Static receiver type, static owner class, or constructed type.
    pub owner: TypeRef,
    pub name: Name,
    pub params: SmallVec<[TypeRef; 4]>,
    /// Type of the value the call produces.
    pub result_type: TypeRef,
}

impl CallSite {
    pub fn key(&self) -> MatchKey {
        MatchKey::for_site(self)
    }

    /// Format as `Owner.method(..)@offset` (requires interner).
    pub fn display<'a>(&'a self, interner: &'a StringInterner) -> CallSiteDisplay<'a> {
        CallSiteDisplay {
            site: self,
            interner,
        }
    }
}

/// Helper for displaying a [`CallSite`] with resolved names.
pub struct CallSiteDisplay<'a> {
    site: &'a CallSite,
    interner: &'a StringInterner,
}

impl fmt::Display for CallSiteDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{}",
            self.site.method.display(self.interner),
            self.site.offset
        )
    }
}

/// All call sites in `class`.
///
/// Fails if a body uses a register outside its declared locals or declares
/// fewer locals than it has arguments.
pub fn locate(class: &ClassDef, interner: &StringInterner) -> SetupResult<Vec<CallSite>> {
    let mut sites = Vec::new();
    for method in &class.methods {
        let MethodBody::Code { locals, instrs } = &method.body else {
            continue;
        };
        let source = method.method_ref(class.name);
        check_registers(method, &source, *locals, instrs, interner)?;

        for (offset, instr) in (0u32..).zip(instrs) {
            let Some(call) = instr.invocation() else {
                continue;
            };
            sites.push(CallSite {
                method: source.clone(),
                offset,
                kind: call.kind,
                owner: call.owner,
                name: call.method,
                params: call.sig.params.clone(),
                result_type: call.result_type(),
            });
        }
    }

    tracing::debug!(
        class = interner.lookup(class.name),
        sites = sites.len(),
        "located call sites"
    );
    Ok(sites)
}

fn check_registers(
    method: &MethodDef,
    source: &MethodRef,
    locals: u32,
    instrs: &[Instr],
    interner: &StringInterner,
) -> SetupResult<()> {
    let locals = locals as usize;
    if locals < method.arg_slots() {
        return Err(malformed_body(
            &source.display(interner).to_string(),
            &format!(
                "{locals} locals cannot hold {} arguments",
                method.arg_slots()
            ),
        ));
    }
    for (offset, instr) in instrs.iter().enumerate() {
        let out_of_range = instr
            .defined_var()
            .into_iter()
            .chain(instr.used_vars())
            .find(|var| var.index() >= locals);
        if let Some(var) = out_of_range {
            return Err(malformed_body(
                &source.display(interner).to_string(),
                &format!(
                    "instruction {offset} uses register {} of {locals}",
                    var.raw()
                ),
            ));
        }
    }
    Ok(())
}

/// Per-class memo of located call sites.
///
/// Location is deterministic for a class definition, so the first result
/// is kept. Failures are not cached.
#[derive(Default)]
pub struct SiteCache {
    sites: DashMap<Name, Arc<[CallSite]>>,
}

impl SiteCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_locate(
        &self,
        class: &ClassDef,
        interner: &StringInterner,
    ) -> SetupResult<Arc<[CallSite]>> {
        if let Some(hit) = self.sites.get(&class.name) {
            return Ok(Arc::clone(hit.value()));
        }
        let located: Arc<[CallSite]> = locate(class, interner)?.into();
        let entry = self.sites.entry(class.name).or_insert(located);
        Ok(Arc::clone(entry.value()))
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }
}
