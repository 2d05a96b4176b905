//! Substitution rewriter.
//!
//! Produces the instrumented form of a class: every located call site whose
//! key is in the mock mapping becomes an [`Instr::MockCall`] that keeps the
//! original invocation and names the mock to dispatch to. Unmatched sites
//! and everything else in the class are copied unchanged. The input class
//! is never modified.
//!
//! # Argument shaping
//!
//! | declaration | mock body receives |
//! |---|---|
//! | explicit target class | the original arguments |
//! | no target class, instance site | receiver, then the original arguments |
//! | no target class, static site | `null`, then the original arguments |
//! | constructor | the constructor arguments |
//!
//! The interpreter performs the shaping; the rewriter only records
//! `pass_receiver` on the substituted instruction.

use rustc_hash::FxHashMap;

use tm_diagnostic::{return_type_mismatch, SetupResult};
use tm_ir::{
    ClassDef, ClassLookup, Instr, MethodBody, MethodRef, MockId, MockedCall, StringInterner,
};

use crate::config::WeaveConfig;
use crate::locator::CallSite;
use crate::registry::{MockEntry, MockMapping};

/// One call site redirected to a mock.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Substitution {
    pub site: CallSite,
    pub mock: MockId,
    pub pass_receiver: bool,
}

/// Result of rewriting one class.
#[derive(Clone, Debug)]
pub struct RewriteOutcome {
    pub class: ClassDef,
    /// Empty when the class was already instrumented.
    pub substitutions: Vec<Substitution>,
}

/// Rewrite `class`, whose call sites are `sites`, against `mapping`.
///
/// Fails with a signature mismatch if a matched mock's return type cannot
/// be assigned to the call's result type. Already-instrumented classes are
/// returned as they are.
pub fn rewrite(
    class: &ClassDef,
    sites: &[CallSite],
    mapping: &MockMapping,
    lookup: &impl ClassLookup,
    interner: &StringInterner,
    config: WeaveConfig,
) -> SetupResult<RewriteOutcome> {
    let class_name = interner.lookup(class.name);
    if class.is_instrumented() {
        tracing::debug!(class = class_name, "already instrumented, skipping");
        return Ok(RewriteOutcome {
            class: class.clone(),
            substitutions: vec![],
        });
    }

    let mut substitutions = Vec::new();
    for site in sites {
        let key = site.key();
        let Some(entry) = mapping.lookup(&key) else {
            if config.reports_unmatched() {
                tracing::debug!(
                    site = %site.display(interner),
                    key = %key.display(interner),
                    "no mock for call site"
                );
            }
            continue;
        };
        check_return_type(site, entry, lookup, interner)?;

        let substitution = Substitution {
            site: site.clone(),
            mock: entry.id,
            pass_receiver: entry.decl.takes_receiver(),
        };
        if config.reports_substitutions() {
            tracing::info!(
                site = %site.display(interner),
                mock = %entry.decl.body_ref().display(interner),
                pass_receiver = substitution.pass_receiver,
                "substituting call"
            );
        }
        substitutions.push(substitution);
    }

    let by_site: FxHashMap<(MethodRef, u32), (MockId, bool)> = substitutions
        .iter()
        .map(|sub| {
            (
                (sub.site.method.clone(), sub.site.offset),
                (sub.mock, sub.pass_receiver),
            )
        })
        .collect();

    let mut instrumented = class.clone();
    for method in &mut instrumented.methods {
        let source = method.method_ref(class.name);
        let MethodBody::Code { instrs, .. } = &mut method.body else {
            continue;
        };
        for (offset, instr) in (0u32..).zip(instrs.iter_mut()) {
            let Some(&(mock, pass_receiver)) = by_site.get(&(source.clone(), offset)) else {
                continue;
            };
            let Instr::Call(call) = &*instr else {
                continue;
            };
            *instr = Instr::MockCall(Box::new(MockedCall {
                call: call.clone(),
                mock,
                pass_receiver,
                source: source.clone(),
            }));
        }
    }
    instrumented.mark_instrumented();

    tracing::debug!(
        class = class_name,
        sites = sites.len(),
        substituted = substitutions.len(),
        "rewrote class"
    );
    Ok(RewriteOutcome {
        class: instrumented,
        substitutions,
    })
}

fn check_return_type(
    site: &CallSite,
    entry: &MockEntry,
    lookup: &impl ClassLookup,
    interner: &StringInterner,
) -> SetupResult<()> {
    let found = entry.decl.return_type;
    let expected = site.result_type;
    if expected.is_void() || lookup.is_assignable(found, expected) {
        return Ok(());
    }
    Err(return_type_mismatch(
        &site.display(interner).to_string(),
        &entry.decl.body_ref().display(interner).to_string(),
        &expected.display(interner).to_string(),
        &found.display(interner).to_string(),
    ))
}
