//! Method IR — the "compiled" form of classes that the locator scans and the
//! rewriter transforms.
//!
//! # Architecture
//!
//! - **[`ClassDef`]** — a class: name, supertypes, methods, attributes
//! - **[`MethodDef`]** — a method: signature, flags, body
//! - **[`Instr`]** — a register-based instruction
//!
//! Method bodies are flat instruction lists over numbered registers
//! ([`VarId`]). For instance methods register 0 holds the receiver and the
//! parameters follow; static methods start their parameters at 0.
//!
//! Calls appear in two forms. [`Instr::Call`] is an ordinary invocation as
//! emitted by the front end. [`Instr::MockCall`] only exists in
//! instrumented classes: the rewriter wraps the original [`Invocation`]
//! together with the mock it dispatches to, so the original call remains
//! available when a mock is inactive for the running test.

use smallvec::SmallVec;
use std::fmt;

use crate::{Name, StringInterner, TypeRef};

// ── ID newtypes ─────────────────────────────────────────────────────

/// Register within a method body.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct VarId(u32);

impl VarId {
    #[inline]
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Identifies a registered mock declaration within one session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct MockId(u32);

impl MockId {
    #[inline]
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

// ── Literals ────────────────────────────────────────────────────────

/// Constant operand of [`Instr::Const`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Literal {
    Null,
    Bool(bool),
    Int(i64),
    Str(Name),
}

// ── Signatures ──────────────────────────────────────────────────────

/// Parameter types and return type of a method.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MethodSig {
    pub params: SmallVec<[TypeRef; 4]>,
    pub ret: TypeRef,
}

impl MethodSig {
    pub fn new(params: impl IntoIterator<Item = TypeRef>, ret: TypeRef) -> Self {
        Self {
            params: params.into_iter().collect(),
            ret,
        }
    }
}

/// Identity of a method: declaring class, name, parameter types.
///
/// This is what "source method" refers to at run time and what the native
/// registry is keyed by.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MethodRef {
    pub owner: Name,
    pub name: Name,
    pub params: SmallVec<[TypeRef; 4]>,
}

impl MethodRef {
    pub fn new(owner: Name, name: Name, params: impl IntoIterator<Item = TypeRef>) -> Self {
        Self {
            owner,
            name,
            params: params.into_iter().collect(),
        }
    }

    /// Format as `Owner.name(T1, T2)` (requires interner).
    pub fn display<'a>(&'a self, interner: &'a StringInterner) -> MethodRefDisplay<'a> {
        MethodRefDisplay {
            method: self,
            interner,
        }
    }
}

/// Helper for displaying a [`MethodRef`] with resolved names.
pub struct MethodRefDisplay<'a> {
    method: &'a MethodRef,
    interner: &'a StringInterner,
}

impl fmt::Display for MethodRefDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}(",
            self.interner.lookup(self.method.owner),
            self.interner.lookup(self.method.name)
        )?;
        for (i, p) in self.method.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", p.display(self.interner))?;
        }
        f.write_str(")")
    }
}

// ── Invocations ─────────────────────────────────────────────────────

/// How an invocation dispatches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InvokeKind {
    /// Call on a receiver object (including `this`).
    Instance,
    /// Call on a class, no receiver.
    Static,
    /// `new Owner(args)`: allocation plus constructor call.
    Construct,
}

/// A call as written in the method body.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Invocation {
    /// Register receiving the result, if the result is used.
    pub dst: Option<VarId>,
    pub kind: InvokeKind,
    /// Statically known owner: receiver type, static class, or constructed class.
    pub owner: TypeRef,
    /// Method name; [`Name::INIT`] for constructions.
    pub method: Name,
    /// Resolved signature. For constructions `ret` is `void`.
    pub sig: MethodSig,
    /// Receiver register, present only for [`InvokeKind::Instance`].
    pub receiver: Option<VarId>,
    pub args: SmallVec<[VarId; 4]>,
}

impl Invocation {
    /// Type of the value the call site produces.
    ///
    /// A construction produces its owner type; everything else its
    /// declared return type.
    pub fn result_type(&self) -> TypeRef {
        match self.kind {
            InvokeKind::Construct => self.owner,
            InvokeKind::Instance | InvokeKind::Static => self.sig.ret,
        }
    }
}

/// A call redirected to a mock body by the rewriter.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MockedCall {
    /// The original invocation, run instead when the mock is inactive.
    pub call: Invocation,
    pub mock: MockId,
    /// Prepend the original receiver (or `null` for static sites) to the
    /// mock body's arguments.
    pub pass_receiver: bool,
    /// Method of the class under test that contains this call site.
    pub source: MethodRef,
}

// ── Instructions ────────────────────────────────────────────────────

/// A single instruction in a method body.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Instr {
    /// `dst = literal`
    Const { dst: VarId, value: Literal },
    /// `dst = src`
    Move { dst: VarId, src: VarId },
    /// `dst = str(parts[0]) + str(parts[1]) + ...`
    Concat { dst: VarId, parts: Vec<VarId> },
    /// `dst = object.field`
    GetField { dst: VarId, object: VarId, field: Name },
    /// `object.field = value`
    SetField {
        object: VarId,
        field: Name,
        value: VarId,
    },
    /// Ordinary invocation.
    Call(Invocation),
    /// Invocation substituted by the rewriter.
    MockCall(Box<MockedCall>),
    /// Throw `value` as an exception.
    Throw { value: VarId },
    /// Return from the method.
    Return { value: Option<VarId> },
}

impl Instr {
    /// The invocation performed by this instruction, original or mocked.
    pub fn invocation(&self) -> Option<&Invocation> {
        match self {
            Instr::Call(call) => Some(call),
            Instr::MockCall(mocked) => Some(&mocked.call),
            _ => None,
        }
    }

    /// Register written by this instruction, if any.
    pub fn defined_var(&self) -> Option<VarId> {
        match self {
            Instr::Const { dst, .. }
            | Instr::Move { dst, .. }
            | Instr::Concat { dst, .. }
            | Instr::GetField { dst, .. } => Some(*dst),
            Instr::Call(call) => call.dst,
            Instr::MockCall(mocked) => mocked.call.dst,
            Instr::SetField { .. } | Instr::Throw { .. } | Instr::Return { .. } => None,
        }
    }

    /// Registers read by this instruction.
    pub fn used_vars(&self) -> Vec<VarId> {
        fn call_uses(call: &Invocation) -> Vec<VarId> {
            let mut vars = Vec::with_capacity(1 + call.args.len());
            vars.extend(call.receiver);
            vars.extend_from_slice(&call.args);
            vars
        }
        match self {
            Instr::Const { .. } => vec![],
            Instr::Move { src, .. } => vec![*src],
            Instr::Concat { parts, .. } => parts.clone(),
            Instr::GetField { object, .. } => vec![*object],
            Instr::SetField { object, value, .. } => vec![*object, *value],
            Instr::Call(call) => call_uses(call),
            Instr::MockCall(mocked) => call_uses(&mocked.call),
            Instr::Throw { value } => vec![*value],
            Instr::Return { value } => value.iter().copied().collect(),
        }
    }
}

// ── Methods and classes ─────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Access {
    #[default]
    Public,
    /// Dispatched non-virtually on the declaring class.
    Private,
}

/// Body of a method.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum MethodBody {
    /// Interpretable instructions over `locals` registers.
    Code { locals: u32, instrs: Vec<Instr> },
    /// Implemented by the host, looked up in the native registry.
    Native,
    /// Declared only.
    Abstract,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MethodDef {
    pub name: Name,
    pub sig: MethodSig,
    pub is_static: bool,
    pub access: Access,
    pub body: MethodBody,
}

impl MethodDef {
    #[inline]
    pub fn is_constructor(&self) -> bool {
        self.name == Name::INIT
    }

    /// Registers occupied by the receiver and parameters.
    pub fn arg_slots(&self) -> usize {
        self.sig.params.len() + usize::from(!self.is_static)
    }

    /// Identity of this method when declared in `owner`.
    pub fn method_ref(&self, owner: Name) -> MethodRef {
        MethodRef {
            owner,
            name: self.name,
            params: self.sig.params.clone(),
        }
    }

    /// Same name and exact parameter types.
    pub fn matches(&self, name: Name, params: &[TypeRef]) -> bool {
        self.name == name && self.sig.params.as_slice() == params
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ClassDef {
    pub name: Name,
    /// `None` only for the root class.
    pub super_class: Option<Name>,
    pub interfaces: Vec<Name>,
    pub methods: Vec<MethodDef>,
    /// Class-level markers such as [`Name::INSTRUMENTED`].
    pub attributes: Vec<Name>,
}

impl ClassDef {
    /// Method declared directly in this class.
    pub fn find_method(&self, name: Name, params: &[TypeRef]) -> Option<&MethodDef> {
        self.methods.iter().find(|m| m.matches(name, params))
    }

    pub fn type_ref(&self) -> TypeRef {
        TypeRef::named(self.name)
    }

    pub fn has_attribute(&self, attr: Name) -> bool {
        self.attributes.contains(&attr)
    }

    /// The rewriter has already processed this class.
    pub fn is_instrumented(&self) -> bool {
        self.has_attribute(Name::INSTRUMENTED)
    }

    pub fn mark_instrumented(&mut self) {
        if !self.is_instrumented() {
            self.attributes.push(Name::INSTRUMENTED);
        }
    }
}

#[cfg(test)]
mod tests;
