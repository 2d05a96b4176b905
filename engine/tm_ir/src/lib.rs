//! Intermediate representation for the call-site substitution engine.
//!
//! This crate provides:
//!
//! - **Names** ([`Name`], [`StringInterner`], [`SharedInterner`]) — interned
//!   identifiers for classes, methods, fields and string literals.
//! - **Types** ([`TypeRef`]) — erased type identity used for signature
//!   matching: raw class name plus array rank, generic arguments dropped.
//! - **Method IR** ([`ClassDef`], [`MethodDef`], [`Instr`], [`Invocation`]) —
//!   the compiled form of a class that the locator scans, the rewriter
//!   transforms and the interpreter executes.
//! - **Class path** ([`ClassPath`], [`ClassLookup`]) — loaded classes with
//!   hierarchy, method resolution and assignability queries.
//! - **Values** ([`Value`], [`ObjectRef`]) — runtime values with reference
//!   semantics for objects.
//! - **Builders** ([`ClassBuilder`], [`MethodBuilder`], [`CodeBuilder`]).

pub mod builder;
mod class_path;
mod interner;
pub mod ir;
mod name;
mod types;
mod value;

pub use builder::{ClassBuilder, CodeBuilder, MethodBuilder};
pub use class_path::{ClassLookup, ClassPath};
pub use interner::{InternError, SharedInterner, StringInterner};
pub use ir::{
    Access, ClassDef, Instr, Invocation, InvokeKind, Literal, MethodBody, MethodDef, MethodRef,
    MethodSig, MockId, MockedCall, VarId,
};
pub use name::Name;
pub use types::{TypeParseError, TypeRef, TypeRefDisplay};
pub use value::{ObjectRef, Value, ValueDisplay};
