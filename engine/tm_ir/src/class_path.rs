//! Class path: the set of loaded class definitions, plus hierarchy queries.
//!
//! [`ClassLookup`] is the query surface shared by the original class path
//! and by the interpreter's instrumented view of it. Implementors only
//! provide `lookup_class`; hierarchy walks, method resolution and
//! assignability come from the default methods so both views answer them
//! identically.

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::smallvec;
use std::sync::Arc;

use crate::ir::{Access, ClassDef, Instr, MethodBody, MethodDef, MethodSig, VarId};
use crate::{Name, SharedInterner, TypeRef};

/// Class definition lookup with hierarchy queries.
pub trait ClassLookup {
    /// Find a class by name.
    fn lookup_class(&self, name: Name) -> Option<&ClassDef>;

    /// `sub` equals `sup` or reaches it through superclasses/interfaces.
    ///
    /// Unknown classes end the walk; cyclic hierarchies terminate.
    fn is_subtype(&self, sub: Name, sup: Name) -> bool {
        if sub == sup {
            return true;
        }
        let mut seen = FxHashSet::default();
        let mut pending = vec![sub];
        while let Some(current) = pending.pop() {
            if !seen.insert(current) {
                continue;
            }
            let Some(class) = self.lookup_class(current) else {
                continue;
            };
            for parent in class.super_class.iter().chain(&class.interfaces) {
                if *parent == sup {
                    return true;
                }
                pending.push(*parent);
            }
        }
        false
    }

    /// A value of static type `from` may be used where `to` is expected.
    ///
    /// Primitives are only assignable to themselves. Every reference type
    /// is assignable to `Object`. Arrays are covariant in their element
    /// class when ranks agree.
    fn is_assignable(&self, from: TypeRef, to: TypeRef) -> bool {
        if from == to {
            return true;
        }
        if from.is_primitive() || to.is_primitive() {
            return false;
        }
        if to == TypeRef::OBJECT {
            return true;
        }
        if from.dims() != to.dims() {
            return false;
        }
        let element_primitive = |t: TypeRef| TypeRef::named(t.base()).is_primitive();
        if from.is_array() && (element_primitive(from) || element_primitive(to)) {
            return false;
        }
        self.is_subtype(from.base(), to.base())
    }

    /// Find the method a call on `class` resolves to, walking superclasses.
    ///
    /// Returns the declaring class together with the method.
    fn resolve_method(
        &self,
        class: Name,
        name: Name,
        params: &[TypeRef],
    ) -> Option<(Name, &MethodDef)> {
        let mut seen = FxHashSet::default();
        let mut current = Some(class);
        while let Some(owner) = current {
            if !seen.insert(owner) {
                return None;
            }
            let def = self.lookup_class(owner)?;
            if let Some(method) = def.find_method(name, params) {
                return Some((owner, method));
            }
            current = def.super_class;
        }
        None
    }
}

/// The original (uninstrumented) class definitions of a session.
pub struct ClassPath {
    interner: SharedInterner,
    classes: FxHashMap<Name, Arc<ClassDef>>,
}

impl ClassPath {
    /// Empty class path.
    pub fn new(interner: SharedInterner) -> Self {
        Self {
            interner,
            classes: FxHashMap::default(),
        }
    }

    /// Class path preloaded with `Object`, `String` and `RuntimeException`.
    pub fn with_core(interner: SharedInterner) -> Self {
        let mut path = Self::new(interner);
        for class in core_classes() {
            path.define(class);
        }
        path
    }

    pub fn interner(&self) -> &SharedInterner {
        &self.interner
    }

    /// Add or replace a class definition, returning the previous one.
    pub fn define(&mut self, class: ClassDef) -> Option<Arc<ClassDef>> {
        self.classes.insert(class.name, Arc::new(class))
    }

    /// Shared handle to a class definition.
    pub fn get(&self, name: Name) -> Option<&Arc<ClassDef>> {
        self.classes.get(&name)
    }

    pub fn contains(&self, name: Name) -> bool {
        self.classes.contains_key(&name)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl ClassLookup for ClassPath {
    fn lookup_class(&self, name: Name) -> Option<&ClassDef> {
        self.classes.get(&name).map(AsRef::as_ref)
    }
}

impl std::fmt::Debug for ClassPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassPath")
            .field("classes", &self.classes.len())
            .finish_non_exhaustive()
    }
}

fn native(name: Name, params: &[TypeRef], ret: TypeRef) -> MethodDef {
    MethodDef {
        name,
        sig: MethodSig::new(params.iter().copied(), ret),
        is_static: false,
        access: Access::Public,
        body: MethodBody::Native,
    }
}

/// Built-in classes every session can call into.
///
/// `String` methods are native; the interpreter's core natives implement
/// them. `RuntimeException(String)` stores its argument in `message`.
fn core_classes() -> Vec<ClassDef> {
    let object = ClassDef {
        name: Name::OBJECT,
        super_class: None,
        interfaces: vec![],
        methods: vec![],
        attributes: vec![],
    };

    let string = ClassDef {
        name: Name::STRING,
        super_class: Some(Name::OBJECT),
        interfaces: vec![],
        methods: vec![
            native(Name::LENGTH, &[], TypeRef::INT),
            native(
                Name::SUBSTRING,
                &[TypeRef::INT, TypeRef::INT],
                TypeRef::STRING,
            ),
            native(Name::CONCAT, &[TypeRef::STRING], TypeRef::STRING),
            native(Name::TO_UPPER_CASE, &[], TypeRef::STRING),
        ],
        attributes: vec![],
    };

    // this.message = arg0; return
    let exception_init = MethodDef {
        name: Name::INIT,
        sig: MethodSig::new([TypeRef::STRING], TypeRef::VOID),
        is_static: false,
        access: Access::Public,
        body: MethodBody::Code {
            locals: 2,
            instrs: vec![
                Instr::SetField {
                    object: VarId::new(0),
                    field: Name::MESSAGE,
                    value: VarId::new(1),
                },
                Instr::Return { value: None },
            ],
        },
    };
    let get_message = MethodDef {
        name: Name::GET_MESSAGE,
        sig: MethodSig {
            params: smallvec![],
            ret: TypeRef::STRING,
        },
        is_static: false,
        access: Access::Public,
        body: MethodBody::Code {
            locals: 2,
            instrs: vec![
                Instr::GetField {
                    dst: VarId::new(1),
                    object: VarId::new(0),
                    field: Name::MESSAGE,
                },
                Instr::Return {
                    value: Some(VarId::new(1)),
                },
            ],
        },
    };
    let runtime_exception = ClassDef {
        name: Name::RUNTIME_EXCEPTION,
        super_class: Some(Name::OBJECT),
        interfaces: vec![],
        methods: vec![exception_init, get_message],
        attributes: vec![],
    };

    vec![object, string, runtime_exception]
}
