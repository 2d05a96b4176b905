//! Builders for class and method definitions.
//!
//! The class-scanning bootstrap and tests describe classes with these
//! builders instead of assembling [`ClassDef`] by hand. Type names are given
//! as source text and parsed with [`TypeRef::parse`]; the first malformed
//! name is reported by `build()`.
//!
//! ```text
//! let demo = ClassBuilder::new(&interner, "Demo")
//!     .method(
//!         MethodBuilder::instance(&interner, "outerFunc")
//!             .param("String")
//!             .returns("String")
//!             .code(|b| {
//!                 let arg = b.param(0);
//!                 let out = b.call_instance(b.this(), "Demo", "innerFunc", &["String"], "String", &[arg]);
//!                 b.ret(out);
//!             }),
//!     )
//!     .build()?;
//! ```

use smallvec::SmallVec;

use crate::ir::{
    Access, ClassDef, Instr, Invocation, InvokeKind, Literal, MethodBody, MethodDef, MethodSig,
    VarId,
};
use crate::{Name, StringInterner, TypeParseError, TypeRef};

/// Parses type names, remembering the first failure.
struct TypeSink<'i> {
    interner: &'i StringInterner,
    error: Option<TypeParseError>,
}

impl TypeSink<'_> {
    fn ty(&mut self, text: &str) -> TypeRef {
        match TypeRef::parse(text, self.interner) {
            Ok(ty) => ty,
            Err(e) => {
                self.error.get_or_insert(e);
                TypeRef::OBJECT
            }
        }
    }

    fn finish<T>(self, value: T) -> Result<T, TypeParseError> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(value),
        }
    }
}

// ── Classes ─────────────────────────────────────────────────────────

pub struct ClassBuilder<'i> {
    types: TypeSink<'i>,
    class: ClassDef,
}

impl<'i> ClassBuilder<'i> {
    /// New class extending `Object`.
    pub fn new(interner: &'i StringInterner, name: &str) -> Self {
        let mut types = TypeSink {
            interner,
            error: None,
        };
        let name = types.ty(name).base();
        Self {
            types,
            class: ClassDef {
                name,
                super_class: Some(Name::OBJECT),
                interfaces: vec![],
                methods: vec![],
                attributes: vec![],
            },
        }
    }

    #[must_use]
    pub fn extends(mut self, super_class: &str) -> Self {
        self.class.super_class = Some(self.types.ty(super_class).base());
        self
    }

    #[must_use]
    pub fn implements(mut self, interface: &str) -> Self {
        let iface = self.types.ty(interface).base();
        self.class.interfaces.push(iface);
        self
    }

    #[must_use]
    pub fn method(mut self, method: MethodBuilder<'_>) -> Self {
        match method.build() {
            Ok(def) => self.class.methods.push(def),
            Err(e) => {
                self.types.error.get_or_insert(e);
            }
        }
        self
    }

    pub fn build(self) -> Result<ClassDef, TypeParseError> {
        self.types.finish(self.class)
    }
}

// ── Methods ─────────────────────────────────────────────────────────

pub struct MethodBuilder<'i> {
    types: TypeSink<'i>,
    name: Name,
    params: SmallVec<[TypeRef; 4]>,
    ret: TypeRef,
    is_static: bool,
    access: Access,
    body: MethodBody,
}

impl<'i> MethodBuilder<'i> {
    fn with_kind(interner: &'i StringInterner, name: Name, is_static: bool) -> Self {
        Self {
            types: TypeSink {
                interner,
                error: None,
            },
            name,
            params: SmallVec::new(),
            ret: TypeRef::VOID,
            is_static,
            access: Access::Public,
            body: MethodBody::Abstract,
        }
    }

    pub fn instance(interner: &'i StringInterner, name: &str) -> Self {
        Self::with_kind(interner, interner.intern(name), false)
    }

    pub fn static_method(interner: &'i StringInterner, name: &str) -> Self {
        Self::with_kind(interner, interner.intern(name), true)
    }

    pub fn constructor(interner: &'i StringInterner) -> Self {
        Self::with_kind(interner, Name::INIT, false)
    }

    /// Append a parameter. Declare all parameters before [`code`](Self::code).
    #[must_use]
    pub fn param(mut self, ty: &str) -> Self {
        let ty = self.types.ty(ty);
        self.params.push(ty);
        self
    }

    #[must_use]
    pub fn returns(mut self, ty: &str) -> Self {
        self.ret = self.types.ty(ty);
        self
    }

    #[must_use]
    pub fn private(mut self) -> Self {
        self.access = Access::Private;
        self
    }

    #[must_use]
    pub fn native(mut self) -> Self {
        self.body = MethodBody::Native;
        self
    }

    /// Emit the body with a [`CodeBuilder`].
    #[must_use]
    pub fn code(mut self, emit: impl FnOnce(&mut CodeBuilder<'_>)) -> Self {
        let receiver = u32::from(!self.is_static);
        let slots = u32::try_from(self.params.len()).unwrap_or(u32::MAX);
        let mut code = CodeBuilder {
            types: TypeSink {
                interner: self.types.interner,
                error: None,
            },
            receiver,
            params: slots,
            next_var: receiver.saturating_add(slots),
            instrs: Vec::new(),
        };
        emit(&mut code);
        if let Some(e) = code.types.error {
            self.types.error.get_or_insert(e);
        }
        self.body = MethodBody::Code {
            locals: code.next_var,
            instrs: code.instrs,
        };
        self
    }

    pub fn build(self) -> Result<MethodDef, TypeParseError> {
        let def = MethodDef {
            name: self.name,
            sig: MethodSig {
                params: self.params,
                ret: self.ret,
            },
            is_static: self.is_static,
            access: self.access,
            body: self.body,
        };
        self.types.finish(def)
    }
}

// ── Code ────────────────────────────────────────────────────────────

/// Emits instructions, allocating a fresh register per produced value.
pub struct CodeBuilder<'i> {
    types: TypeSink<'i>,
    receiver: u32,
    params: u32,
    next_var: u32,
    instrs: Vec<Instr>,
}

impl CodeBuilder<'_> {
    /// Receiver register. Only meaningful in instance methods.
    pub fn this(&self) -> VarId {
        VarId::new(0)
    }

    /// Register of parameter `i` (0-based, excluding the receiver).
    pub fn param(&self, i: u32) -> VarId {
        debug_assert!(i < self.params, "parameter {i} out of range");
        VarId::new(self.receiver + i)
    }

    pub fn fresh(&mut self) -> VarId {
        let var = VarId::new(self.next_var);
        self.next_var += 1;
        var
    }

    /// Append a raw instruction.
    pub fn push(&mut self, instr: Instr) {
        self.instrs.push(instr);
    }

    fn literal(&mut self, value: Literal) -> VarId {
        let dst = self.fresh();
        self.push(Instr::Const { dst, value });
        dst
    }

    pub fn const_str(&mut self, s: &str) -> VarId {
        let name = self.types.interner.intern(s);
        self.literal(Literal::Str(name))
    }

    pub fn const_int(&mut self, n: i64) -> VarId {
        self.literal(Literal::Int(n))
    }

    pub fn const_bool(&mut self, b: bool) -> VarId {
        self.literal(Literal::Bool(b))
    }

    pub fn const_null(&mut self) -> VarId {
        self.literal(Literal::Null)
    }

    pub fn concat(&mut self, parts: &[VarId]) -> VarId {
        let dst = self.fresh();
        self.push(Instr::Concat {
            dst,
            parts: parts.to_vec(),
        });
        dst
    }

    pub fn get_field(&mut self, object: VarId, field: &str) -> VarId {
        let field = self.types.interner.intern(field);
        let dst = self.fresh();
        self.push(Instr::GetField { dst, object, field });
        dst
    }

    pub fn set_field(&mut self, object: VarId, field: &str, value: VarId) {
        let field = self.types.interner.intern(field);
        self.push(Instr::SetField {
            object,
            field,
            value,
        });
    }

    #[allow(clippy::too_many_arguments, reason = "mirrors the invocation fields")]
    fn invoke(
        &mut self,
        kind: InvokeKind,
        receiver: Option<VarId>,
        owner: &str,
        method: Name,
        params: &[&str],
        ret: TypeRef,
        args: &[VarId],
    ) -> VarId {
        let owner = self.types.ty(owner);
        let params: SmallVec<[TypeRef; 4]> = params.iter().map(|p| self.types.ty(p)).collect();
        let dst = self.fresh();
        self.push(Instr::Call(Invocation {
            dst: Some(dst),
            kind,
            owner,
            method,
            sig: MethodSig { params, ret },
            receiver,
            args: args.iter().copied().collect(),
        }));
        dst
    }

    /// `receiver.method(args)` with `owner` as the static receiver type.
    pub fn call_instance(
        &mut self,
        receiver: VarId,
        owner: &str,
        method: &str,
        params: &[&str],
        ret: &str,
        args: &[VarId],
    ) -> VarId {
        let method = self.types.interner.intern(method);
        let ret = self.types.ty(ret);
        self.invoke(
            InvokeKind::Instance,
            Some(receiver),
            owner,
            method,
            params,
            ret,
            args,
        )
    }

    /// `Owner.method(args)`.
    pub fn call_static(
        &mut self,
        owner: &str,
        method: &str,
        params: &[&str],
        ret: &str,
        args: &[VarId],
    ) -> VarId {
        let method = self.types.interner.intern(method);
        let ret = self.types.ty(ret);
        self.invoke(InvokeKind::Static, None, owner, method, params, ret, args)
    }

    /// `new Class(args)`.
    pub fn construct(&mut self, class: &str, params: &[&str], args: &[VarId]) -> VarId {
        self.invoke(
            InvokeKind::Construct,
            None,
            class,
            Name::INIT,
            params,
            TypeRef::VOID,
            args,
        )
    }

    pub fn throw(&mut self, value: VarId) {
        self.push(Instr::Throw { value });
    }

    pub fn ret(&mut self, value: VarId) {
        self.push(Instr::Return { value: Some(value) });
    }

    pub fn ret_void(&mut self) {
        self.push(Instr::Return { value: None });
    }
}
