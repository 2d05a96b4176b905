//! Native method registry.
//!
//! Methods with a [`MethodBody::Native`](tm_ir::MethodBody::Native) body are
//! implemented by the host and looked up here by their [`MethodRef`]. The
//! registry also serves static methods of host-only classes that have no
//! class definition at all, such as the `InvocationContext` accessors mock
//! bodies use to read the running execution's context.

use rustc_hash::FxHashMap;
use std::sync::Arc;

use tm_ir::{MethodRef, Name, StringInterner, TypeRef, Value};

use crate::errors::{thrown, type_mismatch, EvalResult};
use crate::execution::TestExecution;

/// Host class exposing the invocation context to interpreted code.
pub const CONTEXT_CLASS: &str = "InvocationContext";

/// Arguments of one native invocation.
pub struct NativeCall<'a> {
    pub interner: &'a StringInterner,
    pub execution: &'a TestExecution,
    /// `None` for static natives.
    pub receiver: Option<&'a Value>,
    pub args: &'a [Value],
}

impl NativeCall<'_> {
    fn receiver_str(&self) -> Result<&str, crate::EvalError> {
        let recv = self.receiver.unwrap_or(&Value::Null);
        recv.as_str()
            .ok_or_else(|| type_mismatch("String", recv.kind_name()))
    }

    fn arg(&self, i: usize) -> &Value {
        self.args.get(i).unwrap_or(&Value::Null)
    }

    fn int_arg(&self, i: usize) -> Result<i64, crate::EvalError> {
        let arg = self.arg(i);
        arg.as_int().ok_or_else(|| type_mismatch("int", arg.kind_name()))
    }

    fn str_arg(&self, i: usize) -> Result<&str, crate::EvalError> {
        let arg = self.arg(i);
        arg.as_str()
            .ok_or_else(|| type_mismatch("String", arg.kind_name()))
    }
}

pub type NativeFn = Arc<dyn Fn(&NativeCall<'_>) -> EvalResult + Send + Sync>;

#[derive(Clone, Default)]
pub struct NativeRegistry {
    natives: FxHashMap<MethodRef, NativeFn>,
}

impl NativeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the `String` methods and the `InvocationContext`
    /// accessors.
    pub fn with_core(interner: &StringInterner) -> Self {
        let mut natives = Self::new();
        register_string(&mut natives);
        register_context(&mut natives, interner);
        natives
    }

    pub fn register(
        &mut self,
        method: MethodRef,
        f: impl Fn(&NativeCall<'_>) -> EvalResult + Send + Sync + 'static,
    ) {
        self.natives.insert(method, Arc::new(f));
    }

    pub fn get(&self, method: &MethodRef) -> Option<&NativeFn> {
        self.natives.get(method)
    }

    pub fn len(&self) -> usize {
        self.natives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.natives.is_empty()
    }
}

impl std::fmt::Debug for NativeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeRegistry")
            .field("natives", &self.natives.len())
            .finish()
    }
}

/// A `RuntimeException` carrying `message`, as interpreted code would
/// throw it.
pub fn runtime_exception(message: &str) -> crate::EvalError {
    let exception = Value::new_object(Name::RUNTIME_EXCEPTION);
    if let Value::Object(obj) = &exception {
        obj.set_field(Name::MESSAGE, Value::string(message));
    }
    thrown(exception, format!("RuntimeException: {message}"))
}

fn register_string(natives: &mut NativeRegistry) {
    let string = |name, params: &[TypeRef]| MethodRef::new(Name::STRING, name, params.iter().copied());

    natives.register(string(Name::LENGTH, &[]), |call| {
        let s = call.receiver_str()?;
        Ok(Value::Int(i64::try_from(s.chars().count()).unwrap_or(i64::MAX)))
    });

    natives.register(
        string(Name::SUBSTRING, &[TypeRef::INT, TypeRef::INT]),
        |call| {
            let s = call.receiver_str()?;
            let (begin, end) = (call.int_arg(0)?, call.int_arg(1)?);
            let len = s.chars().count();
            let range = usize::try_from(begin)
                .ok()
                .zip(usize::try_from(end).ok())
                .filter(|(b, e)| b <= e && *e <= len);
            let Some((b, e)) = range else {
                return Err(runtime_exception(&format!(
                    "begin {begin}, end {end}, length {len}"
                )));
            };
            Ok(Value::string(s.chars().skip(b).take(e - b).collect::<String>()))
        },
    );

    natives.register(string(Name::CONCAT, &[TypeRef::STRING]), |call| {
        let s = call.receiver_str()?;
        let other = call.str_arg(0)?;
        Ok(Value::string(format!("{s}{other}")))
    });

    natives.register(string(Name::TO_UPPER_CASE, &[]), |call| {
        Ok(Value::string(call.receiver_str()?.to_uppercase()))
    });
}

fn register_context(natives: &mut NativeRegistry, interner: &StringInterner) {
    let class = interner.intern(CONTEXT_CLASS);
    let method = |name: &str, params: &[TypeRef]| {
        MethodRef::new(class, interner.intern(name), params.iter().copied())
    };

    natives.register(method("get", &[TypeRef::STRING]), |call| {
        let key = call.str_arg(0)?;
        Ok(call.execution.context.get(key).unwrap_or(Value::Null))
    });

    natives.register(
        method("set", &[TypeRef::STRING, TypeRef::OBJECT]),
        |call| {
            let key = call.str_arg(0)?;
            call.execution.context.set(key, call.arg(1).clone());
            Ok(Value::Void)
        },
    );

    natives.register(method("sourceMethod", &[]), |call| {
        Ok(call
            .execution
            .context
            .current_source_method()
            .map_or(Value::Null, |m| {
                Value::string(m.display(call.interner).to_string())
            }))
    });

    natives.register(method("sourceMethodName", &[]), |call| {
        Ok(call
            .execution
            .context
            .current_source_method()
            .map_or(Value::Null, |m| Value::string(call.interner.lookup(m.name))))
    });
}
