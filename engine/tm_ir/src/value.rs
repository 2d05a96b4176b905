//! Runtime values.
//!
//! Objects are reference values: cloning a [`Value::Object`] shares the same
//! instance, and equality on objects is identity. Recorded call arguments
//! rely on this: a recorded object that is mutated after the call shows the
//! mutated state when verified.

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::{Name, StringInterner, TypeRef};

/// Display ids for objects; unrelated to identity comparison.
static NEXT_OBJECT_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Clone)]
pub enum Value {
    Null,
    /// Result of a `void` call.
    Void,
    Bool(bool),
    Int(i64),
    Str(Arc<str>),
    Object(ObjectRef),
}

impl Value {
    pub fn string(s: impl Into<Arc<str>>) -> Self {
        Value::Str(s.into())
    }

    /// Allocate a new, field-less instance of `class`.
    pub fn new_object(class: Name) -> Self {
        Value::Object(ObjectRef::new(class))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Runtime type of the value; `None` for `null`.
    pub fn runtime_type(&self) -> Option<TypeRef> {
        match self {
            Value::Null => None,
            Value::Void => Some(TypeRef::VOID),
            Value::Bool(_) => Some(TypeRef::BOOLEAN),
            Value::Int(_) => Some(TypeRef::INT),
            Value::Str(_) => Some(TypeRef::STRING),
            Value::Object(obj) => Some(TypeRef::named(obj.class())),
        }
    }

    /// Short kind name for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Void => "void",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "int",
            Value::Str(_) => "String",
            Value::Object(_) => "object",
        }
    }

    /// Same object instance. Non-objects compare by value.
    pub fn same_identity(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            _ => self == other,
        }
    }

    /// Text used by string concatenation.
    pub fn to_text(&self, interner: &StringInterner) -> String {
        match self {
            Value::Null => "null".to_owned(),
            Value::Void => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Int(n) => n.to_string(),
            Value::Str(s) => s.to_string(),
            Value::Object(obj) => format!("{}@{}", interner.lookup(obj.class()), obj.id()),
        }
    }

    /// Render for diagnostics (strings quoted).
    pub fn display<'a>(&'a self, interner: &'a StringInterner) -> ValueDisplay<'a> {
        ValueDisplay {
            value: self,
            interner,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) | (Value::Void, Value::Void) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl Eq for Value {}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "Null"),
            Value::Void => write!(f, "Void"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Int(n) => write!(f, "Int({n})"),
            Value::Str(s) => write!(f, "Str({s:?})"),
            Value::Object(obj) => write!(f, "Object(class={:?}, id={})", obj.class(), obj.id()),
        }
    }
}

/// Helper for displaying a [`Value`] with resolved class names.
pub struct ValueDisplay<'a> {
    value: &'a Value,
    interner: &'a StringInterner,
}

impl fmt::Display for ValueDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value {
            Value::Str(s) => write!(f, "{s:?}"),
            other => f.write_str(&other.to_text(self.interner)),
        }
    }
}

// ── Objects ─────────────────────────────────────────────────────────

struct Object {
    id: u64,
    class: Name,
    fields: Mutex<FxHashMap<Name, Value>>,
}

/// Shared handle to a heap object.
#[derive(Clone)]
pub struct ObjectRef(Arc<Object>);

impl ObjectRef {
    fn new(class: Name) -> Self {
        ObjectRef(Arc::new(Object {
            id: NEXT_OBJECT_ID.fetch_add(1, Ordering::Relaxed),
            class,
            fields: Mutex::new(FxHashMap::default()),
        }))
    }

    pub fn class(&self) -> Name {
        self.0.class
    }

    pub fn id(&self) -> u64 {
        self.0.id
    }

    /// Field value; unset fields read as `null`.
    pub fn get_field(&self, field: Name) -> Value {
        self.0
            .fields
            .lock()
            .get(&field)
            .cloned()
            .unwrap_or(Value::Null)
    }

    pub fn set_field(&self, field: Name, value: Value) {
        self.0.fields.lock().insert(field, value);
    }

    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}
