//! Erased type identities.
//!
//! Signature matching compares parameter and owner types structurally, by
//! their erased identity: the raw class name plus the array rank. Generic
//! arguments never participate, so `List<String>` and `List<Integer>` are
//! the same parameter type, while `String` and `String[]` are not.

use std::fmt;

use crate::{Name, StringInterner};

/// Erased type identity: base class (or primitive) name and array rank.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct TypeRef {
    base: Name,
    dims: u8,
}

impl TypeRef {
    pub const VOID: TypeRef = TypeRef::named(Name::VOID);
    pub const BOOLEAN: TypeRef = TypeRef::named(Name::BOOLEAN);
    pub const INT: TypeRef = TypeRef::named(Name::INT);
    pub const LONG: TypeRef = TypeRef::named(Name::LONG);
    pub const DOUBLE: TypeRef = TypeRef::named(Name::DOUBLE);
    pub const OBJECT: TypeRef = TypeRef::named(Name::OBJECT);
    pub const STRING: TypeRef = TypeRef::named(Name::STRING);
    pub const RUNTIME_EXCEPTION: TypeRef = TypeRef::named(Name::RUNTIME_EXCEPTION);

    /// Non-array type.
    #[inline]
    pub const fn named(base: Name) -> Self {
        TypeRef { base, dims: 0 }
    }

    /// Array type with `dims` dimensions over `base`.
    #[inline]
    pub const fn array(base: Name, dims: u8) -> Self {
        TypeRef { base, dims }
    }

    #[inline]
    pub const fn base(self) -> Name {
        self.base
    }

    #[inline]
    pub const fn dims(self) -> u8 {
        self.dims
    }

    #[inline]
    pub fn is_array(self) -> bool {
        self.dims > 0
    }

    #[inline]
    pub fn is_void(self) -> bool {
        self == Self::VOID
    }

    /// Primitive scalar (or `void`). Arrays of primitives are references.
    pub fn is_primitive(self) -> bool {
        self.dims == 0
            && matches!(
                self.base,
                Name::VOID | Name::BOOLEAN | Name::INT | Name::LONG | Name::DOUBLE
            )
    }

    #[inline]
    pub fn is_reference(self) -> bool {
        !self.is_primitive()
    }

    /// Element type of an array, `None` for non-arrays.
    pub fn element(self) -> Option<TypeRef> {
        (self.dims > 0).then(|| TypeRef::array(self.base, self.dims - 1))
    }

    /// Parse a source-level type name into its erased identity.
    ///
    /// Accepts `Name`, `Name<Args...>` and any number of `[]` suffixes.
    /// Generic arguments are checked for balance and then discarded.
    pub fn parse(text: &str, interner: &StringInterner) -> Result<TypeRef, TypeParseError> {
        let mut rest = text.trim();
        let mut dims: u8 = 0;
        while let Some(stripped) = rest.strip_suffix("[]") {
            dims = dims
                .checked_add(1)
                .ok_or_else(|| TypeParseError::TooManyDimensions(text.to_owned()))?;
            rest = stripped.trim_end();
        }

        let raw = match rest.find('<') {
            Some(open) => {
                if !rest.ends_with('>') || !generics_balanced(&rest[open..]) {
                    return Err(TypeParseError::UnbalancedGenerics(text.to_owned()));
                }
                rest[..open].trim_end()
            }
            None if rest.contains('>') => {
                return Err(TypeParseError::UnbalancedGenerics(text.to_owned()));
            }
            None => rest,
        };

        if raw.is_empty() || raw.contains(char::is_whitespace) {
            return Err(TypeParseError::Empty(text.to_owned()));
        }

        Ok(TypeRef::array(interner.intern(raw), dims))
    }

    /// Format the type for display (requires interner).
    pub fn display(self, interner: &StringInterner) -> TypeRefDisplay<'_> {
        TypeRefDisplay { ty: self, interner }
    }
}

fn generics_balanced(s: &str) -> bool {
    let mut depth: usize = 0;
    for (i, ch) in s.char_indices() {
        match ch {
            '<' => depth += 1,
            '>' => {
                let Some(d) = depth.checked_sub(1) else {
                    return false;
                };
                depth = d;
                // The outermost list must close at the very end.
                if depth == 0 && i + 1 != s.len() {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}

/// Error for malformed type names.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeParseError {
    Empty(String),
    UnbalancedGenerics(String),
    TooManyDimensions(String),
}

impl fmt::Display for TypeParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty(t) => write!(f, "`{t}` does not name a type"),
            Self::UnbalancedGenerics(t) => write!(f, "unbalanced type arguments in `{t}`"),
            Self::TooManyDimensions(t) => write!(f, "too many array dimensions in `{t}`"),
        }
    }
}

impl std::error::Error for TypeParseError {}

/// Helper for displaying a [`TypeRef`] with its resolved name.
pub struct TypeRefDisplay<'a> {
    ty: TypeRef,
    interner: &'a StringInterner,
}

impl fmt::Display for TypeRefDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.interner.lookup(self.ty.base))?;
        for _ in 0..self.ty.dims {
            f.write_str("[]")?;
        }
        Ok(())
    }
}
