//! Interned identifier.

use std::fmt;

/// Interned string identifier for class, method and field names.
///
/// Index into a [`StringInterner`](crate::StringInterner) table. The first
/// indices are reserved for well-known names so they can be used as
/// constants without an interner at hand.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct Name(u32);

impl Name {
    /// Pre-interned empty string.
    pub const EMPTY: Name = Name(0);
    /// `void`
    pub const VOID: Name = Name(1);
    /// `boolean`
    pub const BOOLEAN: Name = Name(2);
    /// `int`
    pub const INT: Name = Name(3);
    /// `long`
    pub const LONG: Name = Name(4);
    /// `double`
    pub const DOUBLE: Name = Name(5);
    /// Root of the reference type hierarchy.
    pub const OBJECT: Name = Name(6);
    /// `String`
    pub const STRING: Name = Name(7);
    /// Base class of unchecked exceptions.
    pub const RUNTIME_EXCEPTION: Name = Name(8);
    /// Method name carried by constructors.
    pub const INIT: Name = Name(9);
    /// Class attribute written by the rewriter.
    pub const INSTRUMENTED: Name = Name(10);
    /// Field holding an exception's message.
    pub const MESSAGE: Name = Name(11);
    /// `String.length()`
    pub const LENGTH: Name = Name(12);
    /// `String.substring(int, int)`
    pub const SUBSTRING: Name = Name(13);
    /// `String.concat(String)`
    pub const CONCAT: Name = Name(14);
    /// `String.toUpperCase()`
    pub const TO_UPPER_CASE: Name = Name(15);
    /// `RuntimeException.getMessage()`
    pub const GET_MESSAGE: Name = Name(16);

    /// Names interned in this order by every new interner.
    pub(crate) const WELL_KNOWN: &'static [&'static str] = &[
        "",
        "void",
        "boolean",
        "int",
        "long",
        "double",
        "Object",
        "String",
        "RuntimeException",
        "<init>",
        "$instrumented",
        "message",
        "length",
        "substring",
        "concat",
        "toUpperCase",
        "getMessage",
    ];

    /// Create from raw u32 value.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Name(raw)
    }

    /// Get raw u32 value.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Index into the interner table.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({})", self.0)
    }
}

impl Default for Name {
    fn default() -> Self {
        Self::EMPTY
    }
}
