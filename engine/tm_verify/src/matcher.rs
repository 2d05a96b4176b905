//! Argument matchers.

use regex::Regex;
use std::fmt;
use std::sync::Arc;

use tm_ir::{ClassLookup, StringInterner, TypeRef, Value};

type Predicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Condition on one recorded argument.
#[derive(Clone)]
pub enum ArgMatcher {
    /// Equal value; objects must be the same instance.
    Eq(Value),
    Any,
    AnyString,
    AnyInt,
    AnyBool,
    IsNull,
    NotNull,
    /// Non-null value whose runtime type is assignable to the type.
    AnyOfClass(TypeRef),
    StartsWith(String),
    EndsWith(String),
    Contains(String),
    /// String value in which the pattern finds a match.
    Matches(Regex),
    Custom {
        description: String,
        predicate: Predicate,
    },
}

impl ArgMatcher {
    pub fn eq(value: impl Into<Value>) -> Self {
        ArgMatcher::Eq(value.into())
    }

    pub fn starts_with(prefix: impl Into<String>) -> Self {
        ArgMatcher::StartsWith(prefix.into())
    }

    pub fn ends_with(suffix: impl Into<String>) -> Self {
        ArgMatcher::EndsWith(suffix.into())
    }

    pub fn contains(needle: impl Into<String>) -> Self {
        ArgMatcher::Contains(needle.into())
    }

    pub fn matches(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(pattern).map(ArgMatcher::Matches)
    }

    pub fn custom(
        description: impl Into<String>,
        predicate: impl Fn(&Value) -> bool + Send + Sync + 'static,
    ) -> Self {
        ArgMatcher::Custom {
            description: description.into(),
            predicate: Arc::new(predicate),
        }
    }

    /// Whether `value` satisfies this matcher.
    pub fn is_match(&self, value: &Value, classes: &dyn ClassLookup) -> bool {
        match self {
            ArgMatcher::Eq(expected) => expected == value,
            ArgMatcher::Any => true,
            ArgMatcher::AnyString => value.as_str().is_some(),
            ArgMatcher::AnyInt => value.as_int().is_some(),
            ArgMatcher::AnyBool => value.as_bool().is_some(),
            ArgMatcher::IsNull => value.is_null(),
            ArgMatcher::NotNull => !value.is_null(),
            ArgMatcher::AnyOfClass(ty) => value
                .runtime_type()
                .is_some_and(|actual| classes.is_assignable(actual, *ty)),
            ArgMatcher::StartsWith(prefix) => value.as_str().is_some_and(|s| s.starts_with(prefix.as_str())),
            ArgMatcher::EndsWith(suffix) => value.as_str().is_some_and(|s| s.ends_with(suffix.as_str())),
            ArgMatcher::Contains(needle) => value.as_str().is_some_and(|s| s.contains(needle.as_str())),
            ArgMatcher::Matches(re) => value.as_str().is_some_and(|s| re.is_match(s)),
            ArgMatcher::Custom { predicate, .. } => predicate(value),
        }
    }

    /// Format for diagnostics (requires interner).
    pub fn display<'a>(&'a self, interner: &'a StringInterner) -> ArgMatcherDisplay<'a> {
        ArgMatcherDisplay {
            matcher: self,
            interner,
        }
    }
}

impl fmt::Debug for ArgMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgMatcher::Eq(v) => f.debug_tuple("Eq").field(v).finish(),
            ArgMatcher::Any => f.write_str("Any"),
            ArgMatcher::AnyString => f.write_str("AnyString"),
            ArgMatcher::AnyInt => f.write_str("AnyInt"),
            ArgMatcher::AnyBool => f.write_str("AnyBool"),
            ArgMatcher::IsNull => f.write_str("IsNull"),
            ArgMatcher::NotNull => f.write_str("NotNull"),
            ArgMatcher::AnyOfClass(ty) => f.debug_tuple("AnyOfClass").field(ty).finish(),
            ArgMatcher::StartsWith(s) => f.debug_tuple("StartsWith").field(s).finish(),
            ArgMatcher::EndsWith(s) => f.debug_tuple("EndsWith").field(s).finish(),
            ArgMatcher::Contains(s) => f.debug_tuple("Contains").field(s).finish(),
            ArgMatcher::Matches(re) => f.debug_tuple("Matches").field(&re.as_str()).finish(),
            ArgMatcher::Custom { description, .. } => {
                f.debug_tuple("Custom").field(description).finish()
            }
        }
    }
}

/// Helper for displaying an [`ArgMatcher`] with resolved names.
pub struct ArgMatcherDisplay<'a> {
    matcher: &'a ArgMatcher,
    interner: &'a StringInterner,
}

impl fmt::Display for ArgMatcherDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.matcher {
            ArgMatcher::Eq(v) => write!(f, "{}", v.display(self.interner)),
            ArgMatcher::Any => f.write_str("any()"),
            ArgMatcher::AnyString => f.write_str("anyString()"),
            ArgMatcher::AnyInt => f.write_str("anyInt()"),
            ArgMatcher::AnyBool => f.write_str("anyBool()"),
            ArgMatcher::IsNull => f.write_str("isNull()"),
            ArgMatcher::NotNull => f.write_str("notNull()"),
            ArgMatcher::AnyOfClass(ty) => write!(f, "any({})", ty.display(self.interner)),
            ArgMatcher::StartsWith(s) => write!(f, "startsWith({s:?})"),
            ArgMatcher::EndsWith(s) => write!(f, "endsWith({s:?})"),
            ArgMatcher::Contains(s) => write!(f, "contains({s:?})"),
            ArgMatcher::Matches(re) => write!(f, "matches({:?})", re.as_str()),
            ArgMatcher::Custom { description, .. } => write!(f, "<{description}>"),
        }
    }
}

#[cfg(test)]
mod tests;
