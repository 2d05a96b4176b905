#![allow(clippy::unwrap_used, clippy::expect_used)]

use pretty_assertions::assert_eq;

use tm_ir::{ClassBuilder, ClassPath, Name, SharedInterner, TypeRef, Value};

use super::*;

fn classes() -> ClassPath {
    let interner = SharedInterner::new();
    let mut path = ClassPath::with_core(interner.clone());
    path.define(ClassBuilder::new(&interner, "Animal").build().unwrap());
    path.define(
        ClassBuilder::new(&interner, "Dog")
            .extends("Animal")
            .build()
            .unwrap(),
    );
    path
}

#[test]
fn value_matchers() {
    let path = classes();
    let s = Value::from("hello world");
    assert!(ArgMatcher::eq("hello world").is_match(&s, &path));
    assert!(!ArgMatcher::eq("hello").is_match(&s, &path));
    assert!(ArgMatcher::AnyString.is_match(&s, &path));
    assert!(!ArgMatcher::AnyInt.is_match(&s, &path));
    assert!(ArgMatcher::AnyInt.is_match(&Value::Int(3), &path));
    assert!(ArgMatcher::AnyBool.is_match(&Value::Bool(false), &path));
    assert!(ArgMatcher::IsNull.is_match(&Value::Null, &path));
    assert!(!ArgMatcher::NotNull.is_match(&Value::Null, &path));
    assert!(ArgMatcher::Any.is_match(&Value::Null, &path));
}

#[test]
fn string_matchers() {
    let path = classes();
    let s = Value::from("order-42");
    assert!(ArgMatcher::starts_with("order").is_match(&s, &path));
    assert!(ArgMatcher::ends_with("42").is_match(&s, &path));
    assert!(ArgMatcher::contains("-").is_match(&s, &path));
    assert!(ArgMatcher::matches(r"^order-\d+$").unwrap().is_match(&s, &path));
    assert!(!ArgMatcher::starts_with("order").is_match(&Value::Int(1), &path));
    assert!(ArgMatcher::matches("(").is_err());
}

#[test]
fn class_matcher_accepts_subtypes() {
    let path = classes();
    let interner = path.interner();
    let animal = TypeRef::named(interner.intern("Animal"));
    let dog = Value::new_object(interner.intern("Dog"));
    assert!(ArgMatcher::AnyOfClass(animal).is_match(&dog, &path));
    assert!(ArgMatcher::AnyOfClass(TypeRef::OBJECT).is_match(&dog, &path));
    assert!(!ArgMatcher::AnyOfClass(animal).is_match(&Value::Null, &path));
    assert!(!ArgMatcher::AnyOfClass(animal).is_match(&Value::new_object(Name::OBJECT), &path));
}

#[test]
fn object_equality_is_identity() {
    let path = classes();
    let a = Value::new_object(Name::OBJECT);
    let b = Value::new_object(Name::OBJECT);
    assert!(ArgMatcher::Eq(a.clone()).is_match(&a, &path));
    assert!(!ArgMatcher::Eq(a).is_match(&b, &path));
}

#[test]
fn custom_and_display() {
    let path = classes();
    let interner = path.interner();
    let even = ArgMatcher::custom("even", |v| v.as_int().is_some_and(|n| n % 2 == 0));
    assert!(even.is_match(&Value::Int(4), &path));
    assert!(!even.is_match(&Value::Int(5), &path));
    assert_eq!(even.display(interner).to_string(), "<even>");
    assert_eq!(ArgMatcher::eq("x").display(interner).to_string(), "\"x\"");
    assert_eq!(
        ArgMatcher::AnyOfClass(TypeRef::STRING)
            .display(interner)
            .to_string(),
        "any(String)"
    );
}
