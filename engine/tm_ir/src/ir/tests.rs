#![allow(clippy::unwrap_used, clippy::expect_used)]

use pretty_assertions::assert_eq;

use crate::builder::{ClassBuilder, MethodBuilder};
use crate::{Name, StringInterner, TypeRef};

use super::*;

fn demo(interner: &StringInterner) -> ClassDef {
    ClassBuilder::new(interner, "Demo")
        .method(
            MethodBuilder::instance(interner, "outerFunc")
                .param("String")
                .returns("String")
                .code(|b| {
                    let arg = b.param(0);
                    let out = b.call_instance(
                        b.this(),
                        "Demo",
                        "innerFunc",
                        &["String"],
                        "String",
                        &[arg],
                    );
                    b.ret(out);
                }),
        )
        .method(
            MethodBuilder::instance(interner, "innerFunc")
                .param("String")
                .returns("String")
                .private()
                .code(|b| {
                    let p = b.const_str("inner_");
                    let s = b.concat(&[p, b.param(0)]);
                    b.ret(s);
                }),
        )
        .build()
        .unwrap()
}

#[test]
fn builder_lays_out_registers() {
    let interner = StringInterner::new();
    let class = demo(&interner);
    let outer = class
        .find_method(interner.intern("outerFunc"), &[TypeRef::STRING])
        .unwrap();
    assert_eq!(outer.arg_slots(), 2);
    let MethodBody::Code { locals, instrs } = &outer.body else {
        panic!("expected code body");
    };
    // this, arg, call result
    assert_eq!(*locals, 3);
    let call = instrs[0].invocation().unwrap();
    assert_eq!(call.kind, InvokeKind::Instance);
    assert_eq!(call.receiver, Some(VarId::new(0)));
    assert_eq!(call.args.as_slice(), &[VarId::new(1)]);
    assert_eq!(call.result_type(), TypeRef::STRING);
}

#[test]
fn defined_and_used_vars() {
    let interner = StringInterner::new();
    let class = demo(&interner);
    let inner = class
        .find_method(interner.intern("innerFunc"), &[TypeRef::STRING])
        .unwrap();
    let MethodBody::Code { instrs, .. } = &inner.body else {
        panic!("expected code body");
    };
    assert_eq!(instrs[0].defined_var(), Some(VarId::new(2)));
    assert_eq!(instrs[1].used_vars(), vec![VarId::new(2), VarId::new(1)]);
    assert_eq!(instrs[2].defined_var(), None);
    assert_eq!(instrs[2].used_vars(), vec![VarId::new(3)]);
    assert_eq!(inner.access, Access::Private);
}

#[test]
fn construction_produces_owner_type() {
    let interner = StringInterner::new();
    let method = MethodBuilder::static_method(&interner, "make")
        .returns("BlackBox")
        .code(|b| {
            let s = b.const_str("something");
            let obj = b.construct("BlackBox", &["String"], &[s]);
            b.ret(obj);
        })
        .build()
        .unwrap();
    let MethodBody::Code { instrs, .. } = &method.body else {
        panic!("expected code body");
    };
    let call = instrs[1].invocation().unwrap();
    assert_eq!(call.kind, InvokeKind::Construct);
    assert_eq!(call.method, Name::INIT);
    assert_eq!(call.result_type(), TypeRef::named(interner.intern("BlackBox")));
}

#[test]
fn instrumented_marker_is_set_once() {
    let interner = StringInterner::new();
    let mut class = demo(&interner);
    assert!(!class.is_instrumented());
    class.mark_instrumented();
    class.mark_instrumented();
    assert!(class.is_instrumented());
    assert_eq!(class.attributes.len(), 1);
}

#[test]
fn bad_type_names_fail_the_build() {
    let interner = StringInterner::new();
    let result = ClassBuilder::new(&interner, "Demo")
        .method(MethodBuilder::instance(&interner, "f").param("List<String"))
        .build();
    assert!(result.is_err());
}

#[test]
fn method_ref_display() {
    let interner = StringInterner::new();
    let m = MethodRef::new(
        interner.intern("Demo"),
        interner.intern("outerFunc"),
        [TypeRef::STRING, TypeRef::INT],
    );
    assert_eq!(m.display(&interner).to_string(), "Demo.outerFunc(String, int)");
}
