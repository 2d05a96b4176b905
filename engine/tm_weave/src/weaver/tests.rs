#![allow(clippy::unwrap_used, clippy::expect_used)]

use pretty_assertions::assert_eq;

use tm_diagnostic::ErrorCode;
use tm_ir::{ClassBuilder, ClassPath, MethodBuilder, SharedInterner, TypeRef};

use super::*;
use crate::config::DiagnoseLevel;
use crate::declaration::MockDeclaration;
use crate::registry::MockRegistry;

fn weaver() -> Weaver {
    let interner = SharedInterner::new();
    let mut path = ClassPath::with_core(interner.clone());
    path.define(
        ClassBuilder::new(&interner, "DemoMock")
            .method(
                MethodBuilder::static_method(&interner, "toUpperCase")
                    .param("String")
                    .returns("String")
                    .code(|b| {
                        let s = b.const_str("LOUD");
                        b.ret(s);
                    }),
            )
            .build()
            .unwrap(),
    );
    path.define(
        ClassBuilder::new(&interner, "Demo")
            .method(
                MethodBuilder::instance(&interner, "shout")
                    .param("String")
                    .returns("String")
                    .code(|b| {
                        let out = b.call_instance(
                            b.param(0),
                            "String",
                            "toUpperCase",
                            &[],
                            "String",
                            &[],
                        );
                        b.ret(out);
                    }),
            )
            .build()
            .unwrap(),
    );

    let mut registry = MockRegistry::new();
    registry.register(MockDeclaration::method(
        interner.intern("DemoMock"),
        interner.intern("toUpperCase"),
        [TypeRef::STRING],
        TypeRef::STRING,
    )).unwrap();
    let mapping = registry.build_mapping(&path).unwrap();
    Weaver::new(
        Arc::new(path),
        Arc::new(mapping),
        WeaveConfig::default().with_diagnose(DiagnoseLevel::Verbose),
    )
}

#[test]
fn instrumentation_is_cached() {
    let weaver = weaver();
    let demo = weaver.class_path().interner().intern("Demo");
    let first = weaver.instrument(demo).unwrap();
    let second = weaver.instrument(demo).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert!(first.is_instrumented());
    assert!(!weaver.class_path().get(demo).unwrap().is_instrumented());
    assert_eq!(weaver.instrumented_classes().len(), 1);
}

#[test]
fn concurrent_callers_share_one_result() {
    let weaver = weaver();
    let demo = weaver.class_path().interner().intern("Demo");
    let results: Vec<Arc<ClassDef>> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| s.spawn(|| weaver.instrument(demo).unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    for result in &results[1..] {
        assert!(Arc::ptr_eq(&results[0], result));
    }
}

#[test]
fn missing_class_is_unavailable() {
    let weaver = weaver();
    let ghost = weaver.class_path().interner().intern("Ghost");
    let err = weaver.instrument(ghost).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E3001);
    assert_eq!(err.message(), "class `Ghost` is not on the class path");
    assert!(weaver.locate(ghost).is_err());
}

#[test]
fn locate_reads_the_original_class() {
    let weaver = weaver();
    let demo = weaver.class_path().interner().intern("Demo");
    let sites = weaver.locate(demo).unwrap();
    assert_eq!(sites.len(), 1);
    assert_eq!(sites[0].name, tm_ir::Name::TO_UPPER_CASE);
}
