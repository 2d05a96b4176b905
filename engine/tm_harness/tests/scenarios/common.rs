//! Classes under test, mock containers and session setup shared by the
//! scenario tests.
//!
//! Classes under test:
//!
//! - `Texts.cut()` returns `"anything".substring(1, 2)`
//! - `Texts.pipeline(String s)` returns `s.substring(0, 3).length()`
//! - `Service.outerFunc()` returns `this.innerFunc("x")`; `innerFunc(s)`
//!   returns `"inner:" + s`
//! - `Factory.make()` returns `new BlackBox("something")`
//! - `Reporter.report()` returns `new Reporter().mode()`, which is `"real"`

use std::sync::Arc;

use tm_harness::{SessionConfig, TestClassSession};
use tm_ir::{ClassBuilder, ClassDef, ClassPath, MethodBuilder, Name, SharedInterner, TypeRef};
use tm_weave::MockDeclaration;

pub const CLASSES_UNDER_TEST: [&str; 4] = ["Texts", "Service", "Factory", "Reporter"];

fn texts(interner: &SharedInterner) -> ClassDef {
    ClassBuilder::new(interner, "Texts")
        .method(
            MethodBuilder::static_method(interner, "cut")
                .returns("String")
                .code(|b| {
                    let s = b.const_str("anything");
                    let from = b.const_int(1);
                    let to = b.const_int(2);
                    let out =
                        b.call_instance(s, "String", "substring", &["int", "int"], "String", &[from, to]);
                    b.ret(out);
                }),
        )
        .method(
            MethodBuilder::static_method(interner, "pipeline")
                .param("String")
                .returns("int")
                .code(|b| {
                    let from = b.const_int(0);
                    let to = b.const_int(3);
                    let head = b.call_instance(
                        b.param(0),
                        "String",
                        "substring",
                        &["int", "int"],
                        "String",
                        &[from, to],
                    );
                    let n = b.call_instance(head, "String", "length", &[], "int", &[]);
                    b.ret(n);
                }),
        )
        .build()
        .unwrap()
}

fn service(interner: &SharedInterner) -> ClassDef {
    ClassBuilder::new(interner, "Service")
        .method(
            MethodBuilder::instance(interner, "innerFunc")
                .param("String")
                .returns("String")
                .code(|b| {
                    let prefix = b.const_str("inner:");
                    let out = b.concat(&[prefix, b.param(0)]);
                    b.ret(out);
                }),
        )
        .method(
            MethodBuilder::instance(interner, "outerFunc")
                .returns("String")
                .code(|b| {
                    let x = b.const_str("x");
                    let out =
                        b.call_instance(b.this(), "Service", "innerFunc", &["String"], "String", &[x]);
                    b.ret(out);
                }),
        )
        .build()
        .unwrap()
}

fn black_box(interner: &SharedInterner) -> ClassDef {
    ClassBuilder::new(interner, "BlackBox")
        .method(
            MethodBuilder::constructor(interner)
                .param("String")
                .code(|b| {
                    b.set_field(b.this(), "label", b.param(0));
                    b.ret_void();
                }),
        )
        .method(
            MethodBuilder::instance(interner, "label")
                .returns("String")
                .code(|b| {
                    let label = b.get_field(b.this(), "label");
                    b.ret(label);
                }),
        )
        .build()
        .unwrap()
}

fn factory(interner: &SharedInterner) -> ClassDef {
    ClassBuilder::new(interner, "Factory")
        .method(
            MethodBuilder::static_method(interner, "make")
                .returns("BlackBox")
                .code(|b| {
                    let s = b.const_str("something");
                    let made = b.construct("BlackBox", &["String"], &[s]);
                    b.ret(made);
                }),
        )
        .build()
        .unwrap()
}

fn reporter(interner: &SharedInterner) -> ClassDef {
    ClassBuilder::new(interner, "Reporter")
        .method(
            MethodBuilder::instance(interner, "mode")
                .returns("String")
                .code(|b| {
                    let s = b.const_str("real");
                    b.ret(s);
                }),
        )
        .method(
            MethodBuilder::static_method(interner, "report")
                .returns("String")
                .code(|b| {
                    let r = b.construct("Reporter", &[], &[]);
                    let out = b.call_instance(r, "Reporter", "mode", &[], "String", &[]);
                    b.ret(out);
                }),
        )
        .build()
        .unwrap()
}

fn string_mock(interner: &SharedInterner) -> ClassDef {
    ClassBuilder::new(interner, "StringMock")
        .method(
            MethodBuilder::static_method(interner, "sub")
                .param("int")
                .param("int")
                .returns("String")
                .code(|b| {
                    let s = b.const_str("sub_string");
                    b.ret(s);
                }),
        )
        .method(
            MethodBuilder::static_method(interner, "length")
                .param("String")
                .returns("int")
                .code(|b| {
                    let n = b.const_int(42);
                    b.ret(n);
                }),
        )
        .method(
            MethodBuilder::static_method(interner, "boom")
                .param("int")
                .param("int")
                .returns("String")
                .code(|b| {
                    let msg = b.const_str("mocked failure");
                    let e = b.construct("RuntimeException", &["String"], &[msg]);
                    let key = b.const_str("thrown");
                    b.call_static(
                        "InvocationContext",
                        "set",
                        &["String", "Object"],
                        "void",
                        &[key, e],
                    );
                    b.throw(e);
                }),
        )
        .method(
            MethodBuilder::static_method(interner, "wide")
                .param("int")
                .param("int")
                .returns("Object")
                .code(|b| {
                    let s = b.const_str("object");
                    b.ret(s);
                }),
        )
        .build()
        .unwrap()
}

fn service_mock(interner: &SharedInterner) -> ClassDef {
    ClassBuilder::new(interner, "ServiceMock")
        .method(
            MethodBuilder::static_method(interner, "innerFunc")
                .param("Service")
                .param("String")
                .returns("String")
                .code(|b| {
                    let source = b.call_static("InvocationContext", "sourceMethod", &[], "String", &[]);
                    let real = b.call_instance(
                        b.param(0),
                        "Service",
                        "innerFunc",
                        &["String"],
                        "String",
                        &[b.param(1)],
                    );
                    let open = b.const_str("mock[");
                    let close = b.const_str("]:");
                    let out = b.concat(&[open, source, close, real]);
                    b.ret(out);
                }),
        )
        .build()
        .unwrap()
}

fn black_box_mock(interner: &SharedInterner) -> ClassDef {
    ClassBuilder::new(interner, "BlackBoxMock")
        .method(
            MethodBuilder::static_method(interner, "create")
                .param("String")
                .returns("BlackBox")
                .code(|b| {
                    let prefix = b.const_str("mock_");
                    let label = b.concat(&[prefix, b.param(0)]);
                    let made = b.construct("BlackBox", &["String"], &[label]);
                    let key = b.const_str("made");
                    b.call_static(
                        "InvocationContext",
                        "set",
                        &["String", "Object"],
                        "void",
                        &[key, made],
                    );
                    b.ret(made);
                }),
        )
        .build()
        .unwrap()
}

fn reporter_mock(interner: &SharedInterner) -> ClassDef {
    ClassBuilder::new(interner, "ReporterMock")
        .method(
            MethodBuilder::static_method(interner, "mode")
                .param("Reporter")
                .returns("String")
                .code(|b| {
                    let key = b.const_str("case");
                    let case = b.call_static("InvocationContext", "get", &["String"], "Object", &[key]);
                    let prefix = b.const_str("case=");
                    let out = b.concat(&[prefix, case]);
                    b.ret(out);
                }),
        )
        .build()
        .unwrap()
}

pub fn class_path() -> Arc<ClassPath> {
    let interner = SharedInterner::new();
    let mut path = ClassPath::with_core(interner.clone());
    for class in [
        texts(&interner),
        service(&interner),
        black_box(&interner),
        factory(&interner),
        reporter(&interner),
        string_mock(&interner),
        service_mock(&interner),
        black_box_mock(&interner),
        reporter_mock(&interner),
    ] {
        path.define(class);
    }
    Arc::new(path)
}

/// Session for `test_class` with `decls` registered and every class under
/// test instrumented.
pub fn session(
    test_class: &str,
    decls: impl FnOnce(&TestClassSession) -> Vec<MockDeclaration>,
) -> TestClassSession {
    session_with(test_class, SessionConfig::new(), decls)
}

pub fn session_with(
    test_class: &str,
    config: SessionConfig,
    decls: impl FnOnce(&TestClassSession) -> Vec<MockDeclaration>,
) -> TestClassSession {
    tm_harness::init_tracing();
    let mut session = TestClassSession::new(class_path(), test_class, config);
    for decl in decls(&session) {
        session.register(decl).unwrap();
    }
    session.instrument(CLASSES_UNDER_TEST).unwrap();
    session
}

/// `StringMock.sub(int, int)` standing in for `String.substring(int, int)`.
pub fn substring_mock(session: &TestClassSession) -> MockDeclaration {
    MockDeclaration::method(
        session.name("StringMock"),
        session.name("sub"),
        [TypeRef::INT, TypeRef::INT],
        TypeRef::STRING,
    )
    .target_class(TypeRef::STRING)
    .target_method(Name::SUBSTRING)
}

/// Receiver-style `StringMock.length(String)`.
pub fn length_mock(session: &TestClassSession) -> MockDeclaration {
    MockDeclaration::method(
        session.name("StringMock"),
        Name::LENGTH,
        [TypeRef::STRING],
        TypeRef::INT,
    )
}

pub fn reporter_mode_mock(session: &TestClassSession) -> MockDeclaration {
    let reporter = TypeRef::named(session.name("Reporter"));
    MockDeclaration::method(
        session.name("ReporterMock"),
        session.name("mode"),
        [reporter],
        TypeRef::STRING,
    )
}
