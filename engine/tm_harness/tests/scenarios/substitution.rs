//! What runs in place of a substituted call, and what the mock body sees.

use pretty_assertions::assert_eq;

use tm_eval::EvalErrorKind;
use tm_ir::{Name, TypeRef, Value};
use tm_verify::{CallExpectation, VerificationQuery};
use tm_weave::MockDeclaration;

use crate::common::{length_mock, session, substring_mock};

#[test]
fn target_class_mock_replaces_string_method() {
    let session = session("StringTest", |s| vec![substring_mock(s)]);
    let run = session.begin_test("substring").unwrap();

    let out = run.invoke_static("Texts", "cut", &[], &[]).unwrap();
    assert_eq!(out, Value::from("sub_string"));

    let key = run.key("String", "substring", &["int", "int"]).unwrap();
    let report = run
        .verify(&VerificationQuery::with_times(CallExpectation::new(key), 1))
        .unwrap();
    assert_eq!(report.matched, vec![0]);
    let calls = run.calls();
    assert_eq!(calls[0].args.as_slice(), &[Value::Int(1), Value::Int(2)]);
}

#[test]
fn unregistered_calls_run_the_original() {
    let session = session("StringTest", |_| vec![]);
    let run = session.begin_test("plain").unwrap();
    assert_eq!(
        run.invoke_static("Texts", "cut", &[], &[]).unwrap(),
        Value::from("n")
    );
    assert_eq!(
        run.invoke_static("Texts", "pipeline", &["String"], &[Value::from("abcdef")])
            .unwrap(),
        Value::Int(3)
    );
    assert!(run.calls().is_empty());
}

#[test]
fn receiver_style_mock_sees_receiver() {
    let session = session("StringTest", |s| vec![length_mock(s)]);
    let run = session.begin_test("length").unwrap();
    let out = run
        .invoke_static("Texts", "pipeline", &["String"], &[Value::from("abcdef")])
        .unwrap();
    assert_eq!(out, Value::Int(42));

    // only `length` is mocked; the receiver is excluded from recorded args
    let calls = run.calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].args.is_empty());
    assert_eq!(
        calls[0].source.display(run.interner()).to_string(),
        "Texts.pipeline(String)"
    );
}

#[test]
fn self_mock_reports_source_and_reaches_original() {
    let session = session("ServiceTest", |s| {
        let service = TypeRef::named(s.name("Service"));
        vec![MockDeclaration::method(
            s.name("ServiceMock"),
            s.name("innerFunc"),
            [service, TypeRef::STRING],
            TypeRef::STRING,
        )]
    });
    let run = session.begin_test("innerFunc").unwrap();
    let service = run.construct("Service", &[], &[]).unwrap();

    let out = run.invoke(&service, "outerFunc", &[], &[]).unwrap();
    assert_eq!(out, Value::from("mock[Service.outerFunc()]:inner:x"));

    // a direct call from the test is not a call site in the class under test
    let out = run
        .invoke(&service, "innerFunc", &["String"], &[Value::from("y")])
        .unwrap();
    assert_eq!(out, Value::from("inner:y"));
    assert_eq!(run.calls().len(), 1);
    assert_eq!(run.execution().context.current_source_method(), None);
}

#[test]
fn constructor_mock_result_is_the_constructed_value() {
    let session = session("FactoryTest", |s| {
        let black_box = TypeRef::named(s.name("BlackBox"));
        vec![MockDeclaration::constructor(
            s.name("BlackBoxMock"),
            s.name("create"),
            [TypeRef::STRING],
            black_box,
        )]
    });
    let run = session.begin_test("make").unwrap();

    let made = run.invoke_static("Factory", "make", &[], &[]).unwrap();
    let from_mock = run.get("made").unwrap();
    assert!(made.same_identity(&from_mock));
    assert_eq!(
        run.invoke(&made, "label", &[], &[]).unwrap(),
        Value::from("mock_something")
    );

    let key = run.constructor_key("BlackBox", &["String"]).unwrap();
    assert!(run
        .verify(&VerificationQuery::with(
            CallExpectation::new(key).args([tm_verify::ArgMatcher::eq("something")])
        ))
        .is_ok());
}

#[test]
fn mock_exception_reaches_caller_unchanged() {
    let session = session("StringTest", |s| {
        vec![MockDeclaration::method(
            s.name("StringMock"),
            s.name("boom"),
            [TypeRef::INT, TypeRef::INT],
            TypeRef::STRING,
        )
        .target_class(TypeRef::STRING)
        .target_method(Name::SUBSTRING)]
    });
    let run = session.begin_test("throws").unwrap();

    let err = run.invoke_static("Texts", "cut", &[], &[]).unwrap_err();
    let eval = err.eval_error().unwrap();
    assert_eq!(eval.kind, EvalErrorKind::Thrown);
    assert_eq!(eval.message, "RuntimeException: mocked failure");
    let thrown = run.get("thrown").unwrap();
    assert!(eval.thrown_value().unwrap().same_identity(&thrown));

    // the call was recorded before the body ran
    assert_eq!(run.calls().len(), 1);
}

#[test]
fn associated_mock_only_runs_for_its_test_class() {
    let other = session("StringTest", |s| {
        vec![substring_mock(s).associated_with(s.name("OtherTest"))]
    });
    let run = other.begin_test("unrelated").unwrap();
    assert_eq!(
        run.invoke_static("Texts", "cut", &[], &[]).unwrap(),
        Value::from("n")
    );
    assert!(run.calls().is_empty());

    let owner = session("OtherTest", |s| {
        vec![substring_mock(s).associated_with(s.name("OtherTest"))]
    });
    let run = owner.begin_test("related").unwrap();
    assert_eq!(
        run.invoke_static("Texts", "cut", &[], &[]).unwrap(),
        Value::from("sub_string")
    );
}
