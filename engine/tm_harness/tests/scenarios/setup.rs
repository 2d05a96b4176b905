//! Setup errors fail the whole session before any test runs.

use pretty_assertions::assert_eq;

use tm_diagnostic::ErrorCode;
use tm_harness::{HarnessError, SessionConfig, TestClassSession};
use tm_ir::{Name, TypeRef, Value};
use tm_weave::{DiagnoseLevel, MockDeclaration};

use crate::common::{class_path, session_with, substring_mock, CLASSES_UNDER_TEST};

fn failed_setup(
    decls: impl FnOnce(&TestClassSession) -> Vec<MockDeclaration>,
) -> (TestClassSession, HarnessError) {
    let mut session = TestClassSession::new(class_path(), "BrokenTest", SessionConfig::new());
    for decl in decls(&session) {
        session.register(decl).unwrap();
    }
    let err = session.instrument(CLASSES_UNDER_TEST).unwrap_err();
    (session, err)
}

#[test]
fn incompatible_return_type_is_a_signature_mismatch() {
    let (session, err) = failed_setup(|s| {
        vec![MockDeclaration::method(
            s.name("StringMock"),
            s.name("wide"),
            [TypeRef::INT, TypeRef::INT],
            TypeRef::OBJECT,
        )
        .target_class(TypeRef::STRING)
        .target_method(Name::SUBSTRING)]
    });
    assert_eq!(err.setup_error().unwrap().code(), ErrorCode::E2001);
    assert!(err.to_string().starts_with("error[E2001]: signature mismatch: "));
    assert!(matches!(
        session.begin_test("never").unwrap_err(),
        HarnessError::SessionFailed { .. }
    ));
}

#[test]
fn colliding_declarations_are_ambiguous() {
    let (_, err) = failed_setup(|s| {
        vec![
            substring_mock(s),
            MockDeclaration::method(
                s.name("StringMock"),
                s.name("boom"),
                [TypeRef::INT, TypeRef::INT],
                TypeRef::STRING,
            )
            .target_class(TypeRef::STRING)
            .target_method(Name::SUBSTRING),
        ]
    });
    let setup = err.setup_error().unwrap();
    assert_eq!(setup.code(), ErrorCode::E1001);
    assert_eq!(
        setup.message(),
        "mocks `StringMock.sub(int, int)` and `StringMock.boom(int, int)` both match \
         `String#substring(int, int)`"
    );
}

#[test]
fn receiverless_declaration_is_rejected() {
    let (_, err) = failed_setup(|s| {
        vec![MockDeclaration::method(
            s.name("StringMock"),
            s.name("orphan"),
            [],
            TypeRef::STRING,
        )]
    });
    assert_eq!(err.setup_error().unwrap().code(), ErrorCode::E1002);
}

#[test]
fn verbose_diagnosis_does_not_change_behavior() {
    let config = SessionConfig::new()
        .with_diagnose(DiagnoseLevel::Verbose)
        .with_max_call_depth(64);
    let session = session_with("StringTest", config, |s| vec![substring_mock(s)]);
    assert_eq!(session.config().eval.max_call_depth, 64);
    let run = session.begin_test("verbose").unwrap();
    assert_eq!(
        run.invoke_static("Texts", "cut", &[], &[]).unwrap(),
        Value::from("sub_string")
    );
}
