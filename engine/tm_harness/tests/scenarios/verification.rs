//! Verification queries over a run's recorded calls.

use pretty_assertions::assert_eq;

use tm_ir::Value;
use tm_verify::{ArgMatcher, CallExpectation, Times, VerificationQuery};

use crate::common::{length_mock, session, substring_mock};

#[test]
fn in_order_follows_call_order() {
    let session = session("StringTest", |s| vec![substring_mock(s), length_mock(s)]);
    let run = session.begin_test("pipeline").unwrap();
    let out = run
        .invoke_static("Texts", "pipeline", &["String"], &[Value::from("abcdef")])
        .unwrap();
    assert_eq!(out, Value::Int(42));

    let substring = CallExpectation::new(run.key("String", "substring", &["int", "int"]).unwrap())
        .args([ArgMatcher::eq(0), ArgMatcher::AnyInt]);
    let length = CallExpectation::new(run.key("String", "length", &[]).unwrap());

    let report = run
        .verify(&VerificationQuery::with_in_order([
            substring.clone(),
            length.clone(),
        ]))
        .unwrap();
    assert_eq!(report.matched, vec![0, 1]);

    let failure = run
        .verify(&VerificationQuery::with_in_order([length, substring]))
        .unwrap_err();
    assert_eq!(failure.actual, 1);
    assert_eq!(
        failure.matching,
        vec!["#1 String#length() with () from Texts.pipeline(String)".to_owned()]
    );
}

#[test]
fn without_names_the_offending_call() {
    let session = session("StringTest", |s| vec![substring_mock(s)]);
    let run = session.begin_test("without").unwrap();
    run.invoke_static("Texts", "cut", &[], &[]).unwrap();

    let length = CallExpectation::new(run.key("String", "length", &[]).unwrap());
    assert!(run.verify(&VerificationQuery::without(length)).is_ok());

    let substring = CallExpectation::new(run.key("String", "substring", &["int", "int"]).unwrap());
    let failure = run
        .verify(&VerificationQuery::without(substring))
        .unwrap_err();
    let rendered = failure.to_string();
    assert!(rendered.contains("expected exactly 0 matching String#substring(int, int), found 1"));
    assert!(rendered.contains("#0 String#substring(int, int) with (1, 2) from Texts.cut()"));
}

#[test]
fn argument_mismatch_reports_closest_call() {
    let session = session("StringTest", |s| vec![substring_mock(s)]);
    let run = session.begin_test("closest").unwrap();
    run.invoke_static("Texts", "cut", &[], &[]).unwrap();
    run.invoke_static("Texts", "pipeline", &["String"], &[Value::from("abcdef")])
        .unwrap();

    let expectation = CallExpectation::new(run.key("String", "substring", &["int", "int"]).unwrap())
        .args([ArgMatcher::eq(0), ArgMatcher::eq(2)]);
    let failure = run
        .verify(&VerificationQuery::with(expectation))
        .unwrap_err();
    // (1, 2) and (0, 3) each satisfy one matcher; the earlier call wins
    assert_eq!(
        failure.closest.as_deref(),
        Some("#0 String#substring(int, int) with (1, 2) from Texts.cut()")
    );
}

#[test]
fn counts_and_matchers() {
    let session = session("StringTest", |s| vec![substring_mock(s)]);
    let run = session.begin_test("counts").unwrap();
    for _ in 0..3 {
        run.invoke_static("Texts", "cut", &[], &[]).unwrap();
    }
    let key = run.key("String", "substring", &["int", "int"]).unwrap();
    let even = ArgMatcher::custom("even", |v| v.as_int().is_some_and(|n| n % 2 == 0));
    let exp = CallExpectation::new(key).args([ArgMatcher::AnyInt, even]);

    assert!(run
        .verify(&VerificationQuery::with(exp.clone()).times(Times::Between(2, 3)))
        .is_ok());
    let failure = run
        .verify(&VerificationQuery::with_times(exp, 2))
        .unwrap_err();
    assert_eq!((failure.expected.as_str(), failure.actual), ("exactly 2", 3));
}

#[test]
fn finished_run_starts_clean() {
    let session = session("StringTest", |s| vec![substring_mock(s)]);
    let run = session.begin_test("first").unwrap();
    run.invoke_static("Texts", "cut", &[], &[]).unwrap();
    run.finish();

    let run = session.begin_test("second").unwrap();
    let key = run.key("String", "substring", &["int", "int"]).unwrap();
    assert!(run
        .verify(&VerificationQuery::without(CallExpectation::new(key)))
        .is_ok());
}
