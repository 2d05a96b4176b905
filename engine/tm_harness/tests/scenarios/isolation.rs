//! Test executions of one session never share context or call log.

use pretty_assertions::assert_eq;
use rayon::prelude::*;

use tm_ir::Value;
use tm_verify::{CallExpectation, VerificationQuery};

use crate::common::{reporter_mode_mock, session, substring_mock};

#[test]
fn context_values_do_not_leak_between_tests() {
    let session = session("ReporterTest", |s| vec![reporter_mode_mock(s)]);

    let first = session.begin_test("first").unwrap();
    first.set("case", "x");
    assert_eq!(
        first.invoke_static("Reporter", "report", &[], &[]).unwrap(),
        Value::from("case=x")
    );

    let second = session.begin_test("second").unwrap();
    assert_eq!(
        second.invoke_static("Reporter", "report", &[], &[]).unwrap(),
        Value::from("case=null")
    );
    assert_eq!(first.calls().len(), 1);
    assert_eq!(second.calls().len(), 1);
    first.finish();
    second.finish();
}

#[test]
fn context_updates_reach_later_mock_calls() {
    let session = session("ReporterTest", |s| vec![reporter_mode_mock(s)]);
    let run = session.begin_test("updates").unwrap();
    run.set("case", "a");
    let a = run.invoke_static("Reporter", "report", &[], &[]).unwrap();
    run.set("case", "b");
    let b = run.invoke_static("Reporter", "report", &[], &[]).unwrap();
    assert_eq!((a, b), (Value::from("case=a"), Value::from("case=b")));
}

#[test]
fn concurrent_tests_are_isolated() {
    let session = session("ReporterTest", |s| vec![reporter_mode_mock(s)]);

    (0..16i64).into_par_iter().for_each(|i| {
        let run = session.begin_test(&format!("case {i}")).unwrap();
        run.set("case", i);
        for _ in 0..3 {
            let out = run.invoke_static("Reporter", "report", &[], &[]).unwrap();
            assert_eq!(out, Value::from(format!("case={i}").as_str()));
        }
        let ordinals: Vec<u64> = run.calls().iter().map(|c| c.ordinal).collect();
        assert_eq!(ordinals, vec![0, 1, 2]);
        run.finish();
    });
}

#[test]
fn ordinals_stay_total_across_threads_of_one_test() {
    let session = session("StringTest", |s| vec![substring_mock(s)]);
    let run = session.begin_test("threads").unwrap();

    (0..64).into_par_iter().for_each(|_| {
        let out = run.invoke_static("Texts", "cut", &[], &[]).unwrap();
        assert_eq!(out, Value::from("sub_string"));
    });

    let calls = run.calls();
    let ordinals: Vec<u64> = calls.iter().map(|c| c.ordinal).collect();
    assert_eq!(ordinals, (0..64).collect::<Vec<u64>>());
    assert!(calls.windows(2).all(|w| w[0].at <= w[1].at));

    let key = run.key("String", "substring", &["int", "int"]).unwrap();
    assert!(run
        .verify(&VerificationQuery::with_times(CallExpectation::new(key), 64))
        .is_ok());
}
