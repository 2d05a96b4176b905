use pretty_assertions::assert_eq;
use proptest::prelude::*;

use tm_ir::{MethodRef, MockId, Name, TypeRef, Value};
use tm_weave::{MatchKey, MethodTarget};

use super::*;

fn key() -> MatchKey {
    MatchKey::new(TypeRef::STRING, MethodTarget::Named(Name::LENGTH), [])
}

fn source() -> MethodRef {
    MethodRef::new(Name::from_raw(400), Name::from_raw(401), [])
}

#[test]
fn ordinals_follow_append_order() {
    let log = CallLog::new();
    assert_eq!(log.record(MockId::new(0), key(), [Value::Int(1)], source()), 0);
    assert_eq!(log.record(MockId::new(0), key(), [Value::Int(2)], source()), 1);
    let calls = log.snapshot();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[1].args.as_slice(), &[Value::Int(2)]);
    assert!(calls[0].at <= calls[1].at);
    log.clear();
    assert!(log.is_empty());
}

#[test]
fn objects_are_recorded_by_reference() {
    let log = CallLog::new();
    let obj = Value::new_object(Name::from_raw(300));
    log.record(MockId::new(0), key(), [obj.clone()], source());
    if let Value::Object(o) = &obj {
        o.set_field(Name::MESSAGE, Value::from("changed"));
    }
    let calls = log.snapshot();
    let recorded = calls[0].args[0].as_object().map(|o| o.get_field(Name::MESSAGE));
    assert_eq!(recorded, Some(Value::from("changed")));
}

proptest! {
    /// Concurrent appends produce the ordinals 0..n in log order.
    #[test]
    fn concurrent_ordinals_are_dense_and_ordered(threads in 1usize..6, per_thread in 1usize..40) {
        let log = CallLog::new();
        std::thread::scope(|s| {
            for t in 0..threads {
                let log = &log;
                s.spawn(move || {
                    for i in 0..per_thread {
                        let tag = i64::try_from(t * 1000 + i).unwrap_or(i64::MAX);
                        log.record(MockId::new(0), key(), [Value::Int(tag)], source());
                    }
                });
            }
        });
        let calls = log.snapshot();
        prop_assert_eq!(calls.len(), threads * per_thread);
        for (i, call) in calls.iter().enumerate() {
            prop_assert_eq!(call.ordinal, i as u64);
        }
    }
}
