//! Integration tests for policy dispatch through the global facade.

mod helpers;

use std::thread;

use faultline_engine::{EngineError, Raised};
use serial_test::serial;

use helpers::{NetworkFault, ReadTimeout, TimeoutFault, ValidationFault, pristine_engine};

#[test]
#[serial]
fn test_unregistered_error_propagates_unchanged() {
    pristine_engine();
    let raised = Raised::new(ReadTimeout("socket".into()));

    let err = faultline_engine::handle::<String>(raised.clone()).unwrap_err();
    assert!(err.same_as(&raised));
}

#[test]
#[serial]
fn test_ancestor_policy_recovers_descendant() {
    pristine_engine();
    let _ = faultline_engine::policy_for::<NetworkFault>()
        .with_action(|e| format!("offline: {}", e.message()));

    let value: String = faultline_engine::run(|| Err::<String, _>(ReadTimeout("r1".into()))).unwrap();
    assert_eq!(value, "offline: r1");
}

#[test]
#[serial]
fn test_closest_policy_wins() {
    pristine_engine();
    let _ = faultline_engine::policy_for::<NetworkFault>().with_action(|_| "network");
    let _ = faultline_engine::policy_for::<TimeoutFault>().with_action(|_| "timeout");

    let read: &str = faultline_engine::handle(Raised::new(ReadTimeout("r".into()))).unwrap();
    let network: &str = faultline_engine::handle(Raised::new(NetworkFault("n".into()))).unwrap();
    assert_eq!(read, "timeout");
    assert_eq!(network, "network");
}

#[test]
#[serial]
fn test_rerouting_chain_builds_message() {
    pristine_engine();
    let _ = faultline_engine::policy_for::<ReadTimeout>()
        .with_transform(|e| Raised::new(TimeoutFault(format!("1:{}", e.message()))));
    let _ = faultline_engine::policy_for::<TimeoutFault>()
        .with_transform(|e| Raised::new(NetworkFault(format!("2:{}", e.message()))));
    let _ = faultline_engine::policy_for::<NetworkFault>().with_action(|e| e.message());

    let value: String = faultline_engine::handle(Raised::new(ReadTimeout("orig".into()))).unwrap();
    assert_eq!(value, "2:1:orig");
}

#[test]
#[serial]
fn test_mutual_rerouting_terminates() {
    pristine_engine();
    let _ = faultline_engine::policy_for::<ValidationFault>()
        .with_transform(|e| Raised::new(NetworkFault(e.message())));
    let _ = faultline_engine::policy_for::<NetworkFault>().with_transform(|e| {
        Raised::new(ValidationFault {
            message: e.message(),
            cause: None,
        })
    });

    let err = faultline_engine::handle::<()>(Raised::new(NetworkFault("loop".into()))).unwrap_err();
    assert!(err.is::<NetworkFault>() || err.is::<ValidationFault>());
}

#[test]
#[serial]
fn test_with_message_rewrites_and_keeps_cause() {
    pristine_engine();
    let _ = faultline_engine::policy_for::<ValidationFault>().with_message("Please check your input");

    let original = Raised::new(ValidationFault {
        message: "field `age` must be positive".into(),
        cause: None,
    });
    let err = faultline_engine::handle::<()>(original.clone()).unwrap_err();

    let rewritten = err.downcast_ref::<ValidationFault>().unwrap();
    assert_eq!(rewritten.message, "Please check your input");
    assert!(rewritten.cause.as_ref().unwrap().same_as(&original));
}

#[test]
#[serial]
fn test_clear_handlers_makes_errors_unhandled() {
    pristine_engine();
    let _ = faultline_engine::policy_for::<NetworkFault>().with_action(|_| 1_u8);
    assert_eq!(faultline_engine::handle::<u8>(Raised::new(NetworkFault("n".into()))).unwrap(), 1);

    faultline_engine::clear_handlers();
    assert!(faultline_engine::handle::<u8>(Raised::new(NetworkFault("n".into()))).is_err());
}

#[test]
#[serial]
fn test_mismatched_recovery_type_is_an_error() {
    pristine_engine();
    let _ = faultline_engine::policy_for::<NetworkFault>().with_action(|_| 1_u8);

    let err = faultline_engine::handle::<String>(Raised::new(NetworkFault("n".into()))).unwrap_err();
    assert!(err.is::<EngineError>());
}

#[tokio::test]
#[serial]
async fn test_run_async_recovers() {
    pristine_engine();
    let _ = faultline_engine::policy_for::<TimeoutFault>().with_action(|_| Vec::<u8>::new());

    let value = faultline_engine::run_async(async {
        tokio::task::yield_now().await;
        Err::<Vec<u8>, _>(TimeoutFault("slow".into()))
    })
    .await
    .unwrap();
    assert!(value.is_empty());
}

#[test]
#[serial]
fn test_concurrent_dispatch_is_deterministic() {
    let engine = pristine_engine();
    let _ = engine.policy::<TimeoutFault>().with_action(|e| e.message().len());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            thread::spawn(move || {
                (0..100)
                    .map(|_| {
                        engine
                            .handle::<usize>(Raised::new(ReadTimeout("x".repeat(i))))
                            .unwrap()
                    })
                    .all(|len| len == i)
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap());
    }
}
