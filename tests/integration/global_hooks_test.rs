//! Integration tests for process-wide hooks: real panics and detached task
//! failures routed through the global engine.

mod helpers;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use faultline_engine::{ErrorEngine, PanicError, Raised};
use serial_test::serial;

use helpers::{NetworkFault, TimeoutFault, pristine_engine};

fn counting_panic_policy(engine: &ErrorEngine) -> Arc<AtomicUsize> {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);
    let _ = engine.policy::<PanicError>().with_action(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    hits
}

#[test]
#[serial]
fn test_panic_is_dispatched_when_enabled() {
    let engine = pristine_engine();
    let hits = counting_panic_policy(engine);
    assert!(faultline_engine::enable_global_handling(true));

    let joined = thread::spawn(|| panic!("worker exploded")).join();
    assert!(joined.is_err());
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    faultline_engine::shutdown();
}

#[test]
#[serial]
fn test_panic_is_ignored_when_disabled() {
    let engine = pristine_engine();
    let hits = counting_panic_policy(engine);

    let joined = thread::spawn(|| panic!("nobody listens")).join();
    assert!(joined.is_err());
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[test]
#[serial]
fn test_reenabling_subscribes_once() {
    let engine = pristine_engine();
    let hits = counting_panic_policy(engine);

    assert!(faultline_engine::enable_global_handling(true));
    assert!(faultline_engine::disable_global_handling());
    assert!(faultline_engine::enable_global_handling(true));
    assert!(!faultline_engine::enable_global_handling(false));

    let _ = thread::spawn(|| panic!("once")).join();
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    faultline_engine::shutdown();
}

#[test]
#[serial]
fn test_universal_handling_feeds_channel_with_panic() {
    let engine = pristine_engine();
    assert!(faultline_engine::initialize_universal_handling());
    assert!(!faultline_engine::initialize_universal_handling());

    let _ = thread::Builder::new()
        .name("exploder".into())
        .spawn(|| panic!("boom at depth"))
        .unwrap()
        .join();

    let queued = engine.channel().try_next().unwrap();
    let panic = queued.downcast_ref::<PanicError>().unwrap();
    assert_eq!(panic.message, "boom at depth");
    assert!(panic.location.contains("global_hooks_test.rs"));
    assert!(engine.channel().try_next().is_none());

    faultline_engine::shutdown();
}

#[tokio::test]
#[serial]
async fn test_detached_failure_is_dispatched() {
    let engine = pristine_engine();
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);
    let _ = faultline_engine::policy_for::<NetworkFault>().with_action(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    faultline_engine::enable_global_handling(true);

    engine
        .spawn_detached(async { Err::<(), _>(TimeoutFault("lost".into())) })
        .await
        .unwrap();
    engine
        .spawn_detached(async { Ok::<_, TimeoutFault>(()) })
        .await
        .unwrap();

    assert_eq!(hits.load(Ordering::SeqCst), 1);
    faultline_engine::shutdown();
}

#[tokio::test]
#[serial]
async fn test_universal_detached_failure_reaches_channel() {
    let engine = pristine_engine();
    faultline_engine::initialize_universal_handling();

    engine
        .spawn_detached(async { Err::<(), _>(NetworkFault("orphan".into())) })
        .await
        .unwrap();

    let queued: Raised = engine.channel().try_next().unwrap();
    assert!(queued.is::<NetworkFault>());
    assert_eq!(queued.message(), "orphan");

    faultline_engine::shutdown();
}

#[test]
#[serial]
fn test_shutdown_restores_pristine_state() {
    let engine = pristine_engine();
    let _ = faultline_engine::policy_for::<NetworkFault>().with_action(|_| ());
    faultline_engine::initialize_universal_handling();

    faultline_engine::shutdown();

    assert!(!engine.hooks().is_enabled());
    assert!(!engine.hooks().is_universal_initialized());
    assert!(engine.registry().is_empty());
    assert_eq!(engine.hooks().sources().unhandled.subscriber_count(), 0);
    assert_eq!(engine.hooks().sources().unobserved.subscriber_count(), 0);
}
