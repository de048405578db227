//! Compiled dispatch functions: invocation, failure normalization, yielding.

use std::sync::Arc;

use kalla::testing::{CountingHandler, RecordingHandler, absent_factory, failing_factory};
use kalla::{
    AnyEvent, AnyInstance, DispatchError, HandlerDescriptor, InstanceFactory, MethodRef, TypeMeta,
    compile,
};
use tokio_util::sync::CancellationToken;

mod common;
use common::{Audit, Flaky, Ping, Pong};

fn token() -> CancellationToken {
    CancellationToken::new()
}

fn counting_descriptor(factory: InstanceFactory) -> HandlerDescriptor {
    HandlerDescriptor::build(
        MethodRef::sync("bump", CountingHandler::bump::<Ping>),
        factory,
    )
    .unwrap()
}

#[tokio::test]
async fn sync_dispatch_invokes_the_handler() {
    let audit = Arc::new(Audit::new());
    let descriptor = HandlerDescriptor::build(
        MethodRef::sync("on_ping", Audit::on_ping),
        InstanceFactory::shared(audit.clone()),
    )
    .unwrap();
    let dispatch = compile(&descriptor);

    dispatch(AnyEvent::new(Ping { seq: 1 }), token())
        .await
        .unwrap();

    assert_eq!(audit.entries(), vec!["sync:1"]);
}

#[tokio::test]
async fn async_dispatch_awaits_the_handler() {
    let audit = Arc::new(Audit::new());
    let descriptor = HandlerDescriptor::build(
        MethodRef::future("on_ping_async", Audit::on_ping_async),
        InstanceFactory::shared(audit.clone()),
    )
    .unwrap();
    let dispatch = compile(&descriptor);

    dispatch(AnyEvent::new(Ping { seq: 2 }), token())
        .await
        .unwrap();

    assert_eq!(audit.entries(), vec!["async:2"]);
}

#[tokio::test]
async fn cancellable_dispatch_forwards_the_callers_token() {
    let audit = Arc::new(Audit::new());
    let descriptor = HandlerDescriptor::build(
        MethodRef::cancellable("on_ping_cancellable", Audit::on_ping_cancellable),
        InstanceFactory::shared(audit.clone()),
    )
    .unwrap();
    let dispatch = compile(&descriptor);

    let cancelled = CancellationToken::new();
    cancelled.cancel();
    dispatch(AnyEvent::new(Ping { seq: 3 }), cancelled)
        .await
        .unwrap();

    assert_eq!(audit.entries(), vec!["cancellable:3:true"]);
}

#[tokio::test]
async fn cancellation_observed_by_handler_is_visible_to_the_caller() {
    let descriptor = HandlerDescriptor::build(
        MethodRef::cancellable(
            "cancel_it",
            |_handler: Arc<Audit>, _event: Arc<Ping>, token: CancellationToken| async move {
                token.cancel();
            },
        ),
        InstanceFactory::shared(Arc::new(Audit::new())),
    )
    .unwrap();
    let dispatch = compile(&descriptor);

    let observed = CancellationToken::new();
    dispatch(AnyEvent::new(Ping { seq: 4 }), observed.clone())
        .await
        .unwrap();

    assert!(observed.is_cancelled());
}

#[tokio::test]
async fn failing_factory_resolves_to_instance_resolution_failure() {
    let descriptor = counting_descriptor(failing_factory("container offline"));
    let dispatch = compile(&descriptor);

    let error = dispatch(AnyEvent::new(Ping { seq: 1 }), token())
        .await
        .unwrap_err();

    match error {
        DispatchError::InstanceResolution { declaring, source } => {
            assert_eq!(declaring, TypeMeta::of::<CountingHandler>());
            assert!(source.unwrap().to_string().contains("container offline"));
        }
        other => panic!("expected InstanceResolution, got {other:?}"),
    }
}

#[tokio::test]
async fn absent_factory_resolves_to_instance_resolution_without_cause() {
    let descriptor = counting_descriptor(absent_factory());
    let dispatch = compile(&descriptor);

    let error = dispatch(AnyEvent::new(Ping { seq: 1 }), token())
        .await
        .unwrap_err();

    assert!(matches!(
        error,
        DispatchError::InstanceResolution { source: None, .. }
    ));
}

#[tokio::test]
async fn panicking_factory_resolves_to_instance_resolution_failure() {
    let descriptor = counting_descriptor(InstanceFactory::from_fn(|| panic!("factory down")));
    let dispatch = compile(&descriptor);

    let error = dispatch(AnyEvent::new(Ping { seq: 1 }), token())
        .await
        .unwrap_err();

    match error {
        DispatchError::InstanceResolution { source, .. } => {
            assert!(source.unwrap().to_string().contains("factory down"));
        }
        other => panic!("expected InstanceResolution, got {other:?}"),
    }
}

#[tokio::test]
async fn wrong_instance_type_names_both_types() {
    let descriptor = counting_descriptor(InstanceFactory::from_fn(|| {
        Ok(Some(AnyInstance::new(Arc::new(Pong))))
    }));
    let dispatch = compile(&descriptor);

    let error = dispatch(AnyEvent::new(Ping { seq: 1 }), token())
        .await
        .unwrap_err();

    match error {
        DispatchError::InvalidInstanceType { expected, actual } => {
            assert_eq!(expected, TypeMeta::of::<CountingHandler>());
            assert_eq!(actual, TypeMeta::of::<Pong>());
        }
        other => panic!("expected InvalidInstanceType, got {other:?}"),
    }
}

#[tokio::test]
async fn mismatched_event_type_resolves_to_failure_without_invoking() {
    let counter = Arc::new(CountingHandler::new());
    let descriptor = counting_descriptor(InstanceFactory::shared(counter.clone()));
    let dispatch = compile(&descriptor);

    let error = dispatch(AnyEvent::new(Pong), token()).await.unwrap_err();

    match error {
        DispatchError::UnexpectedEventType { expected, actual } => {
            assert_eq!(expected, TypeMeta::of::<Ping>());
            assert_eq!(actual, TypeMeta::of::<Pong>());
        }
        other => panic!("expected UnexpectedEventType, got {other:?}"),
    }
    assert_eq!(counter.count(), 0, "handler must never be invoked");
}

#[tokio::test]
async fn mismatched_event_type_resolves_to_failure_even_when_yielding() {
    let counter = Arc::new(CountingHandler::new());
    let descriptor = HandlerDescriptor::build(
        MethodRef::sync("bump", CountingHandler::bump::<Ping>).with_yield(true),
        InstanceFactory::shared(counter.clone()),
    )
    .unwrap();
    let dispatch = compile(&descriptor);

    let error = dispatch(AnyEvent::new(Pong), token()).await.unwrap_err();

    assert!(matches!(error, DispatchError::UnexpectedEventType { .. }));
    assert_eq!(counter.count(), 0);
}

#[tokio::test]
async fn handler_error_is_carried_unwrapped() {
    let descriptor = HandlerDescriptor::build(
        MethodRef::sync("fail", Flaky::fail),
        InstanceFactory::shared(Arc::new(Flaky)),
    )
    .unwrap();
    let dispatch = compile(&descriptor);

    let error = dispatch(AnyEvent::new(Ping { seq: 1 }), token())
        .await
        .unwrap_err();

    match error {
        DispatchError::Handler(cause) => assert_eq!(cause.to_string(), "declined"),
        other => panic!("expected Handler, got {other:?}"),
    }
}

#[tokio::test]
async fn sync_handler_panic_resolves_to_failure() {
    let descriptor = HandlerDescriptor::build(
        MethodRef::sync("explode", Flaky::explode),
        InstanceFactory::shared(Arc::new(Flaky)),
    )
    .unwrap();
    let dispatch = compile(&descriptor);

    let error = dispatch(AnyEvent::new(Ping { seq: 1 }), token())
        .await
        .unwrap_err();

    match error {
        DispatchError::HandlerPanic(message) => assert!(message.contains("kaboom")),
        other => panic!("expected HandlerPanic, got {other:?}"),
    }
}

#[tokio::test]
async fn async_handler_panic_resolves_to_failure() {
    let descriptor = HandlerDescriptor::build(
        MethodRef::future("explode_async", Flaky::explode_async),
        InstanceFactory::shared(Arc::new(Flaky)),
    )
    .unwrap();
    let dispatch = compile(&descriptor);

    let error = dispatch(AnyEvent::new(Ping { seq: 1 }), token())
        .await
        .unwrap_err();

    assert!(matches!(error, DispatchError::HandlerPanic(_)));
}

#[tokio::test]
async fn yield_lets_scheduled_work_interleave() {
    let audit = Arc::new(Audit::new());
    let descriptor = HandlerDescriptor::build(
        MethodRef::sync("on_ping", Audit::on_ping).with_yield(true),
        InstanceFactory::shared(audit.clone()),
    )
    .unwrap();
    let dispatch = compile(&descriptor);

    let first = tokio::spawn(dispatch(AnyEvent::new(Ping { seq: 1 }), token()));
    let second = tokio::spawn(dispatch(AnyEvent::new(Ping { seq: 2 }), token()));
    let marker = tokio::spawn({
        let log = audit.log.clone();
        async move {
            log.lock().unwrap().push("marker".to_string());
        }
    });

    let (first, second, marker) = tokio::join!(first, second, marker);
    first.unwrap().unwrap();
    second.unwrap().unwrap();
    marker.unwrap();

    let entries = audit.entries();
    assert_eq!(entries.len(), 3);
    assert_eq!(
        entries[0], "marker",
        "flagged sync handlers must yield before running: {entries:?}"
    );
}

#[tokio::test]
async fn recorded_events_match_dispatched_values() {
    let recorder = Arc::new(RecordingHandler::<Ping>::new());
    let descriptor = HandlerDescriptor::build(
        MethodRef::sync("receive", RecordingHandler::<Ping>::receive),
        InstanceFactory::shared(recorder.clone()),
    )
    .unwrap();
    let dispatch = compile(&descriptor);

    dispatch(AnyEvent::new(Ping { seq: 11 }), token())
        .await
        .unwrap();

    assert_eq!(recorder.events(), vec![Ping { seq: 11 }]);
}

#[tokio::test]
async fn fresh_factory_builds_an_instance_per_call() {
    let descriptor = HandlerDescriptor::build(
        MethodRef::sync("bump", CountingHandler::bump::<Ping>),
        InstanceFactory::fresh(CountingHandler::new),
    )
    .unwrap();
    let dispatch = compile(&descriptor);

    // Each call sees its own counter; both succeed independently.
    dispatch(AnyEvent::new(Ping { seq: 1 }), token())
        .await
        .unwrap();
    dispatch(AnyEvent::new(Ping { seq: 2 }), token())
        .await
        .unwrap();
}

#[tokio::test]
async fn compiling_twice_yields_equivalent_dispatch_functions() {
    let counter = Arc::new(CountingHandler::new());
    let descriptor = counting_descriptor(InstanceFactory::shared(counter.clone()));

    let first = compile(&descriptor);
    let second = compile(&descriptor);

    let event = AnyEvent::new(Ping { seq: 9 });
    first(event.clone(), token()).await.unwrap();
    second(event, token()).await.unwrap();

    assert_eq!(counter.count(), 2, "one invocation per call, no more");
}
