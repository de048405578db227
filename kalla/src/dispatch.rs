//! Dispatch function compilation.
//!
//! [`compile`] closes the gap between the three handler shapes and the one
//! calling convention a routing table wants: every compiled function is
//! `(AnyEvent, CancellationToken) -> future`, and every failure -- factory,
//! type check, handler error, handler panic -- resolves that future to an
//! `Err` instead of escaping the call. That uniformity is the whole point:
//! the table can invoke any handler without defensive scaffolding of its own.

use crate::descriptor::HandlerDescriptor;
use crate::event::AnyEvent;
use crate::instance::AnyInstance;
use crate::method::Invoker;
use futures::FutureExt;
use futures::future::BoxFuture;
use kalla_core::DispatchError;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// The completion of a single dispatch call.
pub type DispatchFuture = BoxFuture<'static, Result<(), DispatchError>>;

/// A compiled, reusable dispatch function over one [`HandlerDescriptor`].
///
/// Stateless and re-entrant: concurrent calls share nothing but the
/// immutable descriptor and whatever the instance factory itself shares.
pub type DispatchFn = Arc<dyn Fn(AnyEvent, CancellationToken) -> DispatchFuture + Send + Sync>;

/// Compile `descriptor` into a [`DispatchFn`].
///
/// Never fails; worst case the produced function resolves every call to a
/// failed completion.
pub fn compile(descriptor: &HandlerDescriptor) -> DispatchFn {
    let descriptor = descriptor.clone();
    tracing::trace!(method = %descriptor.method().id(), "compiled dispatch function");
    Arc::new(move |event, token| {
        let descriptor = descriptor.clone();
        async move {
            let result = run(&descriptor, event, token).await;
            if let Err(error) = &result {
                tracing::debug!(
                    method = %descriptor.method().id(),
                    error = %error,
                    "dispatch resolved to a failure"
                );
            }
            result
        }
        .boxed()
    })
}

async fn run(
    descriptor: &HandlerDescriptor,
    event: AnyEvent,
    token: CancellationToken,
) -> Result<(), DispatchError> {
    // A flagged synchronous handler lets other scheduled work interleave
    // once before any of its dispatch steps run.
    if descriptor.yield_sync_execution() {
        tokio::task::yield_now().await;
    }

    let instance = resolve_instance(descriptor)?;

    if event.meta().id() != descriptor.event_type().id() {
        return Err(DispatchError::UnexpectedEventType {
            expected: descriptor.event_type(),
            actual: event.meta(),
        });
    }

    match &descriptor.method().invoker {
        Invoker::Sync(thunk) => {
            match panic::catch_unwind(AssertUnwindSafe(|| thunk(&instance, &event))) {
                Ok(result) => result,
                Err(payload) => Err(DispatchError::HandlerPanic(panic_message(payload))),
            }
        }
        Invoker::Future(thunk) => guarded(thunk(&instance, &event)).await,
        Invoker::Cancellable(thunk) => guarded(thunk(&instance, &event, token)).await,
    }
}

/// Awaits a handler future, converting a panic into a failed completion.
async fn guarded(future: DispatchFuture) -> Result<(), DispatchError> {
    match AssertUnwindSafe(future).catch_unwind().await {
        Ok(result) => result,
        Err(payload) => Err(DispatchError::HandlerPanic(panic_message(payload))),
    }
}

fn resolve_instance(descriptor: &HandlerDescriptor) -> Result<AnyInstance, DispatchError> {
    let declaring = descriptor.declaring_type();
    let resolved = panic::catch_unwind(AssertUnwindSafe(|| descriptor.factory().resolve()))
        .map_err(|payload| DispatchError::InstanceResolution {
            declaring,
            source: Some(panic_message(payload).into()),
        })?;
    match resolved {
        Err(cause) => Err(DispatchError::InstanceResolution {
            declaring,
            source: Some(cause),
        }),
        Ok(None) => Err(DispatchError::InstanceResolution {
            declaring,
            source: None,
        }),
        Ok(Some(instance)) if instance.meta().id() != declaring.id() => {
            Err(DispatchError::InvalidInstanceType {
                expected: declaring,
                actual: instance.meta(),
            })
        }
        Ok(Some(instance)) => Ok(instance),
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
