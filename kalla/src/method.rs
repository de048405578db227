//! Erased method references.
//!
//! Rust has no reflection, so the type erasure the original "compile an
//! invoker per method shape" technique performed at scan time happens here at
//! registration time instead: each typed constructor captures a generic
//! closure over the concrete handler and event types and stores it behind an
//! erased thunk, alongside the [`Signature`] it declares. Classification then
//! validates the declaration; the thunk is only ever reached through a
//! compiled dispatch function.

use crate::event::AnyEvent;
use crate::instance::AnyInstance;
use crate::outcome::HandlerOutcome;
use futures::FutureExt;
use futures::future::{self, BoxFuture};
use kalla_core::{DispatchError, MethodId, Param, ReturnShape, Signature, TypeMeta};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

type SyncThunk = Arc<dyn Fn(&AnyInstance, &AnyEvent) -> Result<(), DispatchError> + Send + Sync>;
type FutureThunk = Arc<
    dyn Fn(&AnyInstance, &AnyEvent) -> BoxFuture<'static, Result<(), DispatchError>> + Send + Sync,
>;
type CancellableThunk = Arc<
    dyn Fn(
            &AnyInstance,
            &AnyEvent,
            CancellationToken,
        ) -> BoxFuture<'static, Result<(), DispatchError>>
        + Send
        + Sync,
>;

/// The erased callable behind a [`MethodRef`], one variant per handler shape.
#[derive(Clone)]
pub(crate) enum Invoker {
    Sync(SyncThunk),
    Future(FutureThunk),
    Cancellable(CancellableThunk),
}

/// An erased reference to a handler method plus its declared [`Signature`].
///
/// Built through one of the typed constructors and consumed by
/// [`HandlerDescriptor::build`](crate::HandlerDescriptor::build). The
/// constructors derive the signature from the Rust types they capture;
/// [`with_signature`](MethodRef::with_signature) lets a registration layer
/// that recovers declarations from external metadata report the method's true
/// declaration instead, which `build` then validates.
#[derive(Clone)]
pub struct MethodRef {
    id: MethodId,
    signature: Signature,
    yield_hint: bool,
    pub(crate) invoker: Invoker,
}

impl MethodRef {
    /// Capture a synchronous handler method: `fn(&H, &E)` or
    /// `fn(&H, &E) -> Result<(), Err>`.
    pub fn sync<H, E, R, F>(name: &'static str, method: F) -> Self
    where
        H: Send + Sync + 'static,
        E: Send + Sync + 'static,
        R: HandlerOutcome,
        F: Fn(&H, &E) -> R + Send + Sync + 'static,
    {
        let thunk: SyncThunk = Arc::new(move |instance, event| {
            let handler = instance
                .downcast_ref::<H>()
                .ok_or_else(|| DispatchError::InvalidInstanceType {
                    expected: TypeMeta::of::<H>(),
                    actual: instance.meta(),
                })?;
            let payload = event
                .downcast_ref::<E>()
                .ok_or_else(|| DispatchError::UnexpectedEventType {
                    expected: TypeMeta::of::<E>(),
                    actual: event.meta(),
                })?;
            method(handler, payload)
                .into_outcome()
                .map_err(DispatchError::Handler)
        });
        Self {
            id: MethodId::new(TypeMeta::of::<H>(), name),
            signature: Signature::new(
                vec![Param::Value(TypeMeta::of::<E>())],
                ReturnShape::Unit,
            ),
            yield_hint: false,
            invoker: Invoker::Sync(thunk),
        }
    }

    /// Capture an asynchronous handler method returning a completion future.
    pub fn future<H, E, R, Fut, F>(name: &'static str, method: F) -> Self
    where
        H: Send + Sync + 'static,
        E: Send + Sync + 'static,
        R: HandlerOutcome,
        Fut: Future<Output = R> + Send + 'static,
        F: Fn(Arc<H>, Arc<E>) -> Fut + Send + Sync + 'static,
    {
        let thunk: FutureThunk = Arc::new(move |instance, event| {
            let handler = match instance.downcast_arc::<H>() {
                Some(handler) => handler,
                None => {
                    return future::ready(Err(DispatchError::InvalidInstanceType {
                        expected: TypeMeta::of::<H>(),
                        actual: instance.meta(),
                    }))
                    .boxed();
                }
            };
            let payload = match event.downcast_arc::<E>() {
                Some(payload) => payload,
                None => {
                    return future::ready(Err(DispatchError::UnexpectedEventType {
                        expected: TypeMeta::of::<E>(),
                        actual: event.meta(),
                    }))
                    .boxed();
                }
            };
            method(handler, payload)
                .map(|out| out.into_outcome().map_err(DispatchError::Handler))
                .boxed()
        });
        Self {
            id: MethodId::new(TypeMeta::of::<H>(), name),
            signature: Signature::new(
                vec![Param::Value(TypeMeta::of::<E>())],
                ReturnShape::Completion,
            ),
            yield_hint: false,
            invoker: Invoker::Future(thunk),
        }
    }

    /// Capture an asynchronous handler method that also observes a
    /// [`CancellationToken`].
    ///
    /// The token passed to the compiled dispatch function is forwarded to the
    /// method verbatim; observing it is the method's responsibility.
    pub fn cancellable<H, E, R, Fut, F>(name: &'static str, method: F) -> Self
    where
        H: Send + Sync + 'static,
        E: Send + Sync + 'static,
        R: HandlerOutcome,
        Fut: Future<Output = R> + Send + 'static,
        F: Fn(Arc<H>, Arc<E>, CancellationToken) -> Fut + Send + Sync + 'static,
    {
        let thunk: CancellableThunk = Arc::new(move |instance, event, token| {
            let handler = match instance.downcast_arc::<H>() {
                Some(handler) => handler,
                None => {
                    return future::ready(Err(DispatchError::InvalidInstanceType {
                        expected: TypeMeta::of::<H>(),
                        actual: instance.meta(),
                    }))
                    .boxed();
                }
            };
            let payload = match event.downcast_arc::<E>() {
                Some(payload) => payload,
                None => {
                    return future::ready(Err(DispatchError::UnexpectedEventType {
                        expected: TypeMeta::of::<E>(),
                        actual: event.meta(),
                    }))
                    .boxed();
                }
            };
            method(handler, payload, token)
                .map(|out| out.into_outcome().map_err(DispatchError::Handler))
                .boxed()
        });
        Self {
            id: MethodId::new(TypeMeta::of::<H>(), name),
            signature: Signature::new(
                vec![
                    Param::Value(TypeMeta::of::<E>()),
                    Param::Cancellation(TypeMeta::of::<CancellationToken>()),
                ],
                ReturnShape::Completion,
            ),
            yield_hint: false,
            invoker: Invoker::Cancellable(thunk),
        }
    }

    /// Replace the declared signature.
    ///
    /// The signature must describe the same callable; descriptor construction
    /// validates the declaration, not the capture.
    pub fn with_signature(mut self, signature: Signature) -> Self {
        self.signature = signature;
        self
    }

    /// Record the declarative "yield before executing" marker.
    ///
    /// Only meaningful for synchronous handlers; classification forces it off
    /// for the two asynchronous shapes, where execution is already scheduled.
    pub fn with_yield(mut self, yield_before: bool) -> Self {
        self.yield_hint = yield_before;
        self
    }

    /// The method's identity.
    pub fn id(&self) -> MethodId {
        self.id
    }

    /// The declared signature.
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Whether the yield marker was requested.
    pub fn yield_hint(&self) -> bool {
        self.yield_hint
    }
}

impl fmt::Debug for MethodRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodRef")
            .field("id", &self.id)
            .field("signature", &self.signature)
            .field("yield_hint", &self.yield_hint)
            .finish_non_exhaustive()
    }
}
