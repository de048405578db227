//! Error types for Kalla.
//!
//! Two error enums match the framework's two phases:
//!
//! - [`SignatureError`] - Build-time classification errors, returned
//!   synchronously from descriptor construction
//! - [`DispatchError`] - Call-time failures, always carried as the failed
//!   outcome of a dispatch future and never raised out of the call

use crate::meta::{MethodId, TypeMeta};
use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A handler method's declared signature is not a supported handler shape.
///
/// These indicate a programming mistake in how a handler is declared;
/// registration should stop rather than skip the method.
#[derive(Error, Debug)]
pub enum SignatureError {
    /// The method declares no parameters at all.
    #[error("{method} declares no parameters; a handler's first parameter is the event")]
    MissingEventParameter {
        /// The offending method.
        method: MethodId,
    },

    /// The first parameter is a scalar or a cancellation token, neither of
    /// which can be an event.
    #[error("{method} takes `{ty}` as its event, which is not a supported event type")]
    UnsupportedEventType {
        /// The offending method.
        method: MethodId,
        /// The declared first-parameter type.
        ty: TypeMeta,
    },

    /// The method returns something other than nothing or a completion
    /// future.
    #[error("{method} returns `{ty}`; a handler returns nothing or a completion future")]
    UnsupportedReturnType {
        /// The offending method.
        method: MethodId,
        /// The declared return type.
        ty: TypeMeta,
    },

    /// The method accepts a cancellation token but completes synchronously.
    #[error("{method} accepts a cancellation token but completes synchronously")]
    CancellationNotSupportedForSyncHandlers {
        /// The offending method.
        method: MethodId,
    },

    /// The method declares a parameter beyond the supported
    /// `(event)` / `(event, cancellation)` shapes.
    #[error("{method} declares an unexpected parameter of type `{ty}`")]
    UnexpectedParameter {
        /// The offending method.
        method: MethodId,
        /// The extra parameter's type.
        ty: TypeMeta,
    },
}

impl SignatureError {
    /// The method the error is about.
    pub fn method(&self) -> MethodId {
        match self {
            Self::MissingEventParameter { method }
            | Self::UnsupportedEventType { method, .. }
            | Self::UnsupportedReturnType { method, .. }
            | Self::CancellationNotSupportedForSyncHandlers { method }
            | Self::UnexpectedParameter { method, .. } => *method,
        }
    }
}

/// A dispatch call resolved to a failure.
///
/// Dispatch functions never raise out of the call itself; every failure path
/// resolves the returned future to one of these instead, so a single
/// misbehaving handler cannot crash the caller's invocation loop.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// The instance factory failed or produced nothing.
    ///
    /// `source` carries the factory's own error when it failed; it is absent
    /// when the factory returned no instance at all.
    #[error("could not resolve a `{declaring}` instance for the handler")]
    InstanceResolution {
        /// The type the handler is declared on.
        declaring: TypeMeta,
        /// The factory's failure, if it produced one.
        #[source]
        source: Option<BoxError>,
    },

    /// The instance factory produced an instance of the wrong type.
    #[error("instance factory produced `{actual}` where the handler expects `{expected}`")]
    InvalidInstanceType {
        /// The handler's declaring type.
        expected: TypeMeta,
        /// The type the factory actually produced.
        actual: TypeMeta,
    },

    /// The dispatched event's runtime type does not match the descriptor.
    ///
    /// Routing tables may dispatch by a coarser key than the exact event
    /// type; this check is the last line of defense.
    #[error("event of type `{actual}` dispatched to a handler for `{expected}`")]
    UnexpectedEventType {
        /// The event type the handler accepts.
        expected: TypeMeta,
        /// The dispatched event's runtime type.
        actual: TypeMeta,
    },

    /// The handler panicked during invocation.
    #[error("handler panicked: {0}")]
    HandlerPanic(String),

    /// The handler itself returned an error; carried unwrapped.
    #[error(transparent)]
    Handler(BoxError),
}
