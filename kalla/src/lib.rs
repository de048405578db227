//! # kalla - Handler Discovery and Dispatch Compilation
//!
//! `kalla` turns heterogeneous handler methods into uniform, type-erased
//! dispatch functions that a generic routing table can invoke without
//! knowing anything about the original method's shape.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use kalla::{AnyEvent, HandlerDescriptor, InstanceFactory, MethodRef, compile};
//!
//! struct Greeter;
//! struct Greeting { name: String }
//!
//! impl Greeter {
//!     fn on_greeting(&self, event: &Greeting) {
//!         println!("hello, {}", event.name);
//!     }
//! }
//!
//! let method = MethodRef::sync("on_greeting", Greeter::on_greeting);
//! let factory = InstanceFactory::shared(Arc::new(Greeter));
//! let descriptor = HandlerDescriptor::build(method, factory)?;
//! let dispatch = compile(&descriptor);
//!
//! // `dispatch` now has a fixed shape regardless of the method's own:
//! dispatch(AnyEvent::new(Greeting { name: "world".into() }), token).await?;
//! ```
//!
//! ## How it works
//!
//! Registration happens once, invocation many times:
//!
//! 1. A [`MethodRef`] captures a handler method through one of three typed
//!    constructors ([`sync`], [`future`], [`cancellable`]), erasing the
//!    handler and event types while recording the declared [`Signature`].
//! 2. [`HandlerDescriptor::build`] classifies the signature into a
//!    [`HandlerKind`] and pairs the method with an [`InstanceFactory`].
//!    Misdeclared methods fail here, synchronously, with a
//!    [`SignatureError`] naming the method.
//! 3. [`compile`] produces a [`DispatchFn`]: a stateless, re-entrant
//!    `(AnyEvent, CancellationToken) -> future` closure. Every call-time
//!    failure (factory failure, wrong instance type, mismatched event,
//!    handler error, handler panic) resolves the returned future to a
//!    [`DispatchError`]; nothing is ever raised out of the call itself.
//!
//! The [`registry`] module provides a minimal TypeId-keyed fan-out over
//! compiled dispatch functions for hosts that don't bring their own
//! routing table.
//!
//! [`sync`]: MethodRef::sync
//! [`future`]: MethodRef::future
//! [`cancellable`]: MethodRef::cancellable

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod descriptor;
mod dispatch;
mod event;
mod instance;
mod method;
mod outcome;
pub mod registry;
pub mod testing;

// Re-export the core data model alongside this crate's surface.
pub use kalla_core::{
    BoxError, Classified, DispatchError, HandlerKind, MethodId, Param, ReturnShape, Signature,
    SignatureError, TypeMeta,
};

pub use descriptor::{HandlerDescriptor, build_all, build_all_with};
pub use dispatch::{DispatchFn, DispatchFuture, compile};
pub use event::AnyEvent;
pub use instance::{AnyInstance, InstanceFactory};
pub use method::MethodRef;
pub use outcome::HandlerOutcome;
