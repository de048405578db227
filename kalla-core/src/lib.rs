//! # kalla-core
//!
//! Data model and signature classifier for the Kalla handler dispatch
//! framework.
//!
//! This crate has minimal dependencies and is designed to be imported by
//! registration layers and routing tables that don't need the full `kalla`
//! implementation.
//!
//! # Two-Phase Architecture
//!
//! Kalla turns arbitrary handler methods into uniform dispatch functions in
//! two strictly separated phases:
//!
//! ## Phase 1: Classification (build time)
//!
//! A candidate method's declared [`Signature`] is validated against the
//! supported handler shapes and classified into a [`HandlerKind`]:
//!
//! - `Sync` — takes an event, returns nothing
//! - `Async` — takes an event, returns a completion future
//! - `CancellableAsync` — takes an event and a cancellation token, returns a
//!   completion future
//!
//! Classification is a pure function of the declared signature; it never
//! depends on runtime values. Unsupported shapes fail with a
//! [`SignatureError`] naming the offending method, surfaced synchronously so
//! that registration stops on a misdeclared handler instead of silently
//! skipping it.
//!
//! ## Phase 2: Dispatch (call time)
//!
//! Compiled dispatch functions (built by the `kalla` crate) normalize every
//! call-time failure into a [`DispatchError`] carried by the returned future.
//! A dispatch function never raises out of the call itself, so a routing
//! table can treat every handler identically regardless of its original
//! shape.
//!
//! # Error Types
//!
//! - [`SignatureError`] - Build-time classification errors
//! - [`DispatchError`] - Call-time dispatch failures

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod error;
mod meta;
mod signature;

// Re-exports
pub use error::{BoxError, DispatchError, SignatureError};
pub use meta::{MethodId, TypeMeta};
pub use signature::{Classified, HandlerKind, Param, ReturnShape, Signature};
