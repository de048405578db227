//! TypeId-keyed fan-out over compiled dispatch functions.
//!
//! This is registration glue, not part of the compilation core: a minimal
//! routing table for hosts that don't bring their own. It stores only plain
//! [`DispatchFn`] values; nothing in the core depends on how it fans out.

use crate::descriptor::HandlerDescriptor;
use crate::dispatch::{DispatchFn, compile};
use crate::event::AnyEvent;
use futures::future::join_all;
use kalla_core::DispatchError;
use std::any::TypeId;
use std::collections::HashMap;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Errors from the registry itself, as opposed to from a handler.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// No dispatch functions are registered for the event's type.
    #[error("no handlers registered for event type `{0}`")]
    NoHandlers(&'static str),
}

/// Routes erased events to every dispatch function compiled for their type.
pub struct HandlerRegistry {
    routes: HashMap<TypeId, Vec<DispatchFn>>,
}

impl HandlerRegistry {
    /// Fan `event` out to every handler registered for its runtime type,
    /// forwarding `token` to each call.
    ///
    /// Per-handler failures are carried in the returned results; one failing
    /// handler never hides the others' outcomes.
    pub async fn dispatch(
        &self,
        event: AnyEvent,
        token: CancellationToken,
    ) -> Result<Vec<Result<(), DispatchError>>, RegistryError> {
        let Some(routes) = self.routes.get(&event.meta().id()) else {
            return Err(RegistryError::NoHandlers(event.meta().name()));
        };
        let calls = routes
            .iter()
            .map(|dispatch| dispatch(event.clone(), token.clone()));
        Ok(join_all(calls).await)
    }

    /// The number of dispatch functions registered for `E`.
    pub fn handler_count<E: 'static>(&self) -> usize {
        self.routes
            .get(&TypeId::of::<E>())
            .map_or(0, |routes| routes.len())
    }
}

/// Builder for constructing a [`HandlerRegistry`].
#[derive(Default)]
pub struct HandlerRegistryBuilder {
    routes: HashMap<TypeId, Vec<DispatchFn>>,
}

impl HandlerRegistryBuilder {
    /// Create a new empty registry builder.
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
        }
    }

    /// Compile `descriptor` and register the result under its event type.
    pub fn register(mut self, descriptor: &HandlerDescriptor) -> Self {
        self.routes
            .entry(descriptor.event_type().id())
            .or_default()
            .push(compile(descriptor));
        self
    }

    /// Register an already compiled dispatch function for `E`.
    pub fn register_fn<E: 'static>(mut self, dispatch: DispatchFn) -> Self {
        self.routes.entry(TypeId::of::<E>()).or_default().push(dispatch);
        self
    }

    /// Build the registry.
    pub fn build(self) -> HandlerRegistry {
        HandlerRegistry {
            routes: self.routes,
        }
    }
}
