//! Type-erased event envelopes.

use kalla_core::TypeMeta;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A type-erased event, carrying the runtime identity of its concrete type.
///
/// Routing tables hold events in this form so that one table can route any
/// event type; dispatch functions downcast back to the concrete type they
/// were compiled for. Cloning is cheap and shares the underlying value.
#[derive(Clone)]
pub struct AnyEvent {
    value: Arc<dyn Any + Send + Sync>,
    meta: TypeMeta,
}

impl AnyEvent {
    /// Erase an owned event.
    pub fn new<E: Send + Sync + 'static>(event: E) -> Self {
        Self::from_arc(Arc::new(event))
    }

    /// Erase an already shared event.
    pub fn from_arc<E: Send + Sync + 'static>(event: Arc<E>) -> Self {
        Self {
            value: event,
            meta: TypeMeta::of::<E>(),
        }
    }

    /// The runtime identity of the erased event.
    pub fn meta(&self) -> TypeMeta {
        self.meta
    }

    /// Borrow the event as `E`, if that is its concrete type.
    pub fn downcast_ref<E: 'static>(&self) -> Option<&E> {
        self.value.downcast_ref()
    }

    /// Share the event as `Arc<E>`, if that is its concrete type.
    pub fn downcast_arc<E: Send + Sync + 'static>(&self) -> Option<Arc<E>> {
        Arc::clone(&self.value).downcast().ok()
    }
}

impl fmt::Debug for AnyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AnyEvent").field(&self.meta.name()).finish()
    }
}
