//! Handler instance resolution.
//!
//! A descriptor never owns the object its method runs on; it holds an
//! [`InstanceFactory`] and asks it again on every call. The factory decides
//! whether that means one shared instance, a fresh instance per call, or a
//! lookup in some host-owned resolver.

use kalla_core::{BoxError, TypeMeta};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A resolved handler instance, erased to `Any`.
#[derive(Clone)]
pub struct AnyInstance {
    value: Arc<dyn Any + Send + Sync>,
    meta: TypeMeta,
}

impl AnyInstance {
    /// Erase a shared instance of `H`.
    pub fn new<H: Send + Sync + 'static>(instance: Arc<H>) -> Self {
        Self {
            value: instance,
            meta: TypeMeta::of::<H>(),
        }
    }

    /// The runtime identity of the erased instance.
    pub fn meta(&self) -> TypeMeta {
        self.meta
    }

    /// Borrow the instance as `H`, if that is its concrete type.
    pub fn downcast_ref<H: 'static>(&self) -> Option<&H> {
        self.value.downcast_ref()
    }

    /// Share the instance as `Arc<H>`, if that is its concrete type.
    pub fn downcast_arc<H: Send + Sync + 'static>(&self) -> Option<Arc<H>> {
        Arc::clone(&self.value).downcast().ok()
    }
}

impl fmt::Debug for AnyInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AnyInstance").field(&self.meta.name()).finish()
    }
}

/// Produces the object a handler method is invoked on.
///
/// Called once per dispatch. `Ok(None)` means the factory had no instance to
/// offer; `Err` carries the factory's own failure. Both are normalized by the
/// dispatch function rather than propagated, and a produced instance of the
/// wrong type is caught there too, so resolvers backed by loosely typed
/// containers are safe to plug in.
#[derive(Clone)]
pub struct InstanceFactory {
    produce: Arc<dyn Fn() -> Result<Option<AnyInstance>, BoxError> + Send + Sync>,
}

impl InstanceFactory {
    /// A factory that hands out the same shared instance on every call.
    ///
    /// The instance must tolerate concurrent use; sharing it is the caller's
    /// choice, not this crate's.
    pub fn shared<H: Send + Sync + 'static>(instance: Arc<H>) -> Self {
        Self::from_fn(move || Ok(Some(AnyInstance::new(Arc::clone(&instance)))))
    }

    /// A factory that builds a fresh instance on every call.
    pub fn fresh<H, F>(make: F) -> Self
    where
        H: Send + Sync + 'static,
        F: Fn() -> H + Send + Sync + 'static,
    {
        Self::from_fn(move || Ok(Some(AnyInstance::new(Arc::new(make())))))
    }

    /// The raw erased form, for DI-style resolvers.
    pub fn from_fn<F>(produce: F) -> Self
    where
        F: Fn() -> Result<Option<AnyInstance>, BoxError> + Send + Sync + 'static,
    {
        Self {
            produce: Arc::new(produce),
        }
    }

    pub(crate) fn resolve(&self) -> Result<Option<AnyInstance>, BoxError> {
        (self.produce)()
    }
}

impl fmt::Debug for InstanceFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("InstanceFactory")
    }
}
