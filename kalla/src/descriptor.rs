//! Handler descriptors and the descriptor factory.

use crate::instance::InstanceFactory;
use crate::method::MethodRef;
use kalla_core::{HandlerKind, SignatureError, TypeMeta};

/// Everything needed to invoke one validated handler method.
///
/// Built once per method at registration time and immutable thereafter;
/// rebuilding means re-running [`build`](HandlerDescriptor::build). Cloning
/// is cheap, all captured state is shared.
#[derive(Debug, Clone)]
pub struct HandlerDescriptor {
    method: MethodRef,
    factory: InstanceFactory,
    kind: HandlerKind,
    event_type: TypeMeta,
    yield_sync: bool,
}

impl HandlerDescriptor {
    /// Classify `method`'s declared signature and, if it is a supported
    /// handler shape, pair it with `factory` into a descriptor.
    ///
    /// Fails synchronously with a [`SignatureError`] naming the method when
    /// the declaration is unsupported; a misdeclared handler should stop
    /// registration, not be skipped.
    pub fn build(
        method: MethodRef,
        factory: InstanceFactory,
    ) -> Result<HandlerDescriptor, SignatureError> {
        let classified = method.signature().classify(&method.id())?;
        let yield_sync = classified.kind == HandlerKind::Sync && method.yield_hint();
        tracing::debug!(
            method = %method.id(),
            kind = ?classified.kind,
            event = %classified.event_type,
            "built handler descriptor"
        );
        Ok(HandlerDescriptor {
            kind: classified.kind,
            event_type: classified.event_type,
            yield_sync,
            method,
            factory,
        })
    }

    /// The type declaring the handler method.
    pub fn declaring_type(&self) -> TypeMeta {
        self.method.id().declaring()
    }

    /// The event type the method accepts; the routing key.
    pub fn event_type(&self) -> TypeMeta {
        self.event_type
    }

    /// The calling convention the method was classified into.
    pub fn kind(&self) -> HandlerKind {
        self.kind
    }

    /// Whether a compiled dispatch function yields to the scheduler once
    /// before running this handler. Always `false` for the async kinds.
    pub fn yield_sync_execution(&self) -> bool {
        self.yield_sync
    }

    /// The erased method reference.
    pub fn method(&self) -> &MethodRef {
        &self.method
    }

    pub(crate) fn factory(&self) -> &InstanceFactory {
        &self.factory
    }
}

/// Build a descriptor per method, all sharing one instance factory.
///
/// Short-circuits on the first misdeclared method.
pub fn build_all<I>(
    methods: I,
    factory: &InstanceFactory,
) -> Result<Vec<HandlerDescriptor>, SignatureError>
where
    I: IntoIterator<Item = MethodRef>,
{
    methods
        .into_iter()
        .map(|method| HandlerDescriptor::build(method, factory.clone()))
        .collect()
}

/// Build a descriptor per method, choosing the factory by declaring type.
///
/// Short-circuits on the first misdeclared method.
pub fn build_all_with<I, F>(
    methods: I,
    mut factory_for: F,
) -> Result<Vec<HandlerDescriptor>, SignatureError>
where
    I: IntoIterator<Item = MethodRef>,
    F: FnMut(TypeMeta) -> InstanceFactory,
{
    methods
        .into_iter()
        .map(|method| {
            let factory = factory_for(method.id().declaring());
            HandlerDescriptor::build(method, factory)
        })
        .collect()
}
