//! Declared handler signatures and their classification.
//!
//! A [`Signature`] is the registration layer's description of how a handler
//! method is declared: its parameter list and return shape. Classification
//! validates that description against the supported handler shapes and, when
//! it passes, names the method's [`HandlerKind`]. It is a pure function of
//! the declaration and never depends on runtime values.

use crate::error::SignatureError;
use crate::meta::{MethodId, TypeMeta};

/// The calling convention a handler method was classified into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerKind {
    /// Takes an event, returns nothing; completes before the call returns.
    Sync,
    /// Takes an event, returns a completion future.
    Async,
    /// Takes an event and a cancellation token, returns a completion future.
    CancellableAsync,
}

/// One declared parameter of a handler method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Param {
    /// An ordinary value parameter of the given type.
    Value(TypeMeta),
    /// A cancellation token parameter of the given concrete token type.
    Cancellation(TypeMeta),
}

impl Param {
    /// The parameter's declared type.
    pub fn meta(&self) -> TypeMeta {
        match self {
            Self::Value(ty) | Self::Cancellation(ty) => *ty,
        }
    }
}

/// The declared return shape of a handler method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnShape {
    /// The method returns nothing; it is fire-and-forget.
    Unit,
    /// The method returns an opaque completion future with no payload.
    Completion,
    /// Any other return type; never a supported handler shape.
    Other(TypeMeta),
}

/// A successful classification: the handler's kind plus its event type.
#[derive(Debug, Clone, Copy)]
pub struct Classified {
    /// The calling convention the method was classified into.
    pub kind: HandlerKind,
    /// The event type accepted by the method; the routing key.
    pub event_type: TypeMeta,
}

/// A handler method's declared parameter list and return shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    params: Vec<Param>,
    returns: ReturnShape,
}

impl Signature {
    /// Describe a declaration with the given parameters and return shape.
    pub fn new(params: Vec<Param>, returns: ReturnShape) -> Self {
        Self { params, returns }
    }

    /// The declared parameters, in order.
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// The declared return shape.
    pub fn returns(&self) -> ReturnShape {
        self.returns
    }

    /// Validate this declaration and classify it into a [`HandlerKind`].
    ///
    /// Rules, applied in order:
    ///
    /// 1. At least one parameter; the first is the event and must not be a
    ///    scalar or a cancellation token.
    /// 2. The return shape must be [`ReturnShape::Unit`] or
    ///    [`ReturnShape::Completion`].
    /// 3. A second parameter, if present, must be a cancellation token, and
    ///    a cancellation token requires a completion return.
    /// 4. No parameters beyond `(event)` / `(event, cancellation)`.
    pub fn classify(&self, method: &MethodId) -> Result<Classified, SignatureError> {
        let Some(first) = self.params.first() else {
            return Err(SignatureError::MissingEventParameter { method: *method });
        };
        let event_type = match first {
            Param::Value(ty) if !ty.is_scalar() => *ty,
            other => {
                return Err(SignatureError::UnsupportedEventType {
                    method: *method,
                    ty: other.meta(),
                });
            }
        };

        let completes_async = match self.returns {
            ReturnShape::Unit => false,
            ReturnShape::Completion => true,
            ReturnShape::Other(ty) => {
                return Err(SignatureError::UnsupportedReturnType {
                    method: *method,
                    ty,
                });
            }
        };

        let mut rest = self.params[1..].iter();
        let cancellable = match rest.next() {
            None => false,
            Some(Param::Cancellation(_)) => true,
            Some(Param::Value(ty)) => {
                return Err(SignatureError::UnexpectedParameter {
                    method: *method,
                    ty: *ty,
                });
            }
        };
        if let Some(extra) = rest.next() {
            return Err(SignatureError::UnexpectedParameter {
                method: *method,
                ty: extra.meta(),
            });
        }

        let kind = match (cancellable, completes_async) {
            (false, false) => HandlerKind::Sync,
            (false, true) => HandlerKind::Async,
            (true, true) => HandlerKind::CancellableAsync,
            (true, false) => {
                return Err(SignatureError::CancellationNotSupportedForSyncHandlers {
                    method: *method,
                });
            }
        };
        Ok(Classified { kind, event_type })
    }
}
