//! Runtime type and method identity.
//!
//! Rust has no reflection, so the registration layer records identity
//! explicitly at the point where concrete types are still known. [`TypeMeta`]
//! pairs a [`TypeId`] with a printable name; every diagnostic in the framework
//! names types through it.

use std::any::{TypeId, type_name};
use std::fmt;

/// Runtime identity of a type: its [`TypeId`] plus a printable name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeMeta {
    id: TypeId,
    name: &'static str,
}

impl TypeMeta {
    /// Capture the identity of `T`.
    pub fn of<T: 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    /// The captured [`TypeId`].
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// The type's name as reported by [`type_name`].
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether this is one of the scalar primitives rejected as event types.
    ///
    /// Events route by identity and carry domain meaning; a bare `u32` or
    /// `bool` does neither, so classification rejects them.
    pub fn is_scalar(&self) -> bool {
        macro_rules! is_any_of {
            ($($t:ty),* $(,)?) => {
                false $(|| self.id == TypeId::of::<$t>())*
            };
        }
        is_any_of!(
            (),
            bool,
            char,
            i8,
            i16,
            i32,
            i64,
            i128,
            isize,
            u8,
            u16,
            u32,
            u64,
            u128,
            usize,
            f32,
            f64,
        )
    }
}

impl fmt::Display for TypeMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Identity of a handler method: the declaring type plus the method name.
///
/// Carried by every build-time error so that diagnostics name the offending
/// method rather than an anonymous signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MethodId {
    declaring: TypeMeta,
    name: &'static str,
}

impl MethodId {
    /// Identify the method `name` declared on `declaring`.
    pub fn new(declaring: TypeMeta, name: &'static str) -> Self {
        Self { declaring, name }
    }

    /// The type that declares the method.
    pub fn declaring(&self) -> TypeMeta {
        self.declaring
    }

    /// The method's name.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Display for MethodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.declaring, self.name)
    }
}
