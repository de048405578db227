//! Handler return-value conversion.

use kalla_core::BoxError;

/// Trait for converting a handler method's return value into a dispatch
/// outcome.
///
/// # Default Implementations
///
/// - `()` → success
/// - `Result<(), E>` → success or the boxed error, unwrapped
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a `HandlerOutcome`",
    label = "handler methods must return `()` or `Result<(), E>`",
    note = "Implement `HandlerOutcome` to use another return type as a handler outcome."
)]
pub trait HandlerOutcome {
    /// Convert the return value into success or a carried failure.
    fn into_outcome(self) -> Result<(), BoxError>;
}

impl HandlerOutcome for () {
    fn into_outcome(self) -> Result<(), BoxError> {
        Ok(())
    }
}

impl<E> HandlerOutcome for Result<(), E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn into_outcome(self) -> Result<(), BoxError> {
        self.map_err(|e| Box::new(e) as BoxError)
    }
}
