//! Declarative macros for ergonomic effect construction
//!
//! Collaborator calls in the wizards all follow the same shape: clone the
//! collaborator handle, await it, and map the result to a feedback action.
//! These macros keep that shape short.

/// Create an `Effect::Future` from an async block body
///
/// # Example
///
/// ```rust,ignore
/// use tourbook_core::async_effect;
///
/// async_effect! {
///     match orchestrator.create_payment(booking_id, method_id, amount).await {
///         Ok(record) => Some(PaymentAction::PaymentCreated { record }),
///         Err(error) => Some(PaymentAction::PaymentCreationFailed { error }),
///     }
/// }
/// ```
#[macro_export]
macro_rules! async_effect {
    ($($body:tt)*) => {
        $crate::effect::Effect::Future(
            ::std::boxed::Box::pin(async move { $($body)* })
        )
    };
}
