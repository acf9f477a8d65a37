//! The two wizards of the booking flow.
//!
//! - [`booking::BookingWizard`]: tour form, confirmation and submission
//! - [`payment::PaymentWizard`]: method choice, payment creation, proof upload
//!   and confirmation
//!
//! Both are reducers: every visitor intent and every collaborator answer is
//! an action, and collaborator calls are returned as effects. An action that
//! is not legal in the current step is ignored and logged at debug level.

pub mod booking;
pub mod payment;

pub use booking::{BookingAction, BookingEnvironment, BookingWizard, BookingWizardState};
pub use payment::{PaymentAction, PaymentEnvironment, PaymentWizard, PaymentWizardState};

use crate::step::Step;

/// Severity of a notification
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationKind {
    /// Something finished
    Success,
    /// A call failed; the step did not change
    Error,
}

/// A non-blocking message for the visitor
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    /// Severity
    pub kind: NotificationKind,
    /// Text to show
    pub message: String,
}

impl Notification {
    /// A success message
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            message: message.into(),
        }
    }

    /// An error message
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            message: message.into(),
        }
    }

    /// Whether this reports a failure
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.kind == NotificationKind::Error
    }
}

fn ignored(step: Step, action: &str) {
    if step.is_terminal() {
        tracing::debug!(%step, action, "Action ignored, wizard finished");
    } else {
        tracing::debug!(%step, action, "Action ignored in current step");
    }
}

fn transition(from: Step, to: Step) {
    if from != to {
        tracing::info!(%from, %to, finished = to.is_terminal(), "Wizard step changed");
    }
}
