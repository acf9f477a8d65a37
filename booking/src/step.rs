//! Wizard steps.

use crate::catalog::TourSelection;
use crate::types::PaymentRecord;
use std::fmt;

/// Where the visitor is in the booking and payment flow
///
/// The booking wizard moves through `NoTour`, `Entry`, `Confirm` and `Done`;
/// the payment wizard through `SelectMethod`, `AwaitingPayment` and `Done`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Step {
    /// The page was opened without a valid tour selection; nothing to book
    NoTour,
    /// Filling in the booking form
    Entry,
    /// Reviewing the booking before sending it
    Confirm,
    /// Choosing how to pay
    SelectMethod,
    /// Payment created, waiting for the transfer proof
    AwaitingPayment,
    /// Finished
    Done,
}

impl Step {
    /// Initial step of the booking wizard
    #[must_use]
    pub const fn for_booking(selection: Option<&TourSelection>) -> Self {
        if selection.is_some() { Self::Entry } else { Self::NoTour }
    }

    /// Initial step of the payment wizard, derived from the booking's
    /// payment records: any paid record finishes the flow, any pending one
    /// resumes it.
    #[must_use]
    pub fn for_payments(records: &[PaymentRecord]) -> Self {
        if records.iter().any(PaymentRecord::is_paid) {
            Self::Done
        } else if records.iter().any(PaymentRecord::is_pending) {
            Self::AwaitingPayment
        } else {
            Self::SelectMethod
        }
    }

    /// Whether no transition leaves this step
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::NoTour | Self::Done)
    }

    /// Upper-case name used in logs
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoTour => "NO_TOUR",
            Self::Entry => "ENTRY",
            Self::Confirm => "CONFIRM",
            Self::SelectMethod => "SELECT_METHOD",
            Self::AwaitingPayment => "AWAITING_PAYMENT",
            Self::Done => "DONE",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
