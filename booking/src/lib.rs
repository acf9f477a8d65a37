//! # Tourbook
//!
//! Booking and payment wizard of a tour booking site.
//!
//! A visitor arrives with a tour slug and dates in the URL, fills in the
//! booking form, confirms it, chooses a payment method, transfers the money,
//! uploads a proof of the transfer and is done.
//!
//! ## Modules
//!
//! - [`catalog`]: tour table, dialing codes, URL tour selection
//! - [`form`], [`validation`], [`pricing`]: the booking form
//! - [`wizard`]: the booking and payment reducers
//! - [`orchestrator`]: payment creation and confirmation
//! - [`gateway`], [`http`], [`upload`]: backend collaborators
//! - [`config`]: environment configuration
//!
//! ## Example
//!
//! ```ignore
//! use tourbook::wizard::{BookingAction, BookingWizard, BookingWizardState};
//! use tourbook_runtime::Store;
//!
//! let state = BookingWizardState::from_query("slug=jelajah-nusa-penida&start=2025-03-01&end=2025-03-02");
//! let store = Store::new(state, BookingWizard::new(), environment);
//!
//! store.send(BookingAction::Submit).await?;
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod form;
pub mod gateway;
pub mod http;
pub mod orchestrator;
pub mod pricing;
pub mod step;
pub mod types;
pub mod upload;
pub mod validation;
pub mod wizard;

#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;

pub use catalog::{TourContext, TourSelection};
pub use config::Config;
pub use error::{
    BookingSubmissionError, ConfirmationError, LoadError, PaymentCreationError, ServiceError, UploadError,
};
pub use form::{BookingDraft, Field, FieldEdit};
pub use orchestrator::PaymentOrchestrator;
pub use step::Step;
pub use validation::{BookingSchema, ValidationEngine, ValidationErrors};
