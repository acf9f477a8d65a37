//! Payment wizard: `SELECT_METHOD`, `AWAITING_PAYMENT`, `DONE`.
//!
//! The wizard keeps a single current [`PaymentRecord`]. Choosing another
//! method replaces it only once the backend has created the new one, so a
//! failed creation leaves the previous record in place. A reload is refused
//! while a creation is in flight. Payment records are a cache of the
//! backend; they are read again after a confirmation.

use super::{Notification, ignored, transition};
use crate::error::{ConfirmationError, LoadError, PaymentCreationError, UploadError};
use crate::gateway::{BookingGateway, ProofUploader};
use crate::orchestrator::PaymentOrchestrator;
use crate::step::Step;
use crate::types::{BookingId, BookingRecord, PaymentMethod, PaymentMethodId, PaymentRecord, ProofFile};
use std::sync::Arc;
use tourbook_core::{SmallVec, async_effect, effect::Effect, reducer::Reducer, smallvec};

// ============================================================================
// State
// ============================================================================

/// What the payment page shows
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaymentWizardState {
    /// Booking being paid
    pub booking_id: BookingId,
    /// Current step
    pub step: Step,
    /// Booking details, once loaded
    pub booking: Option<BookingRecord>,
    /// Methods on offer
    pub methods: Vec<PaymentMethod>,
    /// Every payment record of the booking, as last read
    pub payments: Vec<PaymentRecord>,
    /// Method picked on the selection screen
    pub selected_method: Option<PaymentMethodId>,
    /// The payment the visitor is working on
    pub current: Option<PaymentRecord>,
    /// URL of the uploaded transfer proof
    pub proof_url: Option<String>,
    /// Message shown next to the upload control
    pub upload_error: Option<String>,
    /// Booking, methods and payments are being read
    pub loading: bool,
    /// A create or confirm call is in flight
    pub submitting: bool,
    /// A proof upload is in flight
    pub uploading: bool,
    /// Message for the visitor
    pub notification: Option<Notification>,
}

impl PaymentWizardState {
    /// Starts the wizard for `booking_id`; send [`PaymentAction::Load`] next
    #[must_use]
    pub const fn new(booking_id: BookingId) -> Self {
        Self {
            booking_id,
            step: Step::SelectMethod,
            booking: None,
            methods: Vec::new(),
            payments: Vec::new(),
            selected_method: None,
            current: None,
            proof_url: None,
            upload_error: None,
            loading: false,
            submitting: false,
            uploading: false,
            notification: None,
        }
    }

    /// Methods grouped by family for display
    #[must_use]
    pub fn method_groups(&self) -> Vec<(&str, Vec<&PaymentMethod>)> {
        crate::types::group_by_kind(&self.methods)
    }

    /// The selected method's details
    #[must_use]
    pub fn selected(&self) -> Option<&PaymentMethod> {
        let id = self.selected_method.as_ref()?;
        self.methods.iter().find(|method| &method.id == id)
    }

    /// Whether the proof can be submitted right now
    #[must_use]
    pub fn can_submit_proof(&self) -> bool {
        self.step == Step::AwaitingPayment
            && self.proof_url.is_some()
            && self.current.is_some()
            && !self.submitting
            && !self.uploading
    }
}

/// The record the visitor works on: a paid one if any, else the latest pending one
fn current_record(payments: &[PaymentRecord]) -> Option<PaymentRecord> {
    payments
        .iter()
        .find(|record| record.is_paid())
        .or_else(|| payments.iter().rev().find(|record| record.is_pending()))
        .cloned()
}

// ============================================================================
// Actions
// ============================================================================

/// Inputs of the payment wizard
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PaymentAction {
    /// Read the booking, the methods and the payment records
    Load,
    /// Everything was read
    Loaded {
        /// The booking
        booking: BookingRecord,
        /// Methods on offer
        methods: Vec<PaymentMethod>,
        /// The booking's payment records
        payments: Vec<PaymentRecord>,
    },
    /// Reading failed
    LoadFailed {
        /// Why
        error: LoadError,
    },
    /// Pick a method
    SelectMethod {
        /// Chosen method
        method_id: PaymentMethodId,
    },
    /// Create the payment for the selected method
    Continue,
    /// The backend created the payment
    PaymentCreated {
        /// New pending record
        record: PaymentRecord,
    },
    /// The payment could not be created
    PaymentCreationFailed {
        /// Why
        error: PaymentCreationError,
    },
    /// Go back to method selection
    ChangeMethod,
    /// Upload a transfer proof
    UploadProof {
        /// Chosen image
        file: ProofFile,
    },
    /// The proof is stored
    ProofUploaded {
        /// Public URL
        url: String,
    },
    /// The proof could not be stored
    ProofUploadFailed {
        /// Why
        error: UploadError,
    },
    /// Send the uploaded proof to the backend
    SubmitProof,
    /// The backend accepted the proof
    PaymentConfirmed,
    /// The backend refused the proof or could not be reached
    PaymentConfirmationFailed {
        /// Why
        error: ConfirmationError,
    },
    /// Payment records read again after a confirmation
    PaymentsRefreshed {
        /// The booking's payment records
        payments: Vec<PaymentRecord>,
    },
    /// Hide the notification
    DismissNotification,
}

impl PaymentAction {
    const fn name(&self) -> &'static str {
        match self {
            Self::Load => "Load",
            Self::Loaded { .. } => "Loaded",
            Self::LoadFailed { .. } => "LoadFailed",
            Self::SelectMethod { .. } => "SelectMethod",
            Self::Continue => "Continue",
            Self::PaymentCreated { .. } => "PaymentCreated",
            Self::PaymentCreationFailed { .. } => "PaymentCreationFailed",
            Self::ChangeMethod => "ChangeMethod",
            Self::UploadProof { .. } => "UploadProof",
            Self::ProofUploaded { .. } => "ProofUploaded",
            Self::ProofUploadFailed { .. } => "ProofUploadFailed",
            Self::SubmitProof => "SubmitProof",
            Self::PaymentConfirmed => "PaymentConfirmed",
            Self::PaymentConfirmationFailed { .. } => "PaymentConfirmationFailed",
            Self::PaymentsRefreshed { .. } => "PaymentsRefreshed",
            Self::DismissNotification => "DismissNotification",
        }
    }
}

// ============================================================================
// Environment
// ============================================================================

/// Collaborators of the payment wizard
#[derive(Clone)]
pub struct PaymentEnvironment {
    /// Booking backend, for the amount due
    pub bookings: Arc<dyn BookingGateway>,
    /// Payment creation and confirmation
    pub payments: PaymentOrchestrator,
    /// Proof image storage
    pub uploader: Arc<dyn ProofUploader>,
}

impl PaymentEnvironment {
    /// Creates a payment environment
    #[must_use]
    pub fn new(
        bookings: Arc<dyn BookingGateway>,
        payments: PaymentOrchestrator,
        uploader: Arc<dyn ProofUploader>,
    ) -> Self {
        Self {
            bookings,
            payments,
            uploader,
        }
    }
}

// ============================================================================
// Reducer
// ============================================================================

type Effects = SmallVec<[Effect<PaymentAction>; 4]>;

/// Reducer of the payment wizard
#[derive(Clone, Copy, Debug, Default)]
pub struct PaymentWizard;

impl PaymentWizard {
    /// Creates the reducer
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn load(state: &mut PaymentWizardState, env: &PaymentEnvironment) -> Effects {
        state.loading = true;

        let bookings = Arc::clone(&env.bookings);
        let payments = env.payments.clone();
        let booking_id = state.booking_id.clone();

        smallvec![async_effect! {
            let loaded = futures::try_join!(
                async { bookings.get_booking(booking_id.clone()).await.map_err(LoadError::from) },
                payments.list_methods(),
                payments.list_payments(booking_id.clone()),
            );
            match loaded {
                Ok((booking, methods, payments)) => Some(PaymentAction::Loaded { booking, methods, payments }),
                Err(error) => Some(PaymentAction::LoadFailed { error }),
            }
        }]
    }

    fn loaded(
        state: &mut PaymentWizardState,
        booking: BookingRecord,
        methods: Vec<PaymentMethod>,
        payments: Vec<PaymentRecord>,
    ) {
        state.loading = false;
        if state.step != Step::Done {
            state.step = Step::for_payments(&payments);
        }
        state.current = current_record(&payments);
        state.booking = Some(booking);
        state.methods = methods;
        state.payments = payments;
    }

    fn create(state: &mut PaymentWizardState, env: &PaymentEnvironment) -> Effects {
        let (Some(method_id), Some(booking)) = (state.selected_method.clone(), state.booking.as_ref()) else {
            ignored(state.step, "Continue");
            return SmallVec::new();
        };
        if state.current.as_ref().is_some_and(PaymentRecord::is_paid) {
            tracing::warn!(booking = %state.booking_id, "Booking already paid, not creating another payment");
            return SmallVec::new();
        }

        let amount = booking.total_price;
        let booking_id = state.booking_id.clone();
        state.submitting = true;
        state.notification = None;
        tracing::info!(booking = %booking_id, method = %method_id, amount = amount.rupiah(), "Creating payment");

        let payments = env.payments.clone();
        smallvec![async_effect! {
            match payments.create_payment(booking_id, method_id, amount).await {
                Ok(record) => Some(PaymentAction::PaymentCreated { record }),
                Err(error) => Some(PaymentAction::PaymentCreationFailed { error }),
            }
        }]
    }

    fn created(state: &mut PaymentWizardState, record: PaymentRecord) {
        match state.payments.iter_mut().find(|existing| existing.id == record.id) {
            Some(existing) => *existing = record.clone(),
            None => state.payments.push(record.clone()),
        }
        state.current = Some(record);
        state.proof_url = None;
        state.upload_error = None;
        state.step = Step::AwaitingPayment;
    }

    fn upload(state: &mut PaymentWizardState, env: &PaymentEnvironment, file: ProofFile) -> Effects {
        state.uploading = true;
        state.upload_error = None;

        let uploader = Arc::clone(&env.uploader);
        smallvec![async_effect! {
            match uploader.upload(file).await {
                Ok(url) => Some(PaymentAction::ProofUploaded { url }),
                Err(error) => Some(PaymentAction::ProofUploadFailed { error }),
            }
        }]
    }

    fn submit_proof(state: &mut PaymentWizardState, env: &PaymentEnvironment) -> Effects {
        if !state.can_submit_proof() {
            ignored(state.step, "SubmitProof");
            return SmallVec::new();
        }
        let (Some(record), Some(proof_url)) = (state.current.as_ref(), state.proof_url.clone()) else {
            return SmallVec::new();
        };

        let payment_id = record.id.clone();
        state.submitting = true;
        state.notification = None;

        let payments = env.payments.clone();
        smallvec![async_effect! {
            match payments.confirm_payment(payment_id, proof_url).await {
                Ok(()) => Some(PaymentAction::PaymentConfirmed),
                Err(error) => Some(PaymentAction::PaymentConfirmationFailed { error }),
            }
        }]
    }

    fn refresh(state: &PaymentWizardState, env: &PaymentEnvironment) -> Effects {
        let payments = env.payments.clone();
        let booking_id = state.booking_id.clone();

        smallvec![async_effect! {
            match payments.list_payments(booking_id).await {
                Ok(payments) => Some(PaymentAction::PaymentsRefreshed { payments }),
                Err(error) => {
                    tracing::warn!(%error, "Could not refresh payment records");
                    None
                },
            }
        }]
    }
}

impl Reducer for PaymentWizard {
    type State = PaymentWizardState;
    type Action = PaymentAction;
    type Environment = PaymentEnvironment;

    #[allow(clippy::too_many_lines)] // one arm per transition
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        let from = state.step;

        let effects = match (state.step, action) {
            (_, PaymentAction::DismissNotification) => {
                state.notification = None;
                SmallVec::new()
            },

            (_, PaymentAction::Load) if !state.loading && !state.submitting => Self::load(state, env),

            (_, PaymentAction::Loaded { booking, methods, payments }) => {
                Self::loaded(state, booking, methods, payments);
                SmallVec::new()
            },

            (_, PaymentAction::LoadFailed { error }) => {
                state.loading = false;
                tracing::warn!(%error, "Loading payment data failed");
                state.notification = Some(Notification::error(error.user_message()));
                SmallVec::new()
            },

            (Step::SelectMethod, PaymentAction::SelectMethod { method_id }) if !state.submitting => {
                if state.methods.iter().any(|method| method.id == method_id) {
                    state.selected_method = Some(method_id);
                } else {
                    tracing::debug!(method = %method_id, "Unknown payment method ignored");
                }
                SmallVec::new()
            },

            (Step::SelectMethod, PaymentAction::Continue) if !state.submitting && !state.loading => {
                Self::create(state, env)
            },

            (_, PaymentAction::PaymentCreated { record }) => {
                state.submitting = false;
                if state.step != Step::Done {
                    Self::created(state, record);
                } else {
                    ignored(state.step, "PaymentCreated");
                }
                SmallVec::new()
            },

            (_, PaymentAction::PaymentCreationFailed { error }) => {
                state.submitting = false;
                tracing::warn!(%error, "Payment creation failed");
                state.notification = Some(Notification::error(error.user_message()));
                SmallVec::new()
            },

            (Step::AwaitingPayment, PaymentAction::ChangeMethod) if !state.submitting => {
                state.step = Step::SelectMethod;
                SmallVec::new()
            },

            (Step::AwaitingPayment, PaymentAction::UploadProof { file }) if !state.uploading && !state.submitting => {
                Self::upload(state, env, file)
            },

            (_, PaymentAction::ProofUploaded { url }) => {
                state.uploading = false;
                if state.step == Step::AwaitingPayment {
                    state.proof_url = Some(url);
                    state.upload_error = None;
                } else {
                    ignored(state.step, "ProofUploaded");
                }
                SmallVec::new()
            },

            (_, PaymentAction::ProofUploadFailed { error }) => {
                state.uploading = false;
                tracing::warn!(%error, "Proof upload failed");
                if state.step == Step::AwaitingPayment {
                    state.upload_error = Some(error.user_message());
                } else {
                    ignored(state.step, "ProofUploadFailed");
                }
                SmallVec::new()
            },

            (Step::AwaitingPayment, PaymentAction::SubmitProof) => Self::submit_proof(state, env),

            (_, PaymentAction::PaymentConfirmed) => {
                state.submitting = false;
                if state.step == Step::AwaitingPayment {
                    state.step = Step::Done;
                    state.notification = Some(Notification::success("Pembayaran berhasil dikonfirmasi"));
                    Self::refresh(state, env)
                } else {
                    ignored(state.step, "PaymentConfirmed");
                    SmallVec::new()
                }
            },

            (_, PaymentAction::PaymentConfirmationFailed { error }) => {
                state.submitting = false;
                tracing::warn!(%error, "Payment confirmation failed");
                state.notification = Some(Notification::error(error.user_message()));
                SmallVec::new()
            },

            (_, PaymentAction::PaymentsRefreshed { payments }) => {
                state.current = current_record(&payments).or_else(|| state.current.take());
                state.payments = payments;
                SmallVec::new()
            },

            (step, action) => {
                ignored(step, action.name());
                SmallVec::new()
            },
        };

        transition(from, state.step);
        effects
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::mocks::{MockBookingBackend, MockProofUploader, sample_methods};
    use crate::types::{Money, PaymentAvailable, PaymentId, PaymentStatus};
    use tourbook_testing::{ReducerTest, assertions};

    fn env() -> PaymentEnvironment {
        let backend = MockBookingBackend::new();
        PaymentEnvironment::new(
            Arc::new(backend.clone()),
            PaymentOrchestrator::new(Arc::new(backend)),
            Arc::new(MockProofUploader::new()),
        )
    }

    fn booking() -> BookingRecord {
        BookingRecord {
            id: BookingId::new("booking-1"),
            tour_slug: "pesona-desa-wisata-penglipuran".to_string(),
            start_date: None,
            end_date: None,
            adults: 2,
            children: 1,
            total_price: Money::from_rupiah(4_500_000),
        }
    }

    fn record(id: &str, status: PaymentStatus) -> PaymentRecord {
        PaymentRecord {
            id: PaymentId::new(id),
            reference_code: format!("REF-{id}"),
            amount: Money::from_rupiah(4_500_000),
            status,
            payment_available: PaymentAvailable {
                name: "BCA".to_string(),
                kind: "bank_transfer".to_string(),
                account_number: "1234567890".to_string(),
                account_name: "PT Desa Wisata Nusantara".to_string(),
                image: None,
            },
        }
    }

    fn loaded(payments: Vec<PaymentRecord>) -> PaymentWizardState {
        let mut state = PaymentWizardState::new(BookingId::new("booking-1"));
        PaymentWizard::loaded(&mut state, booking(), sample_methods(), payments);
        state
    }

    fn awaiting() -> PaymentWizardState {
        loaded(vec![record("pay-1", PaymentStatus::Pending)])
    }

    #[test]
    fn test_initial_step_follows_records() {
        assert_eq!(loaded(vec![]).step, Step::SelectMethod);
        assert_eq!(awaiting().step, Step::AwaitingPayment);
        assert_eq!(awaiting().current.unwrap().id, PaymentId::new("pay-1"));

        let done = loaded(vec![
            record("pay-1", PaymentStatus::Cancelled),
            record("pay-2", PaymentStatus::Paid),
        ]);
        assert_eq!(done.step, Step::Done);
        assert_eq!(done.current.unwrap().id, PaymentId::new("pay-2"));
    }

    #[test]
    fn test_continue_requires_selected_method() {
        ReducerTest::new(PaymentWizard::new())
            .with_env(env())
            .given_state(loaded(vec![]))
            .when_action(PaymentAction::Continue)
            .then_state(|s| {
                assert_eq!(s.step, Step::SelectMethod);
                assert!(!s.submitting);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_unknown_method_is_not_selected() {
        ReducerTest::new(PaymentWizard::new())
            .with_env(env())
            .given_state(loaded(vec![]))
            .when_action(PaymentAction::SelectMethod {
                method_id: PaymentMethodId::new("bitcoin"),
            })
            .then_state(|s| assert_eq!(s.selected_method, None))
            .run();
    }

    #[test]
    fn test_continue_creates_payment() {
        ReducerTest::new(PaymentWizard::new())
            .with_env(env())
            .given_state(loaded(vec![]))
            .when_actions([
                PaymentAction::SelectMethod {
                    method_id: PaymentMethodId::new("bca"),
                },
                PaymentAction::Continue,
            ])
            .then_state(|s| {
                assert!(s.submitting);
                assert_eq!(s.selected().unwrap().name, "BCA");
            })
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_has_future_effect(effects);
            })
            .run();
    }

    #[test]
    fn test_created_record_awaits_payment() {
        let mut state = loaded(vec![]);
        state.submitting = true;

        ReducerTest::new(PaymentWizard::new())
            .with_env(env())
            .given_state(state)
            .when_action(PaymentAction::PaymentCreated {
                record: record("pay-9", PaymentStatus::Pending),
            })
            .then_state(|s| {
                assert_eq!(s.step, Step::AwaitingPayment);
                assert!(!s.submitting);
                assert_eq!(s.current.as_ref().unwrap().status, PaymentStatus::Pending);
                assert_eq!(s.payments.len(), 1);
            })
            .run();
    }

    #[test]
    fn test_failed_creation_keeps_previous_record() {
        let mut state = awaiting();
        state.step = Step::SelectMethod;
        state.submitting = true;
        let error = PaymentCreationError(crate::error::ServiceError::Rejected("Metode tidak valid".to_string()));

        ReducerTest::new(PaymentWizard::new())
            .with_env(env())
            .given_state(state)
            .when_action(PaymentAction::PaymentCreationFailed { error })
            .then_state(|s| {
                assert_eq!(s.step, Step::SelectMethod);
                assert_eq!(s.current.as_ref().unwrap().id, PaymentId::new("pay-1"));
                assert_eq!(s.notification.as_ref().unwrap().message, "Metode tidak valid");
            })
            .run();
    }

    #[test]
    fn test_submit_without_proof_issues_nothing() {
        ReducerTest::new(PaymentWizard::new())
            .with_env(env())
            .given_state(awaiting())
            .when_action(PaymentAction::SubmitProof)
            .then_state(|s| {
                assert_eq!(s.step, Step::AwaitingPayment);
                assert!(!s.submitting);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_upload_is_last_write_wins() {
        ReducerTest::new(PaymentWizard::new())
            .with_env(env())
            .given_state(awaiting())
            .when_actions([
                PaymentAction::ProofUploaded { url: "https://cdn/image?_id=1".to_string() },
                PaymentAction::ProofUploaded { url: "https://cdn/image?_id=2".to_string() },
            ])
            .then_state(|s| {
                assert_eq!(s.proof_url.as_deref(), Some("https://cdn/image?_id=2"));
                assert!(s.can_submit_proof());
            })
            .run();
    }

    #[test]
    fn test_upload_failure_is_inline() {
        let mut state = awaiting();
        state.uploading = true;

        ReducerTest::new(PaymentWizard::new())
            .with_env(env())
            .given_state(state)
            .when_action(PaymentAction::ProofUploadFailed { error: UploadError::EmptyFile })
            .then_state(|s| {
                assert!(!s.uploading);
                assert_eq!(s.upload_error.as_deref(), Some("File bukti pembayaran kosong"));
                assert_eq!(s.notification, None);
            })
            .run();
    }

    #[test]
    fn test_upload_failure_after_leaving_step_is_dropped() {
        let mut state = awaiting();
        state.uploading = true;

        ReducerTest::new(PaymentWizard::new())
            .with_env(env())
            .given_state(state)
            .when_actions([
                PaymentAction::ChangeMethod,
                PaymentAction::ProofUploadFailed { error: UploadError::EmptyFile },
            ])
            .then_state(|s| {
                assert_eq!(s.step, Step::SelectMethod);
                assert!(!s.uploading);
                assert_eq!(s.upload_error, None);
            })
            .run();
    }

    #[test]
    fn test_reload_waits_for_payment_creation() {
        ReducerTest::new(PaymentWizard::new())
            .with_env(env())
            .given_state(awaiting())
            .when_actions([
                PaymentAction::ChangeMethod,
                PaymentAction::SelectMethod {
                    method_id: PaymentMethodId::new("gopay"),
                },
                PaymentAction::Continue,
                PaymentAction::Load,
            ])
            .then_state(|s| {
                assert!(s.submitting);
                assert!(!s.loading);
                assert_eq!(s.step, Step::SelectMethod);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_created_record_replaces_reloaded_one() {
        let mut state = awaiting();
        state.step = Step::SelectMethod;
        state.submitting = true;

        ReducerTest::new(PaymentWizard::new())
            .with_env(env())
            .given_state(state)
            .when_actions([
                PaymentAction::Loaded {
                    booking: booking(),
                    methods: sample_methods(),
                    payments: vec![record("pay-1", PaymentStatus::Pending)],
                },
                PaymentAction::PaymentCreated {
                    record: record("pay-3", PaymentStatus::Pending),
                },
            ])
            .then_state(|s| {
                assert_eq!(s.step, Step::AwaitingPayment);
                assert!(!s.submitting);
                assert_eq!(s.current.as_ref().unwrap().id, PaymentId::new("pay-3"));
            })
            .run();
    }

    #[test]
    fn test_continue_waits_for_load() {
        let mut state = loaded(vec![]);
        state.loading = true;
        state.selected_method = Some(PaymentMethodId::new("bca"));

        ReducerTest::new(PaymentWizard::new())
            .with_env(env())
            .given_state(state)
            .when_action(PaymentAction::Continue)
            .then_state(|s| assert!(!s.submitting))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_change_method_keeps_current_record() {
        ReducerTest::new(PaymentWizard::new())
            .with_env(env())
            .given_state(awaiting())
            .when_action(PaymentAction::ChangeMethod)
            .then_state(|s| {
                assert_eq!(s.step, Step::SelectMethod);
                assert!(s.current.is_some());
            })
            .run();
    }

    #[test]
    fn test_confirmation_finishes_and_refreshes() {
        let mut state = awaiting();
        state.submitting = true;

        ReducerTest::new(PaymentWizard::new())
            .with_env(env())
            .given_state(state)
            .when_action(PaymentAction::PaymentConfirmed)
            .then_state(|s| assert_eq!(s.step, Step::Done))
            .then_effects(assertions::assert_has_future_effect)
            .run();
    }

    #[test]
    fn test_refresh_never_leaves_done() {
        let mut state = awaiting();
        state.step = Step::Done;

        ReducerTest::new(PaymentWizard::new())
            .with_env(env())
            .given_state(state)
            .when_actions([
                PaymentAction::PaymentsRefreshed { payments: vec![record("pay-1", PaymentStatus::Paid)] },
                PaymentAction::ChangeMethod,
            ])
            .then_state(|s| {
                assert_eq!(s.step, Step::Done);
                assert!(s.current.as_ref().unwrap().is_paid());
            })
            .run();
    }
}
