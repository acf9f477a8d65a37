//! Booking wizard: `NO_TOUR`, `ENTRY`, `CONFIRM`, `DONE`.

use super::{Notification, ignored, transition};
use crate::catalog::{TourContext, TourSelection};
use crate::error::BookingSubmissionError;
use crate::form::{BookingDraft, BookingSubmission, Field, FieldEdit};
use crate::gateway::BookingGateway;
use crate::pricing::compute_total;
use crate::step::Step;
use crate::types::{BookingRecord, Money};
use crate::validation::{ValidationContext, ValidationEngine, ValidationErrors};
use std::sync::Arc;
use tourbook_core::environment::Clock;
use tourbook_core::{SmallVec, async_effect, effect::Effect, reducer::Reducer, smallvec};

// ============================================================================
// State
// ============================================================================

/// What the booking page shows
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BookingWizardState {
    /// Current step
    pub step: Step,
    /// Tour and dates from the URL, `None` on a bare booking page
    pub selection: Option<TourSelection>,
    /// Details of the selected tour
    pub tour: Option<TourContext>,
    /// Form values
    pub draft: BookingDraft,
    /// Errors of the last validation, minus fields edited since
    pub errors: ValidationErrors,
    /// Field to focus after a failed submit
    pub focus: Option<Field>,
    /// A booking submission is in flight
    pub submitting: bool,
    /// The stored booking, once the backend accepted it
    pub booking: Option<BookingRecord>,
    /// Message for the visitor
    pub notification: Option<Notification>,
}

impl BookingWizardState {
    /// Starts the wizard for a (possibly missing) tour selection
    #[must_use]
    pub fn new(selection: Option<TourSelection>) -> Self {
        let tour = selection.as_ref().map(|s| TourContext::resolve(&s.slug));
        Self {
            step: Step::for_booking(selection.as_ref()),
            selection,
            tour,
            draft: BookingDraft::default(),
            errors: ValidationErrors::new(),
            focus: None,
            submitting: false,
            booking: None,
            notification: None,
        }
    }

    /// Starts the wizard from the booking page's query string
    #[must_use]
    pub fn from_query(query: &str) -> Self {
        Self::new(TourSelection::from_query(query))
    }

    /// Price per person of the selected tour
    #[must_use]
    pub fn unit_price(&self) -> Money {
        self.tour.as_ref().map_or(Money::ZERO, |tour| tour.price)
    }

    /// Price of the whole booking, recomputed from the current form
    #[must_use]
    pub fn total_price(&self) -> Money {
        compute_total(self.unit_price(), self.draft.adults, self.draft.children)
    }
}

// ============================================================================
// Actions
// ============================================================================

/// Inputs of the booking wizard
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BookingAction {
    /// Change a form field
    Edit(FieldEdit),
    /// Validate the form and move to the confirmation step
    Submit,
    /// Go back from confirmation to the form
    Cancel,
    /// Send the booking to the backend
    Confirm,
    /// The backend stored the booking
    BookingAccepted {
        /// Stored booking
        record: BookingRecord,
    },
    /// The booking could not be stored
    BookingRejected {
        /// Why
        error: BookingSubmissionError,
    },
    /// Hide the notification
    DismissNotification,
}

impl BookingAction {
    const fn name(&self) -> &'static str {
        match self {
            Self::Edit(_) => "Edit",
            Self::Submit => "Submit",
            Self::Cancel => "Cancel",
            Self::Confirm => "Confirm",
            Self::BookingAccepted { .. } => "BookingAccepted",
            Self::BookingRejected { .. } => "BookingRejected",
            Self::DismissNotification => "DismissNotification",
        }
    }
}

// ============================================================================
// Environment
// ============================================================================

/// Collaborators of the booking wizard
#[derive(Clone)]
pub struct BookingEnvironment {
    /// Source of "today" for birth date checks
    pub clock: Arc<dyn Clock>,
    /// Form rules
    pub validator: Arc<dyn ValidationEngine>,
    /// Booking backend
    pub bookings: Arc<dyn BookingGateway>,
}

impl BookingEnvironment {
    /// Creates a booking environment
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock>,
        validator: Arc<dyn ValidationEngine>,
        bookings: Arc<dyn BookingGateway>,
    ) -> Self {
        Self {
            clock,
            validator,
            bookings,
        }
    }
}

// ============================================================================
// Reducer
// ============================================================================

/// Reducer of the booking wizard
#[derive(Clone, Copy, Debug, Default)]
pub struct BookingWizard;

impl BookingWizard {
    /// Creates the reducer
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn submit(state: &mut BookingWizardState, env: &BookingEnvironment) {
        let context = ValidationContext {
            has_tour: state.selection.is_some(),
            today: env.clock.now().date_naive(),
        };

        match env.validator.validate(&state.draft, &context) {
            Ok(()) => {
                state.errors = ValidationErrors::new();
                state.focus = None;
                state.step = Step::Confirm;
            },
            Err(errors) => {
                tracing::debug!(invalid = errors.len(), first = ?errors.first(), "Booking form invalid");
                state.focus = errors.first();
                state.errors = errors;
            },
        }
    }

    fn confirm(state: &mut BookingWizardState, env: &BookingEnvironment) -> SmallVec<[Effect<BookingAction>; 4]> {
        let Some(selection) = state.selection.as_ref() else {
            return SmallVec::new();
        };

        let days = selection.days();
        let submission = BookingSubmission::new(selection, state.draft.clone(), state.total_price());
        state.submitting = true;
        state.notification = None;
        tracing::info!(
            tour = %submission.tour_slug,
            days,
            total = submission.total_price.rupiah(),
            "Submitting booking"
        );

        let bookings = Arc::clone(&env.bookings);
        smallvec![async_effect! {
            match bookings.submit_booking(submission).await {
                Ok(record) => Some(BookingAction::BookingAccepted { record }),
                Err(error) => Some(BookingAction::BookingRejected { error: error.into() }),
            }
        }]
    }
}

impl Reducer for BookingWizard {
    type State = BookingWizardState;
    type Action = BookingAction;
    type Environment = BookingEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        let from = state.step;

        let effects = match (state.step, action) {
            (_, BookingAction::DismissNotification) => {
                state.notification = None;
                SmallVec::new()
            },

            (Step::Entry, BookingAction::Edit(edit)) => {
                state.errors.remove(edit.field());
                state.draft.apply(edit);
                SmallVec::new()
            },

            (Step::Entry, BookingAction::Submit) => {
                Self::submit(state, env);
                SmallVec::new()
            },

            (Step::Confirm, BookingAction::Cancel) if !state.submitting => {
                state.step = Step::Entry;
                SmallVec::new()
            },

            (Step::Confirm, BookingAction::Confirm) if !state.submitting => Self::confirm(state, env),

            (_, BookingAction::BookingAccepted { record }) => {
                state.submitting = false;
                if state.step == Step::Confirm {
                    tracing::info!(booking = %record.id, "Booking stored");
                    state.booking = Some(record);
                    state.step = Step::Done;
                    state.notification = Some(Notification::success("Pemesanan berhasil dikirim"));
                } else {
                    ignored(state.step, "BookingAccepted");
                }
                SmallVec::new()
            },

            (_, BookingAction::BookingRejected { error }) => {
                state.submitting = false;
                tracing::warn!(%error, "Booking submission failed");
                state.notification = Some(Notification::error(error.user_message()));
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
    use crate::mocks::MockBookingBackend;
    use crate::types::{FindUs, Gender};
    use crate::validation::BookingSchema;
    use tourbook_testing::{ReducerTest, assertions, test_clock};

    const QUERY: &str = "slug=pesona-desa-wisata-penglipuran&start=2025-02-01&end=2025-02-01";

    fn env() -> BookingEnvironment {
        BookingEnvironment::new(
            Arc::new(test_clock()),
            Arc::new(BookingSchema::new()),
            Arc::new(MockBookingBackend::new()),
        )
    }

    fn filled() -> BookingWizardState {
        let mut state = BookingWizardState::from_query(QUERY);
        for edit in [
            FieldEdit::FirstName("Made".to_string()),
            FieldEdit::LastName("Wirawan".to_string()),
            FieldEdit::Gender(Gender::Male),
            FieldEdit::BirthYear(1990),
            FieldEdit::BirthMonth(5),
            FieldEdit::BirthDay(2),
            FieldEdit::Nationality("Indonesia".to_string()),
            FieldEdit::Email("made@example.com".to_string()),
            FieldEdit::PhoneNumber("81337001122".to_string()),
            FieldEdit::FindUs(FindUs::Friend),
            FieldEdit::AcceptTerms(true),
        ] {
            state.draft.apply(edit);
        }
        state
    }

    #[test]
    fn test_missing_query_starts_without_tour() {
        let state = BookingWizardState::from_query("slug=pesona-desa-wisata-penglipuran");
        assert_eq!(state.step, Step::NoTour);
        assert_eq!(state.tour, None);

        ReducerTest::new(BookingWizard::new())
            .with_env(env())
            .given_state(state)
            .when_actions([BookingAction::Edit(FieldEdit::AcceptTerms(true)), BookingAction::Submit])
            .then_state(|s| {
                assert_eq!(s.step, Step::NoTour);
                assert!(!s.draft.accept_terms);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_total_follows_travellers() {
        ReducerTest::new(BookingWizard::new())
            .with_env(env())
            .given_state(BookingWizardState::from_query(QUERY))
            .when_actions([
                BookingAction::Edit(FieldEdit::Adults(2)),
                BookingAction::Edit(FieldEdit::IncrementChildren),
            ])
            .then_state(|s| assert_eq!(s.total_price(), Money::from_rupiah(4_500_000)))
            .run();
    }

    #[test]
    fn test_empty_form_stays_in_entry() {
        ReducerTest::new(BookingWizard::new())
            .with_env(env())
            .given_state(BookingWizardState::from_query(QUERY))
            .when_action(BookingAction::Submit)
            .then_state(|s| {
                assert_eq!(s.step, Step::Entry);
                assert!(!s.errors.is_empty());
                assert_eq!(s.focus, Some(Field::FirstName));
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_valid_form_moves_to_confirm() {
        ReducerTest::new(BookingWizard::new())
            .with_env(env())
            .given_state(filled())
            .when_action(BookingAction::Submit)
            .then_state(|s| {
                assert_eq!(s.step, Step::Confirm);
                assert!(s.errors.is_empty());
                assert_eq!(s.focus, None);
            })
            .run();
    }

    #[test]
    fn test_unaccepted_terms_block_confirm() {
        let mut state = filled();
        state.draft.accept_terms = false;

        ReducerTest::new(BookingWizard::new())
            .with_env(env())
            .given_state(state)
            .when_action(BookingAction::Submit)
            .then_state(|s| {
                assert_eq!(s.step, Step::Entry);
                assert_eq!(s.focus, Some(Field::AcceptTerms));
            })
            .run();
    }

    #[test]
    fn test_edit_clears_that_fields_error() {
        ReducerTest::new(BookingWizard::new())
            .with_env(env())
            .given_state(BookingWizardState::from_query(QUERY))
            .when_actions([
                BookingAction::Submit,
                BookingAction::Edit(FieldEdit::FirstName("Made".to_string())),
            ])
            .then_state(|s| {
                assert!(!s.errors.contains(Field::FirstName));
                assert!(s.errors.contains(Field::LastName));
            })
            .run();
    }

    #[test]
    fn test_cancel_returns_to_entry_with_values() {
        ReducerTest::new(BookingWizard::new())
            .with_env(env())
            .given_state(filled())
            .when_actions([BookingAction::Submit, BookingAction::Cancel])
            .then_state(|s| {
                assert_eq!(s.step, Step::Entry);
                assert_eq!(s.draft.first_name, "Made");
            })
            .run();
    }

    #[test]
    fn test_confirm_issues_one_submission() {
        ReducerTest::new(BookingWizard::new())
            .with_env(env())
            .given_state(filled())
            .when_actions([BookingAction::Submit, BookingAction::Confirm])
            .then_state(|s| {
                assert_eq!(s.step, Step::Confirm);
                assert!(s.submitting);
            })
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_has_future_effect(effects);
            })
            .run();
    }

    #[test]
    fn test_confirm_while_submitting_is_ignored() {
        let mut state = filled();
        state.step = Step::Confirm;
        state.submitting = true;

        ReducerTest::new(BookingWizard::new())
            .with_env(env())
            .given_state(state)
            .when_actions([BookingAction::Confirm, BookingAction::Cancel])
            .then_state(|s| assert_eq!(s.step, Step::Confirm))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_rejection_keeps_confirm_step() {
        let mut state = filled();
        state.step = Step::Confirm;
        state.submitting = true;
        let error = BookingSubmissionError(crate::error::ServiceError::Network("reset".to_string()));

        ReducerTest::new(BookingWizard::new())
            .with_env(env())
            .given_state(state)
            .when_action(BookingAction::BookingRejected { error })
            .then_state(|s| {
                assert_eq!(s.step, Step::Confirm);
                assert!(!s.submitting);
                let notification = s.notification.as_ref().unwrap();
                assert!(notification.is_error());
                assert_eq!(notification.message, "Gagal terhubung");
            })
            .run();
    }
}
