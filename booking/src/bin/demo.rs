//! Booking Wizard Demo
//!
//! Walks one visitor through the whole flow:
//! - tour selection from the URL query
//! - booking form, validation and confirmation
//! - payment method choice and payment creation
//! - proof upload and payment confirmation
//!
//! # Usage
//!
//! ```bash
//! # In-memory collaborators (default)
//! cargo run --bin booking-demo
//!
//! # Against a running backend
//! BOOKING_BACKEND=http BOOKING_API_URL=http://localhost:3000/api cargo run --bin booking-demo
//! ```

use anyhow::{Context, bail};
use std::sync::Arc;
use std::time::Duration;
use tourbook::config::{Backend, Config};
use tourbook::gateway::{BookingGateway, PaymentGateway, ProofUploader};
use tourbook::http::HttpBackend;
use tourbook::mocks::{MockBookingBackend, MockProofUploader};
use tourbook::types::{FindUs, Gender, ProofFile};
use tourbook::upload::HttpProofUploader;
use tourbook::wizard::{
    BookingAction, BookingEnvironment, BookingWizard, BookingWizardState, PaymentAction, PaymentEnvironment,
    PaymentWizard, PaymentWizardState,
};
use tourbook::{BookingSchema, FieldEdit, PaymentOrchestrator, Step, TourSelection};
use tourbook_core::environment::SystemClock;
use tourbook_runtime::Store;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const QUERY: &str = "?slug=pesona-desa-wisata-penglipuran&start=2025-08-17&end=2025-08-17";
const WAIT: Duration = Duration::from_secs(30);

struct Collaborators {
    bookings: Arc<dyn BookingGateway>,
    payments: Arc<dyn PaymentGateway>,
    uploader: Arc<dyn ProofUploader>,
}

fn collaborators(config: &Config) -> Collaborators {
    match config.backend {
        Backend::Mock => {
            let backend = MockBookingBackend::new();
            Collaborators {
                bookings: Arc::new(backend.clone()),
                payments: Arc::new(backend),
                uploader: Arc::new(MockProofUploader::new()),
            }
        },
        Backend::Http => {
            let client = reqwest::Client::new();
            let backend = HttpBackend::with_client(client.clone(), config.api_url.clone());
            Collaborators {
                bookings: Arc::new(backend.clone()),
                payments: Arc::new(backend),
                uploader: Arc::new(HttpProofUploader::with_client(client, config.upload_url.clone())),
            }
        },
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tourbook=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    tracing::info!(?config, "Starting booking demo");
    let collaborators = collaborators(&config);

    // ========== Booking ==========

    let booking_store = Store::new(
        BookingWizardState::from_query(QUERY),
        BookingWizard::new(),
        BookingEnvironment::new(
            Arc::new(SystemClock),
            Arc::new(BookingSchema::new()),
            Arc::clone(&collaborators.bookings),
        ),
    );

    let (step, tour, days) = booking_store
        .state(|s| (s.step, s.tour.clone(), s.selection.as_ref().map(TourSelection::days)))
        .await;
    if step != Step::Entry {
        bail!("booking page opened without a tour (step {step})");
    }
    if let Some(tour) = tour {
        tracing::info!(title = %tour.title, price = %tour.price, ?days, "Tour selected");
    }

    for edit in [
        FieldEdit::FirstName("Ni Luh".to_string()),
        FieldEdit::LastName("Sari".to_string()),
        FieldEdit::Gender(Gender::Female),
        FieldEdit::BirthYear(1992),
        FieldEdit::BirthMonth(4),
        FieldEdit::BirthDay(21),
        FieldEdit::Nationality("Indonesia".to_string()),
        FieldEdit::Email("niluh.sari@example.com".to_string()),
        FieldEdit::PhoneNumber("81237654321".to_string()),
        FieldEdit::Adults(2),
        FieldEdit::IncrementChildren,
        FieldEdit::FindUs(FindUs::SocialMedia),
        FieldEdit::AcceptTerms(true),
    ] {
        booking_store.send(BookingAction::Edit(edit)).await?;
    }

    booking_store.send(BookingAction::Submit).await?;
    let (step, errors, total) = booking_store
        .state(|s| (s.step, s.errors.clone(), s.total_price()))
        .await;
    if step != Step::Confirm {
        for (field, message) in errors.iter() {
            tracing::error!(%field, message, "Invalid field");
        }
        bail!("booking form did not validate");
    }
    tracing::info!(%total, "Booking form valid, confirming");

    let result = booking_store
        .send_and_wait_for(
            BookingAction::Confirm,
            |a| matches!(a, BookingAction::BookingAccepted { .. } | BookingAction::BookingRejected { .. }),
            WAIT,
        )
        .await?;
    if let BookingAction::BookingRejected { error } = result {
        bail!("booking was not stored: {}", error.user_message());
    }
    let booking = booking_store
        .state(|s| s.booking.clone())
        .await
        .context("booking accepted without a record")?;

    // ========== Payment ==========

    let orchestrator = PaymentOrchestrator::new(Arc::clone(&collaborators.payments)).with_retry(config.retry_policy());
    let payment_store = Store::new(
        PaymentWizardState::new(booking.id.clone()),
        PaymentWizard::new(),
        PaymentEnvironment::new(
            Arc::clone(&collaborators.bookings),
            orchestrator,
            Arc::clone(&collaborators.uploader),
        ),
    );

    let loaded = payment_store
        .send_and_wait_for(
            PaymentAction::Load,
            |a| matches!(a, PaymentAction::Loaded { .. } | PaymentAction::LoadFailed { .. }),
            WAIT,
        )
        .await?;
    if let PaymentAction::LoadFailed { error } = loaded {
        bail!("could not load payment data: {}", error.user_message());
    }

    let method = payment_store
        .state(|s| {
            for (kind, methods) in s.method_groups() {
                let names: Vec<&str> = methods.iter().map(|m| m.name.as_str()).collect();
                tracing::info!(kind, ?names, "Payment methods");
            }
            s.methods.first().map(|m| m.id.clone())
        })
        .await
        .context("backend offers no payment method")?;

    payment_store.send(PaymentAction::SelectMethod { method_id: method }).await?;
    let created = payment_store
        .send_and_wait_for(
            PaymentAction::Continue,
            |a| {
                matches!(
                    a,
                    PaymentAction::PaymentCreated { .. } | PaymentAction::PaymentCreationFailed { .. }
                )
            },
            WAIT,
        )
        .await?;
    match created {
        PaymentAction::PaymentCreated { record } => tracing::info!(
            reference = %record.reference_code,
            amount = %record.amount,
            bank = %record.payment_available.name,
            account = %record.payment_available.account_number,
            "Transfer the amount, then upload the proof"
        ),
        PaymentAction::PaymentCreationFailed { error } => {
            bail!("payment was not created: {}", error.user_message());
        },
        _ => {},
    }

    let proof = ProofFile::new("bukti-transfer.jpg", "image/jpeg", vec![0xFF, 0xD8, 0xFF, 0xE0]);
    let uploaded = payment_store
        .send_and_wait_for(
            PaymentAction::UploadProof { file: proof },
            |a| matches!(a, PaymentAction::ProofUploaded { .. } | PaymentAction::ProofUploadFailed { .. }),
            WAIT,
        )
        .await?;
    if let PaymentAction::ProofUploadFailed { error } = uploaded {
        bail!("proof upload failed: {}", error.user_message());
    }

    let mut handle = payment_store.send(PaymentAction::SubmitProof).await?;
    handle.wait_with_timeout(WAIT).await?;

    let (step, notification) = payment_store.state(|s| (s.step, s.notification.clone())).await;
    if step != Step::Done {
        let message = notification.map(|n| n.message).unwrap_or_default();
        bail!("payment was not confirmed: {message}");
    }

    tracing::info!(booking = %booking.id, "Booking paid");
    booking_store.shutdown(Duration::from_secs(5)).await?;
    payment_store.shutdown(Duration::from_secs(5)).await?;

    Ok(())
}
