//! In-memory collaborators for tests and the demo binary.
//!
//! [`MockBookingBackend`] implements both gateways over shared state, so a
//! clone handed to a wizard and the clone kept by a test see the same
//! bookings and payments. Failures are scripted with `reject_next_*` and
//! [`MockBookingBackend::fail_next_calls`].

use crate::error::{ServiceError, UploadError};
use crate::form::BookingSubmission;
use crate::gateway::{
    BookingGateway, ConfirmPaymentRequest, CreatePaymentRequest, PaymentGateway, ProofUploader, ServiceFuture,
};
use crate::types::{
    BookingId, BookingRecord, Money, PaymentAvailable, PaymentId, PaymentMethod, PaymentMethodId, PaymentRecord, PaymentStatus,
    ProofFile,
};
use std::collections::HashMap;
use std::future::{Future, ready};
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Methods offered by a fresh [`MockBookingBackend`]
#[must_use]
pub fn sample_methods() -> Vec<PaymentMethod> {
    let method = |id: &str, name: &str, kind: &str, account: &str| PaymentMethod {
        id: PaymentMethodId::new(id),
        name: name.to_string(),
        kind: kind.to_string(),
        account_number: account.to_string(),
        account_name: "PT Desa Wisata Nusantara".to_string(),
        image: None,
        description: None,
    };

    vec![
        method("bca", "BCA", "bank_transfer", "1234567890"),
        method("mandiri", "Mandiri", "bank_transfer", "1370012345678"),
        method("gopay", "GoPay", "e_wallet", "081234567890"),
    ]
}

#[derive(Default)]
struct BackendState {
    bookings: HashMap<BookingId, BookingRecord>,
    methods: Vec<PaymentMethod>,
    payments: Vec<(BookingId, PaymentRecord)>,
    proofs: HashMap<PaymentId, String>,
    offline_calls: u32,
    reject_submission: Option<String>,
    reject_create: Option<String>,
    reject_confirm: Option<String>,
    submit_calls: usize,
    create_calls: usize,
    confirm_calls: usize,
    sequence: u64,
}

impl BackendState {
    fn next_id(&mut self, prefix: &str) -> String {
        self.sequence += 1;
        format!("{prefix}-{}", self.sequence)
    }

    /// Consumes one scripted connection failure, if any is left
    fn offline(&mut self) -> Result<(), ServiceError> {
        if self.offline_calls > 0 {
            self.offline_calls -= 1;
            return Err(ServiceError::Network("connection refused (mock)".to_string()));
        }
        Ok(())
    }

    fn submit(&mut self, submission: BookingSubmission) -> Result<BookingRecord, ServiceError> {
        self.submit_calls += 1;
        self.offline()?;
        if let Some(message) = self.reject_submission.take() {
            return Err(ServiceError::Rejected(message));
        }

        let record = BookingRecord {
            id: BookingId::new(uuid::Uuid::new_v4().to_string()),
            tour_slug: submission.tour_slug,
            start_date: Some(submission.start_date),
            end_date: Some(submission.end_date),
            adults: submission.draft.adults,
            children: submission.draft.children,
            total_price: submission.total_price,
        };
        self.bookings.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn booking(&mut self, id: &BookingId) -> Result<BookingRecord, ServiceError> {
        self.offline()?;
        self.bookings
            .get(id)
            .cloned()
            .ok_or_else(|| ServiceError::Rejected("Booking tidak ditemukan".to_string()))
    }

    fn create(&mut self, request: CreatePaymentRequest) -> Result<PaymentRecord, ServiceError> {
        self.create_calls += 1;
        self.offline()?;
        if let Some(message) = self.reject_create.take() {
            return Err(ServiceError::Rejected(message));
        }
        if !self.bookings.contains_key(&request.booking_id) {
            return Err(ServiceError::Rejected("Booking tidak ditemukan".to_string()));
        }
        let Some(method) = self.methods.iter().find(|m| m.id == request.payment_available_id) else {
            return Err(ServiceError::Rejected("Metode tidak valid".to_string()));
        };
        let available = method.to_available();

        let already_paid = self
            .payments
            .iter()
            .any(|(booking, record)| *booking == request.booking_id && record.is_paid());
        if already_paid {
            return Err(ServiceError::Rejected("Booking sudah dibayar".to_string()));
        }
        for (_, record) in self.payments.iter_mut().filter(|(booking, _)| *booking == request.booking_id) {
            if record.is_pending() {
                record.status = PaymentStatus::Cancelled;
            }
        }

        let id = PaymentId::new(self.next_id("pay"));
        let reference_code = format!("TRX-{}", &uuid::Uuid::new_v4().simple().to_string()[..8]).to_uppercase();
        let record = PaymentRecord {
            id,
            reference_code,
            amount: request.amount,
            status: PaymentStatus::Pending,
            payment_available: available,
        };
        self.payments.push((request.booking_id, record.clone()));
        Ok(record)
    }

    fn confirm(&mut self, request: ConfirmPaymentRequest) -> Result<(), ServiceError> {
        self.confirm_calls += 1;
        self.offline()?;
        if let Some(message) = self.reject_confirm.take() {
            return Err(ServiceError::Rejected(message));
        }

        let Some((_, record)) = self.payments.iter_mut().find(|(_, r)| r.id == request.payment_id) else {
            return Err(ServiceError::Rejected("Pembayaran tidak ditemukan".to_string()));
        };
        if !record.is_pending() {
            return Err(ServiceError::Rejected("Pembayaran tidak dapat dikonfirmasi".to_string()));
        }
        record.status = PaymentStatus::Paid;
        self.proofs.insert(request.payment_id, request.proof_of_payment);
        Ok(())
    }

    fn payments_of(&self, booking_id: &BookingId) -> Vec<PaymentRecord> {
        self.payments
            .iter()
            .filter(|(booking, _)| booking == booking_id)
            .map(|(_, record)| record.clone())
            .collect()
    }
}

/// In-memory booking backend
#[derive(Clone)]
pub struct MockBookingBackend {
    state: Arc<Mutex<BackendState>>,
}

impl MockBookingBackend {
    /// Creates a backend offering [`sample_methods`]
    #[must_use]
    pub fn new() -> Self {
        Self::with_methods(sample_methods())
    }

    /// Creates a backend offering `methods`
    #[must_use]
    pub fn with_methods(methods: Vec<PaymentMethod>) -> Self {
        Self {
            state: Arc::new(Mutex::new(BackendState {
                methods,
                ..BackendState::default()
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BackendState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stores a booking directly, as if it had been submitted earlier
    pub fn seed_booking(&self, tour_slug: &str, total_price: Money) -> BookingRecord {
        let mut state = self.lock();
        let record = BookingRecord {
            id: BookingId::new(state.next_id("booking")),
            tour_slug: tour_slug.to_string(),
            start_date: None,
            end_date: None,
            adults: 1,
            children: 0,
            total_price,
        };
        state.bookings.insert(record.id.clone(), record.clone());
        record
    }

    /// Stores a payment record for `booking_id` with the first method
    pub fn seed_payment(&self, booking_id: &BookingId, status: PaymentStatus) -> PaymentRecord {
        let mut state = self.lock();
        let available = state
            .methods
            .first()
            .map_or_else(fallback_available, PaymentMethod::to_available);
        let amount = state.bookings.get(booking_id).map_or(Money::ZERO, |b| b.total_price);
        let record = PaymentRecord {
            id: PaymentId::new(state.next_id("pay")),
            reference_code: format!("TRX-SEED{}", state.sequence),
            amount,
            status,
            payment_available: available,
        };
        state.payments.push((booking_id.clone(), record.clone()));
        record
    }

    /// Makes the next `count` calls fail as if the backend were unreachable
    pub fn fail_next_calls(&self, count: u32) {
        self.lock().offline_calls = count;
    }

    /// Makes the next booking submission fail with `message`
    pub fn reject_next_submission(&self, message: &str) {
        self.lock().reject_submission = Some(message.to_string());
    }

    /// Makes the next payment creation fail with `message`
    pub fn reject_next_create(&self, message: &str) {
        self.lock().reject_create = Some(message.to_string());
    }

    /// Makes the next payment confirmation fail with `message`
    pub fn reject_next_confirm(&self, message: &str) {
        self.lock().reject_confirm = Some(message.to_string());
    }

    /// Booking submissions received
    #[must_use]
    pub fn submit_calls(&self) -> usize {
        self.lock().submit_calls
    }

    /// Payment creations received
    #[must_use]
    pub fn create_calls(&self) -> usize {
        self.lock().create_calls
    }

    /// Payment confirmations received
    #[must_use]
    pub fn confirm_calls(&self) -> usize {
        self.lock().confirm_calls
    }

    /// Stored bookings
    #[must_use]
    pub fn bookings(&self) -> Vec<BookingRecord> {
        self.lock().bookings.values().cloned().collect()
    }

    /// Payment records of a booking
    #[must_use]
    pub fn payments_for(&self, booking_id: &BookingId) -> Vec<PaymentRecord> {
        self.lock().payments_of(booking_id)
    }

    /// Proof URL attached to a payment
    #[must_use]
    pub fn proof_for(&self, payment_id: &PaymentId) -> Option<String> {
        self.lock().proofs.get(payment_id).cloned()
    }
}

/// Destination used when a backend was built without any method
fn fallback_available() -> PaymentAvailable {
    PaymentAvailable {
        name: "Transfer".to_string(),
        kind: "bank_transfer".to_string(),
        account_number: String::new(),
        account_name: String::new(),
        image: None,
    }
}

impl Default for MockBookingBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl BookingGateway for MockBookingBackend {
    fn submit_booking(&self, submission: BookingSubmission) -> ServiceFuture<BookingRecord> {
        let result = self.lock().submit(submission);
        Box::pin(ready(result))
    }

    fn get_booking(&self, id: BookingId) -> ServiceFuture<BookingRecord> {
        let result = self.lock().booking(&id);
        Box::pin(ready(result))
    }
}

impl PaymentGateway for MockBookingBackend {
    fn list_methods(&self) -> ServiceFuture<Vec<PaymentMethod>> {
        let mut state = self.lock();
        let result = state.offline().map(|()| state.methods.clone());
        Box::pin(ready(result))
    }

    fn list_payments(&self, booking_id: BookingId) -> ServiceFuture<Vec<PaymentRecord>> {
        let mut state = self.lock();
        let result = state.offline().map(|()| state.payments_of(&booking_id));
        Box::pin(ready(result))
    }

    fn create_payment(&self, request: CreatePaymentRequest) -> ServiceFuture<PaymentRecord> {
        let result = self.lock().create(request);
        Box::pin(ready(result))
    }

    fn confirm_payment(&self, request: ConfirmPaymentRequest) -> ServiceFuture<()> {
        let result = self.lock().confirm(request);
        Box::pin(ready(result))
    }
}

#[derive(Default)]
struct UploaderState {
    uploads: Vec<ProofFile>,
    reject_next: Option<String>,
}

/// In-memory proof uploader returning `https://mock.local/api/image?_id=<n>`
#[derive(Clone, Default)]
pub struct MockProofUploader {
    state: Arc<Mutex<UploaderState>>,
}

impl MockProofUploader {
    /// Creates an uploader with no stored files
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, UploaderState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Makes the next upload fail with `message`
    pub fn reject_next(&self, message: &str) {
        self.lock().reject_next = Some(message.to_string());
    }

    /// Number of stored files
    #[must_use]
    pub fn upload_count(&self) -> usize {
        self.lock().uploads.len()
    }
}

impl ProofUploader for MockProofUploader {
    fn upload(&self, file: ProofFile) -> Pin<Box<dyn Future<Output = Result<String, UploadError>> + Send>> {
        let mut state = self.lock();
        let result = if file.bytes.is_empty() {
            Err(UploadError::EmptyFile)
        } else if let Some(message) = state.reject_next.take() {
            Err(ServiceError::Rejected(message).into())
        } else {
            state.uploads.push(file);
            Ok(format!("https://mock.local/api/image?_id={}", state.uploads.len()))
        };
        Box::pin(ready(result))
    }
}
