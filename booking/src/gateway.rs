//! Collaborator traits for the booking backend.
//!
//! The wizards only see these traits; [`crate::http`] talks to the real REST
//! backend and [`crate::mocks`] keeps everything in memory.

use crate::error::{ServiceError, UploadError};
use crate::form::BookingSubmission;
use crate::types::{BookingId, BookingRecord, Money, PaymentId, PaymentMethod, PaymentMethodId, PaymentRecord, ProofFile};
use serde::Serialize;
use std::future::Future;
use std::pin::Pin;

/// Boxed future returned by every backend call
pub type ServiceFuture<T> = Pin<Box<dyn Future<Output = Result<T, ServiceError>> + Send>>;

/// Body of `POST /payments`
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentRequest {
    /// Booking being paid
    pub booking_id: BookingId,
    /// Chosen method
    pub payment_available_id: PaymentMethodId,
    /// Amount due
    pub amount: Money,
}

/// Body of `POST /payments/confirm`
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmPaymentRequest {
    /// Payment being confirmed
    pub payment_id: PaymentId,
    /// URL of the uploaded transfer proof
    pub proof_of_payment: String,
}

/// Booking endpoints
pub trait BookingGateway: Send + Sync {
    /// Stores a confirmed booking.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] if the backend is unreachable or refuses the booking.
    fn submit_booking(&self, submission: BookingSubmission) -> ServiceFuture<BookingRecord>;

    /// Reads a booking.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] if the backend is unreachable or has no such booking.
    fn get_booking(&self, id: BookingId) -> ServiceFuture<BookingRecord>;
}

/// Payment endpoints
pub trait PaymentGateway: Send + Sync {
    /// Lists the payment methods the visitor may choose.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] if the call fails.
    fn list_methods(&self) -> ServiceFuture<Vec<PaymentMethod>>;

    /// Lists the payment records of a booking.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] if the call fails.
    fn list_payments(&self, booking_id: BookingId) -> ServiceFuture<Vec<PaymentRecord>>;

    /// Creates a payment record.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] if the call fails or the backend refuses the method.
    fn create_payment(&self, request: CreatePaymentRequest) -> ServiceFuture<PaymentRecord>;

    /// Attaches a transfer proof; the backend then marks the payment paid.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] if the call fails or the backend refuses the proof.
    fn confirm_payment(&self, request: ConfirmPaymentRequest) -> ServiceFuture<()>;
}

/// Stores a proof-of-payment image and returns its public URL
pub trait ProofUploader: Send + Sync {
    /// Uploads `file`.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError`] if the file is unusable or the upload fails.
    fn upload(&self, file: ProofFile) -> Pin<Box<dyn Future<Output = Result<String, UploadError>> + Send>>;
}
