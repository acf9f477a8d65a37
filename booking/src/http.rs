//! REST client for the booking backend.
//!
//! Every endpoint answers with the envelope
//! `{ "status": "success" | "error", "data"?: T, "message"?: string }`.

use crate::error::ServiceError;
use crate::form::BookingSubmission;
use crate::gateway::{BookingGateway, ConfirmPaymentRequest, CreatePaymentRequest, PaymentGateway, ServiceFuture};
use crate::types::{BookingId, BookingRecord, PaymentMethod, PaymentRecord};
use reqwest::{Client, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;

/// Message used when the backend refuses without saying why
const DEFAULT_REJECTION: &str = "Permintaan ditolak";

/// Outcome flag of an envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeStatus {
    /// The call succeeded
    Success,
    /// The backend refused the call
    Error,
}

/// Response wrapper used by every endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    /// Outcome
    pub status: EnvelopeStatus,
    /// Payload, present on most successes
    pub data: Option<T>,
    /// Explanation, present on errors
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    /// Splits the envelope into its payload or the backend's refusal.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Rejected`] with the backend message when
    /// `status` is `"error"`.
    pub fn into_data(self) -> Result<Option<T>, ServiceError> {
        match self.status {
            EnvelopeStatus::Success => Ok(self.data),
            EnvelopeStatus::Error => Err(ServiceError::Rejected(
                self.message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_REJECTION.to_string()),
            )),
        }
    }
}

/// Booking and payment endpoints over HTTP
#[derive(Clone, Debug)]
pub struct HttpBackend {
    client: Client,
    api_url: String,
}

impl HttpBackend {
    /// Creates a backend client for `api_url` (e.g. `http://localhost:3000/api`)
    #[must_use]
    pub fn new(api_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), api_url)
    }

    /// Creates a backend client sharing an existing connection pool
    #[must_use]
    pub fn with_client(client: Client, api_url: impl Into<String>) -> Self {
        Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.api_url)
    }

    #[tracing::instrument(skip(self, submission), fields(tour = %submission.tour_slug))]
    async fn post_booking(self, submission: BookingSubmission) -> Result<BookingRecord, ServiceError> {
        let response = self
            .client
            .post(self.url("bookings"))
            .json(&submission)
            .send()
            .await
            .map_err(network)?;
        require(read_envelope(response).await?)
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_booking(self, id: BookingId) -> Result<BookingRecord, ServiceError> {
        let response = self
            .client
            .get(self.url(&format!("bookings/{id}")))
            .send()
            .await
            .map_err(network)?;
        require(read_envelope(response).await?)
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_methods(self) -> Result<Vec<PaymentMethod>, ServiceError> {
        let response = self
            .client
            .get(self.url("payment-available"))
            .send()
            .await
            .map_err(network)?;
        Ok(read_envelope(response).await?.unwrap_or_default())
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_payments(self, booking_id: BookingId) -> Result<Vec<PaymentRecord>, ServiceError> {
        let response = self
            .client
            .get(self.url("payments"))
            .query(&[("bookingId", booking_id.as_str())])
            .send()
            .await
            .map_err(network)?;
        Ok(read_envelope(response).await?.unwrap_or_default())
    }

    #[tracing::instrument(skip(self), fields(booking = %request.booking_id))]
    async fn post_payment(self, request: CreatePaymentRequest) -> Result<PaymentRecord, ServiceError> {
        let response = self
            .client
            .post(self.url("payments"))
            .json(&request)
            .send()
            .await
            .map_err(network)?;
        require(read_envelope(response).await?)
    }

    #[tracing::instrument(skip(self), fields(payment = %request.payment_id))]
    async fn post_confirmation(self, request: ConfirmPaymentRequest) -> Result<(), ServiceError> {
        let response = self
            .client
            .post(self.url("payments/confirm"))
            .json(&request)
            .send()
            .await
            .map_err(network)?;
        read_envelope::<serde_json::Value>(response).await?;
        Ok(())
    }
}

impl BookingGateway for HttpBackend {
    fn submit_booking(&self, submission: BookingSubmission) -> ServiceFuture<BookingRecord> {
        Box::pin(self.clone().post_booking(submission))
    }

    fn get_booking(&self, id: BookingId) -> ServiceFuture<BookingRecord> {
        Box::pin(self.clone().fetch_booking(id))
    }
}

impl PaymentGateway for HttpBackend {
    fn list_methods(&self) -> ServiceFuture<Vec<PaymentMethod>> {
        Box::pin(self.clone().fetch_methods())
    }

    fn list_payments(&self, booking_id: BookingId) -> ServiceFuture<Vec<PaymentRecord>> {
        Box::pin(self.clone().fetch_payments(booking_id))
    }

    fn create_payment(&self, request: CreatePaymentRequest) -> ServiceFuture<PaymentRecord> {
        Box::pin(self.clone().post_payment(request))
    }

    fn confirm_payment(&self, request: ConfirmPaymentRequest) -> ServiceFuture<()> {
        Box::pin(self.clone().post_confirmation(request))
    }
}

#[allow(clippy::needless_pass_by_value)] // used as a map_err callback
pub(crate) fn network(error: reqwest::Error) -> ServiceError {
    tracing::warn!(%error, "Backend unreachable");
    ServiceError::Network(error.to_string())
}

/// Reads an envelope, whatever the HTTP status.
///
/// A body that is not an envelope is a rejection when the status is an
/// error and an invalid response otherwise.
pub(crate) async fn read_envelope<T: DeserializeOwned>(response: Response) -> Result<Option<T>, ServiceError> {
    let status = response.status();
    let body = response.text().await.map_err(network)?;

    match serde_json::from_str::<Envelope<T>>(&body) {
        Ok(envelope) => envelope.into_data().inspect_err(|error| {
            tracing::warn!(status = status.as_u16(), %error, "Backend refused request");
        }),
        Err(_) if !status.is_success() => {
            tracing::warn!(status = status.as_u16(), "Backend error without envelope");
            Err(ServiceError::Rejected(format!("HTTP {}", status.as_u16())))
        },
        Err(error) => Err(ServiceError::InvalidResponse(error.to_string())),
    }
}

pub(crate) fn require<T>(data: Option<T>) -> Result<T, ServiceError> {
    data.ok_or_else(|| ServiceError::InvalidResponse("response has no data".to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_error_envelope_becomes_rejection() {
        let envelope: Envelope<PaymentRecord> =
            serde_json::from_str(r#"{"status":"error","message":"Metode tidak valid"}"#).unwrap();
        assert_eq!(
            envelope.into_data(),
            Err(ServiceError::Rejected("Metode tidak valid".to_string()))
        );
    }

    #[test]
    fn test_error_envelope_without_message() {
        let envelope: Envelope<()> = serde_json::from_str(r#"{"status":"error"}"#).unwrap();
        assert_eq!(
            envelope.into_data(),
            Err(ServiceError::Rejected(DEFAULT_REJECTION.to_string()))
        );
    }

    #[test]
    fn test_success_envelope_without_data() {
        let envelope: Envelope<serde_json::Value> =
            serde_json::from_str(r#"{"status":"success"}"#).unwrap();
        assert_eq!(envelope.into_data(), Ok(None));
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let backend = HttpBackend::new("http://localhost:3000/api/");
        assert_eq!(backend.url("bookings"), "http://localhost:3000/api/bookings");
    }
}
