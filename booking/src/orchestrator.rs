//! Payment creation and confirmation.

use crate::error::{ConfirmationError, LoadError, PaymentCreationError, ServiceError};
use crate::gateway::{ConfirmPaymentRequest, CreatePaymentRequest, PaymentGateway};
use crate::types::{BookingId, Money, PaymentId, PaymentMethod, PaymentMethodId, PaymentRecord};
use std::sync::Arc;
use tourbook_runtime::RetryPolicy;
use tourbook_runtime::retry::retry_with_predicate;

/// Creates and confirms payment records through a [`PaymentGateway`].
///
/// Calls are made once by default. With a [`RetryPolicy`] allowing more
/// attempts, connection failures are retried with backoff; backend
/// rejections never are.
#[derive(Clone)]
pub struct PaymentOrchestrator {
    gateway: Arc<dyn PaymentGateway>,
    retry: RetryPolicy,
}

impl PaymentOrchestrator {
    /// Creates an at-most-once orchestrator
    #[must_use]
    pub fn new(gateway: Arc<dyn PaymentGateway>) -> Self {
        Self {
            gateway,
            retry: RetryPolicy::at_most_once(),
        }
    }

    /// Replaces the retry policy
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// The retry policy in use
    #[must_use]
    pub const fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Creates a payment record for `booking_id` with the chosen method.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentCreationError`] if the call fails, the backend refuses
    /// the method, or the answer is not a pending record with a reference code.
    pub async fn create_payment(
        &self,
        booking_id: BookingId,
        method_id: PaymentMethodId,
        amount: Money,
    ) -> Result<PaymentRecord, PaymentCreationError> {
        let request = CreatePaymentRequest {
            booking_id,
            payment_available_id: method_id,
            amount,
        };

        let record = retry_with_predicate(
            &self.retry,
            || self.gateway.create_payment(request.clone()),
            ServiceError::is_transient,
        )
        .await?;

        if !record.is_pending() || record.reference_code.trim().is_empty() {
            tracing::warn!(payment = %record.id, status = ?record.status, "Created payment is not pending");
            return Err(ServiceError::InvalidResponse(format!(
                "payment {} created with status {:?}",
                record.id, record.status
            ))
            .into());
        }

        tracing::info!(
            booking = %request.booking_id,
            payment = %record.id,
            reference = %record.reference_code,
            amount = record.amount.rupiah(),
            "Payment created"
        );
        Ok(record)
    }

    /// Attaches the proof at `proof_url` to a payment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfirmationError::MissingProof`] for an empty URL, otherwise
    /// [`ConfirmationError::Service`] if the call fails.
    pub async fn confirm_payment(&self, payment_id: PaymentId, proof_url: String) -> Result<(), ConfirmationError> {
        if proof_url.trim().is_empty() {
            return Err(ConfirmationError::MissingProof);
        }

        let request = ConfirmPaymentRequest {
            payment_id,
            proof_of_payment: proof_url,
        };

        retry_with_predicate(
            &self.retry,
            || self.gateway.confirm_payment(request.clone()),
            ServiceError::is_transient,
        )
        .await?;

        tracing::info!(payment = %request.payment_id, "Payment confirmed");
        Ok(())
    }

    /// Payment methods on offer.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] if the call fails.
    pub async fn list_methods(&self) -> Result<Vec<PaymentMethod>, LoadError> {
        Ok(retry_with_predicate(&self.retry, || self.gateway.list_methods(), ServiceError::is_transient).await?)
    }

    /// Current payment records of a booking.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] if the call fails.
    pub async fn list_payments(&self, booking_id: BookingId) -> Result<Vec<PaymentRecord>, LoadError> {
        Ok(retry_with_predicate(
            &self.retry,
            || self.gateway.list_payments(booking_id.clone()),
            ServiceError::is_transient,
        )
        .await?)
    }
}

impl std::fmt::Debug for PaymentOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentOrchestrator")
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::mocks::MockBookingBackend;
    use std::time::Duration;

    fn orchestrator(backend: &MockBookingBackend) -> PaymentOrchestrator {
        PaymentOrchestrator::new(Arc::new(backend.clone()))
    }

    #[tokio::test]
    async fn test_create_returns_pending_record() {
        let backend = MockBookingBackend::new();
        let booking = backend.seed_booking("pesona-desa-wisata-penglipuran", Money::from_rupiah(4_500_000));

        let record = orchestrator(&backend)
            .create_payment(booking.id, PaymentMethodId::new("bca"), booking.total_price)
            .await
            .unwrap();

        assert!(record.is_pending());
        assert!(!record.reference_code.is_empty());
        assert_eq!(record.payment_available.name, "BCA");
    }

    #[tokio::test]
    async fn test_rejection_is_not_retried() {
        let backend = MockBookingBackend::new();
        let booking = backend.seed_booking("jelajah-nusa-penida", Money::from_rupiah(100));
        backend.reject_next_create("Metode tidak valid");

        let retrying = orchestrator(&backend).with_retry(
            RetryPolicy::builder()
                .max_attempts(3)
                .initial_delay(Duration::from_millis(1))
                .build(),
        );
        let error = retrying
            .create_payment(booking.id, PaymentMethodId::new("bca"), booking.total_price)
            .await
            .unwrap_err();

        assert_eq!(error.user_message(), "Metode tidak valid");
        assert_eq!(backend.create_calls(), 1);
    }

    #[tokio::test]
    async fn test_network_failure_is_retried_when_allowed() {
        let backend = MockBookingBackend::new();
        let booking = backend.seed_booking("jelajah-nusa-penida", Money::from_rupiah(100));
        backend.fail_next_calls(1);

        let retrying = orchestrator(&backend).with_retry(
            RetryPolicy::builder()
                .max_attempts(2)
                .initial_delay(Duration::from_millis(1))
                .build(),
        );
        let record = retrying
            .create_payment(booking.id, PaymentMethodId::new("bca"), booking.total_price)
            .await
            .unwrap();

        assert!(record.is_pending());
        assert_eq!(backend.create_calls(), 2);
    }

    #[tokio::test]
    async fn test_network_failure_is_reported_once_by_default() {
        let backend = MockBookingBackend::new();
        let booking = backend.seed_booking("jelajah-nusa-penida", Money::from_rupiah(100));
        backend.fail_next_calls(1);

        let error = orchestrator(&backend)
            .create_payment(booking.id, PaymentMethodId::new("bca"), booking.total_price)
            .await
            .unwrap_err();

        assert_eq!(error.user_message(), "Gagal terhubung");
        assert_eq!(backend.create_calls(), 1);
    }

    #[tokio::test]
    async fn test_confirm_requires_proof() {
        let backend = MockBookingBackend::new();

        let error = orchestrator(&backend)
            .confirm_payment(PaymentId::new("pay-1"), "  ".to_string())
            .await
            .unwrap_err();

        assert_eq!(error, ConfirmationError::MissingProof);
        assert_eq!(backend.confirm_calls(), 0);
    }

    #[tokio::test]
    async fn test_confirm_marks_payment_paid() {
        let backend = MockBookingBackend::new();
        let booking = backend.seed_booking("jelajah-nusa-penida", Money::from_rupiah(100));
        let orchestrator = orchestrator(&backend);

        let record = orchestrator
            .create_payment(booking.id.clone(), PaymentMethodId::new("bca"), booking.total_price)
            .await
            .unwrap();
        orchestrator
            .confirm_payment(record.id, "https://mock.local/api/image?_id=1".to_string())
            .await
            .unwrap();

        let payments = orchestrator.list_payments(booking.id).await.unwrap();
        assert_eq!(payments.len(), 1);
        assert!(payments[0].is_paid());
    }
}
