//! Error types for the booking collaborators.
//!
//! Every collaborator call fails with a [`ServiceError`]; the per-operation
//! wrappers say which call failed. The wizards turn them into notifications
//! with [`ServiceError::user_message`].

use thiserror::Error;

/// Message shown when the backend cannot be reached
pub const NETWORK_MESSAGE: &str = "Gagal terhubung";

/// Message shown when the backend answers with something unreadable
pub const INVALID_RESPONSE_MESSAGE: &str = "Respon server tidak valid";

/// Failure of a single backend call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// The request never got an answer (connection refused, reset, DNS)
    #[error("Network error: {0}")]
    Network(String),

    /// The backend answered `status: "error"` (or a bare HTTP error)
    #[error("Rejected by backend: {0}")]
    Rejected(String),

    /// The answer could not be understood
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ServiceError {
    /// Text for the visitor's notification
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(_) => NETWORK_MESSAGE.to_string(),
            Self::Rejected(message) => message.clone(),
            Self::InvalidResponse(_) => INVALID_RESPONSE_MESSAGE.to_string(),
        }
    }

    /// Whether repeating the call could succeed
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

/// Declares a wrapper naming the operation a [`ServiceError`] came from.
macro_rules! operation_error {
    ($(#[$meta:meta])* $name:ident, $operation:literal) => {
        $(#[$meta])*
        #[derive(Error, Debug, Clone, PartialEq, Eq)]
        #[error("{operation} failed: {0}", operation = $operation)]
        pub struct $name(#[from] pub ServiceError);

        impl $name {
            /// Text for the visitor's notification
            #[must_use]
            pub fn user_message(&self) -> String {
                self.0.user_message()
            }

            /// The underlying service failure
            #[must_use]
            pub const fn service(&self) -> &ServiceError {
                &self.0
            }
        }
    };
}

operation_error!(
    /// Sending the confirmed booking failed
    BookingSubmissionError,
    "Booking submission"
);

operation_error!(
    /// Loading the booking, its payments or the payment methods failed
    LoadError,
    "Loading payment data"
);

operation_error!(
    /// Creating a payment record failed
    PaymentCreationError,
    "Payment creation"
);

/// Confirming a payment failed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationError {
    /// No proof of payment was attached
    #[error("Payment confirmation needs a proof of payment")]
    MissingProof,

    /// The backend call failed
    #[error("Payment confirmation failed: {0}")]
    Service(#[from] ServiceError),
}

impl ConfirmationError {
    /// Text for the visitor's notification
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingProof => "Unggah bukti pembayaran terlebih dahulu".to_string(),
            Self::Service(error) => error.user_message(),
        }
    }
}

/// Uploading the proof of payment failed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    /// The chosen file has no content
    #[error("Proof file is empty")]
    EmptyFile,

    /// The file's content type cannot be sent
    #[error("Unsupported content type: {0}")]
    InvalidContentType(String),

    /// The upload request failed
    #[error("Upload failed: {0}")]
    Service(#[from] ServiceError),
}

impl UploadError {
    /// Text shown next to the upload control
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::EmptyFile => "File bukti pembayaran kosong".to_string(),
            Self::InvalidContentType(_) => "Format file tidak didukung".to_string(),
            Self::Service(error) => error.user_message(),
        }
    }
}
