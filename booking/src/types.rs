//! Domain types for the tour booking wizard.
//!
//! Value objects exchanged with the booking backend. Wire names follow the
//! backend's camelCase JSON.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Identifiers
// ============================================================================

/// Backend identifier of a booking
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookingId(String);

impl BookingId {
    /// Wraps a backend identifier
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as sent on the wire
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Backend identifier of a payment record
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentId(String);

impl PaymentId {
    /// Wraps a backend identifier
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as sent on the wire
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PaymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Backend identifier of an available payment method (`paymentAvailableId`)
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentMethodId(String);

impl PaymentMethodId {
    /// Wraps a backend identifier
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as sent on the wire
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PaymentMethodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Money
// ============================================================================

/// An amount in whole rupiah
///
/// Arithmetic saturates instead of overflowing, so a price can never wrap
/// around to a small number.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(u64);

impl Money {
    /// Zero rupiah
    pub const ZERO: Self = Self(0);

    /// Creates an amount from whole rupiah
    #[must_use]
    pub const fn from_rupiah(rupiah: u64) -> Self {
        Self(rupiah)
    }

    /// Returns the amount in whole rupiah
    #[must_use]
    pub const fn rupiah(&self) -> u64 {
        self.0
    }

    /// Checks if the amount is zero
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Multiplies by a quantity, saturating at `u64::MAX`
    #[must_use]
    pub const fn saturating_mul(self, quantity: u64) -> Self {
        Self(self.0.saturating_mul(quantity))
    }
}

impl fmt::Display for Money {
    /// Indonesian formatting: `Rp 4.500.000`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.0.to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(c);
        }
        write!(f, "Rp {grouped}")
    }
}

// ============================================================================
// Form enumerations
// ============================================================================

/// Gender of the lead traveller
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    /// Male
    Male,
    /// Female
    Female,
}

/// Where the visitor heard about the tour
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindUs {
    /// Instagram, Facebook, `TikTok`
    SocialMedia,
    /// Google or another search engine
    SearchEngine,
    /// Recommended by friends or family
    Friend,
    /// Through a travel agent
    TravelAgent,
    /// Came back after a previous tour
    ReturningGuest,
    /// Anything else
    Other,
}

impl FindUs {
    /// Every referral source, in the order the form lists them
    pub const ALL: [Self; 6] = [
        Self::SocialMedia,
        Self::SearchEngine,
        Self::Friend,
        Self::TravelAgent,
        Self::ReturningGuest,
        Self::Other,
    ];

    /// Label shown in the referral dropdown
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::SocialMedia => "Media sosial",
            Self::SearchEngine => "Mesin pencari",
            Self::Friend => "Teman atau keluarga",
            Self::TravelAgent => "Agen perjalanan",
            Self::ReturningGuest => "Pernah ikut tur sebelumnya",
            Self::Other => "Lainnya",
        }
    }
}

// ============================================================================
// Bookings
// ============================================================================

/// A booking as stored by the backend
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRecord {
    /// Backend identifier
    pub id: BookingId,
    /// Slug of the booked tour
    pub tour_slug: String,
    /// First day of the tour
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    /// Last day of the tour
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    /// Number of adults
    pub adults: u32,
    /// Number of children
    #[serde(default)]
    pub children: u32,
    /// Amount due for the whole booking
    pub total_price: Money,
}

// ============================================================================
// Payments
// ============================================================================

/// Lifecycle of a payment record on the backend
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    /// Created, waiting for the transfer and its proof
    Pending,
    /// Confirmed by the backend
    Paid,
    /// Rejected by the backend
    Failed,
    /// Abandoned
    Cancelled,
}

/// Where the visitor transfers money, as embedded in a payment record
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentAvailable {
    /// Display name (`"BCA"`)
    pub name: String,
    /// Method family (`"bank_transfer"`, `"e_wallet"`)
    #[serde(rename = "type")]
    pub kind: String,
    /// Destination account number
    pub account_number: String,
    /// Destination account holder
    pub account_name: String,
    /// Logo URL
    #[serde(default)]
    pub image: Option<String>,
}

/// A payment request created for a booking
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    /// Backend identifier
    pub id: PaymentId,
    /// Reference the visitor quotes with the transfer
    pub reference_code: String,
    /// Amount to transfer
    pub amount: Money,
    /// Current status
    pub status: PaymentStatus,
    /// Transfer destination
    pub payment_available: PaymentAvailable,
}

impl PaymentRecord {
    /// Whether the backend has confirmed this payment
    #[must_use]
    pub fn is_paid(&self) -> bool {
        self.status == PaymentStatus::Paid
    }

    /// Whether this payment is waiting for a proof of transfer
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status == PaymentStatus::Pending
    }
}

/// A payment method the visitor can choose (`payment-available`)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethod {
    /// Backend identifier
    pub id: PaymentMethodId,
    /// Display name
    pub name: String,
    /// Method family, used to group methods on screen
    #[serde(rename = "type")]
    pub kind: String,
    /// Destination account number
    pub account_number: String,
    /// Destination account holder
    pub account_name: String,
    /// Logo URL
    #[serde(default)]
    pub image: Option<String>,
    /// Extra transfer instructions
    #[serde(default)]
    pub description: Option<String>,
}

impl PaymentMethod {
    /// The part of this method embedded in a payment record
    #[must_use]
    pub fn to_available(&self) -> PaymentAvailable {
        PaymentAvailable {
            name: self.name.clone(),
            kind: self.kind.clone(),
            account_number: self.account_number.clone(),
            account_name: self.account_name.clone(),
            image: self.image.clone(),
        }
    }
}

/// Groups methods by family, keeping the backend's order inside each group
#[must_use]
pub fn group_by_kind(methods: &[PaymentMethod]) -> Vec<(&str, Vec<&PaymentMethod>)> {
    let mut groups: Vec<(&str, Vec<&PaymentMethod>)> = Vec::new();
    for method in methods {
        match groups.iter_mut().find(|(kind, _)| *kind == method.kind) {
            Some((_, members)) => members.push(method),
            None => groups.push((&method.kind, vec![method])),
        }
    }
    groups
}

/// Image chosen as proof of transfer, before upload
#[derive(Clone, PartialEq, Eq)]
pub struct ProofFile {
    /// Original file name
    pub file_name: String,
    /// MIME type (`image/jpeg`)
    pub content_type: String,
    /// File contents
    pub bytes: Vec<u8>,
}

impl ProofFile {
    /// Creates a proof file from its parts
    #[must_use]
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }
}

impl fmt::Debug for ProofFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProofFile")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}
