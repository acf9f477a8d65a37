//! Booking form validation.
//!
//! [`ValidationEngine`] is the seam the booking wizard validates through;
//! [`BookingSchema`] is the built-in rule set. Validation checks every field
//! before returning so the page can show all errors at once and focus the
//! first one.

use crate::catalog::is_known_phone_code;
use crate::form::{BookingDraft, Field};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use thiserror::Error;

/// Maximum length of either name field, in characters
pub const MAX_NAME_CHARS: usize = 50;

/// Maximum length of the comments field, in characters
pub const MAX_COMMENT_CHARS: usize = 500;

/// Allowed phone number length, in digits
pub const PHONE_DIGITS: std::ops::RangeInclusive<usize> = 6..=15;

/// Per-field error messages
///
/// Iteration follows document order, so [`ValidationErrors::first`] is the
/// field the page should focus.
#[derive(Clone, Debug, Default, PartialEq, Eq, Error)]
#[error("{} field(s) failed validation", .0.len())]
pub struct ValidationErrors(BTreeMap<Field, String>);

impl ValidationErrors {
    /// An empty set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a message for `field`, replacing any previous one
    pub fn insert(&mut self, field: Field, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    /// Drops the message for `field`
    pub fn remove(&mut self, field: Field) -> Option<String> {
        self.0.remove(&field)
    }

    /// Message for `field`, if it is invalid
    #[must_use]
    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    /// Whether `field` is marked invalid
    #[must_use]
    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    /// First invalid field in document order
    #[must_use]
    pub fn first(&self) -> Option<Field> {
        self.0.keys().next().copied()
    }

    /// Number of invalid fields
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no field is marked invalid
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `(field, message)` pairs in document order
    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }
}

/// Facts the rules need that are not part of the form
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ValidationContext {
    /// Whether the page was opened with a tour slug
    pub has_tour: bool,
    /// Today's date, for birth date checks
    pub today: NaiveDate,
}

/// Schema validation of the booking form
///
/// Implementations are pure: no I/O, same answer for the same input.
pub trait ValidationEngine: Send + Sync {
    /// Checks every field of `draft`.
    ///
    /// # Errors
    ///
    /// Returns every failing field with its message.
    fn validate(&self, draft: &BookingDraft, context: &ValidationContext) -> Result<(), ValidationErrors>;
}

/// The site's booking form rules
#[derive(Clone, Copy, Debug, Default)]
pub struct BookingSchema;

impl BookingSchema {
    /// Creates the schema
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ValidationEngine for BookingSchema {
    fn validate(&self, draft: &BookingDraft, context: &ValidationContext) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        check_name(&mut errors, Field::FirstName, &draft.first_name, "Nama depan");
        check_name(&mut errors, Field::LastName, &draft.last_name, "Nama belakang");

        if draft.gender.is_none() {
            errors.insert(Field::Gender, "Jenis kelamin wajib dipilih");
        }

        check_birth_date(&mut errors, draft, context.today);

        if draft.nationality.trim().is_empty() {
            errors.insert(Field::Nationality, "Kewarganegaraan wajib diisi");
        }

        let email = draft.email.trim();
        if email.is_empty() {
            errors.insert(Field::Email, "Email wajib diisi");
        } else if !is_valid_email(email) {
            errors.insert(Field::Email, "Format email tidak valid");
        }

        if draft.phone_code.trim().is_empty() {
            errors.insert(Field::PhoneCode, "Kode telepon wajib dipilih");
        } else if !is_known_phone_code(draft.phone_code.trim()) {
            errors.insert(Field::PhoneCode, "Kode telepon tidak dikenal");
        }

        let phone = draft.phone_number.trim();
        if phone.is_empty() {
            errors.insert(Field::PhoneNumber, "Nomor telepon wajib diisi");
        } else if !phone.chars().all(|c| c.is_ascii_digit()) || !PHONE_DIGITS.contains(&phone.len()) {
            errors.insert(Field::PhoneNumber, "Nomor telepon harus 6-15 digit angka");
        }

        if draft.adults < 1 {
            errors.insert(Field::Adults, "Minimal 1 orang dewasa");
        }

        if context.has_tour && draft.find_us.is_none() {
            errors.insert(Field::FindUs, "Pilih dari mana Anda mengetahui kami");
        }

        if draft.comments.chars().count() > MAX_COMMENT_CHARS {
            errors.insert(Field::Comments, "Komentar maksimal 500 karakter");
        }

        if !draft.accept_terms {
            errors.insert(Field::AcceptTerms, "Anda harus menyetujui syarat dan ketentuan");
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

fn check_name(errors: &mut ValidationErrors, field: Field, value: &str, label: &str) {
    let value = value.trim();
    if value.is_empty() {
        errors.insert(field, format!("{label} wajib diisi"));
    } else if value.chars().count() > MAX_NAME_CHARS {
        errors.insert(field, format!("{label} maksimal {MAX_NAME_CHARS} karakter"));
    }
}

/// Flags the first missing birth date part, or the year when the parts do not
/// form a real date that is not in the future.
fn check_birth_date(errors: &mut ValidationErrors, draft: &BookingDraft, today: NaiveDate) {
    let (Some(year), Some(month), Some(day)) = (draft.birth_year, draft.birth_month, draft.birth_day) else {
        if draft.birth_year.is_none() {
            errors.insert(Field::BirthYear, "Tahun lahir wajib diisi");
        }
        if draft.birth_month.is_none() {
            errors.insert(Field::BirthMonth, "Bulan lahir wajib diisi");
        }
        if draft.birth_day.is_none() {
            errors.insert(Field::BirthDay, "Tanggal lahir wajib diisi");
        }
        return;
    };

    match NaiveDate::from_ymd_opt(year, month, day) {
        None => errors.insert(Field::BirthDay, "Tanggal lahir tidak valid"),
        Some(born) if born > today => {
            errors.insert(Field::BirthYear, "Tanggal lahir tidak boleh di masa depan");
        },
        Some(_) => {},
    }
}

/// Structural email check: one `@`, a dotted domain, conservative characters.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    if !(3..=255).contains(&email.len()) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.contains('@') || !domain.contains('.') {
        return false;
    }

    let local_ok = local
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '.' | '-' | '+' | '_'));
    let domain_ok = domain
        .split('.')
        .all(|label| !label.is_empty() && label.chars().all(|c| c.is_alphanumeric() || c == '-'));

    local_ok && domain_ok
}
