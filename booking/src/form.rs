//! Booking form values and the edits that change them.

use crate::catalog::TourSelection;
use crate::types::{FindUs, Gender, Money};
use serde::Serialize;
use std::fmt;

/// Identity of a form field
///
/// Variants are declared in document order, so the derived `Ord` sorts
/// fields the way the form lays them out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    /// First name
    FirstName,
    /// Last name
    LastName,
    /// Gender
    Gender,
    /// Birth year
    BirthYear,
    /// Birth month
    BirthMonth,
    /// Birth day
    BirthDay,
    /// Nationality
    Nationality,
    /// Email address
    Email,
    /// Dialing code
    PhoneCode,
    /// Phone number without dialing code
    PhoneNumber,
    /// Number of adults
    Adults,
    /// Number of children
    Children,
    /// Referral source
    FindUs,
    /// Free text comments
    Comments,
    /// Terms and conditions checkbox
    AcceptTerms,
}

impl Field {
    /// The form path of this field, as used by the page and the backend
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::FirstName => "firstName",
            Self::LastName => "lastName",
            Self::Gender => "gender",
            Self::BirthYear => "birthYear",
            Self::BirthMonth => "birthMonth",
            Self::BirthDay => "birthDay",
            Self::Nationality => "nationality",
            Self::Email => "email",
            Self::PhoneCode => "phoneCode",
            Self::PhoneNumber => "phoneNumber",
            Self::Adults => "adults",
            Self::Children => "children",
            Self::FindUs => "findUs",
            Self::Comments => "comments",
            Self::AcceptTerms => "acceptTerms",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Everything the visitor types into the booking form
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingDraft {
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Gender
    pub gender: Option<Gender>,
    /// Birth year
    pub birth_year: Option<i32>,
    /// Birth month (1-12)
    pub birth_month: Option<u32>,
    /// Birth day of month
    pub birth_day: Option<u32>,
    /// Nationality
    pub nationality: String,
    /// Email address
    pub email: String,
    /// Dialing code (`+62`)
    pub phone_code: String,
    /// Phone number without dialing code
    pub phone_number: String,
    /// Number of adults, never below 1
    pub adults: u32,
    /// Number of children
    pub children: u32,
    /// Referral source
    pub find_us: Option<FindUs>,
    /// Optional comments
    pub comments: String,
    /// Terms and conditions accepted
    pub accept_terms: bool,
}

impl Default for BookingDraft {
    fn default() -> Self {
        Self {
            first_name: String::new(),
            last_name: String::new(),
            gender: None,
            birth_year: None,
            birth_month: None,
            birth_day: None,
            nationality: String::new(),
            email: String::new(),
            phone_code: "+62".to_string(),
            phone_number: String::new(),
            adults: 1,
            children: 0,
            find_us: None,
            comments: String::new(),
            accept_terms: false,
        }
    }
}

/// A single change to the booking form
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldEdit {
    /// Set the first name
    FirstName(String),
    /// Set the last name
    LastName(String),
    /// Set the gender
    Gender(Gender),
    /// Set the birth year
    BirthYear(i32),
    /// Set the birth month
    BirthMonth(u32),
    /// Set the birth day
    BirthDay(u32),
    /// Set the nationality
    Nationality(String),
    /// Set the email address
    Email(String),
    /// Set the dialing code
    PhoneCode(String),
    /// Set the phone number
    PhoneNumber(String),
    /// Set the number of adults (raised to 1 if lower)
    Adults(u32),
    /// One more adult
    IncrementAdults,
    /// One adult less, never below 1
    DecrementAdults,
    /// Set the number of children
    Children(u32),
    /// One more child
    IncrementChildren,
    /// One child less, never below 0
    DecrementChildren,
    /// Set the referral source
    FindUs(FindUs),
    /// Set the comments
    Comments(String),
    /// Tick or untick the terms checkbox
    AcceptTerms(bool),
}

impl FieldEdit {
    /// The field this edit changes
    #[must_use]
    pub const fn field(&self) -> Field {
        match self {
            Self::FirstName(_) => Field::FirstName,
            Self::LastName(_) => Field::LastName,
            Self::Gender(_) => Field::Gender,
            Self::BirthYear(_) => Field::BirthYear,
            Self::BirthMonth(_) => Field::BirthMonth,
            Self::BirthDay(_) => Field::BirthDay,
            Self::Nationality(_) => Field::Nationality,
            Self::Email(_) => Field::Email,
            Self::PhoneCode(_) => Field::PhoneCode,
            Self::PhoneNumber(_) => Field::PhoneNumber,
            Self::Adults(_) | Self::IncrementAdults | Self::DecrementAdults => Field::Adults,
            Self::Children(_) | Self::IncrementChildren | Self::DecrementChildren => {
                Field::Children
            },
            Self::FindUs(_) => Field::FindUs,
            Self::Comments(_) => Field::Comments,
            Self::AcceptTerms(_) => Field::AcceptTerms,
        }
    }
}

impl BookingDraft {
    /// Applies an edit, keeping `adults >= 1`
    pub fn apply(&mut self, edit: FieldEdit) {
        match edit {
            FieldEdit::FirstName(value) => self.first_name = value,
            FieldEdit::LastName(value) => self.last_name = value,
            FieldEdit::Gender(value) => self.gender = Some(value),
            FieldEdit::BirthYear(value) => self.birth_year = Some(value),
            FieldEdit::BirthMonth(value) => self.birth_month = Some(value),
            FieldEdit::BirthDay(value) => self.birth_day = Some(value),
            FieldEdit::Nationality(value) => self.nationality = value,
            FieldEdit::Email(value) => self.email = value,
            FieldEdit::PhoneCode(value) => self.phone_code = value,
            FieldEdit::PhoneNumber(value) => self.phone_number = value,
            FieldEdit::Adults(value) => self.adults = value.max(1),
            FieldEdit::IncrementAdults => self.adults = self.adults.saturating_add(1),
            FieldEdit::DecrementAdults => self.adults = self.adults.saturating_sub(1).max(1),
            FieldEdit::Children(value) => self.children = value,
            FieldEdit::IncrementChildren => self.children = self.children.saturating_add(1),
            FieldEdit::DecrementChildren => self.children = self.children.saturating_sub(1),
            FieldEdit::FindUs(value) => self.find_us = Some(value),
            FieldEdit::Comments(value) => self.comments = value,
            FieldEdit::AcceptTerms(value) => self.accept_terms = value,
        }
    }

    /// Number of travellers
    #[must_use]
    pub const fn travellers(&self) -> u32 {
        self.adults.saturating_add(self.children)
    }
}

/// A confirmed draft, as posted to the booking backend
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingSubmission {
    /// Tour slug
    pub tour_slug: String,
    /// First day
    pub start_date: chrono::NaiveDate,
    /// Last day
    pub end_date: chrono::NaiveDate,
    /// Form values
    #[serde(flatten)]
    pub draft: BookingDraft,
    /// Price at the time of confirmation
    pub total_price: Money,
}

impl BookingSubmission {
    /// Combines the tour selection with the form values
    #[must_use]
    pub fn new(selection: &TourSelection, draft: BookingDraft, total_price: Money) -> Self {
        Self {
            tour_slug: selection.slug.clone(),
            start_date: selection.start,
            end_date: selection.end,
            draft,
            total_price,
        }
    }
}
