//! Static catalog data: tours, dialing codes and the tour selection carried
//! in the booking page URL.

use crate::types::Money;
use chrono::NaiveDate;
use serde::Deserialize;

/// A tour known to the site
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TourEntry {
    /// URL slug
    pub slug: &'static str,
    /// Display title
    pub title: &'static str,
    /// Human readable duration
    pub duration: &'static str,
    /// Price per person in rupiah
    pub price: u64,
}

/// Built-in tour table
pub const TOURS: &[TourEntry] = &[
    TourEntry {
        slug: "pesona-desa-wisata-penglipuran",
        title: "Pesona Desa Wisata Penglipuran",
        duration: "1 Hari",
        price: 1_500_000,
    },
    TourEntry {
        slug: "sunrise-trekking-gunung-batur",
        title: "Sunrise Trekking Gunung Batur",
        duration: "1 Hari",
        price: 850_000,
    },
    TourEntry {
        slug: "jelajah-nusa-penida",
        title: "Jelajah Nusa Penida",
        duration: "2 Hari 1 Malam",
        price: 2_250_000,
    },
    TourEntry {
        slug: "budaya-ubud-dan-tegallalang",
        title: "Budaya Ubud dan Tegallalang",
        duration: "1 Hari",
        price: 1_200_000,
    },
];

/// An international dialing code offered by the phone field
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhoneCode {
    /// Dialing prefix including the plus sign
    pub code: &'static str,
    /// Country name
    pub country: &'static str,
}

/// Dialing codes offered by the phone field, Indonesia first
pub const PHONE_CODES: &[PhoneCode] = &[
    PhoneCode { code: "+62", country: "Indonesia" },
    PhoneCode { code: "+60", country: "Malaysia" },
    PhoneCode { code: "+65", country: "Singapore" },
    PhoneCode { code: "+61", country: "Australia" },
    PhoneCode { code: "+81", country: "Japan" },
    PhoneCode { code: "+82", country: "South Korea" },
    PhoneCode { code: "+86", country: "China" },
    PhoneCode { code: "+31", country: "Netherlands" },
    PhoneCode { code: "+33", country: "France" },
    PhoneCode { code: "+44", country: "United Kingdom" },
    PhoneCode { code: "+49", country: "Germany" },
    PhoneCode { code: "+1", country: "United States" },
];

/// Whether `code` is one of [`PHONE_CODES`]
#[must_use]
pub fn is_known_phone_code(code: &str) -> bool {
    PHONE_CODES.iter().any(|entry| entry.code == code)
}

/// Tour details shown next to the booking form
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TourContext {
    /// Display title
    pub title: String,
    /// Human readable duration, empty when unknown
    pub duration: String,
    /// Price per person
    pub price: Money,
}

impl TourContext {
    /// Looks `slug` up in [`TOURS`].
    ///
    /// Unknown slugs still get a readable title derived from the slug text,
    /// with an empty duration and a zero price.
    #[must_use]
    pub fn resolve(slug: &str) -> Self {
        TOURS.iter().find(|tour| tour.slug == slug).map_or_else(
            || {
                tracing::warn!(slug, "Unknown tour slug, using derived title");
                Self {
                    title: title_from_slug(slug),
                    duration: String::new(),
                    price: Money::ZERO,
                }
            },
            |tour| Self {
                title: tour.title.to_string(),
                duration: tour.duration.to_string(),
                price: Money::from_rupiah(tour.price),
            },
        )
    }
}

/// `"pesona-desa-wisata-penglipuran"` → `"Pesona Desa Wisata Penglipuran"`
#[must_use]
pub fn title_from_slug(slug: &str) -> String {
    slug.split('-')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// The tour and dates chosen before reaching the booking page
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TourSelection {
    /// Tour slug
    pub slug: String,
    /// First day
    pub start: NaiveDate,
    /// Last day
    pub end: NaiveDate,
}

#[derive(Deserialize)]
struct RawSelection {
    slug: Option<String>,
    start: Option<String>,
    end: Option<String>,
}

impl TourSelection {
    /// Parses `slug`, `start` and `end` (`YYYY-MM-DD`) from a URL query string.
    ///
    /// Returns `None` when any of them is missing, empty or malformed, or
    /// when the tour ends before it starts.
    #[must_use]
    pub fn from_query(query: &str) -> Option<Self> {
        let query = query.strip_prefix('?').unwrap_or(query);

        let raw: RawSelection = match serde_urlencoded::from_str(query) {
            Ok(raw) => raw,
            Err(error) => {
                tracing::warn!(%error, "Unreadable booking query string");
                return None;
            },
        };

        let slug = raw.slug.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())?;
        let start = parse_date(raw.start.as_deref())?;
        let end = parse_date(raw.end.as_deref())?;

        if end < start {
            tracing::warn!(%slug, %start, %end, "Tour ends before it starts");
            return None;
        }

        Some(Self { slug, start, end })
    }

    /// Number of calendar days covered, both ends included
    #[must_use]
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

fn parse_date(value: Option<&str>) -> Option<NaiveDate> {
    let value = value?.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .inspect_err(|error| tracing::warn!(value, %error, "Invalid tour date"))
        .ok()
}
