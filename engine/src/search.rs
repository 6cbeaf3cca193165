//! Free-text search over the admin list.

use crate::Booking;

/// A live search query.
///
/// Keeps the text as typed next to its normalised form (trimmed and
/// lower-cased) so the caller can echo the input back unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    raw: String,
    needle: String,
}

impl SearchQuery {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let needle = raw.trim().to_lowercase();
        Self { raw, needle }
    }

    /// The query as typed.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The normalised query used for matching.
    pub fn needle(&self) -> &str {
        &self.needle
    }

    /// True when the query matches everything.
    pub fn is_blank(&self) -> bool {
        self.needle.is_empty()
    }

    /// Owner name contains the needle, or the assigned dentist's name does.
    /// A booking without a resolvable dentist name only matches on the owner.
    pub fn matches(&self, booking: &Booking) -> bool {
        if booking.owner_name().to_lowercase().contains(&self.needle) {
            return true;
        }
        booking
            .dentist_name()
            .is_some_and(|name| name.to_lowercase().contains(&self.needle))
    }
}

impl From<&str> for SearchQuery {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// Filter `bookings` by `query`, keeping their original order.
///
/// Always computed from the full list, never from a previous result.
pub fn filter<'a>(bookings: &'a [Booking], query: &SearchQuery) -> Vec<&'a Booking> {
    if query.is_blank() {
        return bookings.iter().collect();
    }
    bookings.iter().filter(|b| query.matches(b)).collect()
}
