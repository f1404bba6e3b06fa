//! Time and timestamp helpers.

use chrono::{DateTime, Local, NaiveDateTime, Utc};

/// UTC timestamp used for `last_changed`, `last_updated`, event times, etc.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Return the current wall-clock time in the host's local timezone.
///
/// Heating schedules are expressed in local time, so week-profile lookups
/// take a naive local timestamp rather than a [`Timestamp`].
#[must_use]
pub fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}
