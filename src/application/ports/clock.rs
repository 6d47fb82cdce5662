//! Clock port.
//!
//! Billing decisions are made against a calendar date, not an instant. The
//! date source is injected so tests can move "today" without waiting on the
//! wall clock.

use chrono::NaiveDate;

pub trait Clock: Send + Sync {
    /// Current calendar date (UTC).
    fn today(&self) -> NaiveDate;
}
