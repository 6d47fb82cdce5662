use chrono::{NaiveDate, Utc};

use crate::ports::clock::Clock;

/// Billing dates follow the UTC calendar.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}
