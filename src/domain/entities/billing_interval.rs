use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "billing_interval", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BillingInterval {
    Week,
    Month,
    Year,
}

impl BillingInterval {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingInterval::Week => "week",
            BillingInterval::Month => "month",
            BillingInterval::Year => "year",
        }
    }

    /// Next billing date after `from`.
    ///
    /// Weekly cycles add seven days. Monthly and yearly cycles move to the
    /// target month and land on `anchor_day`, clamped to the month's last day,
    /// so a plan anchored on the 31st bills Jan 31, Feb 28 (29), Mar 31, Apr 30
    /// without drifting to the 28th.
    ///
    /// Returns `None` if the result falls outside chrono's calendar range.
    pub fn advance(&self, from: NaiveDate, anchor_day: u32) -> Option<NaiveDate> {
        match self {
            BillingInterval::Week => from.checked_add_days(Days::new(7)),
            BillingInterval::Month => add_months_anchored(from, 1, anchor_day),
            BillingInterval::Year => add_months_anchored(from, 12, anchor_day),
        }
    }
}

fn add_months_anchored(from: NaiveDate, months: u32, anchor_day: u32) -> Option<NaiveDate> {
    let first = from.with_day(1)?.checked_add_months(Months::new(months))?;
    let last_day = first.checked_add_months(Months::new(1))?.pred_opt()?.day();
    first.with_day(anchor_day.clamp(1, last_day))
}

impl std::fmt::Display for BillingInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BillingInterval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "week" | "weekly" => Ok(BillingInterval::Week),
            "month" | "monthly" => Ok(BillingInterval::Month),
            "year" | "yearly" | "annual" => Ok(BillingInterval::Year),
            _ => Err(format!("Invalid billing interval: {}", s)),
        }
    }
}
