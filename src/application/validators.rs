pub const MAX_PLAN_NAME_LEN: usize = 100;
pub const MAX_DESCRIPTION_LEN: usize = 500;

/// Validates a plan name.
/// Rules:
/// - 1-100 characters after trimming
/// - No control characters
pub fn is_valid_plan_name(name: &str) -> bool {
    let name = name.trim();
    !name.is_empty()
        && name.chars().count() <= MAX_PLAN_NAME_LEN
        && !name.chars().any(|c| c.is_control())
}

/// Validates an ISO 4217 style currency code ("usd", "EUR").
pub fn is_valid_currency(code: &str) -> bool {
    code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic())
}

pub fn is_valid_description(description: &str) -> bool {
    description.chars().count() <= MAX_DESCRIPTION_LEN
}

/// Format an amount in cents for user-facing messages, e.g. `4500` -> `45.00`.
pub fn format_cents(amount_cents: i64) -> String {
    let sign = if amount_cents < 0 { "-" } else { "" };
    let abs = amount_cents.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}
