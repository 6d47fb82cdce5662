use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "notification_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    Payment,
    PaymentReminder,
    General,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::Payment => "payment",
            NotificationType::PaymentReminder => "payment_reminder",
            NotificationType::General => "general",
        }
    }
}

impl Default for NotificationType {
    fn default() -> Self {
        NotificationType::General
    }
}
