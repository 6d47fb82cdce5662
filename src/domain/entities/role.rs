use serde::{Deserialize, Serialize};

/// Role of an authenticated user within their club.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Staff,
    Member,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Staff => "staff",
            Role::Member => "member",
        }
    }

    /// Admins and staff manage club-wide records (plans, invoices).
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Admin | Role::Staff)
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}
