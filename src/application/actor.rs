use uuid::Uuid;

use crate::app_error::{AppError, AppResult};
use crate::domain::entities::role::Role;

/// The authenticated user a use case acts on behalf of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: Uuid,
    pub club_id: Uuid,
    pub role: Role,
}

impl Actor {
    pub fn require_staff(&self) -> AppResult<()> {
        if self.role.is_staff() {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }

    pub fn require_admin(&self) -> AppResult<()> {
        if self.role.is_admin() {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }

    /// Records of other clubs are reported as missing rather than forbidden,
    /// so tenants cannot probe each other's ids.
    pub fn require_club(&self, club_id: Uuid) -> AppResult<()> {
        if self.club_id == club_id {
            Ok(())
        } else {
            Err(AppError::NotFound)
        }
    }

    /// Staff may act on any record of their club, members only on their own.
    pub fn can_manage_user_record(&self, owner_user_id: Uuid) -> bool {
        self.role.is_staff() || self.user_id == owner_user_id
    }
}
