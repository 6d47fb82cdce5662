use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::instrument;
use uuid::Uuid;

use crate::app_error::{AppError, AppResult};
use crate::domain::entities::notification_type::NotificationType;

pub const MAX_NOTIFICATIONS_PER_PAGE: i64 = 100;

// ============================================================================
// Repository Trait
// ============================================================================

#[async_trait]
pub trait NotificationRepoTrait: Send + Sync {
    async fn create(&self, input: &CreateNotificationInput) -> AppResult<NotificationProfile>;

    /// Newest first.
    async fn list_by_user(
        &self,
        user_id: Uuid,
        unread_only: bool,
        limit: i64,
    ) -> AppResult<Vec<NotificationProfile>>;

    /// Returns false if no notification with this id belongs to the user.
    async fn mark_read(&self, id: Uuid, user_id: Uuid) -> AppResult<bool>;

    async fn mark_all_read(&self, user_id: Uuid) -> AppResult<u64>;

    async fn count_unread(&self, user_id: Uuid) -> AppResult<i64>;
}

// ============================================================================
// Profile Types
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct NotificationProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub message: String,
    pub notification_type: NotificationType,
    pub action_url: Option<String>,
    pub is_read: bool,
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateNotificationInput {
    pub user_id: Uuid,
    pub title: String,
    pub message: String,
    pub notification_type: NotificationType,
    pub action_url: Option<String>,
}

// ============================================================================
// Use Cases
// ============================================================================

#[derive(Clone)]
pub struct NotificationUseCases {
    repo: Arc<dyn NotificationRepoTrait>,
}

impl NotificationUseCases {
    pub fn new(repo: Arc<dyn NotificationRepoTrait>) -> Self {
        Self { repo }
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        user_id: Uuid,
        unread_only: bool,
    ) -> AppResult<Vec<NotificationProfile>> {
        self.repo
            .list_by_user(user_id, unread_only, MAX_NOTIFICATIONS_PER_PAGE)
            .await
    }

    #[instrument(skip(self))]
    pub async fn mark_read(&self, user_id: Uuid, id: Uuid) -> AppResult<()> {
        if self.repo.mark_read(id, user_id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound)
        }
    }

    #[instrument(skip(self))]
    pub async fn mark_all_read(&self, user_id: Uuid) -> AppResult<u64> {
        self.repo.mark_all_read(user_id).await
    }

    pub async fn unread_count(&self, user_id: Uuid) -> AppResult<i64> {
        self.repo.count_unread(user_id).await
    }
}
