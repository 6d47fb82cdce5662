use async_trait::async_trait;
use sqlx::Row;
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    use_cases::notification::{
        CreateNotificationInput, NotificationProfile, NotificationRepoTrait,
    },
};

fn row_to_profile(row: &sqlx::postgres::PgRow) -> NotificationProfile {
    NotificationProfile {
        id: row.get("id"),
        user_id: row.get("user_id"),
        title: row.get("title"),
        message: row.get("message"),
        notification_type: row.get("notification_type"),
        action_url: row.get("action_url"),
        is_read: row.get("is_read"),
        created_at: row.get("created_at"),
    }
}

pub(super) const INSERT_NOTIFICATION: &str = r#"
    INSERT INTO notifications (id, user_id, title, message, notification_type, action_url)
    VALUES ($1, $2, $3, $4, $5, $6)
    RETURNING id, user_id, title, message, notification_type, action_url, is_read, created_at
"#;

#[async_trait]
impl NotificationRepoTrait for PostgresPersistence {
    async fn create(&self, input: &CreateNotificationInput) -> AppResult<NotificationProfile> {
        let row = sqlx::query(INSERT_NOTIFICATION)
            .bind(Uuid::new_v4())
            .bind(input.user_id)
            .bind(&input.title)
            .bind(&input.message)
            .bind(input.notification_type)
            .bind(&input.action_url)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::from)?;
        Ok(row_to_profile(&row))
    }

    async fn list_by_user(
        &self,
        user_id: Uuid,
        unread_only: bool,
        limit: i64,
    ) -> AppResult<Vec<NotificationProfile>> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, title, message, notification_type, action_url, is_read, created_at
            FROM notifications
            WHERE user_id = $1 AND (NOT $2 OR NOT is_read)
            ORDER BY created_at DESC
            LIMIT $3
            "#,
        )
        .bind(user_id)
        .bind(unread_only)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(rows.iter().map(row_to_profile).collect())
    }

    async fn mark_read(&self, id: Uuid, user_id: Uuid) -> AppResult<bool> {
        let result =
            sqlx::query("UPDATE notifications SET is_read = true WHERE id = $1 AND user_id = $2")
                .bind(id)
                .bind(user_id)
                .execute(&self.pool)
                .await
                .map_err(AppError::from)?;
        Ok(result.rows_affected() > 0)
    }

    async fn mark_all_read(&self, user_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = true WHERE user_id = $1 AND NOT is_read",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(result.rows_affected())
    }

    async fn count_unread(&self, user_id: Uuid) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND NOT is_read",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(count)
    }
}
