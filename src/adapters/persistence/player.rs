use async_trait::async_trait;
use sqlx::Row;
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    use_cases::player_plan::{PlayerProfile, PlayerRepoTrait},
};

#[async_trait]
impl PlayerRepoTrait for PostgresPersistence {
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<PlayerProfile>> {
        let row = sqlx::query(
            "SELECT id, club_id, user_id, first_name, last_name FROM players WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;

        Ok(row.map(|row| PlayerProfile {
            id: row.get("id"),
            club_id: row.get("club_id"),
            user_id: row.get("user_id"),
            first_name: row.get("first_name"),
            last_name: row.get("last_name"),
        }))
    }
}
