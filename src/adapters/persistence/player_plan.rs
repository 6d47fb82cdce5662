use async_trait::async_trait;
use sqlx::Row;
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    use_cases::player_plan::{CreatePlayerPlanInput, PlayerPlanProfile, PlayerPlanRepoTrait},
};

fn row_to_profile(row: &sqlx::postgres::PgRow) -> PlayerPlanProfile {
    PlayerPlanProfile {
        id: row.get("id"),
        plan_id: row.get("plan_id"),
        player_id: row.get("player_id"),
        user_id: row.get("user_id"),
        club_id: row.get("club_id"),
        start_date: row.get("start_date"),
        last_billing_date: row.get("last_billing_date"),
        next_billing_date: row.get("next_billing_date"),
        billing_anchor_day: row.get("billing_anchor_day"),
        is_active: row.get("is_active"),
        canceled_at: row.get("canceled_at"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

// player_plans has no club_id column; it is taken from the plan.
const SELECT_FROM: &str = r#"
    SELECT pp.id, pp.plan_id, pp.player_id, pp.user_id, p.club_id, pp.start_date,
           pp.last_billing_date, pp.next_billing_date, pp.billing_anchor_day,
           pp.is_active, pp.canceled_at, pp.created_at, pp.updated_at
    FROM player_plans pp
    JOIN plans p ON p.id = pp.plan_id
"#;

#[async_trait]
impl PlayerPlanRepoTrait for PostgresPersistence {
    async fn create(&self, input: &CreatePlayerPlanInput) -> AppResult<PlayerPlanProfile> {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO player_plans
                (id, plan_id, player_id, user_id, start_date, next_billing_date, billing_anchor_day)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(id)
        .bind(input.plan_id)
        .bind(input.player_id)
        .bind(input.user_id)
        .bind(input.start_date)
        .bind(input.next_billing_date)
        .bind(input.billing_anchor_day)
        .execute(&self.pool)
        .await
        .map_err(AppError::from)?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| AppError::Internal("player plan vanished after insert".into()))
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<PlayerPlanProfile>> {
        let row = sqlx::query(&format!("{} WHERE pp.id = $1", SELECT_FROM))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::from)?;
        Ok(row.as_ref().map(row_to_profile))
    }

    async fn find_active(
        &self,
        plan_id: Uuid,
        player_id: Uuid,
    ) -> AppResult<Option<PlayerPlanProfile>> {
        let row = sqlx::query(&format!(
            "{} WHERE pp.plan_id = $1 AND pp.player_id = $2 AND pp.is_active",
            SELECT_FROM
        ))
        .bind(plan_id)
        .bind(player_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row.as_ref().map(row_to_profile))
    }

    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<PlayerPlanProfile>> {
        let rows = sqlx::query(&format!(
            "{} WHERE pp.user_id = $1 ORDER BY pp.created_at DESC",
            SELECT_FROM
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(rows.iter().map(row_to_profile).collect())
    }

    async fn list_by_club(&self, club_id: Uuid) -> AppResult<Vec<PlayerPlanProfile>> {
        let rows = sqlx::query(&format!(
            "{} WHERE p.club_id = $1 ORDER BY pp.created_at DESC",
            SELECT_FROM
        ))
        .bind(club_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(rows.iter().map(row_to_profile).collect())
    }

    async fn deactivate(&self, id: Uuid) -> AppResult<PlayerPlanProfile> {
        sqlx::query(
            r#"
            UPDATE player_plans
            SET is_active = false, canceled_at = CURRENT_TIMESTAMP, updated_at = CURRENT_TIMESTAMP
            WHERE id = $1 AND is_active
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(AppError::from)?;

        self.get_by_id(id).await?.ok_or(AppError::NotFound)
    }
}
