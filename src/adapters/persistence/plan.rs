use async_trait::async_trait;
use sqlx::Row;
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    use_cases::plan::{CreatePlanInput, PlanProfile, PlanRepoTrait},
};

fn row_to_profile(row: &sqlx::postgres::PgRow) -> PlanProfile {
    PlanProfile {
        id: row.get("id"),
        club_id: row.get("club_id"),
        name: row.get("name"),
        description: row.get("description"),
        price_cents: row.get("price_cents"),
        currency: row.get("currency"),
        interval: row.get("interval"),
        is_active: row.get("is_active"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

const SELECT_COLS: &str = r#"
    id, club_id, name, description, price_cents, currency, interval, is_active,
    created_at, updated_at
"#;

#[async_trait]
impl PlanRepoTrait for PostgresPersistence {
    async fn create(&self, input: &CreatePlanInput) -> AppResult<PlanProfile> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO plans (id, club_id, name, description, price_cents, currency, interval)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            SELECT_COLS
        ))
        .bind(Uuid::new_v4())
        .bind(input.club_id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price_cents)
        .bind(&input.currency)
        .bind(input.interval)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row_to_profile(&row))
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<PlanProfile>> {
        let row = sqlx::query(&format!("SELECT {} FROM plans WHERE id = $1", SELECT_COLS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::from)?;
        Ok(row.as_ref().map(row_to_profile))
    }

    async fn list_by_club(
        &self,
        club_id: Uuid,
        include_inactive: bool,
    ) -> AppResult<Vec<PlanProfile>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM plans WHERE club_id = $1 AND ($2 OR is_active) ORDER BY name",
            SELECT_COLS
        ))
        .bind(club_id)
        .bind(include_inactive)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(rows.iter().map(row_to_profile).collect())
    }
}
