use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::Row;
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    domain::entities::payment_status::PaymentStatus,
    use_cases::payment::{CreatePaymentInput, PaymentListFilters, PaymentProfile, PaymentRepoTrait},
};

fn row_to_profile(row: &sqlx::postgres::PgRow) -> PaymentProfile {
    PaymentProfile {
        id: row.get("id"),
        club_id: row.get("club_id"),
        player_id: row.get("player_id"),
        user_id: row.get("user_id"),
        player_plan_id: row.get("player_plan_id"),
        billing_period_start: row.get("billing_period_start"),
        amount_cents: row.get("amount_cents"),
        payment_type: row.get("payment_type"),
        payment_status: row.get("payment_status"),
        description: row.get("description"),
        due_date: row.get("due_date"),
        paid_at: row.get("paid_at"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

const SELECT_COLS: &str = r#"
    id, club_id, player_id, user_id, player_plan_id, billing_period_start,
    amount_cents, payment_type, payment_status, description, due_date, paid_at,
    created_at, updated_at
"#;

#[async_trait]
impl PaymentRepoTrait for PostgresPersistence {
    async fn create(&self, input: &CreatePaymentInput) -> AppResult<PaymentProfile> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO payments
                (id, club_id, player_id, user_id, player_plan_id, billing_period_start,
                 amount_cents, payment_type, description, due_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {}
            "#,
            SELECT_COLS
        ))
        .bind(Uuid::new_v4())
        .bind(input.club_id)
        .bind(input.player_id)
        .bind(input.user_id)
        .bind(input.player_plan_id)
        .bind(input.billing_period_start)
        .bind(input.amount_cents)
        .bind(input.payment_type)
        .bind(&input.description)
        .bind(input.due_date)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row_to_profile(&row))
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<PaymentProfile>> {
        let row = sqlx::query(&format!("SELECT {} FROM payments WHERE id = $1", SELECT_COLS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::from)?;
        Ok(row.as_ref().map(row_to_profile))
    }

    async fn list(&self, filters: &PaymentListFilters) -> AppResult<Vec<PaymentProfile>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {} FROM payments
            WHERE ($1::uuid IS NULL OR club_id = $1)
              AND ($2::uuid IS NULL OR user_id = $2)
              AND ($3::payment_status IS NULL OR payment_status = $3)
            ORDER BY due_date DESC, created_at DESC
            "#,
            SELECT_COLS
        ))
        .bind(filters.club_id)
        .bind(filters.user_id)
        .bind(filters.status)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(rows.iter().map(row_to_profile).collect())
    }

    async fn mark_paid(&self, id: Uuid) -> AppResult<PaymentProfile> {
        // Paid payments keep their original paid_at.
        let row = sqlx::query(&format!(
            r#"
            UPDATE payments
            SET payment_status = $2,
                paid_at = CASE WHEN payment_status = $2 THEN paid_at ELSE CURRENT_TIMESTAMP END,
                updated_at = CASE WHEN payment_status = $2 THEN updated_at ELSE CURRENT_TIMESTAMP END
            WHERE id = $1
            RETURNING {}
            "#,
            SELECT_COLS
        ))
        .bind(id)
        .bind(PaymentStatus::Paid)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        row.as_ref().map(row_to_profile).ok_or(AppError::NotFound)
    }

    async fn mark_overdue(&self, due_before: NaiveDate) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE payments
            SET payment_status = $1, updated_at = CURRENT_TIMESTAMP
            WHERE payment_status = $2 AND due_date < $3
            "#,
        )
        .bind(PaymentStatus::Overdue)
        .bind(PaymentStatus::Pending)
        .bind(due_before)
        .execute(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(result.rows_affected())
    }
}
