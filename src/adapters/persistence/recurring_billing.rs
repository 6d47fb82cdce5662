use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::Row;
use uuid::Uuid;

use crate::{
    adapters::persistence::{PostgresPersistence, notification::INSERT_NOTIFICATION},
    app_error::{AppError, AppResult},
    domain::entities::payment_type::PaymentType,
    use_cases::recurring_billing::{
        BillingCycle, CycleCommit, DuePlayerPlan, RecurringBillingRepoTrait,
    },
};

fn row_to_due(row: &sqlx::postgres::PgRow) -> DuePlayerPlan {
    DuePlayerPlan {
        player_plan_id: row.get("player_plan_id"),
        plan_id: row.get("plan_id"),
        player_id: row.get("player_id"),
        user_id: row.get("user_id"),
        club_id: row.get("club_id"),
        plan_name: row.get("plan_name"),
        price_cents: row.get("price_cents"),
        currency: row.get("currency"),
        interval: row.get("interval"),
        next_billing_date: row.get("next_billing_date"),
        billing_anchor_day: row.get("billing_anchor_day"),
    }
}

#[async_trait]
impl RecurringBillingRepoTrait for PostgresPersistence {
    async fn list_due(&self, today: NaiveDate) -> AppResult<Vec<DuePlayerPlan>> {
        let rows = sqlx::query(
            r#"
            SELECT pp.id AS player_plan_id, pp.plan_id, pp.player_id, pp.user_id,
                   p.club_id, p.name AS plan_name, p.price_cents, p.currency, p.interval,
                   pp.next_billing_date, pp.billing_anchor_day
            FROM player_plans pp
            JOIN plans p ON p.id = pp.plan_id
            WHERE pp.is_active
              AND (pp.next_billing_date IS NULL OR pp.next_billing_date <= $1)
            ORDER BY pp.next_billing_date ASC NULLS FIRST, pp.created_at ASC
            "#,
        )
        .bind(today)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(rows.iter().map(row_to_due).collect())
    }

    async fn commit_cycle(&self, cycle: &BillingCycle) -> AppResult<CycleCommit> {
        let mut tx = self.pool.begin().await.map_err(AppError::from)?;

        // Compare-and-swap: only the run that read this next_billing_date may advance it.
        let advanced = sqlx::query(
            r#"
            UPDATE player_plans
            SET last_billing_date = $3,
                next_billing_date = $4,
                billing_anchor_day = COALESCE(billing_anchor_day, $5),
                updated_at = CURRENT_TIMESTAMP
            WHERE id = $1
              AND is_active
              AND next_billing_date IS NOT DISTINCT FROM $2
            "#,
        )
        .bind(cycle.player_plan_id)
        .bind(cycle.expected_next_billing_date)
        .bind(cycle.billed_on)
        .bind(cycle.next_billing_date)
        .bind(cycle.billing_anchor_day)
        .execute(&mut *tx)
        .await
        .map_err(AppError::from)?;

        if advanced.rows_affected() == 0 {
            tx.rollback().await.map_err(AppError::from)?;
            return Ok(CycleCommit::AlreadyBilled);
        }

        let payment_id: Option<Uuid> = sqlx::query_scalar(
            r#"
            INSERT INTO payments
                (id, club_id, player_id, user_id, player_plan_id, billing_period_start,
                 amount_cents, payment_type, description, due_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (player_plan_id, billing_period_start)
                WHERE player_plan_id IS NOT NULL
                DO NOTHING
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(cycle.club_id)
        .bind(cycle.player_id)
        .bind(cycle.user_id)
        .bind(cycle.player_plan_id)
        .bind(cycle.billing_period_start)
        .bind(cycle.amount_cents)
        .bind(PaymentType::MonthlyFee)
        .bind(&cycle.description)
        .bind(cycle.billed_on)
        .fetch_optional(&mut *tx)
        .await
        .map_err(AppError::from)?;

        let Some(payment_id) = payment_id else {
            tx.rollback().await.map_err(AppError::from)?;
            return Ok(CycleCommit::AlreadyBilled);
        };

        let notification = &cycle.notification;
        sqlx::query(INSERT_NOTIFICATION)
            .bind(Uuid::new_v4())
            .bind(notification.user_id)
            .bind(&notification.title)
            .bind(&notification.message)
            .bind(notification.notification_type)
            .bind(&notification.action_url)
            .execute(&mut *tx)
            .await
            .map_err(AppError::from)?;

        tx.commit().await.map_err(AppError::from)?;
        Ok(CycleCommit::Committed { payment_id })
    }
}
