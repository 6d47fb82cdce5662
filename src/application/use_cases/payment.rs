use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::actor::Actor;
use crate::app_error::{AppError, AppResult};
use crate::domain::entities::{
    notification_type::NotificationType, payment_status::PaymentStatus, payment_type::PaymentType,
};
use crate::ports::clock::Clock;
use crate::use_cases::notification::{CreateNotificationInput, NotificationRepoTrait};
use crate::use_cases::player_plan::PlayerRepoTrait;
use crate::validators::{format_cents, is_valid_description};

// ============================================================================
// Repository Trait
// ============================================================================

#[async_trait]
pub trait PaymentRepoTrait: Send + Sync {
    async fn create(&self, input: &CreatePaymentInput) -> AppResult<PaymentProfile>;

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<PaymentProfile>>;

    /// Newest due date first.
    async fn list(&self, filters: &PaymentListFilters) -> AppResult<Vec<PaymentProfile>>;

    async fn mark_paid(&self, id: Uuid) -> AppResult<PaymentProfile>;

    /// Flips every pending payment due strictly before `due_before` to overdue.
    async fn mark_overdue(&self, due_before: NaiveDate) -> AppResult<u64>;
}

// ============================================================================
// Profile Types
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct PaymentProfile {
    pub id: Uuid,
    pub club_id: Uuid,
    pub player_id: Uuid,
    pub user_id: Uuid,
    pub player_plan_id: Option<Uuid>,
    pub billing_period_start: Option<NaiveDate>,
    pub amount_cents: i64,
    pub payment_type: PaymentType,
    pub payment_status: PaymentStatus,
    pub description: String,
    pub due_date: NaiveDate,
    pub paid_at: Option<NaiveDateTime>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone)]
pub struct CreatePaymentInput {
    pub club_id: Uuid,
    pub player_id: Uuid,
    pub user_id: Uuid,
    pub player_plan_id: Option<Uuid>,
    pub billing_period_start: Option<NaiveDate>,
    pub amount_cents: i64,
    pub payment_type: PaymentType,
    pub description: String,
    pub due_date: NaiveDate,
}

#[derive(Debug, Clone, Default)]
pub struct PaymentListFilters {
    pub club_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub status: Option<PaymentStatus>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ManualPaymentRequest {
    pub player_id: Uuid,
    pub amount_cents: i64,
    pub description: String,
    pub due_date: Option<NaiveDate>,
}

// ============================================================================
// Use Cases
// ============================================================================

#[derive(Clone)]
pub struct PaymentUseCases {
    payment_repo: Arc<dyn PaymentRepoTrait>,
    player_repo: Arc<dyn PlayerRepoTrait>,
    notification_repo: Arc<dyn NotificationRepoTrait>,
    clock: Arc<dyn Clock>,
}

impl PaymentUseCases {
    pub fn new(
        payment_repo: Arc<dyn PaymentRepoTrait>,
        player_repo: Arc<dyn PlayerRepoTrait>,
        notification_repo: Arc<dyn NotificationRepoTrait>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            payment_repo,
            player_repo,
            notification_repo,
            clock,
        }
    }

    /// Raise a one-off invoice for a player and notify the managing user.
    #[instrument(skip(self, request), fields(club_id = %actor.club_id, player_id = %request.player_id))]
    pub async fn create_manual_payment(
        &self,
        actor: &Actor,
        request: ManualPaymentRequest,
    ) -> AppResult<PaymentProfile> {
        actor.require_staff()?;

        if request.amount_cents <= 0 {
            return Err(AppError::InvalidInput("Amount must be positive".into()));
        }
        let description = request.description.trim();
        if description.is_empty() || !is_valid_description(description) {
            return Err(AppError::InvalidInput(
                "Description must be 1-500 characters".into(),
            ));
        }

        let player = self
            .player_repo
            .get_by_id(request.player_id)
            .await?
            .ok_or(AppError::NotFound)?;
        actor.require_club(player.club_id)?;

        let due_date = request.due_date.unwrap_or_else(|| self.clock.today());

        let payment = self
            .payment_repo
            .create(&CreatePaymentInput {
                club_id: player.club_id,
                player_id: player.id,
                user_id: player.user_id,
                player_plan_id: None,
                billing_period_start: None,
                amount_cents: request.amount_cents,
                payment_type: PaymentType::OneOff,
                description: description.to_string(),
                due_date,
            })
            .await?;

        info!(payment_id = %payment.id, amount_cents = payment.amount_cents, "Manual payment created");

        // The invoice stands even if the notification cannot be written.
        let notification = CreateNotificationInput {
            user_id: player.user_id,
            title: "New payment due".to_string(),
            message: format!(
                "A payment of {} for {} is due on {}.",
                format_cents(payment.amount_cents),
                payment.description,
                payment.due_date
            ),
            notification_type: NotificationType::Payment,
            action_url: Some("/payments".to_string()),
        };
        if let Err(e) = self.notification_repo.create(&notification).await {
            warn!(payment_id = %payment.id, error = %e, "Failed to notify user of manual payment");
        }

        Ok(payment)
    }

    /// Members see their own invoices, staff see the whole club.
    #[instrument(skip(self), fields(user_id = %actor.user_id))]
    pub async fn list_payments(
        &self,
        actor: &Actor,
        status: Option<PaymentStatus>,
    ) -> AppResult<Vec<PaymentProfile>> {
        let filters = if actor.role.is_staff() {
            PaymentListFilters {
                club_id: Some(actor.club_id),
                user_id: None,
                status,
            }
        } else {
            PaymentListFilters {
                club_id: Some(actor.club_id),
                user_id: Some(actor.user_id),
                status,
            }
        };
        self.payment_repo.list(&filters).await
    }

    #[instrument(skip(self), fields(user_id = %actor.user_id))]
    pub async fn mark_paid(&self, actor: &Actor, payment_id: Uuid) -> AppResult<PaymentProfile> {
        actor.require_staff()?;

        let payment = self
            .payment_repo
            .get_by_id(payment_id)
            .await?
            .ok_or(AppError::NotFound)?;
        actor.require_club(payment.club_id)?;

        if payment.payment_status.is_terminal() {
            return Ok(payment);
        }

        let paid = self.payment_repo.mark_paid(payment.id).await?;
        info!(payment_id = %paid.id, "Payment marked as paid");
        Ok(paid)
    }
}
