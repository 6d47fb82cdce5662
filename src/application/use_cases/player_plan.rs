use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::actor::Actor;
use crate::app_error::{AppError, AppResult};
use crate::ports::clock::Clock;
use crate::use_cases::plan::PlanRepoTrait;

// ============================================================================
// Repository Traits
// ============================================================================

#[async_trait]
pub trait PlayerRepoTrait: Send + Sync {
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<PlayerProfile>>;
}

#[async_trait]
pub trait PlayerPlanRepoTrait: Send + Sync {
    async fn create(&self, input: &CreatePlayerPlanInput) -> AppResult<PlayerPlanProfile>;

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<PlayerPlanProfile>>;

    async fn find_active(
        &self,
        plan_id: Uuid,
        player_id: Uuid,
    ) -> AppResult<Option<PlayerPlanProfile>>;

    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<PlayerPlanProfile>>;

    async fn list_by_club(&self, club_id: Uuid) -> AppResult<Vec<PlayerPlanProfile>>;

    /// Marks the plan inactive. Already-inactive plans are returned unchanged.
    async fn deactivate(&self, id: Uuid) -> AppResult<PlayerPlanProfile>;
}

// ============================================================================
// Profile Types
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct PlayerProfile {
    pub id: Uuid,
    pub club_id: Uuid,
    /// The parent or player account managing this player.
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerPlanProfile {
    pub id: Uuid,
    pub plan_id: Uuid,
    pub player_id: Uuid,
    pub user_id: Uuid,
    pub club_id: Uuid,
    pub start_date: NaiveDate,
    pub last_billing_date: Option<NaiveDate>,
    /// `None` means never billed.
    pub next_billing_date: Option<NaiveDate>,
    pub billing_anchor_day: Option<i16>,
    pub is_active: bool,
    pub canceled_at: Option<NaiveDateTime>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone)]
pub struct CreatePlayerPlanInput {
    pub plan_id: Uuid,
    pub player_id: Uuid,
    pub user_id: Uuid,
    pub start_date: NaiveDate,
    pub next_billing_date: NaiveDate,
    pub billing_anchor_day: i16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubscribeRequest {
    pub plan_id: Uuid,
    pub player_id: Uuid,
    pub start_date: Option<NaiveDate>,
}

// ============================================================================
// Use Cases
// ============================================================================

#[derive(Clone)]
pub struct PlayerPlanUseCases {
    player_plan_repo: Arc<dyn PlayerPlanRepoTrait>,
    plan_repo: Arc<dyn PlanRepoTrait>,
    player_repo: Arc<dyn PlayerRepoTrait>,
    clock: Arc<dyn Clock>,
}

impl PlayerPlanUseCases {
    pub fn new(
        player_plan_repo: Arc<dyn PlayerPlanRepoTrait>,
        plan_repo: Arc<dyn PlanRepoTrait>,
        player_repo: Arc<dyn PlayerRepoTrait>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            player_plan_repo,
            plan_repo,
            player_repo,
            clock,
        }
    }

    /// Subscribe a player to a plan. The first invoice is raised by the
    /// billing processor on `start_date`, and later cycles snap to its day of month.
    #[instrument(skip(self, request), fields(user_id = %actor.user_id, plan_id = %request.plan_id))]
    pub async fn subscribe(
        &self,
        actor: &Actor,
        request: SubscribeRequest,
    ) -> AppResult<PlayerPlanProfile> {
        let plan = self
            .plan_repo
            .get_by_id(request.plan_id)
            .await?
            .ok_or(AppError::NotFound)?;
        actor.require_club(plan.club_id)?;
        if !plan.is_active {
            return Err(AppError::InvalidInput(
                "Plan is not accepting new subscriptions".into(),
            ));
        }

        let player = self
            .player_repo
            .get_by_id(request.player_id)
            .await?
            .ok_or(AppError::NotFound)?;
        actor.require_club(player.club_id)?;
        if !actor.can_manage_user_record(player.user_id) {
            return Err(AppError::Forbidden);
        }

        let today = self.clock.today();
        let start_date = request.start_date.unwrap_or(today);
        if start_date < today {
            return Err(AppError::InvalidInput(
                "Start date cannot be in the past".into(),
            ));
        }

        if self
            .player_plan_repo
            .find_active(plan.id, player.id)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(
                "Player is already subscribed to this plan".into(),
            ));
        }

        let player_plan = self
            .player_plan_repo
            .create(&CreatePlayerPlanInput {
                plan_id: plan.id,
                player_id: player.id,
                user_id: player.user_id,
                start_date,
                next_billing_date: start_date,
                billing_anchor_day: start_date.day() as i16,
            })
            .await?;

        info!(player_plan_id = %player_plan.id, %start_date, "Player subscribed to plan");
        Ok(player_plan)
    }

    #[instrument(skip(self), fields(user_id = %actor.user_id))]
    pub async fn cancel(&self, actor: &Actor, player_plan_id: Uuid) -> AppResult<PlayerPlanProfile> {
        let player_plan = self
            .player_plan_repo
            .get_by_id(player_plan_id)
            .await?
            .ok_or(AppError::NotFound)?;
        actor.require_club(player_plan.club_id)?;
        if !actor.can_manage_user_record(player_plan.user_id) {
            return Err(AppError::Forbidden);
        }

        if !player_plan.is_active {
            return Ok(player_plan);
        }

        let canceled = self.player_plan_repo.deactivate(player_plan.id).await?;
        info!(player_plan_id = %canceled.id, "Player plan canceled");
        Ok(canceled)
    }

    /// Staff see every subscription of their club, members only their own.
    pub async fn list(&self, actor: &Actor) -> AppResult<Vec<PlayerPlanProfile>> {
        if actor.role.is_staff() {
            self.player_plan_repo.list_by_club(actor.club_id).await
        } else {
            self.player_plan_repo.list_by_user(actor.user_id).await
        }
    }
}
