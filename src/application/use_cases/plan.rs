use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use crate::actor::Actor;
use crate::app_error::{AppError, AppResult};
use crate::domain::entities::billing_interval::BillingInterval;
use crate::validators::{is_valid_currency, is_valid_description, is_valid_plan_name};

pub const DEFAULT_CURRENCY: &str = "usd";

// ============================================================================
// Repository Trait
// ============================================================================

#[async_trait]
pub trait PlanRepoTrait: Send + Sync {
    async fn create(&self, input: &CreatePlanInput) -> AppResult<PlanProfile>;

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<PlanProfile>>;

    async fn list_by_club(&self, club_id: Uuid, include_inactive: bool)
    -> AppResult<Vec<PlanProfile>>;
}

// ============================================================================
// Profile Types
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct PlanProfile {
    pub id: Uuid,
    pub club_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub currency: String,
    pub interval: BillingInterval,
    pub is_active: bool,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone)]
pub struct CreatePlanInput {
    pub club_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub currency: String,
    pub interval: BillingInterval,
}

/// Request shape accepted from club staff.
#[derive(Debug, Clone, Deserialize)]
pub struct NewPlan {
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub currency: Option<String>,
    pub interval: BillingInterval,
}

// ============================================================================
// Use Cases
// ============================================================================

#[derive(Clone)]
pub struct PlanUseCases {
    repo: Arc<dyn PlanRepoTrait>,
}

impl PlanUseCases {
    pub fn new(repo: Arc<dyn PlanRepoTrait>) -> Self {
        Self { repo }
    }

    #[instrument(skip(self, plan), fields(club_id = %actor.club_id))]
    pub async fn create_plan(&self, actor: &Actor, plan: NewPlan) -> AppResult<PlanProfile> {
        actor.require_staff()?;

        let name = plan.name.trim();
        if !is_valid_plan_name(name) {
            return Err(AppError::InvalidInput(
                "Plan name must be 1-100 characters".into(),
            ));
        }
        if plan.price_cents < 0 {
            return Err(AppError::InvalidInput("Price cannot be negative".into()));
        }

        let currency = plan
            .currency
            .as_deref()
            .map(str::trim)
            .unwrap_or(DEFAULT_CURRENCY)
            .to_lowercase();
        if !is_valid_currency(&currency) {
            return Err(AppError::InvalidInput(
                "Currency must be a 3-letter code".into(),
            ));
        }

        let description = plan
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        if let Some(d) = &description
            && !is_valid_description(d)
        {
            return Err(AppError::InvalidInput("Description is too long".into()));
        }

        self.repo
            .create(&CreatePlanInput {
                club_id: actor.club_id,
                name: name.to_string(),
                description,
                price_cents: plan.price_cents,
                currency,
                interval: plan.interval,
            })
            .await
    }

    /// Members only see plans that are open for subscription.
    #[instrument(skip(self), fields(club_id = %actor.club_id))]
    pub async fn list_plans(
        &self,
        actor: &Actor,
        include_inactive: bool,
    ) -> AppResult<Vec<PlanProfile>> {
        let include_inactive = include_inactive && actor.role.is_staff();
        self.repo.list_by_club(actor.club_id, include_inactive).await
    }

    pub async fn get_plan(&self, actor: &Actor, id: Uuid) -> AppResult<PlanProfile> {
        let plan = self.repo.get_by_id(id).await?.ok_or(AppError::NotFound)?;
        actor.require_club(plan.club_id)?;
        Ok(plan)
    }
}
