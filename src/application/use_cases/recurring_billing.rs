//! Recurring billing: turns due player plans into invoices.
//!
//! Each due plan is billed in its own datastore transaction that
//! compare-and-swaps `next_billing_date`, inserts the payment and inserts the
//! notification. A plan that another run (or another process) has already
//! advanced is reported as already billed instead of charged twice. Failures
//! are recorded per plan and never stop the rest of the batch.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::app_error::{AppError, AppResult};
use crate::domain::entities::{
    billing_interval::BillingInterval, notification_type::NotificationType,
};
use crate::ports::clock::Clock;
use crate::use_cases::notification::CreateNotificationInput;
use crate::use_cases::payment::PaymentRepoTrait;
use crate::validators::format_cents;

pub const DEFAULT_OVERDUE_GRACE_DAYS: u32 = 14;

// ============================================================================
// Repository Trait
// ============================================================================

#[async_trait]
pub trait RecurringBillingRepoTrait: Send + Sync {
    /// Active player plans with `next_billing_date` on or before `today`, or
    /// never billed. Ordered never-billed first, then by date.
    async fn list_due(&self, today: NaiveDate) -> AppResult<Vec<DuePlayerPlan>>;

    /// Apply one billing cycle atomically.
    ///
    /// Returns `AlreadyBilled` without writing anything when the plan's
    /// `next_billing_date` no longer equals `cycle.expected_next_billing_date`,
    /// the plan is inactive, or a payment for this period already exists.
    async fn commit_cycle(&self, cycle: &BillingCycle) -> AppResult<CycleCommit>;
}

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Clone)]
pub struct DuePlayerPlan {
    pub player_plan_id: Uuid,
    pub plan_id: Uuid,
    pub player_id: Uuid,
    pub user_id: Uuid,
    pub club_id: Uuid,
    pub plan_name: String,
    pub price_cents: i64,
    pub currency: String,
    pub interval: BillingInterval,
    pub next_billing_date: Option<NaiveDate>,
    pub billing_anchor_day: Option<i16>,
}

/// Everything written for one billing cycle of one player plan.
#[derive(Debug, Clone, PartialEq)]
pub struct BillingCycle {
    pub player_plan_id: Uuid,
    pub club_id: Uuid,
    pub player_id: Uuid,
    pub user_id: Uuid,
    /// Compare-and-swap token: the `next_billing_date` that was read.
    pub expected_next_billing_date: Option<NaiveDate>,
    pub billing_period_start: NaiveDate,
    pub next_billing_date: NaiveDate,
    pub billing_anchor_day: i16,
    pub billed_on: NaiveDate,
    pub amount_cents: i64,
    pub description: String,
    pub notification: CreateNotificationInput,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleCommit {
    Committed { payment_id: Uuid },
    AlreadyBilled,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PlanBillingOutcome {
    Billed {
        payment_id: Uuid,
        billing_period_start: NaiveDate,
        next_billing_date: NaiveDate,
    },
    AlreadyBilled,
    Failed {
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanBillingResult {
    pub player_plan_id: Uuid,
    pub club_id: Uuid,
    #[serde(flatten)]
    pub outcome: PlanBillingOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BillingRunReport {
    pub run_date: NaiveDate,
    pub results: Vec<PlanBillingResult>,
}

impl BillingRunReport {
    pub fn billed(&self) -> usize {
        self.count(|o| matches!(o, PlanBillingOutcome::Billed { .. }))
    }

    pub fn already_billed(&self) -> usize {
        self.count(|o| matches!(o, PlanBillingOutcome::AlreadyBilled))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, PlanBillingOutcome::Failed { .. }))
    }

    pub fn outcome_for(&self, player_plan_id: Uuid) -> Option<&PlanBillingOutcome> {
        self.results
            .iter()
            .find(|r| r.player_plan_id == player_plan_id)
            .map(|r| &r.outcome)
    }

    /// Copy of the report holding only one club's results.
    pub fn for_club(&self, club_id: Uuid) -> BillingRunReport {
        BillingRunReport {
            run_date: self.run_date,
            results: self
                .results
                .iter()
                .filter(|r| r.club_id == club_id)
                .cloned()
                .collect(),
        }
    }

    fn count(&self, pred: impl Fn(&PlanBillingOutcome) -> bool) -> usize {
        self.results.iter().filter(|r| pred(&r.outcome)).count()
    }
}

/// Build the cycle to bill for a due plan.
///
/// The billed period starts at the stored `next_billing_date`, or today for a
/// plan that was never billed. Only one interval is advanced per run, so a plan
/// that is several cycles behind catches up one invoice per run.
pub fn build_cycle(plan: &DuePlayerPlan, today: NaiveDate) -> Result<BillingCycle, String> {
    let period_start = plan.next_billing_date.unwrap_or(today);
    let anchor_day = plan
        .billing_anchor_day
        .and_then(|d| u32::try_from(d).ok())
        .unwrap_or_else(|| period_start.day());

    let next_billing_date = plan
        .interval
        .advance(period_start, anchor_day)
        .ok_or_else(|| format!("next billing date after {} is out of range", period_start))?;

    let amount = format!(
        "{} {}",
        format_cents(plan.price_cents),
        plan.currency.to_uppercase()
    );

    Ok(BillingCycle {
        player_plan_id: plan.player_plan_id,
        club_id: plan.club_id,
        player_id: plan.player_id,
        user_id: plan.user_id,
        expected_next_billing_date: plan.next_billing_date,
        billing_period_start: period_start,
        next_billing_date,
        billing_anchor_day: anchor_day as i16,
        billed_on: today,
        amount_cents: plan.price_cents,
        description: format!(
            "{} ({} fee, period starting {})",
            plan.plan_name, plan.interval, period_start
        ),
        notification: CreateNotificationInput {
            user_id: plan.user_id,
            title: "New payment due".to_string(),
            message: format!(
                "A payment of {} for {} is due on {}.",
                amount, plan.plan_name, today
            ),
            notification_type: NotificationType::Payment,
            action_url: Some("/payments".to_string()),
        },
    })
}

// ============================================================================
// Use Cases
// ============================================================================

pub struct RecurringBillingUseCases {
    billing_repo: Arc<dyn RecurringBillingRepoTrait>,
    payment_repo: Arc<dyn PaymentRepoTrait>,
    clock: Arc<dyn Clock>,
    overdue_grace_days: u32,
    // Serializes runs inside this process (scheduler tick vs. manual trigger).
    run_lock: tokio::sync::Mutex<()>,
    last_report: Mutex<Option<BillingRunReport>>,
}

impl RecurringBillingUseCases {
    pub fn new(
        billing_repo: Arc<dyn RecurringBillingRepoTrait>,
        payment_repo: Arc<dyn PaymentRepoTrait>,
        clock: Arc<dyn Clock>,
        overdue_grace_days: u32,
    ) -> Self {
        Self {
            billing_repo,
            payment_repo,
            clock,
            overdue_grace_days,
            run_lock: tokio::sync::Mutex::new(()),
            last_report: Mutex::new(None),
        }
    }

    /// Bill every due player plan once.
    ///
    /// Errors only if the due plans cannot be listed. Per-plan failures are in
    /// the report.
    #[instrument(skip(self))]
    pub async fn process_recurring_payments(&self) -> AppResult<BillingRunReport> {
        let _running = self.run_lock.lock().await;
        let today = self.clock.today();

        let due = self.billing_repo.list_due(today).await?;
        let mut results = Vec::with_capacity(due.len());

        for plan in &due {
            let outcome = self.bill_one(plan, today).await;
            match &outcome {
                PlanBillingOutcome::Billed {
                    payment_id,
                    next_billing_date,
                    ..
                } => {
                    info!(
                        player_plan_id = %plan.player_plan_id,
                        payment_id = %payment_id,
                        next_billing_date = %next_billing_date,
                        "Player plan billed"
                    );
                }
                PlanBillingOutcome::AlreadyBilled => {
                    warn!(
                        player_plan_id = %plan.player_plan_id,
                        "Billing cycle already committed elsewhere, skipping"
                    );
                }
                PlanBillingOutcome::Failed { reason } => {
                    error!(
                        player_plan_id = %plan.player_plan_id,
                        reason = %reason,
                        "Failed to bill player plan"
                    );
                }
            }
            results.push(PlanBillingResult {
                player_plan_id: plan.player_plan_id,
                club_id: plan.club_id,
                outcome,
            });
        }

        let report = BillingRunReport {
            run_date: today,
            results,
        };

        info!(
            run_date = %report.run_date,
            due = due.len(),
            billed = report.billed(),
            already_billed = report.already_billed(),
            failed = report.failed(),
            "Recurring billing run finished"
        );

        *self
            .last_report
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(report.clone());

        Ok(report)
    }

    async fn bill_one(&self, plan: &DuePlayerPlan, today: NaiveDate) -> PlanBillingOutcome {
        let cycle = match build_cycle(plan, today) {
            Ok(cycle) => cycle,
            Err(reason) => return PlanBillingOutcome::Failed { reason },
        };

        match self.billing_repo.commit_cycle(&cycle).await {
            Ok(CycleCommit::Committed { payment_id }) => PlanBillingOutcome::Billed {
                payment_id,
                billing_period_start: cycle.billing_period_start,
                next_billing_date: cycle.next_billing_date,
            },
            Ok(CycleCommit::AlreadyBilled) => PlanBillingOutcome::AlreadyBilled,
            Err(e) => PlanBillingOutcome::Failed {
                reason: e.to_string(),
            },
        }
    }

    /// Mark pending payments more than `overdue_grace_days` past due as overdue.
    #[instrument(skip(self))]
    pub async fn mark_overdue_payments(&self) -> AppResult<u64> {
        let today = self.clock.today();
        let cutoff = today
            .checked_sub_days(Days::new(u64::from(self.overdue_grace_days)))
            .ok_or_else(|| AppError::Internal("overdue cutoff out of range".into()))?;

        let count = self.payment_repo.mark_overdue(cutoff).await?;
        if count > 0 {
            info!(count, %cutoff, "Marked payments as overdue");
        }
        Ok(count)
    }

    /// Report of the most recent completed run in this process.
    pub fn last_report(&self) -> Option<BillingRunReport> {
        self.last_report
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}
