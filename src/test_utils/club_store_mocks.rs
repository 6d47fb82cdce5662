//! In-memory implementation of every repository trait.
//!
//! One store backs all traits so that a billing cycle can touch player plans,
//! payments and notifications under the same locks, mirroring the single
//! transaction the Postgres adapter uses.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    domain::entities::{payment_status::PaymentStatus, payment_type::PaymentType},
    use_cases::{
        notification::{CreateNotificationInput, NotificationProfile, NotificationRepoTrait},
        payment::{CreatePaymentInput, PaymentListFilters, PaymentProfile, PaymentRepoTrait},
        plan::{CreatePlanInput, PlanProfile, PlanRepoTrait},
        player_plan::{
            CreatePlayerPlanInput, PlayerPlanProfile, PlayerPlanRepoTrait, PlayerProfile,
            PlayerRepoTrait,
        },
        recurring_billing::{
            BillingCycle, CycleCommit, DuePlayerPlan, RecurringBillingRepoTrait,
        },
    },
};

fn now() -> chrono::NaiveDateTime {
    chrono::Utc::now().naive_utc()
}

// ============================================================================
// InMemoryClubStore
// ============================================================================

#[derive(Default)]
pub struct InMemoryClubStore {
    pub plans: Mutex<HashMap<Uuid, PlanProfile>>,
    pub players: Mutex<HashMap<Uuid, PlayerProfile>>,
    // Vecs keep insertion order for "newest first" listings
    pub player_plans: Mutex<Vec<PlayerPlanProfile>>,
    pub payments: Mutex<Vec<PaymentProfile>>,
    pub notifications: Mutex<Vec<NotificationProfile>>,
    failing_commits: Mutex<HashSet<Uuid>>,
    list_due_fails: AtomicBool,
    list_due_calls: Mutex<usize>,
}

impl InMemoryClubStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_plan(&self, plan: PlanProfile) -> PlanProfile {
        self.plans.lock().unwrap().insert(plan.id, plan.clone());
        plan
    }

    pub fn seed_player(&self, player: PlayerProfile) -> PlayerProfile {
        self.players.lock().unwrap().insert(player.id, player.clone());
        player
    }

    pub fn seed_player_plan(&self, player_plan: PlayerPlanProfile) -> PlayerPlanProfile {
        self.player_plans.lock().unwrap().push(player_plan.clone());
        player_plan
    }

    pub fn seed_payment(&self, payment: PaymentProfile) -> PaymentProfile {
        self.payments.lock().unwrap().push(payment.clone());
        payment
    }

    pub fn seed_notification(&self, input: CreateNotificationInput) -> NotificationProfile {
        let notification = notification_from_input(&input);
        self.notifications.lock().unwrap().push(notification.clone());
        notification
    }

    /// Make `commit_cycle` fail for this player plan until cleared.
    pub fn fail_commit_for(&self, player_plan_id: Uuid) {
        self.failing_commits.lock().unwrap().insert(player_plan_id);
    }

    pub fn clear_commit_failures(&self) {
        self.failing_commits.lock().unwrap().clear();
    }

    pub fn fail_list_due(&self, fail: bool) {
        self.list_due_fails.store(fail, Ordering::SeqCst);
    }

    pub fn list_due_calls(&self) -> usize {
        *self.list_due_calls.lock().unwrap()
    }

    pub fn player_plan(&self, id: Uuid) -> PlayerPlanProfile {
        self.player_plans
            .lock()
            .unwrap()
            .iter()
            .find(|pp| pp.id == id)
            .cloned()
            .expect("player plan exists")
    }

    pub fn payment(&self, id: Uuid) -> PaymentProfile {
        self.payments
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .expect("payment exists")
    }

    pub fn payments_for_player_plan(&self, player_plan_id: Uuid) -> Vec<PaymentProfile> {
        self.payments
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.player_plan_id == Some(player_plan_id))
            .cloned()
            .collect()
    }

    /// In insertion order.
    pub fn notifications_for(&self, user_id: Uuid) -> Vec<NotificationProfile> {
        self.notifications
            .lock()
            .unwrap()
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect()
    }

    fn with_club(&self, mut player_plan: PlayerPlanProfile) -> PlayerPlanProfile {
        if let Some(plan) = self.plans.lock().unwrap().get(&player_plan.plan_id) {
            player_plan.club_id = plan.club_id;
        }
        player_plan
    }
}

fn notification_from_input(input: &CreateNotificationInput) -> NotificationProfile {
    NotificationProfile {
        id: Uuid::new_v4(),
        user_id: input.user_id,
        title: input.title.clone(),
        message: input.message.clone(),
        notification_type: input.notification_type,
        action_url: input.action_url.clone(),
        is_read: false,
        created_at: Some(now()),
    }
}

#[async_trait]
impl PlanRepoTrait for InMemoryClubStore {
    async fn create(&self, input: &CreatePlanInput) -> AppResult<PlanProfile> {
        let now = now();
        let plan = PlanProfile {
            id: Uuid::new_v4(),
            club_id: input.club_id,
            name: input.name.clone(),
            description: input.description.clone(),
            price_cents: input.price_cents,
            currency: input.currency.clone(),
            interval: input.interval,
            is_active: true,
            created_at: Some(now),
            updated_at: Some(now),
        };
        Ok(self.seed_plan(plan))
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<PlanProfile>> {
        Ok(self.plans.lock().unwrap().get(&id).cloned())
    }

    async fn list_by_club(
        &self,
        club_id: Uuid,
        include_inactive: bool,
    ) -> AppResult<Vec<PlanProfile>> {
        let mut plans: Vec<_> = self
            .plans
            .lock()
            .unwrap()
            .values()
            .filter(|p| p.club_id == club_id && (include_inactive || p.is_active))
            .cloned()
            .collect();
        plans.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(plans)
    }
}

#[async_trait]
impl PlayerRepoTrait for InMemoryClubStore {
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<PlayerProfile>> {
        Ok(self.players.lock().unwrap().get(&id).cloned())
    }
}

#[async_trait]
impl PlayerPlanRepoTrait for InMemoryClubStore {
    async fn create(&self, input: &CreatePlayerPlanInput) -> AppResult<PlayerPlanProfile> {
        let club_id = self
            .plans
            .lock()
            .unwrap()
            .get(&input.plan_id)
            .map(|p| p.club_id)
            .ok_or_else(|| AppError::InvalidInput("Referenced record not found".into()))?;

        let mut player_plans = self.player_plans.lock().unwrap();
        // Mirrors player_plans_one_active_idx
        if player_plans
            .iter()
            .any(|pp| pp.is_active && pp.plan_id == input.plan_id && pp.player_id == input.player_id)
        {
            return Err(AppError::Conflict(
                "A record with this value already exists".into(),
            ));
        }

        let now = now();
        let player_plan = PlayerPlanProfile {
            id: Uuid::new_v4(),
            plan_id: input.plan_id,
            player_id: input.player_id,
            user_id: input.user_id,
            club_id,
            start_date: input.start_date,
            last_billing_date: None,
            next_billing_date: Some(input.next_billing_date),
            billing_anchor_day: Some(input.billing_anchor_day),
            is_active: true,
            canceled_at: None,
            created_at: Some(now),
            updated_at: Some(now),
        };
        player_plans.push(player_plan.clone());
        Ok(player_plan)
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<PlayerPlanProfile>> {
        let found = self
            .player_plans
            .lock()
            .unwrap()
            .iter()
            .find(|pp| pp.id == id)
            .cloned();
        Ok(found.map(|pp| self.with_club(pp)))
    }

    async fn find_active(
        &self,
        plan_id: Uuid,
        player_id: Uuid,
    ) -> AppResult<Option<PlayerPlanProfile>> {
        Ok(self
            .player_plans
            .lock()
            .unwrap()
            .iter()
            .find(|pp| pp.is_active && pp.plan_id == plan_id && pp.player_id == player_id)
            .cloned())
    }

    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<PlayerPlanProfile>> {
        Ok(self
            .player_plans
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|pp| pp.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn list_by_club(&self, club_id: Uuid) -> AppResult<Vec<PlayerPlanProfile>> {
        Ok(self
            .player_plans
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|pp| pp.club_id == club_id)
            .cloned()
            .collect())
    }

    async fn deactivate(&self, id: Uuid) -> AppResult<PlayerPlanProfile> {
        let mut player_plans = self.player_plans.lock().unwrap();
        let pp = player_plans
            .iter_mut()
            .find(|pp| pp.id == id)
            .ok_or(AppError::NotFound)?;
        if pp.is_active {
            let now = now();
            pp.is_active = false;
            pp.canceled_at = Some(now);
            pp.updated_at = Some(now);
        }
        Ok(pp.clone())
    }
}

#[async_trait]
impl PaymentRepoTrait for InMemoryClubStore {
    async fn create(&self, input: &CreatePaymentInput) -> AppResult<PaymentProfile> {
        let now = now();
        let payment = PaymentProfile {
            id: Uuid::new_v4(),
            club_id: input.club_id,
            player_id: input.player_id,
            user_id: input.user_id,
            player_plan_id: input.player_plan_id,
            billing_period_start: input.billing_period_start,
            amount_cents: input.amount_cents,
            payment_type: input.payment_type,
            payment_status: PaymentStatus::Pending,
            description: input.description.clone(),
            due_date: input.due_date,
            paid_at: None,
            created_at: Some(now),
            updated_at: Some(now),
        };
        Ok(self.seed_payment(payment))
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<PaymentProfile>> {
        Ok(self
            .payments
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }

    async fn list(&self, filters: &PaymentListFilters) -> AppResult<Vec<PaymentProfile>> {
        let mut payments: Vec<_> = self
            .payments
            .lock()
            .unwrap()
            .iter()
            .filter(|p| filters.club_id.is_none_or(|c| p.club_id == c))
            .filter(|p| filters.user_id.is_none_or(|u| p.user_id == u))
            .filter(|p| filters.status.is_none_or(|s| p.payment_status == s))
            .cloned()
            .collect();
        payments.sort_by(|a, b| b.due_date.cmp(&a.due_date));
        Ok(payments)
    }

    async fn mark_paid(&self, id: Uuid) -> AppResult<PaymentProfile> {
        let mut payments = self.payments.lock().unwrap();
        let payment = payments
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(AppError::NotFound)?;
        if !payment.payment_status.is_terminal() {
            let now = now();
            payment.payment_status = PaymentStatus::Paid;
            payment.paid_at = Some(now);
            payment.updated_at = Some(now);
        }
        Ok(payment.clone())
    }

    async fn mark_overdue(&self, due_before: NaiveDate) -> AppResult<u64> {
        let mut count = 0;
        for payment in self.payments.lock().unwrap().iter_mut() {
            if payment.payment_status == PaymentStatus::Pending && payment.due_date < due_before {
                payment.payment_status = PaymentStatus::Overdue;
                payment.updated_at = Some(now());
                count += 1;
            }
        }
        Ok(count)
    }
}

#[async_trait]
impl NotificationRepoTrait for InMemoryClubStore {
    async fn create(&self, input: &CreateNotificationInput) -> AppResult<NotificationProfile> {
        Ok(self.seed_notification(input.clone()))
    }

    async fn list_by_user(
        &self,
        user_id: Uuid,
        unread_only: bool,
        limit: i64,
    ) -> AppResult<Vec<NotificationProfile>> {
        Ok(self
            .notifications
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|n| n.user_id == user_id && (!unread_only || !n.is_read))
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn mark_read(&self, id: Uuid, user_id: Uuid) -> AppResult<bool> {
        let mut notifications = self.notifications.lock().unwrap();
        match notifications
            .iter_mut()
            .find(|n| n.id == id && n.user_id == user_id)
        {
            Some(n) => {
                n.is_read = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn mark_all_read(&self, user_id: Uuid) -> AppResult<u64> {
        let mut count = 0;
        for n in self.notifications.lock().unwrap().iter_mut() {
            if n.user_id == user_id && !n.is_read {
                n.is_read = true;
                count += 1;
            }
        }
        Ok(count)
    }

    async fn count_unread(&self, user_id: Uuid) -> AppResult<i64> {
        Ok(self
            .notifications
            .lock()
            .unwrap()
            .iter()
            .filter(|n| n.user_id == user_id && !n.is_read)
            .count() as i64)
    }
}

#[async_trait]
impl RecurringBillingRepoTrait for InMemoryClubStore {
    async fn list_due(&self, today: NaiveDate) -> AppResult<Vec<DuePlayerPlan>> {
        *self.list_due_calls.lock().unwrap() += 1;
        if self.list_due_fails.load(Ordering::SeqCst) {
            return Err(AppError::Database("Database operation failed".into()));
        }

        let plans = self.plans.lock().unwrap();
        let mut due: Vec<DuePlayerPlan> = self
            .player_plans
            .lock()
            .unwrap()
            .iter()
            .filter(|pp| pp.is_active && pp.next_billing_date.is_none_or(|d| d <= today))
            .filter_map(|pp| {
                let plan = plans.get(&pp.plan_id)?;
                Some(DuePlayerPlan {
                    player_plan_id: pp.id,
                    plan_id: plan.id,
                    player_id: pp.player_id,
                    user_id: pp.user_id,
                    club_id: plan.club_id,
                    plan_name: plan.name.clone(),
                    price_cents: plan.price_cents,
                    currency: plan.currency.clone(),
                    interval: plan.interval,
                    next_billing_date: pp.next_billing_date,
                    billing_anchor_day: pp.billing_anchor_day,
                })
            })
            .collect();
        // NULLS FIRST, then by date; stable sort keeps insertion order within a date
        due.sort_by_key(|d| (d.next_billing_date.is_some(), d.next_billing_date));
        Ok(due)
    }

    async fn commit_cycle(&self, cycle: &BillingCycle) -> AppResult<CycleCommit> {
        if self
            .failing_commits
            .lock()
            .unwrap()
            .contains(&cycle.player_plan_id)
        {
            return Err(AppError::Database("Database operation failed".into()));
        }

        // Lock order: player_plans, payments, notifications
        let mut player_plans = self.player_plans.lock().unwrap();
        let mut payments = self.payments.lock().unwrap();
        let mut notifications = self.notifications.lock().unwrap();

        let Some(pp) = player_plans
            .iter_mut()
            .find(|pp| pp.id == cycle.player_plan_id)
        else {
            return Ok(CycleCommit::AlreadyBilled);
        };

        if !pp.is_active || pp.next_billing_date != cycle.expected_next_billing_date {
            return Ok(CycleCommit::AlreadyBilled);
        }

        if payments.iter().any(|p| {
            p.player_plan_id == Some(cycle.player_plan_id)
                && p.billing_period_start == Some(cycle.billing_period_start)
        }) {
            return Ok(CycleCommit::AlreadyBilled);
        }

        let now = now();
        pp.last_billing_date = Some(cycle.billed_on);
        pp.next_billing_date = Some(cycle.next_billing_date);
        pp.billing_anchor_day = pp.billing_anchor_day.or(Some(cycle.billing_anchor_day));
        pp.updated_at = Some(now);

        let payment_id = Uuid::new_v4();
        payments.push(PaymentProfile {
            id: payment_id,
            club_id: cycle.club_id,
            player_id: cycle.player_id,
            user_id: cycle.user_id,
            player_plan_id: Some(cycle.player_plan_id),
            billing_period_start: Some(cycle.billing_period_start),
            amount_cents: cycle.amount_cents,
            payment_type: PaymentType::MonthlyFee,
            payment_status: PaymentStatus::Pending,
            description: cycle.description.clone(),
            due_date: cycle.billed_on,
            paid_at: None,
            created_at: Some(now),
            updated_at: Some(now),
        });

        notifications.push(notification_from_input(&cycle.notification));

        Ok(CycleCommit::Committed { payment_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_plan, create_test_player, create_test_player_plan, test_date};
    use crate::use_cases::recurring_billing::build_cycle;

    #[tokio::test]
    async fn commit_cycle_rejects_stale_compare_and_swap() {
        let store = InMemoryClubStore::new();
        let club_id = Uuid::new_v4();
        let plan = store.seed_plan(create_test_plan(club_id, |_| {}));
        let player = store.seed_player(create_test_player(club_id, Uuid::new_v4(), |_| {}));
        let pp = store.seed_player_plan(create_test_player_plan(&plan, &player, |_| {}));

        let due = store.list_due(test_date(2026, 3, 1)).await.unwrap();
        assert_eq!(due.len(), 1);
        let cycle = build_cycle(&due[0], test_date(2026, 3, 1)).unwrap();

        assert!(matches!(
            store.commit_cycle(&cycle).await.unwrap(),
            CycleCommit::Committed { .. }
        ));
        assert_eq!(
            store.commit_cycle(&cycle).await.unwrap(),
            CycleCommit::AlreadyBilled
        );
        assert_eq!(store.payments_for_player_plan(pp.id).len(), 1);
        assert_eq!(store.notifications_for(player.user_id).len(), 1);
    }

    #[tokio::test]
    async fn list_due_orders_never_billed_first() {
        let store = InMemoryClubStore::new();
        let club_id = Uuid::new_v4();
        let plan = store.seed_plan(create_test_plan(club_id, |_| {}));
        let player = store.seed_player(create_test_player(club_id, Uuid::new_v4(), |_| {}));
        let dated = store.seed_player_plan(create_test_player_plan(&plan, &player, |pp| {
            pp.next_billing_date = Some(test_date(2026, 2, 1))
        }));
        let never = store.seed_player_plan(create_test_player_plan(&plan, &player, |pp| {
            pp.next_billing_date = None
        }));

        let due = store.list_due(test_date(2026, 3, 1)).await.unwrap();
        let ids: Vec<_> = due.iter().map(|d| d.player_plan_id).collect();
        assert_eq!(ids, vec![never.id, dated.id]);
        assert_eq!(store.list_due_calls(), 1);
    }
}
