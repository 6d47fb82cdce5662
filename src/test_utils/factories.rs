//! Test data factories for creating valid test fixtures.
//!
//! Each factory function creates a complete, valid object with sensible defaults.
//! Use the closure parameter to override specific fields as needed.

use chrono::{NaiveDate, NaiveDateTime};
use uuid::Uuid;

use crate::{
    actor::Actor,
    domain::entities::{
        billing_interval::BillingInterval, notification_type::NotificationType,
        payment_status::PaymentStatus, payment_type::PaymentType, role::Role,
    },
    use_cases::{
        notification::CreateNotificationInput, payment::PaymentProfile, plan::PlanProfile,
        player_plan::{PlayerPlanProfile, PlayerProfile},
    },
};

/// Create an authenticated actor in a fresh club.
pub fn create_test_actor(role: Role, overrides: impl FnOnce(&mut Actor)) -> Actor {
    let mut actor = Actor {
        user_id: Uuid::new_v4(),
        club_id: Uuid::new_v4(),
        role,
    };
    overrides(&mut actor);
    actor
}

/// Create a test plan with sensible defaults (monthly, 45.00 USD, active).
pub fn create_test_plan(club_id: Uuid, overrides: impl FnOnce(&mut PlanProfile)) -> PlanProfile {
    let mut plan = PlanProfile {
        id: Uuid::new_v4(),
        club_id,
        name: "U12 Monthly".to_string(),
        description: Some("Two training sessions a week".to_string()),
        price_cents: 4500,
        currency: "usd".to_string(),
        interval: BillingInterval::Month,
        is_active: true,
        created_at: Some(test_datetime()),
        updated_at: Some(test_datetime()),
    };
    overrides(&mut plan);
    plan
}

/// Create a test player managed by `user_id`.
pub fn create_test_player(
    club_id: Uuid,
    user_id: Uuid,
    overrides: impl FnOnce(&mut PlayerProfile),
) -> PlayerProfile {
    let mut player = PlayerProfile {
        id: Uuid::new_v4(),
        club_id,
        user_id,
        first_name: "Alex".to_string(),
        last_name: "Morgan".to_string(),
    };
    overrides(&mut player);
    player
}

/// Create an active player plan, due on 2026-03-01 and anchored on the 1st.
pub fn create_test_player_plan(
    plan: &PlanProfile,
    player: &PlayerProfile,
    overrides: impl FnOnce(&mut PlayerPlanProfile),
) -> PlayerPlanProfile {
    let mut player_plan = PlayerPlanProfile {
        id: Uuid::new_v4(),
        plan_id: plan.id,
        player_id: player.id,
        user_id: player.user_id,
        club_id: plan.club_id,
        start_date: test_date(2026, 3, 1),
        last_billing_date: None,
        next_billing_date: Some(test_date(2026, 3, 1)),
        billing_anchor_day: Some(1),
        is_active: true,
        canceled_at: None,
        created_at: Some(test_datetime()),
        updated_at: Some(test_datetime()),
    };
    overrides(&mut player_plan);
    player_plan
}

/// Create a pending one-off payment for a player.
pub fn create_test_payment(
    player: &PlayerProfile,
    overrides: impl FnOnce(&mut PaymentProfile),
) -> PaymentProfile {
    let mut payment = PaymentProfile {
        id: Uuid::new_v4(),
        club_id: player.club_id,
        player_id: player.id,
        user_id: player.user_id,
        player_plan_id: None,
        billing_period_start: None,
        amount_cents: 2500,
        payment_type: PaymentType::OneOff,
        payment_status: PaymentStatus::Pending,
        description: "Kit fee".to_string(),
        due_date: test_date(2026, 3, 1),
        paid_at: None,
        created_at: Some(test_datetime()),
        updated_at: Some(test_datetime()),
    };
    overrides(&mut payment);
    payment
}

pub fn create_test_notification_input(
    user_id: Uuid,
    overrides: impl FnOnce(&mut CreateNotificationInput),
) -> CreateNotificationInput {
    let mut input = CreateNotificationInput {
        user_id,
        title: "Training moved".to_string(),
        message: "Thursday training starts at 18:00.".to_string(),
        notification_type: NotificationType::General,
        action_url: None,
    };
    overrides(&mut input);
    input
}

pub fn test_date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
}

/// A fixed datetime for deterministic tests.
pub fn test_datetime() -> NaiveDateTime {
    test_date(2026, 1, 1)
        .and_hms_opt(12, 0, 0)
        .expect("valid test time")
}
