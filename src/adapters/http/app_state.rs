use std::sync::Arc;

use crate::{
    infra::config::AppConfig,
    use_cases::{
        notification::NotificationUseCases, payment::PaymentUseCases, plan::PlanUseCases,
        player_plan::PlayerPlanUseCases, recurring_billing::RecurringBillingUseCases,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub plan_use_cases: Arc<PlanUseCases>,
    pub player_plan_use_cases: Arc<PlayerPlanUseCases>,
    pub payment_use_cases: Arc<PaymentUseCases>,
    pub notification_use_cases: Arc<NotificationUseCases>,
    pub billing_use_cases: Arc<RecurringBillingUseCases>,
}
