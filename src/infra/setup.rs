use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    adapters::http::app_state::AppState,
    infra::{
        clock::SystemClock,
        config::{AppConfig, LogFormat},
        db::run_migrations,
        error::InfraError,
        postgres_persistence,
    },
    ports::clock::Clock,
    use_cases::{
        notification::{NotificationRepoTrait, NotificationUseCases},
        payment::{PaymentRepoTrait, PaymentUseCases},
        plan::{PlanRepoTrait, PlanUseCases},
        player_plan::{PlayerPlanRepoTrait, PlayerPlanUseCases, PlayerRepoTrait},
        recurring_billing::{RecurringBillingRepoTrait, RecurringBillingUseCases},
    },
};

pub async fn init_app_state(config: AppConfig) -> Result<AppState, InfraError> {
    let postgres_arc =
        Arc::new(postgres_persistence(&config.database_url, config.db_max_connections).await?);
    run_migrations(postgres_arc.pool()).await?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let plan_repo_arc = postgres_arc.clone() as Arc<dyn PlanRepoTrait>;
    let player_repo_arc = postgres_arc.clone() as Arc<dyn PlayerRepoTrait>;
    let player_plan_repo_arc = postgres_arc.clone() as Arc<dyn PlayerPlanRepoTrait>;
    let payment_repo_arc = postgres_arc.clone() as Arc<dyn PaymentRepoTrait>;
    let notification_repo_arc = postgres_arc.clone() as Arc<dyn NotificationRepoTrait>;
    let billing_repo_arc = postgres_arc.clone() as Arc<dyn RecurringBillingRepoTrait>;

    let plan_use_cases = PlanUseCases::new(plan_repo_arc.clone());

    let player_plan_use_cases = PlayerPlanUseCases::new(
        player_plan_repo_arc,
        plan_repo_arc,
        player_repo_arc.clone(),
        clock.clone(),
    );

    let payment_use_cases = PaymentUseCases::new(
        payment_repo_arc.clone(),
        player_repo_arc,
        notification_repo_arc.clone(),
        clock.clone(),
    );

    let notification_use_cases = NotificationUseCases::new(notification_repo_arc);

    let billing_use_cases = RecurringBillingUseCases::new(
        billing_repo_arc,
        payment_repo_arc,
        clock,
        config.overdue_grace_days,
    );

    Ok(AppState {
        config: Arc::new(config),
        plan_use_cases: Arc::new(plan_use_cases),
        player_plan_use_cases: Arc::new(player_plan_use_cases),
        payment_use_cases: Arc::new(payment_use_cases),
        notification_use_cases: Arc::new(notification_use_cases),
        billing_use_cases: Arc::new(billing_use_cases),
    })
}

pub fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "clubhub=info,tower_http=info".into());

    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Pretty => {
            // Console (pretty logs)
            let console_layer = fmt::layer()
                .with_target(false) // don’t show target (module path)
                .with_level(true)
                .pretty();
            registry.with(console_layer).try_init().ok();
        }
        LogFormat::Json => {
            // Structured JSON logs for log shippers
            let json_layer = fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(true);
            registry.with(json_layer).try_init().ok();
        }
    }
}
