use dotenvy::dotenv;
use tracing::info;

use clubhub::infra::{
    app::create_app,
    billing_scheduler::BillingScheduler,
    config::AppConfig,
    error::InfraError,
    setup::{init_app_state, init_tracing},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = AppConfig::from_env();
    init_tracing(config.log_format);

    let app_state = init_app_state(config).await?;

    let bind_addr = app_state.config.bind_addr;

    let app = create_app(app_state.clone());

    // Spawn the billing scheduler (after tracing is initialized)
    let scheduler = if app_state.config.billing_enabled {
        Some(BillingScheduler::spawn(
            app_state.billing_use_cases.clone(),
            app_state.config.billing_interval,
        ))
    } else {
        info!("Billing scheduler disabled (BILLING_ENABLED=false)");
        None
    };

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(InfraError::TcpBind)?;

    info!("Backend listening at {}", &listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(InfraError::Server)?;

    if let Some(scheduler) = scheduler {
        scheduler.shutdown().await;
    }

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
