use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{error, info};

use crate::use_cases::recurring_billing::RecurringBillingUseCases;

/// Background task that bills due plans on a fixed period.
///
/// The first run starts as soon as the task is spawned. Ticks missed while a
/// run is still going are delayed rather than fired back to back.
pub struct BillingScheduler {
    shutdown_tx: watch::Sender<bool>,
    handle: Option<JoinHandle<()>>,
}

impl BillingScheduler {
    pub fn spawn(billing: Arc<RecurringBillingUseCases>, period: Duration) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(run_billing_loop(billing, period, shutdown_rx));
        Self {
            shutdown_tx,
            handle: Some(handle),
        }
    }

    /// Stop scheduling and wait for an in-flight run to finish.
    pub async fn shutdown(mut self) {
        let _ = self.shutdown_tx.send(true);
        if let Some(handle) = self.handle.take()
            && let Err(e) = handle.await
        {
            error!(error = %e, "Billing scheduler task panicked");
        }
    }
}

impl Drop for BillingScheduler {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(true);
    }
}

async fn run_billing_loop(
    billing: Arc<RecurringBillingUseCases>,
    period: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(
        "Billing scheduler started (running every {}s)",
        period.as_secs()
    );

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                run_once(&billing).await;
            }
            _ = shutdown_rx.changed() => {
                break;
            }
        }
    }

    info!("Billing scheduler stopped");
}

async fn run_once(billing: &RecurringBillingUseCases) {
    match billing.process_recurring_payments().await {
        Ok(report) => {
            if report.failed() > 0 {
                error!(
                    failed = report.failed(),
                    billed = report.billed(),
                    "Billing run finished with failures"
                );
            }
        }
        Err(e) => {
            error!(error = %e, "Billing run failed");
        }
    }

    if let Err(e) = billing.mark_overdue_payments().await {
        error!(error = %e, "Overdue sweep failed");
    }
}
