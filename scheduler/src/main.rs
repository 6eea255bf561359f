// Scheduler binary entry point
//
// Runs the daily pass: automatic bundles for today, then recurring tasks for
// the configured lookahead window.

use anyhow::Context;
use common::config::Settings;
use common::db::{postgres_stores, DbPool};
use common::scheduler::{Scheduler, SchedulerConfig, SchedulerEngine, SchedulingService};
use common::telemetry;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("Failed to load configuration")?;
    settings
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;

    telemetry::init_logging(
        &settings.observability.log_level,
        settings.observability.tracing_endpoint.as_deref(),
    )?;
    telemetry::init_metrics(settings.observability.metrics_port)?;

    info!(
        timezone = %settings.scheduler.timezone,
        poll_interval_seconds = settings.scheduler.poll_interval_seconds,
        recurring_lookahead_days = settings.scheduler.recurring_lookahead_days,
        "Starting Cadence scheduler"
    );

    let db_pool = DbPool::new(&settings.database).await.map_err(|e| {
        error!(error = %e, "Failed to initialize database pool");
        e
    })?;
    db_pool.migrate().await?;

    let service = SchedulingService::new(&postgres_stores(db_pool.clone()));

    let scheduler_config = SchedulerConfig {
        poll_interval_seconds: settings.scheduler.poll_interval_seconds,
        timezone: settings
            .scheduler
            .timezone()
            .map_err(|e| anyhow::anyhow!(e))?,
        recurring_lookahead_days: settings.scheduler.recurring_lookahead_days,
        run_on_startup: settings.scheduler.run_on_startup,
    };
    let scheduler = Arc::new(SchedulerEngine::new(scheduler_config, service));

    let scheduler_for_shutdown = scheduler.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for shutdown signal");
            return;
        }
        info!("Received Ctrl+C signal, initiating graceful shutdown");
        if let Err(e) = scheduler_for_shutdown.stop().await {
            error!(error = %e, "Error during scheduler shutdown");
        }
    });

    let result = scheduler.start().await;

    db_pool.close().await;
    telemetry::shutdown_tracer();

    result.map_err(|e| anyhow::anyhow!("Scheduler error: {}", e))?;
    info!("Scheduler stopped");
    Ok(())
}
