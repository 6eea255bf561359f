// Scheduler engine: runs the daily bundle and recurring task passes

use super::service::SchedulingService;
use crate::dates::{add_days, local_date};
use crate::errors::EngineError;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex};
use tokio::time::interval;
use tracing::{debug, error, info, instrument};

/// Configuration for the scheduler
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// How often to check whether the calendar day has changed (in seconds)
    pub poll_interval_seconds: u64,
    /// Zone whose calendar decides what "today" is
    pub timezone: Tz,
    /// Days after today to pre-generate recurring tasks for
    pub recurring_lookahead_days: u32,
    /// Run the pass for today immediately on start
    pub run_on_startup: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            poll_interval_seconds: 60,
            timezone: Tz::UTC,
            recurring_lookahead_days: 7,
            run_on_startup: true,
        }
    }
}

/// What one daily pass produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyRunSummary {
    pub date: NaiveDate,
    pub bundles_created: usize,
    pub bundles_skipped: usize,
    pub recurring_generated: usize,
    pub recurring_skipped: usize,
}

#[async_trait]
pub trait Scheduler: Send + Sync {
    /// Start the polling loop; returns once a shutdown is requested
    async fn start(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Request the polling loop to stop
    async fn stop(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Run both passes for one calendar day
    async fn run_for_date(&self, today: NaiveDate) -> Result<DailyRunSummary, EngineError>;
}

/// A day is due when nothing ran yet or the last run was on an earlier day
pub fn is_due(last_run: Option<NaiveDate>, today: NaiveDate) -> bool {
    last_run.map_or(true, |last| last < today)
}

pub struct SchedulerEngine {
    config: SchedulerConfig,
    service: SchedulingService,
    last_run: Mutex<Option<NaiveDate>>,
    shutdown_tx: broadcast::Sender<()>,
}

impl SchedulerEngine {
    pub fn new(config: SchedulerConfig, service: SchedulingService) -> Self {
        let (shutdown_tx, _shutdown_rx) = broadcast::channel(1);

        Self {
            config,
            service,
            last_run: Mutex::new(None),
            shutdown_tx,
        }
    }

    pub fn shutdown_receiver(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    pub async fn last_run(&self) -> Option<NaiveDate> {
        *self.last_run.lock().await
    }

    /// Run the daily pass if the local day at `now` has not been handled yet
    ///
    /// A failed pass leaves the day unmarked so the next tick retries it.
    #[instrument(skip(self))]
    pub async fn tick(&self, now: DateTime<Utc>) -> Result<Option<DailyRunSummary>, EngineError> {
        let today = local_date(now, self.config.timezone);
        let mut last_run = self.last_run.lock().await;

        if !is_due(*last_run, today) {
            debug!(today = %today, "Daily pass already done");
            return Ok(None);
        }

        let summary = self.run_for_date(today).await?;
        *last_run = Some(today);
        Ok(Some(summary))
    }
}

#[async_trait]
impl Scheduler for SchedulerEngine {
    #[instrument(skip(self))]
    async fn start(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        info!(
            poll_interval_seconds = self.config.poll_interval_seconds,
            timezone = %self.config.timezone,
            "Starting scheduler engine"
        );

        let mut poll_interval = interval(Duration::from_secs(self.config.poll_interval_seconds));
        let mut shutdown_rx = self.shutdown_receiver();

        // The first interval tick completes immediately
        if !self.config.run_on_startup {
            poll_interval.tick().await;
            *self.last_run.lock().await = Some(local_date(Utc::now(), self.config.timezone));
        }

        loop {
            tokio::select! {
                _ = poll_interval.tick() => {
                    match self.tick(Utc::now()).await {
                        Ok(Some(summary)) => info!(?summary, "Daily pass finished"),
                        Ok(None) => {}
                        Err(e) => error!(error = %e, kind = e.kind().as_str(), "Daily pass failed"),
                    }
                }
                _ = shutdown_rx.recv() => {
                    info!("Shutdown signal received, stopping scheduler");
                    break;
                }
            }
        }

        info!("Scheduler engine stopped");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn stop(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        info!("Stopping scheduler engine");
        let _ = self.shutdown_tx.send(());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn run_for_date(&self, today: NaiveDate) -> Result<DailyRunSummary, EngineError> {
        let cron = self.service.run_cron(today).await?;

        let horizon = add_days(today, i64::from(self.config.recurring_lookahead_days))?;
        let recurring = self.service.generate_recurring_tasks(today, horizon).await?;

        Ok(DailyRunSummary {
            date: today,
            bundles_created: cron.created.len(),
            bundles_skipped: cron.skipped,
            recurring_generated: recurring.generated.len(),
            recurring_skipped: recurring.skipped,
        })
    }
}
