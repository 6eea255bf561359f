use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use common::config::Settings;
use common::dates::local_date;
use common::db::DbPool;
use common::scheduler::SchedulingService;

/// Application state shared across all handlers
#[derive(Clone, Debug)]
pub struct AppState {
    pub service: SchedulingService,
    pub config: Arc<Settings>,
    /// Absent when the service runs over in-process stores
    pub db_pool: Option<DbPool>,
}

impl AppState {
    pub fn new(service: SchedulingService, config: Settings) -> Self {
        Self {
            service,
            config: Arc::new(config),
            db_pool: None,
        }
    }

    pub fn with_db_pool(mut self, db_pool: DbPool) -> Self {
        self.db_pool = Some(db_pool);
        self
    }

    /// Today's calendar date in the configured scheduler timezone
    ///
    /// Settings are validated at startup, so the UTC fallback only applies to
    /// hand-built states.
    pub fn today(&self) -> NaiveDate {
        let timezone = self.config.scheduler.timezone().unwrap_or(Tz::UTC);
        local_date(Utc::now(), timezone)
    }
}
