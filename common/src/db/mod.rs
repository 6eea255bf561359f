// Database layer module

pub mod pool;
pub mod repositories;

pub use pool::DbPool;

use crate::storage::Stores;
use repositories::{
    BundleRepository, NotificationRepository, RecurringConfigRepository, TaskRepository,
    TemplateRepository,
};
use std::sync::Arc;

/// Wire every storage contract to its PostgreSQL repository
pub fn postgres_stores(pool: DbPool) -> Stores {
    Stores {
        templates: Arc::new(TemplateRepository::new(pool.clone())),
        bundles: Arc::new(BundleRepository::new(pool.clone())),
        tasks: Arc::new(TaskRepository::new(pool.clone())),
        recurring: Arc::new(RecurringConfigRepository::new(pool.clone())),
        notifications: Arc::new(NotificationRepository::new(pool)),
    }
}
