// Repository layer for database operations
//
// Each repository implements one of the storage contracts on top of the
// shared PostgreSQL pool.

pub mod bundle;
pub mod notification;
pub mod queries;
pub mod recurring;
pub mod task;
pub mod template;

pub use bundle::BundleRepository;
pub use notification::NotificationRepository;
pub use recurring::RecurringConfigRepository;
pub use task::TaskRepository;
pub use template::TemplateRepository;

use crate::errors::StorageError;
use std::str::FromStr;

/// Parse a TEXT column holding an enum value
pub(crate) fn parse_column<T>(column: &str, value: &str) -> Result<T, StorageError>
where
    T: FromStr<Err = String>,
{
    value
        .parse()
        .map_err(|e| StorageError::InvalidData(format!("{}: {}", column, e)))
}
