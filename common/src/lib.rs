// Common library shared by the scheduler daemon and the API

pub mod config;
pub mod cron;
pub mod dates;
pub mod db;
pub mod errors;
pub mod models;
pub mod scheduler;
pub mod storage;
pub mod telemetry;
