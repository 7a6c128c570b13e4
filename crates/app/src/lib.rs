//! FreshGuard application wiring: configuration, demo data and a logging
//! notification scheduler.

pub mod config;
pub mod demo;
pub mod scheduler;

pub use config::AppConfig;
pub use scheduler::LoggingScheduler;
