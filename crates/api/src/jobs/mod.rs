//! Background jobs.

pub mod activity_reminders;
pub mod pool_metrics;
pub mod scheduler;

pub use activity_reminders::ActivityReminderJob;
pub use pool_metrics::PoolMetricsJob;
pub use scheduler::JobScheduler;
