//! Background job scheduler and job implementations.

mod due_reminders;
mod pool_metrics;
mod scheduler;

pub use due_reminders::DueRemindersJob;
pub use pool_metrics::PoolMetricsJob;
pub use scheduler::{Job, JobFrequency, JobScheduler};
