//! Background job scheduler and job implementations.

mod cleanup_invitations;
mod pool_metrics;
mod scheduler;

pub use cleanup_invitations::CleanupInvitationsJob;
pub use pool_metrics::PoolMetricsJob;
pub use scheduler::{Job, JobFrequency, JobScheduler};
