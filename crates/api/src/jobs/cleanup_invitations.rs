//! Background job that purges stale, never-used invitations.
//!
//! Used invitations are kept for the audit trail. Expired unconsumed ones
//! are retained for a further 7 days before deletion, so a verify on a
//! recently expired token still reports `expired` instead of `not_found`.

use sqlx::PgPool;
use tracing::info;

use super::scheduler::{Job, JobFrequency};
use persistence::repositories::InvitationRepository;

pub struct CleanupInvitationsJob {
    pool: PgPool,
}

impl CleanupInvitationsJob {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl Job for CleanupInvitationsJob {
    fn name(&self) -> &'static str {
        "cleanup_invitations"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Hourly
    }

    async fn execute(&self) -> Result<(), String> {
        let repo = InvitationRepository::new(self.pool.clone());
        let deleted = repo
            .delete_expired()
            .await
            .map_err(|e| format!("Failed to delete expired invitations: {}", e))?;

        if deleted > 0 {
            info!(deleted, "Cleaned up expired invitations");
        }

        Ok(())
    }
}
