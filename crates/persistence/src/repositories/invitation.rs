//! Repository for invitation database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::InvitationEntity;
use crate::metrics::QueryTimer;

/// Repository for invitation operations.
#[derive(Clone)]
pub struct InvitationRepository {
    pool: PgPool,
}

impl InvitationRepository {
    /// Creates a new invitation repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates a new invitation.
    ///
    /// Both timestamps are bound explicitly so that
    /// `expires_at - created_at` is exactly the validity window.
    pub async fn create(
        &self,
        email: &str,
        token: &str,
        role: &str,
        created_by: Uuid,
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Result<InvitationEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_invitation");
        let result = sqlx::query_as::<_, InvitationEntity>(
            r#"
            INSERT INTO invitations (email, token, role, created_by, created_at, expires_at, used)
            VALUES ($1, $2, $3, $4, $5, $6, false)
            RETURNING id, email, token, role, created_by, created_at, expires_at, used
            "#,
        )
        .bind(email)
        .bind(token)
        .bind(role)
        .bind(created_by)
        .bind(created_at)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Finds an invitation by its token.
    ///
    /// Returns `None` if no invitation with the given token exists.
    pub async fn find_by_token(&self, token: &str) -> Result<Option<InvitationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_invitation_by_token");
        let result = sqlx::query_as::<_, InvitationEntity>(
            r#"
            SELECT id, email, token, role, created_by, created_at, expires_at, used
            FROM invitations
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Marks an invitation as consumed atomically.
    ///
    /// Uses `AND used = false` so two concurrent registrations cannot both
    /// consume the same invitation.
    ///
    /// Returns `true` if the invitation was marked, `false` if it was
    /// already consumed (race detected).
    pub async fn mark_used(&self, invitation_id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("mark_invitation_used");
        let result = sqlx::query(
            r#"
            UPDATE invitations
            SET used = true
            WHERE id = $1 AND used = false
            "#,
        )
        .bind(invitation_id)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected() > 0)
    }

    /// Lists invitations, newest first.
    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<InvitationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_invitations");
        let result = sqlx::query_as::<_, InvitationEntity>(
            r#"
            SELECT id, email, token, role, created_by, created_at, expires_at, used
            FROM invitations
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Deletes an invitation by ID.
    ///
    /// Returns true if an invitation was deleted.
    pub async fn delete(&self, invitation_id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_invitation");
        let result = sqlx::query(
            r#"
            DELETE FROM invitations
            WHERE id = $1
            "#,
        )
        .bind(invitation_id)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected() > 0)
    }

    /// Deletes unconsumed invitations that expired more than 7 days ago.
    ///
    /// Recently expired rows are retained so verification keeps answering
    /// `expired` rather than `not_found` in the window invitees actually
    /// retry in.
    ///
    /// Returns the number of deleted invitations.
    pub async fn delete_expired(&self) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_expired_invitations");
        let result = sqlx::query(
            r#"
            DELETE FROM invitations
            WHERE expires_at < NOW() - INTERVAL '7 days' AND used = false
            "#,
        )
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected())
    }
}
