//! Invitation lifecycle service.
//!
//! Orchestrates issuance, verification and consumption on top of the
//! repositories and the pure resolution logic in the domain crate.

use chrono::Utc;
use sqlx::PgPool;
use thiserror::Error;
use tracing::{error, info, warn};

use domain::models::invitation::{
    invitation_link, Invitation, VerificationStatus, VerifyInvitationResponse,
};
use domain::models::user::{User, UserRole};
use domain::services::invitation::{resolve, TokenVerification};
use persistence::repositories::{InvitationRepository, UserRepository};
use shared::password::{hash_password, PasswordError};
use shared::token::{generate_invitation_token, is_token_shaped};
use uuid::Uuid;

use crate::middleware::metrics::{
    record_invitation_consume_failure, record_invitation_consumed, record_invitation_issued,
    record_user_registered,
};

/// Errors from invitation consumption.
#[derive(Debug, Error)]
pub enum ConsumeError {
    /// The token did not resolve to a consumable invitation.
    #[error("Invitation is not valid: {0:?}")]
    InvalidToken(VerificationStatus),

    #[error("Password does not meet requirements: {0}")]
    WeakPassword(String),

    #[error("Email already registered")]
    EmailAlreadyExists,

    #[error("Password error: {0}")]
    Password(#[from] PasswordError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Invitation lifecycle service.
#[derive(Clone)]
pub struct InvitationService {
    pool: PgPool,
}

impl InvitationService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Issues an invitation and returns it with its shareable link.
    ///
    /// The expiry is computed here, not in SQL, so that
    /// `expires_at - created_at` is exactly the validity window.
    pub async fn issue(
        &self,
        email: &str,
        role: UserRole,
        created_by: Uuid,
        base_url: &str,
    ) -> Result<(Invitation, String), sqlx::Error> {
        let repo = InvitationRepository::new(self.pool.clone());

        let token = generate_invitation_token();
        let created_at = Utc::now();
        let expires_at = Invitation::expiry_for(created_at);

        let entity = repo
            .create(email, &token, role.as_str(), created_by, created_at, expires_at)
            .await?;

        record_invitation_issued();

        let invitation: Invitation = entity.into();
        let url = invitation_link(base_url, &invitation.token);

        info!(
            invitation_id = %invitation.id,
            email = %invitation.email,
            role = %invitation.role,
            created_by = %created_by,
            "Invitation issued"
        );

        Ok((invitation, url))
    }

    /// Verifies a token. Pure read, no state change.
    ///
    /// An empty or malformed token cannot correspond to any stored
    /// invitation, so it resolves to `not_found` without a database query.
    pub async fn verify(&self, token: &str) -> Result<VerifyInvitationResponse, sqlx::Error> {
        if !is_token_shaped(token) {
            return Ok(TokenVerification::NotFound.into_response());
        }

        let repo = InvitationRepository::new(self.pool.clone());
        let record = repo.find_by_token(token).await?.map(Invitation::from);

        Ok(resolve(record.as_ref(), Utc::now()).into_response())
    }

    /// Consumes an invitation: re-verifies the token, creates the account,
    /// then marks the invitation used.
    ///
    /// Account creation comes first. If it fails, the invitation stays
    /// unused and the recipient can retry. If marking used fails after the
    /// account exists, the failure is logged and counted but registration
    /// still succeeds; there is no compensating rollback.
    pub async fn consume(&self, token: &str, password: &str) -> Result<User, ConsumeError> {
        let invitation_repo = InvitationRepository::new(self.pool.clone());
        let user_repo = UserRepository::new(self.pool.clone());

        let record = if is_token_shaped(token) {
            invitation_repo.find_by_token(token).await?.map(Invitation::from)
        } else {
            None
        };

        let invitation = match resolve(record.as_ref(), Utc::now()) {
            TokenVerification::Valid(inv) => inv,
            TokenVerification::NotFound => {
                return Err(ConsumeError::InvalidToken(VerificationStatus::NotFound))
            }
            TokenVerification::AlreadyUsed => {
                return Err(ConsumeError::InvalidToken(VerificationStatus::AlreadyUsed))
            }
            TokenVerification::Expired => {
                return Err(ConsumeError::InvalidToken(VerificationStatus::Expired))
            }
        };

        shared::validation::validate_password_strength(password)
            .map_err(|e| ConsumeError::WeakPassword(e.to_string()))?;

        let password_hash = hash_password(password)?;

        let email = invitation.email.to_lowercase();
        let user = user_repo
            .create_with_profile(&email, &password_hash, invitation.role.as_str())
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
                    ConsumeError::EmailAlreadyExists
                }
                _ => ConsumeError::Database(e),
            })?;

        record_user_registered();

        match invitation_repo.mark_used(invitation.id).await {
            Ok(true) => {
                record_invitation_consumed();
                info!(
                    invitation_id = %invitation.id,
                    user_id = %user.id,
                    "Invitation consumed"
                );
            }
            Ok(false) => {
                // Lost a race with a concurrent consumption. The account was
                // still created; the email uniqueness constraint stops a
                // duplicate.
                record_invitation_consume_failure();
                warn!(
                    invitation_id = %invitation.id,
                    user_id = %user.id,
                    "Invitation was already marked used"
                );
            }
            Err(e) => {
                record_invitation_consume_failure();
                error!(
                    invitation_id = %invitation.id,
                    user_id = %user.id,
                    error = %e,
                    "Failed to mark invitation used after account creation"
                );
            }
        }

        Ok(user.into())
    }
}

#[cfg(test)]
mod tests {
    // Note: InvitationService requires a database connection and is covered
    // by integration tests. The resolution logic it delegates to is unit
    // tested in the domain crate.
}
