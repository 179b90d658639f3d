//! Invitation entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

use domain::models::invitation::Invitation;
use domain::models::user::UserRole;

/// Database row mapping for the invitations table.
#[derive(Debug, Clone, FromRow)]
pub struct InvitationEntity {
    pub id: Uuid,
    pub email: String,
    pub token: String,
    pub role: String,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub used: bool,
}

impl InvitationEntity {
    /// Check if this invitation is still consumable (not used, not expired).
    pub fn is_valid(&self) -> bool {
        !self.used && self.expires_at > Utc::now()
    }
}

impl From<InvitationEntity> for Invitation {
    fn from(entity: InvitationEntity) -> Self {
        Self {
            id: entity.id,
            email: entity.email,
            token: entity.token,
            role: UserRole::from_str(&entity.role).unwrap_or_default(),
            created_by: entity.created_by,
            created_at: entity.created_at,
            expires_at: entity.expires_at,
            used: entity.used,
        }
    }
}
