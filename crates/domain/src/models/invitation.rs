//! Invitation domain models.
//!
//! Invitations gate account creation: an administrator issues an invitation
//! for an email address, the recipient follows the link, and registration
//! consumes the invitation exactly once.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::user::UserRole;

/// How long an invitation stays valid after issuance.
pub const INVITATION_VALIDITY_DAYS: i64 = 7;

/// Represents an issued invitation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Invitation {
    pub id: Uuid,
    pub email: String,
    pub token: String,
    pub role: UserRole,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub used: bool,
}

impl Invitation {
    /// Expiry is exactly the validity window past issuance.
    pub fn expiry_for(created_at: DateTime<Utc>) -> DateTime<Utc> {
        created_at + Duration::days(INVITATION_VALIDITY_DAYS)
    }
}

/// Request to issue an invitation. Administrator-only.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateInvitationRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    /// Role granted on registration. Defaults to member.
    pub role: Option<UserRole>,
}

/// Response after issuing an invitation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct CreateInvitationResponse {
    pub id: Uuid,
    pub email: String,
    pub token: String,
    pub role: UserRole,
    pub expires_at: DateTime<Utc>,
    pub invitation_url: String,
}

/// Builds the shareable link a recipient follows to register.
pub fn invitation_link(base_url: &str, token: &str) -> String {
    format!("{}/login?token={}", base_url.trim_end_matches('/'), token)
}

/// Invitation as returned by the admin listing. Token included so an
/// administrator can re-send a link that was lost.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct InvitationSummary {
    pub id: Uuid,
    pub email: String,
    pub token: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub used: bool,
}

impl From<Invitation> for InvitationSummary {
    fn from(inv: Invitation) -> Self {
        Self {
            id: inv.id,
            email: inv.email,
            token: inv.token,
            role: inv.role,
            created_at: inv.created_at,
            expires_at: inv.expires_at,
            used: inv.used,
        }
    }
}

/// Response for listing invitations.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ListInvitationsResponse {
    pub data: Vec<InvitationSummary>,
}

/// Outcome of token verification, serialized with a discriminant `status`
/// field so clients can branch without inspecting optional fields.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct VerifyInvitationResponse {
    pub status: VerificationStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    Valid,
    NotFound,
    AlreadyUsed,
    Expired,
}
