//! Invitation token resolution.
//!
//! The storage lookup and the state decision are kept separate so the
//! decision logic stays pure and directly testable. `resolve` takes what
//! the repository found (or did not find) plus the current time and maps
//! it to a verification outcome.

use chrono::{DateTime, Utc};

use crate::models::invitation::{Invitation, VerificationStatus, VerifyInvitationResponse};

/// Outcome of resolving a token against a stored invitation.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenVerification {
    /// Token matches an unused, unexpired invitation.
    Valid(Invitation),
    /// No invitation carries this token.
    NotFound,
    /// The invitation was already consumed. Takes precedence over expiry.
    AlreadyUsed,
    /// The invitation's validity window has passed.
    Expired,
}

/// Maps a lookup result to a verification outcome.
///
/// A consumed invitation reports `AlreadyUsed` even when it has also
/// expired, so the caller always learns the more specific reason.
pub fn resolve(record: Option<&Invitation>, now: DateTime<Utc>) -> TokenVerification {
    match record {
        None => TokenVerification::NotFound,
        Some(inv) if inv.used => TokenVerification::AlreadyUsed,
        Some(inv) if inv.expires_at <= now => TokenVerification::Expired,
        Some(inv) => TokenVerification::Valid(inv.clone()),
    }
}

impl TokenVerification {
    /// Shapes the outcome for the verify endpoint. Only a valid token
    /// discloses the invitation's email, role and expiry.
    pub fn into_response(self) -> VerifyInvitationResponse {
        match self {
            TokenVerification::Valid(inv) => VerifyInvitationResponse {
                status: VerificationStatus::Valid,
                message: "Invitation is valid".to_string(),
                email: Some(inv.email),
                role: Some(inv.role),
                expires_at: Some(inv.expires_at),
            },
            TokenVerification::NotFound => {
                status_only(VerificationStatus::NotFound, "No invitation matches this token")
            }
            TokenVerification::AlreadyUsed => status_only(
                VerificationStatus::AlreadyUsed,
                "This invitation has already been used",
            ),
            TokenVerification::Expired => {
                status_only(VerificationStatus::Expired, "This invitation has expired")
            }
        }
    }
}

fn status_only(status: VerificationStatus, message: &str) -> VerifyInvitationResponse {
    VerifyInvitationResponse {
        status,
        message: message.to_string(),
        email: None,
        role: None,
        expires_at: None,
    }
}
