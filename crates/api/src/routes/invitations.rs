//! Invitation routes: admin issuance/listing/deletion and public token
//! verification.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;
use crate::routes::{require_admin, Pagination};
use crate::services::invitations::InvitationService;
use domain::models::invitation::{
    CreateInvitationRequest, CreateInvitationResponse, Invitation, InvitationSummary,
    ListInvitationsResponse, VerifyInvitationResponse,
};
use persistence::repositories::InvitationRepository;

/// Issue a new invitation.
///
/// POST /api/v1/admin/invitations
pub async fn create_invitation(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Json(request): Json<CreateInvitationRequest>,
) -> Result<(StatusCode, Json<CreateInvitationResponse>), ApiError> {
    require_admin(&state, user_auth.user_id).await?;
    request.validate()?;

    let role = request.role.unwrap_or_default();
    let service = InvitationService::new(state.pool.clone());

    let (invitation, invitation_url) = service
        .issue(
            &request.email,
            role,
            user_auth.user_id,
            &state.config.server.app_base_url,
        )
        .await?;

    // Email failure never rolls back the invitation; the link in the
    // response can still be shared out of band.
    if let Err(e) = state
        .email
        .send_invitation_email(&invitation.email, &invitation_url, invitation.role)
        .await
    {
        warn!(
            invitation_id = %invitation.id,
            email = %invitation.email,
            error = %e,
            "Failed to send invitation email"
        );
    }

    Ok((
        StatusCode::CREATED,
        Json(CreateInvitationResponse {
            id: invitation.id,
            email: invitation.email,
            token: invitation.token,
            role: invitation.role,
            expires_at: invitation.expires_at,
            invitation_url,
        }),
    ))
}

/// Query parameters for token verification.
#[derive(Debug, Deserialize)]
pub struct VerifyQuery {
    #[serde(default)]
    pub token: String,
}

/// Verify an invitation token.
///
/// GET /api/v1/invitations/verify?token=...
///
/// All four expected outcomes are 200 responses with a machine-readable
/// status; only a storage failure becomes a 500.
pub async fn verify_invitation(
    State(state): State<AppState>,
    Query(query): Query<VerifyQuery>,
) -> Result<Json<VerifyInvitationResponse>, ApiError> {
    let service = InvitationService::new(state.pool.clone());
    let response = service.verify(&query.token).await?;
    Ok(Json(response))
}

/// List invitations, newest first.
///
/// GET /api/v1/admin/invitations
pub async fn list_invitations(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Query(pagination): Query<Pagination>,
) -> Result<Json<ListInvitationsResponse>, ApiError> {
    require_admin(&state, user_auth.user_id).await?;

    let (limit, offset) = pagination.clamped();
    let repo = InvitationRepository::new(state.pool.clone());
    let invitations = repo.list(limit, offset).await?;

    let data: Vec<InvitationSummary> = invitations
        .into_iter()
        .map(|e| InvitationSummary::from(Invitation::from(e)))
        .collect();

    Ok(Json(ListInvitationsResponse { data }))
}

/// Delete an invitation.
///
/// DELETE /api/v1/admin/invitations/:id
pub async fn delete_invitation(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(invitation_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    require_admin(&state, user_auth.user_id).await?;

    let repo = InvitationRepository::new(state.pool.clone());
    let deleted = repo.delete(invitation_id).await?;

    if !deleted {
        return Err(ApiError::NotFound("Invitation not found".to_string()));
    }

    info!(
        invitation_id = %invitation_id,
        user_id = %user_auth.user_id,
        "Invitation deleted"
    );

    Ok(StatusCode::NO_CONTENT)
}
