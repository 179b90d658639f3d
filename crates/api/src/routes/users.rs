//! Admin user routes: listing profiles and changing roles.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use tracing::info;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;
use crate::routes::{require_admin, Pagination};
use domain::models::user::{ListProfilesResponse, Profile, ProfileResponse, UpdateRoleRequest};
use persistence::repositories::UserRepository;

/// List all user profiles.
///
/// GET /api/v1/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Query(pagination): Query<Pagination>,
) -> Result<Json<ListProfilesResponse>, ApiError> {
    require_admin(&state, user_auth.user_id).await?;

    let (limit, offset) = pagination.clamped();
    let repo = UserRepository::new(state.pool.clone());
    let profiles = repo.list_profiles(limit, offset).await?;

    let data: Vec<ProfileResponse> = profiles
        .into_iter()
        .map(|e| ProfileResponse::from(Profile::from(e)))
        .collect();

    Ok(Json(ListProfilesResponse { data }))
}

/// Change a user's role.
///
/// PUT /api/v1/admin/users/:id/role
///
/// An administrator can never change their own role, so the system cannot
/// lose its last admin through this endpoint by accident.
pub async fn update_role(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(user_id): Path<Uuid>,
    Json(request): Json<UpdateRoleRequest>,
) -> Result<Json<ProfileResponse>, ApiError> {
    require_admin(&state, user_auth.user_id).await?;

    if user_id == user_auth.user_id {
        return Err(ApiError::Forbidden(
            "Administrators cannot change their own role".to_string(),
        ));
    }

    let repo = UserRepository::new(state.pool.clone());
    let profile = repo
        .update_role(user_id, request.role.as_str())
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    info!(
        target_user_id = %user_id,
        new_role = %request.role,
        changed_by = %user_auth.user_id,
        "User role updated"
    );

    Ok(Json(Profile::from(profile).into()))
}
