//! Authentication routes: invitation-gated registration, login, and the
//! current-user endpoint.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;
use crate::routes::load_profile;
use crate::services::auth::{AuthError, AuthService};
use crate::services::invitations::{ConsumeError, InvitationService};
use domain::models::invitation::VerificationStatus;
use domain::models::user::ProfileResponse;

/// Request body for registration. The invitation supplies the email and
/// role; the recipient only chooses a password.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "Invitation token is required"))]
    pub token: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Request body for login.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Token information in responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct TokensResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Response body for successful registration or login.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct AuthResponse {
    pub user_id: String,
    pub email: String,
    pub tokens: TokensResponse,
}

/// Register a new user by consuming an invitation.
///
/// POST /api/v1/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    request.validate()?;

    let invitation_service = InvitationService::new(state.pool.clone());

    let user = invitation_service
        .consume(&request.token, &request.password)
        .await
        .map_err(|e| match e {
            ConsumeError::InvalidToken(status) => {
                let reason = match status {
                    VerificationStatus::AlreadyUsed => "Invitation has already been used",
                    VerificationStatus::Expired => "Invitation has expired",
                    _ => "Invitation not found",
                };
                ApiError::Validation(reason.to_string())
            }
            ConsumeError::WeakPassword(msg) => ApiError::Validation(msg),
            ConsumeError::EmailAlreadyExists => {
                ApiError::Conflict("Email already registered".to_string())
            }
            ConsumeError::Password(e) => ApiError::Internal(format!("Password error: {}", e)),
            ConsumeError::Database(e) => ApiError::from(e),
        })?;

    let auth_service = AuthService::new(state.pool.clone(), &state.config.jwt)
        .map_err(|e| ApiError::Internal(format!("Failed to initialize auth service: {}", e)))?;

    let tokens = auth_service
        .issue_tokens(user.id)
        .map_err(|e| ApiError::Internal(format!("Token error: {}", e)))?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user_id: user.id.to_string(),
            email: user.email,
            tokens: TokensResponse {
                access_token: tokens.access_token,
                refresh_token: tokens.refresh_token,
                token_type: "Bearer".to_string(),
                expires_in: tokens.expires_in,
            },
        }),
    ))
}

/// Log in with email and password.
///
/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    request.validate()?;

    let auth_service = AuthService::new(state.pool.clone(), &state.config.jwt)
        .map_err(|e| ApiError::Internal(format!("Failed to initialize auth service: {}", e)))?;

    let result = auth_service
        .login(&request.email, &request.password)
        .await
        .map_err(|e| match e {
            AuthError::InvalidCredentials => {
                ApiError::Unauthorized("Invalid email or password".to_string())
            }
            AuthError::UserDisabled => ApiError::Forbidden("Account is disabled".to_string()),
            AuthError::DatabaseError(db_err) => ApiError::from(db_err),
            other => ApiError::Internal(other.to_string()),
        })?;

    Ok(Json(AuthResponse {
        user_id: result.user_id.to_string(),
        email: result.email,
        tokens: TokensResponse {
            access_token: result.tokens.access_token,
            refresh_token: result.tokens.refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: result.tokens.expires_in,
        },
    }))
}

/// Current user's profile.
///
/// GET /api/v1/auth/me
pub async fn me(
    State(state): State<AppState>,
    user_auth: UserAuth,
) -> Result<Json<ProfileResponse>, ApiError> {
    let profile = load_profile(&state, user_auth.user_id).await?;
    Ok(Json(profile.into()))
}
