//! HTTP route handlers.

pub mod auth;
pub mod health;
pub mod invitations;
pub mod tasks;
pub mod users;

use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use domain::models::user::Profile;
use persistence::repositories::UserRepository;

/// Loads the caller's profile and rejects non-administrators.
///
/// Role checks read the profile row on every call rather than trusting a
/// role claim baked into the JWT, so demotions take effect immediately.
pub async fn require_admin(state: &AppState, user_id: Uuid) -> Result<Profile, ApiError> {
    let profile = load_profile(state, user_id).await?;

    if !profile.role.is_admin() {
        return Err(ApiError::Forbidden(
            "Administrator access required".to_string(),
        ));
    }

    Ok(profile)
}

/// Loads the caller's profile.
pub async fn load_profile(state: &AppState, user_id: Uuid) -> Result<Profile, ApiError> {
    let user_repo = UserRepository::new(state.pool.clone());

    let profile = user_repo
        .find_profile(user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Profile not found".to_string()))?;

    Ok(profile.into())
}

/// Pagination query parameters shared by listing endpoints.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            offset: 0,
        }
    }
}

fn default_limit() -> i64 {
    50
}

impl Pagination {
    /// Clamps limit and offset to sane bounds.
    pub fn clamped(&self) -> (i64, i64) {
        (self.limit.clamp(1, 200), self.offset.max(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_defaults() {
        let p = Pagination::default();
        assert_eq!(p.clamped(), (50, 0));
    }

    #[test]
    fn test_pagination_clamps() {
        let p = Pagination {
            limit: 10_000,
            offset: -5,
        };
        assert_eq!(p.clamped(), (200, 0));

        let p = Pagination {
            limit: 0,
            offset: 10,
        };
        assert_eq!(p.clamped(), (1, 10));
    }
}
