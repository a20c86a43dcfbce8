use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;

use crate::auth::jwt::JwtKeys;
use crate::auth::repo::{Role, User};
use crate::error::ApiError;
use crate::state::AppState;

const EXPIRED_MESSAGE: &str = "Authentication expired, please login";

/// Resolved identity for any authenticated route.
pub struct AuthUser(pub User);

/// Resolved identity restricted to admins.
pub struct AdminUser(pub User);

/// Identity if a bearer token accompanies the request, `None` when the
/// header is absent. A token that is present but invalid still rejects.
pub struct MaybeAuthUser(pub Option<User>);

/// Bearer-token resolution shared by every variant: missing header is 401,
/// a presented-but-rejected token is 403, a token whose user no longer
/// exists is 401 again.
async fn resolve_user(parts: &mut Parts, state: &AppState) -> Result<User, ApiError> {
    let header = parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| ApiError::Unauthenticated(EXPIRED_MESSAGE.into()))?;

    let token = header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
        .ok_or_else(|| ApiError::TokenRejected("Authentication expired".into()))?;

    let keys = JwtKeys::from_ref(state);
    let claims = keys.verify(token).map_err(|_| {
        warn!("invalid or expired token");
        ApiError::TokenRejected("Authentication expired".into())
    })?;

    User::find_by_id(&state.db, claims.sub)
        .await
        .map_err(ApiError::Internal)?
        .ok_or_else(|| {
            warn!(user_id = %claims.sub, "token subject no longer exists");
            ApiError::Unauthenticated(EXPIRED_MESSAGE.into())
        })
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(AuthUser(resolve_user(parts, state).await?))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = resolve_user(parts, state).await?;
        if user.role != Role::Admin {
            warn!(user_id = %user.id, "non-admin hit an admin route");
            return Err(ApiError::Forbidden(
                "You are not authorized to access this route".into(),
            ));
        }
        Ok(AdminUser(user))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for MaybeAuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if !parts
            .headers
            .contains_key(axum::http::header::AUTHORIZATION)
        {
            return Ok(MaybeAuthUser(None));
        }
        Ok(MaybeAuthUser(Some(resolve_user(parts, state).await?)))
    }
}
