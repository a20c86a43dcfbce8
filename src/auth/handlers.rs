use axum::{
    extract::{FromRef, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tokio::task;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{
            AuthResponse, GoogleLoginQuery, LoginRequest, RegisterRequest, UserFilter,
            UsersResponse,
        },
        extractors::AdminUser,
        jwt::JwtKeys,
        lockout,
        password::{generate_opaque_password, hash_password, is_strong_password, verify_password},
        repo::User,
    },
    error::ApiError,
    state::AppState,
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/google-login", get(google_login))
        .route("/get-all-users", get(get_all_users))
}

fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn sign_token(state: &AppState, user: &User) -> Result<String, ApiError> {
    JwtKeys::from_ref(state)
        .sign(user.id)
        .map_err(ApiError::Internal)
}

/// Argon2 is deliberately expensive; keep it off the async request path.
async fn hash_blocking(password: String) -> Result<String, ApiError> {
    task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| ApiError::Internal(e.into()))?
        .map_err(ApiError::Internal)
}

async fn verify_blocking(password: String, hash: String) -> Result<bool, ApiError> {
    task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| ApiError::Internal(e.into()))?
        .map_err(ApiError::Internal)
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let name = payload.name.trim().to_string();
    let email = payload.email.trim().to_lowercase();
    let password = payload.password;

    if name.is_empty() || email.is_empty() || password.is_empty() {
        return Err(ApiError::Validation("Please enter all the fields".into()));
    }
    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(ApiError::Validation(
            "Please enter a valid email address".into(),
        ));
    }
    if password.len() < 8 {
        return Err(ApiError::Validation(
            "Password must be at least 8 characters".into(),
        ));
    }
    if !is_strong_password(&password) {
        return Err(ApiError::Validation(
            "Password must contain one uppercase, lowercase, numeric and special character".into(),
        ));
    }

    if User::find_by_email(&state.db, &email)
        .await
        .map_err(ApiError::Internal)?
        .is_some()
    {
        warn!(email = %email, "email already registered");
        return Err(ApiError::Conflict("Email already exists".into()));
    }

    let hash = hash_blocking(password).await?;
    let user = User::create(&state.db, &name, &email, &hash)
        .await
        .map_err(ApiError::Internal)?;
    let token = sign_token(&state, &user)?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse::new(
            &user,
            token,
            "User registered successfully",
        )),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let email = payload.email.trim().to_lowercase();
    let password = payload.password;

    if email.is_empty() || password.is_empty() {
        return Err(ApiError::Validation("Please enter email and password".into()));
    }

    let user = User::find_by_email(&state.db, &email)
        .await
        .map_err(ApiError::Internal)?
        .ok_or_else(|| {
            warn!(email = %email, "login unknown email");
            ApiError::Unauthenticated("Invalid credentials".into())
        })?;

    // Frozen accounts are rejected before the password is even checked.
    lockout::ensure_not_frozen(&state.db, &user, &state.config.lockout).await?;

    let ok = verify_blocking(password, user.password_hash.clone()).await?;
    if !ok {
        let frozen = lockout::register_failure(&state.db, user.id, &state.config.lockout)
            .await
            .map_err(ApiError::Internal)?;
        if frozen {
            return Err(ApiError::Locked(lockout::JUST_LOCKED_MESSAGE.into()));
        }
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::Unauthenticated("Invalid credentials".into()));
    }

    lockout::reset_attempts_if_any(&state.db, &user)
        .await
        .map_err(ApiError::Internal)?;

    let token = sign_token(&state, &user)?;
    info!(user_id = %user.id, "user logged in");
    Ok(Json(AuthResponse::new(
        &user,
        token,
        "User logged in successfully",
    )))
}

#[instrument(skip(state, query))]
pub async fn google_login(
    State(state): State<AppState>,
    Query(query): Query<GoogleLoginQuery>,
) -> Result<Json<AuthResponse>, ApiError> {
    let identity = state.google.exchange_code(&query.code).await?;
    let email = identity.email.trim().to_lowercase();

    if let Some(user) = User::find_by_email(&state.db, &email)
        .await
        .map_err(ApiError::Internal)?
    {
        // A frozen account stays frozen no matter how the login arrives.
        lockout::ensure_not_frozen(&state.db, &user, &state.config.lockout).await?;
        lockout::reset_attempts_if_any(&state.db, &user)
            .await
            .map_err(ApiError::Internal)?;

        let token = sign_token(&state, &user)?;
        info!(user_id = %user.id, "federated user logged in");
        return Ok(Json(AuthResponse::new(
            &user,
            token,
            "User logged in successfully",
        )));
    }

    // First federated login provisions a local account. The random password
    // satisfies the non-null hash column; it is never handed out, so no local
    // login can match it.
    let hash = hash_blocking(generate_opaque_password()).await?;
    let user = User::create_federated(
        &state.db,
        &identity.name,
        &email,
        &hash,
        identity.picture.as_deref(),
    )
    .await
    .map_err(ApiError::Internal)?;

    let token = sign_token(&state, &user)?;
    info!(user_id = %user.id, email = %user.email, "federated user provisioned");
    Ok(Json(AuthResponse::new(
        &user,
        token,
        "User logged in successfully",
    )))
}

#[instrument(skip(state, _admin))]
pub async fn get_all_users(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(filter): Query<UserFilter>,
) -> Result<Json<UsersResponse>, ApiError> {
    let users = User::list_all(&state.db, filter.title.as_deref())
        .await
        .map_err(ApiError::Internal)?;
    Ok(Json(UsersResponse {
        success: true,
        users,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_regex_accepts_ordinary_addresses() {
        assert!(is_valid_email("ada@example.com"));
        assert!(is_valid_email("a.b+tag@sub.domain.co"));
    }

    #[test]
    fn email_regex_rejects_junk() {
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("a b@example.com"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("@example.com"));
    }
}
