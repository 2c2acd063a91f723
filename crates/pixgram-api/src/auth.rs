use std::sync::Arc;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::WithRejection;
use tracing::{info, warn};
use uuid::Uuid;

use pixgram_db::Database;
use pixgram_types::api::{
    Claims, LoginRequest, LoginResponse, LoginUser, LogoutRequest, RefreshRequest,
    RefreshResponse, RegisterRequest, TokenType,
};

use crate::error::{ApiError, ApiJson};
use crate::revocation::RevocationStore;
use crate::tokens::{self, AuthSettings};
use crate::users::profile_fields;
use crate::{blocking, views};

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Arc<Database>,
    pub revocations: Arc<dyn RevocationStore>,
    pub auth: AuthSettings,
}

pub async fn register(
    State(state): State<AppState>,
    WithRejection(Json(req), _): ApiJson<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (password, profile) = req.into_parts();
    if password.len() < 8 {
        return Err(ApiError::bad_request("password must be at least 8 characters"));
    }
    let fields = profile_fields(profile)?;

    // Hash password with Argon2id
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| {
            warn!("Password hashing failed: {}", e);
            ApiError::Internal
        })?
        .to_string();

    let user = blocking(&state, move |s| Ok(s.db.create_user(&fields, &password_hash)?)).await?;
    info!(user = %user.username, "Registered new user");

    Ok((StatusCode::CREATED, Json(views::account(&user))))
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    // A malformed body is reported like a wrong password.
    let Json(req) = payload.map_err(|_| ApiError::InvalidCredentials)?;
    let username = req.username.clone();
    let user = blocking(&state, move |s| Ok(s.db.get_user_by_username(&username)?))
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    // Verify password
    let parsed_hash = PasswordHash::new(&user.password).map_err(|e| {
        warn!("Stored password hash for {} is unreadable: {}", user.username, e);
        ApiError::Internal
    })?;

    Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .map_err(|_| ApiError::InvalidCredentials)?;

    let user_id: Uuid = user.id.parse().map_err(|_| ApiError::Internal)?;

    let pair = tokens::issue_pair(&state.auth, user_id, &user.username).map_err(|e| {
        warn!("Token issuance failed: {}", e);
        ApiError::Internal
    })?;

    Ok(Json(LoginResponse {
        user: LoginUser {
            username: user.username,
            email: user.email,
        },
        access: pair.access,
        refresh: pair.refresh,
    }))
}

/// Exchanges a live refresh token for a new access token.
pub async fn refresh(
    State(state): State<AppState>,
    WithRejection(Json(req), _): ApiJson<RefreshRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let claims = tokens::verify(&state.auth.jwt_secret, &req.refresh, TokenType::Refresh)
        .map_err(|_| ApiError::Unauthorized)?;

    let jti = claims.jti.to_string();
    let revoked = blocking(&state, move |s| {
        s.revocations.is_revoked(&jti).map_err(|e| {
            warn!("Revocation lookup failed: {}", e);
            ApiError::Internal
        })
    })
    .await?;
    if revoked {
        return Err(ApiError::Unauthorized);
    }

    let access = tokens::issue(&state.auth, claims.sub, &claims.username, TokenType::Access)
        .map_err(|e| {
            warn!("Token issuance failed: {}", e);
            ApiError::Internal
        })?;

    Ok(Json(RefreshResponse { access }))
}

/// Blacklists the caller's refresh token. Every failure is reported as a
/// plain 400.
pub async fn logout(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    payload: Result<Json<LogoutRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    match revoke_refresh(&state, &claims, payload).await {
        Ok(()) => Ok(StatusCode::RESET_CONTENT),
        Err(e) => {
            warn!(user = %claims.username, "Logout rejected: {}", e);
            Err(ApiError::bad_request("invalid refresh token"))
        }
    }
}

async fn revoke_refresh(
    state: &AppState,
    claims: &Claims,
    payload: Result<Json<LogoutRequest>, JsonRejection>,
) -> anyhow::Result<()> {
    let Json(req) = payload?;
    let token = req
        .refresh
        .ok_or_else(|| anyhow::anyhow!("missing refresh token"))?;
    let refresh = tokens::verify(&state.auth.jwt_secret, &token, TokenType::Refresh)?;
    if refresh.sub != claims.sub {
        anyhow::bail!("refresh token belongs to another user");
    }

    let jti = refresh.jti.to_string();
    let expires_at = tokens::expires_at(&refresh);
    let store = state.revocations.clone();
    tokio::task::spawn_blocking(move || store.revoke(&jti, expires_at)).await??;
    Ok(())
}
