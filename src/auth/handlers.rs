use axum::{
    extract::{FromRef, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{
            LoginRequest, MessageResponse, PublicUser, RegisterRequest, RegisterResponse,
            ResetConfirmQuery, ResetConfirmRequest, ResetRequest, TokenResponse,
        },
        extractors::AuthUser,
        jwt::{JwtKeys, TokenError},
        password::{hash_password, verify_password},
        validate,
    },
    error::ApiError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/password-reset", post(request_password_reset))
        .route("/auth/password-reset/confirm", post(confirm_password_reset))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(me))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    validate::new_username(&payload.username)?;
    validate::new_password(&payload.password)?;
    validate::email(&payload.email)?;

    let hash = hash_password(&payload.password)?;

    // No pre-check for duplicates: the store's uniqueness constraints
    // resolve concurrent registrations, and the conflicting field is not
    // disclosed to the caller.
    let user = state
        .store
        .create(&payload.username, &payload.email, &hash)
        .await
        .map_err(|e| {
            let e = ApiError::from(e);
            if matches!(e, ApiError::DuplicateUser) {
                warn!(username = %payload.username, "registration conflict");
            }
            e
        })?;

    info!(user_id = %user.id, username = %user.username, "user registered");
    Ok((StatusCode::CREATED, Json(RegisterResponse { id: user.id })))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    validate::login_username(&payload.username)?;
    validate::non_empty_password(&payload.password)?;

    // Unknown username and wrong password produce the same failure so a
    // caller cannot probe which usernames exist.
    let user = match state.store.find_by_username(&payload.username).await? {
        Some(u) => u,
        None => {
            warn!(username = %payload.username, "login unknown username");
            return Err(ApiError::InvalidCredentials);
        }
    };

    if !verify_password(&payload.password, &user.password_hash) {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.issue(user.id)?;

    info!(user_id = %user.id, "user logged in");
    Ok(Json(TokenResponse { token }))
}

#[instrument(skip(state))]
pub async fn me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<PublicUser>, ApiError> {
    // The token can outlive its user record.
    let user = state.store.find_by_id(user_id).await?.ok_or_else(|| {
        warn!(user_id = %user_id, "valid token for missing user");
        ApiError::UserNotFound
    })?;

    Ok(Json(PublicUser::from(user)))
}

#[instrument(skip(state, payload))]
pub async fn request_password_reset(
    State(state): State<AppState>,
    Json(mut payload): Json<ResetRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    payload.email = payload.email.trim().to_lowercase();
    validate::email(&payload.email)?;

    let user = match state.store.find_by_email(&payload.email).await? {
        Some(u) => u,
        None => {
            warn!(email = %payload.email, "reset request for unknown email");
            return Err(ApiError::EmailNotFound);
        }
    };

    let keys = JwtKeys::from_ref(&state);
    let token = keys.issue(user.id)?;

    let link = format!("{}?token={}", state.config.mail.reset_url_base, token);
    let body = format!(
        "Hello {},\n\nA password reset was requested for your account. \
         Follow this link to choose a new password:\n\n{}\n\n\
         The link is valid for one hour. If you did not request a reset, \
         you can ignore this message.\n",
        user.username, link
    );

    state
        .mailer
        .send(&user.email, "Password reset", &body)
        .await
        .map_err(|e| {
            error!(error = %e, user_id = %user.id, "reset mail dispatch failed");
            ApiError::Internal(e)
        })?;

    info!(user_id = %user.id, "reset mail sent");
    Ok(Json(MessageResponse {
        message: "password reset email sent".into(),
    }))
}

#[instrument(skip(state, query, payload))]
pub async fn confirm_password_reset(
    State(state): State<AppState>,
    Query(query): Query<ResetConfirmQuery>,
    Json(payload): Json<ResetConfirmRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    validate::new_password(&payload.password)?;

    let keys = JwtKeys::from_ref(&state);
    let claims = keys.verify(&query.token).map_err(|e| match e {
        TokenError::Expired => {
            warn!("reset token expired");
            ApiError::TokenExpired
        }
        TokenError::InvalidSignature | TokenError::Malformed => {
            warn!("invalid reset token");
            ApiError::InvalidToken
        }
    })?;

    // A missing user is reported exactly like a bad signature.
    let user = state
        .store
        .find_by_id(claims.id)
        .await?
        .ok_or(ApiError::InvalidToken)?;

    let hash = hash_password(&payload.password)?;
    state.store.update_password_hash(user.id, &hash).await?;

    // The token itself stays valid until natural expiry; a replay only
    // re-sets the password to whatever is supplied.
    info!(user_id = %user.id, "password reset");
    Ok(Json(MessageResponse {
        message: "password updated".into(),
    }))
}
