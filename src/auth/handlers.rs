use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, PublicUser, SignupRequest},
        jwt::JwtKeys,
        password::{hash_password, verify_password},
        repo::{Role, User},
    },
    error::ApiError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
}

fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    Json(mut payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    payload.email = payload.email.trim().to_lowercase();
    payload.name = payload.name.trim().to_string();

    if payload.name.is_empty() {
        return Err(ApiError::Validation("Name is required".into()));
    }
    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::Validation("Invalid email".into()));
    }
    if payload.password.len() < 8 {
        return Err(ApiError::Validation("Password too short".into()));
    }
    let role = match payload.role.as_deref() {
        None | Some("") => Role::default(),
        Some(raw) => raw
            .parse::<Role>()
            .map_err(|_| ApiError::Validation("Unknown role".into()))?,
    };

    let hash = hash_password(&payload.password)?;

    // A duplicate email comes back from the unique constraint as
    // ApiError::DuplicateEmail; no check-then-create.
    let user = User::create(&state.db, &payload.name, &payload.email, &hash, role).await?;

    let token = JwtKeys::from_ref(&state).sign(user.id)?;

    info!(user_id = %user.id, email = %user.email, "user signed up");
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: PublicUser::from(user),
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    // Unknown email and wrong password produce the same error so the
    // response cannot be used to enumerate accounts.
    let user = match User::find_by_email(&state.db, &payload.email).await? {
        Some(u) => u,
        None => {
            warn!(email = %payload.email, "login unknown email");
            return Err(ApiError::InvalidCredentials);
        }
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    let token = JwtKeys::from_ref(&state).sign(user.id)?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(Json(AuthResponse {
        token,
        user: PublicUser::from(user),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_regex_accepts_normal_addresses() {
        assert!(is_valid_email("a@x.com"));
        assert!(is_valid_email("first.last@sub.domain.org"));
    }

    #[test]
    fn email_regex_rejects_malformed_addresses() {
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("no-at-sign"));
        assert!(!is_valid_email("two@@x.com"));
        assert!(!is_valid_email("spaces in@x.com"));
        assert!(!is_valid_email("nodot@host"));
    }

    // Validation runs before any database access, so these paths are
    // exercised against a lazily connecting pool.

    #[tokio::test]
    async fn signup_rejects_empty_name() {
        let state = AppState::fake();
        let err = signup(
            State(state),
            Json(SignupRequest {
                name: "  ".into(),
                email: "a@x.com".into(),
                password: "longenough".into(),
                role: None,
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn signup_rejects_invalid_email() {
        let state = AppState::fake();
        let err = signup(
            State(state),
            Json(SignupRequest {
                name: "Alice".into(),
                email: "not-an-email".into(),
                password: "longenough".into(),
                role: None,
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn signup_rejects_short_password() {
        let state = AppState::fake();
        let err = signup(
            State(state),
            Json(SignupRequest {
                name: "Alice".into(),
                email: "a@x.com".into(),
                password: "short".into(),
                role: None,
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn signup_rejects_unknown_role() {
        let state = AppState::fake();
        let err = signup(
            State(state),
            Json(SignupRequest {
                name: "Alice".into(),
                email: "a@x.com".into(),
                password: "longenough".into(),
                role: Some("superuser".into()),
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Validation(msg) if msg == "Unknown role"));
    }
}
