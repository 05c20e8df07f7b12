use std::path::PathBuf;
use std::sync::Arc;

use anyhow::anyhow;
use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use bookswap_db::Database;
use bookswap_db::queries::CreateUserOutcome;
use bookswap_types::api::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};
use bookswap_types::models::User;

use crate::error::{ApiError, ApiResult};

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
    pub uploads_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub exp: usize,
}

/// Pull and validate the bearer token. Handlers for authenticated routes
/// call this first; the GET listing routes never do.
pub fn extract_claims(headers: &HeaderMap, jwt_secret: &str) -> Result<Claims, ApiError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthorized)?;

    let token_data = decode::<Claims>(
        auth_header,
        &DecodingKey::from_secret(jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| ApiError::Unauthorized)?;

    Ok(token_data.claims)
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    if req.email.len() < 3 || req.email.len() > 254 || !req.email.contains('@') {
        return Err(ApiError::field("email", "a valid email address is required"));
    }
    if req.password.len() < 8 {
        return Err(ApiError::field(
            "password",
            "password must be at least 8 characters",
        ));
    }

    // Hash password with Argon2id
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|e| anyhow!("password hashing failed: {}", e))?
        .to_string();

    let user_id = Uuid::new_v4();

    let db = state.clone();
    let uid = user_id.to_string();
    let email = req.email.clone();
    let first_name = req.first_name.clone();
    let last_name = req.last_name.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        db.db.create_user(
            &uid,
            &email,
            &password_hash,
            first_name.as_deref(),
            last_name.as_deref(),
        )
    })
    .await??;

    match outcome {
        CreateUserOutcome::EmailTaken => {
            Err(ApiError::Conflict("email is already registered".into()))
        }
        CreateUserOutcome::Created(_) => {
            let token = create_token(&state.jwt_secret, user_id, &req.email)?;
            Ok((
                StatusCode::CREATED,
                Json(RegisterResponse { user_id, token }),
            ))
        }
    }
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let db = state.clone();
    let email = req.email.clone();
    let user = tokio::task::spawn_blocking(move || db.db.get_user_by_email(&email))
        .await??
        .ok_or(ApiError::Unauthorized)?;

    // Verify password
    let parsed_hash =
        PasswordHash::new(&user.password).map_err(|e| anyhow!("corrupt password hash: {}", e))?;

    Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .map_err(|_| ApiError::Unauthorized)?;

    let user = user.into_model();
    let token = create_token(&state.jwt_secret, user.id, &user.email)?;

    Ok(Json(LoginResponse {
        user_id: user.id,
        email: user.email.clone(),
        token,
        user,
    }))
}

/// GET /api/auth/user — the profile behind the presented token.
pub async fn current_user(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<User>> {
    let claims = extract_claims(&headers, &state.jwt_secret)?;

    let db = state.clone();
    let uid = claims.sub.to_string();
    let user = tokio::task::spawn_blocking(move || db.db.get_user_by_id(&uid))
        .await??
        .ok_or_else(|| ApiError::NotFound("user not found".into()))?;

    Ok(Json(user.into_model()))
}

fn create_token(secret: &str, user_id: Uuid, email: &str) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user_id,
        email: email.to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::days(30)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}
