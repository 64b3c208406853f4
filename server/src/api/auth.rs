//! Registration, login and the authenticated "who am I" route.

use axum::{Extension, Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use super::{ApiError, AppState, JsonBody};
use crate::auth::Identity;
use crate::store::{NewAccount, StoreError};

const REGISTER_FIELDS_REQUIRED: &str =
    "All fields are required: name, email, password and company_name";
const EMAIL_TAKEN: &str = "Email already registered";
const REGISTER_FAILED: &str = "Failed to register user";
const LOGIN_FIELDS_REQUIRED: &str = "Email and password are required";
const INVALID_LOGIN: &str = "Invalid email or password";
const LOGIN_FAILED: &str = "Failed to log in";

#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub company_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegisteredUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub company_name: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: &'static str,
    pub user: RegisteredUser,
}

#[derive(Debug, Serialize)]
pub struct LoggedInUser {
    pub id: String,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: &'static str,
    pub token: String,
    pub user: LoggedInUser,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub message: String,
    #[serde(rename = "userId")]
    pub user_id: String,
}

/// Treat absent and empty strings alike.
fn present(field: Option<String>) -> Option<String> {
    field.filter(|value| !value.is_empty())
}

/// `POST /api/register`
pub async fn register(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let (Some(name), Some(email), Some(password), Some(company_name)) = (
        present(request.name),
        present(request.email),
        present(request.password),
        present(request.company_name),
    ) else {
        return Err(ApiError::BadRequest(REGISTER_FIELDS_REQUIRED));
    };

    let existing = state
        .store
        .find_account_by_email(&email)
        .map_err(|e| ApiError::internal(REGISTER_FAILED, &e))?;
    if existing.is_some() {
        return Err(ApiError::Conflict(EMAIL_TAKEN));
    }

    let hasher = state.passwords;
    let password_hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
        .await
        .map_err(|e| ApiError::internal(REGISTER_FAILED, &e))?
        .map_err(|e| ApiError::internal(REGISTER_FAILED, &e))?;

    let account = state
        .store
        .insert_account(NewAccount {
            name,
            company_name,
            email,
            password_hash,
        })
        .map_err(|e| match e {
            StoreError::DuplicateEmail(_) => ApiError::Conflict(EMAIL_TAKEN),
            StoreError::LockPoisoned => ApiError::internal(REGISTER_FAILED, &e),
        })?;

    tracing::info!(account_id = %account.id, "account registered");
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully",
            user: RegisteredUser {
                id: account.id,
                name: account.name,
                email: account.email,
                company_name: account.company_name,
            },
        }),
    ))
}

/// `POST /api/login`
///
/// Unknown email and wrong password produce the same 401.
pub async fn login(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let (Some(email), Some(password)) = (present(request.email), present(request.password))
    else {
        return Err(ApiError::BadRequest(LOGIN_FIELDS_REQUIRED));
    };

    let account = state
        .store
        .find_account_by_email(&email)
        .map_err(|e| ApiError::internal(LOGIN_FAILED, &e))?
        .ok_or(ApiError::Unauthorized(INVALID_LOGIN))?;

    let hasher = state.passwords;
    let stored_hash = account.password_hash.clone();
    let matches = tokio::task::spawn_blocking(move || hasher.verify(&password, &stored_hash))
        .await
        .map_err(|e| ApiError::internal(LOGIN_FAILED, &e))?
        .map_err(|e| ApiError::internal(LOGIN_FAILED, &e))?;
    if !matches {
        tracing::debug!(account_id = %account.id, "login rejected: wrong password");
        return Err(ApiError::Unauthorized(INVALID_LOGIN));
    }

    let token = state
        .issuer
        .issue(&account.id)
        .map_err(|e| ApiError::internal(LOGIN_FAILED, &e))?;

    tracing::info!(account_id = %account.id, "login succeeded");
    Ok(Json(LoginResponse {
        message: "Login successful",
        token,
        user: LoggedInUser {
            id: account.id,
            name: account.name,
            email: account.email,
        },
    }))
}

/// `GET /api/me`
pub async fn me(Extension(identity): Extension<Identity>) -> Json<MeResponse> {
    Json(MeResponse {
        message: format!("Authenticated user: {}", identity.user_id),
        user_id: identity.user_id,
    })
}
