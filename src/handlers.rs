// ==============================================================================
// handlers.rs - API Request Handlers
// ==============================================================================
// Description: HTTP request handlers for the Stargaze API endpoints
// Author: Matt Barham
// Created: 2026-07-28
// Modified: 2026-08-05
// Version: 1.0.0
// ==============================================================================

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use tracing::{error, info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::{
    middleware::AuthUser,
    models::*,
    security::{hash_password, verify_password},
    state::AppState,
    upstream::UpstreamError,
};

/// Root endpoint - API information
pub async fn root() -> Json<ApiInfoResponse> {
    Json(ApiInfoResponse {
        service: "Stargaze API",
        version: "1.0.0",
        endpoints: vec![
            "/health - Health check",
            "/ready - Readiness check",
            "/auth/signup - Create an account (POST)",
            "/auth/signin - Sign in (POST)",
            "/api/test - Echo the authenticated user id (GET)",
            "/api/favorites - List the caller's favorites (GET)",
            "/api/getPic - Picture of the day (GET) or save a favorite (POST)",
            "/api/getPic/date?date=YYYY-MM-DD - Picture for a date (GET)",
            "/api/deleteFavorite/ - Delete one of the caller's favorites (DELETE)",
        ],
    })
}

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: "1.0.0",
        timestamp: Utc::now(),
    })
}

/// Readiness check endpoint
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    // Check database connection
    let db_ready = sqlx::query("SELECT 1")
        .fetch_one(state.db_pool())
        .await
        .is_ok();

    let response = ReadinessResponse {
        ready: db_ready,
        database: db_ready,
    };

    let status = if db_ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}

// ==============================================================================
// AUTH ENDPOINTS (public)
// ==============================================================================

/// Create account endpoint - POST /auth/signup
pub async fn signup(
    State(state): State<AppState>,
    Json(body): Json<SignupRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let email = body.email.trim().to_lowercase();

    let existing: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE email = $1")
        .bind(&email)
        .fetch_optional(state.db_pool())
        .await?;

    if existing.is_some() {
        return Err(AppError::EmailTaken);
    }

    let password_hash =
        hash_password(&body.password).map_err(|e| AppError::Internal(e.to_string()))?;

    let user: User = sqlx::query_as(
        "INSERT INTO users (id, email, password_hash, created_at)
         VALUES ($1, $2, $3, $4)
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(&email)
    .bind(&password_hash)
    .bind(Utc::now())
    .fetch_one(state.db_pool())
    .await?;

    let (token, expires_in) = state
        .tokens()
        .issue(user.id, &user.email)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    info!("Account created: {}", user.email);

    Ok(Json(AuthResponse {
        token,
        expires_in,
        user: UserResponse::from_user(&user),
    }))
}

/// Sign in endpoint - POST /auth/signin
pub async fn signin(
    State(state): State<AppState>,
    Json(body): Json<SigninRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let email = body.email.trim().to_lowercase();

    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = $1")
        .bind(&email)
        .fetch_optional(state.db_pool())
        .await?;

    // Unknown email and wrong password are indistinguishable to the caller
    let user = user.ok_or(AppError::InvalidCredentials)?;

    let valid = verify_password(&body.password, &user.password_hash)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    if !valid {
        warn!("Failed signin attempt: {}", email);
        return Err(AppError::InvalidCredentials);
    }

    let (token, expires_in) = state
        .tokens()
        .issue(user.id, &user.email)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    info!("Signin successful: {}", user.email);

    Ok(Json(AuthResponse {
        token,
        expires_in,
        user: UserResponse::from_user(&user),
    }))
}

// ==============================================================================
// PROTECTED ENDPOINTS (/api, gated by the auth middleware)
// ==============================================================================

/// Protected smoke endpoint - GET /api/test
pub async fn auth_test(user: AuthUser) -> Json<TestResponse> {
    Json(TestResponse {
        message: format!("in this protected route, the caller's user id is {}", user.0),
    })
}

/// List the caller's favorites - GET /api/favorites
pub async fn list_favorites(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<Favorite>>, AppError> {
    let favorites: Vec<Favorite> =
        sqlx::query_as("SELECT * FROM favorites WHERE user_id = $1 ORDER BY created_at DESC")
            .bind(user.0)
            .fetch_all(state.db_pool())
            .await?;

    Ok(Json(favorites))
}

/// Picture of the day - GET /api/getPic
pub async fn get_picture(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<Json<PictureResponse>, AppError> {
    let picture = state.imagery().fetch_picture(None).await?;
    Ok(Json(picture.into()))
}

/// Date query for the dated picture endpoint
#[derive(Debug, Deserialize)]
pub struct PictureDateQuery {
    pub date: Option<String>,
}

/// Picture for a specific date - GET /api/getPic/date?date=YYYY-MM-DD
pub async fn get_picture_by_date(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<PictureDateQuery>,
) -> Result<Json<PictureResponse>, AppError> {
    let raw = query
        .date
        .ok_or_else(|| AppError::Validation("date query parameter is required".to_string()))?;

    let date = parse_picture_date(&raw)?;

    let picture = state.imagery().fetch_picture(Some(date)).await?;
    Ok(Json(picture.into()))
}

/// Save a favorite - POST /api/getPic
pub async fn add_favorite(
    State(state): State<AppState>,
    user: AuthUser,
    Json(body): Json<FavoriteCreateRequest>,
) -> Result<Json<Favorite>, AppError> {
    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let date = parse_picture_date(&body.date)?;

    // Single statement: insert and return the row atomically
    let favorite: Favorite = sqlx::query_as(
        "INSERT INTO favorites (id, title, date, url, copyright, media_type, user_id, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(&body.title)
    .bind(date)
    .bind(&body.url)
    .bind(&body.copyright)
    .bind(&body.media_type)
    .bind(user.0)
    .bind(Utc::now())
    .fetch_one(state.db_pool())
    .await?;

    info!("Favorite {} saved for user {}", favorite.id, user.0);

    Ok(Json(favorite))
}

/// Delete a favorite - DELETE /api/deleteFavorite/
pub async fn delete_favorite(
    State(state): State<AppState>,
    user: AuthUser,
    Json(body): Json<FavoriteDeleteRequest>,
) -> Result<Json<Favorite>, AppError> {
    // Scoped to the caller: a foreign id behaves like an unknown one
    let deleted: Option<Favorite> =
        sqlx::query_as("DELETE FROM favorites WHERE id = $1 AND user_id = $2 RETURNING *")
            .bind(body.id)
            .bind(user.0)
            .fetch_optional(state.db_pool())
            .await?;

    let favorite = deleted.ok_or(AppError::NotFound)?;

    info!("Favorite {} deleted for user {}", favorite.id, user.0);

    Ok(Json(favorite))
}

/// Parse a YYYY-MM-DD date at the boundary, rejecting malformed input before
/// it reaches the upstream API or the database
fn parse_picture_date(raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("date must be YYYY-MM-DD, got '{raw}'")))
}

// ==============================================================================
// ERROR TYPE
// ==============================================================================

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("email is already registered")]
    EmailTaken,
    #[error("resource not found")]
    NotFound,
    #[error("{0}")]
    Upstream(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("{0}")]
    Internal(String),
}

impl From<UpstreamError> for AppError {
    fn from(err: UpstreamError) -> Self {
        AppError::Upstream(err.0)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Validation(details) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::with_details("validation failed", details),
            ),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                ErrorResponse::new("Invalid email or password"),
            ),
            AppError::EmailTaken => (
                StatusCode::CONFLICT,
                ErrorResponse::new("Email is already registered"),
            ),
            AppError::NotFound => (
                StatusCode::NOT_FOUND,
                ErrorResponse::new("Resource not found"),
            ),
            AppError::Upstream(msg) => {
                error!("Upstream failure: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorResponse::new(msg))
            }
            AppError::Database(e) => {
                error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new(format!("database error: {e}")),
                )
            }
            AppError::Internal(msg) => {
                error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorResponse::new(msg))
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_status_codes() {
        let validation = AppError::Validation("bad".to_string()).into_response();
        assert_eq!(validation.status(), StatusCode::BAD_REQUEST);

        let credentials = AppError::InvalidCredentials.into_response();
        assert_eq!(credentials.status(), StatusCode::UNAUTHORIZED);

        let taken = AppError::EmailTaken.into_response();
        assert_eq!(taken.status(), StatusCode::CONFLICT);

        let not_found = AppError::NotFound.into_response();
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        let upstream = AppError::Upstream("apod down".to_string()).into_response();
        assert_eq!(upstream.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let internal = AppError::Internal("boom".to_string()).into_response();
        assert_eq!(internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_parse_picture_date() {
        assert_eq!(
            parse_picture_date("2026-07-01").unwrap(),
            NaiveDate::from_ymd_opt(2026, 7, 1).unwrap()
        );

        // Surrounding whitespace is tolerated
        assert!(parse_picture_date(" 2026-07-01 ").is_ok());

        // Malformed input is a validation failure, not a 500
        for bad in ["07/01/2026", "2026-13-40", "yesterday", ""] {
            match parse_picture_date(bad) {
                Err(AppError::Validation(_)) => {}
                other => panic!("expected validation error for {bad:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_upstream_error_maps_to_500_with_message() {
        let err: AppError = UpstreamError("imagery API error: bad key".to_string()).into();
        match &err {
            AppError::Upstream(msg) => assert!(!msg.is_empty()),
            other => panic!("expected upstream error, got {other:?}"),
        }
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
