// ==============================================================================
// models.rs - API Data Models
// ==============================================================================
// Description: Request/response models for the Stargaze API
// Author: Matt Barham
// Created: 2026-07-27
// Modified: 2026-08-04
// Version: 1.0.0
// ==============================================================================

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// User account row
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2id hash - never serialize
    pub created_at: DateTime<Utc>,
}

/// User response (sanitized)
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl UserResponse {
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            created_at: user.created_at,
        }
    }
}

/// Signup request body
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "must be at least 6 characters"))]
    pub password: String,
}

/// Signin request body
#[derive(Debug, Deserialize, Validate)]
pub struct SigninRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub password: String,
}

/// Successful signup/signin response
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub expires_in: i64, // seconds until expiration
    pub user: UserResponse,
}

/// Saved favorite row
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Favorite {
    pub id: Uuid,
    pub title: String,
    pub date: NaiveDate,
    pub url: String,
    pub copyright: Option<String>,
    pub media_type: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Favorite creation request body
#[derive(Debug, Deserialize, Validate)]
pub struct FavoriteCreateRequest {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub title: String,
    /// Calendar date in YYYY-MM-DD form; parsed in the handler
    pub date: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub url: String,
    pub copyright: Option<String>,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub media_type: String,
}

/// Favorite deletion request body
#[derive(Debug, Deserialize)]
pub struct FavoriteDeleteRequest {
    pub id: Uuid,
}

/// Reshaped upstream imagery response
#[derive(Debug, Serialize)]
pub struct PictureResponse {
    pub title: String,
    pub img: String,
    pub date: String,
    pub description: String,
    pub copyright: Option<String>,
    pub media_type: String,
}

/// Protected-route smoke response
#[derive(Debug, Serialize)]
pub struct TestResponse {
    pub message: String,
}

/// API information response
#[derive(Debug, Serialize)]
pub struct ApiInfoResponse {
    pub service: &'static str,
    pub version: &'static str,
    pub endpoints: Vec<&'static str>,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub timestamp: DateTime<Utc>,
}

/// Readiness check response
#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub database: bool,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: Some(details.into()),
        }
    }
}
