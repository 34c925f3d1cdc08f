// ==============================================================================
// config.rs - Process Configuration
// ==============================================================================
// Description: Explicit configuration struct loaded once from the environment
// Author: Matt Barham
// Created: 2026-07-27
// Modified: 2026-07-30
// Version: 1.0.0
// ==============================================================================

use anyhow::{Context, Result};

use crate::upstream::DEFAULT_APOD_URL;

/// Process-wide configuration, constructed once in `main` and carried inside
/// `AppState`. Handlers and middleware never read the environment directly.
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection string
    pub database_url: String,

    /// Secret used to sign and verify bearer tokens
    pub jwt_secret: String,

    /// API key for the upstream NASA APOD service
    pub nasa_api_key: String,

    /// Upstream APOD endpoint (overridable for testing)
    pub apod_base_url: String,

    /// Bearer token lifetime in hours
    pub token_ttl_hours: i64,

    /// TCP port to listen on
    pub port: u16,

    /// Comma-separated list of allowed CORS origins
    pub cors_allowed_origins: String,
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// `DATABASE_URL`, `JWT_SECRET` and `NASA_API_KEY` are required; startup
    /// fails with context if any is missing. Everything else has a default.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            database_url: std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            jwt_secret: std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            nasa_api_key: std::env::var("NASA_API_KEY").context("NASA_API_KEY must be set")?,
            apod_base_url: std::env::var("NASA_APOD_URL")
                .unwrap_or_else(|_| DEFAULT_APOD_URL.to_string()),
            token_ttl_hours: std::env::var("TOKEN_TTL_HOURS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(24),
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse::<u16>().ok())
                .unwrap_or(8099),
            cors_allowed_origins: std::env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
        })
    }
}
