// ==============================================================================
// state.rs - Application State Management
// ==============================================================================
// Description: Shared application state for the Stargaze API
// Author: Matt Barham
// Created: 2026-07-27
// Modified: 2026-08-02
// Version: 1.0.0
// ==============================================================================

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::Arc;

use crate::auth::TokenHandler;
use crate::config::Config;
use crate::upstream::ImageryClient;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// PostgreSQL connection pool
    pub db_pool: PgPool,

    /// Upstream imagery API client
    pub imagery: ImageryClient,

    /// Bearer token issuance and verification
    pub tokens: TokenHandler,

    /// Process configuration
    pub config: Config,
}

impl AppState {
    /// Create new application state from configuration
    pub async fn new(config: Config) -> Result<Self> {
        // Create PostgreSQL pool
        let db_pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(&config.database_url)
            .await
            .context("Failed to connect to PostgreSQL")?;

        // Bootstrap schema
        init_schema(&db_pool)
            .await
            .context("Failed to initialize database schema")?;

        let imagery = ImageryClient::new(
            reqwest::Client::new(),
            config.nasa_api_key.clone(),
            config.apod_base_url.clone(),
        );

        let tokens = TokenHandler::new(config.jwt_secret.clone(), config.token_ttl_hours);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                db_pool,
                imagery,
                tokens,
                config,
            }),
        })
    }

    /// Get database pool
    pub fn db_pool(&self) -> &PgPool {
        &self.inner.db_pool
    }

    /// Get upstream imagery client
    pub fn imagery(&self) -> &ImageryClient {
        &self.inner.imagery
    }

    /// Get token handler
    pub fn tokens(&self) -> &TokenHandler {
        &self.inner.tokens
    }

    /// Get process configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Create mock state for tests that never reach the database
    #[cfg(test)]
    pub fn mock() -> Self {
        let config = Config {
            database_url: "postgres://postgres@localhost:5432/stargaze_test".to_string(),
            jwt_secret: "test-secret-key-12345".to_string(),
            nasa_api_key: "DEMO_KEY".to_string(),
            apod_base_url: crate::upstream::DEFAULT_APOD_URL.to_string(),
            token_ttl_hours: 24,
            port: 8099,
            cors_allowed_origins: "http://localhost:3000".to_string(),
        };

        // Lazy pool: no connection is made until a query runs
        let db_pool = PgPoolOptions::new()
            .max_connections(1)
            .connect_lazy(&config.database_url)
            .expect("lazy pool construction cannot fail");

        let imagery = ImageryClient::new(
            reqwest::Client::new(),
            config.nasa_api_key.clone(),
            config.apod_base_url.clone(),
        );

        let tokens = TokenHandler::new(config.jwt_secret.clone(), config.token_ttl_hours);

        Self {
            inner: Arc::new(AppStateInner {
                db_pool,
                imagery,
                tokens,
                config,
            }),
        }
    }
}

/// Create the users and favorites tables if they do not exist
async fn init_schema(pool: &PgPool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS users (
            id UUID PRIMARY KEY,
            email TEXT UNIQUE NOT NULL,
            password_hash TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL
        )",
    )
    .execute(pool)
    .await
    .context("Failed to create users table")?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS favorites (
            id UUID PRIMARY KEY,
            title TEXT NOT NULL,
            date DATE NOT NULL,
            url TEXT NOT NULL,
            copyright TEXT,
            media_type TEXT NOT NULL,
            user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            created_at TIMESTAMPTZ NOT NULL
        )",
    )
    .execute(pool)
    .await
    .context("Failed to create favorites table")?;

    Ok(())
}
