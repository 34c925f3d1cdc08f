// ==============================================================================
// main.rs - Stargaze API Entry Point
// ==============================================================================
// Description: Axum web server for the Stargaze astronomy imagery backend
// Author: Matt Barham
// Created: 2026-07-27
// Modified: 2026-08-05
// Version: 1.0.0
// ==============================================================================

use anyhow::{Context, Result};
use axum::{
    http::{header, Method},
    middleware as axum_middleware,
    routing::{delete, get, post},
    Router,
};
use std::net::SocketAddr;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, Level};

mod auth;
mod config;
mod handlers;
mod middleware;
mod models;
mod security;
mod state;
mod upstream;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_target(false)
        .compact()
        .init();

    info!("Starting Stargaze API v1.0.0");

    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env().context("Failed to load configuration")?;
    let port = config.port;

    // Initialize application state
    let state = AppState::new(config)
        .await
        .context("Failed to initialize application state")?;

    // Build router with all endpoints
    let app = build_router(state);

    // Bind server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Stargaze API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    // Run server
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

fn build_router(state: AppState) -> Router {
    // Public authentication routes
    let auth_routes = Router::new()
        .route("/signup", post(handlers::signup))
        .route("/signin", post(handlers::signin));

    // Protected routes: every request is gated by the bearer token middleware
    let api_routes = Router::new()
        .route("/test", get(handlers::auth_test))
        .route("/favorites", get(handlers::list_favorites))
        .route(
            "/getPic",
            get(handlers::get_picture).post(handlers::add_favorite),
        )
        .route("/getPic/date", get(handlers::get_picture_by_date))
        .route("/deleteFavorite/", delete(handlers::delete_favorite))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    // Origins are configured via CORS_ALLOWED_ORIGINS (comma-separated)
    let allowed_origins: Vec<_> = state
        .config()
        .cors_allowed_origins
        .split(',')
        .filter_map(|s| s.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION]);

    // Combine all routes
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .nest("/auth", auth_routes)
        .nest("/api", api_routes)
        .layer(
            ServiceBuilder::new()
                // Request tracing
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;
    use uuid::Uuid;

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_root_is_public() {
        let response = build_router(AppState::mock())
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_string(response).await.contains("Stargaze API"));
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let response = build_router(AppState::mock())
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_protected_routes_require_token() {
        for (method, uri) in [
            (Method::GET, "/api/test"),
            (Method::GET, "/api/favorites"),
            (Method::GET, "/api/getPic"),
            (Method::GET, "/api/getPic/date?date=2026-07-01"),
            (Method::POST, "/api/getPic"),
            (Method::DELETE, "/api/deleteFavorite/"),
        ] {
            let response = build_router(AppState::mock())
                .oneshot(
                    Request::builder()
                        .method(method.clone())
                        .uri(uri)
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();

            assert_eq!(
                response.status(),
                StatusCode::UNAUTHORIZED,
                "{method} {uri} was not gated"
            );
        }
    }

    #[tokio::test]
    async fn test_valid_token_reaches_protected_handler() {
        let state = AppState::mock();
        let user_id = Uuid::new_v4();
        let (token, _) = state.tokens().issue(user_id, "a@b.com").unwrap();

        let response = build_router(state)
            .oneshot(
                Request::builder()
                    .uri("/api/test")
                    .header("Authorization", format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        // The handler sees exactly the user id the token was issued for
        assert!(body_string(response).await.contains(&user_id.to_string()));
    }
}
