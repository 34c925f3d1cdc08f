// ==============================================================================
// middleware/auth.rs - Bearer Token Authentication Middleware
// ==============================================================================
// Description: Gate protected routes behind bearer token verification
// Author: Matt Barham
// Created: 2026-07-28
// Modified: 2026-08-04
// Version: 1.0.0
// ==============================================================================
//
// Security: This middleware enforces authentication for every route under the
// protected prefix. The bearer token from the Authorization header is
// verified (signature + expiry) against the configured secret; on success the
// decoded user id is attached to the request's extensions for downstream
// handlers. A failed verification short-circuits the request with 401 before
// any handler logic runs.
//
// ==============================================================================

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    typed_header::TypedHeaderRejection,
    TypedHeader,
};
use uuid::Uuid;

use crate::auth::TokenError;
use crate::models::ErrorResponse;
use crate::state::AppState;

/// Authenticated user id extracted from a verified bearer token
///
/// Inserted into request extensions by [`require_auth`]; handlers receive it
/// as an extractor. If the middleware has not run for the route (or failed),
/// extraction rejects with 401.
///
/// # Example
/// ```rust
/// async fn my_handler(user: AuthUser) -> impl IntoResponse {
///     format!("Hello, {}!", user.0)
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser(pub Uuid);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .copied()
            .ok_or_else(|| AuthError::MissingCredential.into_response())
    }
}

/// Middleware protecting everything under the `/api` prefix.
///
/// Stateless per-request decision over (Authorization header, secret):
/// missing or malformed bearer token, bad signature, and past expiry each
/// terminate the request here; otherwise the verified user id is attached
/// and the request proceeds.
pub async fn require_auth(
    State(state): State<AppState>,
    bearer: Result<TypedHeader<Authorization<Bearer>>, TypedHeaderRejection>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    // An absent header and a present-but-malformed one (wrong scheme, empty
    // value) are the same failure: no usable credential was presented
    let TypedHeader(Authorization(bearer)) = bearer.map_err(|_| AuthError::MissingCredential)?;

    let claims = state.tokens().verify(bearer.token())?;

    // The sub claim is written by our own issuer; a non-UUID sub means the
    // token was not minted here
    let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidToken)?;

    req.extensions_mut().insert(AuthUser(user_id));

    Ok(next.run(req).await)
}

/// Authentication failure kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    MissingCredential,
    InvalidToken,
    ExpiredToken,
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => AuthError::ExpiredToken,
            TokenError::Invalid => AuthError::InvalidToken,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let message = match self {
            AuthError::MissingCredential => "Missing or malformed bearer token",
            AuthError::InvalidToken => "Invalid token",
            AuthError::ExpiredToken => "Expired token",
        };

        (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse::new(message)),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request as HttpRequest, middleware, routing::get, Router};
    use tower::ServiceExt;

    async fn echo_user(user: AuthUser) -> String {
        user.0.to_string()
    }

    fn test_router(state: AppState) -> Router {
        Router::new()
            .route("/protected", get(echo_user))
            .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
            .with_state(state)
    }

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_missing_header_rejected_before_handler() {
        let state = AppState::mock();

        let response = test_router(state)
            .oneshot(
                HttpRequest::builder()
                    .uri("/protected")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        // The handler (which always succeeds) must not have produced a body
        let body = body_string(response).await;
        assert!(body.contains("Missing or malformed bearer token"));
    }

    #[tokio::test]
    async fn test_non_bearer_scheme_rejected() {
        let state = AppState::mock();

        let response = test_router(state)
            .oneshot(
                HttpRequest::builder()
                    .uri("/protected")
                    .header("Authorization", "Basic dXNlcjpwdw==")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_invalid_token_rejected() {
        let state = AppState::mock();

        let response = test_router(state)
            .oneshot(
                HttpRequest::builder()
                    .uri("/protected")
                    .header("Authorization", "Bearer not.a.token")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_string(response).await;
        assert!(body.contains("Invalid token"));
    }

    #[tokio::test]
    async fn test_foreign_secret_rejected() {
        let state = AppState::mock();
        let other = crate::auth::TokenHandler::new("some-other-secret".to_string(), 24);
        let (token, _) = other.issue(Uuid::new_v4(), "a@b.com").unwrap();

        let response = test_router(state)
            .oneshot(
                HttpRequest::builder()
                    .uri("/protected")
                    .header("Authorization", format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_string(response).await;
        assert!(body.contains("Invalid token"));
    }

    #[tokio::test]
    async fn test_valid_token_exposes_exact_user_id() {
        let state = AppState::mock();
        let user_id = Uuid::new_v4();
        let (token, _) = state.tokens().issue(user_id, "a@b.com").unwrap();

        let response = test_router(state)
            .oneshot(
                HttpRequest::builder()
                    .uri("/protected")
                    .header("Authorization", format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, user_id.to_string());
    }

    #[tokio::test]
    async fn test_expired_token_rejected() {
        let state = AppState::mock();
        let issued = chrono::Utc::now() - chrono::Duration::hours(25);
        let (token, _) = state
            .tokens()
            .issue_at(issued, Uuid::new_v4(), "a@b.com")
            .unwrap();

        let response = test_router(state)
            .oneshot(
                HttpRequest::builder()
                    .uri("/protected")
                    .header("Authorization", format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_string(response).await;
        assert!(body.contains("Expired token"));
    }

    #[tokio::test]
    async fn test_extractor_without_middleware_rejects() {
        // A route that takes AuthUser but was never layered with require_auth
        let router = Router::new().route("/unwired", get(echo_user));

        let response = router
            .oneshot(
                HttpRequest::builder()
                    .uri("/unwired")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_token_error_mapping() {
        assert_eq!(AuthError::from(TokenError::Expired), AuthError::ExpiredToken);
        assert_eq!(AuthError::from(TokenError::Invalid), AuthError::InvalidToken);
    }
}
