// ==============================================================================
// middleware/mod.rs - Request Processing Middleware
// ==============================================================================
// Description: Authentication middleware for protected routes
// Author: Matt Barham
// Created: 2026-07-28
// Modified: 2026-07-28
// Version: 1.0.0
// ==============================================================================

pub mod auth;

pub use auth::{AuthUser, require_auth};
