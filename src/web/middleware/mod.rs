//! Middleware for Web API.

pub mod auth;
pub mod cors;

pub use auth::{jwt_auth, AuthUser, CurrentUser, JwtClaims, JwtState, SuperAdmin};
pub use cors::create_cors_layer;
