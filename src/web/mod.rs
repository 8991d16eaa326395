//! Web API module for imgstation.
//!
//! This module provides the REST API: upload batches, user accounts and
//! directory records.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use handlers::AppState;
pub use router::create_router;
pub use server::WebServer;
