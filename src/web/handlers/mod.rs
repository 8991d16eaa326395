//! API handlers.

pub mod auth;
pub mod directory;
pub mod storage;
pub mod user;

pub use auth::*;
pub use directory::*;
pub use storage::*;
pub use user::*;
