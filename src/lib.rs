//! imgstation - a self-hosted image drop
//!
//! Uploads land in time-named batch directories that a background retention
//! sweeper expires. Accounts and directory records live in SQLite behind a
//! JSON API.

pub mod auth;
pub mod config;
pub mod datetime;
pub mod db;
pub mod error;
pub mod logging;
pub mod storage;
pub mod sweeper;
pub mod web;

pub use auth::{hash_password, validate_password, verify_password, PasswordError};
pub use config::Config;
pub use db::{Database, Role, User, UserRepository};
pub use error::{Result, StationError};
pub use storage::{ActivityTracker, UploadStore};
pub use sweeper::{RetentionPolicy, RetentionSweeper, SweepReport};
