//! Authentication module for imgstation.
//!
//! This module provides password hashing, username validation and
//! account registration.

mod password;
mod registration;
pub mod validation;

pub use password::{
    hash_password, validate_password, verify_password, PasswordError, MAX_PASSWORD_LENGTH,
    MIN_PASSWORD_LENGTH,
};
pub use registration::{ensure_super_admin, register, RegistrationError};
pub use validation::{validate_username, ValidationError};
