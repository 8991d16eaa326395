//! Response DTOs for Web API.

use serde::Serialize;

use crate::datetime::to_rfc3339;
use crate::db::{DirectoryRecord, User};
use crate::Role;

/// Generic API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a new API response.
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Login response.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Access token (JWT).
    pub token: String,
    /// Token expiry in seconds.
    pub expires_in: u64,
    /// User information.
    pub user: UserResponse,
}

/// User information in responses.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    /// User ID.
    pub id: i64,
    /// Username.
    pub username: String,
    /// User role.
    pub role: Role,
    /// Creation time (RFC 3339).
    pub created_at: String,
    /// Last update time (RFC 3339).
    pub updated_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            role: user.role,
            created_at: to_rfc3339(&user.created_at),
            updated_at: to_rfc3339(&user.updated_at),
        }
    }
}

/// Directory record in responses.
#[derive(Debug, Serialize)]
pub struct DirectoryRecordResponse {
    /// Record ID.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Absolute path.
    pub path: String,
    /// Owner ID.
    pub user_id: i64,
    /// Owner username.
    pub username: String,
    /// Creation time (RFC 3339).
    pub created_at: String,
    /// Last update time (RFC 3339).
    pub updated_at: String,
}

impl From<DirectoryRecord> for DirectoryRecordResponse {
    fn from(record: DirectoryRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            path: record.path,
            user_id: record.user_id,
            username: record.username,
            created_at: to_rfc3339(&record.created_at),
            updated_at: to_rfc3339(&record.updated_at),
        }
    }
}

/// A single upload batch.
#[derive(Debug, Serialize)]
pub struct BatchResponse {
    /// Batch name.
    pub directory: String,
}

/// All upload batches, newest first.
#[derive(Debug, Serialize)]
pub struct BatchListResponse {
    /// Batch names.
    pub directories: Vec<String>,
}

/// Files in one batch.
#[derive(Debug, Serialize)]
pub struct FileListResponse {
    /// File names, ascending.
    pub files: Vec<String>,
}

/// Result of a multipart upload.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    /// Batch the files were stored in.
    pub directory: String,
    /// Stored file names, in upload order.
    pub files: Vec<String>,
}
