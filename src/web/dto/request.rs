//! Request DTOs for Web API.

use serde::Deserialize;
use validator::Validate;

use super::validation::{absolute_path, display_name};
use crate::Role;

/// Login request.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Username.
    pub username: String,
    /// Password.
    pub password: String,
}

/// User registration request.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Username.
    #[validate(length(min = 3, max = 32, message = "Username must be 3-32 characters"))]
    pub username: String,
    /// Password.
    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub password: String,
}

/// Update of the current user's own account.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateMeRequest {
    /// New password.
    #[serde(default)]
    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub password: Option<String>,
}

/// User creation by a super admin.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    /// Username.
    #[validate(length(min = 3, max = 32, message = "Username must be 3-32 characters"))]
    pub username: String,
    /// Password.
    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub password: String,
    /// Role of the new account.
    #[serde(default)]
    pub role: Role,
}

/// Directory record creation.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateDirectoryRecordRequest {
    /// Display name.
    #[validate(
        length(max = 255, message = "Name must be at most 255 characters"),
        custom(function = "display_name")
    )]
    pub name: String,
    /// Absolute filesystem path.
    #[validate(custom(function = "absolute_path"))]
    pub path: String,
}

/// Upload batch rename.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameBatchRequest {
    /// Current batch name.
    pub old_name: String,
    /// New batch name.
    pub new_name: String,
}

/// Query parameters for a file download.
#[derive(Debug, Deserialize)]
pub struct FileQuery {
    /// Batch name.
    pub directory: String,
    /// File name inside the batch.
    pub filename: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_validation() {
        let req = RegisterRequest {
            username: "alice".to_string(),
            password: "password123".to_string(),
        };
        assert!(req.validate().is_ok());

        let req = RegisterRequest {
            username: "al".to_string(),
            password: "short".to_string(),
        };
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("username"));
        assert!(fields.contains_key("password"));
    }

    #[test]
    fn test_update_me_request_optional_password() {
        let req: UpdateMeRequest = serde_json::from_str("{}").unwrap();
        assert!(req.password.is_none());
        assert!(req.validate().is_ok());

        let req: UpdateMeRequest = serde_json::from_str(r#"{"password":"short"}"#).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_create_user_request_role() {
        let req: CreateUserRequest = serde_json::from_str(
            r#"{"username":"bob","password":"password123","role":"super_admin"}"#,
        )
        .unwrap();
        assert_eq!(req.role, Role::SuperAdmin);

        let req: CreateUserRequest =
            serde_json::from_str(r#"{"username":"bob","password":"password123"}"#).unwrap();
        assert_eq!(req.role, Role::User);
    }

    #[test]
    fn test_directory_record_request_validation() {
        let req = CreateDirectoryRecordRequest {
            name: "Photos".to_string(),
            path: "/srv/photos".to_string(),
        };
        assert!(req.validate().is_ok());

        let req = CreateDirectoryRecordRequest {
            name: "Photos".to_string(),
            path: "relative/photos".to_string(),
        };
        assert!(req.validate().unwrap_err().field_errors().contains_key("path"));

        let req = CreateDirectoryRecordRequest {
            name: "   ".to_string(),
            path: "/srv/photos".to_string(),
        };
        assert!(req.validate().unwrap_err().field_errors().contains_key("name"));
    }

    #[test]
    fn test_rename_request_camel_case() {
        let req: RenameBatchRequest =
            serde_json::from_str(r#"{"oldName":"0101-1200","newName":"trip"}"#).unwrap();
        assert_eq!(req.old_name, "0101-1200");
        assert_eq!(req.new_name, "trip");
    }
}
