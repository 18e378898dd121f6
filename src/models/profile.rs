use crate::models::UserType;
use serde::{Deserialize, Serialize};

/// Keys the client may never write directly, on registration or on edits.
pub const RESERVED_FIELDS: &[&str] = &[
    "_id",
    "email",
    "password",
    "token",
    "resetToken",
    "resetTokenExpiry",
    "userType",
    "createdAt",
    "updatedAt",
];

pub const MIN_PASSWORD_LENGTH: usize = 8;

// Request/Response structures
#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub user_type: Option<UserType>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    /// Type-specific attributes (university, industry, focusAreas, ...).
    #[serde(default)]
    #[schema(value_type = Object)]
    pub profile: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AuthResponse {
    pub success: bool,
    #[schema(value_type = Object)]
    pub user: serde_json::Value,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ProfileResponse {
    pub success: bool,
    #[schema(value_type = Object)]
    pub profile: serde_json::Value,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ProfileListResponse {
    pub success: bool,
    #[schema(value_type = Vec<Object>)]
    pub profiles: Vec<serde_json::Value>,
    pub count: usize,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn is_reserved_field(key: &str) -> bool {
    RESERVED_FIELDS.contains(&key)
}
