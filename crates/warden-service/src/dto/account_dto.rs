//! Account flow DTOs.

use serde::{Deserialize, Serialize};
use validator::Validate;
use warden_core::Identity;

/// Login request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Login response. Carries no credential material beyond the session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub identity: Identity,
    pub access_token: String,
}

/// Password reset request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
}

/// Account activation request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ActivateRequest {
    #[validate(custom(function = "warden_core::validation::rules::compact_token", message = "Malformed activation token"))]
    pub activation_token: String,

    #[validate(length(min = 1, message = "New password is required"))]
    pub new_password: String,
}
