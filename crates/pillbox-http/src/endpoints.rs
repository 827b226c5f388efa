//! Auth endpoint paths and request/response types.

use std::fmt;

use serde::{Deserialize, Serialize};

use pillbox_core::{AuthTokens, UserProfile};

// ============================================================================
// Endpoint Paths
// ============================================================================

pub const REGISTER: &str = "/auth/register";
pub const LOGIN: &str = "/auth/login";
pub const LOGOUT: &str = "/auth/logout";
pub const REFRESH_TOKEN: &str = "/auth/refresh-token";
pub const VERIFY_EMAIL: &str = "/auth/verify-email";
pub const SEND_VERIFICATION_EMAIL: &str = "/auth/send-verification-email";
pub const FORGOT_PASSWORD: &str = "/auth/forgot-password";
pub const VERIFY_RESET_PASSWORD: &str = "/auth/verify-reset-password";
pub const RESET_PASSWORD: &str = "/auth/reset-password";
pub const CHANGE_PASSWORD: &str = "/auth/change-password";
pub const ME: &str = "/user/me";

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for login.
#[derive(Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

impl fmt::Debug for LoginRequest<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// A new account, as sent to the register endpoint.
#[derive(Clone, Serialize, Deserialize)]
pub struct NewAccount {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub user_type: String,
}

impl fmt::Debug for NewAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewAccount")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("user_type", &self.user_type)
            .finish()
    }
}

/// Body for endpoints that only take an email address.
#[derive(Debug, Serialize)]
pub struct EmailRequest<'a> {
    pub email: &'a str,
}

/// Body for endpoints that check an emailed code.
#[derive(Debug, Serialize)]
pub struct EmailTokenRequest<'a> {
    pub email: &'a str,
    pub token: &'a str,
}

/// Request body for reset-password.
#[derive(Serialize)]
pub struct ResetPasswordRequest<'a> {
    pub email: &'a str,
    pub token: &'a str,
    pub password: &'a str,
}

impl fmt::Debug for ResetPasswordRequest<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResetPasswordRequest")
            .field("email", &self.email)
            .field("token", &self.token)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Request body for change-password. Sent with the access token.
#[derive(Serialize)]
pub struct ChangePasswordRequest<'a> {
    pub current_password: &'a str,
    pub new_password: &'a str,
}

impl fmt::Debug for ChangePasswordRequest<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangePasswordRequest")
            .field("current_password", &"[REDACTED]")
            .field("new_password", &"[REDACTED]")
            .finish()
    }
}

/// Request body for refresh-token. The token also travels as the bearer.
#[derive(Serialize)]
pub struct RefreshTokenRequest<'a> {
    #[serde(rename = "refreshToken")]
    pub refresh_token: &'a str,
}

/// `data` of a login or registration response.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSession {
    pub user: UserProfile,
    pub tokens: AuthTokens,
}
