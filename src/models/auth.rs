//! Authentication-related models

use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};

use super::user::UserProfile;

/// Login request body
#[derive(Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Login response
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub access: String,
    pub refresh: String,
    pub user: UserProfile,
}

/// Login credentials held by the caller
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: Secret<String>,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: Secret::new(password.into()),
        }
    }

    pub(crate) fn as_request(&self) -> LoginRequest<'_> {
        LoginRequest {
            username: &self.username,
            password: self.password.expose_secret(),
        }
    }
}

/// Registration form fields as collected from the user
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationProfile {
    pub username: String,
    pub email: String,
    pub password: Secret<String>,
    pub password_confirmation: Secret<String>,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub employee_id: Option<String>,
}

/// Registration body in the backend's field naming
#[derive(Serialize)]
pub struct RegisterRequest<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub confirm_password: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub department: &'a str,
    pub position: &'a str,
    pub location: &'a str,
    pub employee_id: &'a str,
}

impl<'a> From<&'a RegistrationProfile> for RegisterRequest<'a> {
    fn from(profile: &'a RegistrationProfile) -> Self {
        Self {
            username: &profile.username,
            email: &profile.email,
            password: profile.password.expose_secret(),
            confirm_password: profile.password_confirmation.expose_secret(),
            first_name: &profile.first_name,
            last_name: &profile.last_name,
            department: profile.department.as_deref().unwrap_or_default(),
            position: profile.position.as_deref().unwrap_or_default(),
            location: profile.location.as_deref().unwrap_or_default(),
            employee_id: profile.employee_id.as_deref().unwrap_or_default(),
        }
    }
}
