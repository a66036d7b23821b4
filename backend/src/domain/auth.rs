//! Authentication primitives: credentials, registrations and token claims.
//!
//! Handlers build these from raw payloads before calling
//! [`crate::domain::AuthService`], so every service input is already valid.

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::user::{Email, PublicUser, UserId, UserValidationError, Username};

/// Minimum accepted password length for new accounts.
pub const PASSWORD_MIN_LEN: usize = 6;

/// Validation failures for authentication payloads.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthValidationError {
    /// A required field was missing or blank.
    #[error("{field} is required")]
    Missing {
        /// Wire name of the field.
        field: &'static str,
    },
    /// The password was shorter than [`PASSWORD_MIN_LEN`].
    #[error("password must be at least {min} characters")]
    PasswordTooShort {
        /// Minimum length.
        min: usize,
    },
    /// Username or email failed validation.
    #[error(transparent)]
    Identity(#[from] UserValidationError),
}

impl AuthValidationError {
    /// Wire name of the offending field.
    #[must_use]
    pub fn field(&self) -> &'static str {
        match self {
            Self::Missing { field } => field,
            Self::PasswordTooShort { .. } => "password",
            Self::Identity(
                UserValidationError::EmptyEmail | UserValidationError::InvalidEmail,
            ) => "email",
            Self::Identity(_) => "username",
        }
    }
}

impl From<AuthValidationError> for super::Error {
    fn from(value: AuthValidationError) -> Self {
        let field = value.field();
        Self::invalid_request(value.to_string())
            .with_details(serde_json::json!({ "field": field }))
    }
}

fn require<'a>(value: Option<&'a str>, field: &'static str) -> Result<&'a str, AuthValidationError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(AuthValidationError::Missing { field }),
    }
}

/// Validated login credentials.
///
/// The password keeps caller-provided whitespace and is zeroed on drop.
///
/// # Examples
/// ```
/// use courseware::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(Some("ada@example.com"), Some("secret")).unwrap();
/// assert_eq!(creds.email().as_str(), "ada@example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: Email,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from optional raw inputs.
    pub fn try_from_parts(
        email: Option<&str>,
        password: Option<&str>,
    ) -> Result<Self, AuthValidationError> {
        let email = Email::new(require(email, "email")?)?;
        let password = match password {
            Some(p) if !p.is_empty() => p,
            _ => return Err(AuthValidationError::Missing { field: "password" }),
        };
        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Normalised email used for lookups.
    #[must_use]
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Password as supplied.
    #[must_use]
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Validated registration request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    username: Username,
    email: Email,
    password: Zeroizing<String>,
}

impl Registration {
    /// Validate every field, reporting the first failure in field order.
    pub fn try_from_parts(
        username: Option<&str>,
        email: Option<&str>,
        password: Option<&str>,
    ) -> Result<Self, AuthValidationError> {
        let username = Username::new(require(username, "username")?)?;
        let email = Email::new(require(email, "email")?)?;
        let password = require(password, "password")?;
        if password.chars().count() < PASSWORD_MIN_LEN {
            return Err(AuthValidationError::PasswordTooShort {
                min: PASSWORD_MIN_LEN,
            });
        }
        Ok(Self {
            username,
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Requested username.
    #[must_use]
    pub fn username(&self) -> &Username {
        &self.username
    }

    /// Normalised email.
    #[must_use]
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Plain-text password awaiting hashing.
    #[must_use]
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Identity embedded in a bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthClaims {
    pub user_id: UserId,
    pub email: String,
}

/// Identity asserted by the external OAuth provider after verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalIdentity {
    pub email: Email,
    pub name: Option<String>,
    pub picture: Option<String>,
}

/// Result of a successful register, login or Google sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub token: String,
    pub user: PublicUser,
}
