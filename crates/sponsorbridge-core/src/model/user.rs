//! User model types.

use serde::{Deserialize, Serialize};

use super::{lenient, null_as_default};

/// Unique identifier for a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl UserId {
    /// Create a new user ID.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for UserId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// Platform role of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Funds sponsorships.
    Sponsor,
    /// Receives sponsorships.
    Sponsee,
    /// Manages users and assignments.
    Admin,
}

impl Role {
    /// Get display name for the role.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Sponsor => "Sponsor",
            Self::Sponsee => "Sponsee",
            Self::Admin => "Administrator",
        }
    }
}

/// Reference to a user as embedded in messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    /// User identifier.
    pub id: UserId,
    /// Display name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Email address.
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    /// Role, when the backend includes one this client knows.
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub role: Option<Role>,
}

impl UserRef {
    /// Creates a user reference with the given id and name.
    #[must_use]
    pub fn new(id: UserId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            email: String::new(),
            role: None,
        }
    }

    /// Name for display, falling back to the email and then the id.
    #[must_use]
    pub fn display_name(&self) -> String {
        if !self.name.is_empty() {
            self.name.clone()
        } else if !self.email.is_empty() {
            self.email.clone()
        } else {
            format!("User {}", self.id)
        }
    }
}

/// Response body of `POST /auth/login`.
///
/// The backend returns `{token, user}` on success and `{message}` otherwise.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoginResponse {
    /// Bearer token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Profile of the authenticated user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserRef>,
    /// Failure reason.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
