//! Login against the backend.

use reqwest::Method;
use serde::Serialize;
use sponsorbridge_core::{LoginResponse, SessionContext};
use tracing::info;

use crate::client::{ApiClient, error_message};
use crate::error::{Error, Result};

/// Body of `POST /auth/login`.
#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

impl ApiClient {
    /// Logs in and returns the resulting session.
    ///
    /// The session is not attached to this client; use
    /// [`ApiClient::with_session`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Api`] with the backend's message if the credentials
    /// are rejected, or a transport error.
    pub async fn login(&self, email: &str, password: &str) -> Result<SessionContext> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(Error::InvalidInput(
                "email and password are required".to_string(),
            ));
        }

        let response = self
            .anonymous(Method::POST, "auth/login")?
            .json(&LoginRequest {
                email: email.trim(),
                password,
            })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        let parsed: Option<LoginResponse> = serde_json::from_str(&body).ok();

        match parsed {
            Some(LoginResponse {
                token: Some(token),
                user: Some(user),
                ..
            }) if status.is_success() => {
                info!("Logged in as user {}", user.id);
                Ok(SessionContext::new(token, user))
            }
            Some(LoginResponse {
                message: Some(message),
                ..
            }) => Err(Error::api(status.as_u16(), message)),
            _ => Err(Error::api(
                status.as_u16(),
                error_message(&body).unwrap_or_else(|| "Login failed".to_string()),
            )),
        }
    }
}
