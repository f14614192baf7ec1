//! Shared HTTP plumbing for backend calls.

use reqwest::header::AUTHORIZATION;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use sponsorbridge_core::SessionContext;
use tracing::debug;
use url::Url;

use crate::error::{Error, Result};

/// Backend base URL used when nothing else is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";

/// Client for the `SponsorBridge` REST backend.
///
/// Holds the base URL and an optional session. Authenticated calls fail
/// with [`Error::NotAuthenticated`] until a session is attached.
#[derive(Debug, Clone)]
pub struct ApiClient {
    /// Base URL, always ending in `/`.
    base_url: Url,
    /// Session used for bearer authentication.
    session: Option<SessionContext>,
    /// HTTP client.
    http_client: Client,
}

impl ApiClient {
    /// Creates a client for the backend at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        let mut base_url = Url::parse(base_url.as_ref())?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            base_url,
            session: None,
            http_client: Client::new(),
        })
    }

    /// Attaches a session.
    #[must_use]
    pub fn with_session(mut self, session: SessionContext) -> Self {
        self.session = Some(session);
        self
    }

    /// Returns the current session, if any.
    #[must_use]
    pub const fn session(&self) -> Option<&SessionContext> {
        self.session.as_ref()
    }

    /// Returns the base URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolves an endpoint path against the base URL.
    pub(crate) fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    /// Returns the session or [`Error::NotAuthenticated`].
    pub(crate) fn require_session(&self) -> Result<&SessionContext> {
        self.session.as_ref().ok_or(Error::NotAuthenticated)
    }

    /// Builds an authenticated request.
    pub(crate) fn authed(&self, method: reqwest::Method, path: &str) -> Result<RequestBuilder> {
        let session = self.require_session()?;
        let url = self.endpoint(path)?;
        debug!("{method} {url}");
        Ok(self
            .http_client
            .request(method, url)
            .header(AUTHORIZATION, session.bearer()))
    }

    /// Builds an unauthenticated request.
    pub(crate) fn anonymous(&self, method: reqwest::Method, path: &str) -> Result<RequestBuilder> {
        let url = self.endpoint(path)?;
        debug!("{method} {url}");
        Ok(self.http_client.request(method, url))
    }

    /// Sends an authenticated GET and decodes the JSON body.
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.authed(reqwest::Method::GET, path)?.send().await?;
        decode(response).await
    }
}

/// Decodes a JSON body, turning non-success statuses into [`Error::Api`].
pub(crate) async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(Error::api(
            status.as_u16(),
            error_message(&body).unwrap_or_else(|| status.to_string()),
        ));
    }

    serde_json::from_str(&body).map_err(Into::into)
}

/// Fails with [`Error::Api`] unless the status is a success; the body is ignored.
pub(crate) async fn expect_success(response: Response) -> Result<()> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }

    let body = response.text().await.unwrap_or_default();
    Err(Error::api(
        status.as_u16(),
        error_message(&body).unwrap_or_else(|| status.to_string()),
    ))
}

/// Extracts `message` or `error` from a JSON error body.
pub(crate) fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["message", "error"]
        .iter()
        .find_map(|key| value.get(*key)?.as_str().map(str::to_string))
}
