//! Client for the external identity provider that verifies dashboard sign-ins.

use std::fmt;

use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Email/password pair submitted on the sign-in form.
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Identity returned by the provider once credentials are accepted.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct VerifiedUser {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// Client responsible for credential verification against the identity provider.
#[derive(Clone)]
pub struct IdentityClient {
    http: Client,
    base_url: Url,
}

impl IdentityClient {
    pub fn new(base_url: Url, http: Client) -> Self {
        Self { http, base_url }
    }

    /// Asks the provider whether `credentials` identify a known user.
    pub async fn verify_credentials(
        &self,
        credentials: &Credentials,
    ) -> Result<VerifiedUser, IdentityError> {
        let url = self.base_url.join("credentials/verify")?;
        let response = self.http.post(url).json(credentials).send().await?;

        parse_verification(response).await
    }
}

/// Category of a rejected sign-in as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthErrorKind {
    CredentialsSignin,
    Other(String),
}

impl AuthErrorKind {
    fn from_type(value: &str) -> Self {
        match value {
            "CredentialsSignin" => Self::CredentialsSignin,
            other => Self::Other(other.to_string()),
        }
    }
}

/// A sign-in the provider refused to complete.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("authentication failed: {kind:?}")]
pub struct AuthError {
    pub kind: AuthErrorKind,
}

/// Errors that can occur while talking to the identity provider.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("failed to build url: {0}")]
    Url(#[from] url::ParseError),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status {status}: {body}")]
    Status { status: StatusCode, body: String },
}

#[derive(Deserialize)]
struct AuthErrorBody {
    #[serde(rename = "type")]
    error_type: String,
}

async fn parse_verification(response: Response) -> Result<VerifiedUser, IdentityError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| String::from("<unavailable>"));

    if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
        if let Ok(parsed) = serde_json::from_str::<AuthErrorBody>(&body) {
            return Err(AuthError {
                kind: AuthErrorKind::from_type(&parsed.error_type),
            }
            .into());
        }
    }

    Err(IdentityError::Status { status, body })
}
