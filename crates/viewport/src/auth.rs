//! Credential login against the backend's mobile auth endpoint.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::client::{request_error, status_error};
use crate::fetch::FetchError;

pub const LOGIN_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginRequest<'a> {
    phone_or_email: &'a str,
    password: &'a str,
}

/// Account fields the app shows after sign-in. The wire uses camelCase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoginSession {
    /// Bearer token for subsequent viewport requests.
    pub token: String,
    pub user: UserProfile,
}

/// Exchange credentials for a session token.
///
/// Error bodies are mined for the server's own wording the same way
/// viewport fetches are, so sign-in failures read like the backend wrote
/// them.
pub async fn login(
    client: &reqwest::Client,
    base_url: &str,
    phone_or_email: &str,
    password: &str,
) -> Result<LoginSession, FetchError> {
    let url = format!("{}/mobile/auth/login", base_url.trim_end_matches('/'));
    let body = LoginRequest {
        phone_or_email,
        password,
    };

    let response = client
        .post(&url)
        .json(&body)
        .timeout(LOGIN_TIMEOUT)
        .send()
        .await
        .map_err(request_error)?;

    let status = response.status();
    if !status.is_success() {
        return Err(status_error(status, response.text().await.ok()));
    }

    response
        .json::<LoginSession>()
        .await
        .map_err(|err| FetchError::BadPayload(err.to_string()))
}
