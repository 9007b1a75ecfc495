//! HTTP implementation of [`ViewportFetcher`] against the backend's
//! viewport endpoint.

use serde_json::Value;

use crate::config::{ConfigError, ViewportConfig};
use crate::fetch::{BoxFuture, FetchError, ViewportFetcher, ViewportQuery};

pub struct HttpViewportClient {
    config: ViewportConfig,
    client: reqwest::Client,
}

impl HttpViewportClient {
    /// Fails up front when the config is unusable, so a misconfigured build
    /// surfaces once instead of on every pan.
    pub fn new(config: ViewportConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            client: reqwest::Client::new(),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/mobile/map/viewport",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

impl ViewportFetcher for HttpViewportClient {
    fn fetch_viewport(&self, query: ViewportQuery) -> BoxFuture<'_, Result<Value, FetchError>> {
        let url = self.endpoint();
        Box::pin(async move {
            let mut request = self
                .client
                .get(&url)
                .query(&query.query_pairs())
                .timeout(self.config.fetch_timeout);
            if let Some(token) = &self.config.auth_token {
                request = request.bearer_auth(token);
            }

            let response = request.send().await.map_err(request_error)?;
            let status = response.status();
            if !status.is_success() {
                return Err(status_error(status, response.text().await.ok()));
            }

            response
                .json::<Value>()
                .await
                .map_err(|err| FetchError::BadPayload(err.to_string()))
        })
    }
}

/// Timeouts get their own variant; everything else reqwest reports before a
/// response is transport-level.
pub(crate) fn request_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Transport(err.to_string())
    }
}

/// Error for a non-2xx response. Prefers the server's `message`, then
/// `title`, then the HTTP status text.
pub(crate) fn status_error(status: reqwest::StatusCode, body: Option<String>) -> FetchError {
    let from_body = body.as_deref().and_then(|text| {
        let value: Value = serde_json::from_str(text).ok()?;
        ["message", "title"]
            .iter()
            .find_map(|key| value.get(key).and_then(Value::as_str).map(str::to_string))
    });
    FetchError::Status {
        code: status.as_u16(),
        message: from_body.or_else(|| status.canonical_reason().map(str::to_string)),
    }
}
