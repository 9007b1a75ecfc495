//! Fetcher seam between the viewport session and whatever produces payloads.
//!
//! The session never talks HTTP directly; it holds a `dyn ViewportFetcher`
//! so tests can script responses and the CLI can reuse the same path.

use std::future::Future;
use std::pin::Pin;

use foundation::bounds::LatLngBounds;
use foundation::region::Region;
use serde_json::Value;

use crate::config::ConfigError;

/// Boxed future that can hop between tasks.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// One viewport query in wire terms: corner bounds plus approximate zoom.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ViewportQuery {
    pub bounds: LatLngBounds,
    pub zoom: f64,
}

impl ViewportQuery {
    pub fn from_region(region: &Region) -> Self {
        Self {
            bounds: region.bounds(),
            zoom: region.approx_zoom(),
        }
    }

    /// Query-string pairs in wire form: coordinates at 6 decimals, zoom at 2.
    pub fn query_pairs(&self) -> [(&'static str, String); 5] {
        [
            ("minLat", format!("{:.6}", self.bounds.min_lat_deg)),
            ("maxLat", format!("{:.6}", self.bounds.max_lat_deg)),
            ("minLng", format!("{:.6}", self.bounds.min_lon_deg)),
            ("maxLng", format!("{:.6}", self.bounds.max_lon_deg)),
            ("zoom", format!("{:.2}", self.zoom)),
        ]
    }
}

#[derive(Debug)]
pub enum FetchError {
    Config(ConfigError),
    /// Connection-level failure before any response arrived.
    Transport(String),
    Timeout,
    /// Non-2xx response. `message` carries the server's own wording when the
    /// body had one, else the HTTP status text.
    Status { code: u16, message: Option<String> },
    /// 2xx response whose body was not the expected JSON.
    BadPayload(String),
}

impl FetchError {
    /// Wording suitable for the session's user-facing error field.
    pub fn user_message(&self) -> String {
        match self {
            FetchError::Config(err) => err.to_string(),
            FetchError::Transport(reason) => format!("Network error: {reason}"),
            FetchError::Timeout => "Request timed out".to_string(),
            FetchError::Status {
                message: Some(message),
                ..
            } => message.clone(),
            FetchError::Status { code, message: None } => format!("Request failed (HTTP {code})"),
            FetchError::BadPayload(_) => "Server sent an unreadable response".to_string(),
        }
    }
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::Config(err) => write!(f, "configuration error: {err}"),
            FetchError::Transport(reason) => write!(f, "transport error: {reason}"),
            FetchError::Timeout => write!(f, "request timed out"),
            FetchError::Status {
                code,
                message: Some(message),
            } => write!(f, "HTTP {code}: {message}"),
            FetchError::Status { code, message: None } => write!(f, "HTTP {code}"),
            FetchError::BadPayload(reason) => write!(f, "unreadable payload: {reason}"),
        }
    }
}

impl std::error::Error for FetchError {}

impl From<ConfigError> for FetchError {
    fn from(err: ConfigError) -> Self {
        FetchError::Config(err)
    }
}

/// Source of raw viewport payloads.
pub trait ViewportFetcher: Send + Sync {
    fn fetch_viewport(&self, query: ViewportQuery) -> BoxFuture<'_, Result<Value, FetchError>>;
}
