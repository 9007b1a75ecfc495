use std::time::Duration;

use foundation::bounds::LatLngBounds;

/// Client-side timeout applied to each viewport or login request.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// Delay between a text edit and the autocomplete request it triggers.
pub const DEFAULT_PLACES_DEBOUNCE: Duration = Duration::from_millis(350);

/// Trimmed queries shorter than this clear results instead of searching.
pub const DEFAULT_MIN_QUERY_LEN: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    MissingBaseUrl,
    MissingApiKey,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::MissingBaseUrl => write!(f, "API base URL is not configured"),
            ConfigError::MissingApiKey => write!(f, "places API key is not configured"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Where viewport and login requests go.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportConfig {
    pub base_url: String,
    /// Sent as `Authorization: Bearer <token>` when present.
    pub auth_token: Option<String>,
    pub fetch_timeout: Duration,
}

impl ViewportConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            auth_token: None,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    /// A missing base URL is reported once here rather than as a transport
    /// error on every request.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::MissingBaseUrl);
        }
        Ok(())
    }
}

/// Place autocomplete settings. The vendor client itself sits behind
/// [`crate::places::PlaceProvider`]; this only carries what the session
/// needs to pace and scope searches.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacesConfig {
    pub api_key: String,
    /// Searches are biased to this rectangle.
    pub search_rect: LatLngBounds,
    pub min_query_len: usize,
    pub debounce: Duration,
}

impl PlacesConfig {
    pub fn new(api_key: impl Into<String>, search_rect: LatLngBounds) -> Self {
        Self {
            api_key: api_key.into(),
            search_rect,
            min_query_len: DEFAULT_MIN_QUERY_LEN,
            debounce: DEFAULT_PLACES_DEBOUNCE,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect() -> LatLngBounds {
        LatLngBounds::new(16.9, 17.9, 78.0, 79.0)
    }

    #[test]
    fn viewport_config_defaults() {
        let config = ViewportConfig::new("https://api.example.com");
        assert_eq!(config.auth_token, None);
        assert_eq!(config.fetch_timeout, Duration::from_secs(15));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn blank_base_url_is_rejected() {
        let config = ViewportConfig::new("   ");
        assert_eq!(config.validate(), Err(ConfigError::MissingBaseUrl));
    }

    #[test]
    fn places_config_defaults() {
        let config = PlacesConfig::new("key-123", rect());
        assert_eq!(config.min_query_len, 2);
        assert_eq!(config.debounce, Duration::from_millis(350));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn blank_api_key_is_rejected() {
        let config = PlacesConfig::new("", rect());
        assert_eq!(config.validate(), Err(ConfigError::MissingApiKey));
    }

    #[test]
    fn config_errors_render_for_display() {
        assert_eq!(
            ConfigError::MissingBaseUrl.to_string(),
            "API base URL is not configured"
        );
        assert_eq!(
            ConfigError::MissingApiKey.to_string(),
            "places API key is not configured"
        );
    }
}
