use crate::types::constants::{
    API_BASE_URL_ENV, DEFAULT_API_BASE_URL, DEFAULT_BASE_RECONNECT_DELAY_MS,
    DEFAULT_MAX_RECONNECT_ATTEMPTS, NOTIFICATION_STREAM_PATH,
};
use crate::types::{LiveChannelError, Result};
use serde::Deserialize;
use std::time::Duration;
use url::Url;

/// Configuration of a live update channel.
///
/// Every field except `endpoint` has a default, so a JSON or TOML config section only needs
/// to name what it changes:
///
/// ```
/// use live_update_channel::ChannelConfig;
///
/// let config: ChannelConfig = serde_json::from_str(
///     r#"{"endpoint": "https://console.example.com/admin/notifications/stream",
///         "maxReconnectAttempts": 3}"#,
/// ).unwrap();
/// assert!(config.auto_reconnect);
/// assert_eq!(config.base_reconnect_delay_ms, 1000);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChannelConfig {
    /// Absolute URL of the event stream
    pub endpoint: String,
    pub auto_reconnect: bool,
    pub max_reconnect_attempts: u32,
    pub base_reconnect_delay_ms: u64,
    /// Treat the stream as dead after this long without any frame. `None` disables the check.
    pub heartbeat_timeout_ms: Option<u64>,
}

impl ChannelConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }

    /// Notification stream of the admin API at `base_url`
    pub fn notifications(base_url: &str) -> Self {
        Self::new(format!(
            "{}{}",
            base_url.trim_end_matches('/'),
            NOTIFICATION_STREAM_PATH
        ))
    }

    /// Notification stream of the API named by `API_BASE_URL`, or the local default
    pub fn from_env() -> Self {
        let base_url =
            std::env::var(API_BASE_URL_ENV).unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string());
        Self::notifications(&base_url)
    }

    pub fn heartbeat_timeout(&self) -> Option<Duration> {
        self.heartbeat_timeout_ms.map(Duration::from_millis)
    }

    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.endpoint)?;
        if self.base_reconnect_delay_ms == 0 {
            return Err(LiveChannelError::Config(
                "baseReconnectDelayMs must be greater than zero".to_string(),
            ));
        }
        if self.heartbeat_timeout_ms == Some(0) {
            return Err(LiveChannelError::Config(
                "heartbeatTimeoutMs must be greater than zero when set".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            endpoint: format!("{}{}", DEFAULT_API_BASE_URL, NOTIFICATION_STREAM_PATH),
            auto_reconnect: true,
            max_reconnect_attempts: DEFAULT_MAX_RECONNECT_ATTEMPTS,
            base_reconnect_delay_ms: DEFAULT_BASE_RECONNECT_DELAY_MS,
            heartbeat_timeout_ms: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ChannelConfig::default();
        assert!(config.auto_reconnect);
        assert_eq!(config.max_reconnect_attempts, 5);
        assert_eq!(config.base_reconnect_delay_ms, 1000);
        assert_eq!(config.heartbeat_timeout(), None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_notifications_preset() {
        let config = ChannelConfig::notifications("https://console.example.com/api/");
        assert_eq!(
            config.endpoint,
            "https://console.example.com/api/admin/notifications/stream"
        );
    }

    #[test]
    fn test_deserialize_partial_config() {
        let config: ChannelConfig = serde_json::from_str(
            r#"{"endpoint":"http://h/s","autoReconnect":false,"heartbeatTimeoutMs":60000}"#,
        )
        .unwrap();
        assert!(!config.auto_reconnect);
        assert_eq!(config.max_reconnect_attempts, 5);
        assert_eq!(config.heartbeat_timeout(), Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_validation_errors() {
        let mut config = ChannelConfig::new("not a url");
        assert!(matches!(
            config.validate(),
            Err(LiveChannelError::UrlParse(_))
        ));

        config.endpoint = "http://h/s".to_string();
        config.base_reconnect_delay_ms = 0;
        assert!(matches!(config.validate(), Err(LiveChannelError::Config(_))));

        config.base_reconnect_delay_ms = 10;
        config.heartbeat_timeout_ms = Some(0);
        assert!(matches!(config.validate(), Err(LiveChannelError::Config(_))));
    }
}
