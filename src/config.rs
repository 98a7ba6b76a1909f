//! Connection settings for the SIoT platform.

pub const DEFAULT_SERVER_URI: &str = "tcp://siot.net:1883";
pub const DEFAULT_CLIENT_ID: &str = "StrubT";
pub const DEFAULT_CENTER_ID: &str = "F386-09CA-1F9F-9A1F-BAD3-F573-64A0-2A22";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiotConfig {
    pub server_uri: String,
    pub client_id: String,
    pub center_id: String,
}

impl Default for SiotConfig {
    fn default() -> Self {
        SiotConfig {
            server_uri: DEFAULT_SERVER_URI.to_string(),
            client_id: DEFAULT_CLIENT_ID.to_string(),
            center_id: DEFAULT_CENTER_ID.to_string(),
        }
    }
}

impl SiotConfig {
    /// Load the configuration from the environment.
    ///
    /// `SIOT_MQTT_SERVER_URI`, `SIOT_CLIENT_ID` and `SIOT_CENTER_ID` override
    /// the defaults; unset or empty variables keep them.
    pub fn from_env() -> SiotConfig {
        SiotConfig::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> SiotConfig {
        let defaults = SiotConfig::default();
        let var = |key: &str, default: String| {
            lookup(key).filter(|value| !value.is_empty()).unwrap_or(default)
        };

        SiotConfig {
            server_uri: var("SIOT_MQTT_SERVER_URI", defaults.server_uri),
            client_id: var("SIOT_CLIENT_ID", defaults.client_id),
            center_id: var("SIOT_CENTER_ID", defaults.center_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_siot() {
        let config = SiotConfig::from_lookup(|_| None);
        assert_eq!(config, SiotConfig::default());
        assert_eq!(config.server_uri, "tcp://siot.net:1883");
    }

    #[test]
    fn overrides_and_ignores_empty() {
        let config = SiotConfig::from_lookup(|key| match key {
            "SIOT_MQTT_SERVER_URI" => Some("tcp://localhost:1883".to_string()),
            "SIOT_CLIENT_ID" => Some(String::new()),
            _ => None,
        });
        assert_eq!(config.server_uri, "tcp://localhost:1883");
        assert_eq!(config.client_id, DEFAULT_CLIENT_ID);
        assert_eq!(config.center_id, DEFAULT_CENTER_ID);
    }
}
