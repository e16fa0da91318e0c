use serde::{Deserialize, Serialize};

/// Gateway service configuration, persisted as JSON in the data directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Allow LAN access.
    /// - false: loopback only (default)
    /// - true: bind 0.0.0.0
    #[serde(default)]
    pub allow_lan_access: bool,

    /// Listen port
    pub port: u16,

    /// Base URL of the upstream marketplace backend, no trailing slash
    pub upstream_base_url: String,

    /// Per-request timeout (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,

    /// Connect timeout (seconds)
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,

    /// Interval of the session-refresh probe (seconds); 0 disables it
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval: u64,

    /// Emit per-request trace logging
    #[serde(default)]
    pub enable_logging: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            allow_lan_access: false,
            port: 8080,
            upstream_base_url: "http://127.0.0.1:5000".to_string(),
            request_timeout: default_request_timeout(),
            connect_timeout: default_connect_timeout(),
            refresh_interval: default_refresh_interval(),
            enable_logging: false,
        }
    }
}

fn default_request_timeout() -> u64 {
    60
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_refresh_interval() -> u64 {
    240
}

impl GatewayConfig {
    pub fn get_bind_address(&self) -> &str {
        if self.allow_lan_access {
            "0.0.0.0"
        } else {
            "127.0.0.1"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_address_follows_lan_flag() {
        let mut config = GatewayConfig::default();
        assert_eq!(config.get_bind_address(), "127.0.0.1");

        config.allow_lan_access = true;
        assert_eq!(config.get_bind_address(), "0.0.0.0");
    }

    #[test]
    fn missing_fields_take_defaults() {
        let config: GatewayConfig =
            serde_json::from_str(r#"{"port": 9000, "upstream_base_url": "http://backend:5000"}"#)
                .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.request_timeout, 60);
        assert_eq!(config.connect_timeout, 10);
        assert_eq!(config.refresh_interval, 240);
        assert!(!config.allow_lan_access);
    }
}
