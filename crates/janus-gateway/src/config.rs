//! Configuration for the Janus gateway.
//!
//! Loaded once at startup and immutable thereafter. Requests never read the
//! environment; everything flows from this object, which also makes the
//! pipeline testable with fabricated configurations.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use janus_core::{GateError, GateResult};
use janus_middleware::GatePolicy;

/// Gateway configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener and upstream settings.
    pub server: ServerSettings,
    /// Central-auth settings.
    pub auth: AuthSettings,
}

impl GatewayConfig {
    /// Load configuration from a TOML or JSON file.
    pub fn from_file(path: impl Into<PathBuf>) -> GateResult<Self> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| GateError::config(format!("failed to read config file: {e}")))?;

        let extension = path.extension().and_then(|s| s.to_str()).unwrap_or("");
        match extension {
            "toml" => toml::from_str(&content)
                .map_err(|e| GateError::config(format!("invalid TOML: {e}"))),
            "json" => serde_json::from_str(&content)
                .map_err(|e| GateError::config(format!("invalid JSON: {e}"))),
            _ => Err(GateError::config(format!(
                "unsupported config format: {extension}"
            ))),
        }
    }

    /// Apply environment variable overrides.
    ///
    /// Environment variables are prefixed with `JANUS_GATEWAY_` and use
    /// uppercase `snake_case`.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(addr) = std::env::var("JANUS_GATEWAY_LISTEN_ADDR") {
            self.server.listen_addr = addr;
        }

        if let Ok(port) = std::env::var("JANUS_GATEWAY_LISTEN_PORT") {
            if let Ok(port) = port.parse() {
                self.server.listen_port = port;
            }
        }

        if let Ok(url) = std::env::var("JANUS_GATEWAY_UPSTREAM_URL") {
            self.server.upstream_url = url;
        }

        if let Ok(timeout) = std::env::var("JANUS_GATEWAY_UPSTREAM_TIMEOUT") {
            if let Ok(secs) = timeout.parse::<u64>() {
                self.server.upstream_timeout = Duration::from_secs(secs);
            }
        }

        if let Ok(url) = std::env::var("JANUS_GATEWAY_INTROSPECT_URL") {
            self.auth.introspect_url = url;
        }

        if let Ok(url) = std::env::var("JANUS_GATEWAY_LOGIN_URL") {
            self.auth.login_url = url;
        }

        if let Ok(id) = std::env::var("JANUS_GATEWAY_CLIENT_ID") {
            self.auth.client_id = id;
        }

        if let Ok(secret) = std::env::var("JANUS_GATEWAY_CLIENT_SECRET") {
            self.auth.client_secret = secret;
        }

        if let Ok(timeout) = std::env::var("JANUS_GATEWAY_INTROSPECT_TIMEOUT") {
            if let Ok(secs) = timeout.parse::<u64>() {
                self.auth.introspect_timeout = Duration::from_secs(secs);
            }
        }

        if let Ok(paths) = std::env::var("JANUS_GATEWAY_PUBLIC_PATHS") {
            self.auth.public_paths = paths
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(ToString::to_string)
                .collect();
        }

        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> GateResult<()> {
        if self.server.upstream_url.is_empty() {
            return Err(GateError::config("upstream_url is required"));
        }
        if !is_http_url(&self.server.upstream_url) {
            return Err(GateError::config(
                "upstream_url must start with http:// or https://",
            ));
        }

        if self.auth.introspect_url.is_empty() {
            return Err(GateError::config("introspect_url is required"));
        }
        if !is_http_url(&self.auth.introspect_url) {
            return Err(GateError::config(
                "introspect_url must start with http:// or https://",
            ));
        }

        if self.auth.login_url.is_empty() {
            return Err(GateError::config("login_url is required"));
        }

        Ok(())
    }

    /// Build the gate policy from this configuration.
    ///
    /// The default public set (health and API documentation) is always
    /// present; configured paths extend it.
    #[must_use]
    pub fn gate_policy(&self) -> GatePolicy {
        let mut policy = GatePolicy::new(self.auth.login_url.clone());
        for path in &self.auth.public_paths {
            policy = policy.with_public_path(path.clone());
        }
        policy
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// Listener and upstream settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Address to bind to.
    pub listen_addr: String,
    /// Port the gateway listens on.
    pub listen_port: u16,
    /// Upstream application URL that served requests are forwarded to.
    pub upstream_url: String,
    /// Upstream request timeout.
    #[serde(with = "humantime_serde")]
    pub upstream_timeout: Duration,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1".to_string(),
            listen_port: 8080,
            upstream_url: String::new(),
            upstream_timeout: Duration::from_secs(30),
        }
    }
}

/// Central-auth settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    /// Introspection endpoint URL.
    pub introspect_url: String,
    /// Login page URL.
    pub login_url: String,
    /// Service-level client identifier.
    pub client_id: String,
    /// Service-level client secret.
    pub client_secret: String,
    /// Timeout for the introspection call.
    #[serde(with = "humantime_serde")]
    pub introspect_timeout: Duration,
    /// Extra paths exempt from authentication.
    pub public_paths: Vec<String>,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            introspect_url: String::new(),
            login_url: String::new(),
            client_id: String::new(),
            client_secret: String::new(),
            introspect_timeout: Duration::from_secs(3),
            public_paths: Vec::new(),
        }
    }
}

/// Serde adapter for durations written as `"500ms"`, `"3s"`, `"1m"`, or a
/// bare number of seconds.
mod humantime_serde {
    use std::time::Duration;

    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let s = format!("{}s", duration.as_secs());
        serializer.serialize_str(&s)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_duration(&s).map_err(serde::de::Error::custom)
    }

    fn parse_duration(s: &str) -> Result<Duration, String> {
        let s = s.trim();
        if let Some(stripped) = s.strip_suffix("ms") {
            let n: u64 = stripped.trim().parse().map_err(|_| "invalid duration")?;
            Ok(Duration::from_millis(n))
        } else if let Some(stripped) = s.strip_suffix('s') {
            let n: u64 = stripped.trim().parse().map_err(|_| "invalid duration")?;
            Ok(Duration::from_secs(n))
        } else if let Some(stripped) = s.strip_suffix('m') {
            let n: u64 = stripped.trim().parse().map_err(|_| "invalid duration")?;
            Ok(Duration::from_secs(n * 60))
        } else {
            // Assume seconds
            let n: u64 = s.parse().map_err(|_| "invalid duration")?;
            Ok(Duration::from_secs(n))
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_parse_duration() {
            assert_eq!(parse_duration("500ms"), Ok(Duration::from_millis(500)));
            assert_eq!(parse_duration("3s"), Ok(Duration::from_secs(3)));
            assert_eq!(parse_duration("2m"), Ok(Duration::from_secs(120)));
            assert_eq!(parse_duration("30"), Ok(Duration::from_secs(30)));
            assert!(parse_duration("soon").is_err());
        }
    }
}
