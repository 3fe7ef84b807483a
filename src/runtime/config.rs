//! Host configuration.

use std::collections::HashMap;

/// Port the platform asks a custom handler to listen on.
pub const PORT_ENV: &str = "FUNCTIONS_CUSTOMHANDLER_PORT";
/// Bind address override.
pub const HOST_ENV: &str = "HELLO_TRIGGER_HOST";
/// Route prefix override.
pub const ROUTE_PREFIX_ENV: &str = "HELLO_TRIGGER_ROUTE_PREFIX";

/// Configuration for the host server.
#[derive(Debug, Clone)]
pub struct HostConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Path prefix in front of every function name.
    pub route_prefix: String,
    /// Path of the health check endpoint.
    pub health_path: String,
    /// Whether to serve the health check endpoint.
    pub enable_health: bool,
    /// Maximum request body size in bytes.
    pub max_body_size: usize,
    /// Environment variables exposed to every function.
    pub env: HashMap<String, String>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7071,
            route_prefix: "/api".to_string(),
            health_path: "/_health".to_string(),
            enable_health: true,
            max_body_size: 1024 * 1024, // 1MB
            env: HashMap::new(),
        }
    }
}

impl HostConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(std::env::vars())
    }

    /// Defaults overridden by the given variables.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut config = Self::default();
        for (key, value) in vars {
            match key.as_ref() {
                PORT_ENV => {
                    let value = value.into();
                    config.port = value
                        .trim()
                        .parse()
                        .map_err(|_| ConfigError::InvalidPort(value))?;
                }
                HOST_ENV => config.host = value.into(),
                ROUTE_PREFIX_ENV => config = config.route_prefix(value),
                _ => {}
            }
        }
        Ok(config)
    }

    /// Set the host address.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the port.
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the route prefix; normalized to a leading slash and no trailing one.
    pub fn route_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        let trimmed = prefix.trim_matches('/');
        self.route_prefix = if trimmed.is_empty() {
            String::new()
        } else {
            format!("/{}", trimmed)
        };
        self
    }

    /// Set the maximum request body size.
    pub fn max_body_size(mut self, bytes: usize) -> Self {
        self.max_body_size = bytes;
        self
    }

    /// Turn the health endpoint on or off.
    pub fn enable_health(mut self, enabled: bool) -> Self {
        self.enable_health = enabled;
        self
    }

    /// Add an environment variable.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Get the bind address.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Invalid configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidPort(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidPort(value) => {
                write!(f, "{} is not a valid port: '{}'", PORT_ENV, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
