use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("Port cannot be 0")]
    InvalidPort,

    #[error("Schema path cannot be empty")]
    EmptySchemaPath,

    #[error("{0} must be greater than 0")]
    ZeroValue(&'static str),
}

/// Schema server configuration
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Main listener for schema requests
    pub listener: Listener,
    /// Optional listener for the health and readiness endpoints
    pub admin_listener: Option<Listener>,
    /// Where schema documents are fetched from
    pub upstream: UpstreamConfig,
    /// Limits applied to the outbound HTTP client
    pub transport: TransportConfig,
}

impl Config {
    /// Validates the schema server configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.listener.validate()?;
        if let Some(admin_listener) = &self.admin_listener {
            admin_listener.validate()?;
        }

        if self.upstream.schema_path.trim_matches('/').is_empty() {
            return Err(ValidationError::EmptySchemaPath);
        }

        self.transport.validate()
    }
}

/// Network listener configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Listener {
    /// Host address to bind to (e.g., "0.0.0.0" or "127.0.0.1")
    pub host: String,
    /// Port number to listen on
    pub port: u16,
}

impl Default for Listener {
    fn default() -> Self {
        Listener {
            host: "0.0.0.0".into(),
            port: 3000,
        }
    }
}

impl Listener {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        Ok(())
    }
}

/// Upstream raw-content host configuration.
///
/// The schema URL for a ref is `{base_url}/{ref}/{schema_path}`.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Repository root on the raw-content host
    pub base_url: String,
    /// Path of the schema document inside the repository
    pub schema_path: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        UpstreamConfig {
            base_url: "https://raw.githubusercontent.com/linearmouse/linearmouse".into(),
            schema_path: "Documentation/Configuration.json".into(),
        }
    }
}

/// Outbound HTTP client limits
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct TransportConfig {
    /// Maximum number of concurrent upstream requests
    pub max_connections: usize,
    /// Maximum number of idle pooled connections
    pub max_idle_connections: usize,
    pub idle_timeout_secs: u64,
    /// Bounds the TCP connect and TLS handshake
    pub connect_timeout_secs: u64,
    /// Bounds the whole upstream request
    pub response_timeout_secs: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        TransportConfig {
            max_connections: 5,
            max_idle_connections: 5,
            idle_timeout_secs: 60,
            connect_timeout_secs: 5,
            response_timeout_secs: 10,
        }
    }
}

impl TransportConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_connections == 0 {
            return Err(ValidationError::ZeroValue("max_connections"));
        }
        if self.connect_timeout_secs == 0 {
            return Err(ValidationError::ZeroValue("connect_timeout_secs"));
        }
        if self.response_timeout_secs == 0 {
            return Err(ValidationError::ZeroValue("response_timeout_secs"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_config() {
        let yaml = r#"
listener:
    host: "127.0.0.1"
    port: 8080
admin_listener:
    host: "127.0.0.1"
    port: 8081
upstream:
    base_url: "https://raw.githubusercontent.com/example/project"
    schema_path: "docs/schema.json"
transport:
    max_connections: 2
    response_timeout_secs: 3
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_ok());

        assert_eq!(config.listener.port, 8080);
        assert_eq!(config.admin_listener.as_ref().map(|l| l.port), Some(8081));
        assert_eq!(config.upstream.schema_path, "docs/schema.json");
        assert_eq!(config.transport.max_connections, 2);
        assert_eq!(config.transport.response_timeout_secs, 3);
        // unset fields keep their defaults
        assert_eq!(config.transport.connect_timeout_secs, 5);
        assert_eq!(config.transport.max_idle_connections, 5);
    }

    #[test]
    fn test_defaults() {
        let config: Config = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.listener.host, "0.0.0.0");
        assert_eq!(config.listener.port, 3000);
        assert!(config.admin_listener.is_none());
        assert_eq!(
            config.upstream.base_url,
            "https://raw.githubusercontent.com/linearmouse/linearmouse"
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_errors() {
        let base_config = Config::default();

        let mut config = base_config.clone();
        config.listener.port = 0;
        assert_eq!(config.validate(), Err(ValidationError::InvalidPort));

        let mut config = base_config.clone();
        config.admin_listener = Some(Listener {
            host: "127.0.0.1".into(),
            port: 0,
        });
        assert_eq!(config.validate(), Err(ValidationError::InvalidPort));

        let mut config = base_config.clone();
        config.upstream.schema_path = "/".into();
        assert_eq!(config.validate(), Err(ValidationError::EmptySchemaPath));

        let mut config = base_config.clone();
        config.transport.max_connections = 0;
        assert_eq!(
            config.validate(),
            Err(ValidationError::ZeroValue("max_connections"))
        );

        let mut config = base_config;
        config.transport.response_timeout_secs = 0;
        assert_eq!(
            config.validate(),
            Err(ValidationError::ZeroValue("response_timeout_secs"))
        );
    }

    #[test]
    fn test_deserialization_errors() {
        // Invalid port type
        assert!(
            serde_yaml::from_str::<Config>(
                r#"
listener: {host: "0.0.0.0", port: "not_a_number"}
"#
            )
            .is_err()
        );

        // Listener fields are required once the listener is given
        assert!(
            serde_yaml::from_str::<Config>(
                r#"
listener: {host: "0.0.0.0"}
"#
            )
            .is_err()
        );
    }
}
