//! Application configuration loaded from environment variables.
//!
//! Required variables must be present and valid, or the application exits
//! with a clear error message.

use samhandling_graph::{
    GraphCloudEnvironment, GraphConfig, GraphCredentials, GraphError,
};
use secrecy::{ExposeSecret, SecretString};
use std::env;
use std::time::Duration;
use thiserror::Error;

/// Variables read by [`Config::from_env`]. They are never county keys.
pub const CONFIG_VARS: [&str; 12] = [
    "GRAPH_TENANT_ID",
    "GRAPH_CLIENT_ID",
    "GRAPH_CLIENT_SECRET",
    "GRAPH_CLOUD",
    "GRAPH_INVITE_REDIRECT_URL",
    "GRAPH_TOKEN_TTL_SECS",
    "GRAPH_REQUEST_TIMEOUT_SECS",
    "COUNTY_KEY_PREFIX",
    "HOST",
    "PORT",
    "RUST_LOG",
    "CORS_ORIGINS",
];

/// Configuration errors that can occur during environment loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),

    #[error("Invalid value for {var}: {message}")]
    InvalidValue { var: String, message: String },

    #[error("Failed to parse port: {0}")]
    InvalidPort(#[from] std::num::ParseIntError),
}

/// Application configuration.
#[derive(Debug)]
pub struct Config {
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: SecretString,
    pub cloud: GraphCloudEnvironment,
    /// Overrides the default invitation redirect URL.
    pub invite_redirect_url: Option<String>,
    pub token_ttl: Duration,
    pub request_timeout: Duration,
    /// Only variables starting with this prefix are county keys.
    pub county_key_prefix: String,
    pub host: String,
    pub port: u16,
    pub rust_log: String,
    pub cors_origins: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Required variables are missing
    /// - Values are invalid (e.g., invalid port number)
    ///
    /// # Required Variables
    ///
    /// - `GRAPH_TENANT_ID` - Entra ID tenant
    /// - `GRAPH_CLIENT_ID` - App registration client id
    /// - `GRAPH_CLIENT_SECRET` - App registration client secret
    ///
    /// # Optional Variables
    ///
    /// - `GRAPH_CLOUD` - `commercial`, `us_government` or `china` (default: commercial)
    /// - `GRAPH_INVITE_REDIRECT_URL` - Redirect URL for invitations
    /// - `GRAPH_TOKEN_TTL_SECS` - Token cache lifetime (default: 3000)
    /// - `GRAPH_REQUEST_TIMEOUT_SECS` - Outbound request timeout (default: 30)
    /// - `COUNTY_KEY_PREFIX` - Prefix for county key variables (default: none)
    /// - `RUST_LOG` - Log level filter (default: "info")
    /// - `CORS_ORIGINS` - Comma-separated allowed origins (default: "*")
    /// - `HOST` - Bind address (default: "0.0.0.0")
    /// - `PORT` - Listen port (default: 8080)
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (development only)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |name: &str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| ConfigError::MissingVar(name.to_string()))
        };

        let tenant_id = required("GRAPH_TENANT_ID")?;
        let client_id = required("GRAPH_CLIENT_ID")?;
        let client_secret = SecretString::from(required("GRAPH_CLIENT_SECRET")?);

        let cloud = match lookup("GRAPH_CLOUD") {
            Some(value) => value.parse::<GraphCloudEnvironment>().map_err(|e| ConfigError::InvalidValue {
                var: "GRAPH_CLOUD".to_string(),
                message: e.to_string(),
            })?,
            None => GraphCloudEnvironment::default(),
        };

        let token_ttl = parse_secs(&lookup, "GRAPH_TOKEN_TTL_SECS", 3000)?;
        let request_timeout = parse_secs(&lookup, "GRAPH_REQUEST_TIMEOUT_SECS", 30)?;

        let port = lookup("PORT")
            .unwrap_or_else(|| "8080".to_string())
            .parse::<u16>()?;

        let cors_origins = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            tenant_id,
            client_id,
            client_secret,
            cloud,
            invite_redirect_url: lookup("GRAPH_INVITE_REDIRECT_URL"),
            token_ttl,
            request_timeout,
            county_key_prefix: lookup("COUNTY_KEY_PREFIX").unwrap_or_default(),
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            cors_origins,
        })
    }

    /// Get the server bind address as a socket address string.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Builds the validated Graph client configuration.
    pub fn graph_config(&self) -> Result<GraphConfig, GraphError> {
        let mut builder = GraphConfig::builder()
            .tenant_id(&self.tenant_id)
            .cloud_environment(self.cloud)
            .token_ttl(self.token_ttl)
            .request_timeout(self.request_timeout);

        if let Some(url) = &self.invite_redirect_url {
            builder = builder.invite_redirect_url(url);
        }

        builder.build()
    }

    /// Client credentials for the Graph token endpoint.
    pub fn graph_credentials(&self) -> GraphCredentials {
        GraphCredentials {
            client_id: self.client_id.clone(),
            client_secret: SecretString::from(self.client_secret.expose_secret().to_string()),
        }
    }
}

fn parse_secs(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &str,
    default: u64,
) -> Result<Duration, ConfigError> {
    let Some(raw) = lookup(var) else {
        return Ok(Duration::from_secs(default));
    };

    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidValue {
            var: var.to_string(),
            message: format!("Must be a positive number of seconds, got '{raw}'"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    const REQUIRED: [(&str, &str); 3] = [
        ("GRAPH_TENANT_ID", "tenant"),
        ("GRAPH_CLIENT_ID", "client"),
        ("GRAPH_CLIENT_SECRET", "secret"),
    ];

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(vars(&REQUIRED)).unwrap();

        assert_eq!(config.tenant_id, "tenant");
        assert_eq!(config.cloud, GraphCloudEnvironment::Commercial);
        assert_eq!(config.token_ttl, Duration::from_secs(3000));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.county_key_prefix, "");
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
        assert_eq!(config.rust_log, "info");
        assert_eq!(config.cors_origins, vec!["*"]);
    }

    #[test]
    fn test_missing_required_var() {
        let err = Config::from_lookup(vars(&REQUIRED[..2])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing required environment variable: GRAPH_CLIENT_SECRET"
        );
    }

    #[test]
    fn test_overrides() {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend([
            ("GRAPH_CLOUD", "us_government"),
            ("GRAPH_TOKEN_TTL_SECS", "600"),
            ("COUNTY_KEY_PREFIX", "COUNTY_"),
            ("HOST", "127.0.0.1"),
            ("PORT", "3000"),
            ("CORS_ORIGINS", "https://a.no, https://b.no"),
        ]);

        let config = Config::from_lookup(vars(&pairs)).unwrap();
        assert_eq!(config.cloud, GraphCloudEnvironment::UsGovernment);
        assert_eq!(config.token_ttl, Duration::from_secs(600));
        assert_eq!(config.county_key_prefix, "COUNTY_");
        assert_eq!(config.bind_addr(), "127.0.0.1:3000");
        assert_eq!(config.cors_origins, vec!["https://a.no", "https://b.no"]);
    }

    #[test]
    fn test_invalid_values() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("PORT", "not-a-port"));
        assert!(matches!(
            Config::from_lookup(vars(&pairs)),
            Err(ConfigError::InvalidPort(_))
        ));

        let mut pairs = REQUIRED.to_vec();
        pairs.push(("GRAPH_TOKEN_TTL_SECS", "0"));
        assert!(matches!(
            Config::from_lookup(vars(&pairs)),
            Err(ConfigError::InvalidValue { .. })
        ));

        let mut pairs = REQUIRED.to_vec();
        pairs.push(("GRAPH_CLOUD", "mars"));
        assert!(matches!(
            Config::from_lookup(vars(&pairs)),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_graph_config() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("GRAPH_INVITE_REDIRECT_URL", "https://example.org/welcome"));
        let config = Config::from_lookup(vars(&pairs)).unwrap();

        let graph = config.graph_config().unwrap();
        assert_eq!(graph.tenant_id, "tenant");
        assert_eq!(graph.invite_redirect_url, "https://example.org/welcome");
        assert_eq!(graph.token_ttl, Duration::from_secs(3000));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = Config::from_lookup(vars(&REQUIRED)).unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("\"secret\""));
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidValue {
            var: "PORT".to_string(),
            message: "Must be a number".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid value for PORT: Must be a number");
    }
}
