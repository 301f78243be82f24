//! Configuration for the Graph directory client.

use secrecy::SecretString;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

use crate::{GraphError, GraphResult};

/// Largest `$top` value Graph accepts for member listings.
pub const MAX_PAGE_SIZE: u32 = 999;

const DEFAULT_API_VERSION: &str = "v1.0";
const DEFAULT_INVITE_REDIRECT_URL: &str = "https://samhandling.org";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_TOKEN_TTL_SECS: u64 = 3000;

/// National cloud the tenant lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GraphCloudEnvironment {
    /// Global Azure.
    #[default]
    Commercial,
    /// Azure US Government (GCC High / DoD).
    UsGovernment,
    /// Azure China (21Vianet).
    China,
}

impl GraphCloudEnvironment {
    /// Token endpoint host for this cloud.
    #[must_use]
    pub fn login_endpoint(&self) -> &'static str {
        match self {
            Self::Commercial => "https://login.microsoftonline.com",
            Self::UsGovernment => "https://login.microsoftonline.us",
            Self::China => "https://login.chinacloudapi.cn",
        }
    }

    /// Graph API host for this cloud.
    #[must_use]
    pub fn graph_endpoint(&self) -> &'static str {
        match self {
            Self::Commercial => "https://graph.microsoft.com",
            Self::UsGovernment => "https://graph.microsoft.us",
            Self::China => "https://microsoftgraph.chinacloudapi.cn",
        }
    }
}

impl FromStr for GraphCloudEnvironment {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "commercial" | "global" => Ok(Self::Commercial),
            "us_government" | "usgov" | "gcc_high" => Ok(Self::UsGovernment),
            "china" => Ok(Self::China),
            other => Err(GraphError::Config(format!(
                "Unknown cloud environment '{other}'"
            ))),
        }
    }
}

impl fmt::Display for GraphCloudEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Commercial => write!(f, "commercial"),
            Self::UsGovernment => write!(f, "us_government"),
            Self::China => write!(f, "china"),
        }
    }
}

/// App registration credentials for the client credentials flow.
#[derive(Debug)]
pub struct GraphCredentials {
    pub client_id: String,
    pub client_secret: SecretString,
}

/// Validated Graph client configuration.
#[derive(Debug, Clone)]
pub struct GraphConfig {
    pub tenant_id: String,
    pub cloud_environment: GraphCloudEnvironment,
    pub login_endpoint: String,
    pub graph_endpoint: String,
    pub api_version: String,
    /// Redirect URL placed in guest invitations.
    pub invite_redirect_url: String,
    /// `$top` used when listing group members.
    pub member_page_size: u32,
    pub request_timeout: Duration,
    /// Upper bound on how long an access token stays cached.
    pub token_ttl: Duration,
}

impl GraphConfig {
    /// Starts a configuration builder.
    #[must_use]
    pub fn builder() -> GraphConfigBuilder {
        GraphConfigBuilder::default()
    }

    /// Versioned API root, e.g. `https://graph.microsoft.com/v1.0`.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!(
            "{}/{}",
            self.graph_endpoint.trim_end_matches('/'),
            self.api_version
        )
    }

    /// `OAuth2` scope requesting the app's static Graph permissions.
    #[must_use]
    pub fn scope(&self) -> String {
        format!("{}/.default", self.graph_endpoint.trim_end_matches('/'))
    }

    /// Tenant specific token endpoint.
    #[must_use]
    pub fn token_url(&self) -> String {
        format!(
            "{}/{}/oauth2/v2.0/token",
            self.login_endpoint.trim_end_matches('/'),
            self.tenant_id
        )
    }
}

/// Builder for [`GraphConfig`].
#[derive(Debug, Default, Clone)]
pub struct GraphConfigBuilder {
    tenant_id: Option<String>,
    cloud_environment: GraphCloudEnvironment,
    login_endpoint: Option<String>,
    graph_endpoint: Option<String>,
    api_version: Option<String>,
    invite_redirect_url: Option<String>,
    member_page_size: Option<u32>,
    request_timeout: Option<Duration>,
    token_ttl: Option<Duration>,
}

impl GraphConfigBuilder {
    #[must_use]
    pub fn tenant_id(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }

    #[must_use]
    pub fn cloud_environment(mut self, cloud: GraphCloudEnvironment) -> Self {
        self.cloud_environment = cloud;
        self
    }

    /// Overrides the login host (used against mock servers).
    #[must_use]
    pub fn login_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.login_endpoint = Some(endpoint.into());
        self
    }

    /// Overrides the Graph host (used against mock servers).
    #[must_use]
    pub fn graph_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.graph_endpoint = Some(endpoint.into());
        self
    }

    #[must_use]
    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = Some(version.into());
        self
    }

    #[must_use]
    pub fn invite_redirect_url(mut self, url: impl Into<String>) -> Self {
        self.invite_redirect_url = Some(url.into());
        self
    }

    #[must_use]
    pub fn member_page_size(mut self, size: u32) -> Self {
        self.member_page_size = Some(size);
        self
    }

    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = Some(ttl);
        self
    }

    /// Validates and builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::Config` for a missing tenant id or page size out
    /// of range, and `GraphError::Url` for malformed endpoints.
    pub fn build(self) -> GraphResult<GraphConfig> {
        let tenant_id = self
            .tenant_id
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| GraphError::Config("tenant_id is required".to_string()))?;

        let login_endpoint = self
            .login_endpoint
            .unwrap_or_else(|| self.cloud_environment.login_endpoint().to_string());
        let graph_endpoint = self
            .graph_endpoint
            .unwrap_or_else(|| self.cloud_environment.graph_endpoint().to_string());
        let invite_redirect_url = self
            .invite_redirect_url
            .unwrap_or_else(|| DEFAULT_INVITE_REDIRECT_URL.to_string());

        Url::parse(&login_endpoint)?;
        Url::parse(&graph_endpoint)?;
        Url::parse(&invite_redirect_url)?;

        let member_page_size = self.member_page_size.unwrap_or(MAX_PAGE_SIZE);
        if !(1..=MAX_PAGE_SIZE).contains(&member_page_size) {
            return Err(GraphError::Config(format!(
                "member_page_size must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }

        let token_ttl = self
            .token_ttl
            .unwrap_or(Duration::from_secs(DEFAULT_TOKEN_TTL_SECS));
        if token_ttl.is_zero() {
            return Err(GraphError::Config("token_ttl must be > 0".to_string()));
        }

        Ok(GraphConfig {
            tenant_id,
            cloud_environment: self.cloud_environment,
            login_endpoint,
            graph_endpoint,
            api_version: self
                .api_version
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            invite_redirect_url,
            member_page_size,
            request_timeout: self
                .request_timeout
                .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            token_ttl,
        })
    }
}
