//! OAuth2 authentication for Microsoft Graph API.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use crate::{GraphConfig, GraphCredentials, GraphError, GraphResult};

/// Source of the current time, injectable for tests.
pub trait Clock: Send + Sync + std::fmt::Debug {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// An access token together with its absolute expiry.
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub secret: String,
    pub expires_at: DateTime<Utc>,
}

/// Something that can mint access tokens for a scope.
#[async_trait]
pub trait TokenSource: Send + Sync + std::fmt::Debug {
    async fn acquire(&self, scope: &str) -> GraphResult<AccessToken>;
}

/// OAuth2 token response from Entra ID.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
    #[allow(dead_code)]
    token_type: String,
}

/// Client credentials flow against the tenant token endpoint.
#[derive(Debug)]
pub struct ClientCredentialsSource {
    credentials: GraphCredentials,
    token_url: String,
    http_client: reqwest::Client,
    clock: Arc<dyn Clock>,
}

impl ClientCredentialsSource {
    /// Creates a token source for the configured tenant.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: &GraphConfig, credentials: GraphCredentials) -> GraphResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| GraphError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            credentials,
            token_url: config.token_url(),
            http_client,
            clock: Arc::new(SystemClock),
        })
    }
}

#[async_trait]
impl TokenSource for ClientCredentialsSource {
    #[instrument(skip(self))]
    async fn acquire(&self, scope: &str) -> GraphResult<AccessToken> {
        use secrecy::ExposeSecret;

        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", self.credentials.client_id.as_str()),
            (
                "client_secret",
                self.credentials.client_secret.expose_secret(),
            ),
            ("scope", scope),
        ];

        let response = self
            .http_client
            .post(&self.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| GraphError::Auth(format!("Token request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GraphError::Auth(format!(
                "Token request failed with status {status}: {body}"
            )));
        }

        let token_response: TokenResponse = response
            .json()
            .await
            .map_err(|e| GraphError::Auth(format!("Failed to parse token response: {e}")))?;

        Ok(AccessToken {
            secret: token_response.access_token,
            expires_at: self.clock.now() + Duration::seconds(token_response.expires_in),
        })
    }
}

/// Cached access token.
#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    /// Returns true if the token is expired or will expire within the grace period.
    fn is_expired(&self, now: DateTime<Utc>, grace_period: Duration) -> bool {
        now + grace_period >= self.expires_at
    }
}

/// Per-scope access token cache with a fixed time-to-live.
///
/// An entry lives until the earlier of the token's own expiry and
/// `acquired_at + ttl`, minus the grace period.
#[derive(Debug)]
pub struct TokenCache {
    source: Arc<dyn TokenSource>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    grace_period: Duration,
    entries: RwLock<HashMap<String, CachedToken>>,
}

impl TokenCache {
    /// Creates a cache backed by the wall clock.
    #[must_use]
    pub fn new(source: Arc<dyn TokenSource>, ttl: Duration) -> Self {
        Self::with_clock(source, ttl, Arc::new(SystemClock))
    }

    /// Creates a cache with an explicit clock.
    #[must_use]
    pub fn with_clock(source: Arc<dyn TokenSource>, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            source,
            clock,
            ttl,
            grace_period: Duration::seconds(60),
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Sets how long before expiry a token is considered stale.
    #[must_use]
    pub fn with_grace_period(mut self, grace_period: Duration) -> Self {
        self.grace_period = grace_period;
        self
    }

    /// Gets a valid access token for `scope`, acquiring one if necessary.
    #[instrument(skip(self))]
    pub async fn get_token(&self, scope: &str) -> GraphResult<String> {
        {
            let entries = self.entries.read().await;
            if let Some(token) = entries.get(scope) {
                if !token.is_expired(self.clock.now(), self.grace_period) {
                    debug!("Using cached token");
                    return Ok(token.access_token.clone());
                }
            }
        }

        self.refresh(scope).await
    }

    /// Acquires a new token for `scope` regardless of the cached one.
    #[instrument(skip(self))]
    pub async fn refresh(&self, scope: &str) -> GraphResult<String> {
        debug!("Acquiring access token");
        let token = self.source.acquire(scope).await?;

        let cap = self.clock.now() + self.ttl;
        let expires_at = token.expires_at.min(cap);

        debug!(
            "Acquired new token, cached until {}",
            expires_at.format("%Y-%m-%d %H:%M:%S UTC")
        );

        let mut entries = self.entries.write().await;
        entries.insert(
            scope.to_string(),
            CachedToken {
                access_token: token.secret.clone(),
                expires_at,
            },
        );

        Ok(token.secret)
    }

    /// Drops every cached token.
    pub async fn invalidate(&self) {
        self.entries.write().await.clear();
    }
}
