//! Microsoft Graph API HTTP client.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::{
    ClientCredentialsSource, GraphConfig, GraphCredentials, GraphError, GraphResult, TokenCache,
};

/// `OData` error response from Microsoft Graph.
#[derive(Debug, Deserialize)]
pub struct ODataError {
    pub error: ODataErrorBody,
}

/// `OData` error body.
#[derive(Debug, Deserialize)]
pub struct ODataErrorBody {
    pub code: String,
    pub message: String,
    #[serde(rename = "innerError")]
    pub inner_error: Option<serde_json::Value>,
}

/// Response wrapper for collection responses.
#[derive(Debug, Deserialize)]
pub struct ODataResponse<T> {
    pub value: Vec<T>,
    #[serde(rename = "@odata.nextLink")]
    pub next_link: Option<String>,
}

/// Microsoft Graph API client.
///
/// Requests are made once; there is no retry on throttling or transient
/// failures.
#[derive(Debug, Clone)]
pub struct GraphClient {
    http_client: reqwest::Client,
    token_cache: Arc<TokenCache>,
    base_url: String,
    scope: String,
}

impl GraphClient {
    /// Creates a Graph client sharing the given token cache.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: &GraphConfig, token_cache: Arc<TokenCache>) -> GraphResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| GraphError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            token_cache,
            base_url: config.base_url(),
            scope: config.scope(),
        })
    }

    /// Creates a Graph client with its own client credentials token cache.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created or the token TTL
    /// is out of range.
    pub fn from_credentials(
        config: &GraphConfig,
        credentials: GraphCredentials,
    ) -> GraphResult<Self> {
        let source = ClientCredentialsSource::new(config, credentials)?;
        let ttl = chrono::Duration::from_std(config.token_ttl)
            .map_err(|e| GraphError::Config(format!("Invalid token_ttl: {e}")))?;
        let token_cache = Arc::new(TokenCache::new(Arc::new(source), ttl));

        Self::new(config, token_cache)
    }

    /// Returns the versioned base URL for Graph API requests.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Performs a GET request and decodes the JSON body.
    #[instrument(skip(self))]
    pub async fn get<T: DeserializeOwned>(&self, url: &str) -> GraphResult<T> {
        let response = self
            .send(reqwest::Method::GET, url, None::<&()>)
            .await?;
        response.json().await.map_err(GraphError::from)
    }

    /// Performs a POST request and decodes the JSON body.
    #[instrument(skip(self, body))]
    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
    ) -> GraphResult<T> {
        let response = self.send(reqwest::Method::POST, url, Some(body)).await?;
        response.json().await.map_err(GraphError::from)
    }

    /// Performs a POST request whose answer carries no body, returning the status.
    #[instrument(skip(self, body))]
    pub async fn post_no_content<B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
    ) -> GraphResult<u16> {
        let response = self.send(reqwest::Method::POST, url, Some(body)).await?;
        Ok(response.status().as_u16())
    }

    /// Performs a PATCH request, returning the status (usually 204).
    #[instrument(skip(self, body))]
    pub async fn patch<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> GraphResult<u16> {
        let response = self.send(reqwest::Method::PATCH, url, Some(body)).await?;
        Ok(response.status().as_u16())
    }

    /// Performs a DELETE request, returning the status (usually 204).
    #[instrument(skip(self))]
    pub async fn delete(&self, url: &str) -> GraphResult<u16> {
        let response = self
            .send(reqwest::Method::DELETE, url, None::<&()>)
            .await?;
        Ok(response.status().as_u16())
    }

    /// Fetches every page of a collection, following `@odata.nextLink`.
    #[instrument(skip(self))]
    pub async fn get_paginated<T: DeserializeOwned>(&self, initial_url: &str) -> GraphResult<Vec<T>> {
        let mut url = initial_url.to_string();
        let mut items = Vec::new();

        loop {
            debug!("Fetching page: {}", url);
            let page: ODataResponse<T> = self.get(&url).await?;
            items.extend(page.value);

            match page.next_link {
                Some(next) => url = next,
                None => return Ok(items),
            }
        }
    }

    /// Sends a single request with a bearer token and maps error statuses.
    async fn send<B: Serialize + ?Sized>(
        &self,
        method: reqwest::Method,
        url: &str,
        body: Option<&B>,
    ) -> GraphResult<reqwest::Response> {
        let token = self.token_cache.get_token(&self.scope).await?;

        let mut request = self
            .http_client
            .request(method.clone(), url)
            .bearer_auth(&token);

        if let Some(b) = body {
            request = request.json(b);
        }

        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let error_body = response.text().await.unwrap_or_default();
        warn!(%status, %method, url, "Graph request failed");

        let context = format!("{method} {url}");
        if let Ok(odata_error) = serde_json::from_str::<ODataError>(&error_body) {
            return Err(GraphError::Api {
                status: status.as_u16(),
                code: odata_error.error.code,
                message: odata_error.error.message,
                context,
            });
        }

        Err(GraphError::Api {
            status: status.as_u16(),
            code: status
                .canonical_reason()
                .unwrap_or("Unknown")
                .to_string(),
            message: error_body,
            context,
        })
    }
}
