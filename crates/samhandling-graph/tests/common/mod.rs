//! Common test utilities for samhandling-graph integration tests.

#![allow(dead_code)]

use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use samhandling_graph::{GraphConfig, GraphCredentials, GraphDirectory};

pub const TENANT_ID: &str = "test-tenant";
pub const ACCESS_TOKEN: &str = "mock-access-token";

/// Test data factory for group members.
pub fn create_member(id: &str, mail: Option<&str>) -> Value {
    json!({
        "id": id,
        "mail": mail,
        "displayName": format!("Member {id}"),
        "proxyAddresses": mail.map(|m| vec![format!("SMTP:{m}")]).unwrap_or_default()
    })
}

/// Wraps items in an `OData` collection.
pub fn create_odata_response(items: Vec<Value>, next_link: Option<&str>) -> Value {
    let mut response = json!({ "value": items });
    if let Some(link) = next_link {
        response["@odata.nextLink"] = json!(link);
    }
    response
}

/// Creates an `OData` error response.
pub fn create_odata_error(code: &str, message: &str) -> Value {
    json!({
        "error": {
            "code": code,
            "message": message
        }
    })
}

/// Creates a mock `OAuth` token response.
pub fn create_token_response(access_token: &str, expires_in: u64) -> Value {
    json!({
        "access_token": access_token,
        "token_type": "Bearer",
        "expires_in": expires_in
    })
}

/// Mock server wrapper with common setup helpers.
pub struct MockGraphServer {
    pub server: MockServer,
}

impl MockGraphServer {
    /// Starts a mock Graph server with a token endpoint mounted.
    pub async fn start() -> Self {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(format!("/{TENANT_ID}/oauth2/v2.0/token")))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(create_token_response(ACCESS_TOKEN, 3600)),
            )
            .mount(&server)
            .await;

        Self { server }
    }

    /// Returns the mock server's base URL.
    pub fn url(&self) -> String {
        self.server.uri()
    }

    /// Configuration pointing both login and Graph at the mock server.
    pub fn config(&self) -> GraphConfig {
        GraphConfig::builder()
            .tenant_id(TENANT_ID)
            .login_endpoint(self.url())
            .graph_endpoint(self.url())
            .build()
            .unwrap()
    }

    /// Builds a directory client against the mock server.
    pub fn directory(&self) -> GraphDirectory {
        let credentials = GraphCredentials {
            client_id: "client-id".to_string(),
            client_secret: "client-secret".to_string().into(),
        };
        GraphDirectory::connect(&self.config(), credentials).unwrap()
    }
}
