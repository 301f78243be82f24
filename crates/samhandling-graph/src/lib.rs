//! Microsoft Graph directory client for samhandling group membership.
//!
//! This crate wraps the parts of the Microsoft Graph API needed to manage
//! membership of Entra ID security groups on behalf of the members API:
//!
//! - `OAuth2` client credentials authentication with a scoped token cache
//! - Group lookup by display name and member listing
//! - User lookup by mail, guest invitation and mail patching
//! - Adding and removing group member references
//!
//! Every call is a single attempt. Failures are reported as [`GraphError`]
//! values carrying the remote status code and a contextual message.
//!
//! # Example
//!
//! ```no_run
//! use samhandling_graph::{Directory, GraphConfig, GraphCredentials, GraphDirectory};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = GraphConfig::builder()
//!     .tenant_id("your-tenant-id")
//!     .build()?;
//!
//! let credentials = GraphCredentials {
//!     client_id: "your-client-id".to_string(),
//!     client_secret: "your-client-secret".to_string().into(),
//! };
//!
//! let directory = GraphDirectory::connect(&config, credentials)?;
//! let group_id = directory.group_id_by_display_name("Samhandling Ansatte").await?;
//! # let _ = group_id;
//! # Ok(())
//! # }
//! ```

mod auth;
mod config;
mod directory;
mod error;
mod graph_client;
mod groups;
mod users;

// Re-exports
pub use auth::{
    AccessToken, ClientCredentialsSource, Clock, SystemClock, TokenCache, TokenSource,
};
pub use config::{
    GraphCloudEnvironment, GraphConfig, GraphConfigBuilder, GraphCredentials, MAX_PAGE_SIZE,
};
pub use directory::{Directory, DirectoryUser, GraphDirectory, GroupMember, Invitation};
pub use error::{GraphError, GraphResult};
pub use graph_client::{GraphClient, ODataError, ODataErrorBody, ODataResponse};
