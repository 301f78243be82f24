//! Directory operations used by the members API.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{GraphClient, GraphConfig, GraphCredentials, GraphResult};

/// A user record as returned by `GET /users/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryUser {
    pub id: String,
    pub mail: Option<String>,
    #[serde(default)]
    pub proxy_addresses: Option<Vec<String>>,
}

/// A direct member of a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupMember {
    pub id: String,
    pub mail: Option<String>,
    pub display_name: Option<String>,
    #[serde(default)]
    pub proxy_addresses: Option<Vec<String>>,
}

/// Result of a guest invitation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invitation {
    /// Object id of the created guest user.
    pub invited_user_id: String,
    pub invited_user_email_address: String,
    pub invited_user_display_name: Option<String>,
}

/// The directory calls the members API depends on.
///
/// Implementations report an absent object as an error for which
/// [`GraphError::is_not_found`](crate::GraphError::is_not_found) holds, and
/// duplicate names as [`GraphError::Ambiguous`](crate::GraphError::Ambiguous).
#[async_trait]
pub trait Directory: Send + Sync {
    /// Resolves a group's object id from its exact display name.
    async fn group_id_by_display_name(&self, display_name: &str) -> GraphResult<String>;

    /// Resolves a user's object id from its mail attribute.
    async fn user_id_by_mail(&self, mail: &str) -> GraphResult<String>;

    /// Fetches a user's id, mail and proxy addresses.
    async fn user_by_id(&self, user_id: &str) -> GraphResult<DirectoryUser>;

    /// Invites an external user without sending the invitation mail.
    async fn invite_user(&self, mail: &str, display_name: &str) -> GraphResult<Invitation>;

    /// Overwrites a user's mail attribute.
    async fn update_user_mail(&self, user_id: &str, mail: &str) -> GraphResult<()>;

    /// Lists the direct members of a group.
    async fn list_group_members(&self, group_id: &str) -> GraphResult<Vec<GroupMember>>;

    /// Adds a member reference, returning the directory's status code.
    async fn add_group_member(&self, group_id: &str, user_id: &str) -> GraphResult<u16>;

    /// Removes a member reference, returning the directory's status code.
    async fn remove_group_member(&self, group_id: &str, user_id: &str) -> GraphResult<u16>;
}

/// [`Directory`] backed by Microsoft Graph.
#[derive(Debug, Clone)]
pub struct GraphDirectory {
    client: GraphClient,
    invite_redirect_url: String,
    member_page_size: u32,
}

impl GraphDirectory {
    /// Wraps an existing Graph client.
    #[must_use]
    pub fn new(client: GraphClient, config: &GraphConfig) -> Self {
        Self {
            client,
            invite_redirect_url: config.invite_redirect_url.clone(),
            member_page_size: config.member_page_size,
        }
    }

    /// Builds a Graph client with client credentials and wraps it.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn connect(config: &GraphConfig, credentials: GraphCredentials) -> GraphResult<Self> {
        let client = GraphClient::from_credentials(config, credentials)?;
        Ok(Self::new(client, config))
    }

    pub(crate) fn graph_client(&self) -> &GraphClient {
        &self.client
    }

    pub(crate) fn invite_redirect_url(&self) -> &str {
        &self.invite_redirect_url
    }

    pub(crate) fn member_page_size(&self) -> u32 {
        self.member_page_size
    }
}

/// Encodes an `OData` equality filter on a string property.
pub(crate) fn eq_filter(property: &str, value: &str) -> String {
    let literal = value.replace('\'', "''");
    urlencoding::encode(&format!("{property} eq '{literal}'")).into_owned()
}

#[async_trait]
impl Directory for GraphDirectory {
    async fn group_id_by_display_name(&self, display_name: &str) -> GraphResult<String> {
        self.find_group_id(display_name).await
    }

    async fn user_id_by_mail(&self, mail: &str) -> GraphResult<String> {
        self.find_user_id(mail).await
    }

    async fn user_by_id(&self, user_id: &str) -> GraphResult<DirectoryUser> {
        self.fetch_user(user_id).await
    }

    async fn invite_user(&self, mail: &str, display_name: &str) -> GraphResult<Invitation> {
        self.create_invitation(mail, display_name).await
    }

    async fn update_user_mail(&self, user_id: &str, mail: &str) -> GraphResult<()> {
        self.patch_user_mail(user_id, mail).await
    }

    async fn list_group_members(&self, group_id: &str) -> GraphResult<Vec<GroupMember>> {
        self.fetch_group_members(group_id).await
    }

    async fn add_group_member(&self, group_id: &str, user_id: &str) -> GraphResult<u16> {
        self.add_member_ref(group_id, user_id).await
    }

    async fn remove_group_member(&self, group_id: &str, user_id: &str) -> GraphResult<u16> {
        self.remove_member_ref(group_id, user_id).await
    }
}
