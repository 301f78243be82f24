//! Group lookup and membership references.

use serde::Deserialize;
use tracing::{debug, info, instrument};

use crate::directory::eq_filter;
use crate::{GraphDirectory, GraphError, GraphResult, GroupMember, ODataResponse};

#[derive(Debug, Deserialize)]
struct GroupRef {
    id: String,
}

impl GraphDirectory {
    /// Resolves a group id by exact display name.
    #[instrument(skip(self))]
    pub(crate) async fn find_group_id(&self, display_name: &str) -> GraphResult<String> {
        let url = format!(
            "{}/groups?$filter={}&$select=id,displayName",
            self.graph_client().base_url(),
            eq_filter("displayName", display_name)
        );

        let response: ODataResponse<GroupRef> = self.graph_client().get(&url).await.map_err(|e| {
            e.in_context(format!(
                "Failed to fetch group id by displayName '{display_name}'"
            ))
        })?;

        let mut groups = response.value.into_iter();
        match (groups.next(), groups.next()) {
            (None, _) => Err(GraphError::NotFound(format!(
                "Group with display name '{display_name}' not found"
            ))),
            (Some(group), None) => {
                debug!(group_id = %group.id, "Resolved group");
                Ok(group.id)
            }
            (Some(_), Some(_)) => Err(GraphError::Ambiguous(format!(
                "Multiple groups found with display name '{display_name}'"
            ))),
        }
    }

    /// Fetches all direct members of a group.
    #[instrument(skip(self))]
    pub(crate) async fn fetch_group_members(&self, group_id: &str) -> GraphResult<Vec<GroupMember>> {
        let url = format!(
            "{}/groups/{}/members?$select=id,mail,displayName,proxyAddresses&$top={}",
            self.graph_client().base_url(),
            group_id,
            self.member_page_size()
        );

        let members: Vec<GroupMember> = self
            .graph_client()
            .get_paginated(&url)
            .await
            .map_err(|e| e.in_context(format!("Failed to fetch group members from group '{group_id}'")))?;

        debug!(count = members.len(), "Fetched group members");

        Ok(members)
    }

    /// Adds a user reference to a group.
    #[instrument(skip(self))]
    pub(crate) async fn add_member_ref(&self, group_id: &str, user_id: &str) -> GraphResult<u16> {
        info!("Adding user {} to group {}", user_id, group_id);

        let url = format!(
            "{}/groups/{}/members/$ref",
            self.graph_client().base_url(),
            group_id
        );

        let body = serde_json::json!({
            "@odata.id": format!("{}/directoryObjects/{}", self.graph_client().base_url(), user_id)
        });

        let status = self.graph_client().post_no_content(&url, &body).await.map_err(|e| {
            e.in_context(format!("Failed to add user '{user_id}' to group '{group_id}'"))
        })?;

        info!(status, "User added to group");

        Ok(status)
    }

    /// Removes a user reference from a group.
    #[instrument(skip(self))]
    pub(crate) async fn remove_member_ref(&self, group_id: &str, user_id: &str) -> GraphResult<u16> {
        info!("Removing user {} from group {}", user_id, group_id);

        let url = format!(
            "{}/groups/{}/members/{}/$ref",
            self.graph_client().base_url(),
            group_id,
            user_id
        );

        let status = self.graph_client().delete(&url).await.map_err(|e| {
            e.in_context(format!("Failed to remove user '{user_id}' from group '{group_id}'"))
        })?;

        info!(status, "User removed from group");

        Ok(status)
    }
}
