//! Response models for the members API.

use samhandling_graph::GroupMember;
use serde::Serialize;
use utoipa::ToSchema;

/// A group member visible to the caller's county key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemberResponse {
    /// Directory object id.
    pub id: String,
    pub mail: Option<String>,
    pub display_name: Option<String>,
    pub proxy_addresses: Vec<String>,
}

impl From<GroupMember> for MemberResponse {
    fn from(member: GroupMember) -> Self {
        Self {
            id: member.id,
            mail: member.mail,
            display_name: member.display_name,
            proxy_addresses: member.proxy_addresses.unwrap_or_default(),
        }
    }
}
