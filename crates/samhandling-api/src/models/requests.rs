//! Request models for the members API.

use serde::Deserialize;
use utoipa::ToSchema;

/// Body of `POST /members/{group_name}`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddMemberRequest {
    /// Mail address of the user to add.
    #[serde(default)]
    pub mail: String,

    /// Display name used if the user has to be invited. Defaults to the mail.
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Optional body of `POST /members/{group_name}/{user_mail}`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddMemberOptions {
    /// Display name used if the user has to be invited. Defaults to the mail.
    #[serde(default)]
    pub display_name: Option<String>,
}
