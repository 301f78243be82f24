//! Remove group member endpoint handler.
//!
//! DELETE /members/{group_name}/{user_mail}

use axum::{extract::Path, http::StatusCode, Extension};
use std::sync::Arc;

use crate::county::{resolve_allowed_suffixes, CountyCredential, CountyKeys};
use crate::error::ApiResult;
use crate::handlers::require;
use crate::services::MembershipService;

/// Removes a user from a group.
#[utoipa::path(
    delete,
    path = "/members/{group_name}/{user_mail}",
    params(
        ("group_name" = String, Path, description = "Group display name"),
        ("user_mail" = String, Path, description = "Mail address of the user"),
        ("countyKey" = Option<String>, Query, description = "County key, alternative to the X-County-Key header"),
    ),
    responses(
        (status = 204, description = "User removed from group"),
        (status = 400, description = "Missing parameter"),
        (status = 401, description = "Missing or unknown county key"),
        (status = 403, description = "Mail not allowed for the county key"),
        (status = 404, description = "Group, user or membership not found"),
        (status = 500, description = "Group or user is not unique"),
    ),
    security(("countyKeyHeader" = []), ("countyKeyQuery" = [])),
    tag = "Members"
)]
pub async fn remove_member_handler(
    Extension(keys): Extension<Arc<CountyKeys>>,
    Extension(service): Extension<Arc<MembershipService>>,
    credential: CountyCredential,
    Path((group_name, user_mail)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    require(&group_name, "groupName")?;
    require(&user_mail, "userMail")?;
    let mail = user_mail.trim();

    resolve_allowed_suffixes(&keys, &credential, Some(mail))?;

    let status = service.remove_member(&group_name, mail).await?;

    Ok(StatusCode::from_u16(status).unwrap_or(StatusCode::NO_CONTENT))
}
