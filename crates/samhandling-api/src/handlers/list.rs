//! List group members endpoint handler.
//!
//! GET /members/{group_name} - Members visible to the county key.

use axum::{extract::Path, Extension, Json};
use std::sync::Arc;

use crate::county::{resolve_allowed_suffixes, CountyCredential, CountyKeys};
use crate::error::ApiResult;
use crate::handlers::require;
use crate::models::MemberResponse;
use crate::services::MembershipService;

/// Lists the members of a group whose mail matches the key's suffixes.
#[utoipa::path(
    get,
    path = "/members/{group_name}",
    params(
        ("group_name" = String, Path, description = "Group display name"),
        ("countyKey" = Option<String>, Query, description = "County key, alternative to the X-County-Key header"),
    ),
    responses(
        (status = 200, description = "Visible group members", body = Vec<MemberResponse>),
        (status = 400, description = "Missing group name"),
        (status = 401, description = "Missing or unknown county key"),
        (status = 404, description = "Group not found"),
        (status = 500, description = "Group name is not unique"),
    ),
    security(("countyKeyHeader" = []), ("countyKeyQuery" = [])),
    tag = "Members"
)]
pub async fn list_members_handler(
    Extension(keys): Extension<Arc<CountyKeys>>,
    Extension(service): Extension<Arc<MembershipService>>,
    credential: CountyCredential,
    Path(group_name): Path<String>,
) -> ApiResult<Json<Vec<MemberResponse>>> {
    require(&group_name, "groupName")?;

    let suffixes = resolve_allowed_suffixes(&keys, &credential, None)?;

    let members = service.list_members(&group_name, &suffixes).await?;

    Ok(Json(members.into_iter().map(MemberResponse::from).collect()))
}
