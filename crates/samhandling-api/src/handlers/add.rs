//! Add group member endpoint handlers.
//!
//! POST /members/{group_name} - Mail and display name in the body.
//! POST /members/{group_name}/{user_mail} - Mail in the path, optional body.

use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, Path},
    http::StatusCode,
    Extension, Json,
};
use std::sync::Arc;

use crate::county::{resolve_allowed_suffixes, CountyCredential, CountyKeys};
use crate::error::{ApiError, ApiResult};
use crate::handlers::require;
use crate::models::{AddMemberOptions, AddMemberRequest};
use crate::services::MembershipService;

/// Adds a user to a group, inviting them as a guest if needed.
#[utoipa::path(
    post,
    path = "/members/{group_name}",
    params(
        ("group_name" = String, Path, description = "Group display name"),
        ("countyKey" = Option<String>, Query, description = "County key, alternative to the X-County-Key header"),
    ),
    request_body = AddMemberRequest,
    responses(
        (status = 204, description = "User added to group"),
        (status = 400, description = "Missing parameter or malformed body"),
        (status = 401, description = "Missing or unknown county key"),
        (status = 403, description = "Mail not allowed for the county key"),
        (status = 404, description = "Group not found"),
        (status = 500, description = "Group or user is not unique"),
    ),
    security(("countyKeyHeader" = []), ("countyKeyQuery" = [])),
    tag = "Members"
)]
pub async fn add_member_handler(
    Extension(keys): Extension<Arc<CountyKeys>>,
    Extension(service): Extension<Arc<MembershipService>>,
    credential: CountyCredential,
    Path(group_name): Path<String>,
    body: Result<Json<AddMemberRequest>, JsonRejection>,
) -> ApiResult<StatusCode> {
    require(&group_name, "groupName")?;
    let Json(request) = body?;

    add_member(
        &keys,
        &service,
        &credential,
        &group_name,
        &request.mail,
        request.display_name.as_deref(),
    )
    .await
}

/// Adds the user named in the path to a group, inviting them if needed.
#[utoipa::path(
    post,
    path = "/members/{group_name}/{user_mail}",
    params(
        ("group_name" = String, Path, description = "Group display name"),
        ("user_mail" = String, Path, description = "Mail address of the user"),
        ("countyKey" = Option<String>, Query, description = "County key, alternative to the X-County-Key header"),
    ),
    request_body(content = AddMemberOptions, description = "Optional display name for invitations"),
    responses(
        (status = 204, description = "User added to group"),
        (status = 400, description = "Missing parameter or malformed body"),
        (status = 401, description = "Missing or unknown county key"),
        (status = 403, description = "Mail not allowed for the county key"),
        (status = 404, description = "Group not found"),
        (status = 500, description = "Group or user is not unique"),
    ),
    security(("countyKeyHeader" = []), ("countyKeyQuery" = [])),
    tag = "Members"
)]
pub async fn add_member_by_path_handler(
    Extension(keys): Extension<Arc<CountyKeys>>,
    Extension(service): Extension<Arc<MembershipService>>,
    credential: CountyCredential,
    Path((group_name, user_mail)): Path<(String, String)>,
    body: Bytes,
) -> ApiResult<StatusCode> {
    require(&group_name, "groupName")?;
    require(&user_mail, "userMail")?;
    let options = parse_options(&body)?;

    add_member(
        &keys,
        &service,
        &credential,
        &group_name,
        &user_mail,
        options.display_name.as_deref(),
    )
    .await
}

/// An absent or blank body means no options.
fn parse_options(body: &[u8]) -> ApiResult<AddMemberOptions> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(AddMemberOptions::default());
    }
    serde_json::from_slice(body).map_err(|e| ApiError::Unclassified(e.to_string()))
}

async fn add_member(
    keys: &CountyKeys,
    service: &MembershipService,
    credential: &CountyCredential,
    group_name: &str,
    mail: &str,
    display_name: Option<&str>,
) -> ApiResult<StatusCode> {
    require(mail, "userMail")?;
    let mail = mail.trim();

    resolve_allowed_suffixes(keys, credential, Some(mail))?;

    let display_name = display_name
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(mail);

    let outcome = service.add_member(group_name, mail, display_name).await?;

    Ok(StatusCode::from_u16(outcome.status).unwrap_or(StatusCode::NO_CONTENT))
}
