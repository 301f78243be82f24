//! HTTP handlers for the members API.

pub mod add;
pub mod list;
pub mod remove;

pub use add::{add_member_by_path_handler, add_member_handler};
pub use list::list_members_handler;
pub use remove::remove_member_handler;

use crate::error::{ApiError, ApiResult};

/// Rejects a blank path or body parameter.
pub(crate) fn require(value: &str, name: &'static str) -> ApiResult<()> {
    if value.trim().is_empty() {
        return Err(ApiError::MissingParameter(name));
    }
    Ok(())
}

/// Handler for routes that lack a required path segment.
pub(crate) async fn missing_group_name() -> ApiError {
    ApiError::MissingParameter("groupName")
}

/// Handler for routes that lack a required path segment.
pub(crate) async fn missing_user_mail() -> ApiError {
    ApiError::MissingParameter("userMail")
}
