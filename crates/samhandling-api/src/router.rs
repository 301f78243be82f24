//! Members API router configuration.
//!
//! - GET /members/{group_name} - List visible members
//! - POST /members/{group_name} - Add member named in the body
//! - POST /members/{group_name}/{user_mail} - Add member named in the path
//! - DELETE /members/{group_name}/{user_mail} - Remove member

use axum::{
    routing::{get, post},
    Extension, Router,
};
use samhandling_graph::Directory;
use std::sync::Arc;

use crate::county::CountyKeys;
use crate::handlers::{
    add_member_by_path_handler, add_member_handler, list_members_handler, missing_group_name,
    missing_user_mail, remove_member_handler,
};
use crate::services::MembershipService;

/// Application state for the members routes.
#[derive(Debug, Clone)]
pub struct MembersState {
    /// County key to suffix list mapping.
    pub keys: Arc<CountyKeys>,
    /// Membership operations against the directory.
    pub membership_service: Arc<MembershipService>,
}

impl MembersState {
    /// Create a new members state.
    pub fn new(keys: CountyKeys, directory: Arc<dyn Directory>) -> Self {
        Self {
            keys: Arc::new(keys),
            membership_service: Arc::new(MembershipService::new(directory)),
        }
    }
}

/// Create the members router.
///
/// Every route requires a county key in the `countyKey` query parameter or
/// the `X-County-Key` header. Routes missing a path segment answer 400.
pub fn members_router(state: MembersState) -> Router {
    Router::new()
        .route(
            "/members/{group_name}",
            get(list_members_handler)
                .post(add_member_handler)
                .delete(missing_user_mail),
        )
        .route(
            "/members/{group_name}/{user_mail}",
            post(add_member_by_path_handler).delete(remove_member_handler),
        )
        .route(
            "/members",
            get(missing_group_name)
                .post(missing_group_name)
                .delete(missing_group_name),
        )
        .layer(Extension(state.keys))
        .layer(Extension(state.membership_service))
}
