//! Group membership operations on top of a [`Directory`].

use samhandling_graph::{Directory, GraphError, GroupMember};
use std::fmt;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::county::mail_matches_suffixes;
use crate::error::ApiResult;

/// Status reported when linking a freshly patched guest finds it already linked.
const ALREADY_MEMBER_STATUS: u16 = 204;

/// What `add_member` did to get the user into the group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddMemberOutcome {
    /// Status to report to the caller.
    pub status: u16,
    pub user_id: String,
    /// The user did not exist and was invited.
    pub invited: bool,
    /// The invited user's mail was overwritten with the requested one.
    pub patched: bool,
}

/// Lists, adds and removes group members by group display name and mail.
#[derive(Clone)]
pub struct MembershipService {
    directory: Arc<dyn Directory>,
}

impl fmt::Debug for MembershipService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MembershipService").finish_non_exhaustive()
    }
}

impl MembershipService {
    pub fn new(directory: Arc<dyn Directory>) -> Self {
        Self { directory }
    }

    /// Returns the members of `group_name` whose mail matches one of
    /// `allowed_suffixes`. Members without a mail are left out.
    #[instrument(skip(self))]
    pub async fn list_members(
        &self,
        group_name: &str,
        allowed_suffixes: &[String],
    ) -> ApiResult<Vec<GroupMember>> {
        let group_id = self.directory.group_id_by_display_name(group_name).await?;

        let members = self
            .directory
            .list_group_members(&group_id)
            .await
            .map_err(|e| {
                e.in_context(format!(
                    "Failed to fetch group members from group '{group_name}'"
                ))
            })?;

        let total = members.len();
        let visible: Vec<GroupMember> = members
            .into_iter()
            .filter(|member| {
                member
                    .mail
                    .as_deref()
                    .is_some_and(|mail| mail_matches_suffixes(mail, allowed_suffixes))
            })
            .collect();

        info!(
            total,
            visible = visible.len(),
            suffixes = %allowed_suffixes.join(","),
            "Found {} members in group {}",
            visible.len(),
            group_name
        );

        Ok(visible)
    }

    /// Adds the user with `mail` to `group_name`, inviting them first if they
    /// do not exist.
    ///
    /// When an invited user's recorded mail differs from `mail` it is patched.
    /// If the group then reports the user as already linked, the add counts as
    /// done with status 204.
    #[instrument(skip(self))]
    pub async fn add_member(
        &self,
        group_name: &str,
        mail: &str,
        display_name: &str,
    ) -> ApiResult<AddMemberOutcome> {
        let group_id = self.directory.group_id_by_display_name(group_name).await?;

        let (user_id, invited, patched) = match self.directory.user_id_by_mail(mail).await {
            Ok(user_id) => (user_id, false, false),
            Err(e) if e.is_not_found() => {
                let (user_id, patched) = self.invite(mail, display_name).await?;
                (user_id, true, patched)
            }
            Err(e) => return Err(e.into()),
        };

        let status = match self.directory.add_group_member(&group_id, &user_id).await {
            Ok(status) => status,
            Err(e) if patched && e.is_already_exists() => {
                warn!(user_id = %user_id, "Patched user already member of group");
                ALREADY_MEMBER_STATUS
            }
            Err(e) => {
                return Err(e
                    .in_context(format!(
                        "Failed to add mail '{mail}' as group member to group '{group_name}'"
                    ))
                    .into())
            }
        };

        info!(user_id = %user_id, status, invited, patched, "Added group member");

        Ok(AddMemberOutcome {
            status,
            user_id,
            invited,
            patched,
        })
    }

    /// Removes the user with `mail` from `group_name`.
    #[instrument(skip(self))]
    pub async fn remove_member(&self, group_name: &str, mail: &str) -> ApiResult<u16> {
        let group_id = self.directory.group_id_by_display_name(group_name).await?;
        let user_id = self.directory.user_id_by_mail(mail).await?;

        let status = self
            .directory
            .remove_group_member(&group_id, &user_id)
            .await
            .map_err(|e| {
                e.in_context(format!(
                    "Failed to remove mail '{mail}' from group '{group_name}'"
                ))
            })?;

        info!(user_id = %user_id, status, "Removed group member");

        Ok(status)
    }

    /// Invites `mail` and aligns the guest's mail with it. Returns the new
    /// user id and whether a patch was needed.
    async fn invite(&self, mail: &str, display_name: &str) -> Result<(String, bool), GraphError> {
        let invitation = self.directory.invite_user(mail, display_name).await?;
        let user = self.directory.user_by_id(&invitation.invited_user_id).await?;

        let same_mail = user
            .mail
            .as_deref()
            .is_some_and(|current| current.to_lowercase() == mail.to_lowercase());
        if same_mail {
            return Ok((invitation.invited_user_id, false));
        }

        info!(
            user_id = %invitation.invited_user_id,
            current_mail = user.mail.as_deref().unwrap_or_default(),
            "Will patch user to have mail '{}'",
            mail
        );
        self.directory
            .update_user_mail(&invitation.invited_user_id, mail)
            .await?;

        Ok((invitation.invited_user_id, true))
    }
}
