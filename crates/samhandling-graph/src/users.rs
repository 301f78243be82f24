//! User lookup, guest invitation and mail patching.

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::directory::eq_filter;
use crate::{DirectoryUser, GraphDirectory, GraphError, GraphResult, Invitation, ODataResponse};

#[derive(Debug, Deserialize)]
struct UserRef {
    id: String,
}

/// Body of `POST /invitations`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InvitationRequest<'a> {
    invited_user_email_address: &'a str,
    invited_user_display_name: &'a str,
    invite_redirect_url: &'a str,
    send_invitation_message: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InvitationResponse {
    invited_user_email_address: String,
    invited_user_display_name: Option<String>,
    invited_user: UserRef,
}

#[derive(Debug, Serialize)]
struct MailPatch<'a> {
    mail: &'a str,
}

impl GraphDirectory {
    /// Resolves a user id by mail attribute.
    #[instrument(skip(self))]
    pub(crate) async fn find_user_id(&self, mail: &str) -> GraphResult<String> {
        let url = format!(
            "{}/users?$filter={}&$select=id",
            self.graph_client().base_url(),
            eq_filter("mail", mail)
        );

        let response: ODataResponse<UserRef> = self
            .graph_client()
            .get(&url)
            .await
            .map_err(|e| e.in_context(format!("Failed to fetch user id by mail '{mail}'")))?;

        let mut users = response.value.into_iter();
        match (users.next(), users.next()) {
            (None, _) => Err(GraphError::NotFound(format!(
                "User with mail '{mail}' not found"
            ))),
            (Some(user), None) => Ok(user.id),
            (Some(_), Some(_)) => Err(GraphError::Ambiguous(format!(
                "Multiple users found with mail '{mail}'"
            ))),
        }
    }

    /// Fetches a user by object id.
    #[instrument(skip(self))]
    pub(crate) async fn fetch_user(&self, user_id: &str) -> GraphResult<DirectoryUser> {
        let url = format!(
            "{}/users/{}?$select=id,mail,proxyAddresses",
            self.graph_client().base_url(),
            user_id
        );

        self.graph_client()
            .get(&url)
            .await
            .map_err(|e| e.in_context(format!("Failed to fetch user by id '{user_id}'")))
    }

    /// Invites a guest user without sending the invitation mail.
    #[instrument(skip(self))]
    pub(crate) async fn create_invitation(
        &self,
        mail: &str,
        display_name: &str,
    ) -> GraphResult<Invitation> {
        let url = format!("{}/invitations", self.graph_client().base_url());

        let request = InvitationRequest {
            invited_user_email_address: mail,
            invited_user_display_name: display_name,
            invite_redirect_url: self.invite_redirect_url(),
            send_invitation_message: false,
        };

        let response: InvitationResponse =
            self.graph_client().post(&url, &request).await.map_err(|e| {
                e.in_context(format!(
                    "Failed to invite user by mail '{mail}' with displayName '{display_name}'"
                ))
            })?;

        info!(
            user_id = %response.invited_user.id,
            email = %response.invited_user_email_address,
            display_name = response.invited_user_display_name.as_deref().unwrap_or_default(),
            "Invited user"
        );

        Ok(Invitation {
            invited_user_id: response.invited_user.id,
            invited_user_email_address: response.invited_user_email_address,
            invited_user_display_name: response.invited_user_display_name,
        })
    }

    /// Sets a user's mail attribute.
    #[instrument(skip(self))]
    pub(crate) async fn patch_user_mail(&self, user_id: &str, mail: &str) -> GraphResult<()> {
        let url = format!("{}/users/{}", self.graph_client().base_url(), user_id);

        self.graph_client()
            .patch(&url, &MailPatch { mail })
            .await
            .map_err(|e| {
                e.in_context(format!(
                    "Failed to patch user with id '{user_id}' with mail '{mail}'"
                ))
            })?;

        warn!("Patched user with id '{}' to have mail '{}'", user_id, mail);

        Ok(())
    }
}
