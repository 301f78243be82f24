//! Common test utilities for samhandling-api integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{body::Body, http::Request, Router};
use samhandling_api::{members_router, CountyKeys, MembersState};
use samhandling_graph::{
    Directory, DirectoryUser, GraphError, GraphResult, GroupMember, Invitation,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub const VALID_KEY: &str = "validKey";
pub const ALREADY_EXISTS_MESSAGE: &str =
    "One or more added object references already exist for the following modified properties: 'members'.";

/// County keys used by the router tests.
pub fn county_keys() -> CountyKeys {
    [
        (VALID_KEY, "baR.no, example.com"),
        ("otherKey", "other.com"),
    ]
    .into_iter()
    .collect()
}

#[derive(Debug, Default)]
struct FakeState {
    groups: Vec<(String, String)>,
    users: Vec<DirectoryUser>,
    members: HashMap<String, Vec<GroupMember>>,
    invited_mail: Option<String>,
    add_failure: Option<(u16, String)>,
    calls: Vec<String>,
    next_guest: u32,
}

/// In-memory directory.
///
/// Lookups behave like Graph: no match is `NotFound`, several matches are
/// `Ambiguous`, and linking an existing member fails with an "already exist"
/// API error.
#[derive(Debug, Default)]
pub struct FakeDirectory {
    state: Mutex<FakeState>,
}

impl FakeDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_group(self, display_name: &str, id: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .groups
            .push((display_name.to_string(), id.to_string()));
        self
    }

    pub fn with_user(self, id: &str, mail: Option<&str>) -> Self {
        self.state.lock().unwrap().users.push(DirectoryUser {
            id: id.to_string(),
            mail: mail.map(str::to_string),
            proxy_addresses: mail.map(|m| vec![format!("SMTP:{m}")]),
        });
        self
    }

    pub fn with_member(self, group_id: &str, id: &str, mail: Option<&str>) -> Self {
        self.state
            .lock()
            .unwrap()
            .members
            .entry(group_id.to_string())
            .or_default()
            .push(member(id, mail));
        self
    }

    /// Mail the directory records for invited users instead of the requested one.
    pub fn with_invited_mail(self, mail: &str) -> Self {
        self.state.lock().unwrap().invited_mail = Some(mail.to_string());
        self
    }

    /// Makes every add fail with the given status and message.
    pub fn with_add_failure(self, status: u16, message: &str) -> Self {
        self.state.lock().unwrap().add_failure = Some((status, message.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn members_of(&self, group_id: &str) -> Vec<GroupMember> {
        self.state
            .lock()
            .unwrap()
            .members
            .get(group_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn user(&self, id: &str) -> Option<DirectoryUser> {
        self.state
            .lock()
            .unwrap()
            .users
            .iter()
            .find(|u| u.id == id)
            .cloned()
    }
}

fn member(id: &str, mail: Option<&str>) -> GroupMember {
    GroupMember {
        id: id.to_string(),
        mail: mail.map(str::to_string),
        display_name: Some(format!("Member {id}")),
        proxy_addresses: mail.map(|m| vec![format!("SMTP:{m}")]),
    }
}

fn api_error(status: u16, message: &str, context: String) -> GraphError {
    GraphError::Api {
        status,
        code: "Request_BadRequest".to_string(),
        message: message.to_string(),
        context,
    }
}

#[async_trait]
impl Directory for FakeDirectory {
    async fn group_id_by_display_name(&self, display_name: &str) -> GraphResult<String> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("group:{display_name}"));

        let ids: Vec<&String> = state
            .groups
            .iter()
            .filter(|(name, _)| name == display_name)
            .map(|(_, id)| id)
            .collect();

        match ids.as_slice() {
            [] => Err(GraphError::NotFound(format!(
                "Group with display name '{display_name}' not found"
            ))),
            [id] => Ok((*id).clone()),
            _ => Err(GraphError::Ambiguous(format!(
                "Multiple groups found with display name '{display_name}'"
            ))),
        }
    }

    async fn user_id_by_mail(&self, mail: &str) -> GraphResult<String> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("user:{mail}"));

        let ids: Vec<String> = state
            .users
            .iter()
            .filter(|u| {
                u.mail
                    .as_deref()
                    .is_some_and(|m| m.eq_ignore_ascii_case(mail))
            })
            .map(|u| u.id.clone())
            .collect();

        match ids.as_slice() {
            [] => Err(GraphError::NotFound(format!(
                "User with mail '{mail}' not found"
            ))),
            [id] => Ok(id.clone()),
            _ => Err(GraphError::Ambiguous(format!(
                "Multiple users found with mail '{mail}'"
            ))),
        }
    }

    async fn user_by_id(&self, user_id: &str) -> GraphResult<DirectoryUser> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("fetch:{user_id}"));

        state
            .users
            .iter()
            .find(|u| u.id == user_id)
            .cloned()
            .ok_or_else(|| api_error(404, "Resource does not exist", format!("GET /users/{user_id}")))
    }

    async fn invite_user(&self, mail: &str, display_name: &str) -> GraphResult<Invitation> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("invite:{mail}:{display_name}"));

        state.next_guest += 1;
        let id = format!("guest-{}", state.next_guest);
        let recorded_mail = state.invited_mail.clone().unwrap_or_else(|| mail.to_string());
        state.users.push(DirectoryUser {
            id: id.clone(),
            mail: Some(recorded_mail),
            proxy_addresses: None,
        });

        Ok(Invitation {
            invited_user_id: id,
            invited_user_email_address: mail.to_string(),
            invited_user_display_name: Some(display_name.to_string()),
        })
    }

    async fn update_user_mail(&self, user_id: &str, mail: &str) -> GraphResult<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("patch:{user_id}:{mail}"));

        match state.users.iter_mut().find(|u| u.id == user_id) {
            Some(user) => {
                user.mail = Some(mail.to_string());
                Ok(())
            }
            None => Err(api_error(
                404,
                "Resource does not exist",
                format!("PATCH /users/{user_id}"),
            )),
        }
    }

    async fn list_group_members(&self, group_id: &str) -> GraphResult<Vec<GroupMember>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("members:{group_id}"));
        Ok(state.members.get(group_id).cloned().unwrap_or_default())
    }

    async fn add_group_member(&self, group_id: &str, user_id: &str) -> GraphResult<u16> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("add:{group_id}:{user_id}"));
        let context = format!("POST /groups/{group_id}/members/$ref");

        if let Some((status, message)) = &state.add_failure {
            return Err(api_error(*status, message, context));
        }

        let mail = state
            .users
            .iter()
            .find(|u| u.id == user_id)
            .and_then(|u| u.mail.clone());
        let members = state.members.entry(group_id.to_string()).or_default();
        if members.iter().any(|m| m.id == user_id) {
            return Err(api_error(400, ALREADY_EXISTS_MESSAGE, context));
        }
        members.push(member(user_id, mail.as_deref()));
        Ok(204)
    }

    async fn remove_group_member(&self, group_id: &str, user_id: &str) -> GraphResult<u16> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("remove:{group_id}:{user_id}"));

        let members = state.members.entry(group_id.to_string()).or_default();
        let before = members.len();
        members.retain(|m| m.id != user_id);
        if members.len() == before {
            return Err(api_error(
                404,
                "Resource does not exist or one of its queried reference-property objects are not present.",
                format!("DELETE /groups/{group_id}/members/{user_id}/$ref"),
            ));
        }
        Ok(204)
    }
}

/// Builds the members router on top of `directory`.
pub fn test_app(directory: Arc<FakeDirectory>) -> Router {
    members_router(MembersState::new(county_keys(), directory))
}

/// Builds a request with an optional county key header and JSON body.
pub fn request(method: &str, uri: &str, key: Option<&str>, body: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(key) = key {
        builder = builder.header("X-County-Key", key);
    }
    match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Reads a response body to a string.
pub async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
