//! Request and response bodies for the XRPC methods this crate calls.
//! Only the fields we read are declared; everything else in a response is ignored.

use serde::{Deserialize, Serialize};

pub const CREATE_SESSION: &str = "com.atproto.server.createSession";
pub const RESOLVE_HANDLE: &str = "com.atproto.identity.resolveHandle";
pub const GET_PROFILE: &str = "app.bsky.actor.getProfile";

#[derive(Debug, Serialize)]
pub struct CreateSessionRequest<'a> {
    pub identifier: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionResponse {
    pub access_jwt: String,
    #[serde(default)]
    pub did: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResolveHandleResponse {
    pub did: String,
}

/// The subset of `app.bsky.actor.defs#profileViewDetailed` we care about
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(default)]
    pub did: Option<String>,
    #[serde(default)]
    pub handle: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
}
