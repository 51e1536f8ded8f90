use std::time::Duration;

use reqwest::{header, Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::{error, info, instrument};

use crate::{
    config::Config,
    errors::{FetchError, FetchResult, GET_PROFILE_FAILED, RESOLVE_HANDLE_FAILED},
    handle::normalize_handle,
    xrpc::{
        CreateSessionRequest, CreateSessionResponse, Profile, ResolveHandleResponse,
        CREATE_SESSION, GET_PROFILE, RESOLVE_HANDLE,
    },
};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// A session created with the account's app password
#[derive(Clone)]
pub(crate) struct Session {
    pub(crate) access_jwt: String,
    pub(crate) did: Option<String>,
}

impl From<CreateSessionResponse> for Session {
    fn from(response: CreateSessionResponse) -> Self {
        Self {
            access_jwt: response.access_jwt,
            did: response.did,
        }
    }
}

/// Looks up profile images: authenticate once, resolve the handle to a DID, then read the profile.
///
/// The session is created lazily on the first lookup and reused for every later lookup
/// made through the same resolver. It is never refreshed, so an expired token shows up
/// as a [`FetchError::Transport`] from the step that used it.
pub struct ProfileImageResolver {
    config: Config,
    client: Client,
    session: Mutex<Option<Session>>,
}

impl ProfileImageResolver {
    pub fn new(config: Config) -> FetchResult<Self> {
        let client = reqwest::ClientBuilder::new()
            .connect_timeout(CONNECT_TIMEOUT)
            .use_rustls_tls()
            .build()?;

        Ok(Self::with_client(config, client))
    }

    pub fn with_client(config: Config, client: Client) -> Self {
        Self {
            config,
            client,
            session: Mutex::new(None),
        }
    }

    pub async fn has_session(&self) -> bool {
        self.session.lock().await.is_some()
    }

    /// Returns the avatar URL for `handle`, or `None` when the profile has no avatar.
    #[instrument(skip(self))]
    pub async fn get_profile_image(&self, handle: &str) -> FetchResult<Option<String>> {
        let handle = normalize_handle(handle, &self.config.default_domain)?;
        let token = self.access_token().await?;

        let did = self.resolve_with_token(&handle, &token).await?;
        let profile = self.profile_with_token(&did, &token).await?;

        match &profile.avatar {
            Some(avatar) => info!("Found avatar for {}: {}", handle, avatar),
            None => info!("Profile for {} has no avatar", handle),
        }

        Ok(profile.avatar)
    }

    /// Resolves a (possibly bare) handle to its DID
    #[instrument(skip(self))]
    pub async fn resolve_handle(&self, handle: &str) -> FetchResult<String> {
        let handle = normalize_handle(handle, &self.config.default_domain)?;
        let token = self.access_token().await?;

        self.resolve_with_token(&handle, &token).await
    }

    #[instrument(skip(self))]
    pub async fn get_profile(&self, did: &str) -> FetchResult<Profile> {
        let did = did.trim();
        if did.is_empty() {
            return Err(FetchError::InvalidArgument(
                "DID cannot be empty".to_string(),
            ));
        }
        let token = self.access_token().await?;

        self.profile_with_token(did, &token).await
    }

    /// Sends a HEAD request to an image URL and reports the status it answered with.
    #[instrument(skip(self))]
    pub async fn check_image(&self, url: &str) -> FetchResult<StatusCode> {
        let response = self.client.head(url).send().await?;
        let status = response.status();

        info!("Image URL {} answered with {}", url, status);
        Ok(status)
    }

    /// Returns the cached access token, creating a session first if there is none.
    ///
    /// The lock is held while authenticating so concurrent first lookups share one session.
    async fn access_token(&self) -> FetchResult<String> {
        let mut session = self.session.lock().await;

        if let Some(existing) = session.as_ref() {
            return Ok(existing.access_jwt.clone());
        }

        let created = self.authenticate().await?;
        let token = created.access_jwt.clone();
        *session = Some(created);

        Ok(token)
    }

    #[instrument(skip(self))]
    async fn authenticate(&self) -> FetchResult<Session> {
        let credentials = &self.config.credentials;
        let url = self.config.xrpc_url(CREATE_SESSION);

        info!("Creating session for {}", credentials.identifier);

        let response = self
            .client
            .post(&url)
            .json(&CreateSessionRequest {
                identifier: &credentials.identifier,
                password: &credentials.password,
            })
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            error!("Authentication failed: HTTP {}", response.status());
            return Err(FetchError::Authentication {
                status: response.status(),
            });
        }

        let session: Session = parse_json::<CreateSessionResponse>(response, "session")
            .await?
            .into();

        info!(
            "Session created for {}",
            session.did.as_deref().unwrap_or(&credentials.identifier)
        );
        Ok(session)
    }

    async fn resolve_with_token(&self, handle: &str, token: &str) -> FetchResult<String> {
        let url = format!(
            "{}?handle={}",
            self.config.xrpc_url(RESOLVE_HANDLE),
            urlencoding::encode(handle)
        );

        let response = self.authed_get(&url, token).await?;
        let status = response.status();
        if status != StatusCode::OK {
            error!("Failed to resolve handle {}: HTTP {}", handle, status);
            return Err(FetchError::Transport {
                context: RESOLVE_HANDLE_FAILED,
                status,
            });
        }

        let resolved = parse_json::<ResolveHandleResponse>(response, "resolved handle").await?;

        info!("Resolved handle {} to {}", handle, resolved.did);
        Ok(resolved.did)
    }

    async fn profile_with_token(&self, did: &str, token: &str) -> FetchResult<Profile> {
        let url = format!(
            "{}?actor={}",
            self.config.xrpc_url(GET_PROFILE),
            urlencoding::encode(did)
        );

        let response = self.authed_get(&url, token).await?;
        let status = response.status();
        if status != StatusCode::OK {
            error!("Failed to get profile for {}: HTTP {}", did, status);
            return Err(FetchError::Transport {
                context: GET_PROFILE_FAILED,
                status,
            });
        }

        parse_json::<Profile>(response, "profile").await
    }

    async fn authed_get(&self, url: &str, token: &str) -> FetchResult<Response> {
        Ok(self
            .client
            .get(url)
            .bearer_auth(token)
            .header(header::ACCEPT, "application/json")
            .send()
            .await?)
    }
}

async fn parse_json<T: DeserializeOwned>(
    response: Response,
    context: &'static str,
) -> FetchResult<T> {
    let body = response.text().await?;

    serde_json::from_str::<T>(&body).map_err(|source| {
        error!("Failed to decode {}: {}", context, source);
        FetchError::Parse { context, source }
    })
}
