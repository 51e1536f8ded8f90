use std::sync::Arc;

use fixtures::pds::{
    Endpoint, Override, PdsFixture, DEVOXX_DID, DEVOXX_HANDLE, FIXTURE_DID, FIXTURE_IDENTIFIER,
    FIXTURE_PASSWORD, NO_AVATAR_HANDLE,
};
use pfp_fetch::{interruptible, Config, Credentials, FetchError, ProfileImageResolver};
use reqwest::StatusCode;

async fn setup() -> (PdsFixture, ProfileImageResolver) {
    setup_with(Credentials::new(FIXTURE_IDENTIFIER, FIXTURE_PASSWORD)).await
}

async fn setup_with(credentials: Credentials) -> (PdsFixture, ProfileImageResolver) {
    let pds = PdsFixture::start()
        .await
        .expect("Failed to start PDS fixture");
    let config = Config::new(credentials, pds.base_url());
    let resolver = ProfileImageResolver::new(config).expect("Failed to build resolver");

    (pds, resolver)
}

fn total_calls(pds: &PdsFixture) -> usize {
    [
        Endpoint::CreateSession,
        Endpoint::ResolveHandle,
        Endpoint::GetProfile,
    ]
    .into_iter()
    .map(|endpoint| pds.state.calls(endpoint))
    .sum()
}

#[tokio::test]
async fn test_get_profile_image() {
    let (pds, resolver) = setup().await;

    let image_url = resolver
        .get_profile_image(FIXTURE_IDENTIFIER)
        .await
        .unwrap()
        .expect("fixture user has an avatar");

    assert!(image_url.starts_with(&pds.base_url()));
    assert!(image_url.contains(FIXTURE_DID));
    assert_eq!(pds.state.calls(Endpoint::CreateSession), 1);
    assert_eq!(pds.state.calls(Endpoint::ResolveHandle), 1);
    assert_eq!(pds.state.calls(Endpoint::GetProfile), 1);
}

#[tokio::test]
async fn test_bare_handle_gets_default_domain() {
    let (pds, resolver) = setup().await;

    let image_url = resolver.get_profile_image("devoxx").await.unwrap();

    assert!(image_url.unwrap().contains(DEVOXX_DID));
    assert_eq!(pds.state.resolved_handles(), vec![DEVOXX_HANDLE]);
}

#[tokio::test]
async fn test_blank_handle_makes_no_requests() {
    let (pds, resolver) = setup().await;

    for handle in ["", "   ", "\n\t"] {
        let err = resolver.get_profile_image(handle).await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidArgument(_)));
    }

    assert_eq!(total_calls(&pds), 0);
    assert!(!resolver.has_session().await);
}

#[tokio::test]
async fn test_session_is_reused() {
    let (pds, resolver) = setup().await;

    resolver
        .get_profile_image(FIXTURE_IDENTIFIER)
        .await
        .unwrap();
    assert!(resolver.has_session().await);

    resolver.get_profile_image(NO_AVATAR_HANDLE).await.unwrap();
    resolver.get_profile_image("devoxx").await.unwrap();

    assert_eq!(pds.state.calls(Endpoint::CreateSession), 1);
    assert_eq!(pds.state.calls(Endpoint::ResolveHandle), 3);
    assert_eq!(pds.state.calls(Endpoint::GetProfile), 3);
}

#[tokio::test]
async fn test_concurrent_first_lookups_authenticate_once() {
    let (pds, resolver) = setup().await;
    let resolver = Arc::new(resolver);

    let lookups = (0..8).map(|_| {
        let resolver = resolver.clone();
        tokio::spawn(async move {
            resolver.get_profile_image(FIXTURE_IDENTIFIER).await
        })
    });

    for result in futures::future::join_all(lookups).await {
        assert!(result.unwrap().unwrap().is_some());
    }

    assert_eq!(pds.state.calls(Endpoint::CreateSession), 1);
    assert_eq!(pds.state.calls(Endpoint::GetProfile), 8);
}

#[tokio::test]
async fn test_profile_without_avatar_is_none() {
    let (_pds, resolver) = setup().await;

    let image_url = resolver.get_profile_image(NO_AVATAR_HANDLE).await.unwrap();

    assert_eq!(image_url, None);
}

#[tokio::test]
async fn test_authentication_failure_stops_lookup() {
    let credentials = Credentials::new(FIXTURE_IDENTIFIER, "not-the-password");
    let (pds, resolver) = setup_with(credentials).await;

    let err = resolver
        .get_profile_image(FIXTURE_IDENTIFIER)
        .await
        .unwrap_err();

    match err {
        FetchError::Authentication { status } => assert_eq!(status, StatusCode::UNAUTHORIZED),
        other => panic!("expected authentication error, got {other:?}"),
    }
    assert_eq!(pds.state.calls(Endpoint::CreateSession), 1);
    assert_eq!(pds.state.calls(Endpoint::ResolveHandle), 0);
    assert_eq!(pds.state.calls(Endpoint::GetProfile), 0);
    assert!(!resolver.has_session().await);
}

#[tokio::test]
async fn test_failed_authentication_is_not_cached() {
    let (pds, resolver) = setup().await;

    pds.state.set_override(
        Endpoint::CreateSession,
        Override::Status(StatusCode::SERVICE_UNAVAILABLE),
    );
    let err = resolver
        .get_profile_image(FIXTURE_IDENTIFIER)
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::SERVICE_UNAVAILABLE));

    pds.state.clear_override(Endpoint::CreateSession);
    resolver
        .get_profile_image(FIXTURE_IDENTIFIER)
        .await
        .unwrap();

    assert_eq!(pds.state.calls(Endpoint::CreateSession), 2);
}

#[tokio::test]
async fn test_unknown_handle_fails_to_resolve() {
    let (pds, resolver) = setup().await;

    let err = resolver
        .get_profile_image("nonexistent123456789.bsky.social")
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Transport { .. }));
    assert!(err.to_string().contains("failed to resolve handle"));
    assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
    assert_eq!(pds.state.calls(Endpoint::GetProfile), 0);
}

#[tokio::test]
async fn test_profile_failure_is_reported() {
    let (pds, resolver) = setup().await;
    pds.state.set_override(
        Endpoint::GetProfile,
        Override::Status(StatusCode::INTERNAL_SERVER_ERROR),
    );

    let err = resolver
        .get_profile_image(FIXTURE_IDENTIFIER)
        .await
        .unwrap_err();

    assert!(err.to_string().contains("failed to get profile"));
    assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
}

#[tokio::test]
async fn test_expired_token_is_not_refreshed() {
    let (pds, resolver) = setup().await;
    resolver
        .get_profile_image(FIXTURE_IDENTIFIER)
        .await
        .unwrap();

    pds.state.set_override(
        Endpoint::ResolveHandle,
        Override::Status(StatusCode::UNAUTHORIZED),
    );
    let err = resolver
        .get_profile_image(FIXTURE_IDENTIFIER)
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Transport { .. }));
    assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
    assert_eq!(pds.state.calls(Endpoint::CreateSession), 1);
}

#[tokio::test]
async fn test_missing_access_jwt_is_a_parse_error() {
    let (pds, resolver) = setup().await;
    pds.state.set_override(Endpoint::CreateSession, Override::EmptyBody);

    let err = resolver
        .get_profile_image(FIXTURE_IDENTIFIER)
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Parse { .. }));
    assert_eq!(pds.state.calls(Endpoint::ResolveHandle), 0);
}

#[tokio::test]
async fn test_missing_did_is_a_parse_error() {
    let (pds, resolver) = setup().await;
    pds.state.set_override(Endpoint::ResolveHandle, Override::EmptyBody);

    let err = resolver
        .resolve_handle(FIXTURE_IDENTIFIER)
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Parse { .. }));
    assert_eq!(pds.state.calls(Endpoint::GetProfile), 0);
}

#[tokio::test]
async fn test_resolve_handle_and_get_profile() {
    let (_pds, resolver) = setup().await;

    let did = resolver.resolve_handle(FIXTURE_IDENTIFIER).await.unwrap();
    assert_eq!(did, FIXTURE_DID);

    let profile = resolver.get_profile(&did).await.unwrap();
    assert_eq!(profile.handle.as_deref(), Some(FIXTURE_IDENTIFIER));
    assert_eq!(profile.display_name.as_deref(), Some("Fixture User"));
    assert!(profile.avatar.is_some());

    let err = resolver.get_profile("  ").await.unwrap_err();
    assert!(matches!(err, FetchError::InvalidArgument(_)));
}

#[tokio::test]
async fn test_check_image() {
    let (pds, resolver) = setup().await;

    let image_url = resolver
        .get_profile_image(FIXTURE_IDENTIFIER)
        .await
        .unwrap()
        .unwrap();

    let status = resolver.check_image(&image_url).await.unwrap();
    assert_eq!(status, StatusCode::OK);

    pds.state.set_override(Endpoint::Avatar, Override::Status(StatusCode::NOT_FOUND));
    let status = resolver.check_image(&image_url).await.unwrap();
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(pds.state.calls(Endpoint::Avatar), 2);
}

#[tokio::test]
async fn test_lookup_finishing_first_is_not_interrupted() {
    let (pds, resolver) = setup().await;

    let lookup = resolver.get_profile_image(FIXTURE_IDENTIFIER);
    let image_url = interruptible(lookup, futures::future::pending::<()>())
        .await
        .unwrap()
        .expect("fixture user has an avatar");

    assert!(image_url.contains(FIXTURE_DID));
    assert_eq!(pds.state.calls(Endpoint::GetProfile), 1);
}

#[tokio::test]
async fn test_interrupted_lookup_keeps_no_partial_session() {
    let (pds, resolver) = setup().await;

    let lookup = resolver.get_profile_image(FIXTURE_IDENTIFIER);
    let err = interruptible(lookup, std::future::ready(()))
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Interrupted));
    assert!(!resolver.has_session().await);
    assert_eq!(pds.state.calls(Endpoint::GetProfile), 0);
}
