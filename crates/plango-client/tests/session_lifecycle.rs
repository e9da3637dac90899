mod support;

use plango_client::{ApiError, RegisterForm, TripQuery};
use plango_types::RegisterRequest;

#[tokio::test]
async fn authenticated_requests_carry_the_stored_bearer() {
    let (stub, client) = support::start().await;
    support::register(&client, "ana@example.com").await;

    let access = client.session().access_token().expect("token stored after register");
    client.trips().list(&TripQuery::default()).await.unwrap();
    client.auth().me().await.unwrap();

    let requests = stub.recorded_requests();
    let register = requests.iter().find(|r| r.path == "/auth/register").unwrap();
    assert_eq!(register.authorization, None);

    let expected = format!("Bearer {access}");
    for path in ["/trips", "/auth/me"] {
        let request = requests.iter().find(|r| r.path == path).unwrap();
        assert_eq!(request.authorization.as_deref(), Some(expected.as_str()));
    }
}

#[tokio::test]
async fn expired_access_token_is_refreshed_and_retried_once() {
    let (stub, client) = support::start().await;
    let login = support::register(&client, "ben@example.com").await;

    stub.expire_access_tokens();
    let me = client.auth().me().await.expect("retry after refresh should succeed");
    assert_eq!(me.email, "ben@example.com");
    assert_eq!(stub.refresh_calls(), 1);

    let session = client.session();
    let fresh = session.access_token().unwrap();
    assert_ne!(fresh, login.access_token);
    assert_ne!(session.refresh_token().unwrap(), login.refresh_token);

    let attempts: Vec<_> = stub
        .recorded_requests()
        .into_iter()
        .filter(|r| r.path == "/auth/me")
        .collect();
    assert_eq!(attempts.len(), 2);
    assert_eq!(
        attempts[0].authorization.as_deref(),
        Some(format!("Bearer {}", login.access_token).as_str())
    );
    assert_eq!(
        attempts[1].authorization.as_deref(),
        Some(format!("Bearer {fresh}").as_str())
    );
}

#[tokio::test]
async fn failed_refresh_clears_tokens_and_surfaces_original_401() {
    let (stub, client) = support::start().await;
    support::register(&client, "cleo@example.com").await;

    stub.expire_access_tokens();
    stub.fail_refresh(true);

    let err = client.users().me().await.unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(err.to_string(), "Could not validate credentials");
    assert_eq!(stub.refresh_calls(), 1);
    assert!(!client.session().is_authenticated());
    assert_eq!(client.session().refresh_token(), None);

    let attempts = stub
        .recorded_requests()
        .into_iter()
        .filter(|r| r.path == "/users/me")
        .count();
    assert_eq!(attempts, 1);
}

#[tokio::test]
async fn missing_refresh_token_fails_without_calling_refresh() {
    let (stub, client) = support::start().await;
    client.session().set_tokens("stale-token", None).unwrap();
    assert!(client.session().is_authenticated());

    let err = client.trips().get(1).await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized { .. }));
    assert_eq!(stub.refresh_calls(), 0);
    assert!(!client.session().is_authenticated());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_unauthorized_requests_share_one_refresh() {
    let (stub, client) = support::start().await;
    support::register(&client, "dan@example.com").await;
    stub.expire_access_tokens();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let client = client.clone();
        handles.push(tokio::spawn(async move { client.auth().me().await }));
    }
    for handle in handles {
        let me = handle.await.unwrap().expect("every caller should recover");
        assert_eq!(me.email, "dan@example.com");
    }

    assert_eq!(stub.refresh_calls(), 1);
}

#[tokio::test]
async fn concurrent_callers_all_fail_after_one_rejected_refresh() {
    let (stub, client) = support::start().await;
    support::register(&client, "eve@example.com").await;
    stub.expire_access_tokens();
    stub.fail_refresh(true);

    let (auth, users) = (client.auth(), client.users());
    let (first, second) = tokio::join!(auth.me(), users.me());
    assert!(first.unwrap_err().is_unauthorized());
    assert!(second.unwrap_err().is_unauthorized());
    assert_eq!(stub.refresh_calls(), 1);
    assert!(!client.session().is_authenticated());
}

#[tokio::test]
async fn retry_after_refresh_happens_at_most_once() {
    let (stub, client) = support::start().await;
    support::register(&client, "gus@example.com").await;
    stub.expire_access_tokens();
    stub.revoke_refreshed_access_tokens(true);

    let err = client.users().me().await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized { .. }));
    assert_eq!(err.to_string(), "Could not validate credentials");
    assert_eq!(stub.refresh_calls(), 1);

    let attempts = stub
        .recorded_requests()
        .into_iter()
        .filter(|r| r.path == "/users/me")
        .count();
    assert_eq!(attempts, 2);
}

#[tokio::test]
async fn bad_login_is_a_plain_error() {
    let (stub, client) = support::start().await;
    support::register(&client, "fay@example.com").await;

    let err = client
        .auth()
        .login("fay@example.com", "wrong-password")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Invalid email or password");
    assert_eq!(stub.refresh_calls(), 0);
}

#[tokio::test]
async fn login_replaces_the_stored_pair() {
    let (_stub, client) = support::start().await;
    let registered = support::register(&client, "gus@example.com").await;

    let other = support::second_client(&client);
    assert!(!other.session().is_authenticated());
    let login = other.auth().login("gus@example.com", "secret123").await.unwrap();

    assert_eq!(login.user.id, registered.user.id);
    assert_eq!(other.session().access_token().as_deref(), Some(login.access_token.as_str()));
    assert_eq!(other.session().refresh_token().as_deref(), Some(login.refresh_token.as_str()));
}

#[tokio::test]
async fn validation_details_become_the_message() {
    let (_stub, client) = support::start().await;

    let duplicate = RegisterForm {
        name: String::new(),
        email: "not-an-email".into(),
        password: "secret123".into(),
        confirm_password: "secret123".into(),
    }
    .validate()
    .unwrap();
    let err = client.auth().register(&duplicate).await.unwrap_err();
    assert_eq!(err.status().map(|s| s.as_u16()), Some(422));
    assert_eq!(err.to_string(), "value is not a valid email address");

    support::register(&client, "hal@example.com").await;
    let again = RegisterRequest {
        name: None,
        email: "hal@example.com".into(),
        password: "secret123".into(),
    };
    let err = client.auth().register(&again).await.unwrap_err();
    assert_eq!(err.status().map(|s| s.as_u16()), Some(400));
    assert_eq!(err.to_string(), "User with this email already exists");
}

#[tokio::test]
async fn logout_revokes_refresh_token_and_clears_session() {
    let (_stub, client) = support::start().await;
    let login = support::register(&client, "ivy@example.com").await;

    client.auth().logout().await.unwrap();
    assert!(!client.session().is_authenticated());
    assert_eq!(client.session().refresh_token(), None);

    let err = client.auth().refresh(&login.refresh_token).await.unwrap_err();
    assert_eq!(err.to_string(), "Invalid or expired refresh token");
}

#[tokio::test]
async fn logout_clears_session_even_when_server_rejects_it() {
    let (_stub, client) = support::start().await;
    support::register(&client, "jon@example.com").await;
    let access = client.session().access_token().unwrap();
    client.session().set_tokens(&access, Some("refresh-unknown")).unwrap();

    let err = client.auth().logout().await.unwrap_err();
    assert_eq!(err.to_string(), "Refresh token not found");
    assert!(!client.session().is_authenticated());
}

#[tokio::test]
async fn revoke_all_invalidates_other_sessions() {
    let (stub, client) = support::start().await;
    support::register(&client, "kim@example.com").await;

    let other = support::second_client(&client);
    other.auth().login("kim@example.com", "secret123").await.unwrap();

    client.auth().revoke_all().await.unwrap();

    stub.expire_access_tokens();
    let err = other.auth().me().await.unwrap_err();
    assert!(err.is_unauthorized());
    assert!(!other.session().is_authenticated());
}

#[tokio::test]
async fn explicit_refresh_session_rotates_tokens() {
    let (stub, client) = support::start().await;
    let login = support::register(&client, "lou@example.com").await;

    assert!(client.refresh_session().await);
    assert_eq!(stub.refresh_calls(), 1);
    assert_ne!(client.session().access_token().unwrap(), login.access_token);

    stub.fail_refresh(true);
    assert!(!client.refresh_session().await);
    assert!(!client.session().is_authenticated());
}
