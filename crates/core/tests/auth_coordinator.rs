//! Integration tests for the authentication coordinator
//!
//! Drives `AuthCoordinator` against a scripted transport and an in-memory
//! token store with tokio's paused clock, so backoff delays are observable
//! without real waiting.

mod support;

use std::sync::Arc;
use std::time::Duration;

use campus_common::testing::assert_duration_between;
use campus_core::{ApiFailure, ApiRequest, HttpMethod, HttpTransport, TransportError};
use campus_domain::{
    AuthState, DomainError, ErrorKind, ProfileUpdate, RegisterRequest, TokenPair,
};
use support::transport::endpoint;
use support::{
    coordinator, stored, tokens_json, user_json, MemoryTokenStore, Reply, ScriptedTransport,
};
use tokio_util::sync::CancellationToken;

const LOGIN: &str = "/auth/login";
const REGISTER: &str = "/auth/register";
const REFRESH: &str = "/auth/refresh";
const ME: &str = "/auth/me";
const LOGOUT: &str = "/auth/logout";
const PROFILE: &str = "/auth/profile";

/// Validates the sign-in scenario end to end.
///
/// # Test Steps
/// 1. Script login to return `a1/r1/bearer` and `/auth/me` to return a user
/// 2. Log in with valid credentials
/// 3. Verify the stored pair, the broadcast state and the bearer used
#[tokio::test(start_paused = true)]
async fn test_login_stores_tokens_and_authenticates() {
    let transport = ScriptedTransport::new();
    transport
        .script(HttpMethod::Post, LOGIN, vec![Reply::ok(tokens_json("a1", "r1"))])
        .script(HttpMethod::Get, ME, vec![Reply::ok(user_json("u1", "user@x.com"))]);
    let tokens = MemoryTokenStore::new();
    let auth = coordinator(&transport, &tokens).await;
    let mut states = auth.subscribe();

    let result = auth.login("user@x.com", "secret").await;

    let user = result.into_result().expect("login should succeed");
    assert_eq!(user.email, "user@x.com");
    assert_eq!(tokens.snapshot(), Some(TokenPair::new("a1", "r1", "bearer")));
    assert!(auth.is_authenticated());
    assert!(states.has_changed().unwrap());
    assert_eq!(states.borrow_and_update().user().map(|u| u.id.as_str()), Some("u1"));

    let login = &transport.requests_to(HttpMethod::Post, LOGIN)[0].request;
    assert_eq!(login.bearer, None);
    assert_eq!(login.body.as_ref().unwrap()["email"], "user@x.com");
    let me = &transport.requests_to(HttpMethod::Get, ME)[0].request;
    assert_eq!(me.bearer.as_deref(), Some("a1"));
}

/// Validates that malformed credentials never reach the network.
#[tokio::test(start_paused = true)]
async fn test_login_validates_input_before_network() {
    let transport = ScriptedTransport::new();
    let tokens = MemoryTokenStore::new();
    let auth = coordinator(&transport, &tokens).await;

    for (email, password) in [("", "secret"), ("not-an-email", "secret"), ("user@x.com", "")] {
        let error = auth.login(email, password).await.into_result().unwrap_err();
        assert_eq!(error.kind, ErrorKind::ValidationError);
    }

    assert!(transport.requests().is_empty());
    assert_eq!(auth.current_state(), AuthState::Unauthenticated);
}

/// Validates that a 422 from login is surfaced after exactly one attempt.
#[tokio::test(start_paused = true)]
async fn test_login_validation_error_is_not_retried() {
    let transport = ScriptedTransport::new();
    transport.script(
        HttpMethod::Post,
        LOGIN,
        vec![Reply::Status(422, r#"{"detail":[{"loc":["body","password"],"msg":"too short"}]}"#.into())],
    );
    let tokens = MemoryTokenStore::new();
    let auth = coordinator(&transport, &tokens).await;

    let error = auth.login("user@x.com", "x").await.into_result().unwrap_err();

    assert_eq!(error.kind, ErrorKind::ValidationError);
    assert_eq!(error.message, "password: too short");
    assert_eq!(transport.count(HttpMethod::Post, LOGIN), 1);
    assert_eq!(tokens.saves(), 0);
}

/// Validates that wrong credentials leave the client signed out.
#[tokio::test(start_paused = true)]
async fn test_login_rejected_credentials() {
    let transport = ScriptedTransport::new();
    transport.script(
        HttpMethod::Post,
        LOGIN,
        vec![Reply::Status(401, r#"{"detail":"Incorrect email or password"}"#.into())],
    );
    let tokens = MemoryTokenStore::new();
    let auth = coordinator(&transport, &tokens).await;

    let error = auth.login("user@x.com", "wrong").await.into_result().unwrap_err();

    assert_eq!(error.kind, ErrorKind::AuthError);
    assert_eq!(error.message, "Incorrect email or password");
    assert_eq!(transport.count(HttpMethod::Post, LOGIN), 1);
    assert_eq!(transport.count(HttpMethod::Post, REFRESH), 0);
    assert!(!auth.is_authenticated());
}

/// Validates that tokens are discarded when the user lookup after sign-in
/// fails.
#[tokio::test(start_paused = true)]
async fn test_login_discards_tokens_when_user_lookup_fails() {
    let transport = ScriptedTransport::new();
    transport
        .script(HttpMethod::Post, LOGIN, vec![Reply::ok(tokens_json("a1", "r1"))])
        .script(HttpMethod::Get, ME, vec![Reply::status(403)]);
    let tokens = MemoryTokenStore::new();
    let auth = coordinator(&transport, &tokens).await;

    let error = auth.login("user@x.com", "secret").await.into_result().unwrap_err();

    assert_eq!(error.kind, ErrorKind::AuthError);
    assert_eq!(tokens.snapshot(), None);
    assert!(!auth.is_authenticated());
}

/// Validates registration follows the same path as login.
#[tokio::test(start_paused = true)]
async fn test_register_signs_in() {
    let transport = ScriptedTransport::new();
    transport
        .script(HttpMethod::Post, REGISTER, vec![Reply::Status(201, tokens_json("a1", "r1"))])
        .script(HttpMethod::Get, ME, vec![Reply::ok(user_json("u9", "new@x.com"))]);
    let tokens = MemoryTokenStore::new();
    let auth = coordinator(&transport, &tokens).await;

    let request = RegisterRequest {
        email: " new@x.com ".into(),
        password: "secret".into(),
        full_name: Some("New User".into()),
        role: Some("student".into()),
    };
    let user = auth.register(request).await.into_result().expect("register should succeed");

    assert_eq!(user.id, "u9");
    let body = transport.requests_to(HttpMethod::Post, REGISTER)[0].request.body.clone().unwrap();
    assert_eq!(body["email"], "new@x.com");
    assert_eq!(body["full_name"], "New User");
    assert_eq!(tokens.snapshot().map(|t| t.access_token), Some("a1".to_string()));
}

/// Validates the [500, 500, 200] scenario: three attempts, two backoff
/// delays within the jitter bounds.
///
/// # Test Steps
/// 1. Start with stored tokens and script `/auth/me` as 500, 500, 200
/// 2. Fetch the current user
/// 3. Verify success, three requests, and gaps of 1s±250ms and 2s±250ms
#[tokio::test(start_paused = true)]
async fn test_get_current_user_recovers_from_server_errors() {
    let transport = ScriptedTransport::new();
    transport.script(
        HttpMethod::Get,
        ME,
        vec![Reply::status(500), Reply::status(500), Reply::ok(user_json("u1", "user@x.com"))],
    );
    let tokens = MemoryTokenStore::with_tokens(stored("a0", "r0"));
    let auth = coordinator(&transport, &tokens).await;

    let user = auth.get_current_user().await.into_result().expect("should recover");

    assert_eq!(user.id, "u1");
    let calls = transport.requests_to(HttpMethod::Get, ME);
    assert_eq!(calls.len(), 3);
    assert_duration_between(
        calls[1].at - calls[0].at,
        Duration::from_millis(750),
        Duration::from_millis(1250),
    );
    assert_duration_between(
        calls[2].at - calls[1].at,
        Duration::from_millis(1750),
        Duration::from_millis(2250),
    );
    assert_eq!(auth.current_state().user().map(|u| u.id.as_str()), Some("u1"));
}

/// Validates that persistent network failures use the full attempt budget
/// and surface as `NetworkError`.
#[tokio::test(start_paused = true)]
async fn test_network_failure_exhausts_attempts() {
    let transport = ScriptedTransport::new();
    transport.script(
        HttpMethod::Get,
        ME,
        vec![Reply::Fail(TransportError::Timeout("read timed out".into()))],
    );
    let tokens = MemoryTokenStore::with_tokens(stored("a0", "r0"));
    let auth = coordinator(&transport, &tokens).await;

    let error = auth.get_current_user().await.into_result().unwrap_err();

    assert_eq!(error.kind, ErrorKind::NetworkError);
    assert_eq!(transport.count(HttpMethod::Get, ME), 3);
    assert_eq!(tokens.snapshot(), Some(stored("a0", "r0")));
    assert!(auth.is_authenticated());
}

/// Validates refresh-and-retry-once after a 401.
///
/// # Test Steps
/// 1. `/auth/me` answers 401 for `a0` and 200 for `a1`
/// 2. Refresh returns `a1/r1`
/// 3. Verify one refresh, two user lookups and the new pair stored
#[tokio::test(start_paused = true)]
async fn test_auth_failure_refreshes_and_replays_once() {
    let transport = ScriptedTransport::new();
    transport
        .handle(HttpMethod::Get, ME, |request| match request.bearer.as_deref() {
            Some("a1") => Reply::ok(user_json("u1", "user@x.com")),
            _ => Reply::status(401),
        })
        .script(HttpMethod::Post, REFRESH, vec![Reply::ok(tokens_json("a1", "r1"))]);
    let tokens = MemoryTokenStore::with_tokens(stored("a0", "r0"));
    let auth = coordinator(&transport, &tokens).await;

    let user = auth.get_current_user().await.into_result().expect("replay should succeed");

    assert_eq!(user.id, "u1");
    assert_eq!(transport.count(HttpMethod::Get, ME), 2);
    assert_eq!(transport.count(HttpMethod::Post, REFRESH), 1);
    let refresh = &transport.requests_to(HttpMethod::Post, REFRESH)[0].request;
    assert_eq!(refresh.body.as_ref().unwrap()["refresh_token"], "r0");
    assert_eq!(tokens.snapshot(), Some(stored("a1", "r1")));
    assert!(auth.current_state().user().is_some());
}

/// Validates that a second 401 after a successful refresh signs out.
#[tokio::test(start_paused = true)]
async fn test_second_auth_failure_signs_out_and_clears() {
    let transport = ScriptedTransport::new();
    transport
        .script(HttpMethod::Get, ME, vec![Reply::status(401)])
        .script(HttpMethod::Post, REFRESH, vec![Reply::ok(tokens_json("a1", "r1"))]);
    let tokens = MemoryTokenStore::with_tokens(stored("a0", "r0"));
    let auth = coordinator(&transport, &tokens).await;
    assert!(auth.is_authenticated());

    let error = auth.get_current_user().await.into_result().unwrap_err();

    assert_eq!(error.kind, ErrorKind::AuthError);
    assert_eq!(transport.count(HttpMethod::Get, ME), 2);
    assert_eq!(transport.count(HttpMethod::Post, REFRESH), 1);
    assert_eq!(tokens.snapshot(), None);
    assert_eq!(auth.current_state(), AuthState::Unauthenticated);
}

/// Validates that a rejected refresh token signs out.
#[tokio::test(start_paused = true)]
async fn test_rejected_refresh_token_signs_out() {
    let transport = ScriptedTransport::new();
    transport
        .script(HttpMethod::Get, ME, vec![Reply::status(401)])
        .script(HttpMethod::Post, REFRESH, vec![Reply::status(401)]);
    let tokens = MemoryTokenStore::with_tokens(stored("a0", "r0"));
    let auth = coordinator(&transport, &tokens).await;

    let error = auth.get_current_user().await.into_result().unwrap_err();

    assert_eq!(error.kind, ErrorKind::AuthError);
    assert_eq!(transport.count(HttpMethod::Get, ME), 1);
    assert_eq!(transport.count(HttpMethod::Post, REFRESH), 1);
    assert_eq!(tokens.snapshot(), None);
    assert!(!auth.is_authenticated());
}

/// Validates that a missing refresh token signs out without calling the
/// refresh endpoint.
#[tokio::test(start_paused = true)]
async fn test_missing_refresh_token_signs_out() {
    let transport = ScriptedTransport::new();
    transport.script(HttpMethod::Get, ME, vec![Reply::status(401)]);
    let tokens = MemoryTokenStore::with_access_only("a0");
    let auth = coordinator(&transport, &tokens).await;

    let error = auth.get_current_user().await.into_result().unwrap_err();

    assert!(error.is_auth());
    assert_eq!(transport.count(HttpMethod::Post, REFRESH), 0);
    assert_eq!(tokens.clears(), 1);
    assert!(!auth.is_authenticated());
}

/// Validates that a refresh failing on the network keeps the stored tokens.
#[tokio::test(start_paused = true)]
async fn test_refresh_network_failure_keeps_tokens() {
    let transport = ScriptedTransport::new();
    transport
        .script(HttpMethod::Get, ME, vec![Reply::status(401)])
        .script(
            HttpMethod::Post,
            REFRESH,
            vec![Reply::Fail(TransportError::Connect("connection refused".into()))],
        );
    let tokens = MemoryTokenStore::with_tokens(stored("a0", "r0"));
    let auth = coordinator(&transport, &tokens).await;

    let error = auth.get_current_user().await.into_result().unwrap_err();

    assert_eq!(error.kind, ErrorKind::NetworkError);
    assert_eq!(transport.count(HttpMethod::Post, REFRESH), 3);
    assert_eq!(tokens.snapshot(), Some(stored("a0", "r0")));
    assert!(auth.is_authenticated());
}

/// Validates that a refreshed pair that cannot be stored ends the session
/// instead of keeping the spent refresh token.
#[tokio::test(start_paused = true)]
async fn test_refresh_store_failure_signs_out() {
    let transport = ScriptedTransport::new();
    transport
        .script(HttpMethod::Get, ME, vec![Reply::status(401)])
        .script(HttpMethod::Post, REFRESH, vec![Reply::ok(tokens_json("a1", "r1"))]);
    let tokens = MemoryTokenStore::with_tokens(stored("a0", "r0"));
    let auth = coordinator(&transport, &tokens).await;
    tokens.reject_saves();

    let error = auth.get_current_user().await.into_result().unwrap_err();

    assert_eq!(error.kind, ErrorKind::UnknownError);
    assert_eq!(transport.count(HttpMethod::Post, REFRESH), 1);
    assert_eq!(transport.count(HttpMethod::Get, ME), 1);
    assert_eq!(tokens.snapshot(), None);
    assert_eq!(auth.current_state(), AuthState::Unauthenticated);
}

/// Validates the single-flight property: two concurrent calls that both see
/// an expired token cause exactly one refresh request.
///
/// # Test Steps
/// 1. `/auth/me` rejects `a0`, accepts `a1`
/// 2. Refresh takes 100ms, so both callers are waiting on it
/// 3. Run both lookups concurrently
/// 4. Verify one refresh and two successful results
#[tokio::test(start_paused = true)]
async fn test_concurrent_auth_failures_share_one_refresh() {
    let transport = ScriptedTransport::new();
    transport
        .handle(HttpMethod::Get, ME, |request| match request.bearer.as_deref() {
            Some("a1") => Reply::ok(user_json("u1", "user@x.com")),
            _ => Reply::after(Duration::from_millis(10), Reply::status(401)),
        })
        .script(
            HttpMethod::Post,
            REFRESH,
            vec![Reply::after(Duration::from_millis(100), Reply::ok(tokens_json("a1", "r1")))],
        );
    let tokens = MemoryTokenStore::with_tokens(stored("a0", "r0"));
    let auth = coordinator(&transport, &tokens).await;

    let (first, second) = futures::join!(auth.get_current_user(), auth.get_current_user());

    assert!(first.is_success(), "{first:?}");
    assert!(second.is_success(), "{second:?}");
    assert_eq!(transport.count(HttpMethod::Post, REFRESH), 1);
    assert_eq!(tokens.saves(), 1);
    let replayed: Vec<_> = transport
        .requests_to(HttpMethod::Get, ME)
        .into_iter()
        .filter(|r| r.request.bearer.as_deref() == Some("a1"))
        .collect();
    assert_eq!(replayed.len(), 2);
}

/// Validates proactive refresh.
#[tokio::test(start_paused = true)]
async fn test_refresh_session_rotates_tokens() {
    let transport = ScriptedTransport::new();
    transport.script(HttpMethod::Post, REFRESH, vec![Reply::ok(tokens_json("a2", "r2"))]);
    let tokens = MemoryTokenStore::with_tokens(stored("a1", "r1"));
    let auth = coordinator(&transport, &tokens).await;

    assert!(auth.refresh_session().await.is_success());
    assert_eq!(tokens.snapshot(), Some(stored("a2", "r2")));
    assert!(auth.is_authenticated());
}

/// Validates that logout clears local state even when the server call fails.
#[tokio::test(start_paused = true)]
async fn test_logout_clears_session_even_on_server_error() {
    let transport = ScriptedTransport::new();
    transport.script(HttpMethod::Post, LOGOUT, vec![Reply::status(500)]);
    let tokens = MemoryTokenStore::with_tokens(stored("a0", "r0"));
    let auth = coordinator(&transport, &tokens).await;
    assert!(auth.is_authenticated());

    let result = auth.logout().await;

    assert!(result.is_success());
    assert_eq!(tokens.snapshot(), None);
    assert_eq!(auth.current_state(), AuthState::Unauthenticated);
    assert_eq!(transport.count(HttpMethod::Post, LOGOUT), 3);
    let call = &transport.requests_to(HttpMethod::Post, LOGOUT)[0].request;
    assert_eq!(call.bearer.as_deref(), Some("a0"));
}

/// Validates that a user lookup still in flight when logout runs does not
/// sign the client back in.
///
/// # Test Steps
/// 1. `/auth/me` answers after 100ms
/// 2. Start the lookup, log out at 10ms
/// 3. Verify the late reply leaves the client signed out with no tokens
#[tokio::test(start_paused = true)]
async fn test_logout_during_user_lookup_stays_signed_out() {
    let transport = ScriptedTransport::new();
    transport
        .script(
            HttpMethod::Get,
            ME,
            vec![Reply::after(Duration::from_millis(100), Reply::ok(user_json("u1", "user@x.com")))],
        )
        .script(HttpMethod::Post, LOGOUT, vec![Reply::status(204)]);
    let tokens = MemoryTokenStore::with_tokens(stored("a0", "r0"));
    let auth = Arc::new(coordinator(&transport, &tokens).await);

    let lookup = {
        let auth = Arc::clone(&auth);
        tokio::spawn(async move { auth.get_current_user().await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(auth.logout().await.is_success());
    assert!(!auth.is_authenticated());

    let result = lookup.await.expect("task should not panic");

    assert!(result.is_success(), "{result:?}");
    assert_eq!(tokens.snapshot(), None);
    assert!(!auth.is_authenticated());
    assert_eq!(auth.current_state(), AuthState::Unauthenticated);
}

/// Validates that logging out while a sign-in is loading its user discards
/// that sign-in.
#[tokio::test(start_paused = true)]
async fn test_logout_during_sign_in_discards_session() {
    let transport = ScriptedTransport::new();
    transport
        .script(HttpMethod::Post, LOGIN, vec![Reply::ok(tokens_json("a1", "r1"))])
        .script(
            HttpMethod::Get,
            ME,
            vec![Reply::after(Duration::from_millis(100), Reply::ok(user_json("u1", "user@x.com")))],
        )
        .script(HttpMethod::Post, LOGOUT, vec![Reply::status(204)]);
    let tokens = MemoryTokenStore::new();
    let auth = Arc::new(coordinator(&transport, &tokens).await);

    let login = {
        let auth = Arc::clone(&auth);
        tokio::spawn(async move { auth.login("user@x.com", "secret").await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(auth.logout().await.is_success());

    let error = login.await.expect("task should not panic").into_result().unwrap_err();

    assert_eq!(error.kind, ErrorKind::AuthError);
    assert_eq!(tokens.snapshot(), None);
    assert_eq!(auth.current_state(), AuthState::Unauthenticated);
    let logout = &transport.requests_to(HttpMethod::Post, LOGOUT)[0].request;
    assert_eq!(logout.bearer.as_deref(), Some("a1"));
}

/// Validates that logout without tokens does not touch the network.
#[tokio::test(start_paused = true)]
async fn test_logout_without_session_skips_server() {
    let transport = ScriptedTransport::new();
    let tokens = MemoryTokenStore::new();
    let auth = coordinator(&transport, &tokens).await;

    assert!(auth.logout().await.is_success());
    assert!(transport.requests().is_empty());
    assert_eq!(tokens.clears(), 1);
}

/// Validates the start-up state derived from the token store.
#[tokio::test(start_paused = true)]
async fn test_initial_state_follows_token_store() {
    let transport = ScriptedTransport::new();

    let signed_in = coordinator(&transport, &MemoryTokenStore::with_tokens(stored("a0", "r0"))).await;
    assert_eq!(signed_in.current_state(), AuthState::Authenticated { user: None });

    let signed_out = coordinator(&transport, &MemoryTokenStore::new()).await;
    assert_eq!(signed_out.current_state(), AuthState::Unauthenticated);
}

/// Validates profile updates: empty updates are rejected locally, valid ones
/// update the broadcast user.
#[tokio::test(start_paused = true)]
async fn test_update_profile() {
    let transport = ScriptedTransport::new();
    transport.script(
        HttpMethod::Put,
        PROFILE,
        vec![Reply::ok(r#"{"id":7,"email":"user@x.com","full_name":"Ada"}"#)],
    );
    let tokens = MemoryTokenStore::with_tokens(stored("a0", "r0"));
    let auth = coordinator(&transport, &tokens).await;

    let error = auth.update_profile(ProfileUpdate::default()).await.into_result().unwrap_err();
    assert_eq!(error.kind, ErrorKind::ValidationError);
    assert!(transport.requests().is_empty());

    let update = ProfileUpdate { full_name: Some("Ada".into()), ..ProfileUpdate::default() };
    let user = auth.update_profile(update).await.into_result().expect("update should succeed");

    assert_eq!(user.id, "7");
    assert_eq!(auth.current_state().user().and_then(|u| u.full_name.as_deref()), Some("Ada"));
    let call = &transport.requests_to(HttpMethod::Put, PROFILE)[0].request;
    assert_eq!(call.body.as_ref().unwrap()["full_name"], "Ada");
    assert!(call.body.as_ref().unwrap().get("email").is_none());
}

/// Validates that cancelling during a backoff sleep resolves to a cancelled
/// error and sends no further request.
#[tokio::test(start_paused = true)]
async fn test_cancel_during_backoff() {
    let transport = ScriptedTransport::new();
    transport.script(HttpMethod::Get, ME, vec![Reply::status(503)]);
    let tokens = MemoryTokenStore::with_tokens(stored("a0", "r0"));
    let auth = Arc::new(coordinator(&transport, &tokens).await);
    let cancel = CancellationToken::new();

    let call = {
        let auth = Arc::clone(&auth);
        let cancel = cancel.clone();
        let transport = transport.clone();
        let url = endpoint(ME);
        tokio::spawn(async move {
            auth.authorized_with_cancel(&cancel, move |token| {
                let transport = transport.clone();
                let request = ApiRequest::get(url.clone()).with_bearer(token);
                async move {
                    let response = transport.send(request).await?;
                    if response.is_success() {
                        Ok(response)
                    } else {
                        Err(ApiFailure::Status(response))
                    }
                }
            })
            .await
        })
    };

    tokio::time::sleep(Duration::from_millis(500)).await;
    cancel.cancel();
    let result = call.await.expect("task should not panic");

    assert!(result.error_ref().is_some_and(DomainError::is_cancelled), "{result:?}");
    assert_eq!(transport.count(HttpMethod::Get, ME), 1);
    assert!(auth.is_authenticated());
}

/// Validates that `cancel_in_flight` aborts a hanging request and leaves the
/// coordinator usable.
#[tokio::test(start_paused = true)]
async fn test_cancel_in_flight_aborts_hanging_request() {
    let transport = ScriptedTransport::new();
    transport.script(
        HttpMethod::Get,
        ME,
        vec![Reply::Hang, Reply::ok(user_json("u1", "user@x.com"))],
    );
    let tokens = MemoryTokenStore::with_tokens(stored("a0", "r0"));
    let auth = Arc::new(coordinator(&transport, &tokens).await);

    let pending = {
        let auth = Arc::clone(&auth);
        tokio::spawn(async move { auth.get_current_user().await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;
    auth.cancel_in_flight();

    let result = pending.await.expect("task should not panic");
    assert!(result.error_ref().is_some_and(DomainError::is_cancelled));
    assert_eq!(tokens.snapshot(), Some(stored("a0", "r0")));

    let user = auth.get_current_user().await.into_result().expect("next call proceeds");
    assert_eq!(user.id, "u1");
}

/// Validates that server error codes are mapped through the configured table.
#[tokio::test(start_paused = true)]
async fn test_error_code_table_drives_kind() {
    let transport = ScriptedTransport::new();
    transport.script(
        HttpMethod::Post,
        REGISTER,
        vec![Reply::Status(409, r#"{"code":"EMAIL_TAKEN","message":"Email already registered"}"#.into())],
    );
    let tokens = MemoryTokenStore::new();
    let mut config = support::test_config();
    config.error_codes.insert("EMAIL_TAKEN".into(), ErrorKind::ValidationError);
    let auth = campus_core::AuthCoordinator::start(config, Arc::new(transport.clone()), Arc::new(tokens.clone()))
        .await
        .unwrap();

    let request = RegisterRequest {
        email: "taken@x.com".into(),
        password: "secret".into(),
        full_name: None,
        role: None,
    };
    let error = auth.register(request).await.into_result().unwrap_err();

    assert_eq!(error.kind, ErrorKind::ValidationError);
    assert_eq!(error.message, "Email already registered");
    assert_eq!(transport.count(HttpMethod::Post, REGISTER), 1);
}
