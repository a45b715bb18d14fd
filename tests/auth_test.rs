mod common;

use common::FakeWynk;
use wynk_client::auth::{
    CONNECT_FAILED, LOGIN_FAILED, LOGIN_REQUEST_FAILED, REGISTERED, REGISTRATION_FAILED,
};
use wynk_client::{
    AuthMode, AuthPage, MemorySessionStore, Role, Route, SessionStore, WynkClient,
};

#[test_log::test(tokio::test)]
async fn test_register_then_duplicate_register() {
    let fake = FakeWynk::new();
    let client = fake.client();
    let store = MemorySessionStore::new();

    let mut page = AuthPage::new(AuthMode::Register, Role::Listener).with_credentials("neha", "pw");
    assert_eq!(page.submit(&client, &store).await, None);
    assert_eq!(page.message.as_deref(), Some(REGISTERED));
    assert!(page.error.is_none());
    assert_eq!(fake.requests(), vec!["POST /wynk/register/user"]);

    page.submit(&client, &store).await;
    assert!(page.message.is_none());
    assert_eq!(page.error.as_deref(), Some("User already exists"));
}

#[test_log::test(tokio::test)]
async fn test_register_performer_uses_singer_endpoint() {
    let fake = FakeWynk::new();
    let client = fake.client();

    let mut page = AuthPage::new(AuthMode::Register, Role::Performer).with_credentials("kk", "pw");
    page.register(&client).await;
    assert_eq!(page.message.as_deref(), Some(REGISTERED));
    assert_eq!(fake.requests(), vec!["POST /wynk/register/singer"]);
}

#[test_log::test(tokio::test)]
async fn test_register_while_offline() {
    let fake = FakeWynk::new();
    fake.set_offline(true);
    let client = fake.client();

    let mut page = AuthPage::new(AuthMode::Register, Role::Listener).with_credentials("neha", "pw");
    page.register(&client).await;
    assert_eq!(page.error.as_deref(), Some(CONNECT_FAILED));
}

#[test_log::test(tokio::test)]
async fn test_performer_login_routes_and_stores_token() {
    let fake = FakeWynk::with_library();
    let client = fake.client();
    let store = MemorySessionStore::new();

    let mut page = AuthPage::new(AuthMode::Login, Role::Performer).with_credentials("arijit", "pw");
    let route = page.submit(&client, &store).await;

    assert_eq!(route, Some(Route::PerformerDashboard));
    assert!(page.error.is_none());
    assert!(page.password.is_empty());
    assert_eq!(fake.requests(), vec!["POST /wynk/login/singer"]);

    let session = store.load().unwrap().expect("session saved");
    assert!(!session.token.is_empty());
    assert_eq!(session.username, "arijit");
    assert_eq!(session.role, Role::Performer);
    assert_eq!(client.session(), Some(session));
}

#[test_log::test(tokio::test)]
async fn test_listener_login_routes_to_listener_dashboard() {
    let fake = FakeWynk::with_library();
    let client = fake.client();
    let store = MemorySessionStore::new();

    let mut page = AuthPage::new(AuthMode::Login, Role::Listener).with_credentials("alice", "pw");
    assert_eq!(
        page.login(&client, &store).await,
        Some(Route::ListenerDashboard)
    );
    assert_eq!(fake.requests(), vec!["POST /wynk/login"]);
}

#[test_log::test(tokio::test)]
async fn test_wrong_password_leaves_store_untouched() {
    let fake = FakeWynk::with_library();
    let client = fake.client();
    let store = MemorySessionStore::new();

    let mut page =
        AuthPage::new(AuthMode::Login, Role::Performer).with_credentials("arijit", "wrong");
    assert_eq!(page.submit(&client, &store).await, None);

    assert_eq!(page.error.as_deref(), Some("Invalid credentials"));
    assert_eq!(page.password, "wrong");
    assert!(store.load().unwrap().is_none());
    assert!(!client.is_logged_in());
}

#[test_log::test(tokio::test)]
async fn test_login_role_must_match_account() {
    let fake = FakeWynk::with_library();
    let client = fake.client();
    let store = MemorySessionStore::new();

    // alice is a listener, not a performer
    let mut page = AuthPage::new(AuthMode::Login, Role::Performer).with_credentials("alice", "pw");
    assert_eq!(page.submit(&client, &store).await, None);
    assert!(page.error.is_some());
    assert!(store.load().unwrap().is_none());
}

#[test_log::test(tokio::test)]
async fn test_login_while_offline() {
    let fake = FakeWynk::with_library();
    fake.set_offline(true);
    let client = fake.client();
    let store = MemorySessionStore::new();

    let mut page = AuthPage::new(AuthMode::Login, Role::Listener).with_credentials("alice", "pw");
    assert_eq!(page.submit(&client, &store).await, None);
    assert_eq!(page.error.as_deref(), Some(LOGIN_REQUEST_FAILED));
    assert!(store.load().unwrap().is_none());
}

#[test_log::test(tokio::test)]
async fn test_toggle_then_submit_registers_and_logs_in() {
    let fake = FakeWynk::new();
    let client = fake.client();
    let store = MemorySessionStore::new();

    let mut page = AuthPage::new(AuthMode::Login, Role::Listener).with_credentials("ravi", "pw");
    assert_eq!(page.submit(&client, &store).await, None);
    assert_eq!(page.error.as_deref(), Some("Invalid credentials"));

    page.toggle_mode();
    assert!(page.error.is_none());
    page.submit(&client, &store).await;
    assert_eq!(page.message.as_deref(), Some(REGISTERED));

    page.toggle_mode();
    assert_eq!(
        page.submit(&client, &store).await,
        Some(Route::ListenerDashboard)
    );
    assert!(page.message.is_none());
    assert!(store.load().unwrap().is_some());
}

#[test_log::test(tokio::test)]
async fn test_html_error_page_uses_generic_failure_text() {
    let fake = FakeWynk::with_library();
    fake.set_gateway_error(true);
    let client = fake.client();
    let store = MemorySessionStore::new();

    let mut page = AuthPage::new(AuthMode::Register, Role::Listener).with_credentials("neha", "pw");
    page.register(&client).await;
    assert_eq!(page.error.as_deref(), Some(REGISTRATION_FAILED));

    let mut page = AuthPage::new(AuthMode::Login, Role::Listener).with_credentials("alice", "pw");
    assert_eq!(page.login(&client, &store).await, None);
    assert_eq!(page.error.as_deref(), Some(LOGIN_FAILED));
    assert!(store.load().unwrap().is_none());
}

#[test]
fn test_fallback_texts() {
    assert_eq!(LOGIN_FAILED, "Login failed.");
    assert_eq!(LOGIN_REQUEST_FAILED, "Login request failed.");
    assert_eq!(CONNECT_FAILED, "Failed to connect to server.");
}
