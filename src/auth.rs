//! Login and registration form.

use crate::client::MISSING_TOKEN;
use crate::session::SessionStore;
use crate::types::{Credentials, Role};
use crate::{WynkClient, WynkError};

pub const REGISTERED: &str = "Registered successfully!";
pub const REGISTRATION_FAILED: &str = "Registration failed.";
pub const CONNECT_FAILED: &str = "Failed to connect to server.";
pub const LOGIN_FAILED: &str = "Login failed.";
pub const LOGIN_REQUEST_FAILED: &str = "Login request failed.";

/// Which action the form submits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    #[default]
    Login,
    Register,
}

/// The view to open after a successful login.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    ListenerDashboard,
    PerformerDashboard,
}

impl From<Role> for Route {
    fn from(role: Role) -> Self {
        match role {
            Role::Listener => Route::ListenerDashboard,
            Role::Performer => Route::PerformerDashboard,
        }
    }
}

/// State of the authentication form.
///
/// `error` and `message` hold the text shown to the user after the last
/// action; at most one of them is set.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct AuthPage {
    pub mode: AuthMode,
    pub role: Role,
    pub name: String,
    pub password: String,
    pub error: Option<String>,
    pub message: Option<String>,
}

impl std::fmt::Debug for AuthPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthPage")
            .field("mode", &self.mode)
            .field("role", &self.role)
            .field("name", &self.name)
            .field("password", &"<redacted>")
            .field("error", &self.error)
            .field("message", &self.message)
            .finish()
    }
}

impl AuthPage {
    pub fn new(mode: AuthMode, role: Role) -> Self {
        Self {
            mode,
            role,
            ..Self::default()
        }
    }

    /// Fill in both credential fields.
    pub fn with_credentials(mut self, name: impl Into<String>, password: impl Into<String>) -> Self {
        self.name = name.into();
        self.password = password.into();
        self
    }

    /// Flip between login and registration.
    pub fn toggle_mode(&mut self) {
        self.clear_feedback();
        self.mode = match self.mode {
            AuthMode::Login => AuthMode::Register,
            AuthMode::Register => AuthMode::Login,
        };
    }

    /// Run the action for the current mode.
    ///
    /// Returns the dashboard to open when a login succeeded.
    pub async fn submit<C, S>(&mut self, client: &C, store: &S) -> Option<Route>
    where
        C: WynkClient + ?Sized,
        S: SessionStore + ?Sized,
    {
        match self.mode {
            AuthMode::Register => {
                self.register(client).await;
                None
            }
            AuthMode::Login => self.login(client, store).await,
        }
    }

    /// Register the filled in name and password for the selected role.
    pub async fn register<C: WynkClient + ?Sized>(&mut self, client: &C) {
        self.clear_feedback();

        match client.register(self.role, &self.credentials()).await {
            Ok(()) => self.message = Some(REGISTERED.to_string()),
            Err(e) => {
                log::warn!("Registration of '{}' failed: {e}", self.name);
                self.error = Some(match &e {
                    WynkError::Status { message, .. } => message
                        .clone()
                        .unwrap_or_else(|| REGISTRATION_FAILED.to_string()),
                    WynkError::Http(_) => CONNECT_FAILED.to_string(),
                    _ => REGISTRATION_FAILED.to_string(),
                });
            }
        }
    }

    /// Log in and, on success, save the session and clear the password.
    ///
    /// The store is left untouched when the login fails.
    pub async fn login<C, S>(&mut self, client: &C, store: &S) -> Option<Route>
    where
        C: WynkClient + ?Sized,
        S: SessionStore + ?Sized,
    {
        self.clear_feedback();

        let session = match client.login(self.role, &self.credentials()).await {
            Ok(session) => session,
            Err(e) => {
                log::warn!("Login of '{}' failed: {e}", self.name);
                self.error = Some(login_error_text(&e));
                return None;
            }
        };

        if let Err(e) = store.save(&session) {
            log::error!("Failed to save session: {e}");
            client.logout();
            self.error = Some(LOGIN_REQUEST_FAILED.to_string());
            return None;
        }

        self.password.clear();
        Some(Route::from(session.role))
    }

    fn credentials(&self) -> Credentials {
        Credentials::new(self.name.clone(), self.password.clone())
    }

    fn clear_feedback(&mut self) {
        self.error = None;
        self.message = None;
    }
}

fn login_error_text(error: &WynkError) -> String {
    match error {
        WynkError::Status { message, .. } => {
            message.clone().unwrap_or_else(|| LOGIN_FAILED.to_string())
        }
        WynkError::Auth(msg) if msg == MISSING_TOKEN => LOGIN_FAILED.to_string(),
        WynkError::Auth(msg) => msg.clone(),
        _ => LOGIN_REQUEST_FAILED.to_string(),
    }
}
