use thiserror::Error;

/// Error types for Wynk operations.
///
/// This enum covers everything that can go wrong when talking to the Wynk API:
/// network failures, non-success HTTP responses, malformed bodies, missing or
/// expired sessions, and client-side input guards.
///
/// # Error Handling Examples
///
/// ```rust,no_run
/// use wynk_client::{Credentials, Role, WynkClient, WynkClientImpl, WynkError};
///
/// #[tokio::main]
/// async fn main() {
///     let client = WynkClientImpl::new(Box::new(http_client::native::NativeClient::new()));
///     let credentials = Credentials::new("alice", "secret");
///
///     match client.login(Role::Listener, &credentials).await {
///         Ok(session) => println!("Logged in as {}", session.username),
///         Err(WynkError::Status { message: Some(msg), .. }) => eprintln!("Rejected: {msg}"),
///         Err(WynkError::Http(msg)) => eprintln!("Network error: {msg}"),
///         Err(e) => eprintln!("Other error: {e}"),
///     }
/// }
/// ```
#[derive(Error, Debug)]
pub enum WynkError {
    /// HTTP/network related errors.
    ///
    /// This includes connection failures, timeouts, DNS errors, and failures
    /// while reading a response body.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The server answered with a non-success status code.
    ///
    /// `message` carries the `message` field of the server's JSON error body
    /// when one was present.
    #[error("Request failed with status {status}{}", status_suffix(.message))]
    Status {
        /// HTTP status code
        status: u16,
        /// Server supplied error message, if any
        message: Option<String>,
    },

    /// Failed to parse the server's response.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Authentication failures.
    ///
    /// Returned when login is rejected or when an authenticated request comes
    /// back 401/403. In the latter case the client drops its session.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// No session is available; the request was not sent.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// The stored session is past its expiry; the request was not sent.
    #[error("Session expired, please log in again")]
    SessionExpired,

    /// A client-side guard rejected the input before any request was made.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// File system I/O errors.
    ///
    /// This can occur when persisting sessions or materialising playback files.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn status_suffix(message: &Option<String>) -> String {
    match message {
        Some(m) => format!(": {m}"),
        None => String::new(),
    }
}

impl WynkError {
    /// The server supplied message for a rejected request, if there was one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            WynkError::Status { message, .. } => message.as_deref(),
            WynkError::Auth(msg) => Some(msg.as_str()),
            _ => None,
        }
    }

    /// Whether the request never produced an HTTP response.
    pub fn is_network(&self) -> bool {
        matches!(self, WynkError::Http(_))
    }
}
