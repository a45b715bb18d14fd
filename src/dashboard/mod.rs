//! Controllers for the two dashboards opened after login.

pub mod listener;
pub mod performer;

pub use listener::ListenerDashboard;
pub use performer::{PerformerDashboard, UploadFile, UploadForm};

use crate::session::{SessionStore, WynkSession};
use crate::{Result, WynkClient, WynkError};

/// Load the stored session and make it the client's current one.
///
/// An expired session is removed from the store.
pub(crate) fn resume_session<C, S>(client: &C, store: &S) -> Result<WynkSession>
where
    C: WynkClient + ?Sized,
    S: SessionStore + ?Sized,
{
    let session = store.load_valid()?.ok_or(WynkError::NotAuthenticated)?;
    if client.session().as_ref() != Some(&session) {
        client.restore_session(session.clone());
    }
    Ok(session)
}

/// Drop the stored session when the server or the client refused it.
pub(crate) fn forget_rejected_session<S: SessionStore + ?Sized>(store: &S, error: &WynkError) {
    if matches!(error, WynkError::Auth(_) | WynkError::SessionExpired) {
        log::info!("Session no longer usable, removing it: {error}");
        if let Err(e) = store.clear() {
            log::error!("Failed to remove stored session: {e}");
        }
    }
}
