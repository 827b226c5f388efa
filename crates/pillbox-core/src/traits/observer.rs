//! Session lifecycle notifications.

use crate::Error;

/// Receives notice when the session ends without the user asking.
///
/// This is where a front end shows its "please log in again" message and
/// sends the user back to the login screen.
pub trait SessionObserver: Send + Sync {
    /// Called once per terminal failure, after stored credentials were cleared.
    fn session_ended(&self, error: &Error);
}

/// Observer that ignores every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl SessionObserver for NoopObserver {
    fn session_ended(&self, _error: &Error) {}
}
