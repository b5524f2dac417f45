//! Trip session liveness.
//!
//! A [`TripSession`] is owned by whatever hosts one trip (the navigation
//! screen). Phase managers bound to it hold only a [`SessionLiveness`]; once the
//! session is ended or dropped they refuse all further work, and any
//! transition still running is cancelled at its next suspension point.

use tokio_util::sync::CancellationToken;
use uuid::Uuid;

#[derive(Debug)]
pub struct TripSession {
    id: Uuid,
    closed: CancellationToken,
}

impl TripSession {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            closed: CancellationToken::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn liveness(&self) -> SessionLiveness {
        SessionLiveness {
            id: self.id,
            closed: self.closed.clone(),
        }
    }

    /// End the session explicitly. Equivalent to dropping it.
    pub fn end(self) {
        tracing::info!(session = %self.id, "Trip session ended");
    }
}

impl Default for TripSession {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TripSession {
    fn drop(&mut self) {
        self.closed.cancel();
    }
}

/// Read-only view of a [`TripSession`].
#[derive(Debug, Clone)]
pub struct SessionLiveness {
    id: Uuid,
    closed: CancellationToken,
}

impl SessionLiveness {
    pub fn session_id(&self) -> Uuid {
        self.id
    }

    pub fn is_alive(&self) -> bool {
        !self.closed.is_cancelled()
    }

    /// A token cancelled when the session closes, or when cancelled itself.
    pub fn child_token(&self) -> CancellationToken {
        self.closed.child_token()
    }
}
