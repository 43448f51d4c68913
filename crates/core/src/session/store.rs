//! First-party session store
//!
//! Holds the Listify bearer session and mirrors it to a durable key/value
//! store under `listify_session`, so a restart resumes the session. The
//! Spotify session is tracked separately by the token lifecycle in
//! `listify_common::auth`.

use std::sync::Arc;

use listify_common::error::CommonError;
use listify_common::observability::ErrorLog;
use listify_common::storage::KeyValueStore;
use listify_domain::constants::{CONTEXT_SESSION_STORAGE, SESSION_KEY};
use listify_domain::{Result, Session, User};
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Signed-in state with explicit login/logout transitions
pub struct SessionStore {
    storage: Arc<dyn KeyValueStore>,
    errors: Arc<ErrorLog>,
    current: watch::Sender<Option<Session>>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Open the store, restoring a previously persisted session
    ///
    /// An unreadable or corrupt entry is logged and discarded; the store
    /// then starts signed out.
    pub fn new(storage: Arc<dyn KeyValueStore>, errors: Arc<ErrorLog>) -> Self {
        let restored = Self::restore(storage.as_ref(), &errors);
        let (current, _) = watch::channel(restored);
        Self { storage, errors, current }
    }

    fn restore(storage: &dyn KeyValueStore, errors: &ErrorLog) -> Option<Session> {
        let raw = match storage.get(SESSION_KEY) {
            Ok(raw) => raw?,
            Err(err) => {
                errors.log_error(&err, CONTEXT_SESSION_STORAGE);
                return None;
            }
        };

        match serde_json::from_str::<Session>(&raw) {
            Ok(session) => {
                debug!(user_id = %session.user.id, "restored listify session");
                Some(session)
            }
            Err(err) => {
                warn!(error = %err, "discarding corrupt listify session");
                errors.log_error(&err, CONTEXT_SESSION_STORAGE);
                if let Err(err) = storage.remove(SESSION_KEY) {
                    errors.log_error(&err, CONTEXT_SESSION_STORAGE);
                }
                None
            }
        }
    }

    /// Persist `session` and make it current
    ///
    /// # Errors
    /// Returns error if the session cannot be written; the in-memory state
    /// is left unchanged in that case.
    pub fn login(&self, session: Session) -> Result<()> {
        let serialized = serde_json::to_string(&session).map_err(CommonError::from)?;
        if let Err(err) = self.storage.set(SESSION_KEY, &serialized) {
            self.errors.log_error(&err, CONTEXT_SESSION_STORAGE);
            return Err(err.into());
        }

        info!(user_id = %session.user.id, "listify session started");
        self.current.send_replace(Some(session));
        Ok(())
    }

    /// Drop the session locally and in durable storage
    ///
    /// Signing out always succeeds locally. A failure to delete the
    /// persisted entry is logged and returned.
    ///
    /// # Errors
    /// Returns error if the persisted entry cannot be removed
    pub fn logout(&self) -> Result<()> {
        self.current.send_replace(None);
        info!("listify session ended");
        self.storage.remove(SESSION_KEY).map_err(|err| {
            self.errors.log_error(&err, CONTEXT_SESSION_STORAGE);
            err.into()
        })
    }

    pub fn session(&self) -> Option<Session> {
        self.current.borrow().clone()
    }

    /// Bearer token for first-party requests
    pub fn token(&self) -> Option<String> {
        self.current.borrow().as_ref().map(|session| session.token.clone())
    }

    pub fn user(&self) -> Option<User> {
        self.current.borrow().as_ref().map(|session| session.user.clone())
    }

    /// Gate for every page behind the login
    pub fn is_authenticated(&self) -> bool {
        self.current.borrow().is_some()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.current.subscribe()
    }
}
