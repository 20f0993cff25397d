//! Access to "who is signed in right now".

use std::sync::{Arc, PoisonError, RwLock};

use crate::auth::AuthSession;

/// Read-only view of the authenticated user, consumed by the sync engine.
pub trait SessionContext {
    /// Id of the signed-in user, or `None` when nobody is signed in
    fn current_user_id(&self) -> Option<String>;
}

impl<T: SessionContext + ?Sized> SessionContext for &T {
    fn current_user_id(&self) -> Option<String> {
        (**self).current_user_id()
    }
}

/// Cloneable handle to the current session.
///
/// The auth subsystem writes it; the sync engine and remote store read it.
#[derive(Clone, Default)]
pub struct SharedSession {
    inner: Arc<RwLock<Option<AuthSession>>>,
}

impl SharedSession {
    /// A handle with nobody signed in
    pub fn signed_out() -> Self {
        Self::default()
    }

    pub fn signed_in(session: AuthSession) -> Self {
        let shared = Self::default();
        shared.set(Some(session));
        shared
    }

    pub fn set(&self, session: Option<AuthSession>) {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        *guard = session;
    }

    pub fn clear(&self) {
        self.set(None);
    }

    /// Bearer token for remote requests
    pub fn access_token(&self) -> Option<String> {
        self.read(|session| session.access_token.clone())
    }

    pub fn is_signed_in(&self) -> bool {
        self.read(|_| ()).is_some()
    }

    fn read<T>(&self, f: impl FnOnce(&AuthSession) -> T) -> Option<T> {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        guard.as_ref().map(f)
    }
}

impl SessionContext for SharedSession {
    fn current_user_id(&self) -> Option<String> {
        self.read(|session| session.user.id.clone())
            .filter(|id| !id.trim().is_empty())
    }
}

impl std::fmt::Debug for SharedSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedSession")
            .field("user_id", &self.current_user_id())
            .finish()
    }
}
