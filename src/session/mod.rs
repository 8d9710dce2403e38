// orgdesk/src/session/mod.rs
pub mod store;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;
use tracing::{info, warn};

use crate::ability::{resolve_ability, Ability, Grant, RoleTable};
use crate::client::{ClientError, ProfileSource, UserProfile};
use crate::utils::structs::LoginForm;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("ability is not available yet: no session has been established")]
    Unresolved,
    #[error("session storage failed: {0}")]
    Storage(String),
    #[error(transparent)]
    Backend(#[from] ClientError),
}

/// What gets written to session storage so a reload can rebuild the ability
/// without another profile fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedSession {
    pub token: String,
    pub user: UserProfile,
    pub role_name: Option<String>,
    pub grants: Vec<Grant>,
    pub established_at: DateTime<Utc>,
}

/// A signed-in session with its resolved ability.
#[derive(Debug, Clone)]
pub struct ResolvedSession {
    persisted: PersistedSession,
    ability: Ability,
}

impl ResolvedSession {
    /// Resolve the role's grants from `roles` for a freshly fetched profile.
    pub fn establish(token: String, user: UserProfile, roles: &RoleTable) -> Self {
        let role_name = user.role_name.clone();
        let grants = role_name
            .as_deref()
            .and_then(|name| roles.grants_for(name))
            .map(<[Grant]>::to_vec)
            .unwrap_or_default();
        if grants.is_empty() {
            warn!(
                "Role {:?} for user {} has no grants; all gated UI will be hidden",
                role_name, user.id
            );
        }

        Self::from_persisted(PersistedSession {
            token,
            user,
            role_name,
            grants,
            established_at: Utc::now(),
        })
    }

    /// Rebuild from storage. The stored grants are used as-is.
    pub fn from_persisted(persisted: PersistedSession) -> Self {
        let ability = resolve_ability(persisted.role_name.as_deref(), Some(persisted.grants.as_slice()));
        Self { persisted, ability }
    }

    pub fn ability(&self) -> &Ability {
        &self.ability
    }

    pub fn token(&self) -> &str {
        &self.persisted.token
    }

    pub fn user(&self) -> &UserProfile {
        &self.persisted.user
    }

    pub fn role_name(&self) -> Option<&str> {
        self.persisted.role_name.as_deref()
    }

    pub fn grants(&self) -> &[Grant] {
        &self.persisted.grants
    }

    pub fn established_at(&self) -> DateTime<Utc> {
        self.persisted.established_at
    }

    pub fn persisted(&self) -> &PersistedSession {
        &self.persisted
    }
}

#[derive(Debug, Clone, Default)]
enum SessionState {
    #[default]
    Unresolved,
    Resolved(Arc<ResolvedSession>),
}

/// Owner of the current session. Everything else reads through
/// [`SessionContext::current`] / [`SessionContext::ability`].
///
/// Either unresolved (nobody signed in) or resolved (token, profile, role
/// name, grants and the derived [`Ability`]). The state is replaced as a
/// whole; readers get an `Arc` snapshot.
#[derive(Debug)]
pub struct SessionContext {
    roles: Arc<RoleTable>,
    state: RwLock<SessionState>,
}

impl SessionContext {
    pub fn new(roles: Arc<RoleTable>) -> Self {
        Self {
            roles,
            state: RwLock::new(SessionState::Unresolved),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn replace(&self, next: SessionState) {
        *self.write() = next;
    }

    pub fn is_resolved(&self) -> bool {
        matches!(*self.read(), SessionState::Resolved(_))
    }

    /// Store a session built from a fetched profile, replacing any previous
    /// one.
    pub fn establish(&self, token: String, user: UserProfile) -> Arc<ResolvedSession> {
        let resolved = Arc::new(ResolvedSession::establish(token, user, &self.roles));
        info!(
            "Session established for {} (role {:?})",
            resolved.user().display_name(),
            resolved.role_name()
        );
        self.replace(SessionState::Resolved(Arc::clone(&resolved)));
        resolved
    }

    /// Rebuild from a persisted snapshot after a reload.
    pub fn restore(&self, persisted: PersistedSession) -> Arc<ResolvedSession> {
        let resolved = Arc::new(ResolvedSession::from_persisted(persisted));
        self.replace(SessionState::Resolved(Arc::clone(&resolved)));
        resolved
    }

    /// Authenticate, fetch the profile, then establish.
    ///
    /// A 401 at either step leaves the context unresolved.
    pub async fn sign_in(
        &self,
        source: &dyn ProfileSource,
        credentials: &LoginForm,
    ) -> Result<Arc<ResolvedSession>, SessionError> {
        let token = match source.authenticate(credentials).await {
            Ok(token) => token,
            Err(e) => return Err(self.fail(e)),
        };
        let profile = match source.fetch_profile(&token).await {
            Ok(profile) => profile,
            Err(e) => return Err(self.fail(e)),
        };
        Ok(self.establish(token, profile))
    }

    fn fail(&self, error: ClientError) -> SessionError {
        if error.is_unauthorized() {
            self.reject();
        }
        SessionError::Backend(error)
    }

    pub fn current(&self) -> Result<Arc<ResolvedSession>, SessionError> {
        match &*self.read() {
            SessionState::Resolved(session) => Ok(Arc::clone(session)),
            SessionState::Unresolved => Err(SessionError::Unresolved),
        }
    }

    /// The signed-in user's ability. Errors rather than guessing when nobody
    /// is signed in.
    pub fn ability(&self) -> Result<Ability, SessionError> {
        self.current().map(|session| session.ability().clone())
    }

    pub fn snapshot(&self) -> Result<PersistedSession, SessionError> {
        self.current().map(|session| session.persisted().clone())
    }

    pub fn logout(&self) {
        if let SessionState::Resolved(session) = &*self.read() {
            info!("Session closed for {}", session.user().display_name());
        }
        self.replace(SessionState::Unresolved);
    }

    /// Backend signalled the token is no longer valid.
    pub fn reject(&self) {
        warn!("Backend rejected the session token; clearing session");
        self.replace(SessionState::Unresolved);
    }
}
