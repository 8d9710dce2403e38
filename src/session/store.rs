// orgdesk/src/session/store.rs
use actix_session::Session;
use tracing::{debug, warn};

use super::{PersistedSession, ResolvedSession, SessionError};

/// Session cookie key holding the whole [`PersistedSession`].
pub const SESSION_KEY: &str = "orgdesk_session";

/// Write the session under one key, replacing whatever was there.
pub fn persist(session: &Session, resolved: &ResolvedSession) -> Result<(), SessionError> {
    session
        .insert(SESSION_KEY, resolved.persisted())
        .map_err(|e| SessionError::Storage(e.to_string()))?;
    session.renew();
    debug!("Persisted session for user {}", resolved.user().id);
    Ok(())
}

/// Rebuild the signed-in session from the cookie, if there is one.
///
/// An undecodable entry is dropped and treated as signed out.
pub fn load(session: &Session) -> Option<ResolvedSession> {
    match session.get::<PersistedSession>(SESSION_KEY) {
        Ok(Some(persisted)) => Some(ResolvedSession::from_persisted(persisted)),
        Ok(None) => None,
        Err(e) => {
            warn!("Discarding unreadable session entry: {}", e);
            session.remove(SESSION_KEY);
            None
        }
    }
}

/// Like [`load`] but fails fast when nobody is signed in.
pub fn require(session: &Session) -> Result<ResolvedSession, SessionError> {
    load(session).ok_or(SessionError::Unresolved)
}

pub fn clear(session: &Session) {
    session.purge();
}
