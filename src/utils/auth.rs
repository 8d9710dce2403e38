// orgdesk/src/utils/auth.rs
use actix_session::SessionExt;
use actix_web::{dev::Payload, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};
use std::ops::Deref;
use std::sync::Arc;

use crate::error::OrgdeskError;
use crate::session::{store, ResolvedSession};

/// The signed-in session for this request.
///
/// Taken from request extensions when a guard already resolved it, otherwise
/// rebuilt from the session cookie. Extraction fails with
/// [`OrgdeskError::SessionUnavailable`] (401) when nobody is signed in.
#[derive(Debug, Clone)]
pub struct CurrentSession(pub Arc<ResolvedSession>);

impl Deref for CurrentSession {
    type Target = ResolvedSession;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

pub fn extract_session(req: &HttpRequest) -> Result<Arc<ResolvedSession>, OrgdeskError> {
    if let Some(session) = req.extensions().get::<Arc<ResolvedSession>>() {
        return Ok(Arc::clone(session));
    }
    store::require(&req.get_session())
        .map(Arc::new)
        .map_err(OrgdeskError::from)
}

impl FromRequest for CurrentSession {
    type Error = OrgdeskError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(extract_session(req).map(CurrentSession))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ability::{PermissionChecker, ROLE_TABLE};
    use crate::client::UserProfile;
    use actix_web::test::TestRequest;

    fn profile(role: &str) -> UserProfile {
        UserProfile {
            id: "1".into(),
            role_name: Some(role.into()),
            email: None,
            name: None,
        }
    }

    #[actix_web::test]
    async fn test_extract_without_session_is_unavailable() {
        let req = TestRequest::default().to_http_request();
        let err = extract_session(&req).unwrap_err();
        assert!(matches!(err, OrgdeskError::SessionUnavailable));
    }

    #[actix_web::test]
    async fn test_extract_prefers_request_extensions() {
        let req = TestRequest::default().to_http_request();
        let resolved = ResolvedSession::establish("t".into(), profile("Org Admin"), &ROLE_TABLE);
        req.extensions_mut().insert(Arc::new(resolved));

        let current = CurrentSession::extract(&req).await.unwrap();
        assert!(current.ability().can("delete", "User"));
    }

    #[actix_web::test]
    async fn test_extract_falls_back_to_cookie_session() {
        let req = TestRequest::default().to_http_request();
        let resolved = ResolvedSession::establish("t".into(), profile("Public Viewer"), &ROLE_TABLE);
        store::persist(&req.get_session(), &resolved).unwrap();

        let current = extract_session(&req).unwrap();
        assert_eq!(current.role_name(), Some("Public Viewer"));
    }
}
