// orgdesk/src/middleware/ability_guard.rs
use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use actix_session::SessionExt;
use futures_util::future::LocalBoxFuture;
use std::{future::{ready, Ready}, rc::Rc, sync::Arc};
use tracing::{info, warn};

use crate::error::OrgdeskError;
use crate::gate::{GateDecision, PageGate, RouteGuards};
use crate::session::store;

/// Page-level gate as middleware.
///
/// Requests without a session are redirected to sign-in; signed-in users
/// failing the requirement for the request path get the restricted-access
/// screen. On success the session is placed in request extensions as
/// `Arc<ResolvedSession>`.
#[derive(Debug, Clone)]
pub struct AbilityGuard {
    pub guards: RouteGuards,
}

impl AbilityGuard {
    /// One requirement for every path behind the guard.
    pub fn new(gate: PageGate) -> Self {
        Self::routes(RouteGuards::new().fallback(gate))
    }

    pub fn requiring(action: &str, subject: &str) -> Self {
        Self::new(PageGate::new(action, subject))
    }

    /// Per-path requirements.
    pub fn routes(guards: RouteGuards) -> Self {
        Self { guards }
    }
}

impl Default for AbilityGuard {
    fn default() -> Self {
        Self::new(PageGate::default())
    }
}

impl<S, B> Transform<S, ServiceRequest> for AbilityGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AbilityGuardMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AbilityGuardMiddleware {
            service: Rc::new(service),
            guards: Rc::new(self.guards.clone()),
        }))
    }
}

pub struct AbilityGuardMiddleware<S> {
    service: Rc<S>,
    guards: Rc<RouteGuards>,
}

impl<S, B> Service<ServiceRequest> for AbilityGuardMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let svc = Rc::clone(&self.service);
        let guards = Rc::clone(&self.guards);

        Box::pin(async move {
            let uri = req.uri().to_string();
            let session = match store::load(&req.get_session()) {
                Some(session) => session,
                None => {
                    warn!("🔐 No session for request: {}", uri);
                    return Ok(req.error_response(OrgdeskError::NotSignedIn).map_into_right_body());
                }
            };

            // decoded the same way the router matched it
            let required = guards
                .gate_for(req.match_info().as_str())
                .filter(|gate| gate.evaluate(session.ability()) == GateDecision::Deny)
                .map(|gate| gate.requirement.clone());

            match required {
                None => {
                    info!("✅ Access granted to {} for {} (role: {:?})",
                          session.user().display_name(), uri, session.role_name());
                    req.extensions_mut().insert(Arc::new(session));
                    svc.call(req).await.map(ServiceResponse::map_into_left_body)
                }
                Some(requirement) => {
                    warn!("🚫 Access denied to {} for {} - role {:?} lacks {}",
                          session.user().display_name(), uri, session.role_name(), requirement);
                    Ok(req.error_response(OrgdeskError::Forbidden(requirement)).map_into_right_body())
                }
            }
        })
    }
}
