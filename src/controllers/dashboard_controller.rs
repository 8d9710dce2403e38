// orgdesk/src/controllers/dashboard_controller.rs

use actix_session::Session;
use actix_web::{web, HttpResponse, Responder};
use tracing::info;

use crate::ability::PermissionChecker;
use crate::error::OrgdeskError;
use crate::gate::RowActions;
use crate::helpers::auth_helper::create_base_template_context_with_auth;
use crate::helpers::template_helper::{render_restricted, render_template};
use crate::navigation::visible_menu;
use crate::session::store;
use crate::utils::auth::CurrentSession;
use crate::utils::structs::{
    AbilityCheckQuery, AbilityCheckResponse, AbilitySummary, MenuResponse, RowActionsResponse,
};

/// GET /orgdesk - Dashboard shell. Mounted behind the page gate.
pub async fn dashboard_view(current: CurrentSession) -> impl Responder {
    info!("Dashboard accessed by: {}", current.user().display_name());
    let ctx = create_base_template_context_with_auth("Dashboard", &current);
    render_template("dashboard.html.tera", ctx).await
}

/// GET /orgdesk/restricted - Restricted-access screen with logout only
pub async fn restricted_view(session: Session) -> Result<HttpResponse, OrgdeskError> {
    if store::load(&session).is_none() {
        return Err(OrgdeskError::NotSignedIn);
    }
    Ok(render_restricted(None).await)
}

/// GET /orgdesk/api/ability
pub async fn ability_summary(current: CurrentSession) -> impl Responder {
    web::Json(AbilitySummary {
        user_id: current.user().id.clone(),
        role_name: current.role_name().map(str::to_string),
        rules: current.ability().rules(),
        established_at: current.established_at().timestamp(),
    })
}

/// GET /orgdesk/api/ability/check?action=..&subject=..
pub async fn ability_check(
    current: CurrentSession,
    query: web::Query<AbilityCheckQuery>,
) -> impl Responder {
    let AbilityCheckQuery { action, subject } = query.into_inner();
    let can = current.ability().can(&action, &subject);
    web::Json(AbilityCheckResponse { action, subject, can })
}

/// GET /orgdesk/api/menu
pub async fn menu_view(current: CurrentSession) -> impl Responder {
    web::Json(MenuResponse {
        role_name: current.role_name().map(str::to_string),
        menus: visible_menu(current.ability()),
    })
}

/// GET /orgdesk/api/actions/{subject}
pub async fn row_actions_view(current: CurrentSession, subject: web::Path<String>) -> impl Responder {
    let subject = subject.into_inner();
    let actions = RowActions::for_subject(current.ability(), &subject);
    web::Json(RowActionsResponse { subject, actions })
}

pub async fn not_found() -> HttpResponse {
    crate::helpers::template_helper::render_404().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ability::ROLE_TABLE;
    use crate::client::{ProfileSource, UserProfile};
    use crate::configs::initializer::{configure_orgdesk_services, OrgdeskConfig};
    use crate::session::{testing::StubBackend, ResolvedSession};
    use actix_web::{http::{header, StatusCode}, test, App};
    use std::sync::Arc;

    fn current(role: &str) -> CurrentSession {
        CurrentSession(Arc::new(ResolvedSession::establish(
            "tok".into(),
            UserProfile {
                id: "5".into(),
                role_name: Some(role.into()),
                email: None,
                name: Some("Kim".into()),
            },
            &ROLE_TABLE,
        )))
    }

    fn backend() -> web::Data<dyn ProfileSource> {
        let stub: Arc<dyn ProfileSource> = Arc::new(StubBackend::with_users(&[]));
        web::Data::from(stub)
    }

    #[actix_web::test]
    async fn test_api_routes_require_session() {
        let app = test::init_service(
            App::new().configure(configure_orgdesk_services(OrgdeskConfig::for_tests(), backend())),
        )
        .await;

        for uri in ["/orgdesk/api/ability", "/orgdesk/api/menu", "/orgdesk/api/actions/Event"] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{}", uri);
        }
    }

    #[actix_web::test]
    async fn test_restricted_without_session_redirects_to_login() {
        let app = test::init_service(
            App::new().configure(configure_orgdesk_services(OrgdeskConfig::for_tests(), backend())),
        )
        .await;
        let req = test::TestRequest::get().uri("/orgdesk/restricted").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/orgdesk/login");
    }

    async fn respond<R: Responder>(responder: R) -> (StatusCode, String) {
        let req = test::TestRequest::default().to_http_request();
        let resp = responder.respond_to(&req);
        let status = resp.status();
        let bytes = actix_web::body::to_bytes(resp.into_body())
            .await
            .map_err(Into::<Box<dyn std::error::Error>>::into)
            .unwrap();
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    #[actix_web::test]
    async fn test_ability_check_reports_decision() {
        let query = web::Query(AbilityCheckQuery {
            action: "delete".into(),
            subject: "Category".into(),
        });
        let (status, body) = respond(ability_check(current("Event Manager"), query).await).await;
        assert_eq!(status, StatusCode::OK);
        let decision: AbilityCheckResponse = serde_json::from_str(&body).unwrap();
        assert!(decision.can);

        let query = web::Query(AbilityCheckQuery {
            action: "view".into(),
            subject: "Media".into(),
        });
        let (_, body) = respond(ability_check(current("Field Volunteer"), query).await).await;
        let decision: AbilityCheckResponse = serde_json::from_str(&body).unwrap();
        assert!(!decision.can);
    }

    #[actix_web::test]
    async fn test_row_actions_follow_ability() {
        let path = web::Path::from("Media".to_string());
        let (_, body) = respond(row_actions_view(current("Event Manager"), path).await).await;
        let body: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(body["subject"], "Media");
        assert_eq!(body["view"], true);
        assert_eq!(body["add"], true);
        assert_eq!(body["edit"], false);
        assert_eq!(body["delete"], false);
    }

    #[actix_web::test]
    async fn test_dashboard_lists_only_visible_sections() {
        let (status, html) = respond(dashboard_view(current("Event Manager")).await).await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains(">Events</a>"));
        assert!(html.contains(">Media</a>"));
        assert!(!html.contains(">Users</a>"));
        assert!(html.contains("Kim"));
    }
}
