// orgdesk/src/router.rs
use actix_web::{web, Scope};
use tracing::info;

use crate::controllers::auth_controller::{
    api_login_action, check_auth_status, login_action, login_form, logout_action,
};
use crate::controllers::dashboard_controller::{
    ability_check, ability_summary, dashboard_view, menu_view, restricted_view, row_actions_view,
};
use crate::health::health_check;
use crate::middleware::ability_guard::AbilityGuard;

/// All OrgDesk routes under `/orgdesk`, with the dashboard shell behind the
/// default page gate.
pub fn register_all_orgdesk_routes() -> Scope {
    register_orgdesk_routes_with_guard(AbilityGuard::default())
}

/// Same routes, with a caller-supplied guard for the dashboard pages.
pub fn register_orgdesk_routes_with_guard(guard: AbilityGuard) -> Scope {
    info!("🔧 Starting OrgDesk route registration...");

    let scope = web::scope("/orgdesk")
        // ===========================
        // AUTHENTICATION ROUTES
        // ===========================
        .route("/login", web::get().to(login_form))
        .route("/login", web::post().to(login_action))
        .route("/logout", web::get().to(logout_action))
        .route("/logout", web::post().to(logout_action))
        .route("/restricted", web::get().to(restricted_view))
        .route("/health", web::get().to(health_check))

        // ===========================
        // API ROUTES
        // ===========================
        .service(
            web::scope("/api")
                .route("/login", web::post().to(api_login_action))
                .route("/auth/status", web::get().to(check_auth_status))
                .route("/ability", web::get().to(ability_summary))
                .route("/ability/check", web::get().to(ability_check))
                .route("/menu", web::get().to(menu_view))
                .route("/actions/{subject}", web::get().to(row_actions_view))
        )

        // ===========================
        // DASHBOARD ROUTES (gated)
        // ===========================
        .service(
            web::resource(vec!["", "/", "/dashboard"])
                .wrap(guard)
                .route(web::get().to(dashboard_view))
        );

    info!("🎉 OrgDesk route registration completed!");
    scope
}
