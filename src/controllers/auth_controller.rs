// orgdesk/src/controllers/auth_controller.rs
use actix_session::Session;
use actix_web::{web, HttpResponse, Responder};
use tracing::{error, info, warn};

use crate::ability::RoleTable;
use crate::client::{ClientError, ProfileSource};
use crate::helpers::template_helper::render_login;
use crate::session::{store, ResolvedSession, SessionContext, SessionError};
use crate::utils::structs::LoginForm;
use std::sync::Arc;

enum SignInFailure {
    Invalid(&'static str),
    Rejected,
    Storage,
    Unavailable,
}

async fn sign_in(
    form: &LoginForm,
    session: &Session,
    backend: &dyn ProfileSource,
    roles: Arc<RoleTable>,
) -> Result<Arc<ResolvedSession>, SignInFailure> {
    if form.email.is_empty() || form.password.is_empty() {
        warn!("Empty email or password for login attempt");
        return Err(SignInFailure::Invalid("Email and password are required"));
    }
    if !form.email.contains('@') {
        warn!("Invalid email format: {}", form.email);
        return Err(SignInFailure::Invalid("Invalid email format"));
    }

    let context = SessionContext::new(roles);
    match context.sign_in(backend, form).await {
        Ok(resolved) => {
            if let Err(err) = store::persist(session, &resolved) {
                error!("Session insertion failed: {}", err);
                return Err(SignInFailure::Storage);
            }
            info!("Login successful for: {} (role {:?})", form.email, resolved.role_name());
            Ok(resolved)
        }
        Err(SessionError::Backend(ClientError::Unauthorized)) => {
            store::clear(session);
            warn!("Backend rejected credentials for: {}", form.email);
            Err(SignInFailure::Rejected)
        }
        Err(err) => {
            error!("Sign-in failed for {}: {}", form.email, err);
            Err(SignInFailure::Unavailable)
        }
    }
}

fn trimmed(form: LoginForm) -> LoginForm {
    LoginForm {
        email: form.email.trim().to_string(),
        password: form.password.trim().to_string(),
    }
}

/// GET /orgdesk/login - Show login page
pub async fn login_form(session: Session) -> impl Responder {
    if store::load(&session).is_some() {
        return HttpResponse::Found()
            .append_header(("Location", "/orgdesk"))
            .finish();
    }
    render_login(None).await
}

/// POST /orgdesk/login - Authenticate against the backend and store the session
pub async fn login_action(
    form: web::Form<LoginForm>,
    session: Session,
    backend: web::Data<dyn ProfileSource>,
    roles: web::Data<RoleTable>,
) -> impl Responder {
    let form = trimmed(form.into_inner());
    info!("Attempting login for: {}", form.email);

    match sign_in(&form, &session, backend.get_ref(), roles.into_inner()).await {
        Ok(_) => HttpResponse::Found()
            .append_header(("Location", "/orgdesk"))
            .finish(),
        Err(SignInFailure::Invalid(message)) => render_login(Some(message)).await,
        Err(SignInFailure::Rejected) => render_login(Some("Invalid email or password")).await,
        Err(SignInFailure::Storage) => render_login(Some("Session creation failed")).await,
        Err(SignInFailure::Unavailable) => {
            render_login(Some("The sign-in service is unavailable. Please try again later.")).await
        }
    }
}

/// GET/POST /orgdesk/logout - Clear session and redirect
pub async fn logout_action(session: Session) -> impl Responder {
    match store::load(&session) {
        Some(resolved) => info!("User logged out: {}", resolved.user().display_name()),
        None => info!("Logout without an active session"),
    }
    store::clear(&session);

    HttpResponse::Found()
        .append_header(("Location", "/orgdesk/login"))
        .finish()
}

fn auth_error_response(message: &str, status: actix_web::http::StatusCode) -> HttpResponse {
    HttpResponse::build(status)
        .content_type("application/json")
        .json(serde_json::json!({
            "error": message,
            "timestamp": chrono::Utc::now().to_rfc3339()
        }))
}

/// POST /orgdesk/api/login - JSON login
pub async fn api_login_action(
    form: web::Json<LoginForm>,
    session: Session,
    backend: web::Data<dyn ProfileSource>,
    roles: web::Data<RoleTable>,
) -> impl Responder {
    use actix_web::http::StatusCode;

    let form = trimmed(form.into_inner());
    info!(email = %form.email, "API login attempt");

    match sign_in(&form, &session, backend.get_ref(), roles.into_inner()).await {
        Ok(resolved) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "redirect": "/orgdesk",
            "user": {
                "id": resolved.user().id,
                "role_name": resolved.role_name(),
            },
            "rules": resolved.ability().rules(),
        })),
        Err(SignInFailure::Invalid(message)) => auth_error_response(message, StatusCode::BAD_REQUEST),
        Err(SignInFailure::Rejected) => auth_error_response("Invalid credentials", StatusCode::UNAUTHORIZED),
        Err(SignInFailure::Storage) => {
            auth_error_response("Session creation failed", StatusCode::INTERNAL_SERVER_ERROR)
        }
        Err(SignInFailure::Unavailable) => {
            auth_error_response("Sign-in service unavailable", StatusCode::BAD_GATEWAY)
        }
    }
}

/// GET /orgdesk/api/auth/status
pub async fn check_auth_status(session: Session) -> impl Responder {
    match store::load(&session) {
        Some(resolved) => HttpResponse::Ok().json(serde_json::json!({
            "authenticated": true,
            "user": {
                "id": resolved.user().id,
                "email": resolved.user().email,
                "role_name": resolved.role_name(),
            }
        })),
        None => HttpResponse::Ok().json(serde_json::json!({
            "authenticated": false
        })),
    }
}
