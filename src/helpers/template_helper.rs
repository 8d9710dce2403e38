// orgdesk/src/helpers/template_helper.rs
use actix_web::HttpResponse;
use once_cell::sync::Lazy;
use std::sync::Arc;
use tera::{Context, Tera};
use tracing::error;
use chrono::Datelike;

use crate::ability::Grant;

// Centralized template list to keep code clean and DRY
const TEMPLATE_FILES: &[(&str, &str)] = &[
    ("layout.html.tera", include_str!("../templates/layout.html.tera")),
    ("login.html.tera", include_str!("../templates/login.html.tera")),
    ("dashboard.html.tera", include_str!("../templates/dashboard.html.tera")),
    ("restricted.html.tera", include_str!("../templates/restricted.html.tera")),
    ("errors/404.html.tera", include_str!("../templates/errors/404.html.tera")),
    ("errors/500.html.tera", include_str!("../templates/errors/500.html.tera")),
];

const RESTRICTED_FALLBACK: &str = "<h1>Access restricted</h1>\
    <p>Your role does not have access to this area.</p>\
    <form method=\"post\" action=\"/orgdesk/logout\"><button type=\"submit\">Log out</button></form>";

pub static ORGDESK_TEMPLATES: Lazy<Arc<Tera>> = Lazy::new(|| {
    let mut tera = Tera::default();
    tera.autoescape_on(vec![".html.tera"]);

    // added together so `extends` resolves regardless of order
    if let Err(e) = tera.add_raw_templates(TEMPLATE_FILES.iter().copied()) {
        error!("Failed to load OrgDesk templates: {:?}", e);
    }
    Arc::new(tera)
});

pub async fn render_template(template_name: &str, ctx: Context) -> HttpResponse {
    let tera = Arc::clone(&ORGDESK_TEMPLATES);
    match tera.render(template_name, &ctx) {
        Ok(html) => HttpResponse::Ok().content_type("text/html").body(html),
        Err(err) => {
            error!("Template render error for {}: {:?}", template_name, err);
            render_500(Some("The page could not be rendered.")).await
        }
    }
}

/// HTML for the restricted-access screen. Only a logout action is offered.
pub fn restricted_page(required: Option<&Grant>) -> String {
    let mut ctx = create_base_context();
    if let Some(grant) = required {
        ctx.insert("required", &grant.to_string());
    }
    ORGDESK_TEMPLATES
        .render("restricted.html.tera", &ctx)
        .unwrap_or_else(|err| {
            error!("Template render error for restricted.html.tera: {:?}", err);
            RESTRICTED_FALLBACK.to_string()
        })
}

pub async fn render_restricted(required: Option<&Grant>) -> HttpResponse {
    HttpResponse::Forbidden()
        .content_type("text/html")
        .body(restricted_page(required))
}

pub async fn render_login(error_message: Option<&str>) -> HttpResponse {
    let mut ctx = create_base_context();
    ctx.insert("is_authenticated", &false);
    ctx.insert("page_title", "Sign in");
    if let Some(message) = error_message {
        ctx.insert("error", message);
    }
    render_template("login.html.tera", ctx).await
}

// Error page renderers
pub async fn render_404() -> HttpResponse {
    let html = ORGDESK_TEMPLATES
        .render("errors/404.html.tera", &Context::new())
        .unwrap_or_else(|_| "<h1>404 - Page Not Found</h1>".to_string());
    HttpResponse::NotFound()
        .content_type("text/html")
        .body(html)
}

pub async fn render_500(error_message: Option<&str>) -> HttpResponse {
    let mut ctx = Context::new();
    ctx.insert("error_message", &error_message.unwrap_or("An internal server error occurred."));

    let html = ORGDESK_TEMPLATES
        .render("errors/500.html.tera", &ctx)
        .unwrap_or_else(|_| "<h1>500 - Internal Server Error</h1>".to_string());
    HttpResponse::InternalServerError()
        .content_type("text/html")
        .body(html)
}

// Template context helpers
pub fn create_base_context() -> Context {
    let mut ctx = Context::new();
    ctx.insert("app_name", "OrgDesk");
    ctx.insert("app_version", env!("CARGO_PKG_VERSION"));
    ctx.insert("current_year", &chrono::Utc::now().year());
    ctx
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::MessageBody;
    use actix_web::http::StatusCode;

    #[test]
    fn test_all_templates_loaded() {
        let names: Vec<&str> = ORGDESK_TEMPLATES.get_template_names().collect();
        for (name, _) in TEMPLATE_FILES {
            assert!(names.contains(name), "missing template {}", name);
        }
    }

    #[test]
    fn test_restricted_page_offers_only_logout() {
        let html = restricted_page(Some(&Grant::fixed("view", "Media")));
        assert!(html.contains("Access restricted"));
        assert!(html.contains("view:Media"));
        assert!(html.contains("/orgdesk/logout"));
        assert!(!html.contains("<nav"));
    }

    #[actix_web::test]
    async fn test_login_page_shows_error() {
        let response = render_login(Some("Invalid email or password")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().try_into_bytes().unwrap();
        let html = String::from_utf8_lossy(&body);
        assert!(html.contains("Invalid email or password"));
        assert!(!html.contains("Log out"));
    }
}
