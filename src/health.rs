// inside orgdesk/src/health.rs
use actix_web::{HttpResponse, Responder};

use crate::ability::ROLE_TABLE;

pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "name": crate::NAME,
        "version": crate::VERSION,
        "roles": ROLE_TABLE.len(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
