// orgdesk/src/error.rs

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use derive_more::Display;
use serde::Serialize;

use crate::ability::Grant;
use crate::client::ClientError;
use crate::helpers::template_helper::restricted_page;
use crate::session::SessionError;

pub const LOGIN_PATH: &str = "/orgdesk/login";

#[derive(Debug, Display)]
pub enum OrgdeskError {
    #[display(fmt = "Not Found")]
    NotFound,
    #[display(fmt = "Bad Request: {}", _0)]
    BadRequest(String),
    /// Page request without a session; answered with a sign-in redirect.
    #[display(fmt = "Sign-in required")]
    NotSignedIn,
    /// API request without a session.
    #[display(fmt = "Session not established")]
    SessionUnavailable,
    #[display(fmt = "Access denied: requires {}", _0)]
    Forbidden(Grant),
    #[display(fmt = "Upstream error: {}", _0)]
    Upstream(String),
    #[display(fmt = "Internal Server Error")]
    InternalError,
}

impl std::error::Error for OrgdeskError {}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl From<SessionError> for OrgdeskError {
    fn from(error: SessionError) -> Self {
        match error {
            SessionError::Unresolved => OrgdeskError::SessionUnavailable,
            SessionError::Storage(_) => OrgdeskError::InternalError,
            SessionError::Backend(e) => e.into(),
        }
    }
}

impl From<ClientError> for OrgdeskError {
    fn from(error: ClientError) -> Self {
        match error {
            ClientError::Unauthorized => OrgdeskError::NotSignedIn,
            other => OrgdeskError::Upstream(other.to_string()),
        }
    }
}

impl ResponseError for OrgdeskError {
    fn status_code(&self) -> StatusCode {
        match self {
            OrgdeskError::NotFound => StatusCode::NOT_FOUND,
            OrgdeskError::BadRequest(_) => StatusCode::BAD_REQUEST,
            OrgdeskError::NotSignedIn => StatusCode::FOUND,
            OrgdeskError::SessionUnavailable => StatusCode::UNAUTHORIZED,
            OrgdeskError::Forbidden(_) => StatusCode::FORBIDDEN,
            OrgdeskError::Upstream(_) => StatusCode::BAD_GATEWAY,
            OrgdeskError::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            OrgdeskError::NotSignedIn => HttpResponse::Found()
                .append_header(("Location", LOGIN_PATH))
                .finish(),
            OrgdeskError::Forbidden(required) => HttpResponse::Forbidden()
                .content_type("text/html")
                .body(restricted_page(Some(required))),
            _ => HttpResponse::build(self.status_code()).json(ErrorResponse {
                error: self.to_string(),
            }),
        }
    }
}
