// orgdesk/src/client/mod.rs
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::configs::initializer::OrgdeskConfig;
use crate::utils::structs::LoginForm;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("authentication rejected by backend")]
    Unauthorized,
    #[error("backend returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl ClientError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::Unauthorized)
    }
}

/// The user record returned by the profile endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: String,
    #[serde(default)]
    pub role_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl UserProfile {
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or(&self.id)
    }
}

fn id_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(text) => text,
        RawId::Number(number) => number.to_string(),
    })
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(alias = "access_token", alias = "accessToken")]
    token: String,
}

/// Source of bearer tokens and user profiles.
#[async_trait]
pub trait ProfileSource: Send + Sync {
    /// Exchange credentials for a bearer token.
    async fn authenticate(&self, credentials: &LoginForm) -> Result<String, ClientError>;

    async fn fetch_profile(&self, token: &str) -> Result<UserProfile, ClientError>;
}

/// Client for the external authentication service.
///
/// Every authenticated call carries `Authorization: Bearer <token>`. A 401 is
/// surfaced as [`ClientError::Unauthorized`] so callers can drop the session.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    login_path: String,
    profile_path: String,
}

impl ApiClient {
    pub fn new(config: &OrgdeskConfig) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(config.http_timeout)
            .build()?;
        Ok(Self::with_client(http, config))
    }

    pub fn with_client(http: Client, config: &OrgdeskConfig) -> Self {
        Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            login_path: config.login_path.clone(),
            profile_path: config.profile_path.clone(),
        }
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorized(&self, builder: RequestBuilder, token: &str) -> RequestBuilder {
        builder.bearer_auth(token)
    }

    /// GET `path` with the bearer token and decode the JSON body.
    pub async fn get_json<T: DeserializeOwned>(&self, token: &str, path: &str) -> Result<T, ClientError> {
        let url = self.endpoint(path);
        debug!("GET {}", url);
        let response = self.authorized(self.http.get(&url), token).send().await?;
        let response = check_status(response).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))
    }
}

async fn check_status(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED {
        warn!("Backend rejected credentials for {}", response.url());
        return Err(ClientError::Unauthorized);
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ClientError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response)
}

#[async_trait]
impl ProfileSource for ApiClient {
    async fn authenticate(&self, credentials: &LoginForm) -> Result<String, ClientError> {
        let url = self.endpoint(&self.login_path);
        debug!("POST {} for {}", url, credentials.email);
        let response = self.http.post(&url).json(credentials).send().await?;
        let response = check_status(response).await?;
        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))?;
        Ok(body.token)
    }

    async fn fetch_profile(&self, token: &str) -> Result<UserProfile, ClientError> {
        self.get_json(token, &self.profile_path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ability::{PermissionChecker, ROLE_TABLE};
    use crate::session::{SessionContext, SessionError};
    use actix_web::dev::ServerHandle;
    use actix_web::http::header;
    use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
    use std::sync::Arc;

    fn config() -> OrgdeskConfig {
        OrgdeskConfig {
            api_base_url: "https://api.example.org/v1/".to_string(),
            ..OrgdeskConfig::for_tests()
        }
    }

    #[test]
    fn test_endpoint_joins_without_double_slash() {
        let client = ApiClient::new(&config()).unwrap();
        assert_eq!(client.endpoint("/auth/me"), "https://api.example.org/v1/auth/me");
        assert_eq!(client.endpoint("users"), "https://api.example.org/v1/users");
    }

    #[test]
    fn test_profile_accepts_numeric_and_string_ids() {
        let numeric: UserProfile =
            serde_json::from_str(r#"{"id": 42, "role_name": "Org Admin"}"#).unwrap();
        assert_eq!(numeric.id, "42");
        assert_eq!(numeric.role_name.as_deref(), Some("Org Admin"));

        let text: UserProfile =
            serde_json::from_str(r#"{"id": "u-7", "role_name": null, "email": "a@b.org"}"#).unwrap();
        assert_eq!(text.id, "u-7");
        assert_eq!(text.role_name, None);
        assert_eq!(text.display_name(), "a@b.org");
    }

    #[test]
    fn test_token_response_aliases() {
        let body: TokenResponse = serde_json::from_str(r#"{"access_token": "abc"}"#).unwrap();
        assert_eq!(body.token, "abc");
        let body: TokenResponse = serde_json::from_str(r#"{"token": "xyz"}"#).unwrap();
        assert_eq!(body.token, "xyz");
    }

    async fn fake_login(form: web::Json<LoginForm>) -> HttpResponse {
        if form.password == "secret" {
            HttpResponse::Ok().json(serde_json::json!({ "access_token": "tok-123" }))
        } else {
            HttpResponse::Unauthorized().finish()
        }
    }

    async fn fake_profile(req: HttpRequest) -> HttpResponse {
        match req.headers().get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
            Some("Bearer tok-123") => HttpResponse::Ok().json(serde_json::json!({
                "id": 7,
                "role_name": "Event Manager",
                "email": "eve@org.test",
            })),
            _ => HttpResponse::Unauthorized().finish(),
        }
    }

    /// Starts a throwaway authentication service on a random local port.
    fn fake_backend() -> (OrgdeskConfig, ServerHandle) {
        let server = HttpServer::new(|| {
            App::new()
                .route("/auth/login", web::post().to(fake_login))
                .route("/auth/me", web::get().to(fake_profile))
                .route(
                    "/broken",
                    web::get().to(|| async { HttpResponse::InternalServerError().body("boom") }),
                )
        })
        .workers(1)
        .bind(("127.0.0.1", 0))
        .unwrap();
        let addr = server.addrs()[0];
        let server = server.run();
        let handle = server.handle();
        actix_web::rt::spawn(server);

        let config = OrgdeskConfig {
            api_base_url: format!("http://{}", addr),
            ..OrgdeskConfig::for_tests()
        };
        (config, handle)
    }

    fn credentials(password: &str) -> LoginForm {
        LoginForm {
            email: "eve@org.test".to_string(),
            password: password.to_string(),
        }
    }

    #[actix_web::test]
    async fn test_token_is_sent_as_bearer_to_profile_endpoint() {
        let (config, handle) = fake_backend();
        let client = ApiClient::new(&config).unwrap();

        let token = client.authenticate(&credentials("secret")).await.unwrap();
        assert_eq!(token, "tok-123");

        let profile = client.fetch_profile(&token).await.unwrap();
        assert_eq!(profile.id, "7");
        assert_eq!(profile.role_name.as_deref(), Some("Event Manager"));

        handle.stop(true).await;
    }

    #[actix_web::test]
    async fn test_backend_401_maps_to_unauthorized() {
        let (config, handle) = fake_backend();
        let client = ApiClient::new(&config).unwrap();

        let err = client.authenticate(&credentials("wrong")).await.unwrap_err();
        assert!(err.is_unauthorized(), "{}", err);

        let err = client.fetch_profile("stale-token").await.unwrap_err();
        assert!(err.is_unauthorized(), "{}", err);

        handle.stop(true).await;
    }

    #[actix_web::test]
    async fn test_backend_500_maps_to_status() {
        let (config, handle) = fake_backend();
        let client = ApiClient::new(&OrgdeskConfig {
            profile_path: "/broken".to_string(),
            ..config
        })
        .unwrap();

        match client.fetch_profile("tok-123").await {
            Err(ClientError::Status { status, body }) => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("expected status error, got {:?}", other),
        }

        handle.stop(true).await;
    }

    #[actix_web::test]
    async fn test_rejected_sign_in_through_client_leaves_context_unresolved() {
        let (config, handle) = fake_backend();
        let client = ApiClient::new(&config).unwrap();
        let context = SessionContext::new(Arc::new(ROLE_TABLE.clone()));

        let resolved = context.sign_in(&client, &credentials("secret")).await.unwrap();
        assert_eq!(resolved.token(), "tok-123");
        assert!(context.ability().unwrap().can("edit", "Event"));

        let err = context.sign_in(&client, &credentials("wrong")).await.unwrap_err();
        assert!(matches!(err, SessionError::Backend(ClientError::Unauthorized)));
        assert!(!context.is_resolved());
        assert!(matches!(context.ability(), Err(SessionError::Unresolved)));

        handle.stop(true).await;
    }

    #[test]
    fn test_unauthorized_flag() {
        assert!(ClientError::Unauthorized.is_unauthorized());
        assert!(!ClientError::Decode("x".into()).is_unauthorized());
    }
}
