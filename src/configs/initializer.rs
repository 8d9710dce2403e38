// src/configs/initializer.rs
use log::{info, debug, warn};
use anyhow::{anyhow, bail, Context, Result};
use actix_web::web;
use actix_session::{SessionMiddleware, storage::CookieSessionStore, config::PersistentSession};
use actix_web::cookie::{Key, SameSite};
use env_logger::Env;
use once_cell::sync::OnceCell;
use std::{env, time::Duration};
use std::sync::Arc;
use crate::ability::{RoleTable, ROLE_TABLE};
use crate::client::{ApiClient, ProfileSource};
use crate::router::register_all_orgdesk_routes;

#[derive(Debug, Clone)]
pub struct OrgdeskConfig {
    pub api_base_url: String,
    pub profile_path: String,
    pub login_path: String,
    pub session_secret: String,
    pub environment: String,
    pub log_level: String,
    pub session_timeout: Duration,
    pub http_timeout: Duration,
}

fn seconds_from_env(name: &str, default: u64) -> Result<Duration> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Duration::from_secs)
            .with_context(|| format!("{} must be a number of seconds, got '{}'", name, raw)),
        Err(_) => Ok(Duration::from_secs(default)),
    }
}

impl OrgdeskConfig {
    pub fn from_env() -> Result<Self> {
        let config = Self {
            api_base_url: env::var("ORGDESK_API_URL")
                .map_err(|_| anyhow!("ORGDESK_API_URL is required"))?,
            profile_path: env::var("ORGDESK_PROFILE_PATH")
                .unwrap_or_else(|_| "/auth/me".to_string()),
            login_path: env::var("ORGDESK_LOGIN_PATH")
                .unwrap_or_else(|_| "/auth/login".to_string()),
            session_secret: env::var("SESSION_SECRET").unwrap_or_default(),
            environment: env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),
            log_level: env::var("RUST_LOG")
                .unwrap_or_else(|_| "info".to_string()),
            session_timeout: seconds_from_env("SESSION_TIMEOUT", 86400)?,
            http_timeout: seconds_from_env("ORGDESK_HTTP_TIMEOUT", 15)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://") {
            bail!("ORGDESK_API_URL must be an http(s) URL, got '{}'", self.api_base_url);
        }
        if self.session_secret.is_empty() {
            if self.is_production() {
                bail!("SESSION_SECRET is required in production");
            }
            warn!("⚠️  SESSION_SECRET not set, a generated key will be used - NOT suitable for production!");
        } else if self.session_secret.len() < 64 {
            bail!("SESSION_SECRET must be at least 64 characters long");
        }
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    #[cfg(test)]
    pub(crate) fn for_tests() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:9".to_string(),
            profile_path: "/auth/me".to_string(),
            login_path: "/auth/login".to_string(),
            session_secret: "test_session_secret_that_is_definitely_long_enough_for_secure_testing".to_string(),
            environment: "test".to_string(),
            log_level: "debug".to_string(),
            session_timeout: Duration::from_secs(3600),
            http_timeout: Duration::from_secs(2),
        }
    }
}

static GENERATED_KEY: OnceCell<Key> = OnceCell::new();

fn load_session_key(config: &OrgdeskConfig) -> Key {
    if config.session_secret.is_empty() {
        // One key per process so every worker accepts the same cookies
        GENERATED_KEY
            .get_or_init(|| {
                warn!("⚠️  Using generated session key - sessions will not survive a restart");
                Key::generate()
            })
            .clone()
    } else {
        Key::from(config.session_secret.as_bytes())
    }
}

fn create_session_middleware(config: &OrgdeskConfig) -> SessionMiddleware<CookieSessionStore> {
    let secret_key = load_session_key(config);

    // Convert std::time::Duration to actix_web::cookie::time::Duration
    let session_ttl = actix_web::cookie::time::Duration::seconds(config.session_timeout.as_secs() as i64);

    SessionMiddleware::builder(
        CookieSessionStore::default(),
        secret_key
    )
    .cookie_name("orgdesk_session".to_string())
    .cookie_secure(config.is_production())
    .cookie_http_only(true)
    .cookie_same_site(if config.is_production() {
        SameSite::Strict
    } else {
        SameSite::Lax
    })
    .session_lifecycle(
        PersistentSession::default()
            .session_ttl(session_ttl)
    )
    .build()
}

pub fn get_orgdesk_config() -> Result<OrgdeskConfig> {
    OrgdeskConfig::from_env().context("OrgDesk configuration error")
}

static LOGGING_INITIALIZED: OnceCell<()> = OnceCell::new();

pub fn setup_orgdesk_logging(config: &OrgdeskConfig) {
    LOGGING_INITIALIZED.get_or_init(|| {
        let _ = env_logger::Builder::from_env(Env::default().default_filter_or(&config.log_level))
            .format_timestamp_millis()
            .try_init();

        info!("✅ OrgDesk logging initialized");
        info!("🔧 OrgDesk environment: {}", config.environment);
        debug!("🔍 OrgDesk debug logging active");
    });
}

pub fn get_orgdesk_session_middleware(config: &OrgdeskConfig) -> SessionMiddleware<CookieSessionStore> {
    create_session_middleware(config)
}

/// REST backend for sign-in, shared by all workers.
pub fn get_orgdesk_backend(config: &OrgdeskConfig) -> Result<web::Data<dyn ProfileSource>> {
    let client = ApiClient::new(config).context("Failed to build HTTP client")?;
    let backend: Arc<dyn ProfileSource> = Arc::new(client);
    Ok(web::Data::from(backend))
}

/// Register config, role table, backend and all routes on an app.
///
/// The caller still needs to wrap the app with
/// [`get_orgdesk_session_middleware`].
pub fn configure_orgdesk_services(
    config: OrgdeskConfig,
    backend: web::Data<dyn ProfileSource>,
) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg: &mut web::ServiceConfig| {
        cfg.app_data(web::Data::new(config));
        cfg.app_data(web::Data::new(RoleTable::clone(&ROLE_TABLE)));
        cfg.app_data(backend);
        cfg.service(register_all_orgdesk_routes());
    }
}
