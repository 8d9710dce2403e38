// orgdesk/src/lib.rs

pub mod ability;
pub mod client;
pub mod session;
pub mod menu;
pub mod navigation;
pub mod gate;
pub mod error;
pub mod router;
pub mod health;
pub mod middleware;
pub mod utils;
pub mod helpers;
pub mod controllers;
pub mod configs;

// Re-export the ability core
pub use ability::{
    ability_for_role, resolve_ability, Ability, Grant, PermissionChecker, RoleTable, ALL, MANAGE,
    ROLE_TABLE,
};

// Export configuration and app wiring functions
pub use configs::initializer::{
    configure_orgdesk_services,
    get_orgdesk_backend,
    get_orgdesk_config,
    get_orgdesk_session_middleware,
    setup_orgdesk_logging,
    OrgdeskConfig,
};

pub use client::{ApiClient, ClientError, ProfileSource, UserProfile};
pub use session::{PersistedSession, ResolvedSession, SessionContext, SessionError};
pub use error::OrgdeskError;

pub use menu::{filter_menu, MenuItem, MenuRequirements};
pub use navigation::{visible_menu, NAV_REQUIREMENTS, NAV_SECTIONS};
pub use gate::{GateDecision, PageGate, RouteGuards, RowAction, RowActions};

pub use utils::{
    auth::{extract_session, CurrentSession},
    structs::LoginForm,
};

// Export controllers for custom route registration
pub use controllers::{
    auth_controller::{login_form, login_action, logout_action},
    dashboard_controller::{dashboard_view, restricted_view},
};

// Export router for custom integration
pub use router::{register_all_orgdesk_routes, register_orgdesk_routes_with_guard};

pub use helpers::template_helper::{render_template, render_404, render_500, render_restricted};

// Export middleware
pub use middleware::ability_guard::AbilityGuard;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");

pub mod prelude {
    pub use crate::{
        Ability,
        AbilityGuard,
        CurrentSession,
        Grant,
        LoginForm,
        OrgdeskConfig,
        PageGate,
        PermissionChecker,
        ProfileSource,
        RoleTable,
        SessionContext,
        visible_menu,
        ROLE_TABLE,
    };
}
