pub mod auth_helper;
pub mod template_helper;
