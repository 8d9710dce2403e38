pub mod auth;
pub mod structs;
