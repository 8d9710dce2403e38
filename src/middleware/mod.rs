// orgdesk/src/middleware/mod.rs
pub mod ability_guard;
