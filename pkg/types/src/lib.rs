pub mod authorization;
pub mod config;
pub mod namespace;
pub mod rbac;
pub mod user;
pub mod validate;
