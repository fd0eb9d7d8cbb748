pub mod authorization;
pub mod health;
pub mod namespaces;
