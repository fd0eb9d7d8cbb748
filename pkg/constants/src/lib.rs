//! Centralized constants for the accessd project.
//!
//! All project-wide constant values live here.
//! Change a value in one place and it applies everywhere.

pub mod api;
pub mod auth;
pub mod paths;
pub mod registry;
pub mod scope;
