use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// An authenticated identity as carried by the request context.
///
/// Service accounts use the canonical name
/// `system:serviceaccount:<namespace>:<name>`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    pub name: String,
    #[serde(default)]
    pub groups: Vec<String>,
    /// Opaque extra attributes (e.g. impersonation scopes).
    #[serde(default)]
    pub extra: HashMap<String, Vec<String>>,
}

impl UserInfo {
    pub fn new(name: impl Into<String>, groups: &[&str]) -> Self {
        Self {
            name: name.into(),
            groups: groups.iter().map(|g| g.to_string()).collect(),
            extra: HashMap::new(),
        }
    }

    /// Canonical user name for a service account.
    pub fn service_account_name(namespace: &str, name: &str) -> String {
        format!(
            "{}{}:{}",
            pkg_constants::auth::SERVICE_ACCOUNT_PREFIX,
            namespace,
            name
        )
    }
}
