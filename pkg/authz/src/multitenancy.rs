//! Multi-tenancy policy interface.
//!
//! The rule engine itself lives outside this server; the resolver and the
//! composite authorizer only ask one question of it. Wiring `None` means no
//! multi-tenancy restrictions apply.

use pkg_types::user::UserInfo;

pub trait MultiTenancy: Send + Sync {
    /// Whether the tenancy policy lets `user` see `namespace` at all.
    fn is_namespace_allowed(&self, user: &UserInfo, namespace: &str) -> bool;
}
