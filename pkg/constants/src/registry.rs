//! State store registry key prefixes (etcd-style).

/// Namespaces: `/registry/namespaces/<name>`.
pub const NAMESPACES_PREFIX: &str = "/registry/namespaces/";

/// Roles: `/registry/rbac/roles/<namespace>/<name>`.
pub const ROLES_PREFIX: &str = "/registry/rbac/roles/";

/// ClusterRoles: `/registry/rbac/clusterroles/<name>`.
pub const CLUSTER_ROLES_PREFIX: &str = "/registry/rbac/clusterroles/";

/// RoleBindings: `/registry/rbac/rolebindings/<namespace>/<name>`.
pub const ROLE_BINDINGS_PREFIX: &str = "/registry/rbac/rolebindings/";

/// ClusterRoleBindings: `/registry/rbac/clusterrolebindings/<name>`.
pub const CLUSTER_ROLE_BINDINGS_PREFIX: &str = "/registry/rbac/clusterrolebindings/";
