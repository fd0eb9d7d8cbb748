use serde::{Deserialize, Serialize};

// --- Policy rules ---

/// A single RBAC grant: the cartesian product of
/// (api_groups × resources × verbs), plus the named non-resource URLs.
/// `*` is a wildcard in any dimension.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyRule {
    /// API groups this rule applies to ("" for core, "*" for all).
    #[serde(default)]
    pub api_groups: Vec<String>,
    /// Resource types ("pods", "deployments", "*" for all). A resource may
    /// carry a subresource suffix, e.g. "pods/log".
    #[serde(default)]
    pub resources: Vec<String>,
    /// Allowed verbs ("get", "list", "create", ..., "*" for all).
    #[serde(default)]
    pub verbs: Vec<String>,
    /// Non-resource URL paths ("/healthz", "/metrics/*"). Only meaningful in
    /// ClusterRoles; a trailing `*` matches any suffix.
    #[serde(default, rename = "nonResourceURLs")]
    pub non_resource_urls: Vec<String>,
}

// --- Subjects ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubjectKind {
    User,
    Group,
    ServiceAccount,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub kind: SubjectKind,
    pub name: String,
    /// Only set for ServiceAccount subjects. May be empty inside a
    /// RoleBinding, in which case the binding's namespace applies.
    #[serde(default)]
    pub namespace: Option<String>,
}

// --- Role references ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoleRefKind {
    Role,
    ClusterRole,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleRef {
    pub kind: RoleRefKind,
    pub name: String,
}

// --- Roles ---

/// A namespaced collection of policy rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    pub name: String,
    pub namespace: String,
    #[serde(default)]
    pub rules: Vec<PolicyRule>,
}

/// A cluster-global collection of policy rules. May be referenced from
/// either binding kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterRole {
    pub name: String,
    #[serde(default)]
    pub rules: Vec<PolicyRule>,
}

// --- Bindings ---

/// Confers its role's rules only within the binding's namespace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleBinding {
    pub name: String,
    pub namespace: String,
    #[serde(default)]
    pub subjects: Vec<Subject>,
    pub role_ref: RoleRef,
}

/// Confers its ClusterRole's rules cluster-wide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterRoleBinding {
    pub name: String,
    #[serde(default)]
    pub subjects: Vec<Subject>,
    pub role_ref: RoleRef,
}
