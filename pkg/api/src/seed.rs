//! Registry bootstrap: default namespaces and the cluster-admin grant.

use chrono::Utc;
use tracing::info;

use pkg_constants::{auth, registry};
use pkg_state::client::StateStore;
use pkg_types::namespace::Namespace;
use pkg_types::rbac::{
    ClusterRole, ClusterRoleBinding, PolicyRule, RoleRef, RoleRefKind, Subject, SubjectKind,
};
use pkg_types::validate::validate_name;

/// Seed default namespaces on first start.
pub async fn seed_default_namespaces(store: &StateStore) -> anyhow::Result<()> {
    for name in ["default", "kube-system"] {
        validate_name(name)?;
        let key = format!("{}{}", registry::NAMESPACES_PREFIX, name);
        if store.get(&key).await?.is_none() {
            let ns = Namespace {
                name: name.to_string(),
                labels: std::collections::HashMap::new(),
                created_at: Utc::now(),
            };
            store.put_json(&key, &ns).await?;
            info!("Seeded namespace: {}", name);
        }
    }
    Ok(())
}

/// Seed the bootstrap cluster-admin ClusterRole and its binding to the
/// masters group, so the cluster is administrable before any RBAC objects
/// are loaded.
pub async fn seed_cluster_admin(store: &StateStore) -> anyhow::Result<()> {
    let role_key = format!("{}cluster-admin", registry::CLUSTER_ROLES_PREFIX);
    if store.get(&role_key).await?.is_none() {
        let role = ClusterRole {
            name: "cluster-admin".to_string(),
            rules: vec![
                PolicyRule {
                    api_groups: vec!["*".into()],
                    resources: vec!["*".into()],
                    verbs: vec!["*".into()],
                    non_resource_urls: vec![],
                },
                PolicyRule {
                    api_groups: vec![],
                    resources: vec![],
                    verbs: vec!["*".into()],
                    non_resource_urls: vec!["*".into()],
                },
            ],
        };
        store.put_json(&role_key, &role).await?;
        info!("Seeded ClusterRole: cluster-admin");
    }

    let binding_key = format!("{}cluster-admin", registry::CLUSTER_ROLE_BINDINGS_PREFIX);
    if store.get(&binding_key).await?.is_none() {
        let binding = ClusterRoleBinding {
            name: "cluster-admin".to_string(),
            subjects: vec![Subject {
                kind: SubjectKind::Group,
                name: auth::MASTERS_GROUP.to_string(),
                namespace: None,
            }],
            role_ref: RoleRef {
                kind: RoleRefKind::ClusterRole,
                name: "cluster-admin".to_string(),
            },
        };
        store.put_json(&binding_key, &binding).await?;
        info!("Seeded ClusterRoleBinding: cluster-admin -> {}", auth::MASTERS_GROUP);
    }
    Ok(())
}
