//! In-memory fakes shared by the crate's tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use pkg_types::namespace::Namespace;
use pkg_types::rbac::{ClusterRole, ClusterRoleBinding, Role, RoleBinding};

use crate::authorizer::RbacAuthorizer;
use crate::discovery::{ApiResource, ApiResourceList, Discovery, DiscoveryError};
use crate::listers::{
    ClusterRoleBindingLister, ClusterRoleLister, NamespaceLister, RoleBindingLister, RoleLister,
};
use crate::multitenancy::MultiTenancy;
use crate::resolver::NamespaceResolver;
use crate::scope_cache::ResourceScopeCache;

#[derive(Default)]
struct ClusterState {
    namespaces: Vec<Namespace>,
    roles: Vec<Role>,
    cluster_roles: Vec<ClusterRole>,
    role_bindings: Vec<RoleBinding>,
    cluster_role_bindings: Vec<ClusterRoleBinding>,
    fail_role_bindings: bool,
    fail_cluster_role_bindings: bool,
}

/// A fake cluster acting as all five listers at once.
#[derive(Clone, Default)]
pub(crate) struct FakeCluster {
    state: Arc<Mutex<ClusterState>>,
}

impl FakeCluster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_namespace(&self, name: &str) {
        self.state.lock().unwrap().namespaces.push(Namespace {
            name: name.into(),
            labels: HashMap::new(),
            created_at: Utc::now(),
        });
    }

    pub fn add_role(&self, role: Role) {
        self.state.lock().unwrap().roles.push(role);
    }

    pub fn add_cluster_role(&self, role: ClusterRole) {
        self.state.lock().unwrap().cluster_roles.push(role);
    }

    pub fn add_role_binding(&self, binding: RoleBinding) {
        self.state.lock().unwrap().role_bindings.push(binding);
    }

    pub fn add_cluster_role_binding(&self, binding: ClusterRoleBinding) {
        self.state.lock().unwrap().cluster_role_bindings.push(binding);
    }

    /// Make RoleBinding listing fail, to exercise primary-path errors.
    pub fn fail_role_bindings(&self) {
        self.state.lock().unwrap().fail_role_bindings = true;
    }

    /// Make ClusterRoleBinding listing fail, to exercise the fail-open
    /// global-access probe.
    pub fn fail_cluster_role_bindings(&self) {
        self.state.lock().unwrap().fail_cluster_role_bindings = true;
    }

    pub fn rbac_authorizer(&self) -> RbacAuthorizer {
        RbacAuthorizer::new(
            Arc::new(self.clone()),
            Arc::new(self.clone()),
            Arc::new(self.clone()),
            Arc::new(self.clone()),
        )
    }

    pub fn resolver(
        &self,
        scope_cache: Option<Arc<ResourceScopeCache>>,
        multitenancy: Option<Arc<dyn MultiTenancy>>,
    ) -> NamespaceResolver {
        NamespaceResolver::new(
            Arc::new(self.clone()),
            Arc::new(self.clone()),
            Arc::new(self.clone()),
            Arc::new(self.clone()),
            Arc::new(self.clone()),
            scope_cache,
            multitenancy,
        )
    }
}

#[async_trait]
impl NamespaceLister for FakeCluster {
    async fn get(&self, name: &str) -> anyhow::Result<Option<Namespace>> {
        let state = self.state.lock().unwrap();
        Ok(state.namespaces.iter().find(|ns| ns.name == name).cloned())
    }

    async fn list(&self) -> anyhow::Result<Vec<Namespace>> {
        Ok(self.state.lock().unwrap().namespaces.clone())
    }
}

#[async_trait]
impl RoleLister for FakeCluster {
    async fn get(&self, namespace: &str, name: &str) -> anyhow::Result<Option<Role>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .roles
            .iter()
            .find(|r| r.namespace == namespace && r.name == name)
            .cloned())
    }
}

#[async_trait]
impl ClusterRoleLister for FakeCluster {
    async fn get(&self, name: &str) -> anyhow::Result<Option<ClusterRole>> {
        let state = self.state.lock().unwrap();
        Ok(state.cluster_roles.iter().find(|r| r.name == name).cloned())
    }
}

#[async_trait]
impl RoleBindingLister for FakeCluster {
    async fn list(&self) -> anyhow::Result<Vec<RoleBinding>> {
        let state = self.state.lock().unwrap();
        if state.fail_role_bindings {
            anyhow::bail!("role binding lister unavailable");
        }
        Ok(state.role_bindings.clone())
    }

    async fn list_in(&self, namespace: &str) -> anyhow::Result<Vec<RoleBinding>> {
        let state = self.state.lock().unwrap();
        if state.fail_role_bindings {
            anyhow::bail!("role binding lister unavailable");
        }
        Ok(state
            .role_bindings
            .iter()
            .filter(|rb| rb.namespace == namespace)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ClusterRoleBindingLister for FakeCluster {
    async fn list(&self) -> anyhow::Result<Vec<ClusterRoleBinding>> {
        let state = self.state.lock().unwrap();
        if state.fail_cluster_role_bindings {
            anyhow::bail!("cluster role binding lister unavailable");
        }
        Ok(state.cluster_role_bindings.clone())
    }
}

/// Discovery returning a fixed resource catalog.
pub(crate) struct StaticDiscovery {
    lists: Vec<ApiResourceList>,
}

impl StaticDiscovery {
    /// Entries are `(group, resource, namespaced)`.
    pub fn new(entries: &[(&str, &str, bool)]) -> Self {
        let mut by_group: HashMap<String, Vec<ApiResource>> = HashMap::new();
        for (group, resource, namespaced) in entries {
            let group_version = if group.is_empty() {
                "v1".to_string()
            } else {
                format!("{}/v1", group)
            };
            by_group.entry(group_version).or_default().push(ApiResource {
                name: resource.to_string(),
                namespaced: *namespaced,
            });
        }
        Self {
            lists: by_group
                .into_iter()
                .map(|(group_version, resources)| ApiResourceList {
                    group_version,
                    resources,
                })
                .collect(),
        }
    }
}

#[async_trait]
impl Discovery for StaticDiscovery {
    async fn preferred_resources(&self) -> Result<Vec<ApiResourceList>, DiscoveryError> {
        Ok(self.lists.clone())
    }
}

/// A scope cache pre-populated from `(group, resource, namespaced)` entries.
pub(crate) async fn scope_cache_with(entries: &[(&str, &str, bool)]) -> Arc<ResourceScopeCache> {
    Arc::new(ResourceScopeCache::new(Some(Arc::new(StaticDiscovery::new(entries)))).await)
}
