//! Read-only snapshot interfaces over cluster objects, plus the
//! registry-store-backed production implementation.
//!
//! The resolver and authorizers only ever see these traits, so tests swap in
//! in-memory fakes without touching the core.

use async_trait::async_trait;
use pkg_constants::registry;
use pkg_state::client::StateStore;
use pkg_types::namespace::Namespace;
use pkg_types::rbac::{ClusterRole, ClusterRoleBinding, Role, RoleBinding};

#[async_trait]
pub trait NamespaceLister: Send + Sync {
    async fn get(&self, name: &str) -> anyhow::Result<Option<Namespace>>;
    async fn list(&self) -> anyhow::Result<Vec<Namespace>>;
}

#[async_trait]
pub trait RoleLister: Send + Sync {
    async fn get(&self, namespace: &str, name: &str) -> anyhow::Result<Option<Role>>;
}

#[async_trait]
pub trait ClusterRoleLister: Send + Sync {
    async fn get(&self, name: &str) -> anyhow::Result<Option<ClusterRole>>;
}

#[async_trait]
pub trait RoleBindingLister: Send + Sync {
    /// All RoleBindings across all namespaces.
    async fn list(&self) -> anyhow::Result<Vec<RoleBinding>>;
    /// RoleBindings of a single namespace.
    async fn list_in(&self, namespace: &str) -> anyhow::Result<Vec<RoleBinding>>;
}

#[async_trait]
pub trait ClusterRoleBindingLister: Send + Sync {
    async fn list(&self) -> anyhow::Result<Vec<ClusterRoleBinding>>;
}

/// Lister over the SlateDB registry. One struct implements all five traits;
/// the server clones it behind trait objects.
#[derive(Clone)]
pub struct RegistryListers {
    store: StateStore,
}

impl RegistryListers {
    pub fn new(store: StateStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl NamespaceLister for RegistryListers {
    async fn get(&self, name: &str) -> anyhow::Result<Option<Namespace>> {
        let key = format!("{}{}", registry::NAMESPACES_PREFIX, name);
        self.store.get_json(&key).await
    }

    async fn list(&self) -> anyhow::Result<Vec<Namespace>> {
        self.store.list_json(registry::NAMESPACES_PREFIX).await
    }
}

#[async_trait]
impl RoleLister for RegistryListers {
    async fn get(&self, namespace: &str, name: &str) -> anyhow::Result<Option<Role>> {
        let key = format!("{}{}/{}", registry::ROLES_PREFIX, namespace, name);
        self.store.get_json(&key).await
    }
}

#[async_trait]
impl ClusterRoleLister for RegistryListers {
    async fn get(&self, name: &str) -> anyhow::Result<Option<ClusterRole>> {
        let key = format!("{}{}", registry::CLUSTER_ROLES_PREFIX, name);
        self.store.get_json(&key).await
    }
}

#[async_trait]
impl RoleBindingLister for RegistryListers {
    async fn list(&self) -> anyhow::Result<Vec<RoleBinding>> {
        self.store.list_json(registry::ROLE_BINDINGS_PREFIX).await
    }

    async fn list_in(&self, namespace: &str) -> anyhow::Result<Vec<RoleBinding>> {
        let prefix = format!("{}{}/", registry::ROLE_BINDINGS_PREFIX, namespace);
        self.store.list_json(&prefix).await
    }
}

#[async_trait]
impl ClusterRoleBindingLister for RegistryListers {
    async fn list(&self) -> anyhow::Result<Vec<ClusterRoleBinding>> {
        self.store
            .list_json(registry::CLUSTER_ROLE_BINDINGS_PREFIX)
            .await
    }
}
