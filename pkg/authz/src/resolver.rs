//! Resolves which namespaces a user can see, by RBAC analysis plus
//! multi-tenancy filtering, without calling the authorizer per namespace.

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Context;
use tracing::{debug, warn};

use pkg_types::rbac::{PolicyRule, RoleRefKind};
use pkg_types::user::UserInfo;

use crate::listers::{
    ClusterRoleBindingLister, ClusterRoleLister, NamespaceLister, RoleBindingLister, RoleLister,
};
use crate::multitenancy::MultiTenancy;
use crate::scope_cache::ResourceScopeCache;

/// Answers two questions for a subject: the full set of namespaces in which
/// it holds any namespaced RBAC right, and whether it holds one in a named
/// namespace. A false positive on the "any namespaced right" probe would
/// disclose the entire namespace list, so all scope decisions fail closed.
pub struct NamespaceResolver {
    namespace_lister: Arc<dyn NamespaceLister>,
    role_lister: Arc<dyn RoleLister>,
    role_binding_lister: Arc<dyn RoleBindingLister>,
    cluster_role_lister: Arc<dyn ClusterRoleLister>,
    cluster_role_binding_lister: Arc<dyn ClusterRoleBindingLister>,
    scope_cache: Option<Arc<ResourceScopeCache>>,
    multitenancy: Option<Arc<dyn MultiTenancy>>,
}

impl NamespaceResolver {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        namespace_lister: Arc<dyn NamespaceLister>,
        role_lister: Arc<dyn RoleLister>,
        role_binding_lister: Arc<dyn RoleBindingLister>,
        cluster_role_lister: Arc<dyn ClusterRoleLister>,
        cluster_role_binding_lister: Arc<dyn ClusterRoleBindingLister>,
        scope_cache: Option<Arc<ResourceScopeCache>>,
        multitenancy: Option<Arc<dyn MultiTenancy>>,
    ) -> Self {
        Self {
            namespace_lister,
            role_lister,
            role_binding_lister,
            cluster_role_lister,
            cluster_role_binding_lister,
            scope_cache,
            multitenancy,
        }
    }

    /// Sorted, deduplicated names of the namespaces where `user` holds any
    /// namespaced permission and multi-tenancy does not hide the namespace.
    /// `None` yields the empty list. Fails only on backing-store errors.
    pub async fn resolve_accessible_namespaces(
        &self,
        user: Option<&UserInfo>,
    ) -> anyhow::Result<Vec<String>> {
        let Some(user) = user else {
            return Ok(Vec::new());
        };

        // The global probe is fail-open: a lister error here must not deny a
        // user the namespaces their RoleBindings alone would grant.
        let global_access = match self.has_global_namespaced_access(user).await {
            Ok(global) => global,
            Err(e) => {
                warn!("Error checking global namespaced access: {}", e);
                false
            }
        };

        let candidates: HashSet<String> = if global_access {
            let namespaces = self
                .namespace_lister
                .list()
                .await
                .context("failed to list namespaces")?;
            debug!(
                "User {} has global namespaced access, {} candidate namespaces",
                user.name,
                namespaces.len()
            );
            namespaces.into_iter().map(|ns| ns.name).collect()
        } else {
            let candidates = self.namespaces_from_role_bindings(user).await?;
            debug!(
                "User {} has access via RoleBindings to {} namespaces",
                user.name,
                candidates.len()
            );
            candidates
        };

        let mut result: Vec<String> = candidates
            .into_iter()
            .filter(|ns| self.allowed_by_multitenancy(user, ns))
            .collect();
        result.sort_unstable();
        Ok(result)
    }

    /// Whether `namespace` is accessible to `user`. Absence of the
    /// namespace, multi-tenancy rejection, and lack of any matching binding
    /// all yield `Ok(false)` with no error, so callers cannot tell them
    /// apart (existence non-disclosure).
    pub async fn is_namespace_accessible(
        &self,
        user: Option<&UserInfo>,
        namespace: &str,
    ) -> anyhow::Result<bool> {
        let Some(user) = user else {
            return Ok(false);
        };

        match self.namespace_lister.get(namespace).await {
            Ok(Some(_)) => {}
            // Absent or unreadable: report inaccessible, not an error.
            Ok(None) => return Ok(false),
            Err(e) => {
                debug!("Namespace {} lookup failed: {}", namespace, e);
                return Ok(false);
            }
        }

        if !self.allowed_by_multitenancy(user, namespace) {
            return Ok(false);
        }

        match self.has_global_namespaced_access(user).await {
            Ok(true) => return Ok(true),
            Ok(false) => {}
            // Fail-open probe: fall through to the RoleBinding check, which
            // may still grant access.
            Err(e) => {
                warn!(
                    "Error checking global access (continuing with RoleBinding check): {}",
                    e
                );
            }
        }

        self.has_access_via_role_bindings(user, namespace).await
    }

    /// Whether any ClusterRoleBinding grants `user` namespaced access
    /// cluster-wide.
    async fn has_global_namespaced_access(&self, user: &UserInfo) -> anyhow::Result<bool> {
        let bindings = self
            .cluster_role_binding_lister
            .list()
            .await
            .context("failed to list ClusterRoleBindings")?;

        for binding in bindings {
            if !crate::subject::subjects_match(&binding.subjects, user, None) {
                continue;
            }
            let Some(cluster_role) = self.lookup_cluster_role(&binding.role_ref.name).await else {
                continue;
            };
            if self.has_namespaced_rules(&cluster_role.rules) {
                debug!(
                    "User {} has global namespaced access via ClusterRoleBinding {} -> ClusterRole {}",
                    user.name, binding.name, cluster_role.name
                );
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// All namespaces where some RoleBinding matches the user and its role
    /// grants namespaced access.
    async fn namespaces_from_role_bindings(
        &self,
        user: &UserInfo,
    ) -> anyhow::Result<HashSet<String>> {
        let bindings = self
            .role_binding_lister
            .list()
            .await
            .context("failed to list RoleBindings")?;

        let mut result = HashSet::new();
        for binding in bindings {
            if result.contains(&binding.namespace) {
                continue;
            }
            if !crate::subject::subjects_match(&binding.subjects, user, Some(&binding.namespace)) {
                continue;
            }
            let Some(rules) = self.rules_for_role_ref(&binding).await else {
                continue;
            };
            if self.has_namespaced_rules(&rules) {
                result.insert(binding.namespace);
            }
        }
        Ok(result)
    }

    /// Whether any RoleBinding of `namespace` grants the user namespaced
    /// access there.
    async fn has_access_via_role_bindings(
        &self,
        user: &UserInfo,
        namespace: &str,
    ) -> anyhow::Result<bool> {
        let bindings = self
            .role_binding_lister
            .list_in(namespace)
            .await
            .with_context(|| format!("failed to list RoleBindings in namespace {}", namespace))?;

        for binding in bindings {
            if !crate::subject::subjects_match(&binding.subjects, user, Some(&binding.namespace)) {
                continue;
            }
            let Some(rules) = self.rules_for_role_ref(&binding).await else {
                continue;
            };
            if self.has_namespaced_rules(&rules) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Rules referenced by a RoleBinding, or `None` if the role is missing
    /// or unreadable (the binding is then skipped).
    async fn rules_for_role_ref(
        &self,
        binding: &pkg_types::rbac::RoleBinding,
    ) -> Option<Vec<PolicyRule>> {
        match binding.role_ref.kind {
            RoleRefKind::ClusterRole => self
                .lookup_cluster_role(&binding.role_ref.name)
                .await
                .map(|cr| cr.rules),
            RoleRefKind::Role => {
                match self
                    .role_lister
                    .get(&binding.namespace, &binding.role_ref.name)
                    .await
                {
                    Ok(Some(role)) => Some(role.rules),
                    Ok(None) => {
                        debug!(
                            "Role {}/{} referenced by RoleBinding {}/{} not found, skipping",
                            binding.namespace,
                            binding.role_ref.name,
                            binding.namespace,
                            binding.name
                        );
                        None
                    }
                    Err(e) => {
                        debug!(
                            "Failed to get Role {}/{}: {}",
                            binding.namespace, binding.role_ref.name, e
                        );
                        None
                    }
                }
            }
        }
    }

    async fn lookup_cluster_role(&self, name: &str) -> Option<pkg_types::rbac::ClusterRole> {
        match self.cluster_role_lister.get(name).await {
            Ok(Some(role)) => Some(role),
            Ok(None) => {
                debug!("ClusterRole {} not found, skipping binding", name);
                None
            }
            Err(e) => {
                debug!("Failed to get ClusterRole {}: {}", name, e);
                None
            }
        }
    }

    /// Whether any rule in the list grants access to namespaced resources.
    ///
    /// A rule with a wildcard API group plus at least one resource is
    /// treated as namespaced. Strictly deciding that would mean enumerating
    /// every known group; the over-approximation only ever enlarges the
    /// subject's *own* namespace list, and actual use of those namespaces is
    /// still filtered by the downstream authorizer.
    fn has_namespaced_rules(&self, rules: &[PolicyRule]) -> bool {
        rules.iter().any(|rule| self.rule_is_namespaced(rule))
    }

    fn rule_is_namespaced(&self, rule: &PolicyRule) -> bool {
        // Pure non-resource-URL rules are cluster-only.
        if !rule.non_resource_urls.is_empty() && rule.resources.is_empty() {
            return false;
        }
        // Empty verbs grant nothing.
        if rule.verbs.is_empty() {
            return false;
        }

        if rule.resources.iter().any(|r| r == "*") {
            return true;
        }
        if rule.api_groups.iter().any(|g| g == "*") && !rule.resources.is_empty() {
            return true;
        }

        rule.api_groups.iter().any(|group| {
            rule.resources.iter().any(|resource| {
                // Strip any subresource suffix before the scope lookup.
                let base = resource.split('/').next().unwrap_or(resource);
                self.resource_is_namespaced(group, base)
            })
        })
    }

    /// Unknown scope is cluster-scoped: a false "namespaced" here leaks the
    /// full namespace list.
    fn resource_is_namespaced(&self, group: &str, resource: &str) -> bool {
        match &self.scope_cache {
            Some(cache) => cache.is_namespaced(group, resource),
            None => {
                debug!(
                    "No scope cache, assuming {}/{} is cluster-scoped",
                    group, resource
                );
                false
            }
        }
    }

    fn allowed_by_multitenancy(&self, user: &UserInfo, namespace: &str) -> bool {
        match &self.multitenancy {
            Some(engine) => engine.is_namespace_allowed(user, namespace),
            None => true,
        }
    }
}
