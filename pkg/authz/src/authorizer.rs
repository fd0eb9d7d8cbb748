//! Authorizer interface and the production implementations: an RBAC
//! authorizer over the registry listers, a deny-only multi-tenancy wrapper,
//! and a composite that chains them.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use pkg_types::authorization::AccessAttributes;
use pkg_types::rbac::{PolicyRule, RoleRefKind};

use crate::listers::{ClusterRoleBindingLister, ClusterRoleLister, RoleBindingLister, RoleLister};
use crate::multitenancy::MultiTenancy;
use crate::subject::subjects_match;

/// Outcome of a single authorization check. `NoOpinion` is not "allow":
/// absent an explicit allow the effective outcome is "not allowed".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
    NoOpinion,
}

#[async_trait]
pub trait Authorizer: Send + Sync {
    /// Evaluate one access query. The `String` is a human-readable reason.
    async fn authorize(&self, attrs: &AccessAttributes) -> anyhow::Result<(Decision, String)>;
}

// ============================================================
// RBAC
// ============================================================

/// Authorizer over RBAC bindings: ClusterRoleBindings always apply; a
/// namespaced request additionally consults the namespace's RoleBindings.
/// Allows or has no opinion; it never denies.
pub struct RbacAuthorizer {
    role_lister: Arc<dyn RoleLister>,
    role_binding_lister: Arc<dyn RoleBindingLister>,
    cluster_role_lister: Arc<dyn ClusterRoleLister>,
    cluster_role_binding_lister: Arc<dyn ClusterRoleBindingLister>,
}

impl RbacAuthorizer {
    pub fn new(
        role_lister: Arc<dyn RoleLister>,
        role_binding_lister: Arc<dyn RoleBindingLister>,
        cluster_role_lister: Arc<dyn ClusterRoleLister>,
        cluster_role_binding_lister: Arc<dyn ClusterRoleBindingLister>,
    ) -> Self {
        Self {
            role_lister,
            role_binding_lister,
            cluster_role_lister,
            cluster_role_binding_lister,
        }
    }
}

#[async_trait]
impl Authorizer for RbacAuthorizer {
    async fn authorize(&self, attrs: &AccessAttributes) -> anyhow::Result<(Decision, String)> {
        // ClusterRoleBindings apply to every request shape.
        for crb in self.cluster_role_binding_lister.list().await? {
            if crb.role_ref.kind != RoleRefKind::ClusterRole {
                continue;
            }
            if !subjects_match(&crb.subjects, &attrs.user, None) {
                continue;
            }
            let Some(cluster_role) = self.cluster_role_lister.get(&crb.role_ref.name).await?
            else {
                debug!(
                    "ClusterRole {} referenced by ClusterRoleBinding {} not found, skipping",
                    crb.role_ref.name, crb.name
                );
                continue;
            };
            if rules_allow(&cluster_role.rules, attrs) {
                return Ok((
                    Decision::Allow,
                    format!(
                        "RBAC: allowed by ClusterRoleBinding \"{}\" of ClusterRole \"{}\"",
                        crb.name, cluster_role.name
                    ),
                ));
            }
        }

        // RoleBindings only confer rights within their own namespace.
        let namespace = attrs.namespace();
        if attrs.is_resource_request() && !namespace.is_empty() {
            for rb in self.role_binding_lister.list_in(namespace).await? {
                if !subjects_match(&rb.subjects, &attrs.user, Some(&rb.namespace)) {
                    continue;
                }
                let rules = match rb.role_ref.kind {
                    RoleRefKind::ClusterRole => {
                        match self.cluster_role_lister.get(&rb.role_ref.name).await? {
                            Some(cr) => cr.rules,
                            None => continue,
                        }
                    }
                    RoleRefKind::Role => {
                        match self.role_lister.get(namespace, &rb.role_ref.name).await? {
                            Some(role) => role.rules,
                            None => continue,
                        }
                    }
                };
                if rules_allow(&rules, attrs) {
                    return Ok((
                        Decision::Allow,
                        format!(
                            "RBAC: allowed by RoleBinding \"{}/{}\" of {} \"{}\"",
                            rb.namespace,
                            rb.name,
                            match rb.role_ref.kind {
                                RoleRefKind::ClusterRole => "ClusterRole",
                                RoleRefKind::Role => "Role",
                            },
                            rb.role_ref.name
                        ),
                    ));
                }
            }
        }

        Ok((Decision::NoOpinion, String::new()))
    }
}

fn rules_allow(rules: &[PolicyRule], attrs: &AccessAttributes) -> bool {
    rules.iter().any(|rule| rule_allows(rule, attrs))
}

fn rule_allows(rule: &PolicyRule, attrs: &AccessAttributes) -> bool {
    if !verb_matches(&rule.verbs, attrs.verb()) {
        return false;
    }
    if attrs.is_resource_request() {
        group_matches(&rule.api_groups, attrs.api_group())
            && resource_matches(&rule.resources, attrs.resource(), attrs.subresource())
    } else {
        path_matches(&rule.non_resource_urls, attrs.path())
    }
}

fn verb_matches(verbs: &[String], verb: &str) -> bool {
    verbs.iter().any(|v| v == "*" || v == verb)
}

fn group_matches(groups: &[String], group: &str) -> bool {
    groups.iter().any(|g| g == "*" || g == group)
}

fn resource_matches(resources: &[String], resource: &str, subresource: &str) -> bool {
    let combined = if subresource.is_empty() {
        resource.to_string()
    } else {
        format!("{}/{}", resource, subresource)
    };
    resources.iter().any(|r| r == "*" || *r == combined)
}

/// Exact match, or a trailing `*` matching any suffix ("/metrics/*").
fn path_matches(urls: &[String], path: &str) -> bool {
    urls.iter().any(|url| {
        if url == "*" {
            return true;
        }
        match url.strip_suffix('*') {
            Some(prefix) => path.starts_with(prefix),
            None => url == path,
        }
    })
}

// ============================================================
// Multi-tenancy wrapper
// ============================================================

/// Deny-only adapter over the tenancy policy: denies namespaced requests for
/// namespaces the policy hides, has no opinion otherwise.
pub struct MultiTenancyAuthorizer {
    engine: Arc<dyn MultiTenancy>,
}

impl MultiTenancyAuthorizer {
    pub fn new(engine: Arc<dyn MultiTenancy>) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl Authorizer for MultiTenancyAuthorizer {
    async fn authorize(&self, attrs: &AccessAttributes) -> anyhow::Result<(Decision, String)> {
        if !attrs.is_resource_request() || attrs.namespace().is_empty() {
            return Ok((Decision::NoOpinion, String::new()));
        }
        if self
            .engine
            .is_namespace_allowed(&attrs.user, attrs.namespace())
        {
            Ok((Decision::NoOpinion, String::new()))
        } else {
            Ok((
                Decision::Deny,
                "multi-tenancy: user has no access to the namespace".to_string(),
            ))
        }
    }
}

// ============================================================
// Composite
// ============================================================

/// Chains authorizers in order: the first `Allow` or `Deny` wins; if all
/// abstain the result is `NoOpinion`. An authorizer error aborts the chain.
pub struct CompositeAuthorizer {
    authorizers: Vec<Arc<dyn Authorizer>>,
}

impl CompositeAuthorizer {
    pub fn new(authorizers: Vec<Arc<dyn Authorizer>>) -> Self {
        Self { authorizers }
    }
}

#[async_trait]
impl Authorizer for CompositeAuthorizer {
    async fn authorize(&self, attrs: &AccessAttributes) -> anyhow::Result<(Decision, String)> {
        for authorizer in &self.authorizers {
            let (decision, reason) = authorizer.authorize(attrs).await?;
            if decision != Decision::NoOpinion {
                return Ok((decision, reason));
            }
        }
        Ok((Decision::NoOpinion, String::new()))
    }
}
