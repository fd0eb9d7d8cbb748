//! Wire types for the `authorization.accessd.io/v1alpha1` API group and the
//! evaluated access-attributes form handed to authorizers.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::user::UserInfo;

// ============================================================
// Request attributes (wire form)
// ============================================================

/// A resource-shaped access query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceAttributes {
    pub verb: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub group: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub resource: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub subresource: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Empty means a cluster-scoped request.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,
}

/// A non-resource access query (a raw URL path).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NonResourceAttributes {
    pub verb: String,
    pub path: String,
}

/// One entry of a bulk review. Exactly one of the two shapes is set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessReviewRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_attributes: Option<ResourceAttributes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub non_resource_attributes: Option<NonResourceAttributes>,
}

// ============================================================
// Bulk review object
// ============================================================

/// Per-query outcome. At most one of `allowed` / `denied` is true; when
/// `evaluation_error` is non-empty both are false.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessReviewResult {
    #[serde(default)]
    pub allowed: bool,
    #[serde(default)]
    pub denied: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reason: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub evaluation_error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkSubjectAccessReviewSpec {
    /// Non-empty selects impersonated mode: every request is evaluated for
    /// this subject instead of the authenticated caller.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub user: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub extra: HashMap<String, Vec<String>>,
    #[serde(default)]
    pub requests: Vec<AccessReviewRequest>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkSubjectAccessReviewStatus {
    /// `results[i]` is the decision for `spec.requests[i]`.
    #[serde(default)]
    pub results: Vec<AccessReviewResult>,
}

/// Minimal object metadata on review objects. Reviews are never persisted,
/// so the name is purely cosmetic and the server may overwrite it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
}

/// Create-only review object; the response is the same object with
/// `status.results` populated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkSubjectAccessReview {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ObjectMeta>,
    #[serde(default)]
    pub spec: BulkSubjectAccessReviewSpec,
    #[serde(default)]
    pub status: BulkSubjectAccessReviewStatus,
}

// ============================================================
// Accessible namespaces
// ============================================================

/// Computed, read-only entity: exists iff the caller has any namespaced
/// access in the named namespace. Never persisted; `resource_version` is
/// always empty (no watch support).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessibleNamespace {
    pub name: String,
    #[serde(default)]
    pub resource_version: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessibleNamespaceList {
    #[serde(default)]
    pub items: Vec<AccessibleNamespace>,
    #[serde(default)]
    pub resource_version: String,
}

// ============================================================
// Evaluated attributes
// ============================================================

/// The fully resolved form of one access query: the effective subject plus
/// one of the two request shapes. This is what authorizers consume.
#[derive(Debug, Clone)]
pub struct AccessAttributes {
    pub user: UserInfo,
    resource: Option<ResourceAttributes>,
    non_resource: Option<NonResourceAttributes>,
}

impl AccessAttributes {
    pub fn for_resource(user: UserInfo, attrs: ResourceAttributes) -> Self {
        Self {
            user,
            resource: Some(attrs),
            non_resource: None,
        }
    }

    pub fn for_non_resource(user: UserInfo, attrs: NonResourceAttributes) -> Self {
        Self {
            user,
            resource: None,
            non_resource: Some(attrs),
        }
    }

    pub fn is_resource_request(&self) -> bool {
        self.resource.is_some()
    }

    /// The verb from whichever shape is set.
    pub fn verb(&self) -> &str {
        match (&self.resource, &self.non_resource) {
            (Some(r), _) => &r.verb,
            (_, Some(n)) => &n.verb,
            _ => "",
        }
    }

    pub fn is_read_only(&self) -> bool {
        pkg_constants::api::READ_ONLY_VERBS.contains(&self.verb())
    }

    pub fn namespace(&self) -> &str {
        self.resource.as_ref().map_or("", |r| &r.namespace)
    }

    pub fn resource(&self) -> &str {
        self.resource.as_ref().map_or("", |r| &r.resource)
    }

    pub fn subresource(&self) -> &str {
        self.resource.as_ref().map_or("", |r| &r.subresource)
    }

    pub fn name(&self) -> &str {
        self.resource.as_ref().map_or("", |r| &r.name)
    }

    pub fn api_group(&self) -> &str {
        self.resource.as_ref().map_or("", |r| &r.group)
    }

    pub fn api_version(&self) -> &str {
        self.resource.as_ref().map_or("", |r| &r.version)
    }

    pub fn path(&self) -> &str {
        self.non_resource.as_ref().map_or("", |n| &n.path)
    }
}
