//! Accessible-namespace endpoints: a computed, read-only, cluster-scoped
//! collection with non-disclosure semantics on `Get`.

use axum::extract::{Path as AxumPath, Query, State};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde::Deserialize;

use pkg_types::authorization::{AccessibleNamespace, AccessibleNamespaceList};
use pkg_types::validate::validate_name;

use crate::auth::Identity;
use crate::status;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub watch: Option<String>,
}

/// `GET .../accessiblenamespaces`. An anonymous caller gets an empty list,
/// not an error. The resource version is always empty: the collection is
/// computed per request and cannot be watched.
pub async fn list_accessible_namespaces(
    State(state): State<AppState>,
    Extension(Identity(caller)): Extension<Identity>,
    Query(query): Query<ListQuery>,
) -> Response {
    if wants_watch(&query) {
        return status::method_not_allowed("watch is not supported on accessiblenamespaces");
    }

    let Some(user) = caller else {
        return Json(AccessibleNamespaceList::default()).into_response();
    };

    match state
        .resolver
        .resolve_accessible_namespaces(Some(&user))
        .await
    {
        Ok(names) => {
            let items = names
                .into_iter()
                .map(|name| AccessibleNamespace {
                    name,
                    resource_version: String::new(),
                })
                .collect();
            Json(AccessibleNamespaceList {
                items,
                resource_version: String::new(),
            })
            .into_response()
        }
        Err(e) => status::internal_error(e.to_string()),
    }
}

/// `GET .../accessiblenamespaces/{name}`. NotFound is the sole negative
/// outcome: a missing namespace, a multi-tenancy rejection, and missing
/// RBAC rights are indistinguishable to the caller.
pub async fn get_accessible_namespace(
    State(state): State<AppState>,
    Extension(Identity(caller)): Extension<Identity>,
    AxumPath(name): AxumPath<String>,
) -> Response {
    if validate_name(&name).is_err() {
        return status::not_found("accessiblenamespaces", &name);
    }
    let Some(user) = caller else {
        return status::not_found("accessiblenamespaces", &name);
    };

    match state
        .resolver
        .is_namespace_accessible(Some(&user), &name)
        .await
    {
        Ok(true) => Json(AccessibleNamespace {
            name,
            resource_version: String::new(),
        })
        .into_response(),
        Ok(false) => status::not_found("accessiblenamespaces", &name),
        Err(e) => status::internal_error(e.to_string()),
    }
}

// Boolean query parameters arrive in whatever casing the client used.
fn wants_watch(query: &ListQuery) -> bool {
    match query.watch.as_deref() {
        Some(value) => value == "1" || value.eq_ignore_ascii_case("true"),
        None => false,
    }
}
