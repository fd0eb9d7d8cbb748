//! Authorization core: resource-scope cache, namespace resolver,
//! RBAC authorizers, and bulk access review evaluation.

pub mod authorizer;
pub mod discovery;
pub mod listers;
pub mod multitenancy;
pub mod resolver;
pub mod review;
pub mod scope_cache;
pub mod subject;

#[cfg(test)]
pub(crate) mod testutil;
