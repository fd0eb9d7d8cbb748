pub mod auth;
pub mod handlers;
pub mod request_id;
pub mod seed;
pub mod server;
pub mod status;

use std::sync::Arc;

use pkg_authz::authorizer::Authorizer;
use pkg_authz::resolver::NamespaceResolver;
use pkg_authz::scope_cache::ResourceScopeCache;
use pkg_state::client::StateStore;

/// Shared application state injected into all Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: StateStore,
    pub authorizer: Arc<dyn Authorizer>,
    pub resolver: Arc<NamespaceResolver>,
    pub scope_cache: Arc<ResourceScopeCache>,
}
