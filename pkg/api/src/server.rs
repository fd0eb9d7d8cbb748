use axum::{
    Router, middleware,
    routing::{get, post},
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::info;

use pkg_authz::authorizer::{CompositeAuthorizer, RbacAuthorizer};
use pkg_authz::discovery::{Discovery, HttpDiscovery};
use pkg_authz::listers::RegistryListers;
use pkg_authz::resolver::NamespaceResolver;
use pkg_authz::scope_cache::ResourceScopeCache;
use pkg_state::client::StateStore;

use crate::auth::identity_middleware;
use crate::handlers::{authorization, health, namespaces};
use crate::request_id::request_id_middleware;
use crate::{AppState, seed};

/// Server configuration passed from the binary's CLI.
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub data_dir: String,
    /// Where the scope cache pulls the preferred-resources list from.
    /// `None` leaves the cache empty (every resource treated as
    /// cluster-scoped).
    pub discovery_url: Option<String>,
    pub refresh_interval: Duration,
    pub bootstrap_interval: Duration,
}

pub async fn start_server(config: ServerConfig) -> anyhow::Result<()> {
    // Core subsystems: registry store, listers, scope cache, resolver.
    let store = StateStore::new(&config.data_dir).await?;
    seed::seed_default_namespaces(&store).await?;
    seed::seed_cluster_admin(&store).await?;

    let listers = RegistryListers::new(store.clone());
    let discovery: Option<Arc<dyn Discovery>> = config
        .discovery_url
        .as_deref()
        .map(|url| Arc::new(HttpDiscovery::new(url)) as Arc<dyn Discovery>);

    let scope_cache = Arc::new(
        ResourceScopeCache::with_intervals(
            discovery,
            config.refresh_interval,
            config.bootstrap_interval,
        )
        .await,
    );

    let resolver = Arc::new(NamespaceResolver::new(
        Arc::new(listers.clone()),
        Arc::new(listers.clone()),
        Arc::new(listers.clone()),
        Arc::new(listers.clone()),
        Arc::new(listers.clone()),
        Some(scope_cache.clone()),
        // Multi-tenancy engine is wired externally; none configured here.
        None,
    ));

    let rbac = Arc::new(RbacAuthorizer::new(
        Arc::new(listers.clone()),
        Arc::new(listers.clone()),
        Arc::new(listers.clone()),
        Arc::new(listers.clone()),
    ));
    let authorizer = Arc::new(CompositeAuthorizer::new(vec![rbac]));

    let state = AppState {
        store,
        authorizer,
        resolver,
        scope_cache: scope_cache.clone(),
    };

    // Scope cache refresh loop, stopped on shutdown.
    let (stop_tx, stop_rx) = watch::channel(());
    let refresh_loop = {
        let scope_cache = scope_cache.clone();
        tokio::spawn(async move { scope_cache.run_refresh_loop(stop_rx).await })
    };

    let app = build_router(state);

    info!("Starting accessd API server on {}", config.addr);
    let listener = TcpListener::bind(config.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Stop the refresh loop once the listener has drained.
    let _ = stop_tx.send(());
    refresh_loop.await?;

    Ok(())
}

/// All routes and middleware over the shared state.
pub fn build_router(state: AppState) -> Router {
    let api_base = format!(
        "/apis/{}/{}",
        pkg_constants::api::API_GROUP,
        pkg_constants::api::API_VERSION
    );
    Router::new()
        .route(
            &format!("{}/bulksubjectaccessreviews", api_base),
            post(authorization::create_bulk_review),
        )
        .route(
            &format!("{}/accessiblenamespaces", api_base),
            get(namespaces::list_accessible_namespaces),
        )
        .route(
            &format!("{}/accessiblenamespaces/{{name}}", api_base),
            get(namespaces::get_accessible_namespace),
        )
        .route("/healthz", get(health::healthz))
        .route("/readyz", get(health::readyz))
        .layer(middleware::from_fn(identity_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
