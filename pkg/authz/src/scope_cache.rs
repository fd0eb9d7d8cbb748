//! Cache of `(api-group, resource) -> namespaced?` kept loosely fresh
//! against a discovery source.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::discovery::{ApiResourceList, Discovery};

/// Scope lookup table for API resources.
///
/// Unknown keys are reported as cluster-scoped: a false "namespaced" answer
/// would leak the full namespace list to a user whose only grant is a
/// cluster-scoped rule, so lookups fail closed.
///
/// One writer (the refresh loop) and unbounded concurrent readers. The map
/// is published as an immutable `Arc<HashMap>` swapped under a lock, so a
/// reader sees either the full pre-refresh map or the full post-refresh map.
pub struct ResourceScopeCache {
    discovery: Option<Arc<dyn Discovery>>,
    scope_map: RwLock<Arc<HashMap<String, bool>>>,
    refresh_interval: Duration,
    bootstrap_interval: Duration,
}

impl ResourceScopeCache {
    /// Create a cache and perform the initial refresh.
    pub async fn new(discovery: Option<Arc<dyn Discovery>>) -> Self {
        Self::with_intervals(
            discovery,
            Duration::from_secs(pkg_constants::scope::SCOPE_REFRESH_INTERVAL_SECS),
            Duration::from_secs(pkg_constants::scope::SCOPE_BOOTSTRAP_INTERVAL_SECS),
        )
        .await
    }

    pub async fn with_intervals(
        discovery: Option<Arc<dyn Discovery>>,
        refresh_interval: Duration,
        bootstrap_interval: Duration,
    ) -> Self {
        let cache = Self {
            discovery,
            scope_map: RwLock::new(Arc::new(HashMap::new())),
            refresh_interval,
            bootstrap_interval,
        };
        cache.refresh().await;
        cache
    }

    /// Whether `(group, resource)` is a namespaced resource. `true` only for
    /// an explicit `namespaced: true` entry; unknown keys return `false`.
    pub fn is_namespaced(&self, group: &str, resource: &str) -> bool {
        let map = self.snapshot();
        map.get(&scope_key(group, resource)).copied().unwrap_or(false)
    }

    /// Whether any refresh has ever produced a non-empty map. Used by the
    /// readiness probe.
    pub fn has_data(&self) -> bool {
        !self.snapshot().is_empty()
    }

    fn snapshot(&self) -> Arc<HashMap<String, bool>> {
        self.scope_map
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// One refresh pass. Discovery errors never propagate: a refresh that
    /// cannot produce new data leaves the previous map in place.
    pub async fn refresh(&self) {
        let Some(discovery) = &self.discovery else {
            return;
        };

        let lists = match discovery.preferred_resources().await {
            Ok(lists) => lists,
            Err(err) if err.partial.is_empty() => {
                warn!("Scope cache refresh failed, keeping previous map: {}", err);
                return;
            }
            Err(err) => {
                warn!(
                    "Scope cache refresh returned partial results ({} lists): {}",
                    err.partial.len(),
                    err.source
                );
                err.partial
            }
        };

        let map = build_scope_map(&lists);
        if map.is_empty() {
            debug!("Discovery produced no resources, keeping previous scope map");
            return;
        }

        let entries = map.len();
        *self
            .scope_map
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Arc::new(map);
        debug!("Scope cache refreshed: {} resources", entries);
    }

    /// Blocking refresh loop; returns when the stop signal fires. While the
    /// cache has never produced data the shorter bootstrap interval applies.
    pub async fn run_refresh_loop(&self, mut stop: watch::Receiver<()>) {
        info!(
            "Scope cache refresh loop started (refresh={}s, bootstrap={}s)",
            self.refresh_interval.as_secs(),
            self.bootstrap_interval.as_secs()
        );
        loop {
            let wake = if self.has_data() {
                self.refresh_interval
            } else {
                self.refresh_interval.min(self.bootstrap_interval)
            };
            tokio::select! {
                _ = tokio::time::sleep(wake) => self.refresh().await,
                _ = stop.changed() => {
                    info!("Scope cache refresh loop stopping");
                    return;
                }
            }
        }
    }
}

fn scope_key(group: &str, resource: &str) -> String {
    format!("{}/{}", group, resource)
}

fn build_scope_map(lists: &[ApiResourceList]) -> HashMap<String, bool> {
    let mut map = HashMap::new();
    for list in lists {
        // "group/version", or bare "version" for the core group.
        let group = match list.group_version.split_once('/') {
            Some((group, _version)) => group,
            None => "",
        };
        for resource in &list.resources {
            if resource.name.contains('/') {
                continue; // subresource
            }
            map.insert(scope_key(group, &resource.name), resource.namespaced);
        }
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::{ApiResource, DiscoveryError};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockDiscovery {
        lists: Vec<ApiResourceList>,
        error: Option<String>,
        calls: AtomicUsize,
    }

    impl MockDiscovery {
        fn ok(lists: Vec<ApiResourceList>) -> Arc<Self> {
            Arc::new(Self {
                lists,
                error: None,
                calls: AtomicUsize::new(0),
            })
        }

        fn failing(error: &str) -> Arc<Self> {
            Arc::new(Self {
                lists: Vec::new(),
                error: Some(error.into()),
                calls: AtomicUsize::new(0),
            })
        }

        fn partial(lists: Vec<ApiResourceList>, error: &str) -> Arc<Self> {
            Arc::new(Self {
                lists,
                error: Some(error.into()),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl Discovery for MockDiscovery {
        async fn preferred_resources(&self) -> Result<Vec<ApiResourceList>, DiscoveryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.error {
                None => Ok(self.lists.clone()),
                Some(msg) => Err(DiscoveryError::with_partial(
                    self.lists.clone(),
                    anyhow::anyhow!("{}", msg),
                )),
            }
        }
    }

    fn test_resources() -> Vec<ApiResourceList> {
        vec![
            ApiResourceList {
                group_version: "v1".into(),
                resources: vec![
                    ApiResource {
                        name: "pods".into(),
                        namespaced: true,
                    },
                    ApiResource {
                        name: "services".into(),
                        namespaced: true,
                    },
                    ApiResource {
                        name: "pods/log".into(),
                        namespaced: true,
                    },
                    ApiResource {
                        name: "namespaces".into(),
                        namespaced: false,
                    },
                    ApiResource {
                        name: "nodes".into(),
                        namespaced: false,
                    },
                ],
            },
            ApiResourceList {
                group_version: "apps/v1".into(),
                resources: vec![ApiResource {
                    name: "deployments".into(),
                    namespaced: true,
                }],
            },
        ]
    }

    #[tokio::test]
    async fn populated_after_initial_refresh() {
        let cache = ResourceScopeCache::new(Some(MockDiscovery::ok(test_resources()))).await;
        assert!(cache.has_data());
        assert!(cache.is_namespaced("", "pods"));
        assert!(cache.is_namespaced("", "services"));
        assert!(!cache.is_namespaced("", "namespaces"));
        assert!(!cache.is_namespaced("", "nodes"));
        assert!(cache.is_namespaced("apps", "deployments"));
    }

    #[tokio::test]
    async fn unknown_resource_is_cluster_scoped() {
        let cache = ResourceScopeCache::new(Some(MockDiscovery::ok(test_resources()))).await;
        assert!(!cache.is_namespaced("custom.example.com", "widgets"));
        assert!(!cache.is_namespaced("", "widgets"));
    }

    #[tokio::test]
    async fn no_discovery_source_means_empty_cache() {
        let cache = ResourceScopeCache::new(None).await;
        assert!(!cache.has_data());
        assert!(!cache.is_namespaced("", "pods"));
    }

    #[tokio::test]
    async fn subresources_are_skipped() {
        let cache = ResourceScopeCache::new(Some(MockDiscovery::ok(test_resources()))).await;
        assert!(!cache.is_namespaced("", "pods/log"));
    }

    #[tokio::test]
    async fn failed_refresh_preserves_previous_map() {
        let cache = ResourceScopeCache {
            discovery: Some(MockDiscovery::failing("discovery unavailable")),
            scope_map: RwLock::new(Arc::new(HashMap::from([
                ("/pods".to_string(), true),
                ("/namespaces".to_string(), false),
            ]))),
            refresh_interval: Duration::from_secs(300),
            bootstrap_interval: Duration::from_secs(10),
        };

        cache.refresh().await;

        assert!(cache.is_namespaced("", "pods"));
        assert!(!cache.is_namespaced("", "namespaces"));
        assert!(cache.has_data());
    }

    #[tokio::test]
    async fn partial_results_are_adopted() {
        let partial = vec![ApiResourceList {
            group_version: "v1".into(),
            resources: vec![
                ApiResource {
                    name: "pods".into(),
                    namespaced: true,
                },
                ApiResource {
                    name: "nodes".into(),
                    namespaced: false,
                },
            ],
        }];
        let cache =
            ResourceScopeCache::new(Some(MockDiscovery::partial(partial, "partial error"))).await;

        assert!(cache.is_namespaced("", "pods"));
        assert!(!cache.is_namespaced("", "nodes"));
    }

    #[tokio::test]
    async fn empty_result_preserves_previous_map() {
        let cache = ResourceScopeCache {
            discovery: Some(MockDiscovery::ok(Vec::new())),
            scope_map: RwLock::new(Arc::new(HashMap::from([("/pods".to_string(), true)]))),
            refresh_interval: Duration::from_secs(300),
            bootstrap_interval: Duration::from_secs(10),
        };

        cache.refresh().await;
        assert!(cache.is_namespaced("", "pods"));
    }

    #[tokio::test]
    async fn refresh_loop_stops_on_signal() {
        let discovery = MockDiscovery::ok(test_resources());
        let cache = Arc::new(
            ResourceScopeCache::with_intervals(
                Some(discovery.clone()),
                Duration::from_millis(5),
                Duration::from_millis(5),
            )
            .await,
        );

        let (stop_tx, stop_rx) = watch::channel(());
        let looped = {
            let cache = cache.clone();
            tokio::spawn(async move { cache.run_refresh_loop(stop_rx).await })
        };

        tokio::time::sleep(Duration::from_millis(30)).await;
        stop_tx.send(()).unwrap();
        tokio::time::timeout(Duration::from_secs(1), looped)
            .await
            .expect("refresh loop should stop on signal")
            .unwrap();

        // Initial refresh plus at least one loop iteration.
        assert!(discovery.calls.load(Ordering::SeqCst) >= 2);
    }

    #[tokio::test]
    async fn concurrent_readers_see_consistent_maps() {
        let cache = Arc::new(ResourceScopeCache::new(Some(MockDiscovery::ok(test_resources()))).await);

        let mut readers = Vec::new();
        for _ in 0..8 {
            let cache = cache.clone();
            readers.push(tokio::spawn(async move {
                for _ in 0..500 {
                    // pods and services are inserted together; a reader must
                    // never see one without the other.
                    let pods = cache.is_namespaced("", "pods");
                    let services = cache.is_namespaced("", "services");
                    assert_eq!(pods, services);
                }
            }));
        }
        let writer = {
            let cache = cache.clone();
            tokio::spawn(async move {
                for _ in 0..50 {
                    cache.refresh().await;
                }
            })
        };

        for handle in readers {
            handle.await.unwrap();
        }
        writer.await.unwrap();
    }
}
