//! Discovery source for the resource-scope cache.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One resource entry as reported by discovery. A name containing `/` is a
/// subresource and is ignored by the scope cache.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResource {
    pub name: String,
    #[serde(default)]
    pub namespaced: bool,
}

/// Preferred resources of one `group/version` (or bare `version` for the
/// core group).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResourceList {
    pub group_version: String,
    #[serde(default)]
    pub resources: Vec<ApiResource>,
}

/// Discovery failure. `partial` carries whatever resource lists the source
/// managed to produce before failing; the scope cache adopts non-empty
/// partial results.
pub struct DiscoveryError {
    pub partial: Vec<ApiResourceList>,
    pub source: anyhow::Error,
}

impl DiscoveryError {
    pub fn new(source: anyhow::Error) -> Self {
        Self {
            partial: Vec::new(),
            source,
        }
    }

    pub fn with_partial(partial: Vec<ApiResourceList>, source: anyhow::Error) -> Self {
        Self { partial, source }
    }
}

impl fmt::Display for DiscoveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "discovery failed: {}", self.source)
    }
}

impl fmt::Debug for DiscoveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DiscoveryError {{ partial_lists: {}, source: {:?} }}",
            self.partial.len(),
            self.source
        )
    }
}

impl std::error::Error for DiscoveryError {}

/// The single call the scope cache makes against a discovery source.
#[async_trait]
pub trait Discovery: Send + Sync {
    async fn preferred_resources(&self) -> Result<Vec<ApiResourceList>, DiscoveryError>;
}

/// Discovery over HTTP: fetches the preferred-resources list as JSON from a
/// single URL (typically the upstream apiserver's resource-list endpoint).
pub struct HttpDiscovery {
    client: reqwest::Client,
    url: String,
}

impl HttpDiscovery {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl Discovery for HttpDiscovery {
    async fn preferred_resources(&self) -> Result<Vec<ApiResourceList>, DiscoveryError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| DiscoveryError::new(e.into()))?;
        let response = response
            .error_for_status()
            .map_err(|e| DiscoveryError::new(e.into()))?;
        response
            .json::<Vec<ApiResourceList>>()
            .await
            .map_err(|e| DiscoveryError::new(e.into()))
    }
}
