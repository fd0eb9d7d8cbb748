use serde::{Deserialize, Serialize};

/// Server configuration file (YAML).
///
/// Example `config.yaml`:
/// ```yaml
/// port: 8443
/// data-dir: /var/lib/accessd/data
/// discovery-url: http://127.0.0.1:6443/api/v1/resourcelists
/// refresh-interval-secs: 300
/// bootstrap-interval-secs: 10
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfigFile {
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default, alias = "data-dir")]
    pub data_dir: Option<String>,
    /// URL serving the preferred-resources list for the scope cache.
    #[serde(default, alias = "discovery-url")]
    pub discovery_url: Option<String>,
    #[serde(default, alias = "refresh-interval-secs")]
    pub refresh_interval_secs: Option<u64>,
    #[serde(default, alias = "bootstrap-interval-secs")]
    pub bootstrap_interval_secs: Option<u64>,
}

/// Load a YAML config file, returning the default if the file doesn't exist.
pub fn load_config_file<T: serde::de::DeserializeOwned + Default>(path: &str) -> anyhow::Result<T> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(T::default());
        }
        Err(e) => return Err(e.into()),
    };
    let config: T = serde_yaml::from_str(&content)?;
    Ok(config)
}
