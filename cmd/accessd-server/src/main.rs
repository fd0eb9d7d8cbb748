use clap::Parser;
use pkg_api::server::{ServerConfig, start_server};
use pkg_types::config::{ServerConfigFile, load_config_file};
use std::net::SocketAddr;
use std::time::Duration;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "accessd-server", about = "aggregated authorization API server")]
struct Cli {
    /// Path to YAML config file
    #[arg(long, short, default_value = pkg_constants::paths::DEFAULT_SERVER_CONFIG)]
    config: String,

    /// Port to listen on
    #[arg(long)]
    port: Option<u16>,

    /// Directory for SlateDB state storage
    #[arg(long)]
    data_dir: Option<String>,

    /// URL serving the preferred-resources list for the scope cache
    #[arg(long)]
    discovery_url: Option<String>,

    /// Steady-state scope cache refresh period, in seconds
    #[arg(long)]
    refresh_interval_secs: Option<u64>,

    /// Scope cache refresh period while empty, in seconds
    #[arg(long)]
    bootstrap_interval_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    // Load config file (returns defaults if file not found)
    let file_cfg: ServerConfigFile = load_config_file(&cli.config)?;
    info!("Config file: {}", cli.config);

    // Merge: CLI args > config file > defaults
    let port = cli
        .port
        .or(file_cfg.port)
        .unwrap_or(pkg_constants::api::DEFAULT_API_PORT);
    let data_dir = cli
        .data_dir
        .or(file_cfg.data_dir)
        .unwrap_or_else(|| pkg_constants::paths::DEFAULT_SERVER_DATA_DIR.to_string());
    let discovery_url = cli.discovery_url.or(file_cfg.discovery_url);
    let refresh_interval = Duration::from_secs(
        cli.refresh_interval_secs
            .or(file_cfg.refresh_interval_secs)
            .unwrap_or(pkg_constants::scope::SCOPE_REFRESH_INTERVAL_SECS),
    );
    let bootstrap_interval = Duration::from_secs(
        cli.bootstrap_interval_secs
            .or(file_cfg.bootstrap_interval_secs)
            .unwrap_or(pkg_constants::scope::SCOPE_BOOTSTRAP_INTERVAL_SECS),
    );

    info!("Starting accessd-server");
    info!("  Port:           {}", port);
    info!("  Data dir:       {}", data_dir);
    match &discovery_url {
        Some(url) => info!("  Discovery URL:  {}", url),
        None => info!("  Discovery URL:  (none, scope cache disabled)"),
    }

    let config = ServerConfig {
        addr: SocketAddr::from(([0, 0, 0, 0], port)),
        data_dir,
        discovery_url,
        refresh_interval,
        bootstrap_interval,
    };

    start_server(config).await?;

    Ok(())
}
