use clap::Parser;
use scriptdns_domain::CliOverrides;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

mod bootstrap;
mod di;
mod server;

#[derive(Parser)]
#[command(name = "scriptdns")]
#[command(version)]
#[command(about = "scriptdns - DNS server whose answers come from per-zone scripts")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<String>,

    /// DNS server port
    #[arg(short = 'd', long)]
    dns_port: Option<u16>,

    /// Bind address
    #[arg(short = 'b', long)]
    bind: Option<String>,

    /// Number of query workers
    #[arg(short = 'w', long)]
    workers: Option<usize>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Load the configuration and every script, then exit
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cli_overrides = CliOverrides {
        dns_port: cli.dns_port,
        bind_address: cli.bind.clone(),
        workers: cli.workers,
        log_level: cli.log_level.clone(),
    };

    let config = bootstrap::load_config(cli.config.as_deref(), cli_overrides)?;

    bootstrap::init_logging(&config);

    info!("Starting scriptdns v{}", env!("CARGO_PKG_VERSION"));

    let zones = di::Zones::load(&config).await?;

    if cli.check {
        zones.unload_all().await;
        if !zones.unavailable.is_empty() {
            anyhow::bail!(
                "{} zone(s) failed to load: {}",
                zones.unavailable.len(),
                zones.unavailable.join(", ")
            );
        }
        info!(zones = config.zones.len(), "Configuration and scripts are valid");
        return Ok(());
    }

    let shutdown = CancellationToken::new();

    let reload_task = server::spawn_reload_on_hangup(
        bootstrap::config::reload_path(cli.config.as_deref()),
        zones.reload_use_case(),
        shutdown.clone(),
    );

    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        server::shutdown_signal().await;
        info!("Shutdown signal received, draining");
        signal_token.cancel();
    });

    let dns_addr = format!("{}:{}", config.server.bind_address, config.server.dns_port);
    let dns_services = di::DnsServices::new(&config, &zones);

    let result = server::start_dns_server(dns_addr, dns_services, shutdown.clone()).await;
    if let Err(e) = &result {
        error!(error = %e, "DNS server error");
    }

    shutdown.cancel();
    let _ = reload_task.await;
    zones.unload_all().await;

    info!("Server shutdown complete");
    result
}
