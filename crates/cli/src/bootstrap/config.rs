use scriptdns_domain::{CliOverrides, Config};
use tracing::info;

pub fn load_config(config_path: Option<&str>, cli_overrides: CliOverrides) -> anyhow::Result<Config> {
    let config = Config::load(config_path, cli_overrides)?;
    config.validate()?;

    info!(
        config_file = config_path.unwrap_or("default"),
        dns_port = config.server.dns_port,
        bind = %config.server.bind_address,
        zones = config.zones.len(),
        "Configuration loaded"
    );

    Ok(config)
}

/// Path re-read on SIGHUP: the one given on the command line, else the first
/// default location that exists.
pub fn reload_path(config_path: Option<&str>) -> Option<String> {
    config_path.map(str::to_string).or_else(Config::get_config_path)
}
