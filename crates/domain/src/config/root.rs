use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::errors::ConfigError;
use super::logging::LoggingConfig;
use super::scripting::ScriptingConfig;
use super::server::ServerConfig;
use super::zones::ZoneConfig;
use crate::domain_name::DomainName;
use crate::zone::ZoneName;

const LOCAL_CONFIG_PATH: &str = "scriptdns.toml";
const SYSTEM_CONFIG_PATH: &str = "/etc/scriptdns/config.toml";

/// Main configuration structure for scriptdns
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Sockets, worker pool and timeouts
    #[serde(default)]
    pub server: ServerConfig,

    /// Script engine limits
    #[serde(default)]
    pub scripting: ScriptingConfig,

    /// Zones and the scripts that own them
    #[serde(default)]
    pub zones: Vec<ZoneConfig>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file or use defaults
    ///
    /// Priority order:
    /// 1. Explicitly provided path
    /// 2. scriptdns.toml in current directory
    /// 3. /etc/scriptdns/config.toml
    /// 4. Default configuration
    pub fn load(path: Option<&str>, cli_overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = match path.map(str::to_string).or_else(Self::get_config_path) {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };

        config.apply_cli_overrides(cli_overrides);
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(port) = overrides.dns_port {
            self.server.dns_port = port;
        }
        if let Some(bind) = overrides.bind_address {
            self.server.bind_address = bind;
        }
        if let Some(workers) = overrides.workers {
            self.server.workers = workers;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.dns_port == 0 {
            return Err(ConfigError::Validation("DNS port cannot be 0".to_string()));
        }
        if self.server.workers == 0 {
            return Err(ConfigError::Validation(
                "At least one worker is required".to_string(),
            ));
        }
        if self.server.queue_depth == 0 {
            return Err(ConfigError::Validation(
                "Queue depth cannot be 0".to_string(),
            ));
        }
        if self.server.query_timeout_ms == 0 || self.scripting.execution_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "Timeouts must be greater than 0".to_string(),
            ));
        }
        if self.server.udp_max_payload < 512 {
            return Err(ConfigError::Validation(format!(
                "udp_max_payload must be at least 512 (got {})",
                self.server.udp_max_payload
            )));
        }

        let mut seen = HashSet::new();
        for zone in &self.zones {
            let name = ZoneName::parse(&zone.name).map_err(|e| {
                ConfigError::Validation(format!("Zone '{}': {}", zone.name, e))
            })?;
            if !seen.insert(name) {
                return Err(ConfigError::Validation(format!(
                    "Zone '{}' is configured more than once",
                    zone.name
                )));
            }
            if zone.script.as_os_str().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "Zone '{}' has no script",
                    zone.name
                )));
            }
            if let Some(cname) = &zone.fallback_cname {
                DomainName::parse(cname).map_err(|e| {
                    ConfigError::Validation(format!(
                        "Zone '{}': fallback_cname: {}",
                        zone.name, e
                    ))
                })?;
            }
            if zone.fallback_ttl > i32::MAX as u32 {
                return Err(ConfigError::Validation(format!(
                    "Zone '{}': fallback_ttl {} is out of range",
                    zone.name, zone.fallback_ttl
                )));
            }
        }

        Ok(())
    }

    /// Get the path to the configuration file being used
    pub fn get_config_path() -> Option<String> {
        [LOCAL_CONFIG_PATH, SYSTEM_CONFIG_PATH]
            .into_iter()
            .find(|p| std::path::Path::new(p).exists())
            .map(str::to_string)
    }
}

/// Command-line overrides for configuration
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub dns_port: Option<u16>,
    pub bind_address: Option<String>,
    pub workers: Option<usize>,
    pub log_level: Option<String>,
}
