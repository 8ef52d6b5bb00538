//! Configuration module for scriptdns
//!
//! This module contains all configuration structures organized by domain:
//! - `root`: Main configuration and CLI overrides
//! - `server`: Listening sockets, worker pool and timeouts
//! - `scripting`: Script engine limits and defaults
//! - `zones`: Zone to script mapping
//! - `logging`: Logging settings
//! - `errors`: Configuration errors

pub mod errors;
pub mod logging;
pub mod root;
pub mod scripting;
pub mod server;
pub mod zones;

pub use errors::ConfigError;
pub use logging::{LogFormat, LoggingConfig};
pub use root::{CliOverrides, Config};
pub use scripting::ScriptingConfig;
pub use server::ServerConfig;
pub use zones::{ScriptConfig, ZoneConfig, DEFAULT_FALLBACK_TTL};
