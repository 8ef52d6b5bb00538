use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Free-form table handed to the script's `init`.
pub type ScriptConfig = toml::Table;

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ZoneConfig {
    /// Zone suffix, or `.` for every name.
    pub name: String,

    pub script: PathBuf,

    #[serde(default)]
    pub config: ScriptConfig,

    /// Answered as a CNAME when the script fails or runs out of time.
    #[serde(default)]
    pub fallback_cname: Option<String>,

    #[serde(default = "default_fallback_ttl")]
    pub fallback_ttl: u32,
}

fn default_fallback_ttl() -> u32 {
    DEFAULT_FALLBACK_TTL
}

pub const DEFAULT_FALLBACK_TTL: u32 = 20;

impl ZoneConfig {
    pub fn new(name: impl Into<String>, script: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            script: script.into(),
            config: ScriptConfig::new(),
            fallback_cname: None,
            fallback_ttl: DEFAULT_FALLBACK_TTL,
        }
    }

    pub fn with_config(mut self, config: ScriptConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_fallback(mut self, cname: impl Into<String>, ttl: u32) -> Self {
        self.fallback_cname = Some(cname.into());
        self.fallback_ttl = ttl;
        self
    }

    pub fn script_name(&self) -> String {
        self.script
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.script.display().to_string())
    }
}
