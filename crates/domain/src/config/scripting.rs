use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScriptingConfig {
    /// Wall-clock budget for one `init` or `onRequest` call.
    #[serde(default = "default_execution_timeout_ms")]
    pub execution_timeout_ms: u64,

    /// Operation budget per call, 0 disables the limit.
    #[serde(default = "default_max_operations")]
    pub max_operations: u64,

    #[serde(default = "default_max_call_levels")]
    pub max_call_levels: usize,

    #[serde(default = "default_max_string_size")]
    pub max_string_size: usize,

    #[serde(default = "default_max_array_size")]
    pub max_array_size: usize,

    #[serde(default = "default_max_map_size")]
    pub max_map_size: usize,

    /// TTL of a fresh response draft until the script calls `setTTL`.
    #[serde(default = "default_ttl")]
    pub default_ttl: u32,
}

impl ScriptingConfig {
    pub fn execution_timeout(&self) -> Duration {
        Duration::from_millis(self.execution_timeout_ms)
    }
}

impl Default for ScriptingConfig {
    fn default() -> Self {
        Self {
            execution_timeout_ms: default_execution_timeout_ms(),
            max_operations: default_max_operations(),
            max_call_levels: default_max_call_levels(),
            max_string_size: default_max_string_size(),
            max_array_size: default_max_array_size(),
            max_map_size: default_max_map_size(),
            default_ttl: default_ttl(),
        }
    }
}

fn default_execution_timeout_ms() -> u64 {
    500
}

fn default_max_operations() -> u64 {
    1_000_000
}

fn default_max_call_levels() -> usize {
    32
}

fn default_max_string_size() -> usize {
    65_536
}

fn default_max_array_size() -> usize {
    10_000
}

fn default_max_map_size() -> usize {
    10_000
}

fn default_ttl() -> u32 {
    300
}
