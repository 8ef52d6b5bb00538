use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    #[serde(default = "default_dns_port")]
    pub dns_port: u16,

    /// Number of tasks pulling queries from the shared queue.
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Queries waiting for a worker before UDP datagrams are dropped.
    #[serde(default = "default_queue_depth")]
    pub queue_depth: usize,

    /// Upper bound for one query, including the wait for its script.
    #[serde(default = "default_query_timeout_ms")]
    pub query_timeout_ms: u64,

    #[serde(default = "default_drain_timeout_ms")]
    pub drain_timeout_ms: u64,

    /// Largest UDP response we are willing to send to EDNS clients.
    #[serde(default = "default_udp_max_payload")]
    pub udp_max_payload: u16,

    #[serde(default = "default_tcp_idle_timeout_secs")]
    pub tcp_idle_timeout_secs: u64,
}

impl ServerConfig {
    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }

    pub fn drain_timeout(&self) -> Duration {
        Duration::from_millis(self.drain_timeout_ms)
    }

    pub fn tcp_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.tcp_idle_timeout_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            dns_port: default_dns_port(),
            workers: default_workers(),
            queue_depth: default_queue_depth(),
            query_timeout_ms: default_query_timeout_ms(),
            drain_timeout_ms: default_drain_timeout_ms(),
            udp_max_payload: default_udp_max_payload(),
            tcp_idle_timeout_secs: default_tcp_idle_timeout_secs(),
        }
    }
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_dns_port() -> u16 {
    53
}

fn default_workers() -> usize {
    4
}

fn default_queue_depth() -> usize {
    1024
}

fn default_query_timeout_ms() -> u64 {
    2000
}

fn default_drain_timeout_ms() -> u64 {
    5000
}

fn default_udp_max_payload() -> u16 {
    1232
}

fn default_tcp_idle_timeout_secs() -> u64 {
    10
}
