#![allow(dead_code)]

use scriptdns_application::services::{ScriptHost, ZoneRouter};
use scriptdns_application::use_cases::HandleDnsQueryUseCase;
use scriptdns_domain::config::ScriptingConfig;
use scriptdns_domain::{ScriptConfig, ZoneConfig, ZoneName};
use scriptdns_infrastructure::dns::DnsServerHandler;
use scriptdns_infrastructure::scripting::RhaiScriptLoader;
use std::sync::Arc;
use std::time::Duration;

pub const ROUND_ROBIN: &str = r#"
fn init(config) {
    this.prefixes = config.prefixes;
    this.last_index = 0;
}

fn onRequest(request, response) {
    if this.last_index >= this.prefixes.len() {
        this.last_index = 0;
    }
    let prefix = this.prefixes[this.last_index];
    this.last_index += 1;
    response.addCName(`${prefix}.example.com`);
    response.setTTL(20);
}
"#;

pub const FAIL_ON_DEMAND: &str = r#"
fn onRequest(request, response) {
    if request.name.starts_with("fail.") {
        throw "asked to fail";
    }
    if request.name.starts_with("slow.") {
        loop { }
    }
    response.addA("192.0.2.1");
}
"#;

pub const MANY_ANSWERS: &str = r#"
fn onRequest(request, response) {
    for i in 0..40 {
        response.addA(`10.0.0.${i}`);
    }
}
"#;

pub fn prefixes(values: &[&str]) -> ScriptConfig {
    let mut table = ScriptConfig::new();
    table.insert(
        "prefixes".to_string(),
        toml::Value::Array(values.iter().map(|v| toml::Value::String(v.to_string())).collect()),
    );
    table
}

pub struct TestZone {
    pub name: &'static str,
    pub source: &'static str,
    pub config: ScriptConfig,
    pub fallback: Option<(&'static str, u32)>,
}

impl TestZone {
    pub fn new(name: &'static str, source: &'static str) -> Self {
        Self {
            name,
            source,
            config: ScriptConfig::new(),
            fallback: None,
        }
    }

    pub fn with_config(mut self, config: ScriptConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_fallback(mut self, cname: &'static str, ttl: u32) -> Self {
        self.fallback = Some((cname, ttl));
        self
    }
}

pub fn limits(budget: Duration) -> ScriptingConfig {
    ScriptingConfig {
        execution_timeout_ms: budget.as_millis() as u64,
        max_operations: 0,
        ..ScriptingConfig::default()
    }
}

/// Writes each zone's script to a temporary directory and loads it through
/// the real loader.
pub async fn build_router(zones: Vec<TestZone>, budget: Duration) -> Arc<ZoneRouter> {
    let dir = tempfile::tempdir().unwrap();
    let loader = RhaiScriptLoader::new(limits(budget));
    let mut hosts = Vec::new();

    for (index, zone) in zones.into_iter().enumerate() {
        let path = dir.path().join(format!("zone{}.rhai", index));
        std::fs::write(&path, zone.source).unwrap();
        let mut config = ZoneConfig::new(zone.name, path).with_config(zone.config);
        if let Some((cname, ttl)) = zone.fallback {
            config = config.with_fallback(cname, ttl);
        }

        let host = Arc::new(ScriptHost::new(
            ZoneName::parse(zone.name).unwrap(),
            budget,
            300,
        ));
        host.load(&loader, &config).await.unwrap();
        hosts.push(host);
    }

    Arc::new(ZoneRouter::new(hosts))
}

pub async fn build_handler(zones: Vec<TestZone>, budget: Duration) -> DnsServerHandler {
    build_handler_with_timeout(zones, budget, Duration::from_secs(2)).await
}

pub async fn build_handler_with_timeout(
    zones: Vec<TestZone>,
    budget: Duration,
    query_timeout: Duration,
) -> DnsServerHandler {
    let router = build_router(zones, budget).await;
    let use_case = Arc::new(HandleDnsQueryUseCase::new(router, query_timeout));
    DnsServerHandler::new(use_case, 1232)
}
