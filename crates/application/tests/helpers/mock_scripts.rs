#![allow(dead_code)]

use scriptdns_application::ports::{ScriptHandler, ScriptLoader};
use scriptdns_application::services::ScriptHost;
use scriptdns_domain::{
    DnsRequest, DomainError, DomainName, RecordType, ResponseDraft, ScriptConfig, Transport,
    ZoneConfig, ZoneName,
};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const CLIENT: &str = "192.168.1.100:53000";

pub fn request(domain: &str) -> DnsRequest {
    request_typed(domain, RecordType::A)
}

pub fn request_typed(domain: &str, record_type: RecordType) -> DnsRequest {
    let client: SocketAddr = CLIENT.parse().unwrap();
    DnsRequest::new(
        0x1234,
        DomainName::parse(domain).unwrap(),
        record_type,
        client,
        Transport::Udp,
    )
}

pub fn prefixes_config(prefixes: &[&str]) -> ScriptConfig {
    let mut table = ScriptConfig::new();
    table.insert(
        "prefixes".to_string(),
        toml::Value::Array(
            prefixes
                .iter()
                .map(|p| toml::Value::String(p.to_string()))
                .collect(),
        ),
    );
    table
}

pub fn zone(name: &str, prefixes: &[&str]) -> ZoneConfig {
    ZoneConfig::new(name, format!("{}.rhai", name.trim_matches('.'))).with_config(prefixes_config(prefixes))
}

pub async fn loaded_host(
    loader: &MockScriptLoader,
    zone: &ZoneConfig,
    budget: Duration,
) -> Arc<ScriptHost> {
    let host = Arc::new(ScriptHost::new(
        ZoneName::parse(&zone.name).unwrap(),
        budget,
        300,
    ));
    host.load(loader, zone).await.unwrap();
    host
}

/// Shared observations across every handler built by one loader.
#[derive(Default)]
pub struct HandlerStats {
    pub in_flight: AtomicUsize,
    pub overlapped: AtomicBool,
    pub init_calls: AtomicUsize,
}

/// Native stand-in for a compiled script.
///
/// The first label of the query name picks the behaviour:
/// `fail`, `panic`, `slow`, `count` and `bad`; anything else gets a
/// round-robin CNAME over the configured prefixes with TTL 20.
pub struct MockHandler {
    stats: Arc<HandlerStats>,
    prefixes: Vec<String>,
    last_index: usize,
    counter: u64,
    slow: Duration,
}

impl MockHandler {
    fn enter(&self) {
        if self.stats.in_flight.fetch_add(1, Ordering::SeqCst) > 0 {
            self.stats.overlapped.store(true, Ordering::SeqCst);
        }
    }

    fn leave(&self) {
        self.stats.in_flight.fetch_sub(1, Ordering::SeqCst);
    }

    fn respond(&mut self, request: &DnsRequest, response: &mut ResponseDraft) -> Result<(), DomainError> {
        let first = request.domain.labels().next().unwrap_or_default();
        match first {
            "fail" => Err(DomainError::ScriptExecution {
                script: "mock.rhai".to_string(),
                reason: "asked to fail".to_string(),
            }),
            "panic" => panic!("asked to panic"),
            "slow" => {
                std::thread::sleep(self.slow);
                response.add_a("10.0.0.1")
            }
            "count" => {
                let seen = self.counter;
                std::thread::sleep(Duration::from_millis(5));
                self.counter = seen + 1;
                response.add_txt(&seen.to_string())
            }
            "bad" => response.add_cname("not a name!"),
            _ => {
                if self.last_index >= self.prefixes.len() {
                    self.last_index = 0;
                }
                let prefix = &self.prefixes[self.last_index];
                self.last_index += 1;
                response.add_cname(&format!("{}.example.com", prefix))?;
                response.set_ttl(20)
            }
        }
    }
}

impl ScriptHandler for MockHandler {
    fn init(&mut self, config: &ScriptConfig, _budget: Duration) -> Result<(), DomainError> {
        self.stats.init_calls.fetch_add(1, Ordering::SeqCst);

        if config.get("fail_init").and_then(|v| v.as_bool()) == Some(true) {
            return Err(DomainError::ScriptExecution {
                script: "mock.rhai".to_string(),
                reason: "init refused".to_string(),
            });
        }
        if let Some(ms) = config.get("slow_ms").and_then(|v| v.as_integer()) {
            self.slow = Duration::from_millis(ms as u64);
        }
        if let Some(ms) = config.get("init_sleep_ms").and_then(|v| v.as_integer()) {
            std::thread::sleep(Duration::from_millis(ms as u64));
        }

        self.prefixes = config
            .get("prefixes")
            .and_then(|v| v.as_array())
            .map(|values| {
                values
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_else(|| vec!["default".to_string()]);
        self.last_index = 0;
        self.counter = 0;
        Ok(())
    }

    fn on_request(
        &mut self,
        request: &DnsRequest,
        response: &mut ResponseDraft,
        _budget: Duration,
    ) -> Result<(), DomainError> {
        self.enter();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            self.respond(request, response)
        }));
        self.leave();
        match result {
            Ok(result) => result,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }
}

pub struct MockScriptLoader {
    pub stats: Arc<HandlerStats>,
    fail_compile: AtomicBool,
    loads: AtomicUsize,
}

impl MockScriptLoader {
    pub fn new() -> Self {
        Self {
            stats: Arc::new(HandlerStats::default()),
            fail_compile: AtomicBool::new(false),
            loads: AtomicUsize::new(0),
        }
    }

    pub fn set_fail_compile(&self, fail: bool) {
        self.fail_compile.store(fail, Ordering::SeqCst);
    }

    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl ScriptLoader for MockScriptLoader {
    fn load(&self, zone: &ZoneConfig) -> Result<Box<dyn ScriptHandler>, DomainError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if self.fail_compile.load(Ordering::SeqCst) {
            return Err(DomainError::ScriptLoad {
                script: zone.script_name(),
                reason: "syntax error".to_string(),
            });
        }
        Ok(Box::new(MockHandler {
            stats: Arc::clone(&self.stats),
            prefixes: Vec::new(),
            last_index: 0,
            counter: 0,
            slow: Duration::from_millis(300),
        }))
    }
}
