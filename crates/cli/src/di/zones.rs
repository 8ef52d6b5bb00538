use scriptdns_application::ports::ScriptLoader;
use scriptdns_application::services::{ScriptHost, ZoneRouter};
use scriptdns_application::use_cases::ReloadZonesUseCase;
use scriptdns_domain::{Config, ZoneName};
use scriptdns_infrastructure::scripting::RhaiScriptLoader;
use std::sync::Arc;
use tracing::{info, warn};

/// Script hosts for every configured zone, with the router over them.
pub struct Zones {
    pub router: Arc<ZoneRouter>,
    pub loader: Arc<dyn ScriptLoader>,
    /// Zones whose script did not load; they answer SERVFAIL.
    pub unavailable: Vec<String>,
}

impl Zones {
    pub async fn load(config: &Config) -> anyhow::Result<Self> {
        let loader: Arc<dyn ScriptLoader> = Arc::new(RhaiScriptLoader::new(config.scripting.clone()));
        let budget = config.scripting.execution_timeout();
        let mut hosts = Vec::with_capacity(config.zones.len());
        let mut unavailable = Vec::new();

        for zone in &config.zones {
            let name = ZoneName::parse(&zone.name)?;
            let host = Arc::new(ScriptHost::new(name, budget, config.scripting.default_ttl));
            if host.load(loader.as_ref(), zone).await.is_err() {
                unavailable.push(zone.name.clone());
            }
            hosts.push(host);
        }

        if hosts.is_empty() {
            warn!("No zones configured, every query will get NXDOMAIN");
        }
        info!(
            zones = hosts.len(),
            unavailable = unavailable.len(),
            "Zones loaded"
        );

        Ok(Self {
            router: Arc::new(ZoneRouter::new(hosts)),
            loader,
            unavailable,
        })
    }

    pub fn reload_use_case(&self) -> Arc<ReloadZonesUseCase> {
        Arc::new(ReloadZonesUseCase::new(
            Arc::clone(&self.router),
            Arc::clone(&self.loader),
        ))
    }

    /// Tears down every Handler State after the server has drained.
    pub async fn unload_all(&self) {
        for host in self.router.hosts() {
            host.unload().await;
        }
    }
}
