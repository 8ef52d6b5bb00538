use crate::ports::ScriptLoader;
use crate::services::ZoneRouter;
use scriptdns_domain::{DomainError, ZoneConfig, ZoneName};
use std::sync::Arc;
use tracing::{info, warn};

/// Outcome of one reload pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReloadSummary {
    pub reloaded: usize,
    pub failed: usize,
    pub ignored: usize,
}

/// Re-reads every configured zone's script and swaps it in.
///
/// The set of zones is fixed at startup. Zones that appear in or vanish from
/// the new configuration are reported and otherwise left alone.
pub struct ReloadZonesUseCase {
    router: Arc<ZoneRouter>,
    loader: Arc<dyn ScriptLoader>,
}

impl ReloadZonesUseCase {
    pub fn new(router: Arc<ZoneRouter>, loader: Arc<dyn ScriptLoader>) -> Self {
        Self { router, loader }
    }

    pub async fn execute(&self, zones: &[ZoneConfig]) -> Result<ReloadSummary, DomainError> {
        let mut summary = ReloadSummary::default();
        let mut seen = Vec::with_capacity(zones.len());

        for zone in zones {
            let name = ZoneName::parse(&zone.name)?;

            let Some(host) = self.router.get(&name) else {
                warn!(zone = %name, "New zone ignored until restart");
                summary.ignored += 1;
                continue;
            };
            seen.push(name);

            match host.load(self.loader.as_ref(), zone).await {
                Ok(()) => summary.reloaded += 1,
                Err(_) => summary.failed += 1,
            }
        }

        for host in self.router.hosts() {
            if !seen.contains(host.zone()) {
                warn!(zone = %host.zone(), "Zone missing from configuration keeps its current script until restart");
            }
        }

        info!(
            reloaded = summary.reloaded,
            failed = summary.failed,
            ignored = summary.ignored,
            "Zones reloaded"
        );

        Ok(summary)
    }
}
