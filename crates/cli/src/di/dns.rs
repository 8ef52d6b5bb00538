use super::Zones;
use scriptdns_application::use_cases::HandleDnsQueryUseCase;
use scriptdns_domain::Config;
use scriptdns_infrastructure::dns::{DnsServerHandler, ServerOptions};
use std::sync::Arc;
use tracing::info;

pub struct DnsServices {
    pub handler: DnsServerHandler,
    pub options: ServerOptions,
}

impl DnsServices {
    pub fn new(config: &Config, zones: &Zones) -> Self {
        let use_case = Arc::new(HandleDnsQueryUseCase::new(
            Arc::clone(&zones.router),
            config.server.query_timeout(),
        ));

        info!(
            query_timeout_ms = config.server.query_timeout_ms,
            script_budget_ms = config.scripting.execution_timeout_ms,
            udp_max_payload = config.server.udp_max_payload,
            "DNS services initialized"
        );

        Self {
            handler: DnsServerHandler::new(use_case, config.server.udp_max_payload),
            options: ServerOptions::from(&config.server),
        }
    }
}
