use crate::services::ZoneRouter;
use scriptdns_domain::{DnsRequest, DomainError, ResponseDraft};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

pub struct HandleDnsQueryUseCase {
    router: Arc<ZoneRouter>,
    query_timeout: Duration,
}

impl HandleDnsQueryUseCase {
    pub fn new(router: Arc<ZoneRouter>, query_timeout: Duration) -> Self {
        Self {
            router,
            query_timeout,
        }
    }

    /// Routes the query to its zone's script and returns the filled draft.
    ///
    /// `NxDomain` when no zone covers the name. A zone with a fallback CNAME
    /// answers it whenever its script fails or times out. Every other error
    /// means the answer must be SERVFAIL; the zone stays usable for later
    /// queries.
    pub async fn execute(&self, request: &DnsRequest) -> Result<ResponseDraft, DomainError> {
        let start = Instant::now();

        let Some(host) = self.router.route(&request.domain) else {
            debug!(
                domain = %request.domain,
                record_type = %request.record_type,
                client = %request.client_addr,
                "No zone for query"
            );
            return Err(DomainError::NxDomain);
        };

        let result = match tokio::time::timeout(self.query_timeout, host.invoke(request)).await {
            Ok(result) => result,
            Err(_) => Err(DomainError::QueryTimeout),
        };

        match result {
            Ok(draft) => {
                debug!(
                    zone = %host.zone(),
                    script = %host.script_name(),
                    domain = %request.domain,
                    record_type = %request.record_type,
                    client = %request.client_addr,
                    answers = draft.len(),
                    ttl = draft.ttl(),
                    elapsed_us = start.elapsed().as_micros() as u64,
                    "Script answered query"
                );
                Ok(draft)
            }
            Err(e) => match host.fallback() {
                Some(fallback) => {
                    warn!(
                        zone = %host.zone(),
                        script = %host.script_name(),
                        domain = %request.domain,
                        record_type = %request.record_type,
                        client = %request.client_addr,
                        transport = %request.transport,
                        error = %e,
                        ttl = fallback.ttl(),
                        "Script failed, answering fallback CNAME"
                    );
                    Ok(fallback)
                }
                None => {
                    warn!(
                        zone = %host.zone(),
                        script = %host.script_name(),
                        domain = %request.domain,
                        record_type = %request.record_type,
                        client = %request.client_addr,
                        transport = %request.transport,
                        error = %e,
                        "Script failed, answering SERVFAIL"
                    );
                    Err(e)
                }
            },
        }
    }
}
