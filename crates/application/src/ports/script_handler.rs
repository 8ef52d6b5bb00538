use scriptdns_domain::{DnsRequest, DomainError, ResponseDraft, ScriptConfig, ZoneConfig};
use std::time::Duration;

/// One loaded user script and the Handler State it owns.
///
/// Calls are blocking and never concurrent for the same instance; the
/// `ScriptHost` serializes them. `budget` is the wall-clock time the call may
/// use; implementations that can interrupt themselves should stop and return
/// `DomainError::ScriptTimeout` once it is spent.
pub trait ScriptHandler: Send {
    /// Runs load-time code and the script's `init(config)`, replacing any
    /// previous Handler State.
    fn init(&mut self, config: &ScriptConfig, budget: Duration) -> Result<(), DomainError>;

    /// Runs `onRequest(request, response)` for one query.
    fn on_request(
        &mut self,
        request: &DnsRequest,
        response: &mut ResponseDraft,
        budget: Duration,
    ) -> Result<(), DomainError>;
}

/// Compiles the script configured for a zone.
pub trait ScriptLoader: Send + Sync {
    fn load(&self, zone: &ZoneConfig) -> Result<Box<dyn ScriptHandler>, DomainError>;
}
