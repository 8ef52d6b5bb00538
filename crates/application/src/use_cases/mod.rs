pub mod config;
pub mod dns;

pub use config::{ReloadSummary, ReloadZonesUseCase};
pub use dns::HandleDnsQueryUseCase;
