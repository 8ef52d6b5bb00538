//! scriptdns Domain Layer
pub mod config;
pub mod dns_record;
pub mod dns_request;
pub mod domain_name;
pub mod errors;
pub mod response_draft;
pub mod zone;

pub use config::{CliOverrides, Config, ScriptConfig, ZoneConfig};
pub use dns_record::{DnsRecord, RecordData, RecordType};
pub use dns_request::{DnsRequest, Transport};
pub use domain_name::DomainName;
pub use errors::DomainError;
pub use response_draft::ResponseDraft;
pub use zone::ZoneName;
