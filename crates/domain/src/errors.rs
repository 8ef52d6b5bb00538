use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid domain name: {0}")]
    InvalidDomainName(String),

    #[error("Invalid TTL: {0} (must be between 0 and 2147483647)")]
    InvalidTtl(i64),

    #[error("Invalid IP address: {0}")]
    InvalidIpAddress(String),

    #[error("Invalid record data: {0}")]
    InvalidRecordData(String),

    #[error("Malformed DNS packet: {0}")]
    MalformedPacket(String),

    #[error("Domain not found (NXDOMAIN)")]
    NxDomain,

    #[error("Query timeout")]
    QueryTimeout,

    #[error("Failed to load script {script}: {reason}")]
    ScriptLoad { script: String, reason: String },

    #[error("Script {script} failed: {reason}")]
    ScriptExecution { script: String, reason: String },

    #[error("Script {script} exceeded its execution time budget")]
    ScriptTimeout { script: String },

    #[error("Zone {0} is unavailable")]
    ZoneUnavailable(String),
}
