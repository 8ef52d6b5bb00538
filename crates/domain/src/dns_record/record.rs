use super::RecordType;
use crate::domain_name::DomainName;
use std::net::{Ipv4Addr, Ipv6Addr};

/// Typed RDATA of the records a script can add to a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordData {
    A(Ipv4Addr),
    AAAA(Ipv6Addr),
    CNAME(DomainName),
    NS(DomainName),
    PTR(DomainName),
    MX { preference: u16, exchange: DomainName },
    TXT(String),
}

impl RecordData {
    pub fn record_type(&self) -> RecordType {
        match self {
            RecordData::A(_) => RecordType::A,
            RecordData::AAAA(_) => RecordType::AAAA,
            RecordData::CNAME(_) => RecordType::CNAME,
            RecordData::NS(_) => RecordType::NS,
            RecordData::PTR(_) => RecordType::PTR,
            RecordData::MX { .. } => RecordType::MX,
            RecordData::TXT(_) => RecordType::TXT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsRecord {
    pub owner: DomainName,

    pub ttl: u32,

    pub data: RecordData,
}

impl DnsRecord {
    pub fn new(owner: DomainName, ttl: u32, data: RecordData) -> Self {
        Self { owner, ttl, data }
    }

    pub fn record_type(&self) -> RecordType {
        self.data.record_type()
    }
}
