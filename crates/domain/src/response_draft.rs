use crate::dns_record::{DnsRecord, RecordData};
use crate::domain_name::DomainName;
use crate::errors::DomainError;
use smallvec::SmallVec;
use std::net::{Ipv4Addr, Ipv6Addr};

/// Upper bound for TTLs (RFC 2181 §8).
pub const MAX_TTL: i64 = i32::MAX as i64;

pub const MAX_TXT_LEN: usize = 4096;

/// Records accumulated for one query before encoding.
///
/// The TTL is a property of the whole draft: `set_ttl` applies to every record
/// already added and to every record added afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseDraft {
    answers: SmallVec<[RecordData; 4]>,
    ttl: u32,
}

impl ResponseDraft {
    pub fn new(default_ttl: u32) -> Self {
        Self {
            answers: SmallVec::new(),
            ttl: default_ttl,
        }
    }

    pub fn add_cname(&mut self, target: &str) -> Result<(), DomainError> {
        let target = DomainName::parse(target)?;
        self.answers.push(RecordData::CNAME(target));
        Ok(())
    }

    pub fn add_a(&mut self, ip: &str) -> Result<(), DomainError> {
        let addr: Ipv4Addr = ip
            .trim()
            .parse()
            .map_err(|_| DomainError::InvalidIpAddress(format!("'{}' is not an IPv4 address", ip)))?;
        self.answers.push(RecordData::A(addr));
        Ok(())
    }

    pub fn add_aaaa(&mut self, ip: &str) -> Result<(), DomainError> {
        let addr: Ipv6Addr = ip
            .trim()
            .parse()
            .map_err(|_| DomainError::InvalidIpAddress(format!("'{}' is not an IPv6 address", ip)))?;
        self.answers.push(RecordData::AAAA(addr));
        Ok(())
    }

    pub fn add_ns(&mut self, target: &str) -> Result<(), DomainError> {
        let target = DomainName::parse(target)?;
        self.answers.push(RecordData::NS(target));
        Ok(())
    }

    pub fn add_ptr(&mut self, target: &str) -> Result<(), DomainError> {
        let target = DomainName::parse(target)?;
        self.answers.push(RecordData::PTR(target));
        Ok(())
    }

    pub fn add_mx(&mut self, preference: i64, exchange: &str) -> Result<(), DomainError> {
        let preference = u16::try_from(preference).map_err(|_| {
            DomainError::InvalidRecordData(format!(
                "MX preference {} is outside 0..=65535",
                preference
            ))
        })?;
        let exchange = DomainName::parse(exchange)?;
        self.answers.push(RecordData::MX {
            preference,
            exchange,
        });
        Ok(())
    }

    pub fn add_txt(&mut self, text: &str) -> Result<(), DomainError> {
        if text.len() > MAX_TXT_LEN {
            return Err(DomainError::InvalidRecordData(format!(
                "TXT data exceeds {} bytes ({} given)",
                MAX_TXT_LEN,
                text.len()
            )));
        }
        self.answers.push(RecordData::TXT(text.to_string()));
        Ok(())
    }

    pub fn set_ttl(&mut self, seconds: i64) -> Result<(), DomainError> {
        if !(0..=MAX_TTL).contains(&seconds) {
            return Err(DomainError::InvalidTtl(seconds));
        }
        self.ttl = seconds as u32;
        Ok(())
    }

    pub fn ttl(&self) -> u32 {
        self.ttl
    }

    pub fn answers(&self) -> &[RecordData] {
        &self.answers
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    /// Materializes the draft as records owned by `owner`.
    pub fn records(&self, owner: &DomainName) -> Vec<DnsRecord> {
        self.answers
            .iter()
            .map(|data| DnsRecord::new(owner.clone(), self.ttl, data.clone()))
            .collect()
    }
}
