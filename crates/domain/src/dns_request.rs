use super::{DomainName, RecordType};
use std::fmt;
use std::net::SocketAddr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transport {
    Udp,
    Tcp,
}

impl Transport {
    pub fn as_str(&self) -> &'static str {
        match self {
            Transport::Udp => "udp",
            Transport::Tcp => "tcp",
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed DNS question together with where it came from.
#[derive(Debug, Clone)]
pub struct DnsRequest {
    pub id: u16,
    pub domain: DomainName,
    pub record_type: RecordType,
    pub client_addr: SocketAddr,
    pub transport: Transport,
}

impl DnsRequest {
    pub fn new(
        id: u16,
        domain: DomainName,
        record_type: RecordType,
        client_addr: SocketAddr,
        transport: Transport,
    ) -> Self {
        Self {
            id,
            domain,
            record_type,
            client_addr,
            transport,
        }
    }
}
