use hickory_proto::op::{Edns, Header, Message, MessageType, Query};
use hickory_proto::rr::DNSClass;
use hickory_proto::serialize::binary::{BinDecodable, BinDecoder};
use scriptdns_domain::{DomainError, DomainName, RecordType};

/// Reads only the fixed header, enough to decide whether a message deserves
/// any reply before the rest of it is decoded.
pub fn parse_header(buf: &[u8]) -> Result<Header, DomainError> {
    Header::read(&mut BinDecoder::new(buf))
        .map_err(|e| malformed(format!("cannot read header: {}", e)))
}

/// A standard query with exactly one question.
#[derive(Debug, Clone)]
pub struct ParsedQuery {
    pub message: Message,
}

impl ParsedQuery {
    pub fn id(&self) -> u16 {
        self.message.metadata.id
    }

    pub fn question(&self) -> &Query {
        &self.message.queries[0]
    }

    pub fn record_type(&self) -> RecordType {
        RecordType::from_u16(u16::from(self.question().query_type()))
    }

    pub fn is_supported_class(&self) -> bool {
        matches!(self.question().query_class(), DNSClass::IN | DNSClass::ANY)
    }

    pub fn edns(&self) -> Option<&Edns> {
        self.message.edns.as_ref()
    }

    /// The question name as a routable domain name.
    ///
    /// Fails for the root name and for labels outside the host-name
    /// alphabet, including labels that carry a literal dot.
    pub fn domain_name(&self) -> Result<DomainName, DomainError> {
        DomainName::from_labels(self.question().name().iter())
    }
}

/// Decodes a query message.
///
/// Rejects responses, messages without exactly one question and anything
/// the decoder refuses: truncated sections, bad pointers, more than one OPT
/// record or an OPT record outside the additional section.
pub fn parse_query(buf: &[u8]) -> Result<ParsedQuery, DomainError> {
    let message = Message::from_vec(buf).map_err(|e| malformed(e.to_string()))?;

    if message.metadata.message_type == MessageType::Response {
        return Err(malformed("QR bit set on a query".to_string()));
    }
    if message.queries.len() != 1 {
        return Err(malformed(format!(
            "expected one question, got {}",
            message.queries.len()
        )));
    }

    Ok(ParsedQuery { message })
}

fn malformed(reason: String) -> DomainError {
    DomainError::MalformedPacket(reason)
}
