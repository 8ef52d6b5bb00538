use super::query_parser::ParsedQuery;
use hickory_proto::op::{Edns, Message, Metadata, ResponseCode};
use hickory_proto::rr::rdata::{A, AAAA, CNAME, MX, NS, PTR, TXT};
use hickory_proto::rr::{Name, RData, Record};
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};
use scriptdns_domain::{DnsRecord, DomainError, DomainName, RecordData};

const TXT_CHUNK: usize = 255;

pub const UDP_BASE_PAYLOAD: usize = 512;
pub const TCP_MAX_MESSAGE: usize = 65535;

/// Options shared by every response built for one query.
#[derive(Debug, Clone, Copy)]
pub struct EncodeOptions {
    pub rcode: ResponseCode,
    pub authoritative: bool,
    /// Largest message the transport may carry.
    pub max_size: usize,
    /// Payload size we advertise back in our OPT record.
    pub udp_max_payload: u16,
}

/// Builds a full response to `query`.
///
/// The question is echoed as received, answers owned by the QNAME reuse its
/// spelling so the encoder compresses them to a pointer, and an OPT record is
/// added when the client sent one. Answers that do not fit in `max_size` are
/// dropped from the end and the TC bit is set.
pub fn encode_response(
    query: &ParsedQuery,
    records: &[DnsRecord],
    options: EncodeOptions,
) -> Result<Vec<u8>, DomainError> {
    let question = query.question();

    let mut message = Message::response(query.id(), query.message.metadata.op_code);
    message.metadata = Metadata::response_from_request(&query.message.metadata);
    message.metadata.authoritative = options.authoritative;
    message.metadata.response_code = options.rcode;
    message.add_query(question.clone());

    let qname = query.domain_name().ok();
    for record in records {
        let owner = if qname.as_ref() == Some(&record.owner) {
            question.name().clone()
        } else {
            to_name(&record.owner)?
        };
        message.add_answer(Record::from_rdata(owner, record.ttl, to_rdata(&record.data)?));
    }

    if query.edns().is_some() {
        let mut edns = Edns::new();
        edns.set_max_payload(options.udp_max_payload);
        message.set_edns(edns);
    }

    let mut bytes = serialize(&message)?;
    while bytes.len() > options.max_size && message.answers.pop().is_some() {
        message.metadata.truncation = true;
        bytes = serialize(&message)?;
    }
    Ok(bytes)
}

/// Builds an error response that carries only the header, for messages whose
/// question could not be used.
pub fn encode_header_only(request: &Metadata, rcode: ResponseCode) -> Result<Vec<u8>, DomainError> {
    let mut message = Message::response(request.id, request.op_code);
    message.metadata = Metadata::response_from_request(request);
    message.metadata.response_code = rcode;
    serialize(&message)
}

fn serialize(message: &Message) -> Result<Vec<u8>, DomainError> {
    let mut buf = Vec::with_capacity(UDP_BASE_PAYLOAD);
    let mut encoder = BinEncoder::new(&mut buf);
    message
        .emit(&mut encoder)
        .map_err(|e| DomainError::MalformedPacket(format!("cannot encode response: {}", e)))?;
    Ok(buf)
}

fn to_name(name: &DomainName) -> Result<Name, DomainError> {
    let mut wire = Name::from_ascii(name.as_str())
        .map_err(|e| DomainError::InvalidDomainName(format!("{}: {}", name, e)))?;
    wire.set_fqdn(true);
    Ok(wire)
}

fn to_rdata(data: &RecordData) -> Result<RData, DomainError> {
    Ok(match data {
        RecordData::A(ip) => RData::A(A(*ip)),
        RecordData::AAAA(ip) => RData::AAAA(AAAA(*ip)),
        RecordData::CNAME(target) => RData::CNAME(CNAME(to_name(target)?)),
        RecordData::NS(target) => RData::NS(NS(to_name(target)?)),
        RecordData::PTR(target) => RData::PTR(PTR(to_name(target)?)),
        RecordData::MX {
            preference,
            exchange,
        } => RData::MX(MX::new(*preference, to_name(exchange)?)),
        RecordData::TXT(text) => RData::TXT(txt(text)),
    })
}

/// One character-string per 255 bytes; empty text is a single empty string.
fn txt(text: &str) -> TXT {
    let bytes = text.as_bytes();
    if bytes.is_empty() {
        return TXT::from_bytes(vec![&[][..]]);
    }
    TXT::from_bytes(bytes.chunks(TXT_CHUNK).collect())
}
