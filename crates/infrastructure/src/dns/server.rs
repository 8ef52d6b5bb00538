use super::query_parser::{self, ParsedQuery};
use super::response_encoder::{
    encode_header_only, encode_response, EncodeOptions, TCP_MAX_MESSAGE, UDP_BASE_PAYLOAD,
};
use hickory_proto::op::{MessageType, OpCode, ResponseCode};
use scriptdns_application::use_cases::HandleDnsQueryUseCase;
use scriptdns_domain::{DnsRecord, DnsRequest, DomainError, Transport};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, error};

/// Turns raw query bytes into raw response bytes.
///
/// Returns `None` for messages that get no answer at all: anything that does
/// not parse as a query, and responses sent to us.
#[derive(Clone)]
pub struct DnsServerHandler {
    use_case: Arc<HandleDnsQueryUseCase>,
    udp_max_payload: u16,
}

impl DnsServerHandler {
    pub fn new(use_case: Arc<HandleDnsQueryUseCase>, udp_max_payload: u16) -> Self {
        Self {
            use_case,
            udp_max_payload,
        }
    }

    pub async fn handle_raw(&self, buf: &[u8], client: SocketAddr, transport: Transport) -> Option<Vec<u8>> {
        let header = match query_parser::parse_header(buf) {
            Ok(header) if header.metadata.message_type == MessageType::Query => header,
            Ok(_) => return None,
            Err(e) => {
                debug!(client = %client, error = %e, "Dropping short packet");
                return None;
            }
        };

        if header.metadata.op_code != OpCode::Query {
            debug!(client = %client, opcode = ?header.metadata.op_code, "Unsupported opcode");
            return encode_header_only(&header.metadata, ResponseCode::NotImp)
                .map_err(|e| error!(client = %client, error = %e, "Cannot encode NOTIMP"))
                .ok();
        }

        let query = match query_parser::parse_query(buf) {
            Ok(query) => query,
            Err(e) => {
                debug!(client = %client, transport = %transport, error = %e, "Dropping malformed query");
                return None;
            }
        };

        let max_size = self.max_response_size(&query, transport);
        let reply = |records: &[DnsRecord], rcode, authoritative| {
            let options = EncodeOptions {
                rcode,
                authoritative,
                max_size,
                udp_max_payload: self.udp_max_payload,
            };
            encode_response(&query, records, options)
                .or_else(|e| {
                    error!(client = %client, error = %e, "Cannot encode response, answering SERVFAIL");
                    encode_response(
                        &query,
                        &[],
                        EncodeOptions {
                            rcode: ResponseCode::ServFail,
                            authoritative: false,
                            ..options
                        },
                    )
                })
                .map_err(|e| error!(client = %client, error = %e, "Cannot encode SERVFAIL"))
                .ok()
        };

        if let Some(edns) = query.edns() {
            if edns.version() != 0 {
                debug!(client = %client, version = edns.version(), "Unsupported EDNS version");
                return reply(&[], ResponseCode::BADVERS, false);
            }
        }

        if !query.is_supported_class() {
            return reply(&[], ResponseCode::NotImp, false);
        }

        let domain = match query.domain_name() {
            Ok(domain) => domain,
            Err(e) => {
                debug!(client = %client, qname = %query.question().name(), error = %e, "Refusing unroutable name");
                return reply(&[], ResponseCode::Refused, false);
            }
        };

        let request = DnsRequest::new(query.id(), domain, query.record_type(), client, transport);

        match self.use_case.execute(&request).await {
            Ok(draft) => {
                let records = draft.records(&request.domain);
                reply(&records, ResponseCode::NoError, true)
            }
            Err(DomainError::NxDomain) => reply(&[], ResponseCode::NXDomain, false),
            Err(_) => reply(&[], ResponseCode::ServFail, false),
        }
    }

    fn max_response_size(&self, query: &ParsedQuery, transport: Transport) -> usize {
        match transport {
            Transport::Tcp => TCP_MAX_MESSAGE,
            Transport::Udp => match query.edns() {
                Some(edns) => (edns.max_payload() as usize)
                    .clamp(UDP_BASE_PAYLOAD, (self.udp_max_payload as usize).max(UDP_BASE_PAYLOAD)),
                None => UDP_BASE_PAYLOAD,
            },
        }
    }
}
