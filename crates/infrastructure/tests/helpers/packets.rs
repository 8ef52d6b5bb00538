#![allow(dead_code)]

pub const QTYPE_A: u16 = 1;
pub const QTYPE_TXT: u16 = 16;
pub const QTYPE_AAAA: u16 = 28;
pub const CLASS_IN: u16 = 1;

pub fn build_query(id: u16, domain: &str, qtype: u16) -> Vec<u8> {
    build_query_with_class(id, domain, qtype, CLASS_IN)
}

pub fn build_query_with_class(id: u16, domain: &str, qtype: u16, qclass: u16) -> Vec<u8> {
    let labels: Vec<&[u8]> = domain
        .split('.')
        .filter(|l| !l.is_empty())
        .map(str::as_bytes)
        .collect();
    build_query_from_labels(id, &labels, qtype, qclass)
}

/// Builds a query from raw labels, which may hold bytes a presentation-form
/// name cannot, such as a literal dot.
pub fn build_query_from_labels(id: u16, labels: &[&[u8]], qtype: u16, qclass: u16) -> Vec<u8> {
    let id = id.to_be_bytes();
    let mut buf = vec![
        id[0], id[1], // ID
        0x01, 0x00, // flags: RD set
        0x00, 0x01, // QDCOUNT = 1
        0x00, 0x00, // ANCOUNT = 0
        0x00, 0x00, // NSCOUNT = 0
        0x00, 0x00, // ARCOUNT = 0
    ];
    for label in labels {
        buf.push(label.len() as u8);
        buf.extend_from_slice(label);
    }
    buf.push(0x00); // root label
    buf.extend_from_slice(&qtype.to_be_bytes());
    buf.extend_from_slice(&qclass.to_be_bytes());
    buf
}

pub fn append_opt_record(buf: &mut Vec<u8>, udp_payload: u16, version: u8) {
    buf[11] += 1; // ARCOUNT
    buf.push(0x00); // NAME = root
    buf.extend_from_slice(&[0x00, 41]); // TYPE = OPT
    buf.extend_from_slice(&udp_payload.to_be_bytes()); // CLASS = UDP payload size
    buf.push(0x00); // extended RCODE
    buf.push(version); // EDNS version
    buf.extend_from_slice(&[0x00, 0x00]); // DO + Z flags
    buf.extend_from_slice(&[0x00, 0x00]); // RDLEN = 0
}

pub fn set_opcode(buf: &mut [u8], opcode: u8) {
    buf[2] = (buf[2] & 0x87) | (opcode << 3);
}

pub fn response_id(buf: &[u8]) -> u16 {
    u16::from_be_bytes([buf[0], buf[1]])
}

pub fn rcode(buf: &[u8]) -> u8 {
    buf[3] & 0x0F
}

pub fn is_authoritative(buf: &[u8]) -> bool {
    buf[2] & 0x04 != 0
}

pub fn is_truncated(buf: &[u8]) -> bool {
    buf[2] & 0x02 != 0
}

pub fn recursion_desired(buf: &[u8]) -> bool {
    buf[2] & 0x01 != 0
}

pub fn answer_count(buf: &[u8]) -> u16 {
    u16::from_be_bytes([buf[6], buf[7]])
}

pub fn additional_count(buf: &[u8]) -> u16 {
    u16::from_be_bytes([buf[10], buf[11]])
}
