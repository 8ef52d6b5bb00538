mod helpers;

use helpers::{
    additional_count, answer_count, append_opt_record, build_query, is_authoritative,
    is_truncated, rcode, recursion_desired, response_id, set_opcode, QTYPE_A,
};
use hickory_proto::op::{Message, ResponseCode};
use hickory_proto::rr::RData;
use scriptdns_domain::{DnsRecord, DomainName, ResponseDraft};
use scriptdns_infrastructure::dns::query_parser::{parse_header, parse_query};
use scriptdns_infrastructure::dns::response_encoder::{
    encode_header_only, encode_response, EncodeOptions,
};

fn options(rcode: ResponseCode, max_size: usize) -> EncodeOptions {
    EncodeOptions {
        rcode,
        authoritative: rcode == ResponseCode::NoError,
        max_size,
        udp_max_payload: 1232,
    }
}

fn records(domain: &str, draft: &ResponseDraft) -> Vec<DnsRecord> {
    draft.records(&DomainName::parse(domain).unwrap())
}

fn forty_a_records(domain: &str) -> Vec<DnsRecord> {
    let mut draft = ResponseDraft::new(300);
    for i in 0..40 {
        draft.add_a(&format!("10.0.0.{}", i)).unwrap();
    }
    records(domain, &draft)
}

// ── answers ────────────────────────────────────────────────────────────────

#[test]
fn test_cname_with_ttl_decodes() {
    let buf = build_query(0x4242, "www.example.com", QTYPE_A);
    let query = parse_query(&buf).unwrap();
    let mut draft = ResponseDraft::new(300);
    draft.set_ttl(20).unwrap();
    draft.add_cname("foo.example.com").unwrap();

    let wire = encode_response(
        &query,
        &records("www.example.com", &draft),
        options(ResponseCode::NoError, 512),
    )
    .unwrap();
    let message = Message::from_vec(&wire).unwrap();

    assert_eq!(response_id(&wire), 0x4242);
    assert!(is_authoritative(&wire));
    assert!(recursion_desired(&wire));
    assert_eq!(message.metadata.response_code, ResponseCode::NoError);
    assert_eq!(message.answers.len(), 1);
    let answer = &message.answers[0];
    assert_eq!(answer.ttl, 20);
    match &answer.data {
        RData::CNAME(target) => assert_eq!(target.to_utf8(), "foo.example.com."),
        other => panic!("expected CNAME, got {:?}", other),
    }
}

#[test]
fn test_answer_owner_is_compressed_to_question() {
    let buf = build_query(1, "www.example.com", QTYPE_A);
    let query = parse_query(&buf).unwrap();
    let mut draft = ResponseDraft::new(60);
    draft.add_a("192.0.2.7").unwrap();

    let wire = encode_response(
        &query,
        &records("www.example.com", &draft),
        options(ResponseCode::NoError, 512),
    )
    .unwrap();

    assert_eq!(&wire[buf.len()..buf.len() + 2], &[0xC0, 0x0C]);
    assert_eq!(wire.len(), buf.len() + 16);
    let message = Message::from_vec(&wire).unwrap();
    match &message.answers[0].data {
        RData::A(a) => assert_eq!(a.0, std::net::Ipv4Addr::new(192, 0, 2, 7)),
        other => panic!("expected A, got {:?}", other),
    }
}

#[test]
fn test_question_echoed_with_client_case() {
    let buf = build_query(1, "WwW.ExAmPlE.cOm", QTYPE_A);
    let query = parse_query(&buf).unwrap();

    let wire = encode_response(&query, &[], options(ResponseCode::NXDomain, 512)).unwrap();

    assert_eq!(&wire[12..], &buf[12..]);
    assert_eq!(rcode(&wire), 3);
    assert!(!is_authoritative(&wire));
}

#[test]
fn test_mixed_record_types_decode() {
    let buf = build_query(7, "example.com", QTYPE_A);
    let query = parse_query(&buf).unwrap();
    let mut draft = ResponseDraft::new(300);
    draft.add_a("10.0.0.1").unwrap();
    draft.add_aaaa("2001:db8::1").unwrap();
    draft.add_mx(10, "mail.example.com").unwrap();
    draft.add_txt(&"t".repeat(300)).unwrap();
    draft.add_ns("ns1.example.com").unwrap();
    draft.add_ptr("host.example.com").unwrap();

    let wire = encode_response(
        &query,
        &records("example.com", &draft),
        options(ResponseCode::NoError, 65535),
    )
    .unwrap();
    let message = Message::from_vec(&wire).unwrap();

    assert_eq!(message.answers.len(), 6);
    assert!(message.answers.iter().all(|r| r.ttl == 300));
    match &message.answers[2].data {
        RData::MX(mx) => {
            assert_eq!(mx.preference, 10);
            assert_eq!(mx.exchange.to_utf8(), "mail.example.com.");
        }
        other => panic!("expected MX, got {:?}", other),
    }
    match &message.answers[3].data {
        RData::TXT(txt) => {
            let total: usize = txt.txt_data.iter().map(|s| s.len()).sum();
            assert_eq!(txt.txt_data.len(), 2);
            assert_eq!(total, 300);
        }
        other => panic!("expected TXT, got {:?}", other),
    }
}

// ── truncation ─────────────────────────────────────────────────────────────

#[test]
fn test_oversized_answers_are_truncated() {
    let buf = build_query(9, "example.com", QTYPE_A);
    let query = parse_query(&buf).unwrap();

    let wire = encode_response(
        &query,
        &forty_a_records("example.com"),
        options(ResponseCode::NoError, 512),
    )
    .unwrap();

    assert!(wire.len() <= 512);
    assert!(is_truncated(&wire));
    let kept = answer_count(&wire) as usize;
    assert_eq!(kept, (512 - buf.len()) / 16);
    let message = Message::from_vec(&wire).unwrap();
    assert!(message.metadata.truncation);
    assert_eq!(message.answers.len(), kept);
}

#[test]
fn test_truncation_keeps_opt_record() {
    let mut buf = build_query(9, "example.com", QTYPE_A);
    append_opt_record(&mut buf, 512, 0);
    let query = parse_query(&buf).unwrap();

    let wire = encode_response(
        &query,
        &forty_a_records("example.com"),
        options(ResponseCode::NoError, 512),
    )
    .unwrap();

    assert!(wire.len() <= 512);
    assert!(is_truncated(&wire));
    assert_eq!(additional_count(&wire), 1);
    let message = Message::from_vec(&wire).unwrap();
    assert!(message.edns.is_some());
}

#[test]
fn test_no_truncation_when_everything_fits() {
    let buf = build_query(9, "example.com", QTYPE_A);
    let query = parse_query(&buf).unwrap();

    let wire = encode_response(
        &query,
        &forty_a_records("example.com"),
        options(ResponseCode::NoError, 65535),
    )
    .unwrap();

    assert!(!is_truncated(&wire));
    assert_eq!(answer_count(&wire), 40);
}

// ── EDNS ───────────────────────────────────────────────────────────────────

#[test]
fn test_opt_record_echoed_when_client_sent_one() {
    let mut buf = build_query(3, "example.com", QTYPE_A);
    append_opt_record(&mut buf, 4096, 0);
    let query = parse_query(&buf).unwrap();

    let wire = encode_response(&query, &[], options(ResponseCode::ServFail, 1232)).unwrap();

    assert_eq!(additional_count(&wire), 1);
    assert_eq!(rcode(&wire), 2);
    let opt = &wire[wire.len() - 11..];
    assert_eq!(&opt[..3], &[0x00, 0x00, 41]);
    assert_eq!(u16::from_be_bytes([opt[3], opt[4]]), 1232);
    let message = Message::from_vec(&wire).unwrap();
    assert_eq!(message.metadata.response_code, ResponseCode::ServFail);
}

#[test]
fn test_no_opt_record_without_client_edns() {
    let buf = build_query(3, "example.com", QTYPE_A);
    let query = parse_query(&buf).unwrap();

    let wire = encode_response(&query, &[], options(ResponseCode::ServFail, 512)).unwrap();

    assert_eq!(additional_count(&wire), 0);
}

#[test]
fn test_badvers_sets_extended_rcode() {
    let mut buf = build_query(3, "example.com", QTYPE_A);
    append_opt_record(&mut buf, 4096, 1);
    let query = parse_query(&buf).unwrap();

    let wire = encode_response(&query, &[], options(ResponseCode::BADVERS, 1232)).unwrap();

    assert_eq!(rcode(&wire), 0);
    let opt = &wire[wire.len() - 11..];
    assert_eq!(opt[5], 1);
    let message = Message::from_vec(&wire).unwrap();
    assert_eq!(message.metadata.response_code, ResponseCode::BADVERS);
}

#[test]
fn test_header_only_response() {
    let mut buf = build_query(0x0102, "example.com", QTYPE_A);
    set_opcode(&mut buf, 4);
    let header = parse_header(&buf).unwrap();

    let wire = encode_header_only(&header.metadata, ResponseCode::NotImp).unwrap();

    assert_eq!(wire.len(), 12);
    assert_eq!(response_id(&wire), 0x0102);
    assert_eq!(wire[2] & 0x80, 0x80);
    assert_eq!((wire[2] >> 3) & 0x0F, 4);
    assert_eq!(rcode(&wire), 4);
}
