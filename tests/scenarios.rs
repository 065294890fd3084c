use flowscope::{
    Config, Direction, FlowContext, FlowDecision, FlowInspector, FlowIp, FlowType, PathDecision,
};
use flowscope_proto::packet::header::Header;
use flowscope_proto::packet::question::Question;
use flowscope_proto::packet::record::Record;
use flowscope_proto::packet::{DnsMessage, QueryType};
use similar_asserts::assert_eq;
use std::net::Ipv4Addr;
use std::str::FromStr;

fn engine() -> FlowInspector {
    FlowInspector::new(Config::default())
}

fn dns_context(direction: Direction) -> FlowContext {
    FlowContext::new(
        FlowType::Dns,
        direction,
        FlowIp::from_str("192.168.1.1").unwrap(),
        53,
    )
    .with_session(1, 0)
}

fn tcp_context(ip: &str, dst_port: u16) -> FlowContext {
    FlowContext::new(
        FlowType::Tcp,
        Direction::Outbound,
        FlowIp::from_str(ip).unwrap(),
        dst_port,
    )
    .with_session(2, 0)
    .with_process(4242, "browser", "/usr/bin/browser")
}

fn encode(message: DnsMessage) -> Vec<u8> {
    message.encode().unwrap().into_bytes()
}

// Minimal single-record ClientHello carrying only the server_name
// extension.
fn client_hello(server_name: &str) -> Vec<u8> {
    let name = server_name.as_bytes();
    let sni_entry_len = 3 + name.len();
    let sni_body_len = 2 + sni_entry_len;
    let extensions_len = 4 + sni_body_len;

    let mut hello = vec![0x03, 0x03];
    hello.extend(std::iter::repeat(0x42).take(32));
    hello.push(0); // empty session id
    hello.extend_from_slice(&[0x00, 0x02, 0x13, 0x01]); // one cipher suite
    hello.extend_from_slice(&[0x01, 0x00]); // null compression
    hello.extend_from_slice(&(extensions_len as u16).to_be_bytes());
    hello.extend_from_slice(&[0x00, 0x00]);
    hello.extend_from_slice(&(sni_body_len as u16).to_be_bytes());
    hello.extend_from_slice(&(sni_entry_len as u16).to_be_bytes());
    hello.push(0x00);
    hello.extend_from_slice(&(name.len() as u16).to_be_bytes());
    hello.extend_from_slice(name);

    let mut record = vec![0x16, 0x03, 0x01];
    record.extend_from_slice(&((hello.len() + 4) as u16).to_be_bytes());
    record.push(0x01);
    record.extend_from_slice(&(hello.len() as u32).to_be_bytes()[1..]);
    record.extend_from_slice(&hello);
    record
}

#[test]
fn dns_cache_hit_rewrites_transaction_id() {
    let engine = engine();

    let response = encode(
        DnsMessage::new(Header::response(0x1234))
            .with_question(Question::new("example.com", QueryType::A))
            .with_answer(Record::A {
                domain: "example.com".into(),
                addr: Ipv4Addr::new(93, 184, 216, 34),
                ttl: 300,
            }),
    );
    let mut ingest_ctx = dns_context(Direction::Inbound);
    engine.flow_recv(&mut ingest_ctx, &response);

    let query = encode(
        DnsMessage::new(Header::question(0xABCD))
            .with_question(Question::new("example.com", QueryType::A)),
    );
    let mut query_ctx = dns_context(Direction::Outbound);
    let mut out = Vec::new();
    let hit = engine.flow_send_with_response(&mut query_ctx, &query, &mut out);

    assert!(hit);
    assert_eq!(&out[0..2], &[0xAB, 0xCD]);
    assert_eq!(&out[2..], &response[2..]);
    assert_eq!(query_ctx.domains(), ["example.com"]);
}

#[test]
fn reverse_index_follows_cname_chains() {
    let engine = engine();

    let response = encode(
        DnsMessage::new(Header::response(0x0042))
            .with_question(Question::new("www.baidu.com", QueryType::A))
            .with_answer(Record::CNAME {
                domain: "www.baidu.com".into(),
                host: "www.a.shifen.com".into(),
                ttl: 1200,
            })
            .with_answer(Record::A {
                domain: "www.a.shifen.com".into(),
                addr: Ipv4Addr::new(183, 2, 172, 177),
                ttl: 300,
            })
            .with_answer(Record::A {
                domain: "www.a.shifen.com".into(),
                addr: Ipv4Addr::new(183, 2, 172, 17),
                ttl: 300,
            }),
    );
    let mut ctx = dns_context(Direction::Inbound);
    engine.flow_recv(&mut ctx, &response);

    for ip in ["183.2.172.177", "183.2.172.17"] {
        let found = engine.domains_for_ip(ip);
        assert!(found.contains(&"www.baidu.com".to_string()), "{ip}: {found:?}");
        assert!(found.contains(&"www.a.shifen.com".to_string()), "{ip}: {found:?}");
    }
    assert_eq!(ctx.domains(), ["www.baidu.com", "www.a.shifen.com"]);
}

#[test]
fn https_flow_learns_domain_from_sni() {
    let engine = engine();
    let mut ctx = tcp_context("220.181.174.34", 443);

    engine.flow_send(&mut ctx, &client_hello("www.baidu.com"));

    assert_eq!(ctx.domains(), ["www.baidu.com"]);
    assert_eq!(ctx.flow_decision, FlowDecision::Allow);
    assert_eq!(ctx.path_decision, PathDecision::Local);
}

#[test]
fn http_flow_learns_domain_from_host_header() {
    let engine = engine();
    let mut ctx = tcp_context("93.184.216.34", 80);

    engine.flow_send(&mut ctx, b"GET / HTTP/1.1\r\nHost: api.example.com\r\n\r\n");

    assert_eq!(ctx.domains(), ["api.example.com"]);
}

#[test]
fn ip_lookup_short_circuits_payload_parsing() {
    let engine = engine();

    let response = encode(
        DnsMessage::new(Header::response(0x0007))
            .with_question(Question::new("example.com", QueryType::A))
            .with_answer(Record::A {
                domain: "example.com".into(),
                addr: Ipv4Addr::new(93, 184, 216, 34),
                ttl: 300,
            }),
    );
    let mut ingest_ctx = dns_context(Direction::Inbound);
    engine.flow_recv(&mut ingest_ctx, &response);

    // no payload ever reaches this flow, the identity alone is enough
    let mut ctx = tcp_context("93.184.216.34", 443);
    engine.flow_arrive(&mut ctx);

    assert_eq!(ctx.domains(), ["example.com"]);
}

#[test]
fn malformed_dns_is_ignored() {
    let engine = engine();
    let mut ctx = dns_context(Direction::Inbound);

    let garbage: Vec<u8> = (0..200u32).map(|i| (i.wrapping_mul(37) % 256) as u8 | 0x80).collect();
    engine.flow_recv(&mut ctx, &garbage);

    assert!(ctx.domains().is_empty());
    assert_eq!(ctx.flow_decision, FlowDecision::Allow);
}

#[test]
fn domains_never_shrink_across_calls() {
    let engine = engine();
    let mut ctx = tcp_context("10.0.0.1", 80);

    engine.flow_send(&mut ctx, b"GET / HTTP/1.1\r\nHost: web.example\r\n\r\n");
    let after_first = ctx.domains().to_vec();

    engine.flow_send(&mut ctx, b"\x00\x01\x02\x03");
    engine.flow_recv(&mut ctx, b"random inbound bytes");
    engine.flow_send(&mut ctx, b"");

    assert!(ctx.domains().len() >= after_first.len());
    assert_eq!(ctx.domains()[..after_first.len()], after_first[..]);
}

#[test]
fn clear_cache_empties_the_reverse_index() {
    let engine = engine();

    let response = encode(
        DnsMessage::new(Header::response(0x0009))
            .with_question(Question::new("example.com", QueryType::A))
            .with_answer(Record::A {
                domain: "example.com".into(),
                addr: Ipv4Addr::new(1, 1, 1, 1),
                ttl: 300,
            }),
    );
    let mut ctx = dns_context(Direction::Inbound);
    engine.flow_recv(&mut ctx, &response);
    assert!(!engine.domains_for_ip("1.1.1.1").is_empty());

    engine.clear_cache();
    assert!(engine.domains_for_ip("1.1.1.1").is_empty());

    let query = encode(
        DnsMessage::new(Header::question(0x0100))
            .with_question(Question::new("example.com", QueryType::A)),
    );
    let mut query_ctx = dns_context(Direction::Outbound);
    let mut out = Vec::new();
    assert!(!engine.flow_send_with_response(&mut query_ctx, &query, &mut out));
}
