use criterion::{criterion_group, criterion_main, Criterion};
use flowscope_proto::packet::header::Header;
use flowscope_proto::packet::question::Question;
use flowscope_proto::packet::record::Record;
use flowscope_proto::packet::{DnsMessage, QueryType};
use std::net::Ipv4Addr;

fn query_bytes() -> Vec<u8> {
    DnsMessage::new(Header::question(0x1234))
        .with_question(Question::new("www.google.com", QueryType::A))
        .encode()
        .unwrap()
        .into_bytes()
}

fn response_bytes() -> Vec<u8> {
    DnsMessage::new(Header::response(0x1234))
        .with_question(Question::new("www.google.com", QueryType::A))
        .with_answer(Record::CNAME {
            domain: "www.google.com".into(),
            host: "edge.google.com".into(),
            ttl: 120,
        })
        .with_answer(Record::A {
            domain: "edge.google.com".into(),
            addr: Ipv4Addr::new(142, 250, 74, 36),
            ttl: 300,
        })
        .encode()
        .unwrap()
        .into_bytes()
}

fn criterion_benchmark(c: &mut Criterion) {
    let query = query_bytes();
    let response = response_bytes();

    c.bench_function("decoding query packet", |b| {
        b.iter(|| DnsMessage::decode(&query).unwrap())
    });
    c.bench_function("decoding response packet", |b| {
        b.iter(|| DnsMessage::decode(&response).unwrap())
    });
    c.bench_function("encoding response packet", |b| {
        let message = DnsMessage::decode(&response).unwrap();
        b.iter(|| message.encode().unwrap())
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
