use super::*;
use crate::config::{MAX_MESSAGE_LEN, ServiceConfig};
use crate::error::Error;
use crate::message::{DNSCLASS_INET, DNSCLASS_INET_FLUSH, DnsClass, DnsType, Message, MessageWriter, Name};

const LOCAL_IP: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 2);
const PEER_IP: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 50);

fn test_config() -> ServiceConfig {
    ServiceConfig::new("andrey", "_http._tcp", "local")
        .with_host("andrey.local")
        .with_local_ip(LOCAL_IP)
        .with_port(80)
        .with_txt("path=index.html")
}

fn tick(responder: &mut Responder) {
    let deadline = responder
        .poll_timeout()
        .expect("a proactive tick should be scheduled");
    responder.handle_timeout(deadline).unwrap();
}

// Drives the responder through probe and announce so it answers
// queries.
fn started_responder() -> Responder {
    let mut responder = Responder::new(test_config()).unwrap();
    tick(&mut responder);
    responder.poll_write().unwrap();
    tick(&mut responder);
    responder.poll_write().unwrap();
    assert_eq!(responder.state(), ResponderState::Started);
    while responder.poll_event().is_some() {}
    responder
}

fn inbound(raw: &[u8], peer_ip: Ipv4Addr) -> TaggedBytesMut {
    TransportMessage {
        now: Instant::now(),
        transport: TransportContext {
            local_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), MDNS_PORT),
            peer_addr: SocketAddr::new(IpAddr::V4(peer_ip), MDNS_PORT),
            transport_protocol: TransportProtocol::UDP,
        },
        message: BytesMut::from(raw),
    }
}

fn query_for(name: &str, qtype: DnsType, qclass: DnsClass) -> Vec<u8> {
    let qname = Name::from_dotted(name).unwrap();
    let mut buf = [0u8; MAX_MESSAGE_LEN];
    let mut w = MessageWriter::for_query(&mut buf).unwrap();
    w.add_question(&qname, qtype, qclass).unwrap();
    w.bytes().to_vec()
}

#[test]
fn test_lifecycle_probe_announce_silent() {
    let mut responder = Responder::new(test_config()).unwrap();
    assert_eq!(responder.state(), ResponderState::Probing);
    assert!(responder.poll_write().is_none());

    // Tick 1: the probe query, ANY/IN for the fully-qualified name.
    tick(&mut responder);
    let probe = responder.poll_write().unwrap();
    assert_eq!(probe.transport.peer_addr, MDNS_DEST_ADDR);
    let parsed = Message::parse(&probe.message).unwrap();
    assert!(!parsed.header.response);
    assert_eq!(parsed.questions.len(), 1);
    assert_eq!(parsed.questions[0].qtype, DnsType::Any);
    assert_eq!(parsed.questions[0].qclass, DNSCLASS_INET);
    let fqdn = Name::from_dotted("andrey._http._tcp.local").unwrap();
    assert_eq!(parsed.questions[0].name, fqdn.as_bytes());
    assert!(responder.poll_write().is_none());

    // Tick 2: the announcement.
    tick(&mut responder);
    assert_eq!(responder.state(), ResponderState::Started);
    let announce = responder.poll_write().unwrap();
    assert_eq!(announce.transport.peer_addr, MDNS_DEST_ADDR);
    let parsed = Message::parse(&announce.message).unwrap();
    assert!(parsed.header.response);
    assert!(parsed.header.authoritative);
    assert_eq!(parsed.header.rcode, 0);
    assert_eq!(parsed.answers.len(), 4);

    let host = Name::from_dotted("andrey.local").unwrap();
    let service = Name::from_dotted("_http._tcp.local").unwrap();

    let a = &parsed.answers[0];
    assert_eq!(a.typ, DnsType::A as u16);
    assert_eq!(a.class, DNSCLASS_INET_FLUSH);
    assert_eq!(a.ttl, 225);
    assert_eq!(a.name, host.as_bytes());
    assert_eq!(a.rdata, &LOCAL_IP.octets());

    let srv = &parsed.answers[1];
    assert_eq!(srv.typ, DnsType::Srv as u16);
    assert_eq!(srv.class, DNSCLASS_INET_FLUSH);
    assert_eq!(srv.name, fqdn.as_bytes());
    assert_eq!(&srv.rdata[..6], &[0, 0, 0, 0, 0, 80]);
    assert_eq!(&srv.rdata[6..], host.as_bytes());

    let txt = &parsed.answers[2];
    assert_eq!(txt.typ, DnsType::Txt as u16);
    assert_eq!(txt.class, DNSCLASS_INET_FLUSH);
    assert_eq!(txt.rdata, b"\x0fpath=index.html\x00");

    let ptr = &parsed.answers[3];
    assert_eq!(ptr.typ, DnsType::Ptr as u16);
    assert_eq!(ptr.class, DNSCLASS_INET);
    assert_eq!(ptr.ttl, 255);
    assert_eq!(ptr.name, service.as_bytes());
    assert_eq!(ptr.rdata, fqdn.as_bytes());

    // The claim is reported.
    assert_eq!(
        responder.poll_event(),
        Some(ResponderEvent::NameClaimed("andrey._http._tcp.local.".to_owned()))
    );

    // Tick 3 and beyond: no further proactive sends.
    assert!(responder.poll_timeout().is_none());
    responder.handle_timeout(Instant::now()).unwrap();
    assert!(responder.poll_write().is_none());
}

#[test]
fn test_extra_probes_when_configured() {
    let config = test_config().with_probe_count(3);
    let mut responder = Responder::new(config).unwrap();

    for _ in 0..3 {
        tick(&mut responder);
        let packet = responder.poll_write().unwrap();
        let parsed = Message::parse(&packet.message).unwrap();
        assert!(!parsed.header.response);
        assert_eq!(parsed.questions.len(), 1);
    }

    tick(&mut responder);
    let announce = responder.poll_write().unwrap();
    let parsed = Message::parse(&announce.message).unwrap();
    assert!(parsed.header.response);
    assert_eq!(responder.state(), ResponderState::Started);
}

#[test]
fn test_answers_a_query() {
    let mut responder = started_responder();

    let raw = query_for("andrey.local", DnsType::A, DNSCLASS_INET);
    responder.handle_read(inbound(&raw, PEER_IP)).unwrap();

    let packet = responder.poll_write().unwrap();
    assert_eq!(packet.transport.peer_addr, MDNS_DEST_ADDR);
    let parsed = Message::parse(&packet.message).unwrap();
    assert!(parsed.header.response);
    assert!(parsed.header.authoritative);
    assert_eq!(parsed.answers.len(), 1);
    assert_eq!(parsed.answers[0].typ, DnsType::A as u16);
    assert_eq!(parsed.answers[0].class, DNSCLASS_INET_FLUSH);
    assert_eq!(parsed.answers[0].rdata, &LOCAL_IP.octets());

    assert_eq!(
        responder.poll_event(),
        Some(ResponderEvent::QueryAnswered(SocketAddr::new(
            IpAddr::V4(PEER_IP),
            MDNS_PORT
        )))
    );
}

#[test]
fn test_any_query_for_instance_yields_srv_and_txt() {
    let mut responder = started_responder();

    let raw = query_for("andrey._http._tcp.local", DnsType::Any, DNSCLASS_INET);
    responder.handle_read(inbound(&raw, PEER_IP)).unwrap();

    let packet = responder.poll_write().unwrap();
    let parsed = Message::parse(&packet.message).unwrap();
    assert_eq!(parsed.answers.len(), 2);
    assert_eq!(parsed.answers[0].typ, DnsType::Srv as u16);
    assert_eq!(parsed.answers[1].typ, DnsType::Txt as u16);
}

#[test]
fn test_repeated_questions_answered_once() {
    let mut responder = started_responder();

    // eight identical ANY questions must not yield eight copies of the
    // SRV and TXT records
    let fqdn = Name::from_dotted("andrey._http._tcp.local").unwrap();
    let mut buf = [0u8; MAX_MESSAGE_LEN];
    let mut w = MessageWriter::for_query(&mut buf).unwrap();
    for _ in 0..8 {
        w.add_question(&fqdn, DnsType::Any, DNSCLASS_INET).unwrap();
    }
    let raw = w.bytes().to_vec();

    responder.handle_read(inbound(&raw, PEER_IP)).unwrap();

    let packet = responder.poll_write().unwrap();
    let parsed = Message::parse(&packet.message).unwrap();
    assert_eq!(parsed.answers.len(), 2);
    assert_eq!(parsed.answers[0].typ, DnsType::Srv as u16);
    assert_eq!(parsed.answers[1].typ, DnsType::Txt as u16);
    assert!(responder.poll_write().is_none());
}

#[test]
fn test_ptr_query_for_service_enumeration() {
    let mut responder = started_responder();

    let raw = query_for("_http._tcp.local", DnsType::Ptr, DNSCLASS_INET);
    responder.handle_read(inbound(&raw, PEER_IP)).unwrap();

    let packet = responder.poll_write().unwrap();
    let parsed = Message::parse(&packet.message).unwrap();
    assert_eq!(parsed.answers.len(), 1);
    assert_eq!(parsed.answers[0].typ, DnsType::Ptr as u16);
    assert_eq!(parsed.answers[0].class, DNSCLASS_INET);
    let fqdn = Name::from_dotted("andrey._http._tcp.local").unwrap();
    assert_eq!(parsed.answers[0].rdata, fqdn.as_bytes());
}

#[test]
fn test_unicast_response_bit_addresses_the_querier() {
    let mut responder = started_responder();

    let raw = query_for("andrey.local", DnsType::A, DnsClass(0x8001));
    responder.handle_read(inbound(&raw, PEER_IP)).unwrap();

    let packet = responder.poll_write().unwrap();
    assert_eq!(
        packet.transport.peer_addr,
        SocketAddr::new(IpAddr::V4(PEER_IP), MDNS_PORT)
    );
}

#[test]
fn test_ignores_own_traffic() {
    let mut responder = started_responder();

    let raw = query_for("andrey.local", DnsType::A, DNSCLASS_INET);
    responder.handle_read(inbound(&raw, LOCAL_IP)).unwrap();

    assert!(responder.poll_write().is_none());
    assert!(responder.poll_event().is_none());
}

#[test]
fn test_ignores_responses() {
    let mut responder = started_responder();

    // a response for our host name must not trigger an answer
    let host = Name::from_dotted("andrey.local").unwrap();
    let mut buf = [0u8; MAX_MESSAGE_LEN];
    let mut w = MessageWriter::for_response(&mut buf).unwrap();
    w.add_answer(&host, DNSCLASS_INET_FLUSH, 225, &RecordData::A(PEER_IP))
        .unwrap();
    let raw = w.bytes().to_vec();

    responder.handle_read(inbound(&raw, PEER_IP)).unwrap();
    assert!(responder.poll_write().is_none());
}

#[test]
fn test_ignores_queries_while_probing() {
    let mut responder = Responder::new(test_config()).unwrap();

    let raw = query_for("andrey.local", DnsType::A, DNSCLASS_INET);
    responder.handle_read(inbound(&raw, PEER_IP)).unwrap();

    assert!(responder.poll_write().is_none());
}

#[test]
fn test_no_answer_for_unrelated_name() {
    let mut responder = started_responder();

    let raw = query_for("printer.local", DnsType::A, DNSCLASS_INET);
    responder.handle_read(inbound(&raw, PEER_IP)).unwrap();

    assert!(responder.poll_write().is_none());
    assert!(responder.poll_event().is_none());
}

#[test]
fn test_malformed_datagram_dropped_silently() {
    let mut responder = started_responder();

    // short header
    responder.handle_read(inbound(&[0u8; 3], PEER_IP)).unwrap();
    // non-zero opcode
    let mut raw = query_for("andrey.local", DnsType::A, DNSCLASS_INET);
    raw[2] = 0x08;
    responder.handle_read(inbound(&raw, PEER_IP)).unwrap();

    assert!(responder.poll_write().is_none());
    assert!(responder.poll_event().is_none());
}

#[test]
fn test_close() {
    let mut responder = Responder::new(test_config()).unwrap();
    tick(&mut responder);

    responder.close().unwrap();
    assert!(responder.poll_write().is_none());
    assert!(responder.poll_timeout().is_none());

    let raw = query_for("andrey.local", DnsType::A, DNSCLASS_INET);
    assert_eq!(
        responder.handle_read(inbound(&raw, PEER_IP)),
        Err(Error::ErrResponderClosed)
    );
    assert_eq!(
        responder.handle_timeout(Instant::now()),
        Err(Error::ErrResponderClosed)
    );
}

#[test]
fn test_invalid_config_rejected() {
    let config = ServiceConfig::new("", "_http._tcp", "local");
    assert!(Responder::new(config).is_err());
}
