//! Sans-I/O mDNS responder state machine.
//!
//! [`Responder`] drives the name-claiming lifecycle — probe, announce,
//! then steady-state respond — without performing any I/O. The caller
//! owns the socket and the clock:
//!
//! 1. **Network reads**: pass each received datagram to `handle_read()`
//! 2. **Network writes**: send every packet returned by `poll_write()`
//! 3. **Timing**: call `handle_timeout()` when `poll_timeout()` expires
//! 4. **Events**: drain `poll_event()`
//!
//! # Lifecycle
//!
//! Ticks arrive every 250 ms (the caller's wait always carries that cap
//! so bursts of traffic never starve the timer):
//!
//! - **Probing**: each tick transmits a query for the service's
//!   fully-qualified name, type ANY class IN, asking whether anyone
//!   already holds it. After the configured probe count the machine
//!   moves on. A competing claim during probing is *not* detected; the
//!   lifecycle here is the documented minimal subset of the protocol.
//! - **Announcing**: one tick transmits a response announcing the A,
//!   SRV and TXT records (cache-flush class) and the PTR record (plain
//!   IN class), then the machine is started.
//! - **Started**: no more proactive transmissions; inbound queries from
//!   other hosts are answered with the matching records.
//!
//! # Example
//!
//! ```rust
//! use mdns_responder::{Responder, ResponderState, ServiceConfig};
//! use std::net::Ipv4Addr;
//!
//! let config = ServiceConfig::new("andrey", "_http._tcp", "local")
//!     .with_host("andrey.local")
//!     .with_local_ip(Ipv4Addr::new(192, 168, 1, 2))
//!     .with_port(80)
//!     .with_txt("path=index.html");
//!
//! let mut responder = Responder::new(config).unwrap();
//! assert_eq!(responder.state(), ResponderState::Probing);
//!
//! // Drive a tick, then send what was queued.
//! let deadline = responder.poll_timeout().unwrap();
//! responder.handle_timeout(deadline).unwrap();
//! let probe = responder.poll_write().unwrap();
//! assert_eq!(probe.transport.peer_addr.to_string(), "224.0.0.251:5353");
//! ```

use std::collections::VecDeque;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Instant;

use bytes::BytesMut;

use crate::config::{MAX_MESSAGE_LEN, MDNS_TICK_INTERVAL, PTR_TTL, RESPONSE_TTL, ServiceConfig};
use crate::error::{Error, Result};
use crate::message::record::{RecordData, TxtData};
use crate::message::{
    DNSCLASS_INET, DNSCLASS_INET_FLUSH, DnsClass, DnsType, Message, MessageWriter, Name,
};
use crate::transport::{TaggedBytesMut, TransportContext, TransportMessage, TransportProtocol};

/// The mDNS multicast group address (224.0.0.251).
pub const MDNS_MULTICAST_IPV4: Ipv4Addr = Ipv4Addr::new(224, 0, 0, 251);

/// The standard mDNS port (5353).
pub const MDNS_PORT: u16 = 5353;

/// mDNS multicast destination address (224.0.0.251:5353).
///
/// All mDNS queries and responses are sent to this address unless the
/// querier asked for a unicast response.
pub const MDNS_DEST_ADDR: SocketAddr = SocketAddr::new(IpAddr::V4(MDNS_MULTICAST_IPV4), MDNS_PORT);

/// Phase of the name-claiming lifecycle.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ResponderState {
    /// Transmitting probe queries for the service name.
    Probing,
    /// The next tick transmits the announcement.
    Announcing,
    /// Name claimed; answering queries, no proactive sends.
    Started,
}

/// Events emitted by the responder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponderEvent {
    /// The announcement went out; the name is claimed. Carries the
    /// fully-qualified service instance name.
    NameClaimed(String),
    /// A response to the given querier was queued.
    QueryAnswered(SocketAddr),
}

/// Sans-I/O mDNS responder.
///
/// Claims a service name on the local multicast segment and serves the
/// records describing it. See the [module docs](self) for the lifecycle
/// and the event-loop contract.
pub struct Responder {
    config: ServiceConfig,

    /// Fully-qualified instance name, `<instance>.<type>.<domain>`.
    fqdn: Name,

    /// Host name carried by the A record and targeted by the SRV record.
    host: Name,

    /// Service-enumeration name, `<type>.<domain>`.
    service_name: Name,

    /// Encoded TXT payload.
    txt: TxtData,

    state: ResponderState,
    probes_sent: u8,

    /// Outgoing packet queue
    write_outs: VecDeque<TaggedBytesMut>,

    /// Event queue
    event_outs: VecDeque<ResponderEvent>,

    /// Next proactive tick
    next_timeout: Option<Instant>,

    closed: bool,
}

impl Responder {
    /// Create a responder for the given service descriptor.
    ///
    /// Fails if any configured name does not encode as a valid label
    /// sequence or the TXT payload is too long.
    pub fn new(config: ServiceConfig) -> Result<Self> {
        let fqdn = Name::from_dotted(&config.instance_fqdn())?;
        let host = Name::from_dotted(&config.host)?;
        let service_name = Name::from_dotted(&config.service_name())?;
        let txt = TxtData::new(&config.txt)?;

        let tick_interval = if config.tick_interval.is_zero() {
            MDNS_TICK_INTERVAL
        } else {
            config.tick_interval
        };
        let mut config = config;
        config.tick_interval = tick_interval;

        let next_timeout = Some(Instant::now() + tick_interval);

        Ok(Self {
            config,
            fqdn,
            host,
            service_name,
            txt,
            state: ResponderState::Probing,
            probes_sent: 0,
            write_outs: VecDeque::new(),
            event_outs: VecDeque::new(),
            next_timeout,
            closed: false,
        })
    }

    /// Current lifecycle phase.
    pub fn state(&self) -> ResponderState {
        self.state
    }

    /// The fully-qualified service instance name being claimed.
    pub fn fqdn(&self) -> String {
        self.fqdn.to_string()
    }

    /// Process one received datagram.
    ///
    /// Malformed datagrams are logged and dropped; per-datagram parse
    /// failures are never fatal and never retried. Once started, a
    /// query from another host for one of our names queues a response
    /// retrievable via [`poll_write()`](Responder::poll_write).
    pub fn handle_read(&mut self, msg: TaggedBytesMut) -> Result<()> {
        if self.closed {
            return Err(Error::ErrResponderClosed);
        }
        self.process_message(&msg);
        Ok(())
    }

    /// Drive the lifecycle when the deadline from
    /// [`poll_timeout()`](Responder::poll_timeout) has passed.
    pub fn handle_timeout(&mut self, now: Instant) -> Result<()> {
        if self.closed {
            return Err(Error::ErrResponderClosed);
        }

        if let Some(next_timeout) = self.next_timeout.as_ref()
            && next_timeout <= &now
        {
            match self.state {
                ResponderState::Probing => {
                    self.send_probe(now);
                    self.probes_sent += 1;
                    if self.probes_sent >= self.config.probe_count {
                        self.state = ResponderState::Announcing;
                    }
                }
                ResponderState::Announcing => {
                    self.send_announcement(now);
                    self.state = ResponderState::Started;
                    self.event_outs
                        .push_back(ResponderEvent::NameClaimed(self.fqdn()));
                }
                ResponderState::Started => {}
            }

            self.next_timeout = if self.state == ResponderState::Started {
                None
            } else {
                Some(now + self.config.tick_interval)
            };
        }
        Ok(())
    }

    /// Get the next packet to send. Drain until `None` and transmit
    /// each packet to `packet.transport.peer_addr`.
    pub fn poll_write(&mut self) -> Option<TaggedBytesMut> {
        self.write_outs.pop_front()
    }

    /// Get the next event. Drain until `None`.
    pub fn poll_event(&mut self) -> Option<ResponderEvent> {
        self.event_outs.pop_front()
    }

    /// The deadline for the next proactive tick, or `None` once the
    /// lifecycle has reached [`ResponderState::Started`].
    pub fn poll_timeout(&mut self) -> Option<Instant> {
        self.next_timeout
    }

    /// Close the responder, clearing queues and pending state. After
    /// closing, `handle_read` and `handle_timeout` return
    /// [`Error::ErrResponderClosed`].
    pub fn close(&mut self) -> Result<()> {
        self.closed = true;
        self.write_outs.clear();
        self.event_outs.clear();
        self.next_timeout = None;
        Ok(())
    }

    fn send_probe(&mut self, now: Instant) {
        let mut buf = [0u8; MAX_MESSAGE_LEN];
        let raw = {
            let mut writer = match MessageWriter::for_query(&mut buf) {
                Ok(w) => w,
                Err(err) => {
                    log::error!("failed to start probe message: {err}");
                    return;
                }
            };
            if let Err(err) = writer.add_question(&self.fqdn, DnsType::Any, DNSCLASS_INET) {
                log::error!("failed to build probe for {}: {err}", self.fqdn);
                return;
            }
            BytesMut::from(writer.bytes())
        };

        log::trace!("queuing probe {}/{} for {}", self.probes_sent + 1, self.config.probe_count, self.fqdn);
        self.queue_packet(raw, MDNS_DEST_ADDR, now);
    }

    fn send_announcement(&mut self, now: Instant) {
        let answers = [
            (
                self.host.clone(),
                DNSCLASS_INET_FLUSH,
                RESPONSE_TTL,
                RecordData::A(self.config.local_ip),
            ),
            (
                self.fqdn.clone(),
                DNSCLASS_INET_FLUSH,
                RESPONSE_TTL,
                RecordData::Srv {
                    priority: self.config.srv_priority,
                    weight: self.config.srv_weight,
                    port: self.config.port,
                    target: self.host.clone(),
                },
            ),
            (
                self.fqdn.clone(),
                DNSCLASS_INET_FLUSH,
                RESPONSE_TTL,
                RecordData::Txt(self.txt.clone()),
            ),
            (
                self.service_name.clone(),
                DNSCLASS_INET,
                PTR_TTL,
                RecordData::Ptr(self.fqdn.clone()),
            ),
        ];

        let mut buf = [0u8; MAX_MESSAGE_LEN];
        match build_response(&mut buf, &answers) {
            Ok(raw) => {
                log::debug!("announcing {}", self.fqdn);
                self.queue_packet(raw, MDNS_DEST_ADDR, now);
            }
            Err(err) => log::error!("failed to build announcement: {err}"),
        }
    }

    fn process_message(&mut self, msg: &TaggedBytesMut) {
        let parsed = match Message::parse(&msg.message) {
            Ok(m) => m,
            Err(err) => {
                log::debug!(
                    "dropping datagram from {}: {err}",
                    msg.transport.peer_addr
                );
                return;
            }
        };

        if self.state != ResponderState::Started {
            return;
        }
        if msg.transport.peer_addr.ip() == IpAddr::V4(self.config.local_ip) {
            return;
        }
        if parsed.header.response {
            return;
        }

        // Collect the records matching the questions before building,
        // so the parsed views can be released. Each record goes into the
        // response at most once: repeated or overlapping questions must
        // not bloat the message past the build buffer.
        let mut answers: Vec<(Name, DnsClass, u32, RecordData)> = Vec::new();
        let mut unicast = false;
        let (mut has_a, mut has_srv, mut has_txt, mut has_ptr) = (false, false, false, false);
        for q in &parsed.questions {
            unicast |= q.qclass.high_bit();

            if !has_a
                && self.host.eq_wire(q.name)
                && matches!(q.qtype, DnsType::A | DnsType::Any)
            {
                has_a = true;
                answers.push((
                    self.host.clone(),
                    DNSCLASS_INET_FLUSH,
                    RESPONSE_TTL,
                    RecordData::A(self.config.local_ip),
                ));
            }
            if self.fqdn.eq_wire(q.name) {
                if !has_srv && matches!(q.qtype, DnsType::Srv | DnsType::Any) {
                    has_srv = true;
                    answers.push((
                        self.fqdn.clone(),
                        DNSCLASS_INET_FLUSH,
                        RESPONSE_TTL,
                        RecordData::Srv {
                            priority: self.config.srv_priority,
                            weight: self.config.srv_weight,
                            port: self.config.port,
                            target: self.host.clone(),
                        },
                    ));
                }
                if !has_txt && matches!(q.qtype, DnsType::Txt | DnsType::Any) {
                    has_txt = true;
                    answers.push((
                        self.fqdn.clone(),
                        DNSCLASS_INET_FLUSH,
                        RESPONSE_TTL,
                        RecordData::Txt(self.txt.clone()),
                    ));
                }
            }
            if !has_ptr
                && self.service_name.eq_wire(q.name)
                && matches!(q.qtype, DnsType::Ptr | DnsType::Any)
            {
                has_ptr = true;
                answers.push((
                    self.service_name.clone(),
                    DNSCLASS_INET,
                    PTR_TTL,
                    RecordData::Ptr(self.fqdn.clone()),
                ));
            }
        }

        if answers.is_empty() {
            return;
        }

        let peer = msg.transport.peer_addr;
        let dest = if unicast { peer } else { MDNS_DEST_ADDR };

        let mut buf = [0u8; MAX_MESSAGE_LEN];
        match build_response(&mut buf, &answers) {
            Ok(raw) => {
                log::trace!("answering query from {peer} with {} record(s)", answers.len());
                self.queue_packet(raw, dest, msg.now);
                self.event_outs
                    .push_back(ResponderEvent::QueryAnswered(peer));
            }
            Err(err) => log::error!("failed to build response for {peer}: {err}"),
        }
    }

    fn queue_packet(&mut self, raw: BytesMut, peer_addr: SocketAddr, now: Instant) {
        self.write_outs.push_back(TransportMessage {
            now,
            transport: TransportContext {
                local_addr: SocketAddr::new(IpAddr::V4(self.config.local_ip), MDNS_PORT),
                peer_addr,
                transport_protocol: TransportProtocol::UDP,
            },
            message: raw,
        });
    }
}

fn build_response(
    buf: &mut [u8],
    answers: &[(Name, DnsClass, u32, RecordData)],
) -> Result<BytesMut> {
    let mut writer = MessageWriter::for_response(buf)?;
    for (name, class, ttl, record) in answers {
        writer.add_answer(name, *class, *ttl, record)?;
    }
    Ok(BytesMut::from(writer.bytes()))
}

#[cfg(test)]
mod responder_test;
