//! # mdns-responder
//!
//! A sans-I/O implementation of an mDNS (Multicast DNS) responder.
//!
//! The crate provides three pieces:
//!
//! - a **wire codec**: cursor-based message building
//!   ([`MessageWriter`]) and bounds-checked parsing ([`Message`]) of
//!   the compact, pointer-compressed DNS wire format,
//! - a **resource-record layer**: the closed set of record kinds this
//!   responder serves ([`RecordData`]: A, CNAME, NS, PTR, SRV, TXT),
//!   each knowing its encoded length and payload serialization,
//! - a **name-claiming state machine** ([`Responder`]): probe for the
//!   service name, announce it, then answer queries for it.
//!
//! ## Sans-I/O design
//!
//! [`Responder`] performs no I/O. The caller:
//!
//! 1. Reads packets from the network and calls
//!    [`handle_read()`](Responder::handle_read)
//! 2. Sends packets returned by [`poll_write()`](Responder::poll_write)
//! 3. Calls [`handle_timeout()`](Responder::handle_timeout) when
//!    [`poll_timeout()`](Responder::poll_timeout) expires
//! 4. Processes events from [`poll_event()`](Responder::poll_event)
//!
//! This keeps the protocol logic runtime-agnostic and testable without
//! a network.
//!
//! ## Quick start
//!
//! ```rust
//! use mdns_responder::{Responder, ResponderEvent, ServiceConfig};
//! use std::net::Ipv4Addr;
//!
//! let config = ServiceConfig::new("andrey", "_http._tcp", "local")
//!     .with_host("andrey.local")
//!     .with_local_ip(Ipv4Addr::new(192, 168, 1, 2))
//!     .with_port(80)
//!     .with_txt("path=index.html");
//!
//! let mut responder = Responder::new(config).unwrap();
//!
//! // Tick 1: the probe query goes out.
//! let deadline = responder.poll_timeout().unwrap();
//! responder.handle_timeout(deadline).unwrap();
//! assert!(responder.poll_write().is_some());
//!
//! // Tick 2: the announcement goes out and the name is claimed.
//! let deadline = responder.poll_timeout().unwrap();
//! responder.handle_timeout(deadline).unwrap();
//! assert!(responder.poll_write().is_some());
//! assert!(matches!(
//!     responder.poll_event(),
//!     Some(ResponderEvent::NameClaimed(_))
//! ));
//! ```
//!
//! ## Event loop pattern
//!
//! The typical single-threaded loop around a [`MulticastSocket`]:
//!
//! ```text
//! loop {
//!     while let Some(packet) = responder.poll_write() {
//!         socket.send_to(&packet.message, packet.transport.peer_addr);
//!     }
//!
//!     // Wait for read-readiness, capped by the responder's deadline
//!     // (250 ms ticks) so bursts of traffic never starve the timer.
//!     match wait_readable(&socket, responder.poll_timeout()) {
//!         Readable => {
//!             // Drain every available datagram before waiting again.
//!             while let Ok((len, src)) = socket.recv_from(&mut buf) {
//!                 responder.handle_read(tag(&buf[..len], src));
//!             }
//!         }
//!         TimedOut => responder.handle_timeout(Instant::now()),
//!     }
//!
//!     while let Some(event) = responder.poll_event() {
//!         // ResponderEvent::NameClaimed, ResponderEvent::QueryAnswered
//!     }
//! }
//! ```
//!
//! ## Protocol details
//!
//! - **Multicast address**: 224.0.0.251:5353 (IPv4)
//! - **Claiming**: probe (ANY/IN query for the service name), announce
//!   (A/SRV/TXT with the cache-flush class bit, PTR plain IN), respond
//! - **Write path**: no name compression; names are emitted in full
//! - **Read path**: compression pointers are recognized as name
//!   terminators but never followed

#![warn(rust_2018_idioms)]

pub mod config;
pub mod error;
pub mod message;
pub mod proto;
pub mod socket;
pub mod transport;

pub use config::{MDNS_TICK_INTERVAL, ServiceConfig};
pub use error::{Error, Result};
pub use message::{
    DNSCLASS_INET, DNSCLASS_INET_FLUSH, DnsClass, DnsType, Message, MessageWriter, Name,
    RecordData, TxtData,
};
pub use proto::{
    MDNS_DEST_ADDR, MDNS_MULTICAST_IPV4, MDNS_PORT, Responder, ResponderEvent, ResponderState,
};
pub use socket::MulticastSocket;
pub use transport::{TaggedBytesMut, TransportContext, TransportMessage, TransportProtocol};
