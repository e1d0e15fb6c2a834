//! Configuration for the mDNS responder.
//!
//! The service descriptor: instance name, service type, domain, host
//! name, address, port, and TXT payload, plus the timing knobs of the
//! claim lifecycle.
//!
//! # Example
//!
//! ```rust
//! use mdns_responder::ServiceConfig;
//! use std::net::Ipv4Addr;
//!
//! let config = ServiceConfig::new("andrey", "_http._tcp", "local")
//!     .with_host("andrey.local")
//!     .with_local_ip(Ipv4Addr::new(192, 168, 1, 2))
//!     .with_port(80)
//!     .with_txt("path=index.html");
//! ```

use std::net::Ipv4Addr;
use std::time::Duration;

/// Interval between proactive state-machine ticks (probe and announce
/// transmissions).
pub const MDNS_TICK_INTERVAL: Duration = Duration::from_millis(250);

/// Probes sent before announcing.
///
/// The lifecycle implemented here is the minimal subset: it probes to
/// ask for the name, then claims it unconditionally. RFC-level triple
/// probing with conflict resolution is future scope.
pub(crate) const DEFAULT_PROBE_COUNT: u8 = 1;

/// TTL (seconds) for announced and served records.
pub(crate) const RESPONSE_TTL: u32 = 225;

/// TTL (seconds) for the service-enumeration PTR record.
pub(crate) const PTR_TTL: u32 = 255;

/// Question capacity of one parsed message; excess questions are
/// traversed but not retained.
pub const MAX_QUESTIONS: usize = 8;

/// Answer capacity of one parsed message.
pub const MAX_ANSWERS: usize = 16;

/// Size of the scratch buffers messages are built in. Matches the
/// datagram size this responder is prepared to receive.
pub const MAX_MESSAGE_LEN: usize = 1000;

/// Service descriptor and timing knobs for a [`Responder`](crate::Responder).
///
/// Use the builder pattern to construct a configuration:
///
/// ```rust
/// use mdns_responder::ServiceConfig;
/// use std::net::Ipv4Addr;
///
/// let config = ServiceConfig::new("printer", "_ipp._tcp", "local")
///     .with_host("printer.local")
///     .with_local_ip(Ipv4Addr::new(10, 0, 0, 7))
///     .with_port(631);
/// ```
#[derive(Clone, Debug)]
pub struct ServiceConfig {
    /// Instance name, e.g. `"andrey"`.
    pub instance: String,

    /// Service type, e.g. `"_http._tcp"`.
    pub service_type: String,

    /// Domain, virtually always `"local"`.
    pub domain: String,

    /// Host name the SRV record targets and the A record names,
    /// e.g. `"andrey.local"`.
    pub host: String,

    /// IPv4 address advertised in the A record. Also used to recognize
    /// (and ignore) the responder's own multicast traffic.
    pub local_ip: Ipv4Addr,

    /// Port advertised in the SRV record.
    pub port: u16,

    /// TXT payload, e.g. `"path=index.html"`.
    pub txt: String,

    /// SRV priority. Zero unless the deployment has multiple targets.
    pub srv_priority: u16,

    /// SRV weight.
    pub srv_weight: u16,

    /// Probe transmissions before the announcement.
    pub probe_count: u8,

    /// Interval between proactive ticks. A zero duration falls back to
    /// [`MDNS_TICK_INTERVAL`].
    pub tick_interval: Duration,
}

impl ServiceConfig {
    /// Create a configuration for `<instance>.<service_type>.<domain>`.
    pub fn new(instance: &str, service_type: &str, domain: &str) -> Self {
        Self {
            instance: instance.to_owned(),
            service_type: service_type.to_owned(),
            domain: domain.to_owned(),
            host: format!("{instance}.{domain}"),
            local_ip: Ipv4Addr::UNSPECIFIED,
            port: 0,
            txt: String::new(),
            srv_priority: 0,
            srv_weight: 0,
            probe_count: DEFAULT_PROBE_COUNT,
            tick_interval: MDNS_TICK_INTERVAL,
        }
    }

    /// Set the host name targeted by the SRV record and named by the A
    /// record. Defaults to `<instance>.<domain>`.
    pub fn with_host(mut self, host: &str) -> Self {
        self.host = host.to_owned();
        self
    }

    /// Set the advertised IPv4 address.
    pub fn with_local_ip(mut self, ip: Ipv4Addr) -> Self {
        self.local_ip = ip;
        self
    }

    /// Set the advertised service port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the TXT payload.
    pub fn with_txt(mut self, txt: &str) -> Self {
        self.txt = txt.to_owned();
        self
    }

    /// Set the SRV priority and weight.
    pub fn with_srv_priority_weight(mut self, priority: u16, weight: u16) -> Self {
        self.srv_priority = priority;
        self.srv_weight = weight;
        self
    }

    /// Set how many probes are sent before announcing.
    pub fn with_probe_count(mut self, count: u8) -> Self {
        self.probe_count = count.max(1);
        self
    }

    /// Set the proactive tick interval.
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    /// The fully-qualified service instance name,
    /// `<instance>.<service_type>.<domain>`.
    pub fn instance_fqdn(&self) -> String {
        format!("{}.{}.{}", self.instance, self.service_type, self.domain)
    }

    /// The service-enumeration name, `<service_type>.<domain>`.
    pub fn service_name(&self) -> String {
        format!("{}.{}", self.service_type, self.domain)
    }
}
