
pub mod builder;
pub mod name;
pub mod parser;
pub mod record;

use std::fmt;

use crate::error::{Error, Result};

// Message formats

/// A DnsType is a type of DNS request and response.
///
/// The supported set is the one this responder can serve plus ANY for
/// questions; any other numeric value in a question makes the whole
/// message invalid.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq)]
pub enum DnsType {
    A = 1,
    Ns = 2,
    Cname = 5,
    Ptr = 12,
    Txt = 16,
    Srv = 33,

    // questions only
    Any = 255,

    #[default]
    Unsupported = 0,
}

impl From<u16> for DnsType {
    fn from(v: u16) -> Self {
        match v {
            1 => DnsType::A,
            2 => DnsType::Ns,
            5 => DnsType::Cname,
            12 => DnsType::Ptr,
            16 => DnsType::Txt,
            33 => DnsType::Srv,
            255 => DnsType::Any,
            _ => DnsType::Unsupported,
        }
    }
}

impl fmt::Display for DnsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match *self {
            DnsType::A => "A",
            DnsType::Ns => "NS",
            DnsType::Cname => "CNAME",
            DnsType::Ptr => "PTR",
            DnsType::Txt => "TXT",
            DnsType::Srv => "SRV",
            DnsType::Any => "ANY",
            _ => "Unsupported",
        };
        write!(f, "{s}")
    }
}

/// A DnsClass is a type of network.
///
/// Only class IN appears in mDNS traffic. The high bit is overloaded: on
/// answers it is the cache-flush bit, on questions the unicast-response
/// bit.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq)]
pub struct DnsClass(pub u16);

/// Internet class (IN).
pub const DNSCLASS_INET: DnsClass = DnsClass(1);

/// Internet class with the cache-flush bit set, used on answers that
/// assert the authoritative current value of a record.
pub const DNSCLASS_INET_FLUSH: DnsClass = DnsClass(CLASS_HIGH_BIT | 1);

/// The overloaded high bit of the class field (cache-flush on answers,
/// unicast-response on questions).
pub const CLASS_HIGH_BIT: u16 = 0x8000;

impl fmt::Display for DnsClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let other = format!("{}", self.0);
        let s = match *self {
            DNSCLASS_INET => "ClassINET",
            DNSCLASS_INET_FLUSH => "ClassINET+flush",
            _ => other.as_str(),
        };
        write!(f, "{s}")
    }
}

impl DnsClass {
    /// Whether the class, high bit aside, is class IN.
    pub fn is_inet(&self) -> bool {
        self.0 & !CLASS_HIGH_BIT == DNSCLASS_INET.0
    }

    /// Whether the overloaded high bit is set.
    pub fn high_bit(&self) -> bool {
        self.0 & CLASS_HIGH_BIT != 0
    }
}

// Internal constants.

/// The length (in bytes) of a uint16.
pub(crate) const UINT16_LEN: usize = 2;

/// The length (in bytes) of a uint32.
pub(crate) const UINT32_LEN: usize = 4;

/// The length (in bytes) of a DNS header: six uint16s and no padding.
pub(crate) const HEADER_LEN: usize = 6 * UINT16_LEN;

/// Maximum length of a single label.
pub(crate) const MAX_LABEL_LEN: u8 = 63;

/// Maximum encoded length of a full name, terminator included.
pub(crate) const MAX_NAME_LEN: usize = 255;

/// Top two bits of a length byte mark a compression pointer.
pub(crate) const POINTER_MASK: u8 = 0xC0;

const HEADER_BIT_QR: u16 = 1 << 15; // query/response (response=1)
const HEADER_BIT_AA: u16 = 1 << 10; // authoritative
const HEADER_BIT_TC: u16 = 1 << 9; // truncated
const HEADER_BIT_RD: u16 = 1 << 8; // recursion desired
const HEADER_OPCODE_SHIFT: u16 = 11;
const HEADER_OPCODE_MASK: u16 = 0xF;
const HEADER_RCODE_MASK: u16 = 0xF;

// Byte offsets of the count fields within a packed header.
pub(crate) const QDCOUNT_OFF: usize = 4;
pub(crate) const ANCOUNT_OFF: usize = 6;

/// A DNS message header with its flags word decomposed into fields.
///
/// Flags live in host representation inside this struct; the 16-bit wire
/// form is produced and consumed exactly once per direction, at the codec
/// boundary.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// Transaction id; ignored (zero) in mDNS.
    pub id: u16,
    /// Query (false) or response (true).
    pub response: bool,
    /// Operation code, 4 bits. Anything but 0 (standard query) is
    /// rejected at parse time.
    pub opcode: u8,
    /// Authoritative answer.
    pub authoritative: bool,
    /// Truncation flag.
    pub truncated: bool,
    /// Recursion desired.
    pub recursion_desired: bool,
    /// Response code, 4 bits.
    pub rcode: u8,
    pub qdcount: u16,
    pub ancount: u16,
    pub nscount: u16,
    pub arcount: u16,
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "dnsmessage.Header{{id: {}, response: {}, opcode: {}, authoritative: {}, truncated: {}, recursion_desired: {}, rcode: {}, qdcount: {}, ancount: {}}}",
            self.id,
            self.response,
            self.opcode,
            self.authoritative,
            self.truncated,
            self.recursion_desired,
            self.rcode,
            self.qdcount,
            self.ancount,
        )
    }
}

impl Header {
    /// Pack the flag fields into their 16-bit wire form.
    pub(crate) fn flags_to_wire(&self) -> u16 {
        let mut bits = ((self.opcode as u16 & HEADER_OPCODE_MASK) << HEADER_OPCODE_SHIFT)
            | (self.rcode as u16 & HEADER_RCODE_MASK);
        if self.response {
            bits |= HEADER_BIT_QR;
        }
        if self.authoritative {
            bits |= HEADER_BIT_AA;
        }
        if self.truncated {
            bits |= HEADER_BIT_TC;
        }
        if self.recursion_desired {
            bits |= HEADER_BIT_RD;
        }
        bits
    }

    /// Decompose a 16-bit wire flags word.
    pub(crate) fn flags_from_wire(&mut self, bits: u16) {
        self.response = bits & HEADER_BIT_QR != 0;
        self.opcode = ((bits >> HEADER_OPCODE_SHIFT) & HEADER_OPCODE_MASK) as u8;
        self.authoritative = bits & HEADER_BIT_AA != 0;
        self.truncated = bits & HEADER_BIT_TC != 0;
        self.recursion_desired = bits & HEADER_BIT_RD != 0;
        self.rcode = (bits & HEADER_RCODE_MASK) as u8;
    }

    /// Parse a packed header prefix.
    pub(crate) fn unpack(buf: &[u8]) -> Result<Self> {
        if buf.len() < HEADER_LEN {
            return Err(Error::ErrBufferOverrun);
        }
        let mut h = Header {
            id: u16::from_be_bytes([buf[0], buf[1]]),
            qdcount: u16::from_be_bytes([buf[QDCOUNT_OFF], buf[QDCOUNT_OFF + 1]]),
            ancount: u16::from_be_bytes([buf[ANCOUNT_OFF], buf[ANCOUNT_OFF + 1]]),
            nscount: u16::from_be_bytes([buf[8], buf[9]]),
            arcount: u16::from_be_bytes([buf[10], buf[11]]),
            ..Default::default()
        };
        h.flags_from_wire(u16::from_be_bytes([buf[2], buf[3]]));
        Ok(h)
    }
}

pub use builder::MessageWriter;
pub use name::Name;
pub use parser::{Answer, Message, Question};
pub use record::{RecordData, TxtData};
