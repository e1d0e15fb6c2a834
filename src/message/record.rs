use std::fmt;
use std::net::Ipv4Addr;

use super::builder::MessageWriter;
use super::name::Name;
use super::{DnsType, MAX_NAME_LEN, UINT16_LEN, UINT32_LEN};
use crate::error::{Error, Result};

/// A TXT payload: one length-prefixed character string, encoded with the
/// same length-prefix convention labels use, followed by a terminating
/// zero byte.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct TxtData {
    data: Vec<u8>,
}

impl TxtData {
    /// Encode a text payload such as `"path=index.html"`.
    pub fn new(text: &str) -> Result<Self> {
        if text.len() + 2 > MAX_NAME_LEN {
            return Err(Error::ErrCharacterStringTooLong);
        }
        let mut data = Vec::with_capacity(text.len() + 2);
        data.push(text.len() as u8);
        data.extend_from_slice(text.as_bytes());
        data.push(0);
        Ok(Self { data })
    }

    /// The full encoded length, terminator included.
    pub fn wire_len(&self) -> u16 {
        self.data.len() as u16
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

impl fmt::Display for TxtData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in self.data.iter().skip(1).take(self.data.len().saturating_sub(2)) {
            write!(f, "{}", b as char)?;
        }
        Ok(())
    }
}

/// The payload of one outgoing resource record.
///
/// Each variant knows the encoded length of its payload and how to
/// serialize it at the message cursor, so the assembly layer stays
/// ignorant of record-type internals: it writes `length()` as the
/// rdlength field and then calls `transfer()`, uniformly for every kind.
/// Adding a record type means adding a variant here and nothing else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordData {
    /// IPv4 host address.
    A(Ipv4Addr),
    /// Canonical name.
    Cname(Name),
    /// Authoritative name server.
    Ns(Name),
    /// Domain name pointer, used by service enumeration.
    Ptr(Name),
    /// Service locator.
    Srv {
        priority: u16,
        weight: u16,
        port: u16,
        target: Name,
    },
    /// Opaque text payload.
    Txt(TxtData),
}

impl fmt::Display for RecordData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordData::A(ip) => write!(f, "A {ip}"),
            RecordData::Cname(name) => write!(f, "CNAME {name}"),
            RecordData::Ns(name) => write!(f, "NS {name}"),
            RecordData::Ptr(name) => write!(f, "PTR {name}"),
            RecordData::Srv {
                priority,
                weight,
                port,
                target,
            } => write!(f, "SRV {priority} {weight} {port} {target}"),
            RecordData::Txt(txt) => write!(f, "TXT {txt}"),
        }
    }
}

impl RecordData {
    /// The wire type code this payload is carried under.
    pub fn dns_type(&self) -> DnsType {
        match self {
            RecordData::A(_) => DnsType::A,
            RecordData::Cname(_) => DnsType::Cname,
            RecordData::Ns(_) => DnsType::Ns,
            RecordData::Ptr(_) => DnsType::Ptr,
            RecordData::Srv { .. } => DnsType::Srv,
            RecordData::Txt(_) => DnsType::Txt,
        }
    }

    /// Encoded length of the payload, written as the rdlength field.
    pub fn length(&self) -> u16 {
        match self {
            RecordData::A(_) => UINT32_LEN as u16,
            RecordData::Cname(name) | RecordData::Ns(name) | RecordData::Ptr(name) => {
                name.wire_len()
            }
            RecordData::Srv { target, .. } => 3 * UINT16_LEN as u16 + target.wire_len(),
            RecordData::Txt(txt) => txt.wire_len(),
        }
    }

    /// Serialize the payload at the message cursor.
    pub(crate) fn transfer(&self, w: &mut MessageWriter<'_>) -> Result<()> {
        match self {
            RecordData::A(ip) => w.write_u32(u32::from(*ip)),
            RecordData::Cname(name) | RecordData::Ns(name) | RecordData::Ptr(name) => {
                w.write_name(name)
            }
            RecordData::Srv {
                priority,
                weight,
                port,
                target,
            } => {
                w.write_u16(*priority)?;
                w.write_u16(*weight)?;
                w.write_u16(*port)?;
                w.write_name(target)
            }
            RecordData::Txt(txt) => w.write_raw(txt.as_bytes()),
        }
    }
}
