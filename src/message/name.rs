use std::fmt;

use super::{MAX_LABEL_LEN, MAX_NAME_LEN, POINTER_MASK};
use crate::error::{Error, Result};

/// An owned, validated domain name in wire encoding: a sequence of
/// length-prefixed labels followed by the terminating zero byte.
///
/// Names constructed through this type never contain a compression
/// pointer; pointers only appear in names received off the wire, and the
/// write path always emits names in full.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct Name {
    data: Vec<u8>,
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut off = 0;
        while off < self.data.len() {
            let len = self.data[off] as usize;
            if len == 0 {
                break;
            }
            off += 1;
            for &b in &self.data[off..off + len] {
                write!(f, "{}", b as char)?;
            }
            write!(f, ".")?;
            off += len;
        }
        Ok(())
    }
}

impl Name {
    /// Encode a dotted name such as `"andrey._http._tcp.local"`.
    ///
    /// A trailing dot is accepted and ignored. Each label must be 1-63
    /// bytes and the full encoding (terminator included) must fit in 255
    /// bytes.
    pub fn from_dotted(name: &str) -> Result<Self> {
        let trimmed = name.strip_suffix('.').unwrap_or(name);
        if trimmed.is_empty() {
            return Err(Error::ErrMalformedName);
        }

        let mut data = Vec::with_capacity(trimmed.len() + 2);
        for label in trimmed.split('.') {
            if label.is_empty() || label.len() > MAX_LABEL_LEN as usize {
                return Err(Error::ErrMalformedName);
            }
            data.push(label.len() as u8);
            data.extend_from_slice(label.as_bytes());
        }
        data.push(0);

        if data.len() > MAX_NAME_LEN {
            return Err(Error::ErrNameTooLong);
        }
        Ok(Self { data })
    }

    /// The full encoded length, terminator included.
    pub fn wire_len(&self) -> u16 {
        self.data.len() as u16
    }

    /// The encoded label sequence, terminator included.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Compare against a name slice taken from a received message.
    ///
    /// DNS names compare case-insensitively in the ASCII range.
    pub fn eq_wire(&self, wire: &[u8]) -> bool {
        self.data.eq_ignore_ascii_case(wire)
    }
}

/// Returns the encoded length of the name starting at `off`, including
/// the terminating zero byte or the two-byte compression pointer.
///
/// Pointers are recognized but never followed; from the cursor's
/// perspective a pointer ends the name. A label length above 63 means the
/// name (and the whole message) is malformed.
pub(crate) fn encoded_name_len(buf: &[u8], off: usize) -> Result<usize> {
    let mut cur = off;
    loop {
        let b = *buf.get(cur).ok_or(Error::ErrBufferOverrun)?;
        if b == 0 {
            cur += 1;
            break;
        }
        if b & POINTER_MASK == POINTER_MASK {
            cur += 2;
            break;
        }
        if b > MAX_LABEL_LEN {
            return Err(Error::ErrMalformedName);
        }
        cur += 1 + b as usize;
    }
    if cur > buf.len() {
        return Err(Error::ErrBufferOverrun);
    }
    Ok(cur - off)
}
