use std::fmt;

use super::name::encoded_name_len;
use super::{DnsClass, DnsType, HEADER_LEN, Header, UINT16_LEN, UINT32_LEN};
use crate::config::{MAX_ANSWERS, MAX_QUESTIONS};
use crate::error::{Error, Result};

/// A parsed question: views into the datagram buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question<'a> {
    /// The encoded qname, terminator (or pointer) included.
    pub name: &'a [u8],
    pub qtype: DnsType,
    /// Class IN, possibly with the unicast-response bit set.
    pub qclass: DnsClass,
}

impl fmt::Display for Question<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "dnsmessage.Question{{name: {} bytes, qtype: {}, qclass: {}}}",
            self.name.len(),
            self.qtype,
            self.qclass
        )
    }
}

/// A parsed answer record. The rdata bytes are bounds-checked but not
/// interpreted; their meaning is type-specific and deferred to the
/// caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer<'a> {
    /// The encoded name, terminator (or pointer) included.
    pub name: &'a [u8],
    pub typ: u16,
    pub class: DnsClass,
    /// Time to live in seconds.
    pub ttl: u32,
    /// Raw resource data.
    pub rdata: &'a [u8],
}

/// A bounds-checked view of one received datagram.
///
/// Questions and answers borrow the parse buffer and are invalidated
/// with it; the message never owns the buffer.
#[derive(Debug)]
pub struct Message<'a> {
    pub header: Header,
    pub questions: Vec<Question<'a>>,
    pub answers: Vec<Answer<'a>>,
}

impl<'a> Message<'a> {
    /// Parse a full datagram.
    ///
    /// Any structural violation (non-zero opcode, invalid question
    /// type or class, oversized label, truncated record) discards the
    /// whole message; there is no partial acceptance. Malformed input
    /// never moves the cursor past the buffer end.
    ///
    /// Section counts beyond the fixed capacities
    /// ([`MAX_QUESTIONS`](crate::config::MAX_QUESTIONS) /
    /// [`MAX_ANSWERS`](crate::config::MAX_ANSWERS)) are not an error:
    /// the excess entries are traversed so the cursor stays in sync,
    /// but only the first entries are retained.
    pub fn parse(buf: &'a [u8]) -> Result<Message<'a>> {
        let header = Header::unpack(buf)?;
        if header.opcode != 0 {
            return Err(Error::ErrMalformedHeader);
        }

        let mut cur = Cursor {
            buf,
            off: HEADER_LEN,
        };

        let mut questions = Vec::with_capacity((header.qdcount as usize).min(MAX_QUESTIONS));
        for i in 0..header.qdcount as usize {
            let name = cur.name()?;
            let qtype = DnsType::from(cur.read_u16()?);
            let qclass = DnsClass(cur.read_u16()?);
            if i >= MAX_QUESTIONS {
                continue;
            }
            if qtype == DnsType::Unsupported {
                return Err(Error::ErrInvalidQuestionType);
            }
            if !qclass.is_inet() {
                return Err(Error::ErrInvalidQuestionClass);
            }
            questions.push(Question {
                name,
                qtype,
                qclass,
            });
        }

        let mut answers = Vec::with_capacity((header.ancount as usize).min(MAX_ANSWERS));
        for i in 0..header.ancount as usize {
            let name = cur.name()?;
            let typ = cur.read_u16()?;
            let class = DnsClass(cur.read_u16()?);
            let ttl = cur.read_u32()?;
            let rdlength = cur.read_u16()? as usize;
            let rdata = cur.slice(rdlength)?;
            if i >= MAX_ANSWERS {
                continue;
            }
            answers.push(Answer {
                name,
                typ,
                class,
                ttl,
                rdata,
            });
        }

        Ok(Message {
            header,
            questions,
            answers,
        })
    }
}

/// Read cursor over one datagram buffer. Every advance is checked
/// against the buffer end first.
struct Cursor<'a> {
    buf: &'a [u8],
    off: usize,
}

impl<'a> Cursor<'a> {
    fn read_u16(&mut self) -> Result<u16> {
        if self.off + UINT16_LEN > self.buf.len() {
            return Err(Error::ErrBufferOverrun);
        }
        let n = u16::from_be_bytes([self.buf[self.off], self.buf[self.off + 1]]);
        self.off += UINT16_LEN;
        Ok(n)
    }

    fn read_u32(&mut self) -> Result<u32> {
        if self.off + UINT32_LEN > self.buf.len() {
            return Err(Error::ErrBufferOverrun);
        }
        let n = u32::from_be_bytes([
            self.buf[self.off],
            self.buf[self.off + 1],
            self.buf[self.off + 2],
            self.buf[self.off + 3],
        ]);
        self.off += UINT32_LEN;
        Ok(n)
    }

    /// Advance past one encoded name and return the scanned bytes.
    /// Compression pointers terminate the name without being followed.
    fn name(&mut self) -> Result<&'a [u8]> {
        let len = encoded_name_len(self.buf, self.off)?;
        let name = &self.buf[self.off..self.off + len];
        self.off += len;
        Ok(name)
    }

    fn slice(&mut self, len: usize) -> Result<&'a [u8]> {
        if self.off + len > self.buf.len() {
            return Err(Error::ErrBufferOverrun);
        }
        let s = &self.buf[self.off..self.off + len];
        self.off += len;
        Ok(s)
    }
}
