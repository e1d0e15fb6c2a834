use super::name::Name;
use super::record::RecordData;
use super::{
    ANCOUNT_OFF, DnsClass, DnsType, HEADER_LEN, QDCOUNT_OFF, UINT16_LEN, UINT32_LEN,
};
use crate::error::{Error, Result};

const RESPONSE_FLAGS: u16 = (1 << 15) | (1 << 10); // qr + aa, rcode 0

/// Cursor-based writer that assembles one DNS message in a caller-owned
/// buffer.
///
/// The writer borrows the scratch buffer for the duration of one build;
/// [`bytes()`](MessageWriter::bytes) returns the filled prefix. Every
/// write checks headroom first and fails with
/// [`Error::ErrBufferOverrun`] instead of running past the buffer end.
///
/// No name compression is performed on the write path: every name is
/// emitted in full, even when it duplicates a name already in the
/// message. Packets come out larger than strictly necessary but remain
/// protocol-valid.
#[derive(Debug)]
pub struct MessageWriter<'a> {
    buf: &'a mut [u8],
    cur: usize,
}

impl<'a> MessageWriter<'a> {
    /// Start a standard query: the header-sized prefix is zero-filled
    /// and the cursor placed just past it.
    pub fn for_query(buf: &'a mut [u8]) -> Result<Self> {
        Self::init(buf, false)
    }

    /// Start a response: like a query, but with the response and
    /// authoritative-answer flags preset (rcode 0).
    pub fn for_response(buf: &'a mut [u8]) -> Result<Self> {
        Self::init(buf, true)
    }

    fn init(buf: &'a mut [u8], response: bool) -> Result<Self> {
        if buf.len() < HEADER_LEN {
            return Err(Error::ErrBufferOverrun);
        }
        buf[..HEADER_LEN].fill(0);
        if response {
            buf[2..4].copy_from_slice(&RESPONSE_FLAGS.to_be_bytes());
        }
        Ok(Self {
            buf,
            cur: HEADER_LEN,
        })
    }

    fn ensure(&self, n: usize) -> Result<()> {
        if self.cur + n > self.buf.len() {
            return Err(Error::ErrBufferOverrun);
        }
        Ok(())
    }

    /// Write a big-endian u16 at the cursor, advancing it.
    pub(crate) fn write_u16(&mut self, n: u16) -> Result<()> {
        self.ensure(UINT16_LEN)?;
        self.buf[self.cur..self.cur + UINT16_LEN].copy_from_slice(&n.to_be_bytes());
        self.cur += UINT16_LEN;
        Ok(())
    }

    /// Write a big-endian u32 at the cursor, advancing it.
    pub(crate) fn write_u32(&mut self, n: u32) -> Result<()> {
        self.ensure(UINT32_LEN)?;
        self.buf[self.cur..self.cur + UINT32_LEN].copy_from_slice(&n.to_be_bytes());
        self.cur += UINT32_LEN;
        Ok(())
    }

    /// Copy an encoded name verbatim at the cursor, terminator included.
    pub(crate) fn write_name(&mut self, name: &Name) -> Result<()> {
        self.write_raw(name.as_bytes())
    }

    pub(crate) fn write_raw(&mut self, bytes: &[u8]) -> Result<()> {
        self.ensure(bytes.len())?;
        self.buf[self.cur..self.cur + bytes.len()].copy_from_slice(bytes);
        self.cur += bytes.len();
        Ok(())
    }

    /// Append one question and bump the header's question count.
    ///
    /// The caller is responsible for passing a valid qtype/qclass pair;
    /// this layer does not re-validate on write.
    pub fn add_question(&mut self, qname: &Name, qtype: DnsType, qclass: DnsClass) -> Result<()> {
        self.write_name(qname)?;
        self.write_u16(qtype as u16)?;
        self.write_u16(qclass.0)?;
        self.bump_count(QDCOUNT_OFF)
    }

    /// Append one answer record and bump the header's answer count.
    ///
    /// `class` may carry the cache-flush bit
    /// ([`DNSCLASS_INET_FLUSH`](super::DNSCLASS_INET_FLUSH)); the record
    /// supplies its own type code, rdlength, and payload bytes.
    pub fn add_answer(
        &mut self,
        name: &Name,
        class: DnsClass,
        ttl: u32,
        record: &RecordData,
    ) -> Result<()> {
        self.write_name(name)?;
        self.write_u16(record.dns_type() as u16)?;
        self.write_u16(class.0)?;
        self.write_u32(ttl)?;
        self.write_u16(record.length())?;
        record.transfer(self)?;
        self.bump_count(ANCOUNT_OFF)
    }

    fn bump_count(&mut self, off: usize) -> Result<()> {
        let count = u16::from_be_bytes([self.buf[off], self.buf[off + 1]]);
        let count = count.checked_add(1).ok_or(match off {
            QDCOUNT_OFF => Error::ErrTooManyQuestions,
            _ => Error::ErrTooManyAnswers,
        })?;
        self.buf[off..off + UINT16_LEN].copy_from_slice(&count.to_be_bytes());
        Ok(())
    }

    /// The assembled message: the filled prefix of the scratch buffer.
    pub fn bytes(&self) -> &[u8] {
        &self.buf[..self.cur]
    }

    /// Bytes written so far, header included.
    pub fn len(&self) -> usize {
        self.cur
    }

    pub fn is_empty(&self) -> bool {
        self.cur == 0
    }
}
