use bytes::{Buf, BufMut};

use crate::error::WireError;

/// Size of the fixed DNS header on the wire.
pub const HEADER_LEN: usize = 12;

const QR_MASK: u16 = 1 << 15;
const RCODE_MASK: u16 = 0xF;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DnsHeader {
    pub id: u16,
    pub flags: u16,
    pub question_count: u16,
    pub answer_count: u16,
    pub authority_count: u16,
    pub additional_count: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DnsFlags {
    pub qr: bool,              // Query/Response (false = query, true = response)
    pub opcode: u8,            // Operation code (0 = standard query)
    pub aa: bool,              // Authoritative Answer
    pub tc: bool,              // Truncation
    pub rd: bool,              // Recursion Desired
    pub ra: bool,              // Recursion Available
    pub z: u8,                 // Reserved (must be 0)
    pub rcode: u8,             // Response code (0 = no error, 2 = server failure, etc.)
}

/// RCODE values this server can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseCode {
    NoError = 0,
    ServerFailure = 2,
}

impl ResponseCode {
    pub fn to_u16(self) -> u16 {
        self as u16
    }
}

impl DnsFlags {
    pub fn from_u16(flags: u16) -> Self {
        DnsFlags {
            qr: (flags & QR_MASK) != 0,
            opcode: ((flags >> 11) & 0xF) as u8,
            aa: (flags & (1 << 10)) != 0,
            tc: (flags & (1 << 9)) != 0,
            rd: (flags & (1 << 8)) != 0,
            ra: (flags & (1 << 7)) != 0,
            z: ((flags >> 4) & 0x7) as u8,
            rcode: (flags & RCODE_MASK) as u8,
        }
    }
}

impl DnsHeader {
    pub fn new(
        id: u16,
        flags: u16,
        question_count: u16,
        answer_count: u16,
        authority_count: u16,
        additional_count: u16,
    ) -> Self {
        DnsHeader {
            id,
            flags,
            question_count,
            answer_count,
            authority_count,
            additional_count,
        }
    }

    /// Decode the first 12 bytes of `bytes`. Trailing bytes are ignored.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, WireError> {
        let mut buf = bytes;
        if buf.remaining() < HEADER_LEN {
            return Err(WireError::TruncatedInput);
        }

        Ok(DnsHeader {
            id: buf.get_u16(),
            flags: buf.get_u16(),
            question_count: buf.get_u16(),
            answer_count: buf.get_u16(),
            authority_count: buf.get_u16(),
            additional_count: buf.get_u16(),
        })
    }

    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut bytes = [0u8; HEADER_LEN];
        let mut buf = &mut bytes[..];

        buf.put_u16(self.id);
        buf.put_u16(self.flags);
        buf.put_u16(self.question_count);
        buf.put_u16(self.answer_count);
        buf.put_u16(self.authority_count);
        buf.put_u16(self.additional_count);

        bytes
    }

    /// Set the QR bit: `true` marks the message as a response.
    pub fn set_response(&mut self, response: bool) {
        if response {
            self.flags |= QR_MASK;
        } else {
            self.flags &= !QR_MASK;
        }
    }

    pub fn is_response(&self) -> bool {
        self.flags & QR_MASK != 0
    }

    /// Replace the RCODE bits, leaving the rest of the flags untouched.
    pub fn set_response_code(&mut self, code: ResponseCode) {
        self.flags = (self.flags & !RCODE_MASK) | code.to_u16();
    }

    pub fn response_code(&self) -> u8 {
        (self.flags & RCODE_MASK) as u8
    }

    pub fn decoded_flags(&self) -> DnsFlags {
        DnsFlags::from_u16(self.flags)
    }
}
