use bytes::{BufMut, Bytes, BytesMut};

use crate::error::WireError;

const MAX_LABEL_LEN: usize = 63;
const MAX_NAME_LEN: usize = 255;
const POINTER_BITS: u8 = 0xC0;

/// DNS Question Section
/// Format: QNAME + QTYPE (2 bytes) + QCLASS (2 bytes)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsQuestion {
    pub name: String, // Domain name (e.g., "example.com")
    pub qtype: u16,   // Query type (A, AAAA, CNAME, etc.)
    pub qclass: u16,  // Query class (usually IN for Internet)
}

/// DNS Answer/Resource Record Section
/// Format: NAME + TYPE (2 bytes) + CLASS (2 bytes) + TTL (4 bytes) + RDLENGTH (2 bytes) + RDATA
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsAnswer {
    pub name: String,   // Domain name
    pub rtype: u16,     // Record type
    pub rclass: u16,    // Record class
    pub ttl: u32,       // Time to live in seconds
    pub rdlength: u16,  // Length of RDATA, must equal rdata.len()
    pub rdata: Vec<u8>, // Resource data
}

impl DnsQuestion {
    pub fn new(name: impl Into<String>, qtype: u16, qclass: u16) -> Self {
        DnsQuestion {
            name: name.into(),
            qtype,
            qclass,
        }
    }

    /// Parse a DNS question from bytes starting at the given offset.
    /// Returns the question and the number of bytes it occupied.
    pub fn from_bytes(bytes: &[u8], offset: usize) -> Result<(Self, usize), WireError> {
        match bytes.get(offset) {
            None => return Err(WireError::TruncatedInput),
            Some(0) => return Err(WireError::EmptyQuestionSection),
            Some(_) => {}
        }

        let (name, name_end) = parse_domain_name(bytes, offset)?;

        let fields = bytes
            .get(name_end..name_end + 4)
            .ok_or(WireError::TruncatedInput)?;
        let qtype = u16::from_be_bytes([fields[0], fields[1]]);
        let qclass = u16::from_be_bytes([fields[2], fields[3]]);

        Ok((
            DnsQuestion {
                name,
                qtype,
                qclass,
            },
            name_end + 4 - offset,
        ))
    }

    pub fn write_to(&self, buf: &mut BytesMut) -> Result<(), WireError> {
        write_domain_name(buf, &self.name)?;
        buf.put_u16(self.qtype);
        buf.put_u16(self.qclass);
        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Bytes, WireError> {
        let mut buf = BytesMut::new();
        self.write_to(&mut buf)?;
        Ok(buf.freeze())
    }
}

impl DnsAnswer {
    /// Create a new DNS answer; the length field is derived from `rdata`.
    pub fn new(name: String, rtype: u16, rclass: u16, ttl: u32, rdata: Vec<u8>) -> Self {
        let rdlength = rdata.len() as u16;
        DnsAnswer {
            name,
            rtype,
            rclass,
            ttl,
            rdlength,
            rdata,
        }
    }

    /// `rdlength` is written as-is; callers keep it equal to `rdata.len()`.
    pub fn write_to(&self, buf: &mut BytesMut) -> Result<(), WireError> {
        write_domain_name(buf, &self.name)?;
        buf.put_u16(self.rtype);
        buf.put_u16(self.rclass);
        buf.put_u32(self.ttl);
        buf.put_u16(self.rdlength);
        buf.put_slice(&self.rdata);
        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Bytes, WireError> {
        let mut buf = BytesMut::new();
        self.write_to(&mut buf)?;
        Ok(buf.freeze())
    }
}

/// Parse an uncompressed domain name starting at `offset`.
/// Returns the dotted name and the offset just past the terminating zero byte.
pub fn parse_domain_name(bytes: &[u8], mut offset: usize) -> Result<(String, usize), WireError> {
    let start = offset;
    let mut labels = Vec::new();

    loop {
        let length = *bytes.get(offset).ok_or(WireError::TruncatedInput)?;

        if length & POINTER_BITS != 0 {
            return Err(WireError::CompressedName(length));
        }

        offset += 1;
        if length == 0 {
            break;
        }

        let label = bytes
            .get(offset..offset + length as usize)
            .ok_or(WireError::TruncatedInput)?;
        let label = std::str::from_utf8(label).map_err(|_| WireError::InvalidLabel)?;

        labels.push(label);
        offset += length as usize;

        // The zero terminator still has to fit.
        if offset - start >= MAX_NAME_LEN {
            return Err(WireError::NameTooLong(labels.join(".")));
        }
    }

    let domain_name = if labels.is_empty() {
        ".".to_string() // Root domain
    } else {
        labels.join(".")
    };

    Ok((domain_name, offset))
}

/// Encode a domain name as length-prefixed labels terminated with a zero byte.
/// Example: "example.com" -> [7]example[3]com[0]
pub fn write_domain_name(buf: &mut BytesMut, name: &str) -> Result<(), WireError> {
    let start = buf.len();

    for label in name.split('.').filter(|label| !label.is_empty()) {
        if label.len() > MAX_LABEL_LEN {
            return Err(WireError::LabelTooLong(label.to_string()));
        }
        buf.put_u8(label.len() as u8);
        buf.put_slice(label.as_bytes());
    }
    buf.put_u8(0);

    if buf.len() - start > MAX_NAME_LEN {
        return Err(WireError::NameTooLong(name.to_string()));
    }

    Ok(())
}
