//! Big-endian primitives and Java modified UTF-8 strings

use crate::error::{KeystoreError, Result};
use crate::format::KeystoreFormat;

/// Cursor over keystore bytes
pub(crate) struct DataReader<'a> {
    data: &'a [u8],
    pos: usize,
    format: KeystoreFormat,
}

impl<'a> DataReader<'a> {
    pub(crate) fn new(data: &'a [u8], format: KeystoreFormat) -> Self {
        Self {
            data,
            pos: 0,
            format,
        }
    }

    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    pub(crate) fn consumed(&self) -> &'a [u8] {
        &self.data[..self.pos]
    }

    pub(crate) fn remaining(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    pub(crate) fn error(&self, message: impl Into<String>) -> KeystoreError {
        KeystoreError::format(self.format, message)
    }

    pub(crate) fn bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.data.len())
            .ok_or_else(|| {
                self.error(format!("unexpected end of data at offset {}", self.pos))
            })?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    pub(crate) fn peek_u8(&self) -> Result<u8> {
        self.data
            .get(self.pos)
            .copied()
            .ok_or_else(|| self.error("unexpected end of data"))
    }

    pub(crate) fn u8(&mut self) -> Result<u8> {
        Ok(self.bytes(1)?[0])
    }

    pub(crate) fn u16(&mut self) -> Result<u16> {
        Ok(u16::from_be_bytes(self.array()?))
    }

    pub(crate) fn u32(&mut self) -> Result<u32> {
        Ok(u32::from_be_bytes(self.array()?))
    }

    pub(crate) fn u64(&mut self) -> Result<u64> {
        Ok(u64::from_be_bytes(self.array()?))
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.bytes(N)?);
        Ok(out)
    }

    /// Length-prefixed (u32) byte block
    pub(crate) fn block(&mut self) -> Result<&'a [u8]> {
        let len = self.u32()? as usize;
        self.bytes(len)
    }

    /// String written by Java's `DataOutput.writeUTF`
    pub(crate) fn utf(&mut self) -> Result<String> {
        let len = usize::from(self.u16()?);
        let raw = self.bytes(len)?;
        decode_modified_utf8(raw).ok_or_else(|| self.error("malformed modified UTF-8 string"))
    }
}

/// Append-only keystore writer
#[derive(Default)]
pub(crate) struct DataWriter {
    buf: Vec<u8>,
}

impl DataWriter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    pub(crate) fn into_inner(self) -> Vec<u8> {
        self.buf
    }

    pub(crate) fn bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub(crate) fn u32(&mut self, value: u32) {
        self.bytes(&value.to_be_bytes());
    }

    pub(crate) fn u64(&mut self, value: u64) {
        self.bytes(&value.to_be_bytes());
    }

    pub(crate) fn block(&mut self, bytes: &[u8]) -> Result<()> {
        let len = u32::try_from(bytes.len())
            .map_err(|_| KeystoreError::internal("block exceeds 4 GiB"))?;
        self.u32(len);
        self.bytes(bytes);
        Ok(())
    }

    pub(crate) fn utf(&mut self, value: &str) -> Result<()> {
        let encoded = encode_modified_utf8(value);
        let len = u16::try_from(encoded.len())
            .map_err(|_| KeystoreError::internal(format!("string too long: {} bytes", encoded.len())))?;
        self.bytes(&len.to_be_bytes());
        self.bytes(&encoded);
        Ok(())
    }
}

/// Decode Java modified UTF-8 (CESU-8 with `0xC0 0x80` for NUL)
pub(crate) fn decode_modified_utf8(raw: &[u8]) -> Option<String> {
    let mut units = Vec::with_capacity(raw.len());
    let mut i = 0;
    while i < raw.len() {
        let b0 = u16::from(raw[i]);
        let (unit, width) = match raw[i] {
            0x01..=0x7F => (b0, 1),
            0xC0..=0xDF => {
                let b1 = continuation(raw.get(i + 1))?;
                (((b0 & 0x1F) << 6) | b1, 2)
            }
            0xE0..=0xEF => {
                let b1 = continuation(raw.get(i + 1))?;
                let b2 = continuation(raw.get(i + 2))?;
                (((b0 & 0x0F) << 12) | (b1 << 6) | b2, 3)
            }
            _ => return None,
        };
        units.push(unit);
        i += width;
    }
    String::from_utf16(&units).ok()
}

fn continuation(byte: Option<&u8>) -> Option<u16> {
    byte.filter(|b| *b & 0xC0 == 0x80).map(|b| u16::from(*b & 0x3F))
}

/// Encode as Java modified UTF-8
pub(crate) fn encode_modified_utf8(value: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(value.len());
    for unit in value.encode_utf16() {
        match unit {
            0x0001..=0x007F => out.push(unit as u8),
            0x0000 | 0x0080..=0x07FF => {
                out.push(0xC0 | (unit >> 6) as u8);
                out.push(0x80 | (unit & 0x3F) as u8);
            }
            _ => {
                out.push(0xE0 | (unit >> 12) as u8);
                out.push(0x80 | ((unit >> 6) & 0x3F) as u8);
                out.push(0x80 | (unit & 0x3F) as u8);
            }
        }
    }
    out
}
