// crates/engine/src/metadata/reader.rs
use crate::error::MetadataError;

type Result<T> = std::result::Result<T, MetadataError>;

/// Bounds-checked little-endian cursor over an image.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Cursor positioned at `offset`.
    pub fn at(data: &'a [u8], offset: usize) -> Result<Self> {
        if offset > data.len() {
            return Err(MetadataError::Truncated { offset, needed: 0 });
        }
        Ok(Self { data, pos: offset })
    }

    pub const fn position(&self) -> usize {
        self.pos
    }

    pub fn bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.data.len())
            .ok_or(MetadataError::Truncated {
                offset: self.pos,
                needed: len,
            })?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    pub fn skip(&mut self, len: usize) -> Result<()> {
        self.bytes(len).map(|_| ())
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.bytes(N)?);
        Ok(out)
    }

    pub fn u8(&mut self) -> Result<u8> {
        Ok(self.array::<1>()?[0])
    }

    pub fn u16(&mut self) -> Result<u16> {
        self.array().map(u16::from_le_bytes)
    }

    pub fn u32(&mut self) -> Result<u32> {
        self.array().map(u32::from_le_bytes)
    }

    pub fn u64(&mut self) -> Result<u64> {
        self.array().map(u64::from_le_bytes)
    }

    /// Reads a 2- or 4-byte heap/table index.
    pub fn index(&mut self, wide: bool) -> Result<u32> {
        if wide {
            self.u32()
        } else {
            self.u16().map(u32::from)
        }
    }

    /// Reads a NUL-terminated byte string, consuming the terminator.
    pub fn c_str(&mut self) -> Result<&'a [u8]> {
        let rest = &self.data[self.pos..];
        let len = rest
            .iter()
            .position(|&b| b == 0)
            .ok_or(MetadataError::Truncated {
                offset: self.pos,
                needed: rest.len() + 1,
            })?;
        let s = self.bytes(len)?;
        self.pos += 1;
        Ok(s)
    }

    /// Advances to the next multiple of four relative to `base`.
    pub fn align4(&mut self, base: usize) -> Result<()> {
        let rel = self.pos - base;
        let padded = (rel + 3) & !3;
        self.skip(padded - rel)
    }
}

/// Decodes an ECMA-335 II.24.2.4 compressed unsigned integer.
///
/// Returns the value and the number of bytes it occupied.
pub fn compressed_u32(data: &[u8]) -> Option<(u32, usize)> {
    let first = *data.first()?;
    if first & 0x80 == 0 {
        Some((u32::from(first), 1))
    } else if first & 0xC0 == 0x80 {
        let second = *data.get(1)?;
        Some(((u32::from(first & 0x3F) << 8) | u32::from(second), 2))
    } else if first & 0xE0 == 0xC0 {
        let rest = data.get(1..4)?;
        let value = (u32::from(first & 0x1F) << 24)
            | (u32::from(rest[0]) << 16)
            | (u32::from(rest[1]) << 8)
            | u32::from(rest[2]);
        Some((value, 4))
    } else {
        None
    }
}
