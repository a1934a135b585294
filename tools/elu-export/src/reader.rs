//! Bounds-checked little-endian cursor over an immutable byte buffer
//!
//! Every read checks the remaining length first. A failed read returns
//! [`DecodeError::EndOfData`] and leaves the position where it was.

use crate::error::DecodeError;
use byteorder::{ByteOrder, LittleEndian};

/// Cursor reader shared by the mesh and animation decoders
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Borrow the next `len` bytes and advance past them
    pub fn bytes(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        let available = self.remaining();
        if len > available {
            return Err(DecodeError::EndOfData {
                offset: self.pos,
                requested: len,
                available,
            });
        }
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    pub fn skip(&mut self, len: usize) -> Result<(), DecodeError> {
        self.bytes(len).map(|_| ())
    }

    /// Skip `count` records of `record_len` bytes each
    pub fn skip_records(&mut self, count: usize, record_len: usize) -> Result<(), DecodeError> {
        match count.checked_mul(record_len) {
            Some(total) => self.skip(total),
            None => Err(DecodeError::EndOfData {
                offset: self.pos,
                requested: usize::MAX,
                available: self.remaining(),
            }),
        }
    }

    pub fn u32(&mut self) -> Result<u32, DecodeError> {
        self.bytes(4).map(LittleEndian::read_u32)
    }

    pub fn i32(&mut self) -> Result<i32, DecodeError> {
        self.bytes(4).map(LittleEndian::read_i32)
    }

    pub fn f32(&mut self) -> Result<f32, DecodeError> {
        self.bytes(4).map(LittleEndian::read_f32)
    }

    /// Signed record count; negative values read as zero
    pub fn count(&mut self) -> Result<usize, DecodeError> {
        Ok(self.i32()?.max(0) as usize)
    }

    /// Fixed-width string field
    ///
    /// Cut at the first NUL, decoded as Latin-1, surrounding whitespace trimmed.
    pub fn fixed_string(&mut self, len: usize) -> Result<String, DecodeError> {
        let raw = self.bytes(len)?;
        let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
        let text: String = raw[..end].iter().map(|&b| char::from(b)).collect();
        Ok(text.trim().to_string())
    }

    pub fn vec3(&mut self) -> Result<[f32; 3], DecodeError> {
        let raw = self.bytes(12)?;
        let mut out = [0.0; 3];
        LittleEndian::read_f32_into(raw, &mut out);
        Ok(out)
    }

    pub fn vec4(&mut self) -> Result<[f32; 4], DecodeError> {
        let raw = self.bytes(16)?;
        let mut out = [0.0; 4];
        LittleEndian::read_f32_into(raw, &mut out);
        Ok(out)
    }

    /// Sixteen floats in stored order
    pub fn mat4(&mut self) -> Result<[f32; 16], DecodeError> {
        let raw = self.bytes(64)?;
        let mut out = [0.0; 16];
        LittleEndian::read_f32_into(raw, &mut out);
        Ok(out)
    }
}
