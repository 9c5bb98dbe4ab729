// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Bounds-checked readers and writers over DPA `pData`.

use super::DPA_MAX_DATA_LENGTH;
use crate::error::{FrameError, FrameResult};

/// Generate little-endian write methods.
///
/// Each generated method checks the payload limit (returns
/// `FrameError::WriteFailed` on overflow) and appends the value bytes.
macro_rules! impl_write_le {
    ($name:ident, $type:ty, $size:expr) => {
        pub fn $name(&mut self, value: $type) -> FrameResult<()> {
            self.reserve($size)?;
            self.buffer.extend_from_slice(&value.to_le_bytes());
            Ok(())
        }
    };
}

/// Generate little-endian read methods.
///
/// Each generated method checks the remaining length (returns
/// `FrameError::ReadFailed` on underflow) and advances the offset.
macro_rules! impl_read_le {
    ($name:ident, $type:ty, $size:expr) => {
        pub fn $name(&mut self) -> FrameResult<$type> {
            let mut bytes = [0u8; $size];
            bytes.copy_from_slice(self.read_bytes($size)?);
            Ok(<$type>::from_le_bytes(bytes))
        }
    };
}

/// Appends request parameters to a `pData` buffer.
#[derive(Debug)]
pub struct PayloadWriter {
    buffer: Vec<u8>,
    limit: usize,
}

impl Default for PayloadWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl PayloadWriter {
    pub fn new() -> Self {
        Self::with_limit(DPA_MAX_DATA_LENGTH)
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(limit.min(DPA_MAX_DATA_LENGTH)),
            limit,
        }
    }

    fn reserve(&self, len: usize) -> FrameResult<()> {
        if self.buffer.len() + len > self.limit {
            return Err(FrameError::WriteFailed {
                offset: self.buffer.len(),
                reason: format!("pData limit of {} bytes exceeded", self.limit),
            });
        }
        Ok(())
    }

    impl_write_le!(write_u8, u8, 1);
    impl_write_le!(write_u16_le, u16, 2);
    impl_write_le!(write_u32_le, u32, 4);

    pub fn write_bool(&mut self, value: bool) -> FrameResult<()> {
        self.write_u8(u8::from(value))
    }

    pub fn write_bytes(&mut self, data: &[u8]) -> FrameResult<()> {
        self.reserve(data.len())?;
        self.buffer.extend_from_slice(data);
        Ok(())
    }

    /// Write `value` as `len` little-endian bytes (at most 4).
    pub fn write_uint_le(&mut self, value: u32, len: usize) -> FrameResult<()> {
        let bytes = value.to_le_bytes();
        self.write_bytes(&bytes[..len.min(4)])
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buffer
    }
}

/// Reads response fields from a `pData` slice.
#[derive(Debug)]
pub struct PayloadReader<'a> {
    buffer: &'a [u8],
    offset: usize,
}

impl<'a> PayloadReader<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self { buffer, offset: 0 }
    }

    impl_read_le!(read_u8, u8, 1);
    impl_read_le!(read_u16_le, u16, 2);
    impl_read_le!(read_u32_le, u32, 4);
    impl_read_le!(read_i16_le, i16, 2);

    pub fn read_bool(&mut self) -> FrameResult<bool> {
        Ok(self.read_u8()? != 0)
    }

    pub fn read_bytes(&mut self, len: usize) -> FrameResult<&'a [u8]> {
        if self.offset + len > self.buffer.len() {
            return Err(FrameError::ReadFailed {
                offset: self.offset,
                reason: format!(
                    "need {} bytes, {} remaining",
                    len,
                    self.remaining()
                ),
            });
        }
        let slice = &self.buffer[self.offset..self.offset + len];
        self.offset += len;
        Ok(slice)
    }

    pub fn read_array<const N: usize>(&mut self) -> FrameResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    /// Read `len` little-endian bytes (at most 4) into a `u32`.
    pub fn read_uint_le(&mut self, len: usize) -> FrameResult<u32> {
        let bytes = self.read_bytes(len.min(4))?;
        Ok(bytes
            .iter()
            .rev()
            .fold(0u32, |acc, b| (acc << 8) | u32::from(*b)))
    }

    /// Consume everything that is left.
    pub fn read_rest(&mut self) -> &'a [u8] {
        let rest = &self.buffer[self.offset..];
        self.offset = self.buffer.len();
        rest
    }

    pub fn peek_u8(&self) -> Option<u8> {
        self.buffer.get(self.offset).copied()
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.offset)
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Reject trailing bytes the result shape does not account for.
    pub fn finish(self) -> FrameResult<()> {
        if self.offset != self.buffer.len() {
            return Err(FrameError::LengthMismatch {
                expected: self.offset,
                actual: self.buffer.len(),
            });
        }
        Ok(())
    }
}
