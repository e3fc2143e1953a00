// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

use x86_codec_types::{CodecError, CodecResult};

/// Pull-based byte source. Implementers need only provide `byte`, `pos`, and
/// `set_pos`; `word`/`dword` are composed from `byte` by the default trait
/// methods, little-endian.
pub trait ByteStream {
    fn byte(&mut self) -> CodecResult<u8>;
    fn pos(&self) -> u32;
    fn set_pos(&mut self, addr: u32);

    fn word(&mut self) -> CodecResult<u16> {
        let lo = self.byte()? as u16;
        let hi = self.byte()? as u16;
        Ok((hi << 8) | lo)
    }

    fn dword(&mut self) -> CodecResult<u32> {
        let lo = self.word()? as u32;
        let hi = self.word()? as u32;
        Ok((hi << 16) | lo)
    }
}

/// A byte stream backed by an in-memory buffer, addressed the same way the
/// virtual address space is: `set_pos(addr)` treats `addr` as an index into
/// `bytes` (offset by the stream's base address), matching how the decoder
/// and encoder both pass the instruction's start address.
pub struct SliceByteStream<'a> {
    bytes: &'a [u8],
    base: u32,
    pos: u32,
    origin: u32,
}

/// No x86/32 instruction is longer than this many bytes; exceeding it is an
/// `InvalidInstruction`, not an internal error — see §4.1.
pub const MAX_INSTRUCTION_LEN: u32 = 15;

impl<'a> SliceByteStream<'a> {
    /// `base` is the virtual address of `bytes[0]`.
    pub fn new(bytes: &'a [u8], base: u32) -> SliceByteStream<'a> {
        SliceByteStream {
            bytes,
            base,
            pos: base,
            origin: base,
        }
    }
}

impl<'a> ByteStream for SliceByteStream<'a> {
    fn byte(&mut self) -> CodecResult<u8> {
        if self.pos.wrapping_sub(self.origin) >= MAX_INSTRUCTION_LEN {
            return Err(CodecError::invalid(format!(
                "instruction exceeds {MAX_INSTRUCTION_LEN} bytes"
            )));
        }
        let index = self.pos.wrapping_sub(self.base) as usize;
        let b = *self
            .bytes
            .get(index)
            .ok_or_else(|| CodecError::invalid("byte stream exhausted"))?;
        self.pos = self.pos.wrapping_add(1);
        Ok(b)
    }

    fn pos(&self) -> u32 {
        self.pos
    }

    fn set_pos(&mut self, addr: u32) {
        self.pos = addr;
        self.origin = addr;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_little_endian() {
        let bytes = [0x78, 0x56, 0x34, 0x12];
        let mut s = SliceByteStream::new(&bytes, 0);
        assert_eq!(s.dword().unwrap(), 0x12345678);
    }

    #[test]
    fn caps_at_fifteen_bytes_per_set_pos() {
        let bytes = [0u8; 20];
        let mut s = SliceByteStream::new(&bytes, 0);
        for _ in 0..15 {
            s.byte().unwrap();
        }
        assert!(s.byte().is_err());
    }

    #[test]
    fn set_pos_resets_the_cap() {
        let bytes = [0u8; 20];
        let mut s = SliceByteStream::new(&bytes, 0);
        for _ in 0..15 {
            s.byte().unwrap();
        }
        s.set_pos(15);
        assert!(s.byte().is_ok());
    }
}
