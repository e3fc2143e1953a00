// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

//! The ModR/M (+SIB) codec, in its 16-bit and 32-bit address-mode variants.
//! Both directions share the same escape rules (§4.2): the displacement-only
//! forms, the SIB no-base/no-index markers, and the EBP/BP zero-displacement
//! normalization.

use crate::byte_stream::ByteStream;
use x86_codec_types::{CodecError, CodecResult, Gpr16, Gpr32};

/// The address-form part of a decoded or to-be-encoded ModR/M — everything
/// except the `reg`/`GGG` field, which is orthogonal (it carries either a
/// second register operand or a group sub-opcode).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegOrMem32 {
    Reg(Gpr32),
    Mem(MemParts32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemParts32 {
    pub base: Option<Gpr32>,
    pub index: Option<Gpr32>,
    pub scale: u8,
    pub disp: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegOrMem16 {
    Reg(Gpr16),
    Mem(MemParts16),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemParts16 {
    pub base: Option<Gpr16>,
    pub index: Option<Gpr16>,
    pub disp: Option<u16>,
}

/// The result of decoding a ModR/M byte (and its SIB/displacement tail):
/// the address-form operand plus the raw `reg` field, which the caller
/// interprets either as a register operand or as a group `GGG` selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoded<T> {
    pub rm: T,
    pub reg_field: u8,
}

pub fn mod_field(b: u8) -> u8 {
    (b >> 6) & 0b11
}

pub fn reg_field(b: u8) -> u8 {
    (b >> 3) & 0b111
}

pub fn rm_field(b: u8) -> u8 {
    b & 0b111
}

fn sign_extend_8_to_32(b: u8) -> u32 {
    (b as i8) as i32 as u32
}

fn sign_extend_8_to_16(b: u8) -> u16 {
    (b as i8) as i16 as u16
}

fn fits_i8_32(d: u32) -> bool {
    let s = d as i32;
    (-128..=127).contains(&s)
}

fn fits_i8_16(d: u16) -> bool {
    let s = d as i16;
    (-128..=127).contains(&s)
}

// ---------------------------------------------------------------------
// 32-bit addressing
// ---------------------------------------------------------------------

/// Decodes the tail of a ModR/M (+SIB+disp) given the already-consumed
/// ModR/M byte. Used both by `Group`/`RMGroup` dispatch (which peeks the
/// byte first) and by plain `RegOrMem` materialization.
pub fn decode32(
    modrm_byte: u8,
    stream: &mut dyn ByteStream,
) -> CodecResult<Decoded<RegOrMem32>> {
    let md = mod_field(modrm_byte);
    let rm = rm_field(modrm_byte);
    let reg = reg_field(modrm_byte);

    if md == 0b11 {
        let base = Gpr32::from_ordinal(rm)
            .ok_or_else(|| CodecError::internal("bad r/m field"))?;
        return Ok(Decoded {
            rm: RegOrMem32::Reg(base),
            reg_field: reg,
        });
    }

    if rm == 0b100 {
        // SIB escape.
        let sib = stream.byte()?;
        let scale = (sib >> 6) & 0b11;
        let idx_field = (sib >> 3) & 0b111;
        let base_field = sib & 0b111;
        let index = if idx_field == 0b100 {
            None
        } else {
            Gpr32::from_ordinal(idx_field)
        };
        let no_base = base_field == 0b101 && md == 0b00;
        let base = if no_base {
            None
        } else {
            Gpr32::from_ordinal(base_field)
        };
        let disp = if no_base {
            Some(stream.dword()?)
        } else {
            match md {
                0b00 => None,
                0b01 => Some(sign_extend_8_to_32(stream.byte()?)),
                0b10 => Some(stream.dword()?),
                _ => unreachable!(),
            }
        };
        return Ok(Decoded {
            rm: RegOrMem32::Mem(MemParts32 {
                base,
                index,
                scale,
                disp,
            }),
            reg_field: reg,
        });
    }

    if md == 0b00 && rm == 0b101 {
        // disp32-only escape.
        let disp = stream.dword()?;
        return Ok(Decoded {
            rm: RegOrMem32::Mem(MemParts32 {
                base: None,
                index: None,
                scale: 0,
                disp: Some(disp),
            }),
            reg_field: reg,
        });
    }

    let base = Gpr32::from_ordinal(rm);
    let disp = match md {
        0b00 => None,
        0b01 => Some(sign_extend_8_to_32(stream.byte()?)),
        0b10 => Some(stream.dword()?),
        _ => unreachable!(),
    };
    Ok(Decoded {
        rm: RegOrMem32::Mem(MemParts32 {
            base,
            index: None,
            scale: 0,
            disp,
        }),
        reg_field: reg,
    })
}

/// Encodes a ModR/M (+SIB+disp) byte sequence for the given address-form
/// operand and `reg`/`GGG` field.
pub fn encode32(rm: &RegOrMem32, reg_field: u8) -> Vec<u8> {
    match rm {
        RegOrMem32::Reg(r) => vec![0b11_000_000 | (reg_field << 3) | r.ordinal()],
        RegOrMem32::Mem(m) => encode_mem32(m, reg_field),
    }
}

fn encode_mem32(m: &MemParts32, reg_field: u8) -> Vec<u8> {
    use x86_codec_types::Gpr32::{Ebp, Esp};

    let needs_sib = m.index.is_some() || m.base == Some(Esp);

    if !needs_sib {
        if let Some(base) = m.base {
            let force_disp8_zero = base == Ebp;
            let (md, disp_bytes) = disp_mode_32(m.disp, force_disp8_zero);
            let mut out = vec![(md << 6) | (reg_field << 3) | base.ordinal()];
            out.extend(disp_bytes);
            return out;
        }
        // pure displacement, no base/index: the disp32-only escape.
        let disp = m.disp.unwrap_or(0);
        let mut out = vec![(0b00 << 6) | (reg_field << 3) | 0b101];
        out.extend(disp.to_le_bytes());
        return out;
    }

    // SIB required.
    let index_field = match m.index {
        Some(i) => i.ordinal(),
        None => 0b100,
    };
    let (md, base_field, disp_bytes) = match m.base {
        Some(base) => {
            let force_disp8_zero = base == Ebp;
            let (md, disp_bytes) = disp_mode_32(m.disp, force_disp8_zero);
            (md, base.ordinal(), disp_bytes)
        }
        None => (0b00, 0b101, m.disp.unwrap_or(0).to_le_bytes().to_vec()),
    };
    let sib = (m.scale << 6) | (index_field << 3) | base_field;
    let mut out = vec![(md << 6) | (reg_field << 3) | 0b100, sib];
    out.extend(disp_bytes);
    out
}

fn disp_mode_32(disp: Option<u32>, force_disp8_zero: bool) -> (u8, Vec<u8>) {
    match disp {
        None | Some(0) if force_disp8_zero => (0b01, vec![0]),
        None => (0b00, vec![]),
        Some(0) => (0b00, vec![]),
        Some(d) if fits_i8_32(d) => (0b01, vec![d as u8]),
        Some(d) => (0b10, d.to_le_bytes().to_vec()),
    }
}

// ---------------------------------------------------------------------
// 16-bit addressing
// ---------------------------------------------------------------------

pub fn decode16(
    modrm_byte: u8,
    stream: &mut dyn ByteStream,
) -> CodecResult<Decoded<RegOrMem16>> {
    let md = mod_field(modrm_byte);
    let rm = rm_field(modrm_byte);
    let reg = reg_field(modrm_byte);

    if md == 0b11 {
        let base = Gpr16::from_ordinal(rm)
            .ok_or_else(|| CodecError::internal("bad r/m field"))?;
        return Ok(Decoded {
            rm: RegOrMem16::Reg(base),
            reg_field: reg,
        });
    }

    use x86_codec_types::Gpr16::*;
    let (base, index) = match rm {
        0b000 => (Some(Bx), Some(Si)),
        0b001 => (Some(Bx), Some(Di)),
        0b010 => (Some(Bp), Some(Si)),
        0b011 => (Some(Bp), Some(Di)),
        0b100 => (None, Some(Si)),
        0b101 => (None, Some(Di)),
        0b110 => (Some(Bp), None),
        0b111 => (Some(Bx), None),
        _ => unreachable!(),
    };

    if md == 0b00 && rm == 0b110 {
        // disp16-only escape.
        let disp = stream.word()?;
        return Ok(Decoded {
            rm: RegOrMem16::Mem(MemParts16 {
                base: None,
                index: None,
                disp: Some(disp),
            }),
            reg_field: reg,
        });
    }

    let disp = match md {
        0b00 => None,
        0b01 => Some(sign_extend_8_to_16(stream.byte()?)),
        0b10 => Some(stream.word()?),
        _ => unreachable!(),
    };
    Ok(Decoded {
        rm: RegOrMem16::Mem(MemParts16 { base, index, disp }),
        reg_field: reg,
    })
}

pub fn encode16(rm: &RegOrMem16, reg_field: u8) -> Vec<u8> {
    match rm {
        RegOrMem16::Reg(r) => vec![0b11_000_000 | (reg_field << 3) | r.ordinal()],
        RegOrMem16::Mem(m) => encode_mem16(m, reg_field),
    }
}

fn encode_mem16(m: &MemParts16, reg_field: u8) -> Vec<u8> {
    use x86_codec_types::Gpr16::{Bp, Bx, Di, Si};

    if m.base.is_none() && m.index.is_none() {
        let disp = m.disp.unwrap_or(0);
        let mut out = vec![(0b00 << 6) | (reg_field << 3) | 0b110];
        out.extend(disp.to_le_bytes());
        return out;
    }

    let rm_bits: u8 = match (m.base, m.index) {
        (Some(Bx), Some(Si)) => 0b000,
        (Some(Bx), Some(Di)) => 0b001,
        (Some(Bp), Some(Si)) => 0b010,
        (Some(Bp), Some(Di)) => 0b011,
        (None, Some(Si)) => 0b100,
        (None, Some(Di)) => 0b101,
        (Some(Bp), None) => 0b110,
        (Some(Bx), None) => 0b111,
        _ => unreachable!("invalid 16-bit base/index pair"),
    };

    let force_disp8_zero = m.base == Some(Bp) && m.index.is_none();
    let (md, disp_bytes) = disp_mode_16(m.disp, force_disp8_zero);
    let mut out = vec![(md << 6) | (reg_field << 3) | rm_bits];
    out.extend(disp_bytes);
    out
}

fn disp_mode_16(disp: Option<u16>, force_disp8_zero: bool) -> (u8, Vec<u8>) {
    match disp {
        None | Some(0) if force_disp8_zero => (0b01, vec![0]),
        None => (0b00, vec![]),
        Some(0) => (0b00, vec![]),
        Some(d) if fits_i8_16(d) => (0b01, vec![d as u8]),
        Some(d) => (0b10, d.to_le_bytes().to_vec()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::byte_stream::SliceByteStream;
    use proptest::prelude::*;
    use x86_codec_types::Gpr32;

    #[test]
    fn decodes_register_form() {
        let bytes = [];
        let mut s = SliceByteStream::new(&bytes, 0);
        // 0xC0 = MOD=11, reg=000, r/m=000
        let d = decode32(0xC0, &mut s).unwrap();
        assert_eq!(d.reg_field, 0);
        assert_eq!(d.rm, RegOrMem32::Reg(Gpr32::Eax));
    }

    #[test]
    fn encode_decode_roundtrip_ebp_zero_disp() {
        let parts = MemParts32 {
            base: Some(Gpr32::Ebp),
            index: None,
            scale: 0,
            disp: None,
        };
        let bytes = encode32(&RegOrMem32::Mem(parts), 0);
        assert_eq!(bytes, vec![0b01_000_101, 0x00]);
        let mut s = SliceByteStream::new(&bytes[1..], 1);
        let d = decode32(bytes[0], &mut s).unwrap();
        match d.rm {
            RegOrMem32::Mem(m) => {
                assert_eq!(m.base, Some(Gpr32::Ebp));
                assert_eq!(m.disp, Some(0));
            }
            _ => panic!("expected memory"),
        }
    }

    proptest! {
        #[test]
        fn roundtrip_32bit_direct_base(base_ord in 0u8..8, disp in any::<u32>()) {
            let base = Gpr32::from_ordinal(base_ord).unwrap();
            let parts = MemParts32 { base: Some(base), index: None, scale: 0, disp: Some(disp) };
            let bytes = encode32(&RegOrMem32::Mem(parts), 3);
            let mut s = SliceByteStream::new(&bytes[1..], 1);
            let d = decode32(bytes[0], &mut s).unwrap();
            let interpreted = match d.rm {
                RegOrMem32::Mem(m) => m,
                _ => panic!("expected memory"),
            };
            prop_assert_eq!(interpreted.base, Some(base));
            let norm_expected = if disp == 0 && base != Gpr32::Ebp { None } else { Some(disp) };
            prop_assert_eq!(interpreted.disp, norm_expected);
            prop_assert_eq!(d.reg_field, 3);
        }
    }
}
